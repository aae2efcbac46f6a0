//! End-to-end checks of the client against a real local HTTP backend.

mod support;

use bookvault::api::{ApiClient, AuthState};
use bookvault::config::Config;
use bookvault::services::files::{self, ImportFormat, ImportOptions};
use bookvault::session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
use serde_json::json;
use std::sync::Arc;
use support::{closed_port_url, MockBackend};

fn config_for(base_url: &str) -> Config {
    let mut config = Config::default();
    config.api.base_url = format!("{base_url}/");
    config
}

#[tokio::test]
async fn bearer_token_reaches_the_wire() {
    let backend = MockBackend::start(|_| (200, json!([{"id": 1, "title": "Dune"}])));
    let store = Arc::new(MemorySessionStore::with_session(&Session::new("access-1", "refresh-1")));
    let client = ApiClient::new(&config_for(backend.base_url()), store);

    let books = bookvault::services::books::list(&client, Some("READ"), Some(1))
        .await
        .expect("listed");
    assert_eq!(books[0]["title"], "Dune");

    let seen = backend.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/v1/books?status=READ&offset=1");
    assert_eq!(seen[0].header("authorization"), Some("Bearer access-1"));
    assert!(seen[0].header("user-agent").unwrap_or("").starts_with("bookvault/"));
}

#[tokio::test]
async fn expired_session_is_refreshed_over_http() {
    let backend = MockBackend::start(|req| {
        match (req.path.as_str(), req.header("authorization")) {
            ("/v1/token/refresh", Some("Bearer refresh-1")) => {
                (200, json!({"access_token": "access-2"}))
            }
            ("/v1/profiles", Some("Bearer access-2")) => (200, json!({"display_name": "ada"})),
            _ => (401, json!({"message": "Token has expired"})),
        }
    });
    let store = Arc::new(MemorySessionStore::with_session(&Session::new("access-1", "refresh-1")));
    let client = ApiClient::new(&config_for(backend.base_url()), store.clone());

    let profile = bookvault::services::profiles::get(&client).await.expect("profile");
    assert_eq!(profile["display_name"], "ada");
    assert_eq!(backend.count_path("/v1/token/refresh"), 1);
    assert_eq!(backend.count_path("/v1/profiles"), 2);
    assert_eq!(store.get().unwrap().access_token(), Some("access-2"));
    assert_eq!(client.auth_state(), AuthState::Authorized);
}

#[tokio::test]
async fn import_upload_is_sent_as_multipart_with_bearer() {
    let backend = MockBackend::start(|_| (201, json!({"message": "Imported 2 books"})));
    let store = Arc::new(MemorySessionStore::with_session(&Session::new("access-1", "refresh-1")));
    let client = ApiClient::new(&config_for(backend.base_url()), store);
    let options = ImportOptions {
        format: ImportFormat::Goodreads,
        allow_duplicates: false,
    };

    let reply = files::upload(&client, "goodreads.csv", b"Title,ISBN13\nDune,1\n".to_vec(), &options)
        .await
        .expect("uploaded");
    assert_eq!(reply["message"], "Imported 2 books");

    let seen = backend.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/v1/files");
    assert_eq!(seen[0].header("authorization"), Some("Bearer access-1"));
    let content_type = seen[0].header("content-type").unwrap_or("");
    assert!(
        content_type.starts_with("multipart/form-data; boundary="),
        "content-type: {content_type}"
    );

    let body = String::from_utf8_lossy(&seen[0].raw_body);
    assert!(body.contains(r#"name="file"; filename="goodreads.csv""#), "body: {body}");
    assert!(body.contains("Title,ISBN13\nDune,1"));
    assert!(body.contains(r#"name="type""#) && body.contains("goodreads"));
    assert!(body.contains(r#"name="allow_duplicates""#) && body.contains("false"));
}

#[tokio::test]
async fn probe_reports_connected_backend() {
    let backend = MockBackend::start(|_| (200, json!({"status": "healthy"})));
    let client = ApiClient::new(
        &config_for(backend.base_url()),
        Arc::new(MemorySessionStore::new()),
    );

    let status = client.check_connection().await;
    assert!(status.is_connected);
    assert_eq!(status.status.as_deref(), Some("healthy"));
    assert_eq!(backend.requests()[0].path, "/health");
}

#[tokio::test]
async fn probe_reports_refused_connection() {
    let client = ApiClient::new(
        &config_for(&closed_port_url()),
        Arc::new(MemorySessionStore::new()),
    );

    let status = client.check_connection().await;
    assert!(!status.is_connected);
    assert_eq!(status.message, "Server is not running or unreachable");
}

#[tokio::test]
async fn login_persists_an_encrypted_session_file() {
    let backend = MockBackend::start(|req| match req.path.as_str() {
        "/health" => (200, json!({"status": "ok"})),
        _ => (
            200,
            json!({"access_token": "access-1", "refresh_token": "refresh-1", "email": "ada@example.com"}),
        ),
    });
    let dir = std::env::temp_dir().join(format!("bookvault-it-{}", std::process::id()));
    let path = dir.join("session.json");
    let client = ApiClient::new(
        &config_for(backend.base_url()),
        Arc::new(FileSessionStore::new(&path)),
    );

    bookvault::services::auth::login(&client, "ada@example.com", "secret")
        .await
        .expect("login");

    let on_disk = std::fs::read_to_string(&path).expect("session file");
    assert!(!on_disk.contains("access-1"), "tokens must not be stored in plaintext");

    let reopened = FileSessionStore::new(&path).get().expect("readable session");
    assert_eq!(reopened.access_token(), Some("access-1"));
    assert_eq!(reopened.claim_str("email"), Some("ada@example.com"));

    let login = backend
        .requests()
        .into_iter()
        .find(|r| r.path == "/v1/login")
        .expect("login request");
    assert_eq!(login.body.unwrap()["password"], "secret");

    let _ = std::fs::remove_dir_all(dir);
}
