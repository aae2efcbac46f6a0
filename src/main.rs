//! CLI entry point for bookvault.

mod cli;

use bookvault::api::{ApiClient, AuthEvents};
use bookvault::catalog::CatalogClient;
use bookvault::config::{
    initialize_default_config, load_config, validate, AppConfig, Config, ConfigInitResult,
    LIBRARY_ROUTE,
};
use bookvault::prefs::{default_preferences_path, load_preferences, save_preferences};
use bookvault::reading::{GoalProgress, Schedule};
use bookvault::services::{self, books::NewBook};
use bookvault::session::{FileSessionStore, Session};
use clap::Parser;
use bookvault::services::files::ImportOptions;
use cli::{BooksCommand, Command, FilesCommand, PrefsCommand};
use serde_json::{json, Value};
use std::error::Error;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

type CliResult = Result<(), Box<dyn Error>>;

/// Tells the terminal user to log in again once the session is gone.
struct TerminalEvents;

impl AuthEvents for TerminalEvents {
    fn on_unauthenticated(&self, _login_route: &str) {
        eprintln!("Your session has expired. Run `bookvault login` to sign in again.");
    }
}

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();

    if matches!(args.command, Command::Init) {
        match initialize_default_config() {
            Ok(ConfigInitResult::Created(path)) => println!("wrote {}", path.display()),
            Ok(ConfigInitResult::AlreadyExists(path)) => {
                println!("{} already exists; leaving it untouched", path.display())
            }
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(url) = &args.base_url {
        config.api.base_url = url.clone();
        if let Err(e) = validate(&config) {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }

    bookvault::logging::init_logging(config.app.diagnostics);

    if let Err(e) = run(args, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: cli::Args, config: Config) -> CliResult {
    if let Command::Prefs(command) = &args.command {
        return run_prefs(command);
    }
    if let Command::Lookup { isbn } = &args.command {
        let hits = CatalogClient::new().search_isbn(isbn).await?;
        for hit in hits {
            let authors = hit.author_name.join(", ");
            let year = hit
                .first_publish_year
                .map(|y| format!(" ({y})"))
                .unwrap_or_default();
            println!("{}{year} by {authors} [{}]", hit.title, hit.key);
        }
        return Ok(());
    }

    let store = FileSessionStore::open_default()
        .ok_or("unable to resolve a config directory on this platform")?;
    let client = ApiClient::new(&config, Arc::new(store)).with_events(Arc::new(TerminalEvents));
    let json_output = args.json;

    match args.command {
        Command::Status => {
            let status = client.check_connection().await;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("endpoint: {}", client.base_url());
                println!("{}", status.message);
                if config.app.demo_mode {
                    println!("demo mode: some features are disabled");
                }
                let has_session = services::auth::current_user(&client).is_some();
                let start = config.app.landing_route(has_session);
                println!("start page: {start}");
                if start == LIBRARY_ROUTE && !has_session {
                    println!("Run `bookvault login` to open your library.");
                }
            }
            if !status.is_connected {
                return Err(status.error.unwrap_or(status.message).into());
            }
        }
        Command::Register { email, name } => {
            let password = rpassword::prompt_password("Password: ")?;
            let reply = services::auth::register(&client, &email, &name, &password).await?;
            print_value(&reply, json_output);
            println!("Check {email} for a verification code, then run `bookvault verify`.");
        }
        Command::Verify { email, code } => {
            let reply = services::auth::verify(&client, &email, &code).await?;
            print_value(&reply, json_output);
        }
        Command::Login { email } => {
            let (email, password) = login_credentials(email, &config.app)?;
            services::auth::login(&client, &email, &password).await?;
            match services::auth::current_user(&client) {
                Some(session) => println!("Logged in as {}", display_name(&session)),
                None => println!("Login accepted, but no session was issued."),
            }
        }
        Command::Logout => {
            services::auth::logout(&client).await?;
            println!("Logged out.");
        }
        Command::Whoami => match services::auth::current_user(&client) {
            Some(session) => {
                println!("{}", display_name(&session));
                if let Some(exp) = session.access_token_expiry() {
                    println!("access token expires at unix time {exp}");
                }
            }
            None => println!("Not logged in."),
        },
        Command::Refresh => {
            let session = services::auth::refresh_token(&client).await?;
            println!("Session refreshed for {}", display_name(&session));
        }
        Command::Books(command) => run_books(&client, command, json_output).await?,
        Command::Files(command) => run_files(&client, command, json_output).await?,
        Command::Get { path } => {
            let response = client.get(&path).await?;
            match response.json_value() {
                Ok(value) => print_value(&value, true),
                Err(_) => std::io::stdout().write_all(&response.body)?,
            }
        }
        Command::Init | Command::Lookup { .. } | Command::Prefs(_) => {}
    }
    Ok(())
}

async fn run_books(client: &ApiClient, command: BooksCommand, json_output: bool) -> CliResult {
    match command {
        BooksCommand::List { status, page } => {
            let shelf = services::books::list(client, status.as_deref(), page).await?;
            if json_output {
                print_value(&shelf, true);
                return Ok(());
            }
            let entries = shelf
                .get("items")
                .or(Some(&shelf))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            for entry in entries {
                println!(
                    "{:>6}  {}  ({})",
                    entry.get("id").map(Value::to_string).unwrap_or_default(),
                    entry.get("title").and_then(Value::as_str).unwrap_or("untitled"),
                    entry.get("reading_status").and_then(Value::as_str).unwrap_or("-"),
                );
            }
        }
        BooksCommand::Add {
            title,
            isbn,
            author,
            description,
            status,
        } => {
            let mut book = NewBook {
                title,
                isbn,
                author: author.unwrap_or_default(),
                description: description.unwrap_or_default(),
                ..NewBook::default()
            };
            if let Some(status) = status {
                book.extra.insert("reading_status".into(), json!(status));
            }
            let created = services::books::add(client, &book).await?;
            print_value(&created, json_output);
        }
        BooksCommand::Remove { id } => {
            services::books::remove(client, &id).await?;
            println!("Removed {id}.");
        }
        BooksCommand::Stats => {
            let stats = services::books::stats(client).await?;
            print_value(&stats, true);
        }
        BooksCommand::Goal => {
            let stats = services::books::stats(client).await?;
            let read = stats.get("read").and_then(Value::as_u64).unwrap_or(0);
            let read = u32::try_from(read).unwrap_or(u32::MAX);
            let prefs = load_preferences(&preferences_path()?)?;
            let progress = GoalProgress::new(read, prefs.reading_goal);
            let today = chrono::Local::now().date_naive();
            if json_output {
                println!("{}", serde_json::to_string_pretty(&progress)?);
                return Ok(());
            }
            println!(
                "{read} of {} books ({:.0}%)",
                prefs.reading_goal, progress.percent
            );
            if progress.achieved {
                println!("Goal achieved!");
            } else {
                println!("{} books to go", progress.remaining());
            }
            println!("{}", Schedule::on(today, read, prefs.reading_goal));
        }
    }
    Ok(())
}

async fn run_files(client: &ApiClient, command: FilesCommand, json_output: bool) -> CliResult {
    match command {
        FilesCommand::List => {
            let stored = services::files::list(client).await?;
            print_value(&stored, true);
        }
        FilesCommand::Upload {
            path,
            format,
            allow_duplicates,
        } => {
            let bytes = std::fs::read(&path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let options = ImportOptions {
                format,
                allow_duplicates,
            };
            let reply = services::files::upload(client, &filename, bytes, &options).await?;
            print_value(&reply, json_output);
        }
    }
    Ok(())
}

fn run_prefs(command: &PrefsCommand) -> CliResult {
    let path = preferences_path()?;
    let mut prefs = load_preferences(&path)?;
    match command {
        PrefsCommand::Show => println!("{}", serde_json::to_string_pretty(&prefs)?),
        PrefsCommand::Set { key, value } => {
            prefs.set(key, value)?;
            save_preferences(&path, &prefs)?;
            println!("{key} = {value}");
        }
    }
    Ok(())
}

fn preferences_path() -> Result<PathBuf, Box<dyn Error>> {
    Ok(default_preferences_path().ok_or("unable to resolve a config directory on this platform")?)
}

/// Resolve login credentials, offering the demo account in demo mode.
fn login_credentials(
    email: Option<String>,
    app: &AppConfig,
) -> Result<(String, String), Box<dyn Error>> {
    if let (None, Some((demo_email, demo_password))) = (&email, app.demo_credentials()) {
        println!("This is a demo of BookVault; some features are disabled.");
        println!("Logging in with the demo account {demo_email}.");
        return Ok((demo_email.to_string(), demo_password.to_string()));
    }
    let email = match email {
        Some(email) => email,
        None => {
            print!("Email: ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim().to_string()
        }
    };
    if email.is_empty() {
        return Err("an email address is required".into());
    }
    let password = rpassword::prompt_password("Password: ")?;
    Ok((email, password))
}

fn display_name(session: &Session) -> String {
    session
        .claim_str("name")
        .or_else(|| session.claim_str("email"))
        .unwrap_or("current user")
        .to_string()
}

fn print_value(value: &Value, pretty: bool) {
    if value.is_null() {
        return;
    }
    if pretty {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        );
    } else if let Some(message) = value.get("message").and_then(Value::as_str) {
        println!("{message}");
    } else {
        println!("{value}");
    }
}
