//! BookVault: authenticated client for the BookVault reading-tracker backend.
//!
//! Every backend call goes through [`api::ApiClient`], which attaches the
//! stored bearer token, retries transient failures and recovers an expired
//! session once per request before giving up.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use bookvault::api::ApiClient;
//! use bookvault::config::load_config;
//! use bookvault::session::FileSessionStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(None)?;
//! let store = Arc::new(FileSessionStore::open_default().ok_or("no config directory")?);
//! let client = ApiClient::new(&config, store);
//! let status = client.check_connection().await;
//! println!("{}", status.message);
//! let books = bookvault::services::books::list(&client, None, None).await?;
//! println!("{books}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod build_info;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod prefs;
pub mod reading;
pub mod services;
pub mod session;
#[cfg(test)]
pub mod testsupport;
