//! Embeds git/build metadata for `bookvault --version` and the client
//! `User-Agent`. Missing tooling falls back to "unknown" markers.

use std::env;
use std::fs;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    watch_head_ref();
    println!("cargo:rerun-if-env-changed=BOOKVAULT_BUILD_GIT_HASH");
    println!("cargo:rerun-if-env-changed=BOOKVAULT_BUILD_TIMESTAMP");

    let git_hash = env::var("BOOKVAULT_BUILD_GIT_HASH").unwrap_or_else(|_| short_commit());
    let built_at = env::var("BOOKVAULT_BUILD_TIMESTAMP").unwrap_or_else(|_| utc_timestamp());

    println!("cargo:rustc-env=BOOKVAULT_BUILD_GIT_HASH={git_hash}");
    println!("cargo:rustc-env=BOOKVAULT_BUILD_TIMESTAMP={built_at}");
}

fn watch_head_ref() {
    let Ok(head) = fs::read_to_string(".git/HEAD") else {
        return;
    };
    if let Some(reference) = head.trim().strip_prefix("ref: ") {
        println!("cargo:rerun-if-changed=.git/{reference}");
    }
}

fn short_commit() -> String {
    capture("git", &["rev-parse", "--short=10", "HEAD"]).unwrap_or_else(|| "unknown".to_string())
}

fn utc_timestamp() -> String {
    if let Some(stamp) = capture("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]) {
        return stamp;
    }
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    format!("unix:{secs}")
}

fn capture(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
