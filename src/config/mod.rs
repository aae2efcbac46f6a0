//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`BOOKVAULT_*`, with `VITE_*` aliases)
//! 2. TOML file specified via the `--config` CLI flag
//! 3. `./bookvault.toml` in the current directory
//! 4. `$XDG_CONFIG_HOME/bookvault/bookvault.toml` (or `~/.config/...`)
//! 5. Built-in defaults

use crate::error::ConfigError;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

mod defaults;
mod env;
mod types;

pub use types::{
    ApiConfig, AppConfig, Config, ConfigInitResult, DEMO_ACCOUNT, HOME_ROUTE, LIBRARY_ROUTE,
};

use defaults::DEFAULT_CONFIG_TEMPLATE;
use env::apply_env_overrides;

/// Where the loaded config text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Local,
    Global(PathBuf),
    BuiltInDefaults,
}

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from `--config`).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    Ok(load_config_with_source(path_override)?.0)
}

/// Load configuration and report which source supplied it.
pub fn load_config_with_source(
    path_override: Option<&str>,
) -> Result<(Config, ConfigSource), ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<(Config, ConfigSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (text, source) = read_config_text(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&text)?;
    apply_env_overrides(&mut config, &env_lookup)?;
    validate(&config)?;
    Ok((config, source))
}

fn read_config_text<FRead, FRoot>(
    path_override: Option<&str>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<(String, ConfigSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    if let Some(p) = path_override {
        let path = PathBuf::from(p);
        let text = read_file(&path)?;
        return Ok((text, ConfigSource::Explicit(path)));
    }
    if let Ok(text) = read_file(Path::new("bookvault.toml")) {
        return Ok((text, ConfigSource::Local));
    }
    if let Some(dir) = config_root() {
        let global = dir.join("bookvault").join("bookvault.toml");
        if let Ok(text) = read_file(&global) {
            return Ok((text, ConfigSource::Global(global)));
        }
    }
    Ok((String::new(), ConfigSource::BuiltInDefaults))
}

/// Reject configs whose base URL is empty or not http(s).
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let base = config.api.base_url.trim();
    if base.is_empty() {
        return Err(ConfigError::Invalid(
            "no API endpoint configured. Set api.base_url in bookvault.toml or BOOKVAULT_API_ENDPOINT."
                .to_string(),
        ));
    }
    let parsed = reqwest::Url::parse(base)
        .map_err(|err| ConfigError::Invalid(format!("invalid api.base_url `{base}`: {err}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid(format!(
            "invalid api.base_url `{base}`: unsupported scheme `{other}` (expected http or https)"
        ))),
    }
}

/// Return the per-user config root (`$XDG_CONFIG_HOME` or `~/.config`).
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
}

/// Return the default per-user config path (`~/.config/bookvault/bookvault.toml`).
pub fn default_global_config_path() -> Option<PathBuf> {
    config_root_dir().map(|dir| dir.join("bookvault").join("bookvault.toml"))
}

/// Write the default template to the global config path unless it exists.
pub fn initialize_default_config() -> Result<ConfigInitResult, ConfigError> {
    let path = default_global_config_path().ok_or_else(|| {
        ConfigError::Invalid("unable to resolve a config directory on this platform".to_string())
    })?;
    initialize_config_at_path(&path)
}

fn initialize_config_at_path(path: &Path) -> Result<ConfigInitResult, ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // `create_new` so two concurrent inits never clobber each other.
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(DEFAULT_CONFIG_TEMPLATE.as_bytes())?;
            Ok(ConfigInitResult::Created(path.to_path_buf()))
        }
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            Ok(ConfigInitResult::AlreadyExists(path.to_path_buf()))
        }
        Err(err) => Err(ConfigError::Io(err)),
    }
}
