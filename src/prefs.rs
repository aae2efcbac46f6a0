//! Client-side preferences persisted next to the session file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::config_root_dir;
use crate::error::ConfigError;

/// Color theme of the client UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Persisted preference keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Books per year.
    pub reading_goal: u32,
    pub theme: Theme,
    pub show_welcome_screen: bool,
    /// Enter progress as a percentage rather than a page number.
    pub use_percentage_progress: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            reading_goal: 12,
            theme: Theme::Light,
            show_welcome_screen: true,
            use_percentage_progress: false,
        }
    }
}

impl Preferences {
    pub fn has_seen_onboarding(&self) -> bool {
        !self.show_welcome_screen
    }

    /// Set one preference from its textual form, as typed on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "reading_goal" => {
                self.reading_goal = value
                    .parse()
                    .ok()
                    .filter(|goal| *goal > 0)
                    .ok_or_else(|| {
                        ConfigError::Invalid(format!("reading_goal must be a positive number, got `{value}`"))
                    })?;
            }
            "theme" => {
                self.theme = match value {
                    "light" => Theme::Light,
                    "dark" => Theme::Dark,
                    other => {
                        return Err(ConfigError::Invalid(format!(
                            "theme must be `light` or `dark`, got `{other}`"
                        )))
                    }
                };
            }
            "show_welcome_screen" => self.show_welcome_screen = parse_bool(key, value)?,
            "use_percentage_progress" => self.use_percentage_progress = parse_bool(key, value)?,
            other => {
                return Err(ConfigError::Invalid(format!(
                    "unknown preference `{other}`"
                )))
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid(format!(
            "{key} must be true or false, got `{value}`"
        ))),
    }
}

/// Returns the default preferences path (`~/.config/bookvault/preferences.json`).
pub fn default_preferences_path() -> Option<PathBuf> {
    config_root_dir().map(|dir| dir.join("bookvault").join("preferences.json"))
}

/// Load preferences; a missing file yields the defaults.
pub fn load_preferences(path: &Path) -> Result<Preferences, ConfigError> {
    match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text).map_err(|e| {
            ConfigError::Invalid(format!("malformed preferences {}: {e}", path.display()))
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Preferences::default()),
        Err(err) => Err(err.into()),
    }
}

pub fn save_preferences(path: &Path, prefs: &Preferences) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(prefs)
        .map_err(|e| ConfigError::Invalid(format!("failed to encode preferences: {e}")))?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::TestTempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TestTempDir::new("prefs-missing");
        let prefs = load_preferences(&tmp.child("preferences.json")).unwrap();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.reading_goal, 12);
        assert!(!prefs.has_seen_onboarding());
    }

    #[test]
    fn partial_file_fills_remaining_defaults() {
        let tmp = TestTempDir::new("prefs-partial");
        let path = tmp.write_text("preferences.json", r#"{"theme":"dark","reading_goal":30}"#);
        let prefs = load_preferences(&path).unwrap();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.reading_goal, 30);
        assert!(prefs.show_welcome_screen);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let tmp = TestTempDir::new("prefs-save");
        let path = tmp.child("nested/preferences.json");
        let mut prefs = Preferences::default();
        prefs.set("use_percentage_progress", "yes").unwrap();
        prefs.set("show_welcome_screen", "false").unwrap();
        save_preferences(&path, &prefs).unwrap();

        let loaded = load_preferences(&path).unwrap();
        assert!(loaded.use_percentage_progress);
        assert!(loaded.has_seen_onboarding());
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut prefs = Preferences::default();
        assert!(prefs.set("reading_goal", "0").is_err());
        assert!(prefs.set("reading_goal", "many").is_err());
        assert!(prefs.set("theme", "sepia").is_err());
        assert!(prefs.set("font", "serif").is_err());
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn malformed_file_is_reported() {
        let tmp = TestTempDir::new("prefs-bad");
        let path = tmp.write_text("preferences.json", "{not json");
        let err = load_preferences(&path).unwrap_err();
        assert!(err.to_string().contains("malformed preferences"));
    }
}
