//! Environment overrides.
//!
//! Canonical `BOOKVAULT_*` variables take precedence. The `VITE_*` names used
//! by the web deployment are accepted as aliases so one `.env` file can
//! configure both.

use crate::error::ConfigError;

use super::Config;

pub(super) fn apply_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(url) = env_with_alias(env_lookup, "BOOKVAULT_API_ENDPOINT", "VITE_API_ENDPOINT") {
        config.api.base_url = url;
    }
    if let Some(timeout) = non_empty(env_lookup("BOOKVAULT_API_TIMEOUT_SECS")) {
        let parsed = timeout.parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid BOOKVAULT_API_TIMEOUT_SECS value `{timeout}`: expected positive integer seconds"
            ))
        })?;
        // Zero would mean "no timeout"; clamp to one second.
        config.api.timeout_secs = parsed.max(1);
    }
    if let Some(flag) = env_with_alias(env_lookup, "BOOKVAULT_DEMO_MODE", "VITE_DEMO_MODE") {
        config.app.demo_mode = parse_flag("BOOKVAULT_DEMO_MODE", &flag)?;
    }
    if let Some(flag) = env_with_alias(
        env_lookup,
        "BOOKVAULT_DISABLE_HOMEPAGE",
        "VITE_DISABLE_HOMEPAGE",
    ) {
        config.app.disable_homepage = parse_flag("BOOKVAULT_DISABLE_HOMEPAGE", &flag)?;
    }
    if let Some(flag) = non_empty(env_lookup("BOOKVAULT_DIAGNOSTICS")) {
        config.app.diagnostics = parse_flag("BOOKVAULT_DIAGNOSTICS", &flag)?;
    }
    Ok(())
}

fn env_with_alias<FEnv>(env_lookup: &FEnv, canonical: &str, alias: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    non_empty(env_lookup(canonical)).or_else(|| non_empty(env_lookup(alias)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid(format!(
            "invalid {name} value `{value}`: expected true or false"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn canonical_endpoint_beats_vite_alias() {
        let mut config = Config::default();
        let env = lookup(&[
            ("BOOKVAULT_API_ENDPOINT", "https://api.bookvault.test"),
            ("VITE_API_ENDPOINT", "https://legacy.test"),
        ]);
        apply_env_overrides(&mut config, &env).unwrap();
        assert_eq!(config.api.base_url, "https://api.bookvault.test");
    }

    #[test]
    fn vite_aliases_are_honored() {
        let mut config = Config::default();
        let env = lookup(&[
            ("VITE_API_ENDPOINT", "https://legacy.test/"),
            ("VITE_DEMO_MODE", "true"),
            ("VITE_DISABLE_HOMEPAGE", "1"),
        ]);
        apply_env_overrides(&mut config, &env).unwrap();
        assert_eq!(config.api.base_url, "https://legacy.test/");
        assert!(config.app.demo_mode);
        assert!(config.app.disable_homepage);
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, &lookup(&[("BOOKVAULT_API_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(config.api.timeout_secs, 1);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let mut config = Config::default();
        let err = apply_env_overrides(&mut config, &lookup(&[("BOOKVAULT_DIAGNOSTICS", "maybe")]))
            .expect_err("should fail");
        assert!(err.to_string().contains("BOOKVAULT_DIAGNOSTICS"), "{err}");

        let err = apply_env_overrides(
            &mut config,
            &lookup(&[("BOOKVAULT_API_TIMEOUT_SECS", "soon")]),
        )
        .expect_err("should fail");
        assert!(err.to_string().contains("positive integer"), "{err}");
    }
}
