//! Server configuration.

use std::time::Duration;

use cardclash_room::BattleRules;

use crate::CardclashError;

/// Environment variable holding the listen address.
pub const ENV_BIND: &str = "CARDCLASH_BIND";
/// Environment variable holding a path to a JSON [`BattleRules`] file.
pub const ENV_RULES: &str = "CARDCLASH_RULES";
/// Environment variable holding the idle timeout in seconds.
pub const ENV_IDLE_TIMEOUT: &str = "CARDCLASH_IDLE_TIMEOUT_SECS";

/// Everything the server needs before it starts accepting peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// A connection that sends nothing for this long is closed.
    pub idle_timeout: Duration,
    pub rules: BattleRules,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            idle_timeout: Duration::from_secs(60),
            rules: BattleRules::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by the `CARDCLASH_*` environment variables.
    pub fn from_env() -> Result<Self, CardclashError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CardclashError> {
        let mut config = Self::default();

        if let Some(addr) = lookup(ENV_BIND).filter(|a| !a.trim().is_empty()) {
            config.bind_addr = addr.trim().to_string();
        }

        if let Some(secs) = lookup(ENV_IDLE_TIMEOUT) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                CardclashError::Config(format!("{ENV_IDLE_TIMEOUT} must be whole seconds, got {secs:?}"))
            })?;
            config.idle_timeout = Duration::from_secs(secs);
        }

        if let Some(path) = lookup(ENV_RULES) {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| CardclashError::Config(format!("reading {path}: {e}")))?;
            config.rules = parse_rules(&raw)?;
        }

        Ok(config)
    }
}

/// Parses a JSON rules document. Absent fields keep their defaults.
pub fn parse_rules(raw: &str) -> Result<BattleRules, CardclashError> {
    let rules: BattleRules = serde_json::from_str(raw)
        .map_err(|e| CardclashError::Config(format!("invalid rules: {e}")))?;
    if rules.points_to_win == 0 {
        return Err(CardclashError::Config("pointsToWin must be at least 1".into()));
    }
    if rules.action_window == 0 {
        return Err(CardclashError::Config("actionWindow must be at least 1".into()));
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.rules.points_to_win, 3);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_BIND, " 0.0.0.0:9000 "),
            (ENV_IDLE_TIMEOUT, "5"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.idle_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_bad_timeout_is_a_config_error() {
        let err = ServerConfig::from_lookup(lookup(&[(ENV_IDLE_TIMEOUT, "soon")])).unwrap_err();
        assert!(matches!(err, CardclashError::Config(_)));
    }

    #[test]
    fn test_missing_rules_file_is_a_config_error() {
        let err = ServerConfig::from_lookup(lookup(&[(ENV_RULES, "/nonexistent/rules.json")]))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rules.json"));
    }

    #[test]
    fn test_parse_rules_partial_and_invalid() {
        let rules = parse_rules(r#"{"overmountLimit": 50}"#).unwrap();
        assert_eq!(rules.overmount_limit, 50);
        assert_eq!(rules.action_window, 50);

        assert!(parse_rules(r#"{"pointsToWin": 0}"#).is_err());
        assert!(parse_rules("not json").is_err());
    }
}
