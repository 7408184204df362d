use std::time::Duration;

use crate::engine::clock::Clock;

/// Engine configuration parsed from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Initial time per side in milliseconds; 0 means untimed.
    pub clock_initial_ms: u64,
    /// Increment added after each move, in milliseconds.
    pub clock_increment_ms: u64,
    /// Default starting position for new sessions.
    pub start_fen: Option<String>,
    /// Start new sessions from a Fischer-random array.
    pub fischer: bool,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup (the environment, a map in
    /// tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = EngineConfig::default();
        EngineConfig {
            clock_initial_ms: lookup("CHESS_CLOCK_INITIAL_MS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.clock_initial_ms),
            clock_increment_ms: lookup("CHESS_CLOCK_INCREMENT_MS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.clock_increment_ms),
            start_fen: lookup("CHESS_START_FEN")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            fischer: lookup("CHESS_VARIANT")
                .map(|v| {
                    let v = v.trim();
                    v.eq_ignore_ascii_case("fischer") || v.eq_ignore_ascii_case("chess960")
                })
                .unwrap_or(defaults.fischer),
        }
    }

    /// A fresh clock for a new session, or `None` when untimed.
    pub fn clock(&self) -> Option<Clock> {
        (self.clock_initial_ms > 0).then(|| {
            Clock::new(
                Duration::from_millis(self.clock_initial_ms),
                Duration::from_millis(self.clock_increment_ms),
            )
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            clock_initial_ms: 0,
            clock_increment_ms: 0,
            start_fen: None,
            fischer: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> EngineConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn default_config_is_untimed() {
        let config = EngineConfig::default();
        assert_eq!(config.clock_initial_ms, 0);
        assert_eq!(config.start_fen, None);
        assert!(config.clock().is_none());
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config(&[]), EngineConfig::default());
    }

    #[test]
    fn clock_settings() {
        let config = config(&[
            ("CHESS_CLOCK_INITIAL_MS", "300000"),
            ("CHESS_CLOCK_INCREMENT_MS", "2000"),
        ]);
        let clock = config.clock().unwrap();
        assert_eq!(
            clock.remaining(crate::engine::Color::White),
            Duration::from_secs(300)
        );
        assert_eq!(clock.increment(), Duration::from_secs(2));
    }

    #[test]
    fn variant_selection() {
        assert!(config(&[("CHESS_VARIANT", "Chess960")]).fischer);
        assert!(config(&[("CHESS_VARIANT", " fischer ")]).fischer);
        assert!(!config(&[("CHESS_VARIANT", "classic")]).fischer);
    }

    #[test]
    fn unparseable_values_fall_back() {
        let config = config(&[
            ("CHESS_CLOCK_INITIAL_MS", "soon"),
            ("CHESS_START_FEN", "   "),
        ]);
        assert_eq!(config, EngineConfig::default());
    }
}
