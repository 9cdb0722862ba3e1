#![forbid(unsafe_code)]

//! Driver and session configuration.
//!
//! Both configs are plain structs with public fields and `with_*` builders.
//! [`DriverConfig::from_env`] and [`SessionConfig::from_env`] overlay the
//! following environment variables on the defaults:
//!
//! | Variable                   | Field                    | Format          |
//! |----------------------------|--------------------------|-----------------|
//! | `TURNBASIC_TURN_DELAY_MS`  | `turn_delay`             | positive integer|
//! | `TURNBASIC_SEED`           | `seed`                   | `u64`           |
//! | `TURNBASIC_WARNINGS`       | `engine_options.warnings`| bool            |
//! | `TURNBASIC_TRACE`          | `engine_options.tracing` | bool            |
//! | `TURNBASIC_INTERACTIVE`    | `interactive_after_load` | bool            |
//! | `TURNBASIC_SCROLLBACK`     | `scrollback_limit`       | positive integer|
//! | `TURNBASIC_HISTORY_LIMIT`  | `history_limit`          | positive integer|
//!
//! Bools accept `1/0`, `true/false`, `yes/no` and `on/off`.

use core::fmt;
use core::time::Duration;
use std::env;

use turnbasic_core::EngineOptions;

const ENV_TURN_DELAY_MS: &str = "TURNBASIC_TURN_DELAY_MS";
const ENV_SEED: &str = "TURNBASIC_SEED";
const ENV_WARNINGS: &str = "TURNBASIC_WARNINGS";
const ENV_TRACE: &str = "TURNBASIC_TRACE";
const ENV_INTERACTIVE: &str = "TURNBASIC_INTERACTIVE";
const ENV_SCROLLBACK: &str = "TURNBASIC_SCROLLBACK";
const ENV_HISTORY_LIMIT: &str = "TURNBASIC_HISTORY_LIMIT";

/// Shortest delay between two turns of a running program.
pub const MIN_TURN_DELAY: Duration = Duration::from_millis(1);

// ============================================================================
// Errors
// ============================================================================

/// Malformed configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Environment variable that was rejected.
    pub variable: &'static str,
    /// Offending value.
    pub value: String,
    /// What was expected.
    pub expected: &'static str,
}

impl ConfigError {
    fn new(variable: &'static str, value: impl Into<String>, expected: &'static str) -> Self {
        Self {
            variable,
            value: value.into(),
            expected,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={:?} (expected {})",
            self.variable, self.value, self.expected
        )
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// DriverConfig
// ============================================================================

/// Configuration for [`Driver`](crate::Driver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Prompt shown when the engine is idle.
    pub idle_prompt: String,
    /// Prompt shown while the engine waits for `INPUT`.
    pub input_prompt: String,
    /// Delay before the next turn of a running program. Never zero.
    pub turn_delay: Duration,
    /// Random seed. `None` seeds from the wall clock.
    pub seed: Option<u64>,
    /// Options applied to the engine at construction.
    pub engine_options: EngineOptions,
    /// Keep prompting after a batch-loaded program ends.
    pub interactive_after_load: bool,
    /// Maximum committed console lines. `None` is unbounded.
    pub scrollback_limit: Option<usize>,
    /// Text echoed after the prompt when a break is requested.
    pub break_marker: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            idle_prompt: "] ".to_string(),
            input_prompt: "? ".to_string(),
            turn_delay: MIN_TURN_DELAY,
            seed: None,
            engine_options: EngineOptions::default(),
            interactive_after_load: false,
            scrollback_limit: None,
            break_marker: "^C".to_string(),
        }
    }
}

impl DriverConfig {
    /// Set the idle prompt.
    #[must_use]
    pub fn with_idle_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.idle_prompt = prompt.into();
        self
    }

    /// Set the `INPUT` prompt.
    #[must_use]
    pub fn with_input_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.input_prompt = prompt.into();
        self
    }

    /// Set the cooperative delay, clamped to [`MIN_TURN_DELAY`].
    #[must_use]
    pub fn with_turn_delay(mut self, delay: Duration) -> Self {
        self.turn_delay = delay.max(MIN_TURN_DELAY);
        self
    }

    /// Use a fixed random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set engine options.
    #[must_use]
    pub const fn with_engine_options(mut self, options: EngineOptions) -> Self {
        self.engine_options = options;
        self
    }

    /// Keep prompting after a batch-loaded program ends.
    #[must_use]
    pub const fn with_interactive_after_load(mut self, enabled: bool) -> Self {
        self.interactive_after_load = enabled;
        self
    }

    /// Bound the console scrollback.
    #[must_use]
    pub const fn with_scrollback_limit(mut self, limit: usize) -> Self {
        self.scrollback_limit = Some(limit);
        self
    }

    /// Set the break marker echoed after the prompt.
    #[must_use]
    pub fn with_break_marker(mut self, marker: impl Into<String>) -> Self {
        self.break_marker = marker.into();
        self
    }

    /// Defaults overlaid with environment variables. Malformed values are
    /// logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let (config, errors) = Self::from_env_with(|key| env::var(key).ok());
        log_errors(&errors);
        config
    }

    /// Defaults overlaid with environment variables, failing on the first
    /// malformed value.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        first_error(Self::from_env_with(|key| env::var(key).ok()))
    }

    /// Overlay values from `get` on the defaults and collect every rejected
    /// value.
    pub fn from_env_with<F>(mut get: F) -> (Self, Vec<ConfigError>)
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut errors = Vec::new();

        if let Some(value) = get(ENV_TURN_DELAY_MS) {
            match parse_positive(&value) {
                Some(ms) => config = config.with_turn_delay(Duration::from_millis(ms as u64)),
                None => errors.push(ConfigError::new(
                    ENV_TURN_DELAY_MS,
                    value,
                    "positive integer",
                )),
            }
        }

        if let Some(value) = get(ENV_SEED) {
            match value.trim().parse::<u64>() {
                Ok(seed) => config.seed = Some(seed),
                Err(_) => errors.push(ConfigError::new(ENV_SEED, value, "unsigned integer")),
            }
        }

        if let Some(value) = get(ENV_WARNINGS) {
            match parse_bool(&value) {
                Some(on) => config.engine_options.warnings = on,
                None => errors.push(ConfigError::new(ENV_WARNINGS, value, "bool")),
            }
        }

        if let Some(value) = get(ENV_TRACE) {
            match parse_bool(&value) {
                Some(on) => config.engine_options.tracing = on,
                None => errors.push(ConfigError::new(ENV_TRACE, value, "bool")),
            }
        }

        if let Some(value) = get(ENV_INTERACTIVE) {
            match parse_bool(&value) {
                Some(on) => config.interactive_after_load = on,
                None => errors.push(ConfigError::new(ENV_INTERACTIVE, value, "bool")),
            }
        }

        if let Some(value) = get(ENV_SCROLLBACK) {
            match parse_positive(&value) {
                Some(limit) => config.scrollback_limit = Some(limit),
                None => errors.push(ConfigError::new(ENV_SCROLLBACK, value, "positive integer")),
            }
        }

        (config, errors)
    }
}

// ============================================================================
// SessionConfig
// ============================================================================

/// Configuration for [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionConfig {
    /// Driver settings.
    pub driver: DriverConfig,
    /// Maximum history entries. `None` is unbounded.
    pub history_limit: Option<usize>,
}

impl SessionConfig {
    /// Set driver settings.
    #[must_use]
    pub fn with_driver(mut self, driver: DriverConfig) -> Self {
        self.driver = driver;
        self
    }

    /// Bound the input history.
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Defaults overlaid with environment variables. Malformed values are
    /// logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let (config, errors) = Self::from_env_with(|key| env::var(key).ok());
        log_errors(&errors);
        config
    }

    /// Defaults overlaid with environment variables, failing on the first
    /// malformed value.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        first_error(Self::from_env_with(|key| env::var(key).ok()))
    }

    /// Overlay values from `get` on the defaults and collect every rejected
    /// value.
    pub fn from_env_with<F>(mut get: F) -> (Self, Vec<ConfigError>)
    where
        F: FnMut(&str) -> Option<String>,
    {
        let (driver, mut errors) = DriverConfig::from_env_with(&mut get);
        let mut config = Self {
            driver,
            history_limit: None,
        };
        if let Some(value) = get(ENV_HISTORY_LIMIT) {
            match parse_positive(&value) {
                Some(limit) => config.history_limit = Some(limit),
                None => errors.push(ConfigError::new(
                    ENV_HISTORY_LIMIT,
                    value,
                    "positive integer",
                )),
            }
        }
        (config, errors)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_positive(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|&v| v > 0)
}

fn first_error<T>((config, errors): (T, Vec<ConfigError>)) -> Result<T, ConfigError> {
    match errors.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(config),
    }
}

#[cfg(feature = "tracing")]
fn log_errors(errors: &[ConfigError]) {
    for err in errors {
        turnbasic_core::warn!(error = %err, "ignoring malformed config value");
    }
}

#[cfg(not(feature = "tracing"))]
fn log_errors(_errors: &[ConfigError]) {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl FnMut(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.idle_prompt, "] ");
        assert_eq!(config.input_prompt, "? ");
        assert_eq!(config.turn_delay, MIN_TURN_DELAY);
        assert_eq!(config.break_marker, "^C");
        assert!(!config.interactive_after_load);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn turn_delay_is_never_zero() {
        let config = DriverConfig::default().with_turn_delay(Duration::ZERO);
        assert_eq!(config.turn_delay, MIN_TURN_DELAY);
    }

    #[test]
    fn env_overlay() {
        let (config, errors) = SessionConfig::from_env_with(lookup(&[
            (ENV_TURN_DELAY_MS, "16"),
            (ENV_SEED, "42"),
            (ENV_WARNINGS, "on"),
            (ENV_TRACE, "TRUE"),
            (ENV_INTERACTIVE, "1"),
            (ENV_SCROLLBACK, "500"),
            (ENV_HISTORY_LIMIT, "20"),
        ]));
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(config.driver.turn_delay, Duration::from_millis(16));
        assert_eq!(config.driver.seed, Some(42));
        assert!(config.driver.engine_options.warnings);
        assert!(config.driver.engine_options.tracing);
        assert!(config.driver.interactive_after_load);
        assert_eq!(config.driver.scrollback_limit, Some(500));
        assert_eq!(config.history_limit, Some(20));
    }

    #[test]
    fn malformed_values_are_collected_and_skipped() {
        let (config, errors) = SessionConfig::from_env_with(lookup(&[
            (ENV_TURN_DELAY_MS, "0"),
            (ENV_WARNINGS, "maybe"),
            (ENV_HISTORY_LIMIT, "-3"),
        ]));
        assert_eq!(config, SessionConfig::default());
        let vars: Vec<_> = errors.iter().map(|e| e.variable).collect();
        assert_eq!(vars, vec![ENV_TURN_DELAY_MS, ENV_WARNINGS, ENV_HISTORY_LIMIT]);
    }

    #[test]
    fn first_error_wins() {
        let parsed = DriverConfig::from_env_with(lookup(&[(ENV_SEED, "x")]));
        let err = first_error(parsed).unwrap_err();
        assert_eq!(err.to_string(), "TURNBASIC_SEED=\"x\" (expected unsigned integer)");
    }
}
