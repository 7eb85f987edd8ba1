use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::theme::ThemeMode;

pub const DEFAULT_INTERVAL_MINUTES: u32 = 60;
pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 60;

pub const DEFAULT_MESSAGES: &[&str] = &[
    "Time for a squeeze. Consistency wins 💪",
    "You've been sitting a while. Hold it for a bit 🕵️",
    "Your pelvic floor reminder is here. Lift and hold 😄",
    "Hands off the mouse, hold, then back to the fight 🧘",
    "One minute of holding, a whole day of feeling good 🌈",
    "Same posture, working muscles 🏋️",
    "A squeeze every hour keeps the doctor away 🚽",
    "With me now: breathe in, lift, breathe out ☯️",
    "Level up starts with this one hold 🚀",
];

pub fn default_messages() -> Vec<String> {
    DEFAULT_MESSAGES.iter().map(|m| m.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderConfig {
    /// Reminder texts, one picked at random per firing. Never empty.
    pub messages: Vec<String>,

    /// Minutes between reminders
    pub interval_minutes: u32,

    /// Length of the hold countdown in seconds
    pub countdown_seconds: u32,

    /// Start the reminder loop as soon as the app launches
    pub auto_start: bool,

    /// Hide the window to the tray after an automatic start
    pub minimize_to_tray_on_start: bool,

    pub theme: ThemeMode,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            messages: default_messages(),
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            auto_start: false,
            minimize_to_tray_on_start: false,
            theme: ThemeMode::Dark,
        }
    }
}

impl ReminderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.messages.iter().all(|m| m.trim().is_empty()) {
            return Err(ConfigError::EmptyMessages);
        }
        if self.interval_minutes == 0 {
            return Err(ConfigError::NonPositive {
                field: "reminder interval",
                value: 0,
            });
        }
        if self.countdown_seconds == 0 {
            return Err(ConfigError::NonPositive {
                field: "hold duration",
                value: 0,
            });
        }
        Ok(())
    }
}

/// On-disk shape of the config document. Every key is optional so older
/// files and hand-edited ones still load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimize_to_tray_on_start: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_seconds: Option<i64>,
}

impl From<&ReminderConfig> for StoredConfig {
    fn from(config: &ReminderConfig) -> Self {
        Self {
            messages: Some(config.messages.clone()),
            auto_start: Some(config.auto_start),
            minimize_to_tray_on_start: Some(config.minimize_to_tray_on_start),
            theme: Some(config.theme.as_str().to_string()),
            interval_minutes: Some(i64::from(config.interval_minutes)),
            countdown_seconds: Some(i64::from(config.countdown_seconds)),
        }
    }
}

/// What a config file turned out to contain.
#[derive(Debug, Clone)]
pub enum ParsedConfig {
    Current(StoredConfig),
    /// Bare JSON array of messages from before settings were stored.
    Legacy(Vec<String>),
    Invalid(String),
}

impl ParsedConfig {
    pub fn parse(content: &str) -> Self {
        if content.trim().is_empty() {
            return ParsedConfig::Invalid("file is empty".to_string());
        }

        let value: Value = match serde_json::from_str(content) {
            Ok(value) => value,
            Err(e) => return ParsedConfig::Invalid(format!("not valid JSON: {}", e)),
        };

        match value {
            Value::Object(_) => match serde_json::from_value::<StoredConfig>(value) {
                Ok(stored) => ParsedConfig::Current(stored),
                Err(e) => ParsedConfig::Invalid(format!("unexpected settings shape: {}", e)),
            },
            Value::Array(_) => match serde_json::from_value::<Vec<String>>(value) {
                Ok(messages) => ParsedConfig::Legacy(messages),
                Err(e) => ParsedConfig::Invalid(format!("legacy list holds non-strings: {}", e)),
            },
            other => ParsedConfig::Invalid(format!("expected an object, found {}", json_kind(&other))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub config: ReminderConfig,
    /// The file on disk should be replaced with `config`.
    pub rewrite: bool,
}

fn clean_messages(messages: Vec<String>) -> Vec<String> {
    messages
        .into_iter()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect()
}

fn positive_or(value: Option<i64>, default: u32, field: &str) -> u32 {
    match value {
        None => default,
        Some(v) => match u32::try_from(v) {
            Ok(v) if v > 0 => v,
            _ => {
                warn!(field, value = v, default, "stored value out of range, using default");
                default
            }
        },
    }
}

pub fn normalize(parsed: ParsedConfig) -> Normalized {
    match parsed {
        ParsedConfig::Current(stored) => {
            let messages = match stored.messages {
                None => default_messages(),
                Some(messages) => {
                    let messages = clean_messages(messages);
                    if messages.is_empty() {
                        return normalize(ParsedConfig::Invalid(
                            "message list is empty".to_string(),
                        ));
                    }
                    messages
                }
            };

            let theme = match stored.theme.as_deref() {
                None => ThemeMode::default(),
                Some(name) => ThemeMode::from_name(name).unwrap_or_else(|| {
                    warn!(theme = name, "unknown theme, using dark");
                    ThemeMode::Dark
                }),
            };

            Normalized {
                config: ReminderConfig {
                    messages,
                    interval_minutes: positive_or(
                        stored.interval_minutes,
                        DEFAULT_INTERVAL_MINUTES,
                        "interval_minutes",
                    ),
                    countdown_seconds: positive_or(
                        stored.countdown_seconds,
                        DEFAULT_COUNTDOWN_SECONDS,
                        "countdown_seconds",
                    ),
                    auto_start: stored.auto_start.unwrap_or(false),
                    minimize_to_tray_on_start: stored.minimize_to_tray_on_start.unwrap_or(false),
                    theme,
                },
                rewrite: false,
            }
        }
        ParsedConfig::Legacy(messages) => {
            let messages = clean_messages(messages);
            if messages.is_empty() {
                return normalize(ParsedConfig::Invalid("legacy list is empty".to_string()));
            }
            info!(count = messages.len(), "upgrading legacy message list");
            Normalized {
                config: ReminderConfig {
                    messages,
                    ..ReminderConfig::default()
                },
                rewrite: true,
            }
        }
        ParsedConfig::Invalid(reason) => {
            warn!(%reason, "config unusable, resetting to defaults");
            Normalized {
                config: ReminderConfig::default(),
                rewrite: true,
            }
        }
    }
}

/// Loads and saves the JSON settings file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".config/tigan-reminder"))
    }

    pub fn default_location() -> Result<Self> {
        Ok(Self::new(Self::config_dir()?.join("config.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails: problems are logged and defaults are used instead.
    pub fn load(&self) -> ReminderConfig {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no config file, creating defaults");
            let config = ReminderConfig::default();
            if let Err(e) = self.save(&config) {
                warn!("Failed to write default config: {:#}", e);
            }
            return config;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.path.display(), "Failed to read config file: {}", e);
                return ReminderConfig::default();
            }
        };

        let Normalized { config, rewrite } = normalize(ParsedConfig::parse(&content));
        if rewrite {
            if let Err(e) = self.save(&config) {
                warn!("Failed to rewrite config file: {:#}", e);
            }
        }

        debug!(
            auto_start = config.auto_start,
            minimize = config.minimize_to_tray_on_start,
            theme = config.theme.as_str(),
            messages = config.messages.len(),
            "config loaded"
        );
        config
    }

    /// Refuses to write a config that would not load back as-is.
    pub fn save(&self, config: &ReminderConfig) -> Result<()> {
        config.validate()?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(&StoredConfig::from(config))
            .context("Failed to serialize config")?;

        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write config file {}", self.path.display()))?;

        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

fn parse_positive(field: &'static str, input: &str) -> Result<u32, ConfigError> {
    let trimmed = input.trim();
    let value: i64 = trimmed.parse().map_err(|_| ConfigError::NotANumber {
        field,
        input: input.to_string(),
    })?;
    if value <= 0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    u32::try_from(value).map_err(|_| ConfigError::NotANumber {
        field,
        input: input.to_string(),
    })
}

/// Start-time validation of the interval field.
pub fn parse_interval_minutes(input: &str) -> Result<u32, ConfigError> {
    parse_positive("reminder interval", input)
}

/// Background-safe variant: bad input becomes the default.
pub fn coerce_interval_minutes(input: &str) -> u32 {
    parse_interval_minutes(input).unwrap_or_else(|e| {
        warn!("{}; using {} minutes", e, DEFAULT_INTERVAL_MINUTES);
        DEFAULT_INTERVAL_MINUTES
    })
}

pub fn coerce_countdown_seconds(input: &str) -> u32 {
    parse_positive("hold duration", input).unwrap_or_else(|e| {
        warn!("{}; using {} seconds", e, DEFAULT_COUNTDOWN_SECONDS);
        DEFAULT_COUNTDOWN_SECONDS
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("config.json"))
    }

    fn read_json(store: &ConfigStore) -> Value {
        let content = fs::read_to_string(store.path()).expect("config file");
        serde_json::from_str(&content).expect("json")
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let config = ReminderConfig {
            messages: vec!["hold".to_string(), "提一提 🍑".to_string()],
            interval_minutes: 25,
            countdown_seconds: 30,
            auto_start: true,
            minimize_to_tray_on_start: true,
            theme: ThemeMode::Light,
        };

        store.save(&config).unwrap();
        let loaded = store.load();

        assert_eq!(loaded, config);
    }

    #[test]
    fn saved_file_uses_documented_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&ReminderConfig::default()).unwrap();

        let json = read_json(&store);
        assert!(json["messages"].is_array());
        assert_eq!(json["auto_start"], Value::Bool(false));
        assert_eq!(json["minimize_to_tray_on_start"], Value::Bool(false));
        assert_eq!(json["theme"], Value::String("dark".to_string()));
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("nested").join("config.json"));

        let config = store.load();

        assert_eq!(config, ReminderConfig::default());
        assert!(store.path().exists());
    }

    #[test]
    fn legacy_array_loads_and_is_upgraded_in_place() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"["stand up", "hold it"]"#).unwrap();

        let config = store.load();

        assert_eq!(config.messages, vec!["stand up", "hold it"]);
        assert!(!config.auto_start);
        assert!(!config.minimize_to_tray_on_start);
        assert_eq!(config.theme, ThemeMode::Dark);
        assert_eq!(config.interval_minutes, DEFAULT_INTERVAL_MINUTES);

        let json = read_json(&store);
        assert!(json.is_object());
        assert_eq!(json["messages"][1], Value::String("hold it".to_string()));
    }

    #[test]
    fn malformed_file_is_overwritten_with_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();

        let config = store.load();

        assert_eq!(config, ReminderConfig::default());
        let rewritten = fs::read_to_string(store.path()).unwrap();
        assert!(matches!(ParsedConfig::parse(&rewritten), ParsedConfig::Current(_)));
    }

    #[test]
    fn empty_file_is_overwritten_with_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "   \n").unwrap();

        assert_eq!(store.load(), ReminderConfig::default());
        assert!(read_json(&store).is_object());
    }

    #[test]
    fn object_without_messages_keeps_flags_and_uses_default_messages() {
        let normalized = normalize(ParsedConfig::parse(
            r#"{"auto_start": true, "theme": "light"}"#,
        ));

        assert!(!normalized.rewrite);
        assert_eq!(normalized.config.messages, default_messages());
        assert!(normalized.config.auto_start);
        assert_eq!(normalized.config.theme, ThemeMode::Light);
    }

    #[test]
    fn empty_message_list_resets_everything() {
        let normalized = normalize(ParsedConfig::parse(
            r#"{"messages": ["  ", ""], "auto_start": true}"#,
        ));

        assert!(normalized.rewrite);
        assert_eq!(normalized.config, ReminderConfig::default());
    }

    #[test]
    fn unknown_theme_and_bad_numbers_fall_back() {
        let normalized = normalize(ParsedConfig::parse(
            r#"{"messages": ["a"], "theme": "sepia", "interval_minutes": 0, "countdown_seconds": -3}"#,
        ));

        assert_eq!(normalized.config.theme, ThemeMode::Dark);
        assert_eq!(normalized.config.interval_minutes, DEFAULT_INTERVAL_MINUTES);
        assert_eq!(normalized.config.countdown_seconds, DEFAULT_COUNTDOWN_SECONDS);
    }

    #[test]
    fn scalar_document_is_invalid() {
        assert!(matches!(ParsedConfig::parse("42"), ParsedConfig::Invalid(_)));
        assert!(matches!(ParsedConfig::parse("[1, 2]"), ParsedConfig::Invalid(_)));
    }

    #[test]
    fn interval_validation_rejects_bad_input() {
        for input in ["0", "-5", "abc", "", "1.5", "   "] {
            assert!(parse_interval_minutes(input).is_err(), "{input:?} should be rejected");
        }
        assert_eq!(
            parse_interval_minutes("-5"),
            Err(ConfigError::NonPositive {
                field: "reminder interval",
                value: -5
            })
        );
        assert_eq!(parse_interval_minutes(" 45 "), Ok(45));
    }

    #[test]
    fn coercion_uses_defaults() {
        assert_eq!(coerce_interval_minutes("nope"), DEFAULT_INTERVAL_MINUTES);
        assert_eq!(coerce_interval_minutes("15"), 15);
        assert_eq!(coerce_countdown_seconds("0"), DEFAULT_COUNTDOWN_SECONDS);
        assert_eq!(coerce_countdown_seconds("10"), 10);
    }

    #[test]
    fn validate_catches_empty_messages() {
        let config = ReminderConfig {
            messages: vec![" ".to_string()],
            ..ReminderConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyMessages));
        assert!(ReminderConfig::default().validate().is_ok());
    }

    #[test]
    fn save_refuses_invalid_config_and_keeps_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&ReminderConfig::default()).unwrap();

        let broken = ReminderConfig {
            messages: Vec::new(),
            ..ReminderConfig::default()
        };
        let err = store.save(&broken).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::EmptyMessages)
        );
        assert_eq!(store.load(), ReminderConfig::default());
    }
}
