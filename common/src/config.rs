// Configuration management with layered configuration (file, env)

use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub bot: BotConfig,
    pub schedule: ScheduleFileConfig,
    pub reminder: ReminderConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Telegram bot token. Empty means "not configured" and stops startup.
    pub token: String,
    /// Single timezone every schedule and reminder is interpreted in.
    pub timezone: Tz,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            timezone: chrono_tz::Asia::Irkutsk,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleFileConfig {
    pub path: String,
}

impl Default for ScheduleFileConfig {
    fn default() -> Self {
        Self {
            path: "schedule.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// How long before a lecture the reminder fires.
    pub lead_minutes: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self { lead_minutes: 15 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment-specific configuration
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let mut settings: Settings = config.try_deserialize()?;

        // Deployment convention carried over from the original bot: a bare
        // BOT_TOKEN variable wins over anything in the files.
        if let Ok(token) = std::env::var("BOT_TOKEN") {
            if !token.trim().is_empty() {
                settings.bot.token = token;
            }
        }

        Ok(settings)
    }

    /// Validate configuration settings. The token is deliberately not
    /// checked here: an empty token is handled by the startup gate with a
    /// setup message instead of a validation failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.schedule.path.is_empty() {
            return Err("Schedule file path cannot be empty".to_string());
        }

        if self.reminder.lead_minutes == 0 {
            return Err("Reminder lead_minutes must be greater than 0".to_string());
        }
        if self.reminder.lead_minutes >= 24 * 60 {
            return Err("Reminder lead_minutes must be shorter than a day".to_string());
        }

        if self.observability.log_level.is_empty() {
            return Err("Log level cannot be empty".to_string());
        }

        Ok(())
    }
}
