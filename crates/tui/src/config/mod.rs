use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use clap::Parser;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/finboard.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Selectable user emails; the first one is active at startup.
    pub users: Vec<String>,
    pub timezone: String,
    /// Platform labels offered before the ones the API reports.
    pub platforms: Vec<String>,
    pub export_dir: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            users: Vec::new(),
            timezone: "Asia/Bangkok".to_string(),
            platforms: [
                "K PLUS", "LINE Pay", "Shopee", "7-Eleven", "Grab", "GrabFood", "KBANK", "Manual",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            export_dir: PathBuf::from("exports"),
            log_file: PathBuf::from("finboard_tui.log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| AppError::Setting(format!("timezone {}: {err}", self.timezone)))
    }

    pub fn active_user(&self) -> Option<String> {
        self.users
            .iter()
            .map(|u| u.trim())
            .find(|u| !u.is_empty())
            .map(str::to_string)
    }
}

/// Wall clock in the configured zone. The period presets count from `today`.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    tz: Tz,
}

impl Clock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Parser)]
#[command(name = "finboard_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:8000).
    #[arg(long)]
    base_url: Option<String>,
    /// Active user email; repeat to offer several.
    #[arg(long = "user")]
    users: Vec<String>,
    /// Override timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Directory that receives CSV/JSON exports.
    #[arg(long)]
    export_dir: Option<PathBuf>,
    /// Log file path (the terminal belongs to the UI).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(
        config::Environment::with_prefix("FINBOARD_TUI")
            .list_separator(",")
            .with_list_parse_key("users")
            .with_list_parse_key("platforms")
            .try_parsing(true),
    );
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if !args.users.is_empty() {
        settings.users = args.users;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(export_dir) = args.export_dir {
        settings.export_dir = export_dir;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }

    settings.tz()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_api() {
        let config = AppConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.tz().unwrap(), chrono_tz::Asia::Bangkok);
        assert!(config.platforms.iter().any(|p| p == "Manual"));
        assert_eq!(config.active_user(), None);
    }

    #[test]
    fn first_non_blank_user_is_active() {
        let config = AppConfig {
            users: vec![" ".to_string(), "me@example.com".to_string()],
            ..AppConfig::default()
        };
        assert_eq!(config.active_user().as_deref(), Some("me@example.com"));
    }

    #[test]
    fn bad_timezone_is_rejected() {
        let config = AppConfig {
            timezone: "Mars/Olympus".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.tz(), Err(AppError::Setting(_))));
    }

    #[test]
    fn settings_parse_from_toml() {
        let raw = r#"
            base_url = "http://finance.local"
            users = ["a@example.com", "b@example.com"]
            timezone = "Europe/Rome"
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Rome);
    }
}
