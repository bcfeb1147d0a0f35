use std::{fs, path::Path, time::Duration};

use shared::domain::GuildId;
use tracing::warn;

use crate::{
    error::{DashboardError, Result},
    events::DEFAULT_LEADERBOARD_LIMIT,
    status::DEFAULT_POLL_INTERVAL,
};

pub const SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub dashboard_url: String,
    pub status_poll_interval: Duration,
    /// Used when `/api/config` cannot be reached.
    pub fallback_guild_id: Option<GuildId>,
    pub leaderboard_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dashboard_url: "http://127.0.0.1:8000".into(),
            status_poll_interval: DEFAULT_POLL_INTERVAL,
            fallback_guild_id: None,
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then `path` if it exists, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Err(err) = settings.apply_file(&raw) {
            warn!(path = %path.display(), error = %err, "ignoring settings file");
        }
    }

    settings.apply_env(env);
    settings
}

impl Settings {
    fn apply_file(&mut self, raw: &str) -> Result<()> {
        let table: toml::Table =
            toml::from_str(raw).map_err(|err| DashboardError::Config(err.to_string()))?;

        for (key, value) in &table {
            let value = match value {
                toml::Value::String(text) => text.clone(),
                toml::Value::Integer(number) => number.to_string(),
                other => {
                    warn!(key = %key, value = %other, "unsupported settings value");
                    continue;
                }
            };
            self.apply(key, &value);
        }
        Ok(())
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        let overrides = [
            ("DASHBOARD_URL", "dashboard_url"),
            ("APP__DASHBOARD_URL", "dashboard_url"),
            ("DASHBOARD_POLL_INTERVAL_MS", "poll_interval_ms"),
            ("GUILD_ID", "guild_id"),
            ("APP__GUILD_ID", "guild_id"),
            ("DASHBOARD_LEADERBOARD_LIMIT", "leaderboard_limit"),
        ];
        for (var, key) in overrides {
            if let Some(value) = env(var) {
                self.apply(key, &value);
            }
        }
    }

    fn apply(&mut self, key: &str, value: &str) {
        let value = value.trim();
        match key {
            "dashboard_url" if !value.is_empty() => {
                self.dashboard_url = value.trim_end_matches('/').to_string();
            }
            "poll_interval_ms" => match value.parse::<u64>() {
                Ok(ms) if ms > 0 => self.status_poll_interval = Duration::from_millis(ms),
                _ => warn!(value, "ignoring invalid poll interval"),
            },
            "guild_id" => match value.parse::<u64>() {
                Ok(0) | Err(_) => warn!(value, "ignoring invalid fallback guild id"),
                Ok(id) => self.fallback_guild_id = Some(GuildId::from(id)),
            },
            "leaderboard_limit" => match value.parse::<u32>() {
                Ok(limit) if limit > 0 => self.leaderboard_limit = limit,
                _ => warn!(value, "ignoring invalid leaderboard limit"),
            },
            _ => warn!(key, "unknown settings key"),
        }
    }
}
