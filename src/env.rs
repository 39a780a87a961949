use std::path::Path;

use tracing::{info, warn};

const DEFAULT_DATABASE_URL: &str = "sqlite://dojo.db?mode=rwc";
const DEFAULT_SESSION_HOURS: i64 = 1;

/// Process configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub cookie_domain: Option<String>,
    pub session_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            cookie_domain: None,
            session_hours: DEFAULT_SESSION_HOURS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = dotenvy::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let cookie_domain = dotenvy::var("COOKIE_DOMAIN")
            .ok()
            .map(|domain| domain.trim().to_string())
            .filter(|domain| !domain.is_empty());

        let session_hours = match dotenvy::var("SESSION_HOURS") {
            Ok(raw) => match raw.trim().parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    warn!(value = %raw, "Ignoring invalid SESSION_HOURS");
                    DEFAULT_SESSION_HOURS
                }
            },
            Err(_) => DEFAULT_SESSION_HOURS,
        };

        Self {
            database_url,
            cookie_domain,
            session_hours,
        }
    }
}

pub fn load_environment() -> Result<(), Box<dyn std::error::Error>> {
    let is_production =
        dotenvy::var("ROCKET_PROFILE").unwrap_or("development".to_string()) == "production";

    let env_files = if is_production {
        vec!["config/common.env", "config/prod.env", ".secrets.env"]
    } else {
        vec!["config/common.env", "config/dev.env", ".secrets.env"]
    };

    for env_file in env_files {
        load_env_file(env_file)?;
    }

    Ok(())
}

fn load_env_file(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !Path::new(path).exists() {
        warn!("Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path)?;
    info!("Loaded environment from: {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_apply_when_unset() {
        temp_env::with_vars_unset(["DATABASE_URL", "COOKIE_DOMAIN", "SESSION_HOURS"], || {
            assert_eq!(Config::from_env(), Config::default());
        });
    }

    #[test]
    #[serial]
    fn reads_values_from_environment() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("sqlite::memory:")),
                ("COOKIE_DOMAIN", Some("dojo.example.com")),
                ("SESSION_HOURS", Some("8")),
            ],
            || {
                let config = Config::from_env();
                assert_eq!(config.database_url, "sqlite::memory:");
                assert_eq!(config.cookie_domain.as_deref(), Some("dojo.example.com"));
                assert_eq!(config.session_hours, 8);
            },
        );
    }

    #[test]
    #[serial]
    fn invalid_session_hours_fall_back() {
        temp_env::with_vars(
            [("SESSION_HOURS", Some("never")), ("COOKIE_DOMAIN", Some("  "))],
            || {
                let config = Config::from_env();
                assert_eq!(config.session_hours, DEFAULT_SESSION_HOURS);
                assert_eq!(config.cookie_domain, None);
            },
        );
    }
}
