use anyhow::Result;
use chrono::NaiveTime;
use serde::Deserialize;
use std::fs;
use url::Url;

use crate::error::BlogError;

pub const DEFAULT_CATALOG_URL: &str = "https://docs.google.com/spreadsheets/d/1BDcm92RBg6Wnh63XlN5ktkOWz9tUQ1ZRAjJhouCaUos/export?format=csv&gid=0";
pub const DEFAULT_DATABASE_URL: &str =
    "https://docs.google.com/spreadsheets/d/1BDcm92RBg6Wnh63XlN5ktkOWz9tUQ1ZRAjJhouCaUos/edit?gid=0#gid=0";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog_url: String,
    pub output_dir: String,
    pub ledger_path: String,
    pub site: SiteConfig,
    pub backend: Option<BackendConfig>,
    pub publish: PublishConfig,
    pub schedule: ScheduleConfig,
    pub cron: CronConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub url: String,
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub weekday: Vec<String>,
    pub weekend: Vec<String>,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CronConfig {
    pub project_dir: String,
    pub command: String,
    pub script_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            output_dir: "generated_posts".to_string(),
            ledger_path: "generated_posts/posts.db".to_string(),
            site: SiteConfig::default(),
            backend: None,
            publish: PublishConfig::default(),
            schedule: ScheduleConfig::default(),
            cron: CronConfig::default(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "AcePlan".to_string(),
            url: "https://aceplan.me".to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/articles/publish".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            weekday: vec!["09:00".into(), "17:00".into()],
            weekend: vec!["09:00".into(), "12:00".into(), "15:00".into(), "19:00".into()],
            poll_interval_secs: 60,
        }
    }
}

impl Default for CronConfig {
    fn default() -> Self {
        Self {
            project_dir: ".".to_string(),
            command: "racket_blog".to_string(),
            script_dir: ".".to_string(),
        }
    }
}

/// Loads the JSON config at `path`, or the built-in defaults when no path is given.
pub fn load(path: Option<&str>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| BlogError::Config(format!("cannot read {}: {}", path, e)))?;
            serde_json::from_str::<Config>(&text)
                .map_err(|e| BlogError::Config(format!("cannot parse {}: {}", path, e)))?
        }
        None => Config::default(),
    };

    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        check_url("catalog_url", &self.catalog_url)?;
        check_url("publish.endpoint", &self.publish.endpoint)?;
        check_url("site.url", &self.site.url)?;
        if let Some(backend) = &self.backend {
            check_url("backend.url", &backend.url)?;
        }

        for time in self.schedule.weekday.iter().chain(&self.schedule.weekend) {
            parse_time(time)?;
        }

        if self.schedule.poll_interval_secs == 0 {
            return Err(BlogError::Config("schedule.poll_interval_secs must be positive".into()).into());
        }

        Ok(())
    }
}

pub fn parse_time(text: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M")
        .map_err(|_| BlogError::Config(format!("invalid time of day {:?}, expected HH:MM", text)).into())
}

fn check_url(field: &str, value: &str) -> Result<()> {
    Url::parse(value).map_err(|e| BlogError::Config(format!("{} is not a valid URL ({}): {}", field, value, e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = load(None).unwrap();
        assert_eq!(config.output_dir, "generated_posts");
        assert!(config.backend.is_none());
        assert_eq!(config.publish.timeout_secs, 30);
        assert_eq!(config.schedule.weekend.len(), 4);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"output_dir": "out", "backend": {{"url": "http://localhost:11434", "model": "orca-mini"}}}}"#
        )
        .unwrap();

        let config = load(file.path().to_str()).unwrap();
        assert_eq!(config.output_dir, "out");
        assert_eq!(config.backend.unwrap().model, "orca-mini");
        assert_eq!(config.schedule.weekday, vec!["09:00", "17:00"]);
    }

    #[test]
    fn bad_time_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"schedule": {{"weekday": ["9 o'clock"]}}}}"#).unwrap();

        let err = load(file.path().to_str()).unwrap_err();
        assert!(matches!(err.downcast_ref::<BlogError>(), Some(BlogError::Config(_))));
    }

    #[test]
    fn bad_endpoint_is_config_error() {
        let config = Config {
            publish: PublishConfig {
                endpoint: "not a url".into(),
                timeout_secs: 30,
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
