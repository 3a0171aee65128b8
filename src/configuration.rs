use crate::data_models::Proxy;
use crate::errors::ConfigurationError;
use crate::notify::is_valid_email;
use crate::parser::SourceRules;
use config::{Config, FileFormat};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::env::var;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub mailjet: MailjetSettings,
    #[serde(default)]
    pub fetcher: FetcherSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DatabaseSettings {
    #[serde_as(as = "DisplayFromStr")]
    pub db_type: DatabaseType,
    pub file_path: Option<String>,
    pub url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatabaseType {
    #[default]
    InMemory,
    Relational,
}

impl Display for DatabaseType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseType::InMemory => write!(f, "in_memory"),
            DatabaseType::Relational => write!(f, "relational"),
        }
    }
}

impl FromStr for DatabaseType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relational" => Ok(DatabaseType::Relational),
            "in_memory" => Ok(DatabaseType::InMemory),
            &_ => Err(ConfigurationError::UnknownDatabaseType),
        }
    }
}

impl DatabaseSettings {
    pub fn check_if_valid(&self) -> Result<(), ConfigurationError> {
        match self.db_type {
            // no file means a volatile store, which is fine
            DatabaseType::InMemory => {
                if let Some(path) = &self.file_path {
                    let parent = Path::new(path)
                        .parent()
                        .filter(|dir| !dir.as_os_str().is_empty());
                    if let Some(dir) = parent {
                        if !dir.is_dir() {
                            return Err(ConfigurationError::DataDirectoryNotFound(
                                dir.display().to_string(),
                            ));
                        }
                    }
                }
            }
            DatabaseType::Relational => {
                if self.url.as_deref().map_or(true, str::is_empty) {
                    return Err(ConfigurationError::MissingDatabaseSettings);
                }
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MailjetSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    pub sender_email: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    #[serde(default = "default_mailjet_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_sender_name() -> String {
    "Price Alert".to_string()
}

fn default_mailjet_url() -> String {
    "https://api.mailjet.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl MailjetSettings {
    pub fn check_if_valid(&self) -> Result<(), ConfigurationError> {
        if self.api_key.is_empty() || self.api_secret.is_empty() {
            return Err(ConfigurationError::MissingMailjetCredentials);
        }
        is_valid_email(&self.sender_email)
            .map_err(|_| ConfigurationError::InvalidSender(self.sender_email.to_string()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FetcherSettings {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub proxies: Vec<Proxy>,
    #[serde(default)]
    pub sources: Vec<SourceRules>,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            proxies: vec![],
            sources: vec![],
        }
    }
}

impl FetcherSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_workers() -> usize {
    4
}

fn default_interval_secs() -> u64 {
    3600
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl SchedulerSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// The possible runtime environment for our application.
#[derive(Debug, Eq, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => Err(format!(
                "{other} is not a supported environment. Use either `dev` or `prod`."
            )),
        }
    }
}

pub fn get_env() -> Result<Environment, String> {
    var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "dev".into())
        .try_into()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let environment = get_env().map_err(config::ConfigError::Message)?;
    let second_source = format!("configuration/{}", environment.as_str());
    let settings = Config::builder()
        .add_source(config::File::new("configuration/base", FileFormat::Yaml))
        .add_source(config::File::new(&second_source, FileFormat::Yaml).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
