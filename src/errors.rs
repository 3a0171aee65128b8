use crate::db::DatabaseError;
use crate::notify::NotifyError;
use crate::parser::errors::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read configuration: {0}")]
    ConfigError(#[from] config::ConfigError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    AppErrors(#[from] AppErrors),
}

#[derive(Error, Debug)]
pub enum AppErrors {
    #[error("configuration error: {0}")]
    ConfigurationError(#[from] ConfigurationError),
    #[error("database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("fetch failure: {0}")]
    FetchFailure(#[from] FetchError),
    #[error(transparent)]
    NotifyError(#[from] NotifyError),
    #[error("invalid input: {0}")]
    ValidationError(#[from] ValidationError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("a scheduled run is already in progress")]
    RunInProgress,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("unknown database type")]
    UnknownDatabaseType,
    #[error("relational database needs a connection url")]
    MissingDatabaseSettings,
    #[error("directory for the data file not found: {0}")]
    DataDirectoryNotFound(String),
    #[error("mailjet api key and secret are required")]
    MissingMailjetCredentials,
    #[error("sender email '{0}' is not valid")]
    InvalidSender(String),
}

/// Malformed input coming from the dialogue shell.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("this cannot be empty")]
    Empty,
    #[error("'{0}' is not a valid http(s) link")]
    InvalidUrl(String),
    #[error("'{0}' is not a valid price")]
    InvalidPrice(String),
    #[error("a price cannot be negative")]
    NegativePrice,
    #[error("'{0}' is not a recognized currency, use a symbol like £ or a code like GBP")]
    UnknownCurrency(String),
    #[error("'{0}' is not one of the options")]
    UnknownChoice(String),
    #[error("please answer with y or n")]
    NotYesNo,
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("cron_job expects true or false, got '{0}'")]
    NotABool(String),
    #[error("{0}")]
    Fields(String),
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ValidationError::Fields(errors.to_string())
    }
}
