use thiserror::Error;

#[derive(Error, Debug)]
pub enum DBError {
    #[error("relational store: {0}")]
    Relational(#[from] sea_orm::DbErr),
    #[error("in-memory store: {0}")]
    InMemoryError(#[from] InMemoryError),
    #[error("unknown product")]
    UnknownProduct,
    #[error("unknown user")]
    UnknownUser,
    #[error("stored id is not a uuid: {0}")]
    NotAnId(#[from] uuid::Error),
    #[error("stored price is not a decimal: {0}")]
    NotADecimal(#[from] rust_decimal::Error),
    #[error("stored record is corrupt: {0}")]
    CorruptRecord(String),
}

#[derive(Error, Debug)]
pub enum InMemoryError {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("failed to read with serde: {0}")]
    SerdeError(#[from] serde_json::error::Error),
    #[error("store lock was poisoned")]
    Poisoned,
}
