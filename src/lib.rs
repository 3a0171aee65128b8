pub mod app_state;
pub mod cli;
pub mod configuration;
pub mod data_models;
pub mod db;
pub mod errors;
pub mod evaluator;
pub mod notify;
pub mod parser;
pub mod scheduler;
pub mod telemetry;

use crate::app_state::AppState;
use crate::configuration::Settings;
use crate::errors::AppErrors;

pub async fn create_app(settings: Settings) -> Result<AppState, AppErrors> {
    AppState::init(settings).await
}
