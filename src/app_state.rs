use crate::configuration::Settings;
use crate::db::Database;
use crate::errors::AppErrors;
use crate::notify::PriceAlert;
use crate::parser::PriceParser;
use crate::scheduler::Scheduler;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
    pub db: Arc<Database>,
}

impl AppState {
    pub async fn init(settings: Settings) -> Result<Self, AppErrors> {
        let db = Database::try_from(&settings.database).await?;
        Ok(Self {
            settings,
            db: Arc::new(db),
        })
    }

    /// Wires the real fetcher and Mailjet into a scheduler. Fails early on unusable mail settings.
    pub fn scheduler(&self) -> Result<Scheduler, AppErrors> {
        self.settings.mailjet.check_if_valid()?;
        let source = PriceParser::new(self.settings.fetcher.clone());
        let dispatcher = PriceAlert::from_settings(&self.settings.mailjet);
        Ok(Scheduler::new(
            self.db.clone(),
            Arc::new(source),
            dispatcher,
            self.settings.scheduler.workers,
        ))
    }
}
