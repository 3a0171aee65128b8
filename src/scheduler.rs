use crate::db::{Database, TrackedProduct, User};
use crate::errors::AppErrors;
use crate::evaluator::ThresholdEvaluator;
use crate::notify::{NotifyError, PriceAlert};
use crate::parser::PriceSource;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Fetch,
    InvalidRecipient,
    Delivery,
    Store,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Fetch => write!(f, "fetch"),
            FailureKind::InvalidRecipient => write!(f, "recipient"),
            FailureKind::Delivery => write!(f, "delivery"),
            FailureKind::Store => write!(f, "store"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFailure {
    pub product_id: Uuid,
    pub product_name: String,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub checked: usize,
    pub alerts_sent: usize,
    pub failures: Vec<ProductFailure>,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "checked {} product(s), sent {} alert(s), {} failure(s)",
            self.checked,
            self.alerts_sent,
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(
                f,
                "\n  - {} [{}]: {}",
                failure.product_name, failure.kind, failure.message
            )?;
        }
        Ok(())
    }
}

/// Clears the running flag whatever way the run ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One run: load monitored products, fetch, evaluate, notify, write back.
#[derive(Debug)]
pub struct Scheduler {
    db: Arc<Database>,
    source: Arc<dyn PriceSource>,
    dispatcher: PriceAlert,
    evaluator: ThresholdEvaluator,
    workers: usize,
    running: AtomicBool,
}

impl Scheduler {
    pub fn new(
        db: Arc<Database>,
        source: Arc<dyn PriceSource>,
        dispatcher: PriceAlert,
        workers: usize,
    ) -> Self {
        Self {
            db,
            source,
            dispatcher,
            evaluator: ThresholdEvaluator,
            workers: workers.max(1),
            running: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.running.load(Ordering::SeqCst) {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    pub async fn run_once(&self) -> Result<RunSummary, AppErrors> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppErrors::RunInProgress);
        }
        let _guard = RunGuard(&self.running);

        let products = self.db.monitored_products().await?;
        info!(products = products.len(), workers = self.workers, "starting price check");
        let outcomes = stream::iter(products)
            .map(|(user, product)| self.check_product(user, product))
            .buffer_unordered(self.workers)
            .collect::<Vec<_>>()
            .await;

        let mut summary = RunSummary::default();
        for outcome in outcomes {
            summary.checked += 1;
            if outcome.alert_sent {
                summary.alerts_sent += 1;
            }
            summary.failures.extend(outcome.failures);
        }
        info!(
            checked = summary.checked,
            alerts_sent = summary.alerts_sent,
            failures = summary.failures.len(),
            "price check finished"
        );
        Ok(summary)
    }

    /// Runs forever, starting a new run every `period`.
    /// A run still going when the next tick comes is skipped.
    pub async fn run_every<F>(&self, period: Duration, mut report: F)
    where
        F: FnMut(&RunSummary),
    {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match self.run_once().await {
                Ok(summary) => report(&summary),
                Err(AppErrors::RunInProgress) => warn!("previous run still in progress, skipping"),
                Err(e) => error!("price check failed: {}", e),
            }
        }
    }

    async fn check_product(&self, user: User, mut product: TrackedProduct) -> ProductOutcome {
        let mut outcome = ProductOutcome::default();
        let reading = self.source.fetch_price(&product).await;
        let event = match self.evaluator.evaluate(&mut product, reading, Utc::now()) {
            Ok(event) => event,
            Err(e) => {
                outcome.failures.push(failure(&product, FailureKind::Fetch, e.to_string()));
                return outcome;
            }
        };

        if let Some(event) = event {
            match self.dispatcher.send_alert(&user, &event).await {
                Ok(()) => outcome.alert_sent = true,
                Err(e) => {
                    // not delivered, so the next run tries again
                    product.alert_armed = true;
                    let kind = match e {
                        NotifyError::InvalidRecipient(_) => FailureKind::InvalidRecipient,
                        NotifyError::DeliveryFailed { .. } => FailureKind::Delivery,
                    };
                    outcome.failures.push(failure(&product, kind, e.to_string()));
                }
            }
        }

        if let Err(e) = self.db.save_product(&product).await {
            if outcome.alert_sent {
                warn!(
                    product = %product.name,
                    "alert was sent but not recorded, the next run may send it again"
                );
            }
            outcome.failures.push(failure(&product, FailureKind::Store, e.to_string()));
        }
        outcome
    }
}

/// What happened to one product during a run.
#[derive(Debug, Default)]
struct ProductOutcome {
    alert_sent: bool,
    failures: Vec<ProductFailure>,
}

fn failure(product: &TrackedProduct, kind: FailureKind, message: String) -> ProductFailure {
    warn!(product = %product.name, url = %product.url, kind = %kind, "{}", message);
    ProductFailure {
        product_id: product.id,
        product_name: product.name.to_string(),
        kind,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_failures() {
        let summary = RunSummary {
            checked: 3,
            alerts_sent: 1,
            failures: vec![ProductFailure {
                product_id: Uuid::new_v4(),
                product_name: "Kettle".to_string(),
                kind: FailureKind::Fetch,
                message: "no price found on https://example.com".to_string(),
            }],
        };
        let expected = concat!(
            "checked 3 product(s), sent 1 alert(s), 1 failure(s)\n",
            "  - Kettle [fetch]: no price found on https://example.com"
        );
        assert_eq!(summary.to_string(), expected);
    }

    #[test]
    fn empty_summary_is_one_line() {
        assert_eq!(
            RunSummary::default().to_string(),
            "checked 0 product(s), sent 0 alert(s), 0 failure(s)"
        );
    }
}
