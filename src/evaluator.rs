use crate::data_models::AlertEvent;
use crate::db::TrackedProduct;
use crate::parser::FetchError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Decides whether a price reading turns into an alert.
///
/// A product fires once when its price reaches the threshold and stays quiet
/// until a reading above the threshold arms it again.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThresholdEvaluator;

impl ThresholdEvaluator {
    pub fn evaluate(
        &self,
        product: &mut TrackedProduct,
        reading: Result<Decimal, FetchError>,
        now: DateTime<Utc>,
    ) -> Result<Option<AlertEvent>, FetchError> {
        let price = reading?;
        product.record_price(price, now);
        if price > product.threshold {
            product.alert_armed = true;
            return Ok(None);
        }
        if !product.alert_armed {
            return Ok(None);
        }
        product.alert_armed = false;
        Ok(Some(AlertEvent::new(product, price, now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn product(threshold: Decimal) -> TrackedProduct {
        TrackedProduct::dummy(Uuid::new_v4(), "https://example.com/kettle", threshold)
    }

    #[test]
    fn price_below_threshold_fires() {
        let mut product = product(Decimal::new(4000, 2));
        let now = Utc::now();
        let event = ThresholdEvaluator
            .evaluate(&mut product, Ok(Decimal::new(3999, 2)), now)
            .expect("Failed to evaluate")
            .expect("No event produced");
        assert_eq!(event.product_id, product.id);
        assert_eq!(event.price, Decimal::new(3999, 2));
        assert_eq!(event.threshold, Decimal::new(4000, 2));
        assert_eq!(event.triggered_at, now);
        assert!(!product.alert_armed);
    }

    #[test]
    fn price_at_threshold_fires() {
        let mut product = product(Decimal::new(4000, 2));
        let event = ThresholdEvaluator
            .evaluate(&mut product, Ok(Decimal::new(40, 0)), Utc::now())
            .expect("Failed to evaluate");
        assert!(event.is_some());
    }

    #[test]
    fn price_above_threshold_is_quiet() {
        let mut product = product(Decimal::new(4000, 2));
        let now = Utc::now();
        let event = ThresholdEvaluator
            .evaluate(&mut product, Ok(Decimal::new(4001, 2)), now)
            .expect("Failed to evaluate");
        assert!(event.is_none());
        assert_eq!(product.last_price, Some(Decimal::new(4001, 2)));
        assert_eq!(product.last_checked, Some(now));
        assert!(product.alert_armed);
    }

    #[test]
    fn repeated_low_readings_fire_once() {
        let mut product = product(Decimal::new(40, 0));
        let events = (0..5)
            .filter_map(|_| {
                ThresholdEvaluator
                    .evaluate(&mut product, Ok(Decimal::new(30, 0)), Utc::now())
                    .expect("Failed to evaluate")
            })
            .count();
        assert_eq!(events, 1);
    }

    #[test]
    fn rising_price_rearms() {
        let mut product = product(Decimal::new(40, 0));
        let evaluator = ThresholdEvaluator;
        let readings = [30, 50, 35, 35];
        let fired: Vec<bool> = readings
            .iter()
            .map(|price| {
                evaluator
                    .evaluate(&mut product, Ok(Decimal::new(*price, 0)), Utc::now())
                    .expect("Failed to evaluate")
                    .is_some()
            })
            .collect();
        assert_eq!(fired, vec![true, false, true, false]);
    }

    #[test]
    fn failed_reading_leaves_product_untouched() {
        let mut product = product(Decimal::new(40, 0));
        let before = product.clone();
        let result = ThresholdEvaluator.evaluate(
            &mut product,
            Err(FetchError::PriceNotFound("https://example.com/kettle".to_string())),
            Utc::now(),
        );
        assert!(matches!(result, Err(FetchError::PriceNotFound(_))));
        assert_eq!(product, before);
    }
}
