//! Pricing engine

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{
    best_unit_and_count, DomainError, DomainResult, PoolTopology, PriceQuote, RepositoryProvider,
    TimeWindow,
};

/// Validated price request.
#[derive(Debug, Clone, Copy)]
pub struct PriceQuery {
    pub window: TimeWindow,
    pub vehicle_type_id: i32,
}

impl PriceQuery {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        vehicle_type_id: i32,
    ) -> DomainResult<Self> {
        Ok(Self {
            window: TimeWindow::new(start, end)?,
            vehicle_type_id,
        })
    }
}

#[derive(Clone)]
pub struct PricingService {
    repos: Arc<dyn RepositoryProvider>,
    topology: Arc<PoolTopology>,
}

impl PricingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, topology: Arc<PoolTopology>) -> Self {
        Self { repos, topology }
    }

    pub async fn quote(&self, query: PriceQuery) -> DomainResult<PriceQuote> {
        self.topology.resolve_id(query.vehicle_type_id)?;
        self.quote_window(query.vehicle_type_id, query.window).await
    }

    /// Price for an already validated window.
    pub async fn quote_window(
        &self,
        vehicle_type_id: i32,
        window: TimeWindow,
    ) -> DomainResult<PriceQuote> {
        let (unit, count) = best_unit_and_count(window.duration());
        let entry = self
            .repos
            .catalog()
            .find_price(vehicle_type_id, unit)
            .await?
            .ok_or_else(|| DomainError::PriceNotConfigured {
                vehicle_type: vehicle_type_id.to_string(),
                unit: unit.to_string(),
            })?;
        Ok(PriceQuote::new(&entry, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::booking::test_support::{at, seeded};
    use crate::domain::BillingUnit;
    use chrono::Duration;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn two_and_a_half_hours_bills_three_hours() {
        let env = seeded(2).await;
        let start = at(10);
        let quote = env
            .pricing
            .quote(PriceQuery::new(start, start + Duration::minutes(150), 1).unwrap())
            .await
            .unwrap();
        assert_eq!(quote.unit, BillingUnit::Hour);
        assert_eq!(quote.count, 3);
        assert_eq!(quote.total, Decimal::new(150, 1));
    }

    #[tokio::test]
    async fn exact_tier_boundaries_bill_one_unit() {
        let env = seeded(2).await;
        let start = at(0);
        for (span, unit) in [
            (Duration::hours(24), BillingUnit::Day),
            (Duration::days(7), BillingUnit::Week),
            (Duration::days(30), BillingUnit::Month),
        ] {
            let quote = env
                .pricing
                .quote(PriceQuery::new(start, start + span, 1).unwrap())
                .await
                .unwrap();
            assert_eq!((quote.unit, quote.count), (unit, 1));
        }
    }

    #[tokio::test]
    async fn missing_price_entry_is_reported() {
        let env = seeded(2).await;
        env.store.catalog_store().remove_price(2, BillingUnit::Day);
        let start = at(0);
        let err = env
            .pricing
            .quote(PriceQuery::new(start, start + Duration::hours(30), 2).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PriceNotConfigured { .. }));
    }

    #[tokio::test]
    async fn unknown_vehicle_type_is_not_found() {
        let env = seeded(2).await;
        let err = env
            .pricing
            .quote(PriceQuery::new(at(1), at(2), 77).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
