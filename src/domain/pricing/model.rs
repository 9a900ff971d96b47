//! Price model and unit selection

use chrono::Duration;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::{DomainError, DomainResult};

/// Billing unit. The numeric ids are stable and stored in the price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BillingUnit {
    Hour,
    Day,
    Week,
    Month,
}

impl BillingUnit {
    pub const ALL: [BillingUnit; 4] = [Self::Hour, Self::Day, Self::Week, Self::Month];

    pub fn id(&self) -> i32 {
        match self {
            Self::Hour => 1,
            Self::Day => 2,
            Self::Week => 3,
            Self::Month => 4,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.id() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" | "hours" => Some(Self::Hour),
            "day" | "days" => Some(Self::Day),
            "week" | "weeks" => Some(Self::Week),
            "month" | "months" => Some(Self::Month),
            _ => None,
        }
    }

    /// Length of one unit. A month is billed as 30 days.
    pub fn span(&self) -> Duration {
        match self {
            Self::Hour => Duration::hours(1),
            Self::Day => Duration::days(1),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
        }
    }

    /// Largest count this unit is ever billed with before the next tier
    /// takes over.
    fn max_count(&self) -> Option<u32> {
        match self {
            Self::Hour => Some(24),
            Self::Day => Some(7),
            Self::Week => Some(5),
            Self::Month => None,
        }
    }

    fn next(&self) -> Option<Self> {
        match self {
            Self::Hour => Some(Self::Day),
            Self::Day => Some(Self::Week),
            Self::Week => Some(Self::Month),
            Self::Month => None,
        }
    }
}

impl std::fmt::Display for BillingUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the billing unit for a duration and how many of them to charge.
///
/// `d < 24h` bills hours, `d < 7d` days, `d < 30d` weeks, anything longer
/// months. Counts round up on any remainder and are at least 1.
pub fn best_unit_and_count(duration: Duration) -> (BillingUnit, u32) {
    let unit = if duration < Duration::days(1) {
        BillingUnit::Hour
    } else if duration < Duration::days(7) {
        BillingUnit::Day
    } else if duration < Duration::days(30) {
        BillingUnit::Week
    } else {
        BillingUnit::Month
    };

    let secs = duration.num_seconds().max(0);
    let unit_secs = unit.span().num_seconds();
    let mut count = secs / unit_secs;
    if secs % unit_secs != 0 {
        count += 1;
    }

    (unit, count.max(1) as u32)
}

/// Configured price for one (vehicle type, unit) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceEntry {
    pub vehicle_type_id: i32,
    pub unit: BillingUnit,
    pub price: Decimal,
}

impl PriceEntry {
    pub fn new(vehicle_type_id: i32, unit: BillingUnit, price: Decimal) -> DomainResult<Self> {
        if price.is_sign_negative() {
            return Err(DomainError::invalid("price", "must not be negative"));
        }
        Ok(Self {
            vehicle_type_id,
            unit,
            price,
        })
    }
}

/// Computed price for a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub vehicle_type_id: i32,
    pub unit: BillingUnit,
    pub count: u32,
    pub unit_price: Decimal,
    /// `count × unit_price`, truncated toward zero to one decimal place.
    pub total: Decimal,
}

impl PriceQuote {
    pub fn new(entry: &PriceEntry, count: u32) -> Self {
        let total = (Decimal::from(count) * entry.price)
            .round_dp_with_strategy(1, RoundingStrategy::ToZero);
        Self {
            vehicle_type_id: entry.vehicle_type_id,
            unit: entry.unit,
            count,
            unit_price: entry.price,
            total,
        }
    }
}

/// Unit pairs where a longer window would be cheaper than a shorter one.
///
/// A table is monotonic when the most expensive count of each unit never
/// exceeds one unit of the next tier (24 hours ≤ 1 day, 7 days ≤ 1 week,
/// 5 weeks ≤ 1 month).
pub fn tier_violations(prices: &[PriceEntry]) -> Vec<(BillingUnit, BillingUnit)> {
    let price_of = |unit: BillingUnit| prices.iter().find(|p| p.unit == unit).map(|p| p.price);

    BillingUnit::ALL
        .into_iter()
        .filter_map(|unit| {
            let next = unit.next()?;
            let max = unit.max_count()?;
            let (lower, upper) = (price_of(unit)?, price_of(next)?);
            (lower * Decimal::from(max) > upper).then_some((unit, next))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(unit: BillingUnit, price: i64) -> PriceEntry {
        PriceEntry::new(1, unit, Decimal::new(price, 0)).unwrap()
    }

    #[test]
    fn unit_boundaries() {
        assert_eq!(best_unit_and_count(Duration::minutes(10)), (BillingUnit::Hour, 1));
        assert_eq!(best_unit_and_count(Duration::hours(23)), (BillingUnit::Hour, 23));
        assert_eq!(
            best_unit_and_count(Duration::hours(24) - Duration::seconds(1)),
            (BillingUnit::Hour, 24)
        );
        assert_eq!(best_unit_and_count(Duration::hours(24)), (BillingUnit::Day, 1));
        assert_eq!(best_unit_and_count(Duration::hours(25)), (BillingUnit::Day, 2));
        assert_eq!(best_unit_and_count(Duration::days(7)), (BillingUnit::Week, 1));
        assert_eq!(best_unit_and_count(Duration::days(8)), (BillingUnit::Week, 2));
        assert_eq!(
            best_unit_and_count(Duration::days(30) - Duration::seconds(1)),
            (BillingUnit::Week, 5)
        );
        assert_eq!(best_unit_and_count(Duration::days(30)), (BillingUnit::Month, 1));
        assert_eq!(best_unit_and_count(Duration::days(61)), (BillingUnit::Month, 3));
    }

    #[test]
    fn zero_duration_still_bills_one_hour() {
        assert_eq!(best_unit_and_count(Duration::zero()), (BillingUnit::Hour, 1));
    }

    #[test]
    fn two_and_a_half_hours_at_five() {
        let (unit, count) = best_unit_and_count(Duration::minutes(150));
        assert_eq!((unit, count), (BillingUnit::Hour, 3));
        let quote = PriceQuote::new(&entry(BillingUnit::Hour, 5), count);
        assert_eq!(quote.total, Decimal::new(150, 1));
    }

    #[test]
    fn total_truncates_to_one_decimal() {
        let e = PriceEntry::new(1, BillingUnit::Day, Decimal::new(1_999, 3)).unwrap();
        let quote = PriceQuote::new(&e, 3);
        // 3 × 1.999 = 5.997
        assert_eq!(quote.total, Decimal::new(59, 1));
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(PriceEntry::new(1, BillingUnit::Hour, Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn unit_ids_and_names_round_trip() {
        for unit in BillingUnit::ALL {
            assert_eq!(BillingUnit::from_id(unit.id()), Some(unit));
            assert_eq!(BillingUnit::parse(&unit.as_str().to_uppercase()), Some(unit));
        }
        assert_eq!(BillingUnit::from_id(9), None);
    }

    #[test]
    fn detects_incoherent_tiers() {
        let coherent = vec![
            entry(BillingUnit::Hour, 5),
            entry(BillingUnit::Day, 120),
            entry(BillingUnit::Week, 840),
            entry(BillingUnit::Month, 4200),
        ];
        assert!(tier_violations(&coherent).is_empty());

        let discounted = vec![entry(BillingUnit::Hour, 5), entry(BillingUnit::Day, 30)];
        assert_eq!(
            tier_violations(&discounted),
            vec![(BillingUnit::Hour, BillingUnit::Day)]
        );
    }

    #[test]
    fn coherent_table_is_monotonic() {
        let table = [
            entry(BillingUnit::Hour, 5),
            entry(BillingUnit::Day, 120),
            entry(BillingUnit::Week, 840),
            entry(BillingUnit::Month, 4200),
        ];
        let price = |d: Duration| {
            let (unit, count) = best_unit_and_count(d);
            let e = table.iter().find(|p| p.unit == unit).unwrap();
            PriceQuote::new(e, count).total
        };

        let mut previous = Decimal::ZERO;
        let mut d = Duration::minutes(30);
        while d <= Duration::days(70) {
            let current = price(d);
            assert!(current >= previous, "price dropped at {d}");
            previous = current;
            d = d + Duration::minutes(30);
        }
    }
}
