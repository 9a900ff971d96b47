//! Time windows, hourly slots and per-slot capacity

use chrono::{DateTime, Duration, Utc};

use crate::domain::{DomainError, DomainResult};

/// Width of one availability slot.
pub fn slot_width() -> Duration {
    Duration::hours(1)
}

/// Half-open interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        if end <= start {
            return Err(DomainError::invalid(
                "end_time",
                format!("must be after start_time ({})", start.to_rfc3339()),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Reject windows longer than `max`.
    pub fn ensure_at_most(&self, max: Duration) -> DomainResult<()> {
        if self.duration() > max {
            return Err(DomainError::invalid(
                "end_time",
                format!("window must not exceed {} days", max.num_days()),
            ));
        }
        Ok(())
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Contiguous one-hour slots covering the window. The last slot is cut
    /// short when the window is not a whole number of hours.
    pub fn hourly_slots(&self) -> Vec<TimeWindow> {
        let mut slots = Vec::new();
        let mut cursor = self.start;
        while cursor < self.end {
            let next = (cursor + slot_width()).min(self.end);
            slots.push(TimeWindow {
                start: cursor,
                end: next,
            });
            cursor = next;
        }
        slots
    }
}

/// Number of booked intervals that overlap `slot`.
pub fn count_overlapping(booked: &[TimeWindow], slot: &TimeWindow) -> u32 {
    booked.iter().filter(|b| b.overlaps(slot)).count() as u32
}

/// Capacity of one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilitySlot {
    pub window: TimeWindow,
    pub total: u32,
    pub booked: u32,
}

impl AvailabilitySlot {
    /// Free spaces. Negative only if the pool was overbooked.
    pub fn remaining(&self) -> i64 {
        i64::from(self.total) - i64::from(self.booked)
    }

    pub fn is_available(&self) -> bool {
        self.remaining() > 0
    }
}

#[derive(Debug, Clone)]
pub struct AvailabilityResult {
    pub window: TimeWindow,
    pub vehicle_type_id: i32,
    pub pool_id: i32,
    pub slots: Vec<AvailabilitySlot>,
}

impl AvailabilityResult {
    /// Evaluate `window` against a pool of `total` spaces and the occupying
    /// reservations of all pool members.
    pub fn evaluate(
        window: TimeWindow,
        vehicle_type_id: i32,
        pool_id: i32,
        total: u32,
        booked: &[TimeWindow],
    ) -> Self {
        let slots = window
            .hourly_slots()
            .into_iter()
            .map(|slot| AvailabilitySlot {
                booked: count_overlapping(booked, &slot),
                window: slot,
                total,
            })
            .collect();

        Self {
            window,
            vehicle_type_id,
            pool_id,
            slots,
        }
    }

    pub fn is_available(&self) -> bool {
        self.slots.iter().all(AvailabilitySlot::is_available)
    }

    pub fn first_unavailable(&self) -> Option<DateTime<Utc>> {
        self.slots
            .iter()
            .find(|s| !s.is_available())
            .map(|s| s.window.start())
    }

    pub fn message(&self) -> String {
        match self.first_unavailable() {
            None => "Spaces are available for the whole requested period".to_string(),
            Some(at) => format!("No spaces available from {}", at.to_rfc3339()),
        }
    }
}

/// Capacity guard re-evaluated by the repository inside the insert
/// transaction.
#[derive(Debug, Clone, Copy)]
pub struct CapacityCheck {
    pub window: TimeWindow,
    pub vehicle_type_id: i32,
    pub pool_id: i32,
    pub total: u32,
}

impl CapacityCheck {
    pub fn verify(&self, booked: &[TimeWindow]) -> DomainResult<()> {
        let result = AvailabilityResult::evaluate(
            self.window,
            self.vehicle_type_id,
            self.pool_id,
            self.total,
            booked,
        );
        match result.first_unavailable() {
            None => Ok(()),
            Some(at) => Err(DomainError::Conflict(format!(
                "pool {} is full from {}",
                self.pool_id,
                at.to_rfc3339()
            ))),
        }
    }
}
