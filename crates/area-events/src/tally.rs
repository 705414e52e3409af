//! Closed-visit counters for one area.
//!
//! Closed visits are handed to the persistence layer when they close; an
//! area only keeps these running totals, so its memory stays flat however
//! many visits it has seen.

use serde::{Deserialize, Serialize};

use crate::occupant::Occupant;

/// Running totals over an area's closed visits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitTally {
    pub closed_visits: u64,
    /// Sum of closed visit lengths
    pub total_duration_ms: u64,
    /// Closed visits by UTC hour of entry
    pub entry_hours: [u32; 24],
}

impl VisitTally {
    /// Counts one closed visit. Open visits are ignored.
    pub fn record(&mut self, visit: &Occupant) -> bool {
        let Some(exited_at) = visit.exited_at else {
            return false;
        };
        self.closed_visits += 1;
        self.total_duration_ms = self
            .total_duration_ms
            .saturating_add(exited_at.millis_since(visit.entered_at));
        let hour = usize::from(visit.entered_at.hour_of_day());
        self.entry_hours[hour] = self.entry_hours[hour].saturating_add(1);
        true
    }

    /// Mean closed visit length; 0 when none have closed.
    pub fn average_duration_ms(&self) -> u64 {
        self.total_duration_ms
            .checked_div(self.closed_visits)
            .unwrap_or(0)
    }
}
