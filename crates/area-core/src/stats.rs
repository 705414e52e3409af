//! Area Statistics
//!
//! Visit counts, durations, and busiest hours for one area.

use area_events::{AreaId, VisitTally};
use serde::Serialize;

/// Number of peak hours reported
pub const PEAK_HOURS: usize = 3;

/// Statistics for a single area
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaStats {
    pub area_id: AreaId,
    /// Open plus closed visits
    pub total_visits: u64,
    /// Mean length of closed visits; 0 when none have closed
    pub avg_duration_ms: u64,
    /// UTC hours-of-day with the most closed-visit entries, busiest first
    pub peak_hours: Vec<u8>,
}

impl AreaStats {
    /// Computes statistics from the number of open visits and the closed-visit tally.
    pub fn compute(area_id: AreaId, open: usize, tally: &VisitTally) -> Self {
        let mut hours: Vec<(u8, u32)> = (0u8..24)
            .zip(tally.entry_hours)
            .filter(|&(_, count)| count > 0)
            .collect();
        hours.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        Self {
            area_id,
            total_visits: open as u64 + tally.closed_visits,
            avg_duration_ms: tally.average_duration_ms(),
            peak_hours: hours.into_iter().take(PEAK_HOURS).map(|(hour, _)| hour).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use area_events::{Occupant, Timestamp, MILLIS_PER_HOUR, MILLIS_PER_MINUTE};

    fn tally_of(visits: &[(u64, u64)]) -> VisitTally {
        let mut tally = VisitTally::default();
        for &(enter_ms, stay_ms) in visits {
            let mut occupant = Occupant::open("a", "test-plaza", Timestamp::from_millis(enter_ms));
            occupant.exited_at = Some(Timestamp::from_millis(enter_ms + stay_ms));
            tally.record(&occupant);
        }
        tally
    }

    #[test]
    fn test_empty_area() {
        let stats = AreaStats::compute(AreaId::from("test-plaza"), 0, &VisitTally::default());
        assert_eq!(stats.total_visits, 0);
        assert_eq!(stats.avg_duration_ms, 0);
        assert!(stats.peak_hours.is_empty());
    }

    #[test]
    fn test_open_visits_count_but_do_not_average() {
        let tally = tally_of(&[(0, 10 * MILLIS_PER_MINUTE), (0, 30 * MILLIS_PER_MINUTE)]);

        let stats = AreaStats::compute(AreaId::from("test-plaza"), 1, &tally);
        assert_eq!(stats.total_visits, 3);
        assert_eq!(stats.avg_duration_ms, 20 * MILLIS_PER_MINUTE);
    }

    #[test]
    fn test_peak_hours() {
        let h = MILLIS_PER_HOUR;
        let tally = tally_of(&[
            (9 * h, 1),
            (9 * h + 5, 1),
            (14 * h, 1),
            (14 * h + 5, 1),
            (14 * h + 9, 1),
            (3 * h, 1),
            (20 * h, 1),
        ]);

        let stats = AreaStats::compute(AreaId::from("test-plaza"), 0, &tally);
        // 14 busiest, then 9; 3 and 20 tie and the earlier hour wins
        assert_eq!(stats.peak_hours, vec![14, 9, 3]);
    }
}
