//! Visibility Engine
//!
//! Selects, for every occupant of an area, the bounded set of co-occupants it
//! may perceive, and keeps those sets consistent as agents enter and leave.
//!
//! Selection is recomputed for every occupant on every membership change
//! (quadratic in occupancy, which the area's hard capacity keeps small).
//! Recomputation is sticky: an entry whose agent is selected again keeps its
//! original `added_at` and score, so clients never see an unchanged edge
//! "flicker" with a new timestamp.

use area_events::{AgentId, AreaId, Occupant, Timestamp, VisibleEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

use crate::history::InteractionHistory;
use crate::scoring::{InteractionWeights, ScoreModel};

/// A candidate with its score for one observer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub agent_id: AgentId,
    pub entered_at: Timestamp,
    /// Decayed, weighted history with the observer
    pub interaction_score: f64,
    /// `interaction_score` plus the novelty bonus; used for ranking
    pub score: f64,
}

/// New visible-set of one observer, handed to the broadcast/persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityUpdate {
    pub area_id: AreaId,
    pub agent_id: AgentId,
    pub visible: Vec<VisibleEntry>,
}

impl VisibilityUpdate {
    pub fn visible_ids(&self) -> Vec<AgentId> {
        self.visible.iter().map(|e| e.agent_id.clone()).collect()
    }
}

/// Scores candidates and maintains visible-sets.
#[derive(Debug, Clone, Default)]
pub struct VisibilityEngine {
    model: ScoreModel,
}

impl VisibilityEngine {
    pub fn new(model: ScoreModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &ScoreModel {
        &self.model
    }

    pub fn set_weights(&mut self, weights: InteractionWeights) {
        self.model.set_weights(weights);
    }

    /// Candidates `observer` would see, best first.
    ///
    /// When the pool fits under `cap` every present co-occupant is returned in
    /// entry order. Otherwise candidates are ordered by score (descending),
    /// then earlier entry, then agent id, and cut to `cap`.
    pub fn rank(
        &self,
        occupants: &[Occupant],
        observer: &AgentId,
        cap: usize,
        history: &InteractionHistory,
        now: Timestamp,
    ) -> Vec<ScoredCandidate> {
        let observer_history = history.history_of(observer);

        let mut pool: Vec<ScoredCandidate> = occupants
            .iter()
            .filter(|o| &o.agent_id != observer && o.is_present())
            .map(|o| {
                let shared = observer_history.iter().filter(|r| r.with == o.agent_id);
                let interaction_score = self.model.interaction_score(shared, now);
                let score = interaction_score + self.model.time_bonus(o.entered_at, now);
                trace!(observer = %observer, candidate = %o.agent_id, interaction_score, score, "scored candidate");
                ScoredCandidate {
                    agent_id: o.agent_id.clone(),
                    entered_at: o.entered_at,
                    interaction_score,
                    score,
                }
            })
            .collect();

        if pool.len() <= cap {
            return pool;
        }

        pool.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.entered_at.cmp(&b.entered_at))
                .then_with(|| a.agent_id.cmp(&b.agent_id))
        });
        pool.truncate(cap);
        pool
    }

    /// Ids `observer` would see, best first.
    pub fn select_visible(
        &self,
        occupants: &[Occupant],
        observer: &AgentId,
        cap: usize,
        history: &InteractionHistory,
        now: Timestamp,
    ) -> Vec<AgentId> {
        self.rank(occupants, observer, cap, history, now)
            .into_iter()
            .map(|c| c.agent_id)
            .collect()
    }

    /// Recomputes one observer's set, reusing entries that stay selected.
    fn reselect(
        &self,
        occupants: &[Occupant],
        observer: &Occupant,
        cap: usize,
        history: &InteractionHistory,
        now: Timestamp,
    ) -> Vec<VisibleEntry> {
        self.rank(occupants, &observer.agent_id, cap, history, now)
            .into_iter()
            .map(|candidate| match observer.visible_entry(&candidate.agent_id) {
                Some(existing) => existing.clone(),
                None => VisibleEntry::new(candidate.agent_id, now, candidate.interaction_score),
            })
            .collect()
    }

    /// Recomputes every present occupant against the current occupancy.
    ///
    /// Returns updates for observers whose set membership changed, plus any
    /// observer listed in `always_report`.
    fn refresh(
        &self,
        occupants: &mut [Occupant],
        cap: usize,
        history: &InteractionHistory,
        now: Timestamp,
        always_report: Option<&AgentId>,
    ) -> Vec<VisibilityUpdate> {
        // Every set is computed against the same occupancy before any is written
        let current: &[Occupant] = occupants;
        let recomputed: Vec<Option<Vec<VisibleEntry>>> = current
            .iter()
            .map(|o| o.is_present().then(|| self.reselect(current, o, cap, history, now)))
            .collect();

        let mut updates = Vec::new();
        for (occupant, visible) in occupants.iter_mut().zip(recomputed) {
            let Some(visible) = visible else {
                continue;
            };
            let changed = !same_members(&occupant.visible, &visible);
            occupant.visible = visible;
            if changed || always_report == Some(&occupant.agent_id) {
                updates.push(VisibilityUpdate {
                    area_id: occupant.area_id.clone(),
                    agent_id: occupant.agent_id.clone(),
                    visible: occupant.visible.clone(),
                });
            }
        }
        updates
    }

    /// Membership change: `new_agent` has just been added to `occupants`.
    ///
    /// The newcomer gets a fresh set; every other present occupant is
    /// re-ranked with the newcomer as a candidate.
    pub fn on_enter(
        &self,
        occupants: &mut [Occupant],
        new_agent: &AgentId,
        cap: usize,
        history: &InteractionHistory,
        now: Timestamp,
    ) -> Vec<VisibilityUpdate> {
        let updates = self.refresh(occupants, cap, history, now, Some(new_agent));
        debug!(
            agent = %new_agent,
            occupants = occupants.len(),
            changed = updates.len(),
            "visibility refreshed after enter"
        );
        updates
    }

    /// Membership change: `leaving` has just been removed from `remaining`.
    pub fn on_leave(
        &self,
        remaining: &mut [Occupant],
        leaving: &AgentId,
        cap: usize,
        history: &InteractionHistory,
        now: Timestamp,
    ) -> Vec<VisibilityUpdate> {
        let updates = self.refresh(remaining, cap, history, now, None);
        debug!(
            agent = %leaving,
            occupants = remaining.len(),
            changed = updates.len(),
            "visibility refreshed after leave"
        );
        updates
    }

    /// Eager re-rank with no membership change (e.g. after new interactions).
    pub fn refresh_all(
        &self,
        occupants: &mut [Occupant],
        cap: usize,
        history: &InteractionHistory,
        now: Timestamp,
    ) -> Vec<VisibilityUpdate> {
        self.refresh(occupants, cap, history, now, None)
    }

    /// True iff `target` is in `observer`'s current visible-set.
    pub fn is_visible(target: &AgentId, observer: &Occupant) -> bool {
        observer.can_see(target)
    }
}

fn same_members(before: &[VisibleEntry], after: &[VisibleEntry]) -> bool {
    if before.len() != after.len() {
        return false;
    }
    let before: HashSet<&AgentId> = before.iter().map(|e| &e.agent_id).collect();
    after.iter().all(|e| before.contains(&e.agent_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use area_events::{fixtures, InteractionKind, MILLIS_PER_DAY, MILLIS_PER_HOUR};

    const AREA: &str = "test-plaza";

    fn id(s: &str) -> AgentId {
        AgentId::from(s)
    }

    fn occupant(agent: &str, at: u64) -> Occupant {
        Occupant::open(agent, AREA, Timestamp::from_millis(at))
    }

    /// Well past every novelty window.
    fn late() -> Timestamp {
        Timestamp::from_millis(10 * MILLIS_PER_DAY)
    }

    #[test]
    fn test_small_pool_returns_everyone_in_entry_order() {
        let engine = VisibilityEngine::default();
        let history = InteractionHistory::default();
        let plaza = fixtures::test_plaza(10, 20);
        let occupants = fixtures::occupants_entering(&plaza, &[("a", 0), ("b", 1), ("c", 2)]);

        let seen = engine.select_visible(&occupants, &id("a"), 20, &history, late());
        assert_eq!(seen, vec![id("b"), id("c")]);
    }

    #[test]
    fn test_visible_entry_keeps_history_score_only() {
        let engine = VisibilityEngine::default();
        let history = InteractionHistory::default();
        let now = late();
        history.record(&id("a"), &id("c"), InteractionKind::Trade, now);
        let t = now.as_millis();
        let mut occupants =
            fixtures::occupants_entering(&fixtures::test_plaza(10, 5), &[("a", t), ("b", t), ("c", t)]);

        engine.refresh_all(&mut occupants, 5, &history, now);

        assert_eq!(occupants[0].visible_entry(&id("b")).unwrap().interaction_score, 0.0);
        assert_eq!(occupants[0].visible_entry(&id("c")).unwrap().interaction_score, 2.0);
        // Ranking still counts the novelty bonus
        let ranked = engine.rank(&occupants, &id("a"), 5, &history, now);
        assert!(ranked.iter().all(|c| c.score == c.interaction_score + 0.5));
    }

    #[test]
    fn test_observer_and_departed_are_excluded() {
        let engine = VisibilityEngine::default();
        let history = InteractionHistory::default();
        let mut gone = occupant("d", 3);
        gone.exited_at = Some(Timestamp::from_millis(4));
        let occupants = vec![occupant("a", 0), occupant("b", 1), gone];

        let seen = engine.select_visible(&occupants, &id("a"), 20, &history, late());
        assert_eq!(seen, vec![id("b")]);
    }

    #[test]
    fn test_history_wins_when_over_cap() {
        let engine = VisibilityEngine::default();
        let history = InteractionHistory::default();
        let now = late();
        history.record(&id("a"), &id("c"), InteractionKind::Gift, now);
        let occupants = vec![occupant("a", 0), occupant("b", 1), occupant("c", 2)];

        let seen = engine.select_visible(&occupants, &id("a"), 1, &history, now);
        assert_eq!(seen, vec![id("c")]);
    }

    #[test]
    fn test_ties_go_to_earlier_entry() {
        let engine = VisibilityEngine::default();
        let history = InteractionHistory::default();
        let occupants = vec![occupant("a", 0), occupant("z", 5), occupant("y", 10)];

        let seen = engine.select_visible(&occupants, &id("a"), 1, &history, late());
        assert_eq!(seen, vec![id("z")]);
    }

    #[test]
    fn test_newcomer_bonus_beats_silent_veteran() {
        let engine = VisibilityEngine::default();
        let history = InteractionHistory::default();
        let now = late();
        let occupants = vec![
            occupant("a", 0),
            occupant("veteran", 1),
            occupant("newcomer", now.as_millis() - MILLIS_PER_HOUR / 10),
        ];

        let ranked = engine.rank(&occupants, &id("a"), 1, &history, now);
        assert_eq!(ranked[0].agent_id, id("newcomer"));
        assert!((ranked[0].score - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_zero_cap_sees_nobody() {
        let engine = VisibilityEngine::default();
        let history = InteractionHistory::default();
        let occupants = vec![occupant("a", 0), occupant("b", 1)];
        assert!(engine.select_visible(&occupants, &id("a"), 0, &history, late()).is_empty());
    }

    #[test]
    fn test_on_enter_preserves_existing_edges() {
        let engine = VisibilityEngine::default();
        let history = InteractionHistory::default();
        let t0 = late();

        let mut occupants = vec![occupant("a", t0.as_millis()), occupant("b", t0.as_millis())];
        engine.on_enter(&mut occupants, &id("b"), 5, &history, t0);
        let original = occupants[0].visible_entry(&id("b")).cloned().unwrap();
        assert_eq!(original.added_at, t0);

        let t1 = t0.plus_millis(MILLIS_PER_HOUR);
        occupants.push(occupant("c", t1.as_millis()));
        let updates = engine.on_enter(&mut occupants, &id("c"), 5, &history, t1);

        assert_eq!(occupants[0].visible_entry(&id("b")), Some(&original));
        assert_eq!(occupants[0].visible_entry(&id("c")).map(|e| e.added_at), Some(t1));
        // a and b gained c; c is always reported
        assert_eq!(updates.len(), 3);
        assert_eq!(updates.iter().filter(|u| u.agent_id == id("c")).count(), 1);
    }

    #[test]
    fn test_on_enter_reports_only_changed_observers() {
        let engine = VisibilityEngine::default();
        let history = InteractionHistory::default();
        let now = late();
        history.record(&id("a"), &id("b"), InteractionKind::Event, now);

        let mut occupants = vec![occupant("a", 0), occupant("b", 1)];
        engine.on_enter(&mut occupants, &id("b"), 1, &history, now);

        // cap 1: a keeps b (strong history); b sees a already; c changes nothing for them
        occupants.push(occupant("c", 2));
        let updates = engine.on_enter(&mut occupants, &id("c"), 1, &history, now);
        let reported: Vec<_> = updates.iter().map(|u| u.agent_id.clone()).collect();
        assert_eq!(reported, vec![id("c")]);
        assert_eq!(occupants[0].visible_ids(), vec![id("b")]);
    }

    #[test]
    fn test_on_leave_backfills_from_pool() {
        let engine = VisibilityEngine::default();
        let history = InteractionHistory::default();
        let now = late();
        history.record(&id("a"), &id("b"), InteractionKind::Trade, now);

        let mut occupants = vec![occupant("a", 0), occupant("b", 1), occupant("c", 2)];
        engine.refresh_all(&mut occupants, 1, &history, now);
        assert_eq!(occupants[0].visible_ids(), vec![id("b")]);

        let later = now.plus_millis(1_000);
        occupants.remove(1);
        let updates = engine.on_leave(&mut occupants, &id("b"), 1, &history, later);

        assert_eq!(occupants[0].visible_ids(), vec![id("c")]);
        assert_eq!(occupants[0].visible[0].added_at, later);
        assert!(updates.iter().any(|u| u.agent_id == id("a")));
        assert!(occupants.iter().all(|o| !o.can_see(&id("b"))));
    }

    #[test]
    fn test_is_visible() {
        let mut observer = occupant("a", 0);
        observer.visible.push(VisibleEntry::new("b", Timestamp::epoch(), 0.0));
        assert!(VisibilityEngine::is_visible(&id("b"), &observer));
        assert!(!VisibilityEngine::is_visible(&id("c"), &observer));
    }
}
