//! Presence Service
//!
//! The surface handed to the transport and persistence layers. It ties the
//! Presence Ledger, the interaction history, and the Visibility Engine
//! together so that every membership change recomputes visibility inside the
//! same area-scoped critical section that changed the occupancy.
//!
//! Every operation has an `_at` form taking an explicit timestamp; the plain
//! form reads the system clock.

use area_events::{
    generate_snapshot_id, AgentId, Area, AreaId, AreaPosition, AreaType, InteractionKind,
    InteractionRecord, Occupant, PresenceSnapshot, Timestamp,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::PresenceConfig;
use crate::directory::AgentDirectory;
use crate::error::{AreaError, SnapshotError};
use crate::history::InteractionHistory;
use crate::ledger::PresenceLedger;
use crate::scoring::{InteractionWeights, ScoreModel, WeightOverrides};
use crate::setup::create_default_areas;
use crate::stats::AreaStats;
use crate::visibility::{VisibilityEngine, VisibilityUpdate};

/// Radius used by `nearby_areas` callers that have no preference
pub const DEFAULT_NEARBY_RADIUS: i32 = 5;

/// Result of a successful enter.
#[derive(Debug, Clone, PartialEq)]
pub struct EnterOutcome {
    /// The newly opened visit, with its visible-set already selected
    pub occupant: Occupant,
    /// Visible-sets that changed, including the newcomer's own and, after an
    /// automatic leave, those of the area the agent came from
    pub updates: Vec<VisibilityUpdate>,
}

/// Presence and visibility for one deployment.
pub struct PresenceService {
    config: PresenceConfig,
    ledger: PresenceLedger,
    history: InteractionHistory,
    engine: RwLock<VisibilityEngine>,
    directory: Arc<dyn AgentDirectory>,
    snapshot_seq: AtomicU64,
}

impl PresenceService {
    /// Starts a service with the configured areas, or the default city when
    /// the configuration lists none.
    pub fn new(config: PresenceConfig, directory: impl AgentDirectory + 'static) -> Self {
        let areas = if config.areas.is_empty() {
            create_default_areas(config.visibility.default_max_visible)
        } else {
            config.areas.clone()
        };
        let ledger = PresenceLedger::new(areas);
        let history = InteractionHistory::new(config.history.max_entries_per_agent);
        info!(areas = ledger.area_ids().len(), "presence service started");
        Self::assemble(config, ledger, history, Arc::new(directory), 0)
    }

    /// Rebuilds a service from a persisted snapshot.
    ///
    /// Areas come from the snapshot, not the configuration; visible entries
    /// keep their original `added_at` and score.
    pub fn restore(
        config: PresenceConfig,
        directory: impl AgentDirectory + 'static,
        snapshot: PresenceSnapshot,
    ) -> Result<Self, SnapshotError> {
        let ledger = PresenceLedger::from_snapshots(snapshot.areas).map_err(|err| {
            warn!(snapshot = %snapshot.snapshot_id, error = %err, "snapshot rejected");
            err
        })?;
        let history = InteractionHistory::new(config.history.max_entries_per_agent);
        history.import(snapshot.histories);

        let seq = snapshot
            .snapshot_id
            .strip_prefix("snap_")
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        info!(
            snapshot = %snapshot.snapshot_id,
            present = ledger.total_present(),
            "presence service restored"
        );
        Ok(Self::assemble(config, ledger, history, Arc::new(directory), seq))
    }

    fn assemble(
        config: PresenceConfig,
        ledger: PresenceLedger,
        history: InteractionHistory,
        directory: Arc<dyn AgentDirectory>,
        snapshot_seq: u64,
    ) -> Self {
        let engine = VisibilityEngine::new(ScoreModel::from_config(&config.visibility));
        Self {
            config,
            ledger,
            history,
            engine: RwLock::new(engine),
            directory,
            snapshot_seq: AtomicU64::new(snapshot_seq),
        }
    }

    /// Clears the interaction history store. Presence is left to the caller.
    pub fn shutdown(&self) {
        self.history.clear();
        info!("presence service stopped");
    }

    pub fn config(&self) -> &PresenceConfig {
        &self.config
    }

    pub fn history(&self) -> &InteractionHistory {
        &self.history
    }

    // Taken before any area lock so the engine lock is never held inside one
    fn engine(&self) -> VisibilityEngine {
        self.engine.read().clone()
    }

    fn check_agent(&self, agent: &AgentId) -> Result<(), AreaError> {
        if self.directory.contains(agent) {
            Ok(())
        } else {
            warn!(agent = %agent, "unknown agent");
            Err(AreaError::UnknownAgent(agent.clone()))
        }
    }

    // === MEMBERSHIP ===

    pub fn enter_area(&self, area_id: &AreaId, agent: &AgentId) -> Result<EnterOutcome, AreaError> {
        self.enter_area_at(area_id, agent, Timestamp::now())
    }

    /// Opens a visit and recomputes the area's visible-sets.
    ///
    /// An agent already present elsewhere (or here) is moved: its previous
    /// visit is closed first, then the enter is retried. A concurrent move of
    /// the same agent can land between the two steps; the retry repeats until
    /// the enter either succeeds or fails for another reason, so callers never
    /// see `AlreadyPresent`. Capacity and activity are checked before any
    /// leave, so a rejected enter leaves the agent where it was.
    pub fn enter_area_at(
        &self,
        area_id: &AreaId,
        agent: &AgentId,
        now: Timestamp,
    ) -> Result<EnterOutcome, AreaError> {
        self.check_agent(agent)?;
        let engine = self.engine();

        let mut updates = Vec::new();
        loop {
            match self.try_enter(&engine, area_id, agent, now) {
                Err(AreaError::AlreadyPresent { area: previous, .. }) => {
                    debug!(agent = %agent, from = %previous, to = %area_id, "moving agent");
                    updates.append(&mut self.leave_with_engine(&engine, &previous, agent, now)?);
                }
                Ok(mut outcome) => {
                    updates.append(&mut outcome.updates);
                    outcome.updates = updates;
                    return Ok(outcome);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn try_enter(
        &self,
        engine: &VisibilityEngine,
        area_id: &AreaId,
        agent: &AgentId,
        now: Timestamp,
    ) -> Result<EnterOutcome, AreaError> {
        let (occupant, updates) = self.ledger.enter_with(area_id, agent, now, |roster, newcomer| {
            let cap = roster.area().max_visible;
            engine.on_enter(roster.open_mut(), newcomer, cap, &self.history, now)
        })?;
        Ok(EnterOutcome { occupant, updates })
    }

    pub fn leave_area(&self, area_id: &AreaId, agent: &AgentId) -> Result<Vec<VisibilityUpdate>, AreaError> {
        self.leave_area_at(area_id, agent, Timestamp::now())
    }

    /// Closes the agent's visit and refreshes everyone left behind.
    ///
    /// Leaving an area the agent is not in succeeds with no updates.
    pub fn leave_area_at(
        &self,
        area_id: &AreaId,
        agent: &AgentId,
        now: Timestamp,
    ) -> Result<Vec<VisibilityUpdate>, AreaError> {
        let engine = self.engine();
        self.leave_with_engine(&engine, area_id, agent, now)
    }

    fn leave_with_engine(
        &self,
        engine: &VisibilityEngine,
        area_id: &AreaId,
        agent: &AgentId,
        now: Timestamp,
    ) -> Result<Vec<VisibilityUpdate>, AreaError> {
        let left = self.ledger.leave_with(area_id, agent, now, |roster, leaving| {
            let cap = roster.area().max_visible;
            engine.on_leave(roster.open_mut(), leaving, cap, &self.history, now)
        })?;
        match left {
            Some((_, updates)) => Ok(updates),
            None => {
                debug!(area = %area_id, agent = %agent, "leave ignored, agent not present");
                Ok(Vec::new())
            }
        }
    }

    // === INTERACTIONS ===

    pub fn record_interaction(
        &self,
        a: &AgentId,
        b: &AgentId,
        kind: impl Into<InteractionKind>,
    ) -> Result<(), AreaError> {
        self.record_interaction_at(a, b, kind, Timestamp::now())
    }

    /// Appends to both agents' histories and bumps the interaction counter
    /// of each one's open visit.
    ///
    /// Visibility is not recomputed here; see `refresh_area`.
    pub fn record_interaction_at(
        &self,
        a: &AgentId,
        b: &AgentId,
        kind: impl Into<InteractionKind>,
        now: Timestamp,
    ) -> Result<(), AreaError> {
        self.check_agent(a)?;
        self.check_agent(b)?;

        let kind = kind.into();
        if !kind.is_known() {
            debug!(kind = %kind, "unrecognised interaction kind, using fallback weight");
        }
        if !self.history.record(a, b, kind, now) {
            debug!(agent = %a, "self-interaction ignored");
            return Ok(());
        }

        for agent in [a, b] {
            self.bump_interaction_count(agent);
        }
        Ok(())
    }

    /// Counts one interaction on the agent's open visit, if it has one.
    fn bump_interaction_count(&self, agent: &AgentId) -> bool {
        let Some(area_id) = self.ledger.current_area_of(agent) else {
            return false;
        };
        let bumped = self.ledger.with_area(&area_id, |roster| match roster.find_mut(agent) {
            Some(occupant) => {
                occupant.total_interactions += 1;
                true
            }
            None => false,
        });
        match bumped {
            Ok(true) => true,
            Ok(false) => {
                debug!(agent = %agent, area = %area_id, "interaction counter not bumped, agent moved");
                false
            }
            Err(e) => {
                debug!(agent = %agent, area = %area_id, error = %e, "interaction counter not bumped");
                false
            }
        }
    }

    pub fn history_of(&self, agent: &AgentId) -> Vec<InteractionRecord> {
        self.history.history_of(agent)
    }

    /// Replaces the interaction weights; kinds left unset use the defaults.
    ///
    /// Takes effect on the next recomputation.
    pub fn set_interaction_weights(&self, overrides: &WeightOverrides) {
        let weights = InteractionWeights::with_overrides(overrides);
        info!(?weights, "interaction weights updated");
        self.engine.write().set_weights(weights);
    }

    pub fn interaction_weights(&self) -> InteractionWeights {
        self.engine.read().model().weights().clone()
    }

    // === VISIBILITY ===

    /// Ids in the agent's current visible-set; empty when not in any area.
    pub fn visible_agents_of(&self, agent: &AgentId) -> Vec<AgentId> {
        self.current_visit(agent)
            .map(|occupant| occupant.visible_ids())
            .unwrap_or_default()
    }

    /// True iff `target` is in `observer`'s current visible-set.
    pub fn is_visible_to(&self, target: &AgentId, observer: &AgentId) -> bool {
        let Some(area_id) = self.ledger.current_area_of(observer) else {
            return false;
        };
        self.ledger
            .with_area(&area_id, |roster| {
                roster
                    .find(observer)
                    .is_some_and(|o| VisibilityEngine::is_visible(target, o))
            })
            .unwrap_or(false)
    }

    /// Occupants of `area_id` who should receive an event originating from
    /// `source`, in entry order.
    pub fn broadcast_recipients(&self, area_id: &AreaId, source: &AgentId) -> Result<Vec<AgentId>, AreaError> {
        self.ledger.with_area(area_id, |roster| {
            roster
                .open()
                .iter()
                .filter(|o| &o.agent_id != source && VisibilityEngine::is_visible(source, o))
                .map(|o| o.agent_id.clone())
                .collect()
        })
    }

    pub fn refresh_area(&self, area_id: &AreaId) -> Result<Vec<VisibilityUpdate>, AreaError> {
        self.refresh_area_at(area_id, Timestamp::now())
    }

    /// Re-ranks every occupant of an area with no membership change.
    pub fn refresh_area_at(&self, area_id: &AreaId, now: Timestamp) -> Result<Vec<VisibilityUpdate>, AreaError> {
        let engine = self.engine();
        let updates = self.ledger.with_area(area_id, |roster| {
            let cap = roster.area().max_visible;
            engine.refresh_all(roster.open_mut(), cap, &self.history, now)
        })?;
        debug!(area = %area_id, changed = updates.len(), "area refreshed");
        Ok(updates)
    }

    // === PRESENCE QUERIES ===

    /// Currently present occupants, oldest entry first.
    pub fn area_visitors(&self, area_id: &AreaId) -> Result<Vec<Occupant>, AreaError> {
        self.ledger.list_open(area_id)
    }

    pub fn current_visit(&self, agent: &AgentId) -> Option<Occupant> {
        self.ledger.current_visit(agent)
    }

    pub fn current_area_of(&self, agent: &AgentId) -> Option<AreaId> {
        self.ledger.current_area_of(agent)
    }

    pub fn occupancy(&self, area_id: &AreaId) -> Result<usize, AreaError> {
        self.ledger.occupancy(area_id)
    }

    /// Appends an activity to the agent's open visit; `false` when absent.
    pub fn add_activity(&self, agent: &AgentId, activity: impl Into<String>) -> bool {
        let Some(area_id) = self.ledger.current_area_of(agent) else {
            return false;
        };
        self.ledger
            .with_area(&area_id, |roster| roster.add_activity(agent, activity))
            .unwrap_or(false)
    }

    pub fn area_stats(&self, area_id: &AreaId) -> Result<AreaStats, AreaError> {
        self.ledger.with_area(area_id, |roster| {
            AreaStats::compute(area_id.clone(), roster.occupancy(), roster.tally())
        })
    }

    // === AREA REGISTRY ===

    pub fn area(&self, area_id: &AreaId) -> Option<Area> {
        self.ledger.with_area(area_id, |roster| roster.area().clone()).ok()
    }

    /// Every area, sorted by type then name.
    pub fn all_areas(&self) -> Vec<Area> {
        let mut areas = self.ledger.areas();
        areas.sort_by(|a, b| a.area_type.cmp(&b.area_type).then_with(|| a.name.cmp(&b.name)));
        areas
    }

    /// Active areas, sorted by name.
    pub fn active_areas(&self) -> Vec<Area> {
        let mut areas: Vec<Area> = self.ledger.areas().into_iter().filter(|a| a.active).collect();
        areas.sort_by(|a, b| a.name.cmp(&b.name));
        areas
    }

    /// Active areas of one type, sorted by name.
    pub fn areas_by_type(&self, area_type: AreaType) -> Vec<Area> {
        self.active_areas()
            .into_iter()
            .filter(|a| a.area_type == area_type)
            .collect()
    }

    /// Active areas within `radius` of `position` on both axes.
    pub fn nearby_areas(&self, position: &AreaPosition, radius: i32) -> Vec<Area> {
        self.active_areas()
            .into_iter()
            .filter(|a| a.position.within(position, radius))
            .collect()
    }

    /// Opens or closes an area for new entries. Present occupants stay.
    pub fn set_area_active(&self, area_id: &AreaId, active: bool) -> Result<(), AreaError> {
        self.ledger.with_area(area_id, |roster| roster.set_active(active))?;
        info!(area = %area_id, active, "area activity changed");
        Ok(())
    }

    /// Adds an area, or replaces an existing area's metadata.
    pub fn register_area(&self, area: Area) {
        info!(area = %area.id, capacity = area.capacity, "area registered");
        self.ledger.register(area);
    }

    // === PERSISTENCE ===

    pub fn snapshot(&self) -> PresenceSnapshot {
        self.snapshot_at(Timestamp::now())
    }

    /// Persistable copy of every area and every history list.
    pub fn snapshot_at(&self, now: Timestamp) -> PresenceSnapshot {
        let seq = self.snapshot_seq.fetch_add(1, Ordering::Relaxed) + 1;
        PresenceSnapshot {
            snapshot_id: generate_snapshot_id(seq),
            taken_at: now,
            areas: self.ledger.snapshot_areas(),
            histories: self.history.export(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::OpenDirectory;
    use area_events::MILLIS_PER_DAY;
    use std::collections::HashSet;

    fn id(s: &str) -> AgentId {
        AgentId::from(s)
    }

    fn area(s: &str) -> AreaId {
        AreaId::from(s)
    }

    fn at(ms: u64) -> Timestamp {
        Timestamp::from_millis(MILLIS_PER_DAY + ms)
    }

    fn service() -> PresenceService {
        PresenceService::new(PresenceConfig::default(), OpenDirectory)
    }

    #[test]
    fn test_default_city_is_seeded() {
        let service = service();
        assert_eq!(service.all_areas().len(), 6);
        assert_eq!(service.area(&area("cafe-sunrise")).unwrap().capacity, 20);
    }

    #[test]
    fn test_configured_areas_replace_defaults() {
        let config = PresenceConfig {
            areas: vec![Area::new("kiosk", "Kiosk", AreaType::Shop, 2)],
            ..Default::default()
        };
        let service = PresenceService::new(config, OpenDirectory);
        assert_eq!(service.all_areas().len(), 1);
        assert!(service.area(&area("plaza-main")).is_none());
    }

    #[test]
    fn test_enter_selects_visibility() {
        let service = service();
        service.enter_area_at(&area("plaza-main"), &id("a"), at(0)).unwrap();
        let outcome = service.enter_area_at(&area("plaza-main"), &id("b"), at(1)).unwrap();

        assert_eq!(outcome.occupant.visible_ids(), vec![id("a")]);
        assert_eq!(outcome.updates.len(), 2);
        assert!(service.is_visible_to(&id("b"), &id("a")));
        assert!(service.is_visible_to(&id("a"), &id("b")));
        assert!(!service.is_visible_to(&id("a"), &id("a")));
    }

    #[test]
    fn test_unknown_agent_is_rejected() {
        let known: HashSet<AgentId> = [id("a"), id("b")].into_iter().collect();
        let service = PresenceService::new(PresenceConfig::default(), known);

        let err = service.enter_area_at(&area("plaza-main"), &id("ghost"), at(0)).unwrap_err();
        assert_eq!(err, AreaError::UnknownAgent(id("ghost")));
        let err = service
            .record_interaction_at(&id("a"), &id("ghost"), InteractionKind::Chat, at(0))
            .unwrap_err();
        assert_eq!(err.reason_code(), "unknown_agent");
        assert!(service.history_of(&id("a")).is_empty());

        // Leave never consults the directory
        assert!(service.leave_area_at(&area("plaza-main"), &id("ghost"), at(1)).unwrap().is_empty());
    }

    #[test]
    fn test_enter_moves_agent_between_areas() {
        let service = service();
        service.enter_area_at(&area("plaza-main"), &id("a"), at(0)).unwrap();
        service.enter_area_at(&area("plaza-main"), &id("b"), at(1)).unwrap();

        let outcome = service.enter_area_at(&area("cafe-sunrise"), &id("a"), at(2)).unwrap();
        assert_eq!(outcome.occupant.area_id, area("cafe-sunrise"));
        assert_eq!(service.current_area_of(&id("a")), Some(area("cafe-sunrise")));
        assert_eq!(service.occupancy(&area("plaza-main")).unwrap(), 1);
        assert!(service.visible_agents_of(&id("b")).is_empty());
        // b's emptied set was reported alongside a's new one
        assert!(outcome.updates.iter().any(|u| u.agent_id == id("b") && u.visible.is_empty()));
    }

    #[test]
    fn test_full_target_keeps_agent_in_place() {
        let config = PresenceConfig {
            areas: vec![
                Area::new("big", "Big", AreaType::Plaza, 10),
                Area::new("tiny", "Tiny", AreaType::Cafe, 1),
            ],
            ..Default::default()
        };
        let service = PresenceService::new(config, OpenDirectory);
        service.enter_area_at(&area("tiny"), &id("x"), at(0)).unwrap();
        service.enter_area_at(&area("big"), &id("a"), at(0)).unwrap();

        let err = service.enter_area_at(&area("tiny"), &id("a"), at(1)).unwrap_err();
        assert!(matches!(err, AreaError::CapacityExceeded { capacity: 1, .. }));
        assert_eq!(service.current_area_of(&id("a")), Some(area("big")));
    }

    #[test]
    fn test_inactive_area_blocks_new_entries_only() {
        let service = service();
        service.enter_area_at(&area("gym-fitness"), &id("a"), at(0)).unwrap();
        service.set_area_active(&area("gym-fitness"), false).unwrap();

        let err = service.enter_area_at(&area("gym-fitness"), &id("b"), at(1)).unwrap_err();
        assert_eq!(err, AreaError::AreaInactive(area("gym-fitness")));
        assert_eq!(service.current_area_of(&id("a")), Some(area("gym-fitness")));
        assert!(service.areas_by_type(AreaType::Gym).is_empty());
        assert_eq!(service.active_areas().len(), 5);
    }

    #[test]
    fn test_record_interaction_counts_on_open_visits() {
        let service = service();
        service.enter_area_at(&area("park-green"), &id("a"), at(0)).unwrap();

        service
            .record_interaction_at(&id("a"), &id("b"), InteractionKind::Gift, at(1))
            .unwrap();
        service.record_interaction_at(&id("a"), &id("b"), "wave", at(2)).unwrap();

        assert_eq!(service.current_visit(&id("a")).unwrap().total_interactions, 2);
        assert_eq!(service.history_of(&id("b")).len(), 2);
        assert_eq!(service.history_of(&id("b"))[1].kind, InteractionKind::from_label("wave"));
    }

    #[test]
    fn test_interaction_count_skips_absent_agents() {
        let service = service();
        service.enter_area_at(&area("park-green"), &id("a"), at(0)).unwrap();

        assert!(service.bump_interaction_count(&id("a")));
        assert!(!service.bump_interaction_count(&id("b")));
        service.leave_area_at(&area("park-green"), &id("a"), at(1)).unwrap();
        assert!(!service.bump_interaction_count(&id("a")));
    }

    #[test]
    fn test_simultaneous_strangers_score_zero() {
        let service = service();
        service.enter_area_at(&area("plaza-main"), &id("a"), at(0)).unwrap();
        service.enter_area_at(&area("plaza-main"), &id("b"), at(0)).unwrap();

        let visit = service.current_visit(&id("a")).unwrap();
        assert_eq!(visit.visible.len(), 1);
        assert_eq!(visit.visible[0].interaction_score, 0.0);
    }

    #[test]
    fn test_self_interaction_is_a_no_op() {
        let service = service();
        service.enter_area_at(&area("park-green"), &id("a"), at(0)).unwrap();
        service
            .record_interaction_at(&id("a"), &id("a"), InteractionKind::Chat, at(1))
            .unwrap();
        assert!(service.history_of(&id("a")).is_empty());
        assert_eq!(service.current_visit(&id("a")).unwrap().total_interactions, 0);
    }

    #[test]
    fn test_refresh_area_applies_new_history() {
        let config = PresenceConfig {
            areas: vec![Area::new("room", "Room", AreaType::Library, 10).with_max_visible(1)],
            ..Default::default()
        };
        let service = PresenceService::new(config, OpenDirectory);
        let late = Timestamp::from_millis(10 * MILLIS_PER_DAY);
        for agent in ["a", "b", "c"] {
            service.enter_area_at(&area("room"), &id(agent), late).unwrap();
        }
        // Equal novelty and entry time: the lower id wins
        assert_eq!(service.visible_agents_of(&id("a")), vec![id("b")]);

        service
            .record_interaction_at(&id("a"), &id("c"), InteractionKind::Event, late)
            .unwrap();
        // Lazy until refreshed
        assert_eq!(service.visible_agents_of(&id("a")), vec![id("b")]);

        let updates = service.refresh_area_at(&area("room"), late).unwrap();
        assert_eq!(service.visible_agents_of(&id("a")), vec![id("c")]);
        assert!(updates.iter().any(|u| u.agent_id == id("a")));
    }

    #[test]
    fn test_broadcast_recipients_follow_visibility() {
        let config = PresenceConfig {
            areas: vec![Area::new("room", "Room", AreaType::Library, 10).with_max_visible(1)],
            ..Default::default()
        };
        let service = PresenceService::new(config, OpenDirectory);
        let late = Timestamp::from_millis(10 * MILLIS_PER_DAY);
        service.record_interaction_at(&id("b"), &id("c"), InteractionKind::Event, late).unwrap();
        for agent in ["a", "b", "c"] {
            service.enter_area_at(&area("room"), &id(agent), late).unwrap();
        }

        // b and c only see each other; a sees b (earliest entry on a tie)
        let recipients = service.broadcast_recipients(&area("room"), &id("c")).unwrap();
        assert_eq!(recipients, vec![id("b")]);
        let recipients = service.broadcast_recipients(&area("room"), &id("b")).unwrap();
        assert_eq!(recipients, vec![id("a"), id("c")]);
    }

    #[test]
    fn test_add_activity_and_stats() {
        let service = service();
        assert!(!service.add_activity(&id("a"), "reading"));

        service.enter_area_at(&area("library-quiet"), &id("a"), at(0)).unwrap();
        assert!(service.add_activity(&id("a"), "reading"));
        service.leave_area_at(&area("library-quiet"), &id("a"), at(600)).unwrap();
        service.enter_area_at(&area("library-quiet"), &id("b"), at(700)).unwrap();

        let stats = service.area_stats(&area("library-quiet")).unwrap();
        assert_eq!(stats.total_visits, 2);
        assert_eq!(stats.avg_duration_ms, 600);
        assert_eq!(stats.peak_hours, vec![0]);
    }

    #[test]
    fn test_nearby_areas() {
        let service = service();
        let names: Vec<_> = service
            .nearby_areas(&AreaPosition::new(50, 50), DEFAULT_NEARBY_RADIUS)
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert!(names.contains(&area("plaza-main")));
        assert!(names.contains(&area("cafe-sunrise")));
        assert!(!names.contains(&area("gym-fitness")));
    }

    #[test]
    fn test_set_interaction_weights_partial() {
        let service = service();
        service.set_interaction_weights(&WeightOverrides {
            chat: Some(4.0),
            ..Default::default()
        });
        let weights = service.interaction_weights();
        assert_eq!(weights.chat, 4.0);
        assert_eq!(weights.event, 5.0);
    }

    #[test]
    fn test_shutdown_clears_history() {
        let service = service();
        service.record_interaction_at(&id("a"), &id("b"), InteractionKind::Chat, at(0)).unwrap();
        service.shutdown();
        assert!(service.history().is_empty());
    }

    #[test]
    fn test_snapshot_ids_continue_after_restore() {
        let service = service();
        service.enter_area_at(&area("plaza-main"), &id("a"), at(0)).unwrap();
        let first = service.snapshot_at(at(1));
        assert_eq!(first.snapshot_id, "snap_000001");

        let restored = PresenceService::restore(PresenceConfig::default(), OpenDirectory, first).unwrap();
        assert_eq!(restored.current_area_of(&id("a")), Some(area("plaza-main")));
        assert_eq!(restored.snapshot_at(at(2)).snapshot_id, "snap_000002");
    }
}
