//! Presence Ledger
//!
//! Authoritative record of who is in which area right now.
//!
//! Each area's roster sits behind its own mutex, so enter/leave/recompute on
//! one area are serialized while different areas proceed independently. A
//! sharded agent → area index enforces the "at most one open visit per agent"
//! rule across areas without a global lock.
//!
//! Lock order is always roster first, index second, and never two rosters at
//! once.

use area_events::{AgentId, Area, AreaId, AreaSnapshot, Occupant, Timestamp, VisitTally};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AreaError, SnapshotError};

/// Occupancy of one area: open visits (oldest entry first) and closed-visit totals.
#[derive(Debug, Clone)]
pub struct AreaRoster {
    area: Area,
    open: Vec<Occupant>,
    tally: VisitTally,
}

impl AreaRoster {
    pub fn new(area: Area) -> Self {
        Self {
            area,
            open: Vec::new(),
            tally: VisitTally::default(),
        }
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn set_active(&mut self, active: bool) {
        self.area.active = active;
    }

    /// Currently present occupants, ordered by entry time ascending.
    pub fn open(&self) -> &[Occupant] {
        &self.open
    }

    /// Mutable view for the visibility engine; membership cannot change
    /// through a slice.
    pub fn open_mut(&mut self) -> &mut [Occupant] {
        &mut self.open
    }

    pub fn tally(&self) -> &VisitTally {
        &self.tally
    }

    pub fn occupancy(&self) -> usize {
        self.open.len()
    }

    pub fn is_full(&self) -> bool {
        self.open.len() >= self.area.capacity
    }

    pub fn find(&self, agent: &AgentId) -> Option<&Occupant> {
        self.open.iter().find(|o| &o.agent_id == agent)
    }

    pub fn find_mut(&mut self, agent: &AgentId) -> Option<&mut Occupant> {
        self.open.iter_mut().find(|o| &o.agent_id == agent)
    }

    /// Appends an activity label to the agent's open visit.
    pub fn add_activity(&mut self, agent: &AgentId, activity: impl Into<String>) -> bool {
        match self.find_mut(agent) {
            Some(occupant) => {
                occupant.activities.push(activity.into());
                true
            }
            None => false,
        }
    }

    // Equal entry times keep arrival order
    fn admit(&mut self, occupant: Occupant) {
        let at = self.open.partition_point(|o| o.entered_at <= occupant.entered_at);
        self.open.insert(at, occupant);
    }

    /// Closes the agent's open visit: stamps the exit, discards its
    /// visible-set, and counts it in the tally. The closed record goes back
    /// to the caller.
    fn discharge(&mut self, agent: &AgentId, now: Timestamp) -> Option<Occupant> {
        let index = self.open.iter().position(|o| &o.agent_id == agent)?;
        let mut occupant = self.open.remove(index);
        occupant.exited_at = Some(now.max(occupant.entered_at));
        occupant.visible.clear();
        self.tally.record(&occupant);
        Some(occupant)
    }

    pub fn to_snapshot(&self) -> AreaSnapshot {
        AreaSnapshot {
            area: self.area.clone(),
            open: self.open.clone(),
            tally: self.tally.clone(),
        }
    }

    fn from_snapshot(snapshot: AreaSnapshot) -> Result<Self, SnapshotError> {
        let area_id = snapshot.area.id.clone();
        for occupant in &snapshot.open {
            if occupant.area_id != area_id {
                return Err(SnapshotError::MismatchedArea {
                    area: area_id,
                    found: occupant.area_id.clone(),
                });
            }
        }

        let mut roster = AreaRoster::new(snapshot.area);
        for occupant in snapshot.open {
            roster.admit(occupant);
        }
        roster.tally = snapshot.tally;
        Ok(roster)
    }
}

/// Registry of area rosters plus the agent → area index.
#[derive(Debug, Default)]
pub struct PresenceLedger {
    areas: RwLock<HashMap<AreaId, Arc<Mutex<AreaRoster>>>>,
    whereabouts: DashMap<AgentId, AreaId>,
}

impl PresenceLedger {
    pub fn new(areas: impl IntoIterator<Item = Area>) -> Self {
        let ledger = Self::default();
        for area in areas {
            ledger.register(area);
        }
        ledger
    }

    /// Adds an area, or replaces an existing area's metadata while keeping
    /// its occupants.
    pub fn register(&self, area: Area) {
        let mut areas = self.areas.write();
        match areas.get(&area.id) {
            Some(roster) => roster.lock().area = area,
            None => {
                areas.insert(area.id.clone(), Arc::new(Mutex::new(AreaRoster::new(area))));
            }
        }
    }

    /// Shared handle to an area's roster.
    pub fn roster(&self, area_id: &AreaId) -> Result<Arc<Mutex<AreaRoster>>, AreaError> {
        self.areas
            .read()
            .get(area_id)
            .cloned()
            .ok_or_else(|| AreaError::AreaNotFound(area_id.clone()))
    }

    /// Runs `f` inside the area's critical section.
    pub fn with_area<R>(
        &self,
        area_id: &AreaId,
        f: impl FnOnce(&mut AreaRoster) -> R,
    ) -> Result<R, AreaError> {
        let roster = self.roster(area_id)?;
        let mut guard = roster.lock();
        Ok(f(&mut guard))
    }

    /// Registered area ids, sorted.
    pub fn area_ids(&self) -> Vec<AreaId> {
        let mut ids: Vec<AreaId> = self.areas.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Metadata of every registered area.
    pub fn areas(&self) -> Vec<Area> {
        self.area_ids()
            .iter()
            .filter_map(|id| self.with_area(id, |r| r.area().clone()).ok())
            .collect()
    }

    /// Opens a visit for `agent` in `area_id` and runs `after` in the same
    /// critical section, with the newcomer already in the roster.
    ///
    /// Fails with `AlreadyPresent` if the agent has an open visit anywhere;
    /// the caller decides whether to leave that area first.
    pub fn enter_with<R>(
        &self,
        area_id: &AreaId,
        agent: &AgentId,
        now: Timestamp,
        after: impl FnOnce(&mut AreaRoster, &AgentId) -> R,
    ) -> Result<(Occupant, R), AreaError> {
        let roster = self.roster(area_id)?;
        let mut roster = roster.lock();

        if !roster.area.active {
            warn!(area = %area_id, agent = %agent, "area closed");
            return Err(AreaError::AreaInactive(area_id.clone()));
        }
        if roster.is_full() {
            warn!(area = %area_id, agent = %agent, capacity = roster.area.capacity, "area full");
            return Err(AreaError::CapacityExceeded {
                area: area_id.clone(),
                capacity: roster.area.capacity,
            });
        }

        match self.whereabouts.entry(agent.clone()) {
            Entry::Occupied(existing) => {
                return Err(AreaError::AlreadyPresent {
                    agent: agent.clone(),
                    area: existing.get().clone(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(area_id.clone());
            }
        }

        roster.admit(Occupant::open(agent.clone(), area_id.clone(), now));
        let result = after(&mut roster, agent);

        let occupant = roster
            .find(agent)
            .cloned()
            .ok_or_else(|| AreaError::UnknownAgent(agent.clone()))?;
        info!(area = %area_id, agent = %agent, occupancy = roster.occupancy(), "agent entered");
        Ok((occupant, result))
    }

    pub fn enter(&self, area_id: &AreaId, agent: &AgentId, now: Timestamp) -> Result<Occupant, AreaError> {
        self.enter_with(area_id, agent, now, |_, _| ()).map(|(occupant, _)| occupant)
    }

    /// Closes `agent`'s visit in `area_id` and runs `after` on the remaining
    /// roster in the same critical section.
    ///
    /// `Ok(None)` when the agent has no open visit there.
    pub fn leave_with<R>(
        &self,
        area_id: &AreaId,
        agent: &AgentId,
        now: Timestamp,
        after: impl FnOnce(&mut AreaRoster, &AgentId) -> R,
    ) -> Result<Option<(Occupant, R)>, AreaError> {
        let roster = self.roster(area_id)?;
        let mut roster = roster.lock();

        let Some(closed) = roster.discharge(agent, now) else {
            return Ok(None);
        };
        self.whereabouts.remove_if(agent, |_, current| current == area_id);

        let result = after(&mut roster, agent);
        info!(area = %area_id, agent = %agent, occupancy = roster.occupancy(), "agent left");
        Ok(Some((closed, result)))
    }

    pub fn leave(&self, area_id: &AreaId, agent: &AgentId, now: Timestamp) -> Result<Option<Occupant>, AreaError> {
        self.leave_with(area_id, agent, now, |_, _| ())
            .map(|closed| closed.map(|(occupant, _)| occupant))
    }

    /// Currently present occupants of an area, oldest entry first.
    pub fn list_open(&self, area_id: &AreaId) -> Result<Vec<Occupant>, AreaError> {
        self.with_area(area_id, |r| r.open().to_vec())
    }

    pub fn occupancy(&self, area_id: &AreaId) -> Result<usize, AreaError> {
        self.with_area(area_id, |r| r.occupancy())
    }

    pub fn current_area_of(&self, agent: &AgentId) -> Option<AreaId> {
        self.whereabouts.get(agent).map(|area| area.clone())
    }

    /// The agent's open visit, wherever it is.
    pub fn current_visit(&self, agent: &AgentId) -> Option<Occupant> {
        let area_id = self.current_area_of(agent)?;
        self.with_area(&area_id, |r| r.find(agent).cloned()).ok().flatten()
    }

    /// Number of agents present across all areas.
    pub fn total_present(&self) -> usize {
        self.whereabouts.len()
    }

    /// Per-area snapshots, sorted by area id.
    ///
    /// Each area is captured atomically; areas are captured one after another.
    pub fn snapshot_areas(&self) -> Vec<AreaSnapshot> {
        self.area_ids()
            .iter()
            .filter_map(|id| self.with_area(id, |r| r.to_snapshot()).ok())
            .collect()
    }

    /// Rebuilds a ledger, including the agent index, from persisted rosters.
    pub fn from_snapshots(snapshots: Vec<AreaSnapshot>) -> Result<Self, SnapshotError> {
        let ledger = Self::default();
        {
            let mut areas = ledger.areas.write();
            for snapshot in snapshots {
                let area_id = snapshot.area.id.clone();
                if areas.contains_key(&area_id) {
                    return Err(SnapshotError::DuplicateArea(area_id));
                }
                let roster = AreaRoster::from_snapshot(snapshot)?;
                for occupant in roster.open() {
                    if let Some(first) = ledger
                        .whereabouts
                        .insert(occupant.agent_id.clone(), area_id.clone())
                    {
                        return Err(SnapshotError::DuplicatePresence {
                            agent: occupant.agent_id.clone(),
                            first,
                            second: area_id,
                        });
                    }
                }
                areas.insert(area_id, Arc::new(Mutex::new(roster)));
            }
        }
        Ok(ledger)
    }
}
