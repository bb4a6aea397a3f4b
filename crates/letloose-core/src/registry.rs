//! Registry owning every tracked simulation and reconciling it with the host.

use slotmap::{SlotMap, new_key_type};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ControllerConfig, OverrideLimits};
use crate::document::ControllerDocument;
use crate::host::{Candidate, HostError, SimId};
use crate::managed::ManagedSimulation;
use crate::notify;
use crate::range::RangeField;

new_key_type! {
    /// Generational handle for registry entries.
    pub struct EntryKey;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no tracked simulation with id {0}")]
    UnknownEntry(SimId),
    #[error("no simulation is selected")]
    NoSelection,
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Entries newly tracked; they activate on the next settle.
    pub added: Vec<SimId>,
    /// Entries restored and dropped because their object is no longer active.
    pub removed: Vec<SimId>,
    /// Candidates that passed the managed-kind filter.
    pub matched: usize,
}

/// Outcome of one evaluation tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub evaluated: usize,
    /// Entries skipped this tick after an accessor failure.
    pub skipped: Vec<SimId>,
    /// Entries dropped because their object vanished.
    pub dropped: Vec<SimId>,
}

/// Outcome of applying a persisted document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: Vec<SimId>,
    pub skipped: Vec<SimId>,
}

/// Owns all [`ManagedSimulation`] instances, in the order they were first tracked.
pub struct Registry {
    managed_kind: String,
    limits: OverrideLimits,
    entries: SlotMap<EntryKey, ManagedSimulation>,
    order: Vec<EntryKey>,
    index: HashMap<SimId, EntryKey>,
    pending: Vec<EntryKey>,
    selected: Option<EntryKey>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("managed_kind", &self.managed_kind)
            .field("entry_count", &self.entries.len())
            .field("pending", &self.pending.len())
            .field("selected", &self.selected_id())
            .finish()
    }
}

impl Registry {
    #[must_use]
    pub fn new(managed_kind: impl Into<String>, limits: OverrideLimits) -> Self {
        Self {
            managed_kind: managed_kind.into(),
            limits,
            entries: SlotMap::with_key(),
            order: Vec::new(),
            index: HashMap::new(),
            pending: Vec::new(),
            selected: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.managed_kind.clone(), config.limits)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &SimId) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &SimId) -> Option<&ManagedSimulation> {
        self.index.get(id).and_then(|key| self.entries.get(*key))
    }

    /// Entries in tracking order.
    pub fn iter(&self) -> impl Iterator<Item = &ManagedSimulation> + '_ {
        self.order.iter().filter_map(|key| self.entries.get(*key))
    }

    pub fn ids(&self) -> impl Iterator<Item = &SimId> + '_ {
        self.iter().map(ManagedSimulation::id)
    }

    /// Whether `id` is tracked but still waiting for its deferred activation.
    #[must_use]
    pub fn is_pending(&self, id: &SimId) -> bool {
        self.index
            .get(id)
            .is_some_and(|key| self.pending.contains(key))
    }

    /// Whether any entry would be evaluated on the next tick.
    #[must_use]
    pub fn has_live_entries(&self) -> bool {
        self.entries.values().any(ManagedSimulation::is_live)
    }

    /// Track new matching candidates and drop entries whose object is no longer active.
    ///
    /// New entries are activated by the following [`Registry::settle_pending`] call so the
    /// host object gets one cycle to finish initialising before its baseline is captured.
    pub fn reconcile(&mut self, candidates: Vec<Candidate>) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut active = HashSet::new();

        for candidate in candidates {
            if !candidate.active || candidate.kind != self.managed_kind {
                continue;
            }
            if !active.insert(candidate.id.clone()) {
                continue;
            }
            report.matched += 1;
            if self.index.contains_key(&candidate.id) {
                continue;
            }
            let id = candidate.id;
            let managed =
                ManagedSimulation::new(id.clone(), candidate.label, candidate.accessor, self.limits);
            let key = self.entries.insert(managed);
            self.order.push(key);
            self.index.insert(id.clone(), key);
            self.pending.push(key);
            info!(id = %id, "tracking managed simulation");
            report.added.push(id);
        }

        let stale: Vec<EntryKey> = self
            .order
            .iter()
            .copied()
            .filter(|key| {
                self.entries
                    .get(*key)
                    .is_some_and(|managed| !active.contains(managed.id()))
            })
            .collect();
        for key in stale {
            if let Some(id) = self.untrack(key) {
                report.removed.push(id);
            }
        }

        self.ensure_selection();
        report
    }

    /// Activate entries added by the previous reconciliation. Returns the ids activated.
    pub fn settle_pending(&mut self) -> Vec<SimId> {
        let mut activated = Vec::new();
        let mut vanished = Vec::new();
        for key in std::mem::take(&mut self.pending) {
            let Some(managed) = self.entries.get_mut(key) else {
                continue;
            };
            if !managed.enabled() || managed.force_disabled() {
                continue;
            }
            match managed.activate() {
                Ok(advisories) => {
                    let text = notify::render(&advisories);
                    managed.set_last_advisory(text);
                    activated.push(managed.id().clone());
                }
                Err(err) => {
                    warn!(id = %managed.id(), ?err, "activation failed");
                    if Self::recover(managed, &err) {
                        vanished.push(key);
                    } else {
                        managed.set_last_advisory(format!("Activation failed: {err}"));
                    }
                }
            }
        }
        for key in vanished {
            self.drop_entry(key);
        }
        activated
    }

    /// Evaluate every live entry at `angle`.
    pub fn tick(&mut self, angle: f32) -> TickReport {
        let mut report = TickReport::default();
        let mut vanished = Vec::new();
        for key in &self.order {
            let Some(managed) = self.entries.get_mut(*key) else {
                continue;
            };
            if !managed.is_live() {
                continue;
            }
            match managed.evaluate(angle) {
                Ok(_) => report.evaluated += 1,
                Err(err) => {
                    debug!(id = %managed.id(), ?err, "evaluation failed");
                    if Self::recover(managed, &err) {
                        vanished.push(*key);
                        report.dropped.push(managed.id().clone());
                    } else {
                        report.skipped.push(managed.id().clone());
                    }
                }
            }
        }
        for key in vanished {
            self.drop_entry(key);
        }
        report
    }

    /// Try to put the host back after a failed call. Returns true when the object is gone.
    fn recover(managed: &mut ManagedSimulation, err: &HostError) -> bool {
        if err.is_gone() {
            return true;
        }
        match managed.restore() {
            Ok(()) => false,
            Err(restore_err) if restore_err.is_gone() => true,
            Err(restore_err) => {
                warn!(id = %managed.id(), ?restore_err, "restore after failure also failed");
                false
            }
        }
    }

    /// Flip the enabled flag: restore on disable, reactivate on enable. Returns the new state.
    pub fn toggle_enable(&mut self, id: &SimId) -> Result<bool, RegistryError> {
        let key = self.key_of(id)?;
        let pending = self.pending.contains(&key);
        let managed = self
            .entries
            .get_mut(key)
            .ok_or_else(|| RegistryError::UnknownEntry(id.clone()))?;

        if managed.enabled() {
            managed.set_enabled(false);
            managed.restore()?;
            info!(id = %id, "disabled managed simulation");
        } else {
            managed.set_enabled(true);
            if !pending && !managed.force_disabled() {
                let advisories = managed.reactivate()?;
                managed.set_last_advisory(notify::render(&advisories));
            }
            info!(id = %id, "enabled managed simulation");
        }
        Ok(managed.enabled())
    }

    /// Force-disable and restore every entry, whatever its enabled state.
    pub fn teardown(&mut self) {
        for key in &self.order {
            let Some(managed) = self.entries.get_mut(*key) else {
                continue;
            };
            managed.set_force_disabled(true);
            if let Err(err) = managed.restore() {
                if err.is_gone() {
                    debug!(id = %managed.id(), "object gone before teardown restore");
                } else {
                    warn!(id = %managed.id(), ?err, "teardown restore failed");
                }
            }
        }
        info!(entries = self.entries.len(), "tore down managed simulations");
    }

    /// Lift the force-disable set by [`Registry::teardown`] and reapply enabled overrides.
    pub fn resume(&mut self) {
        let mut vanished = Vec::new();
        for key in &self.order {
            let Some(managed) = self.entries.get_mut(*key) else {
                continue;
            };
            managed.set_force_disabled(false);
            if !managed.enabled() || !managed.ever_activated() {
                continue;
            }
            match managed.reactivate() {
                Ok(advisories) => managed.set_last_advisory(notify::render(&advisories)),
                Err(err) => {
                    warn!(id = %managed.id(), ?err, "reactivation failed");
                    if Self::recover(managed, &err) {
                        vanished.push(*key);
                    }
                }
            }
        }
        for key in vanished {
            self.drop_entry(key);
        }
    }

    /// Restore and remove every entry.
    pub fn clear(&mut self) -> Vec<SimId> {
        let keys = self.order.clone();
        keys.into_iter().filter_map(|key| self.untrack(key)).collect()
    }

    /// Persistable records for every activated entry, in tracking order.
    #[must_use]
    pub fn document(&self) -> ControllerDocument {
        ControllerDocument::new(self.iter().filter_map(ManagedSimulation::to_record).collect())
    }

    /// Apply persisted records to tracked entries; unknown ids are skipped individually.
    pub fn apply_document(&mut self, document: &ControllerDocument) -> ApplyReport {
        let mut report = ApplyReport::default();
        for record in &document.records {
            let Some(&key) = self.index.get(&record.id) else {
                debug!(id = %record.id, "skipping record for untracked simulation");
                report.skipped.push(record.id.clone());
                continue;
            };
            self.pending.retain(|pending| *pending != key);
            let Some(managed) = self.entries.get_mut(key) else {
                continue;
            };
            match managed.apply_record(record) {
                Ok(()) => report.applied.push(record.id.clone()),
                Err(err) => {
                    warn!(id = %record.id, ?err, "failed to apply persisted record");
                    report.skipped.push(record.id.clone());
                    if err.is_gone() {
                        self.drop_entry(key);
                    } else if !managed.ever_activated() {
                        self.pending.push(key);
                    }
                }
            }
        }
        self.ensure_selection();
        report
    }

    /// Id of the entry the shared control binding currently points at.
    #[must_use]
    pub fn selected_id(&self) -> Option<&SimId> {
        self.selected
            .and_then(|key| self.entries.get(key))
            .map(ManagedSimulation::id)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&ManagedSimulation> {
        self.selected.and_then(|key| self.entries.get(key))
    }

    /// Rebind the shared controls to `id`.
    pub fn select(&mut self, id: &SimId) -> Result<(), RegistryError> {
        let key = self.key_of(id)?;
        self.rebind(Some(key));
        Ok(())
    }

    /// Edit a range field of the selected entry. Returns the value applied.
    pub fn edit_selected(&mut self, field: RangeField, value: f32) -> Result<f32, RegistryError> {
        let managed = self
            .selected
            .and_then(|key| self.entries.get_mut(key))
            .ok_or(RegistryError::NoSelection)?;
        Ok(managed.edit_range(field, value))
    }

    /// Recompute advisory text for the selected entry from live host values.
    pub fn refresh_selected_advisory(&mut self) -> Option<&str> {
        let key = self.selected?;
        let managed = self.entries.get_mut(key)?;
        if !managed.ever_activated() {
            return Some(managed.last_advisory());
        }
        match notify::advisory_text(managed) {
            Ok(text) => managed.set_last_advisory(text),
            Err(err) => debug!(id = %managed.id(), ?err, "advisory refresh failed"),
        }
        Some(managed.last_advisory())
    }

    fn key_of(&self, id: &SimId) -> Result<EntryKey, RegistryError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| RegistryError::UnknownEntry(id.clone()))
    }

    /// Keep the selection valid: fall back to the first entry, or none when empty.
    fn ensure_selection(&mut self) {
        let current = self.selected.filter(|key| self.entries.contains_key(*key));
        let next = current.or_else(|| self.order.first().copied());
        if next != self.selected || next.is_some_and(|key| !self.is_bound(key)) {
            self.rebind(next);
        }
    }

    fn is_bound(&self, key: EntryKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(ManagedSimulation::has_bound_controls)
    }

    fn rebind(&mut self, next: Option<EntryKey>) {
        if let Some(previous) = self.selected.and_then(|key| self.entries.get_mut(key)) {
            previous.set_bound_controls(false);
        }
        self.selected = next;
        if let Some(managed) = next.and_then(|key| self.entries.get_mut(key)) {
            managed.set_bound_controls(true);
            debug!(id = %managed.id(), "controls bound");
        }
    }

    /// Restore then remove an entry.
    fn untrack(&mut self, key: EntryKey) -> Option<SimId> {
        if let Some(managed) = self.entries.get_mut(key) {
            match managed.restore() {
                Ok(()) => {}
                Err(err) if err.is_gone() => {
                    debug!(id = %managed.id(), "object gone; nothing to restore");
                }
                Err(err) => warn!(id = %managed.id(), ?err, "restore on removal failed"),
            }
        }
        let id = self.drop_entry(key)?;
        info!(id = %id, "untracked managed simulation");
        Some(id)
    }

    /// Remove an entry without touching the host.
    fn drop_entry(&mut self, key: EntryKey) -> Option<SimId> {
        let managed = self.entries.remove(key)?;
        self.order.retain(|existing| *existing != key);
        self.pending.retain(|existing| *existing != key);
        self.index.remove(managed.id());
        if self.selected == Some(key) {
            self.selected = None;
            self.ensure_selection();
        }
        Some(managed.id().clone())
    }
}
