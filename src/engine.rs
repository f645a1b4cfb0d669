//! Engine for tabkeeper.
//!
//! One instance per panel lifetime. It owns the ordering, tab metadata,
//! custom names, saved sessions, selection state and both coalescing queues,
//! reacts to host events, exposes the mutators the rendering layer calls, and
//! mirrors owned state into the [`Store`] after every change.
//!
//! Stale tab or group references are never errors: mutators return `false`
//! (or `None`) and leave the model untouched.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::host::{TabEvent, TabHost, TabQuery};
use crate::managers::group_manager::DEFAULT_GROUP_NAME;
use crate::managers::ordering_manager::OrderingModel;
use crate::managers::selection_manager::{ClickKind, FocusDirection, SelectionState};
use crate::managers::session_manager::{snapshot_tabs, SessionBook};
use crate::managers::tab_manager::TabMetadataCache;
use crate::services::backup;
use crate::services::debounce::Debouncer;
use crate::services::reconciliation;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::store::{keys, migrations, Record, Store};
use crate::types::backup::Backup;
use crate::types::errors::{EngineError, HostError, StoreError};
use crate::types::item::{Destination, Group, GroupColor, Item};
use crate::types::session::{RestoreOutcome, SavedSession};
use crate::types::settings::{NewTabPosition, PanelSettings};
use crate::types::tab::{TabId, TabInfo, WindowId, WindowType};

/// Tuning knobs for one engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Window this panel belongs to. `None` tracks every normal window.
    pub window_id: Option<WindowId>,
    /// Quiet interval before queued tab removals are applied.
    pub removal_delay: Duration,
    /// Quiet interval before dirty groups are re-snapshotted.
    pub autosave_delay: Duration,
    /// Tabs created per batch during a session restore.
    pub restore_batch_size: usize,
    /// Pause between restore batches.
    pub restore_batch_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_id: None,
            removal_delay: Duration::from_millis(50),
            autosave_delay: Duration::from_millis(500),
            restore_batch_size: 5,
            restore_batch_delay: Duration::from_millis(100),
        }
    }
}

/// What a call to `flush_due`/`flush_all` did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub removed_tabs: usize,
    pub autosaved_groups: usize,
}

pub struct Engine<S: Store, H: TabHost> {
    store: S,
    host: H,
    config: EngineConfig,
    settings: SettingsEngine,
    model: OrderingModel,
    metadata: TabMetadataCache,
    custom_names: HashMap<TabId, String>,
    sessions: SessionBook,
    selection: SelectionState,
    pending_restore: HashSet<TabId>,
    removal_queue: Debouncer<TabId>,
    autosave_queue: Debouncer<String>,
    removal_passes: usize,
}

impl<S: Store, H: TabHost> Engine<S, H> {
    pub fn new(store: S, host: H, config: EngineConfig) -> Self {
        let removal_queue = Debouncer::new(config.removal_delay);
        let autosave_queue = Debouncer::new(config.autosave_delay);
        Self {
            store,
            host,
            config,
            settings: SettingsEngine::new(),
            model: OrderingModel::new(),
            metadata: TabMetadataCache::new(),
            custom_names: HashMap::new(),
            sessions: SessionBook::new(),
            selection: SelectionState::new(),
            pending_restore: HashSet::new(),
            removal_queue,
            autosave_queue,
            removal_passes: 0,
        }
    }

    // ─── Accessors ───

    pub fn model(&self) -> &OrderingModel {
        &self.model
    }

    pub fn metadata(&self) -> &TabMetadataCache {
        &self.metadata
    }

    pub fn custom_names(&self) -> &HashMap<TabId, String> {
        &self.custom_names
    }

    pub fn sessions(&self) -> &[SavedSession] {
        self.sessions.list()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn settings(&self) -> &PanelSettings {
        self.settings.get_settings()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn is_pending_restore(&self, tab: TabId) -> bool {
        self.pending_restore.contains(&tab)
    }

    /// Number of batched removal passes applied so far.
    pub fn removal_passes(&self) -> usize {
        self.removal_passes
    }

    /// Earliest instant at which a queue becomes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.removal_queue.deadline(), self.autosave_queue.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn position(&self) -> NewTabPosition {
        self.settings.get_settings().new_tab_position
    }

    // ─── Persistence ───

    fn state_value(&self, key: &str) -> Result<Value, StoreError> {
        let value = match key {
            keys::ITEMS => serde_json::to_value(self.model.items())?,
            keys::CUSTOM_NAMES => {
                let names: BTreeMap<String, &String> = self
                    .custom_names
                    .iter()
                    .map(|(id, name)| (id.to_string(), name))
                    .collect();
                serde_json::to_value(names)?
            }
            keys::SAVED_SESSIONS => serde_json::to_value(self.sessions.list())?,
            _ => Value::Null,
        };
        Ok(value)
    }

    /// Writes the given top-level keys as a single store write.
    fn persist(&mut self, state_keys: &[&str]) -> Result<(), EngineError> {
        debug_assert!(self.model.is_consistent());
        let mut record = Record::new();
        for key in state_keys {
            record.insert(key.to_string(), self.state_value(key)?);
        }
        self.store.set(record)?;
        Ok(())
    }

    fn load_items(value: Option<&Value>) -> OrderingModel {
        let Some(entries) = value.and_then(Value::as_array) else {
            return OrderingModel::new();
        };
        let items = entries
            .iter()
            .filter_map(|entry| match serde_json::from_value::<Item>(entry.clone()) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(error = %e, "skipping malformed item");
                    None
                }
            })
            .collect();
        OrderingModel::from_items(items)
    }

    fn load_custom_names(value: Option<&Value>) -> HashMap<TabId, String> {
        let Some(map) = value.and_then(Value::as_object) else {
            return HashMap::new();
        };
        map.iter()
            .filter_map(|(id, name)| Some((TabId(id.parse().ok()?), name.as_str()?.to_string())))
            .collect()
    }

    fn load_sessions(value: Option<&Value>) -> SessionBook {
        let Some(entries) = value.and_then(Value::as_array) else {
            return SessionBook::new();
        };
        let sessions = entries
            .iter()
            .filter_map(|entry| match serde_json::from_value::<SavedSession>(entry.clone()) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(error = %e, "skipping malformed session");
                    None
                }
            })
            .collect();
        SessionBook::from_sessions(sessions)
    }

    /// Re-reads one top-level key after an external write to the store.
    pub fn reload_key(&mut self, key: &str) -> Result<(), EngineError> {
        let record = self.store.get(&[key])?;
        let value = record.get(key);
        match key {
            keys::ITEMS => self.model = Self::load_items(value),
            keys::CUSTOM_NAMES => self.custom_names = Self::load_custom_names(value),
            keys::SAVED_SESSIONS => self.sessions = Self::load_sessions(value),
            keys::SETTINGS => {
                self.settings.load(&self.store)?;
            }
            _ => {}
        }
        Ok(())
    }

    // ─── Startup ───

    /// Migrates and loads persisted state, then reconciles it with the live
    /// tab set. Safe to call again; a second run with the same tabs changes nothing.
    pub fn startup(&mut self) -> Result<(), EngineError> {
        migrations::run_all(&mut self.store)?;
        self.settings.load(&self.store)?;

        let record = self
            .store
            .get(&[keys::ITEMS, keys::CUSTOM_NAMES, keys::SAVED_SESSIONS])?;
        self.model = Self::load_items(record.get(keys::ITEMS));
        self.custom_names = Self::load_custom_names(record.get(keys::CUSTOM_NAMES));
        self.sessions = Self::load_sessions(record.get(keys::SAVED_SESSIONS));

        let live = self.host.query_tabs(&TabQuery {
            window_id: self.config.window_id,
            window_type: Some(WindowType::Normal),
        })?;
        self.metadata.rebuild(&live);
        let live_ids: Vec<TabId> = live.iter().map(|t| t.id).collect();

        let position = self.position();
        let report = reconciliation::startup_sync(&mut self.model, &live_ids, position);

        let live_set: HashSet<TabId> = live_ids.iter().copied().collect();
        let names_before = self.custom_names.len();
        self.custom_names.retain(|id, _| live_set.contains(id));
        let names_pruned = names_before - self.custom_names.len();

        self.selection = SelectionState::new();
        self.pending_restore.clear();
        self.removal_queue.reset();
        self.autosave_queue.reset();

        info!(
            live = self.metadata.len(),
            removed = report.removed.len(),
            added = report.added.len(),
            groups = self.model.groups().count(),
            sessions = self.sessions.list().len(),
            "startup sync complete"
        );

        if report.changed() || names_pruned > 0 || record.get(keys::ITEMS).is_none() {
            self.persist(&[keys::ITEMS, keys::CUSTOM_NAMES])?;
        }
        Ok(())
    }

    // ─── Host events ───

    fn accepts(&self, tab: &TabInfo) -> bool {
        tab.window_type == WindowType::Normal
            && self.config.window_id.map_or(true, |w| w == tab.window_id)
    }

    /// Applies one host event. Removals are only queued; see `flush_due`.
    pub fn handle_event(&mut self, event: TabEvent, now: Instant) -> Result<(), EngineError> {
        match event {
            TabEvent::Created { tab } => self.on_tab_created(tab, now),
            TabEvent::Removed { tab_id, .. } => {
                self.metadata.remove(tab_id);
                self.removal_queue.push(tab_id, now);
                debug!(tab = %tab_id, queued = self.removal_queue.len(), "tab removal queued");
                Ok(())
            }
            TabEvent::Updated { tab_id, changes } => {
                if self.metadata.apply_changes(tab_id, &changes) && changes.is_navigation() {
                    if let Some(group_id) = self.model.find_group_containing(tab_id).map(|g| g.id.clone()) {
                        self.mark_dirty(&group_id, now);
                    }
                }
                Ok(())
            }
            TabEvent::Activated { tab_id, window_id } => {
                self.metadata.set_active(tab_id, window_id);
                Ok(())
            }
        }
    }

    fn on_tab_created(&mut self, tab: TabInfo, now: Instant) -> Result<(), EngineError> {
        if !self.accepts(&tab) {
            debug!(tab = %tab.id, "ignoring tab outside tracked windows");
            return Ok(());
        }
        self.metadata.upsert(&tab);

        // Checked before anything else touches the model: restored tabs are
        // placed by the restore itself.
        if self.pending_restore.remove(&tab.id) {
            debug!(tab = %tab.id, "skipping tab created by session restore");
            return Ok(());
        }
        if self.model.contains(tab.id) {
            return Ok(());
        }

        let destination = reconciliation::placement_for_new_tab(&self.model, &tab, self.position());
        if !self.model.insert_tabs(&[tab.id], &destination) {
            return Ok(());
        }
        if let Destination::IntoGroup { group_id, .. } = &destination {
            self.mark_dirty(group_id, now);
        }
        debug!(tab = %tab.id, ?destination, "tab placed");
        self.persist(&[keys::ITEMS])
    }

    fn mark_dirty(&mut self, group_id: &str, now: Instant) {
        if self.model.group(group_id).is_some_and(Group::autosaves) {
            self.autosave_queue.push(group_id.to_string(), now);
        }
    }

    fn mark_dirty_now(&mut self, group_ids: &[String]) {
        let now = Instant::now();
        for id in group_ids {
            self.mark_dirty(id, now);
        }
    }

    // ─── Queues ───

    /// Drains whichever queues have been quiet long enough.
    pub fn flush_due(&mut self, now: Instant) -> Result<FlushReport, EngineError> {
        let mut report = FlushReport::default();
        if let Some(closed) = self.removal_queue.take_due(now) {
            report.removed_tabs = self.apply_removals(closed, now)?;
        }
        if let Some(groups) = self.autosave_queue.take_due(now) {
            report.autosaved_groups = self.apply_autosave(groups)?;
        }
        Ok(report)
    }

    /// Drains both queues immediately, e.g. on shutdown.
    pub fn flush_all(&mut self, now: Instant) -> Result<FlushReport, EngineError> {
        let mut report = FlushReport::default();
        if !self.removal_queue.is_empty() {
            let closed = self.removal_queue.flush();
            report.removed_tabs = self.apply_removals(closed, now)?;
        }
        if !self.autosave_queue.is_empty() {
            let groups = self.autosave_queue.flush();
            report.autosaved_groups = self.apply_autosave(groups)?;
        }
        Ok(report)
    }

    /// One batch pass over a burst of closed tabs, persisted as one write.
    /// Closed tabs the model never tracked cost no write.
    fn apply_removals(&mut self, closed: Vec<TabId>, now: Instant) -> Result<usize, EngineError> {
        let tracked = closed.iter().filter(|t| self.model.contains(**t)).count();
        let touched = reconciliation::remove_batch(&mut self.model, &closed);
        let mut names_dropped = 0;
        for tab in &closed {
            if self.custom_names.remove(tab).is_some() {
                names_dropped += 1;
            }
            self.selection.forget(*tab);
        }
        for group_id in &touched {
            self.mark_dirty(group_id, now);
        }
        self.removal_passes += 1;
        if tracked == 0 && names_dropped == 0 {
            debug!(count = closed.len(), "closed tabs were untracked, nothing to persist");
            return Ok(0);
        }
        info!(count = tracked, "applied batched tab removals");
        self.persist(&[keys::ITEMS, keys::CUSTOM_NAMES])?;
        Ok(tracked)
    }

    /// Re-snapshots queued groups into their linked sessions in one write.
    fn apply_autosave(&mut self, group_ids: Vec<String>) -> Result<usize, EngineError> {
        let mut saved = 0;
        let mut unlinked = false;
        for group_id in group_ids {
            let Some(group) = self.model.group(&group_id).filter(|g| g.autosaves()).cloned() else {
                continue;
            };
            let Some(session_id) = group.linked_session_id.as_deref() else {
                continue;
            };
            if !self.sessions.contains(session_id) {
                // Session deleted elsewhere: autosave stops silently.
                self.model.link_group(&group_id, None);
                unlinked = true;
                continue;
            }
            let tabs = snapshot_tabs(&group, &self.metadata, &self.custom_names);
            self.sessions.save_snapshot(Some(session_id), &group, tabs);
            saved += 1;
        }

        match (saved > 0, unlinked) {
            (true, true) => self.persist(&[keys::SAVED_SESSIONS, keys::ITEMS])?,
            (true, false) => self.persist(&[keys::SAVED_SESSIONS])?,
            (false, true) => self.persist(&[keys::ITEMS])?,
            (false, false) => {}
        }
        if saved > 0 {
            debug!(saved, "autosaved sessions");
        }
        Ok(saved)
    }

    // ─── Ordering mutators ───

    fn groups_of(&self, tabs: &[TabId]) -> Vec<String> {
        let mut ids = Vec::new();
        for tab in tabs {
            if let Some(group) = self.model.find_group_containing(*tab) {
                if !ids.contains(&group.id) {
                    ids.push(group.id.clone());
                }
            }
        }
        ids
    }

    /// Drag of one or more tabs. Relative structural order is preserved.
    pub fn move_tabs(&mut self, tabs: &[TabId], destination: &Destination) -> Result<bool, EngineError> {
        let mut affected = self.groups_of(tabs);
        if !self.model.move_many(tabs, destination) {
            return Ok(false);
        }
        if let Destination::IntoGroup { group_id, .. } = destination {
            affected.push(group_id.clone());
        }
        self.mark_dirty_now(&affected);
        self.persist(&[keys::ITEMS])?;
        Ok(true)
    }

    pub fn move_group(&mut self, group_id: &str, index: usize) -> Result<bool, EngineError> {
        if !self.model.move_group(group_id, index) {
            return Ok(false);
        }
        self.persist(&[keys::ITEMS])?;
        Ok(true)
    }

    /// Asks the host to close tabs; the model follows through removal events.
    pub fn close_tabs(&mut self, tabs: &[TabId]) -> Result<bool, EngineError> {
        let tracked: Vec<TabId> = tabs.iter().copied().filter(|t| self.model.contains(*t)).collect();
        if tracked.is_empty() {
            return Ok(false);
        }
        self.host.remove_tabs(&tracked)?;
        Ok(true)
    }

    pub fn close_group(&mut self, group_id: &str) -> Result<bool, EngineError> {
        let Some(tabs) = self.model.group(group_id).map(|g| g.tabs.clone()) else {
            return Ok(false);
        };
        self.close_tabs(&tabs)
    }

    // ─── Group lifecycle ───

    pub fn create_group(&mut self, tabs: &[TabId], name: &str) -> Result<Option<String>, EngineError> {
        let auto_save = self.settings.get_settings().default_auto_save;
        let sources = self.groups_of(tabs);
        let Some(group_id) = self.model.create_group(tabs, name, auto_save) else {
            return Ok(None);
        };
        self.mark_dirty_now(&sources);
        self.persist(&[keys::ITEMS])?;
        info!(group = %group_id, "group created");
        Ok(Some(group_id))
    }

    pub fn dissolve_group(&mut self, group_id: &str) -> Result<bool, EngineError> {
        if self.model.dissolve_group(group_id).is_none() {
            return Ok(false);
        }
        self.persist(&[keys::ITEMS])?;
        Ok(true)
    }

    pub fn ungroup_tab(&mut self, tab: TabId, group_id: &str) -> Result<bool, EngineError> {
        if !self.model.ungroup_tab(tab, group_id) {
            return Ok(false);
        }
        self.mark_dirty_now(&[group_id.to_string()]);
        self.persist(&[keys::ITEMS])?;
        Ok(true)
    }

    pub fn rename_group(&mut self, group_id: &str, name: &str) -> Result<bool, EngineError> {
        if !self.model.rename_group(group_id, name) {
            return Ok(false);
        }
        self.mark_dirty_now(&[group_id.to_string()]);
        self.persist(&[keys::ITEMS])?;
        Ok(true)
    }

    pub fn set_group_color(&mut self, group_id: &str, color: GroupColor) -> Result<bool, EngineError> {
        if !self.model.set_group_color(group_id, color) {
            return Ok(false);
        }
        self.mark_dirty_now(&[group_id.to_string()]);
        self.persist(&[keys::ITEMS])?;
        Ok(true)
    }

    pub fn set_group_collapsed(&mut self, group_id: &str, collapsed: bool) -> Result<bool, EngineError> {
        if !self.model.set_group_collapsed(group_id, collapsed) {
            return Ok(false);
        }
        self.persist(&[keys::ITEMS])?;
        Ok(true)
    }

    /// Turning autosave on for an unlinked group saves (and links) a session right away.
    pub fn set_group_auto_save(&mut self, group_id: &str, enabled: bool) -> Result<bool, EngineError> {
        if !self.model.set_group_auto_save(group_id, enabled) {
            return Ok(false);
        }
        let unlinked = self
            .model
            .group(group_id)
            .is_some_and(|g| g.linked_session_id.is_none());
        if enabled && unlinked {
            self.save_session(group_id)?;
        } else {
            self.persist(&[keys::ITEMS])?;
        }
        Ok(true)
    }

    // ─── Custom names ───

    /// Sets a display name for a tracked tab; a blank name clears it.
    pub fn set_custom_name(&mut self, tab: TabId, name: &str) -> Result<bool, EngineError> {
        if !self.model.contains(tab) {
            return Ok(false);
        }
        let name = name.trim();
        let changed = if name.is_empty() {
            self.custom_names.remove(&tab).is_some()
        } else {
            self.custom_names.insert(tab, name.to_string()).as_deref() != Some(name)
        };
        if !changed {
            return Ok(false);
        }
        let groups = self.groups_of(&[tab]);
        self.mark_dirty_now(&groups);
        self.persist(&[keys::CUSTOM_NAMES])?;
        Ok(true)
    }

    pub fn clear_custom_name(&mut self, tab: TabId) -> Result<bool, EngineError> {
        self.set_custom_name(tab, "")
    }

    // ─── Sessions ───

    /// Snapshots a group into its linked session (created if absent) and links it.
    pub fn save_session(&mut self, group_id: &str) -> Result<Option<String>, EngineError> {
        let Some(group) = self.model.group(group_id).cloned() else {
            return Ok(None);
        };
        let tabs = snapshot_tabs(&group, &self.metadata, &self.custom_names);
        let session_id = self
            .sessions
            .save_snapshot(group.linked_session_id.as_deref(), &group, tabs);
        self.model.link_group(group_id, Some(session_id.clone()));
        self.persist(&[keys::ITEMS, keys::SAVED_SESSIONS])?;
        info!(group = %group_id, session = %session_id, "session saved");
        Ok(Some(session_id))
    }

    pub fn rename_session(&mut self, session_id: &str, name: &str) -> Result<bool, EngineError> {
        if !self.sessions.rename(session_id, name) {
            return Ok(false);
        }
        self.persist(&[keys::SAVED_SESSIONS])?;
        Ok(true)
    }

    /// Deletes a session. Groups linked to it are unlinked, which silently
    /// stops their autosave.
    pub fn delete_session(&mut self, session_id: &str) -> Result<bool, EngineError> {
        if self.sessions.delete(session_id).is_none() {
            return Ok(false);
        }
        if self.model.unlink_session(session_id) > 0 {
            self.persist(&[keys::ITEMS, keys::SAVED_SESSIONS])?;
        } else {
            self.persist(&[keys::SAVED_SESSIONS])?;
        }
        Ok(true)
    }

    /// First member of a group that is not already queued for removal.
    fn first_live_tab(&self, group_id: &str) -> Option<TabId> {
        self.model
            .group(group_id)?
            .tabs
            .iter()
            .copied()
            .find(|t| !self.removal_queue.contains(t))
    }

    /// Activates a group's first live tab and focuses its window. A group
    /// whose tabs are closing, or that the host no longer knows, is a no-op.
    pub fn focus_group(&mut self, group_id: &str) -> Result<bool, EngineError> {
        let Some(first) = self.first_live_tab(group_id) else {
            return Ok(false);
        };
        if !Self::host_accepted(self.host.activate_tab(first))? {
            debug!(tab = %first, "group focus skipped, tab is gone");
            return Ok(false);
        }
        if let Some(window) = self.metadata.get(first).map(|m| m.window_id) {
            if !Self::host_accepted(self.host.focus_window(window))? {
                debug!(window = ?window, "window focus skipped, window is gone");
            }
        }
        self.selection.click(first, ClickKind::Plain, &self.model.flatten());
        Ok(true)
    }

    /// Maps stale-reference host failures to `false`; anything else is an error.
    fn host_accepted(result: Result<(), HostError>) -> Result<bool, EngineError> {
        match result {
            Ok(()) => Ok(true),
            Err(HostError::TabNotFound(_) | HostError::WindowNotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Restores a saved session as a new group, or focuses the group that
    /// already holds it. Returns `None` for an unknown session id.
    pub async fn restore_session(&mut self, session_id: &str) -> Result<Option<RestoreOutcome>, EngineError> {
        let Some(session) = self.sessions.get(session_id).cloned() else {
            return Ok(None);
        };

        if let Some(group_id) = self.model.group_linked_to(session_id).map(|g| g.id.clone()) {
            if self.focus_group(&group_id)? {
                info!(session = %session_id, group = %group_id, "session already open, focused");
                return Ok(Some(RestoreOutcome::Focused { group_id }));
            }
            debug!(session = %session_id, group = %group_id, "linked group is closing, restoring anew");
        }

        let mut created = Vec::with_capacity(session.tabs.len());
        let mut failed = 0;
        let batch_size = self.config.restore_batch_size.max(1);

        for (i, batch) in session.tabs.chunks(batch_size).enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.restore_batch_delay).await;
            }
            for entry in batch {
                match self.host.create_tab(&entry.url, self.config.window_id) {
                    Ok(tab) => {
                        // Marked before the next suspension point so the
                        // create handler can never place this tab itself.
                        self.pending_restore.insert(tab.id);
                        self.metadata.upsert(&tab);
                        if let Some(name) = &entry.custom_name {
                            self.custom_names.insert(tab.id, name.clone());
                        }
                        created.push(tab.id);
                    }
                    Err(e) => {
                        warn!(url = %entry.url, error = %e, "failed to restore tab");
                        failed += 1;
                    }
                }
            }
        }

        if created.is_empty() {
            return Ok(Some(RestoreOutcome::NothingRestored { failed }));
        }

        let name = if session.name.trim().is_empty() {
            DEFAULT_GROUP_NAME.to_string()
        } else {
            session.name.clone()
        };
        let group = Group {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            color: session.color,
            tabs: created.clone(),
            auto_save: session.auto_save,
            linked_session_id: Some(session.id.clone()),
            collapsed: false,
        };
        let group_id = group.id.clone();
        let index = match self.position() {
            NewTabPosition::Top => 0,
            NewTabPosition::Bottom => self.model.items().len(),
        };
        self.model.insert_group(group, index);
        self.persist(&[keys::ITEMS, keys::CUSTOM_NAMES])?;

        info!(session = %session_id, created = created.len(), failed, "session restored");
        Ok(Some(RestoreOutcome::Restored {
            group_id,
            created: created.len(),
            failed,
        }))
    }

    // ─── Selection & navigation ───

    pub fn click(&mut self, tab: TabId, kind: ClickKind) -> bool {
        if !self.model.contains(tab) {
            return false;
        }
        let order = self.model.flatten();
        self.selection.click(tab, kind, &order);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected tabs in structural order.
    pub fn selected_tabs(&self) -> Vec<TabId> {
        self.selection.selected_in(&self.model.flatten())
    }

    /// Moves the keyboard focus and activates the newly focused tab.
    pub fn move_focus(&mut self, direction: FocusDirection) -> Result<Option<TabId>, EngineError> {
        let order = self.model.flatten();
        let Some(tab) = self.selection.move_focus(direction, &order) else {
            return Ok(None);
        };
        if let Err(e) = self.host.activate_tab(tab) {
            debug!(tab = %tab, error = %e, "activate failed for focused tab");
        }
        Ok(Some(tab))
    }

    // ─── Settings ───

    pub fn set_setting(&mut self, key: &str, value: Value) -> Result<(), EngineError> {
        self.settings.set_value(&mut self.store, key, value)?;
        Ok(())
    }

    pub fn reset_settings(&mut self) -> Result<(), EngineError> {
        self.settings.reset(&mut self.store)?;
        Ok(())
    }

    // ─── Backup ───

    pub fn export_backup(&mut self) -> Result<Backup, EngineError> {
        self.flush_all(Instant::now())?;
        backup::export_backup(&self.store)
    }

    /// Replaces the store with a backup and re-runs startup sync.
    pub fn import_backup(&mut self, backup: Backup) -> Result<(), EngineError> {
        backup::import_backup(&mut self.store, backup)?;
        self.startup()
    }
}
