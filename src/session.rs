use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::clock::{Clock, TimeSource};
use crate::db::{Storage, LAST_SELECTED_PANELS_KEY, MATCHES_KEY, PANELS_KEY};
use crate::error::{Rejection, TrackerResult};
use crate::export::{ExportDocument, ImportReport};
use crate::models::{
    Event, EventDraft, EventPatch, Match, MatchMetadata, PanelSelections, Period, PlayerPanel,
    TeamKey,
};
use crate::tracker::MatchTracker;
use crate::workers::{ClockTick, FlushReport, MatchTicker, PersistRequest, PersistWorker};

/// Capacity of the tick channel; ticks beyond it are dropped
const TICK_BUFFER: usize = 8;

/// Application context tying the tracker to storage and the clock display.
///
/// Holds what would otherwise be global state: the open match, the ticker
/// and the panel library. Every mutating call queues a save of the affected
/// collection and returns without waiting for it.
pub struct TrackerSession {
    tracker: MatchTracker,
    panels: Vec<PlayerPanel>,
    last_selected_panels: PanelSelections,
    current_match: Option<String>,
    ticker: MatchTicker,
    tick_rx: mpsc::Receiver<ClockTick>,
    persist_tx: mpsc::UnboundedSender<PersistRequest>,

    /// Stored list entries that did not parse, written back with every save
    unreadable: HashMap<&'static str, Vec<Value>>,

    /// Keys whose stored document could not be read at all; never overwritten
    held_keys: HashSet<&'static str>,
}

impl TrackerSession {
    /// Load saved matches and panels and start the persistence worker.
    ///
    /// List entries that fail to parse are skipped and kept in storage as they
    /// are. A key that cannot be read at all starts out empty and is left
    /// untouched in storage for the rest of the session.
    pub async fn load(
        storage: Arc<dyn Storage>,
        time_source: Arc<dyn TimeSource>,
        tick_interval: Duration,
    ) -> Self {
        let mut unreadable = HashMap::new();
        let mut held_keys = HashSet::new();

        let matches: Loaded<Vec<Match>> = load_list(storage.as_ref(), MATCHES_KEY).await;
        let panels: Loaded<Vec<PlayerPanel>> = load_list(storage.as_ref(), PANELS_KEY).await;
        let selections: Loaded<PanelSelections> =
            load_document(storage.as_ref(), LAST_SELECTED_PANELS_KEY).await;

        let matches = matches.into_value(MATCHES_KEY, &mut unreadable, &mut held_keys);
        let panels = panels.into_value(PANELS_KEY, &mut unreadable, &mut held_keys);
        let last_selected_panels =
            selections.into_value(LAST_SELECTED_PANELS_KEY, &mut unreadable, &mut held_keys);

        info!(
            "Loaded {} matches and {} player panels",
            matches.len(),
            panels.len()
        );

        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        tokio::spawn(PersistWorker::new(storage, persist_rx).run());

        let (tick_tx, tick_rx) = mpsc::channel(TICK_BUFFER);

        Self {
            tracker: MatchTracker::with_matches(Clock::new(time_source), matches),
            panels,
            last_selected_panels,
            current_match: None,
            ticker: MatchTicker::new(tick_tx, tick_interval),
            tick_rx,
            persist_tx,
            unreadable,
            held_keys,
        }
    }

    pub fn tracker(&self) -> &MatchTracker {
        &self.tracker
    }

    pub fn matches(&self) -> &[Match] {
        self.tracker.matches()
    }

    pub fn panels(&self) -> &[PlayerPanel] {
        &self.panels
    }

    pub fn last_selected_panels(&self) -> &PanelSelections {
        &self.last_selected_panels
    }

    pub fn current_match(&self) -> Option<&Match> {
        self.current_match
            .as_deref()
            .and_then(|id| self.tracker.find_by_id(id))
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    pub fn create_match(
        &mut self,
        team1_name: &str,
        team2_name: &str,
        metadata: MatchMetadata,
    ) -> String {
        let id = self.tracker.create(team1_name, team2_name, metadata).id.clone();
        self.persist_matches();
        id
    }

    pub fn delete_match(&mut self, match_id: &str) -> TrackerResult<()> {
        self.tracker.delete(match_id)?;
        if self.current_match.as_deref() == Some(match_id) {
            self.close_match();
        }
        self.persist_matches();
        Ok(())
    }

    /// Show a match; its clock starts ticking again if it was left running
    pub fn open_match(&mut self, match_id: &str) -> TrackerResult<&Match> {
        if self.tracker.find_by_id(match_id).is_none() {
            return Err(Rejection::MatchNotFound(match_id.to_string()));
        }

        self.current_match = Some(match_id.to_string());
        self.tracker.sync_elapsed(match_id)?;
        self.refresh_ticker();

        self.current_match().ok_or(Rejection::NoOpenMatch)
    }

    /// Leave the match view and cancel its ticker
    pub fn close_match(&mut self) {
        self.ticker.stop();
        self.discard_queued_ticks();
        self.current_match = None;
    }

    pub fn start_period(&mut self) -> TrackerResult<Period> {
        let id = self.open_id()?;
        let period = self.tracker.start_period(&id)?;
        self.after_clock_change();
        Ok(period)
    }

    pub fn end_period(&mut self) -> TrackerResult<Period> {
        let id = self.open_id()?;
        let period = self.tracker.end_period(&id)?;
        self.after_clock_change();
        Ok(period)
    }

    pub fn pause(&mut self) -> TrackerResult<u32> {
        let id = self.open_id()?;
        let elapsed = self.tracker.pause(&id)?;
        self.after_clock_change();
        Ok(elapsed)
    }

    pub fn resume(&mut self) -> TrackerResult<u32> {
        let id = self.open_id()?;
        let elapsed = self.tracker.resume(&id)?;
        self.after_clock_change();
        Ok(elapsed)
    }

    pub fn record_event(&mut self, draft: EventDraft) -> TrackerResult<Event> {
        let id = self.open_id()?;
        let event = self.tracker.record_event(&id, draft)?.clone();
        self.persist_matches();
        Ok(event)
    }

    pub fn edit_event(&mut self, event_id: &str, patch: EventPatch) -> TrackerResult<Event> {
        let id = self.open_id()?;
        let event = self.tracker.edit_event(&id, event_id, patch)?.clone();
        self.persist_matches();
        Ok(event)
    }

    /// Remove an event; confirmation is up to the caller
    pub fn delete_event(&mut self, event_id: &str) -> TrackerResult<Event> {
        let id = self.open_id()?;
        let event = self.tracker.delete_event(&id, event_id)?;
        self.persist_matches();
        Ok(event)
    }

    pub fn update_metadata(&mut self, metadata: MatchMetadata) -> TrackerResult<()> {
        let id = self.open_id()?;
        self.tracker.update_metadata(&id, metadata)?;
        self.persist_matches();
        Ok(())
    }

    pub fn rename_team(&mut self, team: TeamKey, name: &str) -> TrackerResult<()> {
        let id = self.open_id()?;
        self.tracker.rename_team(&id, team, name)?;
        self.persist_matches();
        Ok(())
    }

    pub fn update_player(
        &mut self,
        team: TeamKey,
        player_id: &str,
        name: &str,
        position: &str,
    ) -> TrackerResult<()> {
        let id = self.open_id()?;
        self.tracker
            .update_player(&id, team, player_id, name, position)?;
        self.persist_matches();
        Ok(())
    }

    pub fn create_panel(&mut self, name: &str, player_names: &[String]) -> String {
        let panel = PlayerPanel::new(
            name,
            player_names,
            self.tracker.clock().now_millis(),
        );
        let id = panel.id.clone();

        info!("Created panel '{}' with {} players", panel.name, panel.players.len());
        self.panels.push(panel);
        self.persist_panels();
        id
    }

    pub fn update_panel(
        &mut self,
        panel_id: &str,
        name: &str,
        player_names: &[String],
    ) -> TrackerResult<()> {
        let panel = self
            .panels
            .iter_mut()
            .find(|p| p.id == panel_id)
            .ok_or_else(|| Rejection::PanelNotFound(panel_id.to_string()))?;

        panel.replace(name, player_names);
        self.persist_panels();
        Ok(())
    }

    /// Delete a panel; rosters it was copied into keep their names
    pub fn delete_panel(&mut self, panel_id: &str) -> TrackerResult<()> {
        let index = self
            .panels
            .iter()
            .position(|p| p.id == panel_id)
            .ok_or_else(|| Rejection::PanelNotFound(panel_id.to_string()))?;

        self.panels.remove(index);
        self.persist_panels();

        let before = self.last_selected_panels.len();
        self.last_selected_panels.retain(|_, id| id != panel_id);
        if self.last_selected_panels.len() != before {
            self.persist_selections();
        }
        Ok(())
    }

    /// Copy a panel onto one team of the open match and remember the choice
    pub fn select_panel(&mut self, team: TeamKey, panel_id: &str) -> TrackerResult<usize> {
        let id = self.open_id()?;
        let panel = self
            .panels
            .iter()
            .find(|p| p.id == panel_id)
            .ok_or_else(|| Rejection::PanelNotFound(panel_id.to_string()))?;

        let copied = self.tracker.apply_panel(&id, team, panel)?;
        self.last_selected_panels
            .insert(team, panel_id.to_string());

        self.persist_matches();
        self.persist_selections();
        Ok(copied)
    }

    /// Wait for the next clock tick and store its elapsed time on the match.
    ///
    /// Ticks left over from a ticker that has since been stopped or restarted
    /// are dropped, so nothing arrives while the open match is not running.
    pub async fn next_tick(&mut self) -> Option<ClockTick> {
        loop {
            let tick = self.tick_rx.recv().await?;
            if !self.ticker.is_current(&tick) {
                debug!("Dropping stale tick for {} ({})", tick.match_id, tick.period);
                continue;
            }

            // The match may have been deleted since the tick was sent
            let _ = self.tracker.sync_elapsed(&tick.match_id);
            return Some(tick);
        }
    }

    pub fn export(&self) -> ExportDocument {
        ExportDocument::new(
            self.tracker.matches().to_vec(),
            self.panels.clone(),
            self.last_selected_panels.clone(),
        )
    }

    /// Merge an export into the session, keeping existing entries on id clashes
    pub fn import(&mut self, doc: ExportDocument) -> ImportReport {
        let mut report = ImportReport::default();

        for m in doc.matches {
            if self.tracker.insert(m) {
                report.matches_added += 1;
            } else {
                report.matches_skipped += 1;
            }
        }

        for panel in doc.player_panels {
            if self.panels.iter().any(|p| p.id == panel.id) {
                report.panels_skipped += 1;
            } else {
                self.panels.push(panel);
                report.panels_added += 1;
            }
        }

        for (team, panel_id) in doc.last_selected_panels {
            self.last_selected_panels.entry(team).or_insert(panel_id);
        }

        info!("Import from {} export: {}", doc.version, report);

        self.persist_matches();
        self.persist_panels();
        self.persist_selections();
        report
    }

    /// Wait until every queued save has been attempted
    pub async fn flush(&self) -> FlushReport {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.persist_tx.send(PersistRequest::Flush(reply_tx)).is_err() {
            warn!("Persist worker is not running");
            return FlushReport::default();
        }
        reply_rx.await.unwrap_or_default()
    }

    fn open_id(&self) -> TrackerResult<String> {
        self.current_match.clone().ok_or(Rejection::NoOpenMatch)
    }

    fn after_clock_change(&mut self) {
        self.refresh_ticker();
        self.persist_matches();
    }

    /// Tick only while the open match is running in a playing period
    fn refresh_ticker(&mut self) {
        let running = self.current_match().filter(|m| m.is_running()).cloned();
        self.ticker.stop();
        self.discard_queued_ticks();

        if let Some(m) = running {
            self.ticker.start(&m, self.tracker.clock().source());
        }
    }

    fn discard_queued_ticks(&mut self) {
        while self.tick_rx.try_recv().is_ok() {}
    }

    fn persist_matches(&self) {
        self.queue_save(MATCHES_KEY, self.tracker.matches());
    }

    fn persist_panels(&self) {
        self.queue_save(PANELS_KEY, &self.panels);
    }

    fn persist_selections(&self) {
        self.queue_save(LAST_SELECTED_PANELS_KEY, &self.last_selected_panels);
    }

    fn queue_save<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) {
        if self.held_keys.contains(key) {
            warn!("'{}' could not be read at load, not overwriting it", key);
            return;
        }

        let mut value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to serialize '{}': {}", key, e);
                return;
            }
        };

        if let (Value::Array(entries), Some(kept)) = (&mut value, self.unreadable.get(key)) {
            entries.extend(kept.iter().cloned());
        }

        if self
            .persist_tx
            .send(PersistRequest::Save { key, value })
            .is_err()
        {
            warn!("Persist worker stopped, '{}' not saved", key);
        } else {
            debug!("Queued save of '{}'", key);
        }
    }
}

/// One stored key as read at load time
struct Loaded<T> {
    value: T,
    unreadable: Vec<Value>,
    held: bool,
}

impl<T: Default> Loaded<T> {
    fn ready(value: T) -> Self {
        Self {
            value,
            unreadable: Vec::new(),
            held: false,
        }
    }

    fn held() -> Self {
        Self {
            value: T::default(),
            unreadable: Vec::new(),
            held: true,
        }
    }

    fn into_value(
        self,
        key: &'static str,
        unreadable: &mut HashMap<&'static str, Vec<Value>>,
        held_keys: &mut HashSet<&'static str>,
    ) -> T {
        if self.held {
            held_keys.insert(key);
        }
        if !self.unreadable.is_empty() {
            unreadable.insert(key, self.unreadable);
        }
        self.value
    }
}

enum Stored {
    Missing,
    Found(Value),
    Failed,
}

async fn load_raw(storage: &dyn Storage, key: &str) -> Stored {
    match storage.load(key).await {
        Ok(Some(value)) => Stored::Found(value),
        Ok(None) => Stored::Missing,
        Err(e) => {
            warn!("Failed to load '{}': {}", key, e);
            Stored::Failed
        }
    }
}

/// Read a stored list entry by entry, setting aside entries that do not parse
async fn load_list<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Loaded<Vec<T>> {
    let entries = match load_raw(storage, key).await {
        Stored::Found(Value::Array(entries)) => entries,
        Stored::Found(_) => {
            warn!("'{}' is not a list, leaving it untouched", key);
            return Loaded::held();
        }
        Stored::Missing => return Loaded::ready(Vec::new()),
        Stored::Failed => return Loaded::held(),
    };

    let mut loaded = Loaded::ready(Vec::with_capacity(entries.len()));
    for entry in entries {
        match T::deserialize(&entry) {
            Ok(item) => loaded.value.push(item),
            Err(e) => {
                warn!("Skipping unreadable entry in '{}': {}", key, e);
                loaded.unreadable.push(entry);
            }
        }
    }
    loaded
}

/// Read a stored document that only makes sense as a whole
async fn load_document<T: DeserializeOwned + Default>(
    storage: &dyn Storage,
    key: &str,
) -> Loaded<T> {
    match load_raw(storage, key).await {
        Stored::Found(value) => match serde_json::from_value(value) {
            Ok(document) => Loaded::ready(document),
            Err(e) => {
                warn!("'{}' is unreadable, leaving it untouched: {}", key, e);
                Loaded::held()
            }
        },
        Stored::Missing => Loaded::ready(T::default()),
        Stored::Failed => Loaded::held(),
    }
}
