//! All scanner tables plus the shared pair subscriptions

use super::subscriptions::PairSubscriptions;
use super::table::ScannerTable;
use super::viewport::Viewport;
use crate::domain::{
    OutgoingMessage, PairStatsMsgData, ScannerPairsEventPayload, TickEventPayload,
};
use crate::infrastructure::config::ScannerConfig;
use crate::infrastructure::ScannerMessage;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Index of a table on the board
pub type TableId = usize;

pub type SharedBoard = Arc<RwLock<ScannerBoard>>;

#[derive(Debug)]
pub struct ScannerBoard {
    tables: Vec<ScannerTable>,
    subscriptions: PairSubscriptions,
    active: TableId,
}

impl ScannerBoard {
    pub fn new(tables: Vec<ScannerTable>) -> Self {
        Self {
            tables,
            subscriptions: PairSubscriptions::new(),
            active: 0,
        }
    }

    /// One table per configured entry, with a placeholder viewport height
    /// until the UI reports the real one
    pub fn from_config(config: &ScannerConfig) -> Self {
        let tables = config
            .tables
            .iter()
            .map(|table| {
                ScannerTable::new(
                    table.title.clone(),
                    table.filter(),
                    Viewport::new(20, config.viewport.overscan),
                )
                .with_end_reached_threshold(config.viewport.end_reached_threshold)
            })
            .collect();
        Self::new(tables)
    }

    pub fn shared(self) -> SharedBoard {
        Arc::new(RwLock::new(self))
    }

    pub fn tables(&self) -> &[ScannerTable] {
        &self.tables
    }

    pub fn table(&self, id: TableId) -> Option<&ScannerTable> {
        self.tables.get(id)
    }

    pub fn table_mut(&mut self, id: TableId) -> Option<&mut ScannerTable> {
        self.tables.get_mut(id)
    }

    pub fn active(&self) -> TableId {
        self.active
    }

    pub fn active_table(&self) -> Option<&ScannerTable> {
        self.tables.get(self.active)
    }

    pub fn active_table_mut(&mut self) -> Option<&mut ScannerTable> {
        self.tables.get_mut(self.active)
    }

    /// Focus the next table, wrapping around
    pub fn focus_next(&mut self) {
        if !self.tables.is_empty() {
            self.active = (self.active + 1) % self.tables.len();
        }
    }

    pub fn subscriptions(&self) -> &PairSubscriptions {
        &self.subscriptions
    }

    /// Live scanner-filter subscriptions, one per table
    pub fn filter_subscriptions(&self) -> Vec<OutgoingMessage> {
        self.tables
            .iter()
            .map(|table| OutgoingMessage::ScannerFilter(table.filter().clone()))
            .collect()
    }

    /// Apply one routed message. Returns the number of tables that changed.
    pub fn apply(&mut self, message: &ScannerMessage, now: DateTime<Utc>) -> usize {
        match message {
            ScannerMessage::ScannerPairs(payload) => self.apply_snapshot(payload),
            ScannerMessage::Tick(tick) => self.apply_tick(tick, now),
            ScannerMessage::PairStats(stats) => self.apply_pair_stats(stats),
            ScannerMessage::Unknown(_) => 0,
        }
    }

    /// Route a snapshot to every table whose filter matches (page ignored)
    pub fn apply_snapshot(&mut self, payload: &ScannerPairsEventPayload) -> usize {
        let mut applied = 0;
        for table in self
            .tables
            .iter_mut()
            .filter(|t| t.filter().matches(&payload.filter))
        {
            table.apply_snapshot(&payload.results.pairs);
            applied += 1;
        }
        if applied == 0 {
            debug!("scanner-pairs for a filter no table shows, ignoring");
        }
        applied
    }

    pub fn apply_tick(&mut self, tick: &TickEventPayload, now: DateTime<Utc>) -> usize {
        self.tables
            .iter_mut()
            .filter(|t| t.contains(&tick.pair.pair))
            .map(|t| t.apply_tick(tick, now))
            .filter(|changed| *changed)
            .count()
    }

    pub fn apply_pair_stats(&mut self, stats: &PairStatsMsgData) -> usize {
        self.tables
            .iter_mut()
            .map(|t| t.apply_pair_stats(stats))
            .filter(|changed| *changed)
            .count()
    }

    /// Diff every table's mounted rows and return the subscribe/unsubscribe
    /// frames needed. Mounts go first so a pair moving between tables is
    /// never unsubscribed in between.
    pub fn sync_viewports(&mut self) -> Vec<OutgoingMessage> {
        let diffs: Vec<_> = self.tables.iter_mut().map(|t| t.sync_mounts()).collect();

        let mut messages = Vec::new();
        for diff in &diffs {
            for payload in &diff.mounted {
                messages.extend(self.subscriptions.mount(payload));
            }
        }
        for diff in &diffs {
            for payload in &diff.unmounted {
                messages.extend(self.subscriptions.unmount(&payload.pair));
            }
        }
        messages
    }

    /// Unmount everything and return the frames that release the subscriptions
    pub fn release_all(&mut self) -> Vec<OutgoingMessage> {
        let mut messages = Vec::new();
        for table in &mut self.tables {
            for payload in table.unmount_all() {
                messages.extend(self.subscriptions.unmount(&payload.pair));
            }
        }
        for table in &self.tables {
            messages.push(OutgoingMessage::UnsubscribeScannerFilter(table.filter().clone()));
        }
        messages
    }
}
