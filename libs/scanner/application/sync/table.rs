//! One scanner table: the rows of a single filter

use super::viewport::Viewport;
use crate::domain::{
    PairStatsMsgData, PairSubscriptionPayload, ScannerApiResponse, ScannerFilter, ScannerResult,
    ScannerTableRow, TickEventPayload,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Columns the user can sort by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    VolumeUsd,
    /// Sorts by creation time, so descending is newest first
    Age,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Error(String),
}

/// A page fetch claimed by a table.
///
/// Carries the table's load generation; a response is only applied while the
/// generation is still current.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub generation: u64,
    pub filter: ScannerFilter,
}

impl PageRequest {
    pub fn page(&self) -> u32 {
        self.filter.page.unwrap_or(1)
    }
}

/// Mount changes produced by [`ScannerTable::sync_mounts`]
#[derive(Debug, Default, PartialEq)]
pub struct MountDiff {
    pub mounted: Vec<PairSubscriptionPayload>,
    pub unmounted: Vec<PairSubscriptionPayload>,
}

impl MountDiff {
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty() && self.unmounted.is_empty()
    }
}

#[derive(Debug)]
pub struct ScannerTable {
    title: String,
    filter: ScannerFilter,
    sort: Option<SortState>,
    status: LoadStatus,
    rows: Vec<ScannerTableRow>,
    index: HashMap<String, usize>,
    page: u32,
    total_rows: u64,
    last_page_len: usize,
    fetching_more: bool,
    generation: u64,
    viewport: Viewport,
    end_reached_threshold: usize,
    cursor: usize,
    mounted: HashMap<String, PairSubscriptionPayload>,
}

impl ScannerTable {
    pub fn new(title: impl Into<String>, filter: ScannerFilter, viewport: Viewport) -> Self {
        let title = title.into();
        let sort = initial_sort(&title);
        Self {
            title,
            filter: filter.without_page(),
            sort,
            status: LoadStatus::Loading,
            rows: Vec::new(),
            index: HashMap::new(),
            page: 0,
            total_rows: 0,
            last_page_len: 0,
            fetching_more: false,
            generation: 0,
            viewport,
            end_reached_threshold: 10,
            cursor: 0,
            mounted: HashMap::new(),
        }
    }

    pub fn with_end_reached_threshold(mut self, threshold: usize) -> Self {
        self.end_reached_threshold = threshold;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Filter without pagination
    pub fn filter(&self) -> &ScannerFilter {
        &self.filter
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn rows(&self) -> &[ScannerTableRow] {
        &self.rows
    }

    pub fn row(&self, id: &str) -> Option<&ScannerTableRow> {
        self.index.get(id).map(|&i| &self.rows[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    pub fn is_fetching_more(&self) -> bool {
        self.fetching_more
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected_row(&self) -> Option<&ScannerTableRow> {
        self.rows.get(self.cursor)
    }

    /// Ids currently mounted
    pub fn mounted_ids(&self) -> HashSet<&str> {
        self.mounted.keys().map(String::as_str).collect()
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Start over from page 1. Requests claimed before this are stale.
    pub fn begin_reload(&mut self) -> PageRequest {
        self.status = LoadStatus::Loading;
        self.fetching_more = false;
        self.generation += 1;
        self.request(1)
    }

    /// Whether a response to `request` may still be applied
    pub fn is_current(&self, request: &PageRequest) -> bool {
        request.generation == self.generation
    }

    fn request(&self, page: u32) -> PageRequest {
        PageRequest {
            generation: self.generation,
            filter: self.filter.with_page(page),
        }
    }

    /// More rows exist server-side
    pub fn has_more(&self) -> bool {
        (self.rows.len() as u64) < self.total_rows && self.last_page_len > 0
    }

    /// The viewport's last visible row is near the end of the loaded rows
    pub fn end_reached(&self) -> bool {
        self.viewport
            .near_end(self.rows.len(), self.end_reached_threshold)
    }

    /// Claim the next page if the user scrolled close to the end.
    ///
    /// Marks the table as fetching so the same page is not requested twice.
    pub fn next_page_request(&mut self) -> Option<PageRequest> {
        if self.status != LoadStatus::Ready
            || self.fetching_more
            || !self.has_more()
            || !self.end_reached()
        {
            return None;
        }
        self.fetching_more = true;
        Some(self.request(self.page + 1))
    }

    /// Apply a fetched page. Page 1 replaces the rows; later pages append
    /// rows whose id is not already present.
    pub fn apply_page(&mut self, page: u32, response: &ScannerApiResponse) {
        let page = page.max(1);
        if page == 1 {
            self.rows.clear();
            self.index.clear();
            self.cursor = 0;
            self.viewport.home();
        }

        let mut added = 0;
        for result in &response.pairs {
            if self.index.contains_key(&result.pair_address) {
                continue;
            }
            self.index.insert(result.pair_address.clone(), self.rows.len());
            self.rows.push(ScannerTableRow::from(result));
            added += 1;
        }

        debug!(
            "[{}] page {}: {} pairs, {} new, total rows {}",
            self.title,
            page,
            response.pairs.len(),
            added,
            response.total_rows
        );

        self.page = page;
        self.total_rows = response.total_rows;
        self.last_page_len = response.pairs.len();
        self.fetching_more = false;
        self.status = LoadStatus::Ready;
        self.resort();
    }

    /// A page request failed. Page 1 failures put the table in the error
    /// state; later failures keep the loaded rows.
    pub fn apply_page_error(&mut self, page: u32, message: impl Into<String>) {
        let message = message.into();
        if page <= 1 {
            self.status = LoadStatus::Error(message);
        } else {
            warn!("[{}] failed to load page {}: {}", self.title, page, message);
        }
        self.fetching_more = false;
    }

    // =========================================================================
    // Live updates
    // =========================================================================

    /// Replace the rows with an authoritative snapshot of this table's filter.
    ///
    /// Rows missing from the snapshot are dropped. Rows present before keep
    /// their live price flash.
    pub fn apply_snapshot(&mut self, pairs: &[ScannerResult]) {
        let mut previous: HashMap<String, ScannerTableRow> = self
            .rows
            .drain(..)
            .map(|row| (row.id.clone(), row))
            .collect();
        self.index.clear();

        for result in pairs {
            if self.index.contains_key(&result.pair_address) {
                continue;
            }
            let row = match previous.remove(&result.pair_address) {
                Some(mut row) => {
                    row.refresh_from(result);
                    row
                }
                None => ScannerTableRow::from(result),
            };
            self.index.insert(row.id.clone(), self.rows.len());
            self.rows.push(row);
        }

        self.total_rows = self.total_rows.max(self.rows.len() as u64);
        if self.page == 0 {
            self.page = 1;
        }
        if self.last_page_len == 0 {
            self.last_page_len = self.rows.len();
        }
        self.status = LoadStatus::Ready;
        self.resort();
    }

    /// Merge swaps into the matching row. Returns whether the row changed.
    pub fn apply_tick(&mut self, tick: &TickEventPayload, now: DateTime<Utc>) -> bool {
        let Some(&i) = self.index.get(&tick.pair.pair) else {
            return false;
        };
        let changed = self.rows[i].apply_tick(&tick.swaps, now);
        if changed && matches!(self.sort, Some(SortState { column: SortColumn::VolumeUsd, .. })) {
            self.resort();
        }
        changed
    }

    /// Merge pair stats into the matching row. Returns whether the row changed.
    pub fn apply_pair_stats(&mut self, stats: &PairStatsMsgData) -> bool {
        match self.index.get(&stats.pair.pair_address) {
            Some(&i) => self.rows[i].apply_pair_stats(stats),
            None => false,
        }
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// Cycle a column through descending, ascending and unsorted
    pub fn toggle_sort(&mut self, column: SortColumn) {
        self.sort = match self.sort {
            Some(SortState {
                column: current,
                direction: SortDirection::Desc,
            }) if current == column => Some(SortState {
                column,
                direction: SortDirection::Asc,
            }),
            Some(SortState {
                column: current,
                direction: SortDirection::Asc,
            }) if current == column => None,
            _ => Some(SortState {
                column,
                direction: SortDirection::Desc,
            }),
        };
        self.resort();
    }

    fn resort(&mut self) {
        if let Some(sort) = self.sort {
            self.rows.sort_by(|a, b| {
                let ordering = match sort.column {
                    SortColumn::VolumeUsd => a.volume_usd.total_cmp(&b.volume_usd),
                    SortColumn::Age => a.token_created_at.cmp(&b.token_created_at),
                };
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.id.clone(), i))
            .collect();
        self.viewport.clamp(self.rows.len());
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport.set_height(height, self.rows.len());
        self.viewport.ensure_visible(self.cursor, self.rows.len());
    }

    /// Move the cursor, scrolling the viewport to keep it visible
    pub fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        self.cursor = if delta.is_negative() {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor.saturating_add(delta as usize).min(last)
        };
        self.viewport.ensure_visible(self.cursor, self.rows.len());
    }

    pub fn page_down(&mut self) {
        self.move_cursor(self.viewport.height.max(1) as isize);
    }

    pub fn page_up(&mut self) {
        self.move_cursor(-(self.viewport.height.max(1) as isize));
    }

    pub fn home(&mut self) {
        self.cursor = 0;
        self.viewport.home();
    }

    pub fn end(&mut self) {
        self.cursor = self.rows.len().saturating_sub(1);
        self.viewport.end(self.rows.len());
    }

    /// Diff the mounted set against the rows currently in the mounted range
    pub fn sync_mounts(&mut self) -> MountDiff {
        let range = self.viewport.mounted_range(self.rows.len());
        let wanted: HashMap<&str, &ScannerTableRow> = self.rows[range]
            .iter()
            .map(|row| (row.id.as_str(), row))
            .collect();

        let mut diff = MountDiff::default();

        let stale: Vec<String> = self
            .mounted
            .keys()
            .filter(|id| !wanted.contains_key(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            if let Some(payload) = self.mounted.remove(&id) {
                diff.unmounted.push(payload);
            }
        }

        let mut fresh: Vec<PairSubscriptionPayload> = wanted
            .iter()
            .filter(|(id, _)| !self.mounted.contains_key(**id))
            .map(|(_, row)| row.subscription())
            .collect();
        fresh.sort_by(|a, b| a.pair.cmp(&b.pair));
        for payload in &fresh {
            self.mounted.insert(payload.pair.clone(), payload.clone());
        }
        diff.mounted = fresh;

        diff
    }

    /// Drop every mount, e.g. before shutdown
    pub fn unmount_all(&mut self) -> Vec<PairSubscriptionPayload> {
        self.mounted.drain().map(|(_, payload)| payload).collect()
    }
}

/// Trending tables start sorted by volume, new-token tables by age
fn initial_sort(title: &str) -> Option<SortState> {
    let title = title.to_lowercase();
    let column = if title.contains("trending") {
        SortColumn::VolumeUsd
    } else if title.contains("new") {
        SortColumn::Age
    } else {
        return None;
    };
    Some(SortState {
        column,
        direction: SortDirection::Desc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::row::tests::sample_result;
    use crate::domain::WsTokenSwap;

    fn result(id: &str, volume: f64, age: &str) -> ScannerResult {
        ScannerResult {
            volume: volume.to_string(),
            age: age.to_string(),
            ..sample_result(id)
        }
    }

    fn response(pairs: Vec<ScannerResult>, total_rows: u64) -> ScannerApiResponse {
        ScannerApiResponse { pairs, total_rows }
    }

    fn table(title: &str) -> ScannerTable {
        ScannerTable::new(title, ScannerFilter::trending(), Viewport::new(2, 0))
            .with_end_reached_threshold(1)
    }

    fn ids(table: &ScannerTable) -> Vec<&str> {
        table.rows().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_initial_sort_from_title() {
        assert_eq!(
            table("Trending Tokens").sort(),
            Some(SortState {
                column: SortColumn::VolumeUsd,
                direction: SortDirection::Desc
            })
        );
        assert_eq!(table("New Tokens").sort().map(|s| s.column), Some(SortColumn::Age));
        assert_eq!(table("Watchlist").sort(), None);
    }

    #[test]
    fn test_filter_drops_page() {
        let t = ScannerTable::new("x", ScannerFilter::trending().with_page(4), Viewport::new(1, 0));
        assert_eq!(t.filter().page, None);
    }

    #[test]
    fn test_apply_page_sorts_and_dedups() {
        let mut t = table("Trending");
        t.apply_page(
            1,
            &response(
                vec![
                    result("a", 10.0, "2024-01-01T00:00:00Z"),
                    result("b", 30.0, "2024-01-02T00:00:00Z"),
                    result("a", 99.0, "2024-01-01T00:00:00Z"),
                ],
                5,
            ),
        );
        assert_eq!(ids(&t), vec!["b", "a"]);
        assert_eq!(t.status(), &LoadStatus::Ready);

        t.apply_page(
            2,
            &response(
                vec![
                    result("b", 30.0, "2024-01-02T00:00:00Z"),
                    result("c", 20.0, "2024-01-03T00:00:00Z"),
                ],
                5,
            ),
        );
        assert_eq!(ids(&t), vec!["b", "c", "a"]);
        assert_eq!(t.page(), 2);
        assert!(t.has_more());
        assert_eq!(t.row("c").map(|r| r.volume_usd), Some(20.0));
    }

    #[test]
    fn test_page_one_replaces_rows() {
        let mut t = table("Trending");
        t.apply_page(1, &response(vec![result("a", 1.0, "")], 1));
        t.apply_page(1, &response(vec![result("z", 1.0, "")], 1));
        assert_eq!(ids(&t), vec!["z"]);
        assert!(!t.contains("a"));
    }

    #[test]
    fn test_has_more_stops_on_empty_page() {
        let mut t = table("Trending");
        t.apply_page(1, &response(vec![result("a", 1.0, "")], 10));
        assert!(t.has_more());
        t.apply_page(2, &response(vec![], 10));
        assert!(!t.has_more());
    }

    #[test]
    fn test_next_page_request_claims_once() {
        let mut t = table("Trending");
        t.apply_page(
            1,
            &response(vec![result("a", 3.0, ""), result("b", 2.0, ""), result("c", 1.0, "")], 6),
        );
        assert!(t.end_reached());

        let request = t.next_page_request().unwrap();
        assert_eq!(request.page(), 2);
        assert!(t.is_fetching_more());
        assert!(t.next_page_request().is_none());

        t.apply_page_error(2, "timeout");
        assert!(!t.is_fetching_more());
        assert_eq!(t.status(), &LoadStatus::Ready);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_reload_invalidates_in_flight_page() {
        let mut t = table("Watchlist");
        t.apply_page(
            1,
            &response(vec![result("old0", 1.0, ""), result("old1", 1.0, "")], 6),
        );
        let stale = t.next_page_request().unwrap();
        assert_eq!(stale.page(), 2);

        let reload = t.begin_reload();
        assert_eq!(reload.page(), 1);
        assert!(t.is_current(&reload));
        assert!(!t.is_current(&stale));

        t.apply_page(
            1,
            &response(vec![result("x", 1.0, ""), result("y", 1.0, ""), result("z", 1.0, "")], 6),
        );
        t.end();
        let fresh = t.next_page_request().unwrap();
        assert_eq!(fresh.page(), 2);
        assert!(t.is_current(&fresh));
        assert!(!t.is_current(&stale));
        assert_eq!(ids(&t), vec!["x", "y", "z"]);
        assert_eq!(t.page(), 1);
    }

    #[test]
    fn test_first_page_error_sets_error_status() {
        let mut t = table("Trending");
        t.begin_reload();
        t.apply_page_error(1, "API request failed");
        assert_eq!(t.status(), &LoadStatus::Error("API request failed".to_string()));
        assert!(t.next_page_request().is_none());
    }

    #[test]
    fn test_snapshot_is_authoritative() {
        let mut t = table("Trending");
        t.apply_page(1, &response(vec![result("a", 5.0, ""), result("b", 4.0, "")], 2));

        let swap = WsTokenSwap {
            price_token1_usd: "9".to_string(),
            amount_token1: "1".to_string(),
            ..Default::default()
        };
        let tick = TickEventPayload {
            pair: t.row("a").unwrap().subscription(),
            swaps: vec![swap],
        };
        assert!(t.apply_tick(&tick, Utc::now()));
        let flash = t.row("a").unwrap().price_flash;
        assert!(flash.is_some());

        t.apply_snapshot(&[result("c", 1.0, ""), result("a", 2.0, "")]);
        assert_eq!(ids(&t), vec!["a", "c"]);
        assert!(!t.contains("b"));
        assert_eq!(t.row("a").unwrap().volume_usd, 2.0);
        assert_eq!(t.row("a").unwrap().price_flash, flash);
    }

    #[test]
    fn test_tick_resorts_volume_table() {
        let mut t = table("Trending");
        t.apply_page(1, &response(vec![result("a", 5.0, ""), result("b", 4.0, "")], 2));

        let tick = TickEventPayload {
            pair: t.row("b").unwrap().subscription(),
            swaps: vec![WsTokenSwap {
                price_token1_usd: "1".to_string(),
                amount_token1: "10".to_string(),
                ..Default::default()
            }],
        };
        t.apply_tick(&tick, Utc::now());
        assert_eq!(ids(&t), vec!["b", "a"]);
    }

    #[test]
    fn test_tick_for_unknown_pair_is_ignored() {
        let mut t = table("Trending");
        let tick = TickEventPayload {
            pair: PairSubscriptionPayload {
                pair: "nope".to_string(),
                token: "t".to_string(),
                chain: Default::default(),
            },
            swaps: vec![],
        };
        assert!(!t.apply_tick(&tick, Utc::now()));
    }

    #[test]
    fn test_toggle_sort_cycles() {
        let mut t = table("Watchlist");
        t.apply_page(
            1,
            &response(
                vec![
                    result("old", 1.0, "2024-01-01T00:00:00Z"),
                    result("mid", 1.0, "2024-02-01T00:00:00Z"),
                    result("new", 1.0, "2024-03-01T00:00:00Z"),
                ],
                3,
            ),
        );
        assert_eq!(ids(&t), vec!["old", "mid", "new"]);

        t.toggle_sort(SortColumn::Age);
        assert_eq!(ids(&t), vec!["new", "mid", "old"]);
        t.toggle_sort(SortColumn::Age);
        assert_eq!(ids(&t), vec!["old", "mid", "new"]);
        t.toggle_sort(SortColumn::Age);
        assert_eq!(t.sort(), None);

        t.toggle_sort(SortColumn::Age);
        t.toggle_sort(SortColumn::VolumeUsd);
        assert_eq!(
            t.sort(),
            Some(SortState {
                column: SortColumn::VolumeUsd,
                direction: SortDirection::Desc
            })
        );
    }

    #[test]
    fn test_sync_mounts_follows_viewport() {
        let mut t = table("Watchlist");
        t.apply_page(
            1,
            &response(
                vec![result("a", 1.0, ""), result("b", 1.0, ""), result("c", 1.0, ""), result("d", 1.0, "")],
                4,
            ),
        );

        let diff = t.sync_mounts();
        let mounted: Vec<&str> = diff.mounted.iter().map(|p| p.pair.as_str()).collect();
        assert_eq!(mounted, vec!["a", "b"]);
        assert!(diff.unmounted.is_empty());
        assert!(t.sync_mounts().is_empty());

        t.move_cursor(2);
        let diff = t.sync_mounts();
        let mounted: Vec<&str> = diff.mounted.iter().map(|p| p.pair.as_str()).collect();
        let unmounted: Vec<&str> = diff.unmounted.iter().map(|p| p.pair.as_str()).collect();
        assert_eq!(mounted, vec!["c"]);
        assert_eq!(unmounted, vec!["a"]);
        assert_eq!(t.viewport().offset, 1);
    }

    #[test]
    fn test_removed_row_is_unmounted() {
        let mut t = table("Watchlist");
        t.apply_page(1, &response(vec![result("a", 1.0, ""), result("b", 1.0, "")], 2));
        t.sync_mounts();

        t.apply_snapshot(&[result("b", 1.0, "")]);
        let diff = t.sync_mounts();
        assert_eq!(diff.unmounted.len(), 1);
        assert_eq!(diff.unmounted[0].pair, "a");
        assert!(diff.mounted.is_empty());
    }

    #[test]
    fn test_cursor_navigation() {
        let mut t = table("Watchlist");
        t.apply_page(
            1,
            &response(
                (0..6).map(|i| result(&format!("p{}", i), 1.0, "")).collect(),
                6,
            ),
        );
        t.end();
        assert_eq!(t.cursor(), 5);
        assert_eq!(t.viewport().offset, 4);
        t.page_up();
        assert_eq!(t.cursor(), 3);
        t.home();
        assert_eq!(t.selected_row().map(|r| r.id.as_str()), Some("p0"));
    }
}
