//! REST page loading for the scanner tables
//!
//! Pages are fetched on the tokio runtime and merged into the shared board.
//! The board decides which page to fetch next; the loader only runs requests
//! and pushes the resulting subscription changes to the socket.

use super::board::{SharedBoard, TableId};
use super::handlers::OutgoingSink;
use super::table::PageRequest;
use crate::infrastructure::ScannerSource;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct PageLoader<S: OutgoingSink + Clone> {
    board: SharedBoard,
    source: Arc<dyn ScannerSource>,
    sink: S,
}

impl<S: OutgoingSink + Clone> PageLoader<S> {
    pub fn new(board: SharedBoard, source: Arc<dyn ScannerSource>, sink: S) -> Self {
        Self {
            board,
            source,
            sink,
        }
    }

    pub fn board(&self) -> &SharedBoard {
        &self.board
    }

    /// Fetch one page and merge it into `table`.
    ///
    /// Responses to requests made before the table's last reload are dropped.
    pub async fn load(&self, table: TableId, request: PageRequest) {
        let page = request.page();
        debug!("[Loader] table {} page {}", table, page);

        let result = self.source.fetch_page(&request.filter).await;

        let mut board = self.board.write();
        let Some(target) = board.table_mut(table) else {
            warn!("[Loader] table {} no longer exists", table);
            return;
        };
        if !target.is_current(&request) {
            debug!("[Loader] {} dropping stale page {}", target.title(), page);
            return;
        }
        match result {
            Ok(response) => target.apply_page(page, &response),
            Err(e) => {
                warn!("[Loader] {} page {} failed: {}", target.title(), page, e);
                target.apply_page_error(page, format!("API request failed: {}", e));
            }
        }
        // Queued under the write lock: frames leave in board order
        let outgoing = board.sync_viewports();
        self.sink.send_all(outgoing);
    }

    /// Spawn [`load`](Self::load) on `handle`
    pub fn spawn_load(&self, handle: &Handle, table: TableId, request: PageRequest) -> JoinHandle<()> {
        let loader = self.clone();
        handle.spawn(async move { loader.load(table, request).await })
    }

    /// Subscribe every table's filter and fetch its first page
    pub fn start(&self, handle: &Handle) -> Vec<JoinHandle<()>> {
        let requests: Vec<(TableId, PageRequest)> = {
            let mut board = self.board.write();
            self.sink.send_all(board.filter_subscriptions());
            let count = board.tables().len();
            (0..count)
                .filter_map(|id| board.table_mut(id).map(|t| (id, t.begin_reload())))
                .collect()
        };

        info!("[Loader] Loading {} tables", requests.len());

        requests
            .into_iter()
            .map(|(id, request)| self.spawn_load(handle, id, request))
            .collect()
    }

    /// Drop back to page 1 for one table
    pub fn reload(&self, handle: &Handle, table: TableId) -> Option<JoinHandle<()>> {
        let request = self.board.write().table_mut(table)?.begin_reload();
        info!("[Loader] Reloading table {}", table);
        Some(self.spawn_load(handle, table, request))
    }

    /// Request the next page for every table scrolled near its end
    pub fn poll_end_reached(&self, handle: &Handle) -> Vec<JoinHandle<()>> {
        let requests: Vec<(TableId, PageRequest)> = {
            let mut board = self.board.write();
            let count = board.tables().len();
            (0..count)
                .filter_map(|id| {
                    board
                        .table_mut(id)
                        .and_then(|t| t.next_page_request())
                        .map(|request| (id, request))
                })
                .collect()
        };

        requests
            .into_iter()
            .map(|(id, request)| self.spawn_load(handle, id, request))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sync::{LoadStatus, ScannerBoard, ScannerTable, Viewport};
    use crate::domain::row::tests::sample_result;
    use crate::domain::{OutgoingMessage, ScannerApiResponse, ScannerFilter};
    use crate::infrastructure::ScannerApiError;
    use async_trait::async_trait;
    use crossbeam_channel::unbounded;
    use parking_lot::Mutex;

    /// Serves `per_page` rows per page out of `total`, recording requests
    struct FakeSource {
        per_page: usize,
        total: usize,
        fail: bool,
        requests: Mutex<Vec<u32>>,
    }

    impl FakeSource {
        fn new(per_page: usize, total: usize) -> Self {
            Self {
                per_page,
                total,
                fail: false,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ScannerSource for FakeSource {
        async fn fetch_page(
            &self,
            filter: &ScannerFilter,
        ) -> crate::infrastructure::client::rest::Result<ScannerApiResponse> {
            let page = filter.page.unwrap_or(1);
            self.requests.lock().push(page);
            if self.fail {
                return Err(ScannerApiError::ApiError("boom".to_string()));
            }
            let start = (page as usize - 1) * self.per_page;
            let end = (start + self.per_page).min(self.total);
            Ok(ScannerApiResponse {
                pairs: (start..end).map(|i| sample_result(&format!("p{}", i))).collect(),
                total_rows: self.total as u64,
            })
        }
    }

    fn board() -> SharedBoard {
        ScannerBoard::new(vec![ScannerTable::new(
            "Trending",
            ScannerFilter::trending(),
            Viewport::new(5, 0),
        )
        .with_end_reached_threshold(2)])
        .shared()
    }

    #[tokio::test]
    async fn test_start_subscribes_filter_and_loads_first_page() {
        let board = board();
        let source = Arc::new(FakeSource::new(10, 25));
        let (tx, rx) = unbounded();
        let loader = PageLoader::new(board.clone(), source.clone(), tx);

        for handle in loader.start(&Handle::current()) {
            handle.await.unwrap();
        }

        let sent: Vec<OutgoingMessage> = rx.try_iter().collect();
        assert_eq!(sent[0].event_name(), "scanner-filter");
        // 5 visible rows subscribe pair + pair-stats
        assert_eq!(sent.len(), 1 + 10);

        let board = board.read();
        let table = board.table(0).unwrap();
        assert_eq!(table.status(), &LoadStatus::Ready);
        assert_eq!(table.len(), 10);
        assert_eq!(table.total_rows(), 25);
    }

    #[tokio::test]
    async fn test_end_reached_fetches_next_page_once() {
        let board = board();
        let source = Arc::new(FakeSource::new(10, 25));
        let (tx, _rx) = unbounded();
        let loader = PageLoader::new(board.clone(), source.clone(), tx);

        let first = board.write().table_mut(0).unwrap().begin_reload();
        loader.load(0, first).await;
        assert!(loader.poll_end_reached(&Handle::current()).is_empty());

        board.write().table_mut(0).unwrap().end();
        let handles = loader.poll_end_reached(&Handle::current());
        assert_eq!(handles.len(), 1);
        assert!(loader.poll_end_reached(&Handle::current()).is_empty());
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(board.read().table(0).unwrap().len(), 20);
        assert_eq!(*source.requests.lock(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_failed_first_page_sets_error() {
        let board = board();
        let mut source = FakeSource::new(10, 25);
        source.fail = true;
        let (tx, _rx) = unbounded();
        let loader = PageLoader::new(board.clone(), Arc::new(source), tx);

        loader.reload(&Handle::current(), 0).unwrap().await.unwrap();

        let status = board.read().table(0).unwrap().status().clone();
        match status {
            LoadStatus::Error(msg) => assert!(msg.starts_with("API request failed")),
            other => panic!("expected error status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_page_from_before_reload_is_dropped() {
        let board = board();
        let source = Arc::new(FakeSource::new(10, 25));
        let (tx, _rx) = unbounded();
        let loader = PageLoader::new(board.clone(), source.clone(), tx);

        let first = board.write().table_mut(0).unwrap().begin_reload();
        loader.load(0, first).await;
        board.write().table_mut(0).unwrap().end();
        let stale = board.write().table_mut(0).unwrap().next_page_request().unwrap();

        loader.reload(&Handle::current(), 0).unwrap().await.unwrap();
        loader.load(0, stale).await;

        let board = board.read();
        let table = board.table(0).unwrap();
        assert_eq!(table.len(), 10);
        assert_eq!(table.page(), 1);
        assert_eq!(*source.requests.lock(), vec![1, 1, 2]);
    }
}
