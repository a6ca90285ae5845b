//! Scanner Tail - headless scanner that logs merged row changes
//!
//! Loads every configured table, keeps it in sync over the websocket and
//! logs each live update until Ctrl+C.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver};
use dex_scanner::bin_common::{load_config, BinaryRunner, ConfigType, RunConfig};
use scanner::application::sync::{BoardHandler, BoardUpdate, OutgoingSink, PageLoader, ScannerBoard, SharedBoard};
use scanner::domain::{format_percent, format_usd, ScannerTableRow};
use scanner::infrastructure::{
    init_tracing, ScannerApiClient, ScannerConfig, ScannerRoute, ScannerRouter, ScannerSocket,
    ShutdownManager, SocketSender,
};
use tokio::runtime::Handle;
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

struct TailRunner {
    run_config: RunConfig,
    board: SharedBoard,
    loader: PageLoader<SocketSender>,
    socket: Option<ScannerSocket>,
    updates: Receiver<BoardUpdate>,
    shutdown: ShutdownManager,
}

impl TailRunner {
    fn new(config: &ScannerConfig, shutdown: ShutdownManager) -> Result<Self> {
        let board = ScannerBoard::from_config(config).shared();
        let client = ScannerApiClient::new(config.api_base_url.clone(), config.request_timeout())
            .context("Failed to build HTTP client")?;

        let (update_tx, updates) = unbounded();
        let handler_board = Arc::clone(&board);
        let socket = ScannerSocket::connect_with(config.socket_config(), shutdown.flag(), |sender| {
            ScannerRouter::new()
                .route_all(BoardHandler::new(handler_board, sender).with_updates(update_tx))
        });

        let loader = PageLoader::new(Arc::clone(&board), Arc::new(client), socket.sender());

        Ok(Self {
            run_config: RunConfig::new("Scanner Tail"),
            board,
            loader,
            socket: Some(socket),
            updates,
            shutdown,
        })
    }

    fn log_update(&self, update: &BoardUpdate) {
        if update.route == ScannerRoute::ScannerPairs {
            info!("[Tail] Snapshot applied to {} tables", update.tables_changed);
            return;
        }

        let board = self.board.read();
        for pair in &update.pairs {
            let row = board.tables().iter().find_map(|t| t.row(pair));
            if let Some(row) = row {
                log_row(update.route, row);
            }
        }
    }

    fn log_status(&self) {
        let board = self.board.read();
        for table in board.tables() {
            info!(
                "[Tail] {}: {} rows of {} (page {}, {:?})",
                table.title(),
                table.len(),
                table.total_rows(),
                table.page(),
                table.status()
            );
        }
        if let Some(ref socket) = self.socket {
            let metrics = socket.metrics();
            info!(
                "[Tail] WS {} | sent {} | received {} | reconnects {} | pairs subscribed {}",
                metrics.connection_state,
                metrics.messages_sent,
                metrics.messages_received,
                metrics.reconnect_count,
                board.subscriptions().len()
            );
        }
    }
}

impl BinaryRunner for TailRunner {
    async fn run(&mut self) -> Result<Option<String>> {
        let handle = Handle::current();
        self.loader.start(&handle);

        let status_interval = Duration::from_secs(self.run_config.status_interval_secs);
        let mut last_status = Instant::now();
        let mut applied = 0u64;

        while self.shutdown.is_running() {
            for update in self.updates.try_iter().collect::<Vec<_>>() {
                applied += 1;
                self.log_update(&update);
            }

            self.loader.poll_end_reached(&handle);

            if last_status.elapsed() >= status_interval {
                self.log_status();
                last_status = Instant::now();
            }

            self.shutdown.interruptible_sleep(POLL_INTERVAL).await;
        }

        if let Some(socket) = self.socket.take() {
            {
                let mut board = self.board.write();
                let release = board.release_all();
                socket.sender().send_all(release);
            }
            socket.shutdown().await;
        }

        Ok(Some(format!("Applied {} live updates", applied)))
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }
}

fn log_row(route: ScannerRoute, row: &ScannerTableRow) {
    match route {
        ScannerRoute::Tick => info!(
            "[Tail] {} {} price {} vol {} mcap {} txns {}/{}",
            row.token_symbol,
            row.chain,
            format_usd(row.price_usd),
            format_usd(row.volume_usd),
            format_usd(row.mcap),
            row.transactions.buys,
            row.transactions.sells
        ),
        _ => info!(
            "[Tail] {} {} stats 5m {} 1h {} 24h {} calls {}",
            row.token_symbol,
            row.chain,
            format_percent(row.price_change_pcs.m5),
            format_percent(row.price_change_pcs.h1),
            format_percent(row.price_change_pcs.h24),
            row.call_count
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = load_config(ConfigType::Scanner)?;
    init_tracing(&config.log_level);
    config.log();

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let mut runner = TailRunner::new(&config, shutdown)?;
    if let Err(e) = runner.execute().await {
        warn!("Scanner tail exited with error: {}", e);
        return Err(e);
    }
    Ok(())
}
