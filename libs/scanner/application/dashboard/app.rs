//! Dashboard application state
//!
//! Owns the websocket, the page loader and the shared board. The terminal
//! loop calls into it synchronously; async work runs on the runtime handle.

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver};
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::application::sync::{
    BoardHandler, BoardUpdate, OutgoingSink, PageLoader, ScannerBoard, ScannerTable, SharedBoard,
    SortColumn,
};
use crate::domain::DexRegistry;
use crate::infrastructure::{
    ClientEvent, ConnectionState, ScannerApiClient, ScannerConfig, ScannerRouter, ScannerSocket,
    ShutdownManager, SocketSender,
};

pub struct App {
    board: SharedBoard,
    loader: PageLoader<SocketSender>,
    sender: SocketSender,
    socket: Option<ScannerSocket>,
    updates: Receiver<BoardUpdate>,
    dexes: DexRegistry,
    shutdown: ShutdownManager,
    runtime: Handle,
    connection: ConnectionState,
    live_updates: u64,
    pub should_quit: bool,
    /// Shown in the footer
    pub status_message: Option<String>,
}

impl App {
    /// Connect the websocket and start loading every configured table
    pub fn initialize(runtime: Handle, config: &ScannerConfig, shutdown: ShutdownManager) -> Result<Self> {
        let board = ScannerBoard::from_config(config).shared();
        let client = ScannerApiClient::new(config.api_base_url.clone(), config.request_timeout())
            .context("Failed to build HTTP client")?;

        let (update_tx, updates) = unbounded();
        let handler_board = Arc::clone(&board);
        let socket = {
            let _guard = runtime.enter();
            ScannerSocket::connect_with(config.socket_config(), shutdown.flag(), |sender| {
                ScannerRouter::new()
                    .route_all(BoardHandler::new(handler_board, sender).with_updates(update_tx))
            })
        };
        let sender = socket.sender();

        let loader = PageLoader::new(Arc::clone(&board), Arc::new(client), sender.clone());
        loader.start(&runtime);

        info!("[Dashboard] Started with {} tables", config.tables.len());

        Ok(Self {
            board,
            loader,
            sender,
            socket: Some(socket),
            updates,
            dexes: config.dex_registry(),
            shutdown,
            runtime,
            connection: ConnectionState::Connecting,
            live_updates: 0,
            should_quit: false,
            status_message: None,
        })
    }

    pub fn board(&self) -> &SharedBoard {
        &self.board
    }

    pub fn dexes(&self) -> &DexRegistry {
        &self.dexes
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    /// Websocket messages that changed at least one table
    pub fn live_updates(&self) -> u64 {
        self.live_updates
    }

    /// Housekeeping between frames: socket events, update counts, paging
    pub fn tick(&mut self) {
        if !self.shutdown.is_running() {
            self.should_quit = true;
            return;
        }

        if let Some(ref socket) = self.socket {
            while let Some(event) = socket.try_recv_event() {
                match event {
                    ClientEvent::Connected => self.status_message = None,
                    ClientEvent::Disconnected => {
                        self.status_message = Some("Websocket disconnected".to_string())
                    }
                    ClientEvent::Reconnecting(n) => {
                        self.status_message = Some(format!("Reconnecting (attempt {})", n))
                    }
                    ClientEvent::Error(e) => self.status_message = Some(format!("Websocket error: {}", e)),
                }
            }
            self.connection = socket.connection_state();
        }

        self.live_updates += self.updates.try_iter().count() as u64;
        self.loader.poll_end_reached(&self.runtime);
    }

    /// Resize every table's viewport to the rows the terminal can show
    pub fn set_viewport_height(&mut self, height: usize) {
        let changed = {
            let mut board = self.board.write();
            let mut changed = false;
            for id in 0..board.tables().len() {
                if let Some(table) = board.table_mut(id) {
                    if table.viewport().height != height {
                        table.set_viewport_height(height);
                        changed = true;
                    }
                }
            }
            changed
        };
        if changed {
            self.sync_viewports();
        }
    }

    pub fn next_table(&mut self) {
        self.board.write().focus_next();
    }

    pub fn move_cursor(&mut self, delta: isize) {
        self.with_active(|table| table.move_cursor(delta));
    }

    pub fn page_down(&mut self) {
        self.with_active(ScannerTable::page_down);
    }

    pub fn page_up(&mut self) {
        self.with_active(ScannerTable::page_up);
    }

    pub fn home(&mut self) {
        self.with_active(ScannerTable::home);
    }

    pub fn end(&mut self) {
        self.with_active(ScannerTable::end);
    }

    /// Cycle the sort of the active table's sortable column
    pub fn toggle_sort(&mut self) {
        self.with_active(|table| {
            let column = sortable_column(table.title());
            table.toggle_sort(column);
        });
    }

    pub fn reload(&mut self) {
        let active = self.board.read().active();
        if self.loader.reload(&self.runtime, active).is_some() {
            self.status_message = Some("Reloading...".to_string());
        }
    }

    /// Release every subscription and close the websocket
    pub fn shutdown(&mut self) {
        info!("[Dashboard] Shutting down...");

        {
            let mut board = self.board.write();
            let release = board.release_all();
            self.sender.send_all(release);
        }

        if let Some(socket) = self.socket.take() {
            self.runtime.block_on(socket.shutdown());
        }
        self.shutdown.trigger();
    }

    fn with_active(&mut self, f: impl FnOnce(&mut ScannerTable)) {
        {
            let mut board = self.board.write();
            match board.active_table_mut() {
                Some(table) => f(table),
                None => return,
            }
        }
        self.sync_viewports();
        self.loader.poll_end_reached(&self.runtime);
    }

    fn sync_viewports(&self) {
        // Queued under the write lock: frames leave in board order
        let mut board = self.board.write();
        let messages = board.sync_viewports();
        if !messages.is_empty() {
            if let Err(e) = self.sender.send_many(messages) {
                warn!("[Dashboard] Failed to queue subscriptions: {}", e);
            }
        }
    }
}

/// The column `s` sorts by: age for new-token tables, volume otherwise
fn sortable_column(title: &str) -> SortColumn {
    if title.to_lowercase().contains("new") {
        SortColumn::Age
    } else {
        SortColumn::VolumeUsd
    }
}
