//! Socket handlers that merge routed messages into the shared board

use super::board::SharedBoard;
use crate::domain::OutgoingMessage;
use crate::infrastructure::{MessageHandler, ScannerMessage, ScannerRoute, SocketSender};
use chrono::Utc;
use crossbeam_channel::Sender;
use tracing::{debug, warn};

/// Where subscription changes go
pub trait OutgoingSink: Send + Sync + 'static {
    fn send_all(&self, messages: Vec<OutgoingMessage>);
}

impl OutgoingSink for SocketSender {
    fn send_all(&self, messages: Vec<OutgoingMessage>) {
        if messages.is_empty() {
            return;
        }
        if let Err(e) = self.send_many(messages) {
            warn!("Dropping subscription changes: {}", e);
        }
    }
}

impl OutgoingSink for Sender<OutgoingMessage> {
    fn send_all(&self, messages: Vec<OutgoingMessage>) {
        for message in messages {
            let _ = self.send(message);
        }
    }
}

/// Notification that a routed message changed the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardUpdate {
    pub route: ScannerRoute,
    /// Pair ids touched (empty for snapshots)
    pub pairs: Vec<String>,
    /// Number of tables that changed
    pub tables_changed: usize,
}

/// Applies every routed message to the board under one write lock, then
/// sends whatever subscription changes the new row set implies
#[derive(Clone)]
pub struct BoardHandler<S: OutgoingSink + Clone> {
    board: SharedBoard,
    sink: S,
    updates: Option<Sender<BoardUpdate>>,
}

impl<S: OutgoingSink + Clone> BoardHandler<S> {
    pub fn new(board: SharedBoard, sink: S) -> Self {
        Self {
            board,
            sink,
            updates: None,
        }
    }

    /// Also publish a [`BoardUpdate`] for each message that changed something
    pub fn with_updates(mut self, updates: Sender<BoardUpdate>) -> Self {
        self.updates = Some(updates);
        self
    }
}

impl<S: OutgoingSink + Clone> MessageHandler for BoardHandler<S> {
    fn handle(&mut self, message: ScannerMessage) -> anyhow::Result<()> {
        let (route, pairs) = match &message {
            ScannerMessage::Tick(tick) => (ScannerRoute::Tick, vec![tick.pair.pair.clone()]),
            ScannerMessage::PairStats(stats) => {
                (ScannerRoute::PairStats, vec![stats.pair.pair_address.clone()])
            }
            ScannerMessage::ScannerPairs(_) => (ScannerRoute::ScannerPairs, Vec::new()),
            ScannerMessage::Unknown(_) => return Ok(()),
        };

        let tables_changed = {
            let mut board = self.board.write();
            let changed = board.apply(&message, Utc::now());
            if changed > 0 {
                // Queued under the write lock: frames leave in board order
                let outgoing = board.sync_viewports();
                self.sink.send_all(outgoing);
            }
            changed
        };

        if tables_changed == 0 {
            return Ok(());
        }
        debug!("{:?} changed {} tables", route, tables_changed);

        if let Some(ref updates) = self.updates {
            let _ = updates.send(BoardUpdate {
                route,
                pairs,
                tables_changed,
            });
        }

        Ok(())
    }
}
