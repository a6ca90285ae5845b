//! Message routing
//!
//! ```text
//! socket frame → parse → route key → channel → handler thread
//!                            │
//!                            ├─ Tick          → tick handler         (sequential)
//!                            ├─ PairStats     → pair-stats handler   (sequential)
//!                            └─ ScannerPairs  → snapshot handler     (sequential)
//! ```
//!
//! Frames of one route are handled in arrival order on a dedicated OS thread.
//! Different routes run in parallel. Frames with no route are logged and dropped.

use crate::domain::{IncomingMessage, PairStatsMsgData, ScannerPairsEventPayload, TickEventPayload};
use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScannerRoute {
    Tick,
    PairStats,
    ScannerPairs,
}

#[derive(Debug, Clone)]
pub enum ScannerMessage {
    Tick(TickEventPayload),
    PairStats(PairStatsMsgData),
    ScannerPairs(ScannerPairsEventPayload),
    /// Unrecognised event name or malformed payload
    Unknown(String),
}

impl From<IncomingMessage> for ScannerMessage {
    fn from(message: IncomingMessage) -> Self {
        match message {
            IncomingMessage::Tick(tick) => ScannerMessage::Tick(tick),
            IncomingMessage::PairStats(stats) => ScannerMessage::PairStats(stats),
            IncomingMessage::ScannerPairs(pairs) => ScannerMessage::ScannerPairs(pairs),
        }
    }
}

/// Processes the messages of one route on its own thread
pub trait MessageHandler: Send + 'static {
    /// Errors are logged; the handler keeps receiving
    fn handle(&mut self, message: ScannerMessage) -> anyhow::Result<()>;
}

impl<F> MessageHandler for F
where
    F: FnMut(ScannerMessage) -> anyhow::Result<()> + Send + 'static,
{
    fn handle(&mut self, message: ScannerMessage) -> anyhow::Result<()> {
        self(message)
    }
}

/// Parses scanner frames and owns the handler for each route
#[derive(Default)]
pub struct ScannerRouter {
    handlers: Vec<(ScannerRoute, Box<dyn MessageHandler>)>,
}

impl ScannerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for a route, replacing any earlier one
    pub fn route(mut self, route: ScannerRoute, handler: impl MessageHandler) -> Self {
        self.handlers.retain(|(r, _)| *r != route);
        self.handlers.push((route, Box::new(handler)));
        self
    }

    /// Same handler for every route
    pub fn route_all<H>(self, handler: H) -> Self
    where
        H: MessageHandler + Clone,
    {
        self.route(ScannerRoute::Tick, handler.clone())
            .route(ScannerRoute::PairStats, handler.clone())
            .route(ScannerRoute::ScannerPairs, handler)
    }

    /// Parse a text frame. Never fails; unusable frames become `Unknown`.
    pub fn parse(text: &str) -> ScannerMessage {
        match IncomingMessage::parse(text) {
            Ok(message) => message.into(),
            Err(e) => {
                let event = serde_json::from_str::<serde_json::Value>(text)
                    .ok()
                    .and_then(|v| v.get("event").and_then(|e| e.as_str()).map(str::to_string));
                match event.as_deref() {
                    Some(name @ ("tick" | "pair-stats" | "scanner-pairs")) => {
                        warn!("[Scanner WS] Malformed {} payload: {}", name, e);
                    }
                    Some(other) => debug!("[Scanner WS] Ignoring event '{}'", other),
                    None => debug!("[Scanner WS] Unparseable frame: {}", e),
                }
                ScannerMessage::Unknown(text.to_string())
            }
        }
    }

    pub fn route_key(message: &ScannerMessage) -> Option<ScannerRoute> {
        match message {
            ScannerMessage::Tick(_) => Some(ScannerRoute::Tick),
            ScannerMessage::PairStats(_) => Some(ScannerRoute::PairStats),
            ScannerMessage::ScannerPairs(_) => Some(ScannerRoute::ScannerPairs),
            ScannerMessage::Unknown(_) => None,
        }
    }

    /// Start one thread per registered route.
    ///
    /// Threads exit once the running flag is cleared or the dispatcher is dropped.
    pub(crate) fn spawn(self, running: Arc<AtomicBool>) -> (RouteDispatcher, Vec<JoinHandle<()>>) {
        let mut senders = HashMap::new();
        let mut handles = Vec::new();

        for (route, mut handler) in self.handlers {
            let (tx, rx) = unbounded::<ScannerMessage>();
            senders.insert(route, tx);
            let running = Arc::clone(&running);

            let handle = std::thread::Builder::new()
                .name(format!("scanner-{:?}", route).to_lowercase())
                .spawn(move || loop {
                    match rx.recv_timeout(Duration::from_millis(50)) {
                        Ok(message) => {
                            if let Err(e) = handler.handle(message) {
                                error!("Handler error for route {:?}: {}", route, e);
                            }
                        }
                        Err(RecvTimeoutError::Timeout) => {
                            if !running.load(Ordering::Acquire) {
                                debug!("Shutdown flag detected, handler thread for route {:?} exiting", route);
                                break;
                            }
                        }
                        Err(RecvTimeoutError::Disconnected) => {
                            debug!("Handler channel closed for route {:?}, thread exiting", route);
                            break;
                        }
                    }
                });

            match handle {
                Ok(handle) => handles.push(handle),
                Err(e) => error!("Failed to spawn handler thread for route {:?}: {}", route, e),
            }
        }

        (RouteDispatcher { senders }, handles)
    }
}

/// Sending half of the handler channels
pub(crate) struct RouteDispatcher {
    senders: HashMap<ScannerRoute, Sender<ScannerMessage>>,
}

impl RouteDispatcher {
    /// Parse and forward one text frame
    pub(crate) fn dispatch(&self, text: &str) {
        let message = ScannerRouter::parse(text);
        let Some(route) = ScannerRouter::route_key(&message) else {
            return;
        };

        match self.senders.get(&route) {
            // Send only fails during shutdown, when the handler is gone
            Some(sender) => {
                let _ = sender.send(message);
            }
            None => warn!("No handler configured for route {:?}", route),
        }
    }
}
