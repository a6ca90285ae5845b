//! Scanner websocket client
//!
//! One tokio task owns the connection. It reconnects with backoff, replays the
//! subscription registry after every connect, sends an optional heartbeat, and
//! hands parsed frames to the router's handler threads.

use super::reconnect::{ExponentialBackoff, ReconnectionStrategy};
use super::registry::SubscriptionRegistry;
use super::router::{RouteDispatcher, ScannerRouter};
use super::state::{AtomicConnectionState, AtomicMetrics, ConnectionState, Metrics};
use crate::domain::OutgoingMessage;
use crossbeam_channel::{unbounded, Receiver, Sender};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const FLAG_CHECK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Error, Debug)]
pub enum SocketError {
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Socket task is not running")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, SocketError>;

/// Connection lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Connected,
    Disconnected,
    /// Reconnect attempt number (1-based)
    Reconnecting(usize),
    Error(String),
}

#[derive(Debug)]
enum SocketCommand {
    Send(OutgoingMessage),
    Shutdown,
}

/// Connection settings
pub struct SocketConfig {
    pub url: String,
    pub reconnect: Box<dyn ReconnectionStrategy>,
    /// Interval and text payload
    pub heartbeat: Option<(Duration, String)>,
}

impl SocketConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect: Box::new(ExponentialBackoff::default()),
            heartbeat: None,
        }
    }

    pub fn with_reconnect(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.reconnect = Box::new(strategy);
        self
    }

    pub fn with_heartbeat(mut self, interval: Duration, payload: impl Into<String>) -> Self {
        self.heartbeat = Some((interval, payload.into()));
        self
    }
}

/// Cloneable handle for sending frames from any thread
#[derive(Clone)]
pub struct SocketSender {
    command_tx: mpsc::UnboundedSender<SocketCommand>,
}

impl SocketSender {
    /// Queue a frame. Subscriptions are remembered and replayed on reconnect.
    pub fn send(&self, message: OutgoingMessage) -> Result<()> {
        self.command_tx
            .send(SocketCommand::Send(message))
            .map_err(|_| SocketError::ChannelClosed)
    }

    pub fn send_many(&self, messages: impl IntoIterator<Item = OutgoingMessage>) -> Result<()> {
        for message in messages {
            self.send(message)?;
        }
        Ok(())
    }
}

pub struct ScannerSocket {
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    sender: SocketSender,
    event_rx: Receiver<ClientEvent>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
    handler_handles: Vec<std::thread::JoinHandle<()>>,
}

impl ScannerSocket {
    /// Spawn the connection task and the router's handler threads.
    ///
    /// Must be called from within a tokio runtime. `running` is the process
    /// shutdown flag; clearing it stops reconnection, dispatch and the
    /// handlers. An open connection stays up until [`shutdown`](Self::shutdown)
    /// or drop, so frames queued after the flag clears still go out.
    pub fn connect(config: SocketConfig, router: ScannerRouter, running: Arc<AtomicBool>) -> Self {
        Self::connect_with(config, running, |_| router)
    }

    /// Like [`connect`](Self::connect), for handlers that need to send on
    /// this socket themselves. `make_router` receives the socket's sender.
    pub fn connect_with<F>(config: SocketConfig, running: Arc<AtomicBool>, make_router: F) -> Self
    where
        F: FnOnce(SocketSender) -> ScannerRouter,
    {
        let state = Arc::new(AtomicConnectionState::new(ConnectionState::Disconnected));
        let metrics = Arc::new(AtomicMetrics::new());
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = unbounded();

        let router = make_router(SocketSender {
            command_tx: command_tx.clone(),
        });
        let (dispatcher, handler_handles) = router.spawn(Arc::clone(&running));

        let task = SocketTask {
            config,
            state: Arc::clone(&state),
            metrics: Arc::clone(&metrics),
            running,
            command_rx,
            event_tx,
            dispatcher,
            registry: SubscriptionRegistry::new(),
        };
        let task_handle = tokio::spawn(task.run());

        Self {
            state,
            metrics,
            sender: SocketSender { command_tx },
            event_rx,
            task_handle: Some(task_handle),
            handler_handles,
        }
    }

    pub fn send(&self, message: OutgoingMessage) -> Result<()> {
        self.sender.send(message)
    }

    pub fn sender(&self) -> SocketSender {
        self.sender.clone()
    }

    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn metrics(&self) -> Metrics {
        Metrics {
            messages_sent: self.metrics.messages_sent(),
            messages_received: self.metrics.messages_received(),
            reconnect_count: self.metrics.reconnect_count(),
            connection_state: self.state.get(),
        }
    }

    /// Non-blocking
    pub fn try_recv_event(&self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn events(&self) -> Receiver<ClientEvent> {
        self.event_rx.clone()
    }

    /// Close the connection and wait for the task and handler threads
    pub async fn shutdown(mut self) {
        info!("[Scanner WS] Shutting down");
        // Queued behind any frames already sent, so those still go out
        let _ = self.sender.command_tx.send(SocketCommand::Shutdown);

        if let Some(handle) = self.task_handle.take() {
            let _ = handle.await;
        }
        self.state.set(ConnectionState::ShuttingDown);

        // The task dropped the dispatcher, so handler threads drain and exit
        let handles = std::mem::take(&mut self.handler_handles);
        debug!("Waiting for {} handler threads to complete", handles.len());
        let _ = tokio::task::spawn_blocking(move || {
            for handle in handles {
                let _ = handle.join();
            }
        })
        .await;

        info!("[Scanner WS] All handlers shut down");
    }
}

impl Drop for ScannerSocket {
    fn drop(&mut self) {
        if self.task_handle.is_some() {
            let _ = self.sender.command_tx.send(SocketCommand::Shutdown);
        }
    }
}

enum ConnectionEnd {
    /// Server closed or the stream failed; reconnect
    Lost,
    /// Shutdown requested; stop
    Shutdown,
}

struct SocketTask {
    config: SocketConfig,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    running: Arc<AtomicBool>,
    command_rx: mpsc::UnboundedReceiver<SocketCommand>,
    event_tx: Sender<ClientEvent>,
    dispatcher: RouteDispatcher,
    registry: SubscriptionRegistry,
}

impl SocketTask {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire) && !self.state.is_shutting_down()
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.event_tx.send(event);
    }

    async fn run(mut self) {
        let mut attempt = 0usize;

        loop {
            if !self.is_running() || self.drain_commands() {
                debug!("[Scanner WS] Shutdown requested, exiting main loop");
                break;
            }

            if attempt == 0 {
                self.state.set(ConnectionState::Connecting);
            } else {
                self.state.set(ConnectionState::Reconnecting);
                self.emit(ClientEvent::Reconnecting(attempt));
            }

            match connect_async(self.config.url.as_str()).await {
                Ok((stream, _)) => {
                    info!("[Scanner WS] Connected to {}", self.config.url);
                    self.state.set(ConnectionState::Connected);
                    self.emit(ClientEvent::Connected);
                    attempt = 0;

                    let end = self.handle_connection(stream).await;

                    self.state.set(ConnectionState::Disconnected);
                    self.emit(ClientEvent::Disconnected);

                    match end {
                        Ok(ConnectionEnd::Shutdown) => break,
                        Ok(ConnectionEnd::Lost) => warn!("[Scanner WS] Connection lost"),
                        Err(e) => {
                            error!("[Scanner WS] Connection error: {}", e);
                            self.emit(ClientEvent::Error(e.to_string()));
                        }
                    }
                }
                Err(e) => {
                    error!("[Scanner WS] Failed to connect: {}", e);
                    self.state.set(ConnectionState::Disconnected);
                    self.emit(ClientEvent::Error(e.to_string()));
                }
            }

            if !self.is_running() {
                break;
            }

            match self.config.reconnect.next_delay(attempt) {
                Some(delay) => {
                    info!("[Scanner WS] Reconnecting in {:?} (attempt {})", delay, attempt + 1);
                    if !self.wait_for_reconnect(delay).await {
                        break;
                    }
                    attempt += 1;
                    self.metrics.increment_reconnects();
                }
                None => {
                    warn!("[Scanner WS] Reconnection strategy exhausted, stopping");
                    break;
                }
            }
        }

        if !self.state.is_shutting_down() {
            self.state.set(ConnectionState::Disconnected);
        }
        info!("[Scanner WS] Socket task exiting");
    }

    /// Record queued commands without sending them. Returns true on shutdown.
    fn drain_commands(&mut self) -> bool {
        loop {
            match self.command_rx.try_recv() {
                Ok(SocketCommand::Send(message)) => {
                    self.registry.record(&message);
                }
                Ok(SocketCommand::Shutdown) => return true,
                Err(mpsc::error::TryRecvError::Empty) => return false,
                Err(mpsc::error::TryRecvError::Disconnected) => return true,
            }
        }
    }

    /// Sleep out the backoff in small steps. Returns false on shutdown.
    async fn wait_for_reconnect(&mut self, delay: Duration) -> bool {
        let mut elapsed = Duration::ZERO;
        while elapsed < delay {
            if !self.is_running() || self.drain_commands() {
                debug!("[Scanner WS] Shutdown requested during reconnection delay");
                return false;
            }
            let step = FLAG_CHECK_INTERVAL.min(delay - elapsed);
            tokio::time::sleep(step).await;
            elapsed += step;
        }
        true
    }

    async fn handle_connection(&mut self, stream: WsStream) -> Result<ConnectionEnd> {
        let (mut write, mut read) = stream.split();

        // Commands queued while offline join the registry before the replay
        if self.drain_commands() {
            let _ = write.close().await;
            return Ok(ConnectionEnd::Shutdown);
        }

        for message in self.registry.replay() {
            let text = message.to_json()?;
            write
                .send(Message::Text(text))
                .await
                .map_err(|e| SocketError::WebSocket(format!("Failed to replay subscription: {}", e)))?;
            self.metrics.increment_sent();
        }
        if !self.registry.is_empty() {
            info!("[Scanner WS] Replayed {} subscriptions", self.registry.len());
        }

        let mut heartbeat = self.config.heartbeat.as_ref().map(|(interval, payload)| {
            let mut ticker = tokio::time::interval(*interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            (ticker, payload.clone())
        });
        if let Some((ticker, _)) = heartbeat.as_mut() {
            // First tick completes immediately
            ticker.tick().await;
        }

        loop {
            tokio::select! {
                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            self.metrics.increment_received();
                            if self.running.load(Ordering::Acquire) {
                                self.dispatcher.dispatch(&text);
                            }
                        }
                        Some(Ok(Message::Binary(data))) => {
                            self.metrics.increment_received();
                            match String::from_utf8(data) {
                                Ok(text) if self.running.load(Ordering::Acquire) => {
                                    self.dispatcher.dispatch(&text)
                                }
                                Ok(_) => {}
                                Err(_) => debug!("[Scanner WS] Dropping non-UTF-8 binary frame"),
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            info!("[Scanner WS] Server closed connection: {:?}", frame);
                            return Ok(ConnectionEnd::Lost);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            return Err(SocketError::WebSocket(e.to_string()));
                        }
                        None => {
                            return Err(SocketError::ConnectionClosed("Stream ended".into()));
                        }
                    }
                }

                command = self.command_rx.recv() => {
                    match command {
                        Some(SocketCommand::Send(message)) => {
                            if self.registry.record(&message) || !message.is_subscribe() {
                                let text = message.to_json()?;
                                debug!("[Scanner WS] → {}", message.event_name());
                                write
                                    .send(Message::Text(text))
                                    .await
                                    .map_err(|e| SocketError::WebSocket(e.to_string()))?;
                                self.metrics.increment_sent();
                            }
                        }
                        Some(SocketCommand::Shutdown) | None => {
                            let _ = write.close().await;
                            return Ok(ConnectionEnd::Shutdown);
                        }
                    }
                }

                _ = async {
                    match heartbeat.as_mut() {
                        Some((ticker, _)) => { ticker.tick().await; }
                        None => std::future::pending::<()>().await,
                    }
                } => {
                    if let Some((_, payload)) = heartbeat.as_ref() {
                        write
                            .send(Message::Text(payload.clone()))
                            .await
                            .map_err(|e| SocketError::WebSocket(format!("Failed to send heartbeat: {}", e)))?;
                        self.metrics.increment_sent();
                    }
                }
            }
        }
    }
}
