//! Board, handlers and socket working together against a mock server

mod common;

use std::time::Duration;

use common::{wait_until, with_timeout, MockWsServer};
use crossbeam_channel::unbounded;
use scanner::application::sync::{BoardHandler, BoardUpdate, ScannerBoard, ScannerTable, Viewport};
use scanner::domain::{
    IncomingMessage, PairSubscriptionPayload, ScannerFilter, ScannerPairsEventPayload,
    ScannerPairsResults, ScannerResult, SupportedChainName, TickEventPayload, WsTokenSwap,
};
use scanner::infrastructure::{
    ExponentialBackoff, ScannerRoute, ScannerRouter, ScannerSocket, ShutdownManager, SocketConfig,
};

const WAIT: Duration = Duration::from_secs(5);

fn result(pair: &str, volume: &str) -> ScannerResult {
    ScannerResult {
        pair_address: pair.to_string(),
        token1_address: format!("{}-token", pair),
        token1_symbol: pair.to_uppercase(),
        chain_id: 8453,
        price: "1.0".to_string(),
        volume: volume.to_string(),
        token1_total_supply_formatted: "1000".to_string(),
        ..Default::default()
    }
}

fn to_json(message: &IncomingMessage) -> String {
    serde_json::to_string(message).unwrap()
}

fn snapshot(pairs: Vec<ScannerResult>) -> String {
    to_json(&IncomingMessage::ScannerPairs(ScannerPairsEventPayload {
        filter: ScannerFilter::trending(),
        results: ScannerPairsResults { pairs },
    }))
}

fn events_for(frames: &[String], pair: &str) -> Vec<String> {
    frames
        .iter()
        .filter_map(|f| serde_json::from_str::<serde_json::Value>(f).ok())
        .filter(|v| v["data"]["pair"] == pair)
        .map(|v| v["event"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_snapshot_and_tick_flow_through_the_board() {
    let server = MockWsServer::start().await;
    let shutdown = ShutdownManager::new();

    let board = ScannerBoard::new(vec![ScannerTable::new(
        "Trending Tokens",
        ScannerFilter::trending(),
        Viewport::new(2, 0),
    )])
    .shared();

    let (update_tx, update_rx) = unbounded::<BoardUpdate>();
    let handler_board = board.clone();
    let config = SocketConfig::new(server.ws_url()).with_reconnect(ExponentialBackoff::new(
        Duration::from_millis(50),
        Duration::from_millis(200),
        None,
    ));
    let socket = ScannerSocket::connect_with(config, shutdown.flag(), |sender| {
        ScannerRouter::new().route_all(BoardHandler::new(handler_board, sender).with_updates(update_tx))
    });
    assert!(wait_until(WAIT, || socket.is_connected()).await);

    // Snapshot: three rows, only the two with the most volume are visible
    server.push(snapshot(vec![
        result("p3", "100"),
        result("p1", "300"),
        result("p2", "200"),
    ]));

    assert!(wait_until(WAIT, || server.received().len() == 4).await);
    let frames = server.received();
    assert_eq!(events_for(&frames, "p1"), vec!["subscribe-pair", "subscribe-pair-stats"]);
    assert_eq!(events_for(&frames, "p2"), vec!["subscribe-pair", "subscribe-pair-stats"]);
    assert!(events_for(&frames, "p3").is_empty());
    {
        let board = board.read();
        let ids: Vec<&str> = board.tables()[0].rows().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
    }

    // Tick for a mounted pair
    let tick = IncomingMessage::Tick(TickEventPayload {
        pair: PairSubscriptionPayload {
            pair: "p1".to_string(),
            token: "p1-token".to_string(),
            chain: SupportedChainName::Base,
        },
        swaps: vec![WsTokenSwap {
            token_in_address: "0xweth".to_string(),
            amount_token1: "10".to_string(),
            price_token1_usd: "2.0".to_string(),
            ..Default::default()
        }],
    });
    server.push(to_json(&tick));

    assert!(
        wait_until(WAIT, || update_rx
            .try_iter()
            .any(|u| u.route == ScannerRoute::Tick))
        .await
    );
    {
        let board = board.read();
        let row = board.tables()[0].row("p1").unwrap();
        assert_eq!(row.price_usd, 2.0);
        assert_eq!(row.mcap, 2_000.0);
        assert_eq!(row.volume_usd, 320.0);
        assert_eq!(row.transactions.buys, 1);
    }

    // A snapshot without p1 unsubscribes it and mounts p3
    server.push(snapshot(vec![result("p2", "200"), result("p3", "100")]));
    assert!(wait_until(WAIT, || server.received().len() == 8).await);
    let frames = server.received();
    assert_eq!(
        events_for(&frames, "p1"),
        vec![
            "subscribe-pair",
            "subscribe-pair-stats",
            "unsubscribe-pair",
            "unsubscribe-pair-stats"
        ]
    );
    assert_eq!(events_for(&frames, "p3"), vec!["subscribe-pair", "subscribe-pair-stats"]);

    with_timeout(socket.shutdown()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_snapshot_for_other_filter_is_ignored() {
    let server = MockWsServer::start().await;
    let shutdown = ShutdownManager::new();
    let board = ScannerBoard::new(vec![ScannerTable::new(
        "New Tokens",
        ScannerFilter::new_tokens(),
        Viewport::new(5, 0),
    )])
    .shared();

    let handler_board = board.clone();
    let socket = ScannerSocket::connect_with(
        SocketConfig::new(server.ws_url()),
        shutdown.flag(),
        |sender| ScannerRouter::new().route_all(BoardHandler::new(handler_board, sender)),
    );
    assert!(wait_until(WAIT, || socket.is_connected()).await);

    server.push(snapshot(vec![result("p1", "1")]));
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(board.read().tables()[0].is_empty());
    assert!(server.received().is_empty());

    with_timeout(socket.shutdown()).await;
}
