//! Websocket protocol messages
//!
//! Every frame is a JSON object `{ "event": <name>, "data": <payload> }`.
//!
//! ```text
//! client → server   scanner-filter / unsubscribe-scanner-filter      (ScannerFilter)
//!                   subscribe-pair / unsubscribe-pair                (PairSubscriptionPayload)
//!                   subscribe-pair-stats / unsubscribe-pair-stats    (PairSubscriptionPayload)
//! server → client   scanner-pairs                                    (ScannerPairsEventPayload)
//!                   tick                                             (TickEventPayload)
//!                   pair-stats                                       (PairStatsMsgData)
//! ```

use super::chain::SupportedChainName;
use super::filter::ScannerFilter;
use super::pair::{ScannerPairDetails, ScannerResult, TimeframesPairStats};
use serde::{Deserialize, Serialize};

/// Identifies a pair stream: pair address, token address and chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairSubscriptionPayload {
    pub pair: String,
    pub token: String,
    pub chain: SupportedChainName,
}

/// Messages sent by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum OutgoingMessage {
    #[serde(rename = "scanner-filter")]
    ScannerFilter(ScannerFilter),
    #[serde(rename = "unsubscribe-scanner-filter")]
    UnsubscribeScannerFilter(ScannerFilter),
    #[serde(rename = "subscribe-pair")]
    SubscribePair(PairSubscriptionPayload),
    #[serde(rename = "unsubscribe-pair")]
    UnsubscribePair(PairSubscriptionPayload),
    #[serde(rename = "subscribe-pair-stats")]
    SubscribePairStats(PairSubscriptionPayload),
    #[serde(rename = "unsubscribe-pair-stats")]
    UnsubscribePairStats(PairSubscriptionPayload),
}

impl OutgoingMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            OutgoingMessage::ScannerFilter(_) => "scanner-filter",
            OutgoingMessage::UnsubscribeScannerFilter(_) => "unsubscribe-scanner-filter",
            OutgoingMessage::SubscribePair(_) => "subscribe-pair",
            OutgoingMessage::UnsubscribePair(_) => "unsubscribe-pair",
            OutgoingMessage::SubscribePairStats(_) => "subscribe-pair-stats",
            OutgoingMessage::UnsubscribePairStats(_) => "unsubscribe-pair-stats",
        }
    }

    pub fn is_subscribe(&self) -> bool {
        matches!(
            self,
            OutgoingMessage::ScannerFilter(_)
                | OutgoingMessage::SubscribePair(_)
                | OutgoingMessage::SubscribePairStats(_)
        )
    }

    /// The message that undoes this one
    pub fn counterpart(&self) -> OutgoingMessage {
        match self {
            OutgoingMessage::ScannerFilter(f) => OutgoingMessage::UnsubscribeScannerFilter(f.clone()),
            OutgoingMessage::UnsubscribeScannerFilter(f) => OutgoingMessage::ScannerFilter(f.clone()),
            OutgoingMessage::SubscribePair(p) => OutgoingMessage::UnsubscribePair(p.clone()),
            OutgoingMessage::UnsubscribePair(p) => OutgoingMessage::SubscribePair(p.clone()),
            OutgoingMessage::SubscribePairStats(p) => OutgoingMessage::UnsubscribePairStats(p.clone()),
            OutgoingMessage::UnsubscribePairStats(p) => OutgoingMessage::SubscribePairStats(p.clone()),
        }
    }

    /// Serialize to the JSON text frame sent on the socket
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A single swap inside a tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WsTokenSwap {
    pub timestamp: String,
    pub address_to: String,
    pub address_from: String,
    pub token0_address: String,
    pub amount_token0: String,
    pub amount_token1: String,
    pub price_token0_usd: String,
    pub price_token1_usd: String,
    pub token_in_address: String,
    pub is_outlier: bool,
}

/// A batch of swaps for a subscribed pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickEventPayload {
    pub pair: PairSubscriptionPayload,
    pub swaps: Vec<WsTokenSwap>,
}

/// Pair details and stats for a subscribed pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PairStatsMsgData {
    pub pair: ScannerPairDetails,
    pub pair_stats: TimeframesPairStats,
    pub migration_progress: String,
    pub call_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScannerPairsResults {
    #[serde(default)]
    pub pairs: Vec<ScannerResult>,
}

/// Full result set for a subscribed scanner filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerPairsEventPayload {
    pub filter: ScannerFilter,
    pub results: ScannerPairsResults,
}

/// Messages pushed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum IncomingMessage {
    #[serde(rename = "tick")]
    Tick(TickEventPayload),
    #[serde(rename = "pair-stats")]
    PairStats(PairStatsMsgData),
    #[serde(rename = "scanner-pairs")]
    ScannerPairs(ScannerPairsEventPayload),
}

impl IncomingMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            IncomingMessage::Tick(_) => "tick",
            IncomingMessage::PairStats(_) => "pair-stats",
            IncomingMessage::ScannerPairs(_) => "scanner-pairs",
        }
    }

    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> PairSubscriptionPayload {
        PairSubscriptionPayload {
            pair: "0xpair".to_string(),
            token: "0xtoken".to_string(),
            chain: SupportedChainName::Eth,
        }
    }

    #[test]
    fn test_subscribe_pair_wire_shape() {
        let json = OutgoingMessage::SubscribePair(pair()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["event"], "subscribe-pair");
        assert_eq!(value["data"]["pair"], "0xpair");
        assert_eq!(value["data"]["token"], "0xtoken");
        assert_eq!(value["data"]["chain"], "ETH");
    }

    #[test]
    fn test_scanner_filter_wire_shape() {
        let json = OutgoingMessage::ScannerFilter(ScannerFilter::new_tokens())
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["event"], "scanner-filter");
        assert_eq!(value["data"]["rankBy"], "age");
        assert!(value["data"].get("page").is_none());
    }

    #[test]
    fn test_counterpart_round_trips() {
        let sub = OutgoingMessage::SubscribePairStats(pair());
        let unsub = sub.counterpart();
        assert_eq!(unsub.event_name(), "unsubscribe-pair-stats");
        assert!(sub.is_subscribe());
        assert!(!unsub.is_subscribe());
        assert_eq!(unsub.counterpart(), sub);
    }

    #[test]
    fn test_parse_tick() {
        let json = r#"{
            "event": "tick",
            "data": {
                "pair": {"pair": "0xpair", "token": "0xtoken", "chain": "BSC"},
                "swaps": [{
                    "timestamp": "1715000000",
                    "tokenInAddress": "0xweth",
                    "amountToken1": "1500",
                    "priceToken1Usd": "0.02",
                    "isOutlier": false
                }]
            }
        }"#;

        match IncomingMessage::parse(json).unwrap() {
            IncomingMessage::Tick(tick) => {
                assert_eq!(tick.pair.chain, SupportedChainName::Bsc);
                assert_eq!(tick.swaps.len(), 1);
                assert_eq!(tick.swaps[0].price_token1_usd, "0.02");
                assert!(!tick.swaps[0].is_outlier);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_parse_pair_stats() {
        let json = r#"{
            "event": "pair-stats",
            "data": {
                "pair": {"pairAddress": "0xpair", "chain": "SOL", "mintAuthorityRenounced": true},
                "pairStats": {"fiveMin": {"change": "4.2"}},
                "migrationProgress": "87.5",
                "callCount": 3
            }
        }"#;

        match IncomingMessage::parse(json).unwrap() {
            IncomingMessage::PairStats(stats) => {
                assert_eq!(stats.pair.pair_address, "0xpair");
                assert!(stats.pair.mint_authority_renounced);
                assert_eq!(stats.pair_stats.five_min.change, "4.2");
                assert_eq!(stats.migration_progress, "87.5");
                assert_eq!(stats.call_count, 3);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_parse_scanner_pairs() {
        let json = r#"{
            "event": "scanner-pairs",
            "data": {
                "filter": {"rankBy": "volume", "orderBy": "desc"},
                "results": {"pairs": [{"pairAddress": "0x1"}]}
            }
        }"#;

        let message = IncomingMessage::parse(json).unwrap();
        assert_eq!(message.event_name(), "scanner-pairs");
        if let IncomingMessage::ScannerPairs(payload) = message {
            assert_eq!(payload.results.pairs[0].pair_address, "0x1");
            assert_eq!(payload.filter.rank_by, Some(crate::domain::filter::RankBy::Volume));
        }
    }

    #[test]
    fn test_unknown_event_is_error() {
        assert!(IncomingMessage::parse(r#"{"event":"heartbeat","data":{}}"#).is_err());
    }
}
