//! Reference-counted pair subscriptions
//!
//! A pair mounted in two tables is subscribed once and unsubscribed only when
//! the last table unmounts it.

use crate::domain::{OutgoingMessage, PairSubscriptionPayload};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct PairSubscriptions {
    counts: HashMap<String, (usize, PairSubscriptionPayload)>,
}

impl PairSubscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the subscribe frames when this is the first mount
    pub fn mount(&mut self, payload: &PairSubscriptionPayload) -> Vec<OutgoingMessage> {
        let entry = self
            .counts
            .entry(payload.pair.clone())
            .or_insert_with(|| (0, payload.clone()));
        entry.0 += 1;

        if entry.0 == 1 {
            vec![
                OutgoingMessage::SubscribePair(payload.clone()),
                OutgoingMessage::SubscribePairStats(payload.clone()),
            ]
        } else {
            Vec::new()
        }
    }

    /// Returns the unsubscribe frames when the last mount goes away
    pub fn unmount(&mut self, pair_id: &str) -> Vec<OutgoingMessage> {
        let Some(entry) = self.counts.get_mut(pair_id) else {
            return Vec::new();
        };
        entry.0 = entry.0.saturating_sub(1);
        if entry.0 > 0 {
            return Vec::new();
        }

        match self.counts.remove(pair_id) {
            Some((_, payload)) => vec![
                OutgoingMessage::UnsubscribePair(payload.clone()),
                OutgoingMessage::UnsubscribePairStats(payload),
            ],
            None => Vec::new(),
        }
    }

    pub fn count(&self, pair_id: &str) -> usize {
        self.counts.get(pair_id).map_or(0, |(n, _)| *n)
    }

    pub fn is_subscribed(&self, pair_id: &str) -> bool {
        self.count(pair_id) > 0
    }

    /// Number of distinct subscribed pairs
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SupportedChainName;

    fn payload(id: &str) -> PairSubscriptionPayload {
        PairSubscriptionPayload {
            pair: id.to_string(),
            token: "0xtoken".to_string(),
            chain: SupportedChainName::Base,
        }
    }

    #[test]
    fn test_first_mount_subscribes_once() {
        let mut subs = PairSubscriptions::new();
        let first = subs.mount(&payload("a"));
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].event_name(), "subscribe-pair");
        assert_eq!(first[1].event_name(), "subscribe-pair-stats");

        assert!(subs.mount(&payload("a")).is_empty());
        assert_eq!(subs.count("a"), 2);
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn test_last_unmount_unsubscribes() {
        let mut subs = PairSubscriptions::new();
        subs.mount(&payload("a"));
        subs.mount(&payload("a"));

        assert!(subs.unmount("a").is_empty());
        let last = subs.unmount("a");
        assert_eq!(
            last,
            vec![
                OutgoingMessage::UnsubscribePair(payload("a")),
                OutgoingMessage::UnsubscribePairStats(payload("a")),
            ]
        );
        assert!(!subs.is_subscribed("a"));
        assert!(subs.is_empty());
    }

    #[test]
    fn test_unmount_unknown_pair_is_noop() {
        let mut subs = PairSubscriptions::new();
        assert!(subs.unmount("missing").is_empty());
    }
}
