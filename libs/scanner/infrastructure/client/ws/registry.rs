//! Server-side subscription bookkeeping
//!
//! Every subscribe frame sent on the socket is recorded here and removed again
//! by its unsubscribe counterpart. After a (re)connect the socket replays the
//! active entries so the server holds the same subscriptions as the client.

use crate::domain::OutgoingMessage;

#[derive(Debug, Default, Clone)]
pub struct SubscriptionRegistry {
    active: Vec<OutgoingMessage>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outgoing frame. Returns false for a duplicate subscribe or an
    /// unsubscribe of something that was never subscribed.
    pub fn record(&mut self, message: &OutgoingMessage) -> bool {
        if message.is_subscribe() {
            if self.active.contains(message) {
                return false;
            }
            self.active.push(message.clone());
            true
        } else {
            let target = message.counterpart();
            let before = self.active.len();
            self.active.retain(|m| m != &target);
            self.active.len() != before
        }
    }

    /// Active subscriptions in the order they were made
    pub fn replay(&self) -> &[OutgoingMessage] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
