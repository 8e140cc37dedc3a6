//! Process-wide fan-out of tick batches to subscribers.
//!
//! The hub wraps a bounded [`tokio::sync::broadcast`] channel. Publishing
//! never blocks: a subscriber that falls behind by more than the channel
//! capacity receives a lag notification and skips ahead to the newest
//! batch, and a dropped subscriber simply stops counting as a receiver.
//! Subscribers only see batches published after they join -- there is no
//! backlog replay.

use stockyard_types::TickBatch;
use tokio::sync::broadcast;

/// Default bounded queue depth per subscriber.
pub const DEFAULT_CAPACITY: usize = 256;

/// Fan-out point for per-tick change batches.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    tx: broadcast::Sender<TickBatch>,
}

impl BroadcastHub {
    /// Create a hub with the given bounded per-subscriber capacity.
    ///
    /// A zero capacity is promoted to 1 (the broadcast channel requires a
    /// positive buffer).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new subscriber.
    ///
    /// The returned [`Subscription`] yields every batch published after
    /// this call. Dropping it unsubscribes.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Deliver a batch to all currently-registered subscribers.
    ///
    /// Returns the number of subscribers the batch was queued for.
    /// Zero subscribers is a normal condition, not an error.
    pub fn publish(&self, batch: TickBatch) -> usize {
        // send returns Err only when there are zero receivers, which is
        // normal when nobody is connected.
        self.tx.send(batch).unwrap_or(0)
    }

    /// Number of currently-registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A live subscription to the hub.
///
/// Dropping the subscription unsubscribes; no explicit deregistration
/// call is needed.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<TickBatch>,
}

impl Subscription {
    /// Receive the next batch.
    ///
    /// If this subscriber lagged past the bounded queue, the skipped
    /// count is logged and the next available batch is returned. Returns
    /// `None` once the hub has been dropped and all pending batches are
    /// consumed.
    pub async fn recv(&mut self) -> Option<TickBatch> {
        loop {
            match self.rx.recv().await {
                Ok(batch) => return Some(batch),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Subscriber lagged, skipping ahead");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn batch(tick: u64) -> TickBatch {
        TickBatch {
            tick,
            events: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let hub = BroadcastHub::new(8);
        assert_eq!(hub.publish(batch(1)), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_batches_in_order() {
        let hub = BroadcastHub::new(8);
        let mut sub = hub.subscribe();

        hub.publish(batch(1));
        hub.publish(batch(2));

        assert_eq!(sub.recv().await.unwrap().tick, 1);
        assert_eq!(sub.recv().await.unwrap().tick, 2);
    }

    #[tokio::test]
    async fn late_subscriber_gets_no_backlog() {
        let hub = BroadcastHub::new(8);
        hub.publish(batch(1));
        hub.publish(batch(2));

        let mut sub = hub.subscribe();
        hub.publish(batch(3));

        // Only the batch published after joining arrives.
        assert_eq!(sub.recv().await.unwrap().tick, 3);
    }

    #[tokio::test]
    async fn lagged_subscriber_skips_to_newest() {
        let hub = BroadcastHub::new(2);
        let mut sub = hub.subscribe();

        // Overflow the bounded queue: the two oldest batches are dropped
        // for this subscriber, never queued behind it.
        for tick in 1..=4 {
            hub.publish(batch(tick));
        }

        assert_eq!(sub.recv().await.unwrap().tick, 3);
        assert_eq!(sub.recv().await.unwrap().tick, 4);
    }

    #[tokio::test]
    async fn dropped_subscription_unsubscribes() {
        let hub = BroadcastHub::new(8);
        let sub = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);
        drop(sub);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn recv_returns_none_after_hub_dropped() {
        let hub = BroadcastHub::new(8);
        let mut sub = hub.subscribe();
        hub.publish(batch(1));
        drop(hub);

        // Pending batch drains, then the channel reports closed.
        assert_eq!(sub.recv().await.unwrap().tick, 1);
        assert!(sub.recv().await.is_none());
    }
}
