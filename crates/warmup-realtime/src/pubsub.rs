//! In-memory pub/sub for single-node deployments.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tokio::sync::broadcast;

use crate::message::OutboundMessage;

/// Channel name to broadcast sender.
#[derive(Debug)]
pub struct MemoryPubSub {
    channels: RwLock<HashMap<String, broadcast::Sender<OutboundMessage>>>,
    buffer_size: usize,
}

impl MemoryPubSub {
    /// Create a pub/sub whose channels buffer `buffer_size` messages.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Publish to a channel. Returns how many receivers got the message;
    /// zero when nobody is listening.
    pub async fn publish(&self, channel: &str, msg: OutboundMessage) -> usize {
        let channels = self.channels.read().await;
        match channels.get(channel) {
            Some(tx) => tx.send(msg).unwrap_or(0),
            None => 0,
        }
    }

    /// Subscribe to a channel, creating it on first use.
    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<OutboundMessage> {
        let mut channels = self.channels.write().await;
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0)
            .subscribe()
    }

    /// Number of live receivers on a channel.
    pub async fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map_or(0, |tx| tx.receiver_count())
    }

    /// Release a receiver taken from [`subscribe`](Self::subscribe). The
    /// channel is removed once its last receiver is gone; returns whether
    /// that happened.
    pub async fn unsubscribe(
        &self,
        channel: &str,
        rx: broadcast::Receiver<OutboundMessage>,
    ) -> bool {
        drop(rx);
        let mut channels = self.channels.write().await;
        if channels
            .get(channel)
            .is_some_and(|tx| tx.receiver_count() == 0)
        {
            channels.remove(channel);
            true
        } else {
            false
        }
    }

    /// Number of channels currently held.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let pubsub = MemoryPubSub::new(8);
        let delivered = pubsub
            .publish("tasks", OutboundMessage::Error { message: "x".into() })
            .await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn subscribers_receive_and_released_channels_are_removed() {
        let pubsub = MemoryPubSub::new(8);
        let mut rx = pubsub.subscribe("tasks").await;
        assert_eq!(pubsub.subscriber_count("tasks").await, 1);

        let delivered = pubsub
            .publish(
                "tasks",
                OutboundMessage::Subscribed {
                    channel: "tasks".into(),
                },
            )
            .await;
        assert_eq!(delivered, 1);
        assert!(matches!(
            rx.recv().await.expect("message"),
            OutboundMessage::Subscribed { .. }
        ));

        assert!(pubsub.unsubscribe("tasks", rx).await);
        assert_eq!(pubsub.subscriber_count("tasks").await, 0);
    }

    #[tokio::test]
    async fn last_unsubscribe_removes_the_channel() {
        let pubsub = MemoryPubSub::new(8);
        let first = pubsub.subscribe("device:phone-1").await;
        let second = pubsub.subscribe("device:phone-1").await;
        assert_eq!(pubsub.channel_count().await, 1);

        assert!(!pubsub.unsubscribe("device:phone-1", first).await);
        assert_eq!(pubsub.subscriber_count("device:phone-1").await, 1);

        assert!(pubsub.unsubscribe("device:phone-1", second).await);
        assert_eq!(pubsub.channel_count().await, 0);
    }
}
