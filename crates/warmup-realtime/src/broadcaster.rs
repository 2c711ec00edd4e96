//! `EventPublisher` backed by [`MemoryPubSub`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use warmup_core::events::{DeviceEvent, DomainEvent, EventPayload};
use warmup_core::result::AppResult;
use warmup_core::traits::EventPublisher;

use crate::channel::Channel;
use crate::message::OutboundMessage;
use crate::pubsub::MemoryPubSub;

/// Routes each event to its device channel(s) and to `tasks`.
#[derive(Debug, Clone)]
pub struct TaskEventBroadcaster {
    pubsub: Arc<MemoryPubSub>,
}

impl TaskEventBroadcaster {
    /// Create a broadcaster over `pubsub`.
    pub fn new(pubsub: Arc<MemoryPubSub>) -> Self {
        Self { pubsub }
    }

    /// The underlying pub/sub, for subscribing.
    pub fn pubsub(&self) -> &Arc<MemoryPubSub> {
        &self.pubsub
    }

    fn channels_for(event: &DomainEvent) -> Vec<Channel> {
        let mut channels = match &event.payload {
            EventPayload::Device(DeviceEvent::DevicesOffline { device_ids }) => device_ids
                .iter()
                .cloned()
                .map(Channel::Device)
                .collect(),
            _ => event
                .device_id()
                .cloned()
                .map(Channel::Device)
                .into_iter()
                .collect::<Vec<_>>(),
        };
        channels.push(Channel::Tasks);
        channels
    }
}

#[async_trait]
impl EventPublisher for TaskEventBroadcaster {
    async fn publish(&self, event: DomainEvent) -> AppResult<()> {
        for channel in Self::channels_for(&event) {
            let channel = channel.to_string();
            let delivered = self
                .pubsub
                .publish(
                    &channel,
                    OutboundMessage::Event {
                        channel: channel.clone(),
                        event: event.clone(),
                    },
                )
                .await;
            trace!(event = event.name(), channel = %channel, delivered, "Event published");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warmup_core::events::TaskEvent;
    use warmup_core::types::id::{DeviceId, TaskId};

    fn device(id: &str) -> DeviceId {
        DeviceId::parse(id).expect("valid device id")
    }

    #[tokio::test]
    async fn task_events_reach_device_and_fleet_channels() {
        let pubsub = Arc::new(MemoryPubSub::new(16));
        let broadcaster = TaskEventBroadcaster::new(pubsub.clone());
        let mut phone = pubsub.subscribe("device:phone-1").await;
        let mut other = pubsub.subscribe("device:phone-2").await;
        let mut fleet = pubsub.subscribe("tasks").await;

        broadcaster
            .publish(DomainEvent::task(TaskEvent::TaskCreated {
                task_id: TaskId::new(),
                device_id: device("phone-1"),
                task_type: "send_message".into(),
                priority: "normal".into(),
            }))
            .await
            .expect("publish");

        for rx in [&mut phone, &mut fleet] {
            match rx.recv().await.expect("message") {
                OutboundMessage::Event { event, .. } => assert_eq!(event.name(), "task_created"),
                other => panic!("unexpected message {other:?}"),
            }
        }
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn offline_sweep_notifies_each_device() {
        let pubsub = Arc::new(MemoryPubSub::new(16));
        let broadcaster = TaskEventBroadcaster::new(pubsub.clone());
        let mut a = pubsub.subscribe("device:a").await;
        let mut b = pubsub.subscribe("device:b").await;

        broadcaster
            .publish(DomainEvent::device(DeviceEvent::DevicesOffline {
                device_ids: vec![device("a"), device("b")],
            }))
            .await
            .expect("publish");

        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[tokio::test]
    async fn publishing_with_no_listeners_succeeds() {
        let broadcaster = TaskEventBroadcaster::new(Arc::new(MemoryPubSub::new(4)));
        let result = broadcaster
            .publish(DomainEvent::device(DeviceEvent::DeviceRegistered {
                device_id: device("phone-1"),
                name: None,
            }))
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn wire_format_is_tagged() {
        let msg = OutboundMessage::Event {
            channel: "tasks".into(),
            event: DomainEvent::task(TaskEvent::TaskCompleted {
                task_id: TaskId::new(),
                device_id: device("phone-1"),
                result: serde_json::json!({"ok": true}),
            }),
        };
        let value: serde_json::Value = serde_json::from_str(&msg.to_json()).expect("json");
        assert_eq!(value["type"], "event");
        assert_eq!(value["event"]["payload"]["domain"], "task");
        assert_eq!(value["event"]["payload"]["event"]["type"], "task_completed");
    }
}
