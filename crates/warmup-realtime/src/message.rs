//! Messages pushed to WebSocket listeners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warmup_core::events::DomainEvent;

/// Server-to-client messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Subscription confirmed.
    Subscribed {
        /// Channel name.
        channel: String,
    },
    /// A domain event published on the channel.
    Event {
        /// Channel the event was delivered on.
        channel: String,
        /// The event.
        event: DomainEvent,
    },
    /// The listener fell behind and missed messages.
    Lagged {
        /// Channel name.
        channel: String,
        /// How many messages were dropped.
        skipped: u64,
    },
    /// Keepalive.
    Ping {
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// The request could not be served.
    Error {
        /// Description.
        message: String,
    },
}

impl OutboundMessage {
    /// Serialize to the JSON text frame sent over the socket.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"serialization failed: {e}"}}"#)
        })
    }
}
