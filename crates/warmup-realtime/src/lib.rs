//! # warmup-realtime
//!
//! Single-node fan-out of domain events. [`MemoryPubSub`] keeps one
//! `tokio::sync::broadcast` sender per channel; [`TaskEventBroadcaster`]
//! implements the core `EventPublisher` trait on top of it, routing each
//! event to its device channel and to the fleet-wide `tasks` channel.

pub mod broadcaster;
pub mod channel;
pub mod message;
pub mod pubsub;

pub use broadcaster::TaskEventBroadcaster;
pub use channel::Channel;
pub use message::OutboundMessage;
pub use pubsub::MemoryPubSub;
