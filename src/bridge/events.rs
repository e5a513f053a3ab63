//! Best-effort event publishing for stage transitions.
//!
//! Publishers never fail the caller: a full or closed channel drops the event.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, trace};

pub const STAGE_CHANGED: &str = "translation.stage";
pub const TRANSLATION_COMPLETED: &str = "translation.completed";
pub const TRANSLATION_FAILED: &str = "translation.failed";

pub trait EventPublisher: Send + Sync {
    fn publish(&self, event_type: &str, payload: Value);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, _event_type: &str, _payload: Value) {}
}

/// Emits events as trace-level log records
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPublisher;

impl EventPublisher for TracingPublisher {
    fn publish(&self, event_type: &str, payload: Value) {
        trace!(event = event_type, payload = %payload, "Bridge event");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeEvent {
    pub event_type: String,
    pub payload: Value,
}

/// Forwards events to an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: mpsc::UnboundedSender<BridgeEvent>,
}

impl ChannelPublisher {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BridgeEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventPublisher for ChannelPublisher {
    fn publish(&self, event_type: &str, payload: Value) {
        let event = BridgeEvent {
            event_type: event_type.to_string(),
            payload,
        };
        if self.sender.send(event).is_err() {
            debug!(event = event_type, "Event receiver dropped");
        }
    }
}
