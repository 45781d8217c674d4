//! # Real-Time Event Fan-Out
//!
//! Push notifications to connected WebSocket clients.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Event Fan-Out                                 │
//! │                                                                     │
//! │  Route handler (after the DB write commits)                         │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  EventBus::publish(topic, name, payload)                            │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  tokio::sync::broadcast ──┬──► /ws client #1                        │
//! │                           ├──► /ws client #2                        │
//! │                           └──► /ws client #3                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Publishing is fire-and-forget: it happens after persistence succeeds,
//! a send with no subscribers is fine, and a lagging subscriber drops
//! messages rather than slowing the write path.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::AppState;

/// Broadcast channel capacity. Lagging receivers drop the oldest events.
const EVENT_BUFFER: usize = 256;

// =============================================================================
// Topics & Events
// =============================================================================

/// One push-notification topic per entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Product,
    Category,
    Location,
    Supplier,
    Discount,
    Customer,
    User,
    Inventory,
    Order,
    CashDrawer,
    StockIn,
    StockAdjustment,
}

/// A domain event pushed to all connected clients.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub topic: Topic,
    /// Event name, e.g. `OrderCreated`, `CashDrawerStarted`.
    pub name: String,
    /// The created/updated record.
    pub payload: serde_json::Value,
}

// =============================================================================
// Event Bus
// =============================================================================

/// Shared broadcast channel for domain events.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUFFER);
        EventBus { tx }
    }

    /// Publishes an event to all connected clients.
    ///
    /// Serialization failures and the no-subscriber case are logged, never
    /// surfaced: a broadcast problem must not fail the request that already
    /// committed.
    pub fn publish<P: Serialize>(&self, topic: Topic, name: &str, payload: &P) {
        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!(name, ?e, "Failed to serialize event payload");
                return;
            }
        };

        let event = Event {
            topic,
            name: name.to_string(),
            payload,
        };

        // Err just means nobody is listening right now
        let _ = self.tx.send(event);
    }

    /// Subscribes to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new()
    }
}

// =============================================================================
// WebSocket Handler
// =============================================================================

/// `GET /ws` - upgrades to a WebSocket and forwards every domain event as a
/// JSON text frame until the client disconnects.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let events = state.events.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, events))
}

async fn handle_socket(socket: WebSocket, events: EventBus) {
    let (mut sink, mut stream) = socket.split();
    let mut rx = events.subscribe();

    debug!(
        subscribers = events.subscriber_count(),
        "WebSocket client connected"
    );

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        let text = match serde_json::to_string(&event) {
                            Ok(text) => text,
                            Err(e) => {
                                warn!(?e, "Failed to serialize event");
                                continue;
                            }
                        };
                        if sink.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "WebSocket client lagged; events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = stream.next() => {
                match incoming {
                    // Clients don't send us anything meaningful; answer pings,
                    // drop the rest
                    Some(Ok(Message::Ping(data))) => {
                        if sink.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    debug!("WebSocket client disconnected");
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(Topic::Order, "OrderCreated", &serde_json::json!({"order_id": 1}));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name, "OrderCreated");
        assert_eq!(event.topic, Topic::Order);
        assert_eq!(event.payload["order_id"], 1);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(Topic::Product, "ProductAdded", &serde_json::json!({}));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
