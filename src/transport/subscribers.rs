//! SSE subscriber registry.
//!
//! Owned by the HTTP transport: created when the server starts, one entry per
//! open event stream, cleared at shutdown. Entries are removed when the
//! `Subscription` handed to the stream is dropped.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    clients: DashMap<Uuid, mpsc::UnboundedSender<String>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new client and return its receiving end.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.clients.insert(id, tx);
        info!(client_id = %id, clients = self.len(), "SSE client connected");

        Subscription {
            id,
            receiver: rx,
            registry: Arc::clone(self),
        }
    }

    /// Remove a client. Returns whether it was registered.
    pub fn unsubscribe(&self, id: &Uuid) -> bool {
        let removed = self.clients.remove(id).is_some();
        if removed {
            info!(client_id = %id, "SSE client disconnected");
        }
        removed
    }

    /// Send `message` to every registered client. Returns how many received it.
    pub fn broadcast(&self, message: &str) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        for entry in self.clients.iter() {
            if entry.value().send(message.to_string()).is_ok() {
                delivered += 1;
            } else {
                closed.push(*entry.key());
            }
        }

        // Removing while iterating would deadlock on the shard lock.
        for id in closed {
            debug!(client_id = %id, "Dropping closed SSE client");
            self.clients.remove(&id);
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Drop every client. Their streams end once the channel drains.
    pub fn clear(&self) {
        self.clients.clear();
    }
}

/// Receiving end of one SSE client.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    receiver: mpsc::UnboundedReceiver<String>,
    registry: Arc<SubscriberRegistry>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next broadcast message, or `None` once the client was removed.
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.unsubscribe(&self.id);
    }
}
