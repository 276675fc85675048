use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use shell_logging::shell_trace;
use tokio::sync::mpsc;

use crate::{EventBus, Listener, ListenerId, SubscriptionError};

type Senders = Vec<(ListenerId, mpsc::UnboundedSender<Value>)>;

/// In-process publish/subscribe bus. Each listener gets its own ordered
/// channel; publishing never blocks.
#[derive(Debug, Default)]
pub struct LocalEventBus {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<String, Senders>>,
}

impl LocalEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self, topic: &str) -> usize {
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.get(topic).map_or(0, Vec::len)
    }
}

#[async_trait::async_trait]
impl EventBus for LocalEventBus {
    async fn subscribe(&self, topic: &str) -> Result<Listener, SubscriptionError> {
        if topic.is_empty() {
            return Err(SubscriptionError::SetupFailed {
                topic: topic.to_string(),
                reason: "empty topic name".to_string(),
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::unbounded_channel();
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.entry(topic.to_string()).or_default().push((id, tx));
        Ok(Listener { id, events: rx })
    }

    fn unsubscribe(&self, topic: &str, id: ListenerId) {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(senders) = listeners.get_mut(topic) {
            senders.retain(|(listener_id, _)| *listener_id != id);
            if senders.is_empty() {
                listeners.remove(topic);
            }
        }
    }

    fn publish(&self, topic: &str, payload: Value) {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(senders) = listeners.get_mut(topic) else {
            shell_trace!("No listeners for topic={}", topic);
            return;
        };
        // Listeners whose receiver is gone are pruned on the way.
        senders.retain(|(_, tx)| tx.send(payload.clone()).is_ok());
    }
}
