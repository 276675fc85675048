use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::join_all;
use serde_json::Value;
use shell_logging::{shell_debug, shell_info, shell_warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{EventBus, ListenerId, SubscriptionError};

/// Receives every payload of one topic, verbatim and in order.
pub type TopicHandler = Arc<dyn Fn(&str, Value) + Send + Sync>;

#[derive(Clone)]
pub struct TopicSpec {
    pub topic: String,
    pub handler: TopicHandler,
}

impl TopicSpec {
    pub fn new(topic: impl Into<String>, handler: TopicHandler) -> Self {
        Self {
            topic: topic.into(),
            handler,
        }
    }
}

#[derive(Debug, Default)]
pub struct ActivationReport {
    pub established: Vec<String>,
    /// Already held or pending in this cycle; not subscribed again.
    pub skipped: Vec<String>,
    /// Resolved after the cycle was deactivated and torn down at once.
    pub abandoned: Vec<String>,
    pub failed: Vec<SubscriptionError>,
}

/// Renders a payload for display: strings without quotes, anything else as JSON.
pub fn payload_text(payload: &Value) -> String {
    match payload {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

struct SubscriptionHandle {
    topic: String,
    id: ListenerId,
    bus: Arc<dyn EventBus>,
    cancel: CancellationToken,
}

impl SubscriptionHandle {
    /// Consumes the handle, so each subscription is torn down at most once.
    fn teardown(self) {
        self.bus.unsubscribe(&self.topic, self.id);
        self.cancel.cancel();
        shell_debug!("Tore down subscription topic={} id={}", self.topic, self.id);
    }
}

enum Slot {
    Pending,
    Live(SubscriptionHandle),
}

#[derive(Default)]
struct Registry {
    cycle: u64,
    slots: HashMap<String, Slot>,
}

/// Owns the live subscriptions of the current activation cycle.
///
/// `activate` and `deactivate` take `&self`, so a deactivation may run while
/// setups are still in flight. A setup that resolves after its cycle ended is
/// torn down immediately instead of being recorded.
#[derive(Clone)]
pub struct SubscriptionManager {
    bus: Arc<dyn EventBus>,
    registry: Arc<Mutex<Registry>>,
    teardowns: Arc<AtomicUsize>,
}

impl SubscriptionManager {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self {
            bus,
            registry: Arc::new(Mutex::new(Registry::default())),
            teardowns: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn activate(&self, topics: Vec<TopicSpec>) -> ActivationReport {
        let mut report = ActivationReport::default();
        let (cycle, to_establish) = {
            let mut registry = self.lock();
            let cycle = registry.cycle;
            let mut to_establish = Vec::with_capacity(topics.len());
            for spec in topics {
                if registry.slots.contains_key(&spec.topic) {
                    shell_debug!("Topic {} already subscribed in this cycle", spec.topic);
                    report.skipped.push(spec.topic);
                    continue;
                }
                registry.slots.insert(spec.topic.clone(), Slot::Pending);
                to_establish.push(spec);
            }
            (cycle, to_establish)
        };

        let outcomes = join_all(
            to_establish
                .into_iter()
                .map(|spec| self.establish(cycle, spec)),
        )
        .await;

        for outcome in outcomes {
            match outcome {
                Established::Live(topic) => report.established.push(topic),
                Established::Abandoned(topic) => report.abandoned.push(topic),
                Established::Failed(err) => {
                    shell_warn!("{}", err);
                    report.failed.push(err);
                }
            }
        }
        shell_info!(
            "Activation cycle {}: {} established, {} failed, {} skipped",
            cycle,
            report.established.len(),
            report.failed.len(),
            report.skipped.len()
        );
        report
    }

    /// Tears down every established subscription once. Returns how many were
    /// torn down; a second call returns 0.
    pub fn deactivate(&self) -> usize {
        let handles: Vec<SubscriptionHandle> = {
            let mut registry = self.lock();
            registry.cycle += 1;
            registry
                .slots
                .drain()
                .filter_map(|(_, slot)| match slot {
                    Slot::Live(handle) => Some(handle),
                    Slot::Pending => None,
                })
                .collect()
        };

        let count = handles.len();
        for handle in handles {
            handle.teardown();
        }
        self.teardowns.fetch_add(count, Ordering::Relaxed);
        count
    }

    pub fn live_topics(&self) -> Vec<String> {
        let registry = self.lock();
        let mut topics: Vec<String> = registry
            .slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Live(_)))
            .map(|(topic, _)| topic.clone())
            .collect();
        topics.sort();
        topics
    }

    /// Total teardowns performed over the manager's lifetime.
    pub fn teardown_count(&self) -> usize {
        self.teardowns.load(Ordering::Relaxed)
    }

    async fn establish(&self, cycle: u64, spec: TopicSpec) -> Established {
        let TopicSpec { topic, handler } = spec;
        let listener = match self.bus.subscribe(&topic).await {
            Ok(listener) => listener,
            Err(err) => {
                let mut registry = self.lock();
                if registry.cycle == cycle {
                    registry.slots.remove(&topic);
                }
                return Established::Failed(err);
            }
        };

        let cancel = CancellationToken::new();
        let handle = SubscriptionHandle {
            topic: topic.clone(),
            id: listener.id,
            bus: self.bus.clone(),
            cancel: cancel.clone(),
        };

        {
            let mut registry = self.lock();
            let still_pending =
                registry.cycle == cycle && matches!(registry.slots.get(&topic), Some(Slot::Pending));
            if still_pending {
                tokio::spawn(consume(listener.events, topic.clone(), handler, cancel));
                registry.slots.insert(topic.clone(), Slot::Live(handle));
                return Established::Live(topic);
            }
        }

        shell_debug!("Subscription to {} resolved after deactivation", topic);
        handle.teardown();
        self.teardowns.fetch_add(1, Ordering::Relaxed);
        Established::Abandoned(topic)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

enum Established {
    Live(String),
    Abandoned(String),
    Failed(SubscriptionError),
}

async fn consume(
    mut events: mpsc::UnboundedReceiver<Value>,
    topic: String,
    handler: TopicHandler,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            payload = events.recv() => match payload {
                Some(payload) => handler(&topic, payload),
                None => break,
            },
        }
    }
    shell_debug!("Consumer for {} stopped", topic);
}
