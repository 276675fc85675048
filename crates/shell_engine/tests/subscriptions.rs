use std::collections::HashSet;
use std::sync::{Arc, Mutex, Once};

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shell_engine::{
    payload_text, EventBus, Listener, ListenerId, LocalEventBus, SubscriptionError,
    SubscriptionManager, TopicHandler, TopicSpec,
};
use tokio::sync::Notify;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(shell_logging::initialize_for_tests);
}

#[derive(Default)]
struct Recorder {
    received: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Recorder {
    fn handler(&self) -> TopicHandler {
        let received = self.received.clone();
        Arc::new(move |topic: &str, payload: Value| {
            received.lock().unwrap().push((topic.to_string(), payload));
        })
    }

    fn take(&self) -> Vec<(String, Value)> {
        self.received.lock().unwrap().drain(..).collect()
    }
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

fn specs(recorder: &Recorder, topics: &[&str]) -> Vec<TopicSpec> {
    topics
        .iter()
        .map(|topic| TopicSpec::new(*topic, recorder.handler()))
        .collect()
}

/// Fails setup for the configured topics, delegates everything else.
struct FlakyBus {
    inner: LocalEventBus,
    failing: HashSet<String>,
}

#[async_trait::async_trait]
impl EventBus for FlakyBus {
    async fn subscribe(&self, topic: &str) -> Result<Listener, SubscriptionError> {
        if self.failing.contains(topic) {
            return Err(SubscriptionError::SetupFailed {
                topic: topic.to_string(),
                reason: "refused".to_string(),
            });
        }
        self.inner.subscribe(topic).await
    }

    fn unsubscribe(&self, topic: &str, id: ListenerId) {
        self.inner.unsubscribe(topic, id);
    }

    fn publish(&self, topic: &str, payload: Value) {
        self.inner.publish(topic, payload);
    }
}

/// Holds every subscription until the gate opens.
#[derive(Default)]
struct GatedBus {
    inner: LocalEventBus,
    gate: Notify,
}

#[async_trait::async_trait]
impl EventBus for GatedBus {
    async fn subscribe(&self, topic: &str) -> Result<Listener, SubscriptionError> {
        self.gate.notified().await;
        self.inner.subscribe(topic).await
    }

    fn unsubscribe(&self, topic: &str, id: ListenerId) {
        self.inner.unsubscribe(topic, id);
    }

    fn publish(&self, topic: &str, payload: Value) {
        self.inner.publish(topic, payload);
    }
}

#[tokio::test]
async fn events_are_forwarded_verbatim_and_in_order() {
    init_logging();
    let bus = Arc::new(LocalEventBus::new());
    let manager = SubscriptionManager::new(bus.clone());
    let recorder = Recorder::default();

    let report = manager
        .activate(specs(&recorder, &["download-progress"]))
        .await;
    assert_eq!(report.established, vec!["download-progress".to_string()]);

    for percent in [10, 30, 70, 100] {
        bus.publish("download-progress", json!(percent));
    }
    settle().await;

    let received: Vec<Value> = recorder.take().into_iter().map(|(_, v)| v).collect();
    assert_eq!(received, vec![json!(10), json!(30), json!(70), json!(100)]);
}

#[tokio::test]
async fn teardowns_match_established_subscriptions() {
    init_logging();
    let bus = Arc::new(LocalEventBus::new());
    let manager = SubscriptionManager::new(bus.clone());
    let recorder = Recorder::default();
    let topics = ["download-started", "download-progress", "download-finished", "test-event"];

    let report = manager.activate(specs(&recorder, &topics)).await;
    assert_eq!(report.established.len(), 4);
    assert_eq!(manager.live_topics().len(), 4);

    assert_eq!(manager.deactivate(), 4);
    assert_eq!(manager.teardown_count(), 4);
    for topic in topics {
        assert_eq!(bus.listener_count(topic), 0);
    }

    // Second deactivation is a no-op.
    assert_eq!(manager.deactivate(), 0);
    assert_eq!(manager.teardown_count(), 4);

    bus.publish("test-event", json!("late"));
    settle().await;
    assert!(recorder.take().is_empty());
}

#[tokio::test]
async fn failed_topic_does_not_block_others() {
    init_logging();
    let bus = Arc::new(FlakyBus {
        inner: LocalEventBus::new(),
        failing: HashSet::from(["download-progress".to_string()]),
    });
    let manager = SubscriptionManager::new(bus.clone());
    let recorder = Recorder::default();

    let report = manager
        .activate(specs(
            &recorder,
            &["download-started", "download-progress", "test-event"],
        ))
        .await;

    assert_eq!(report.established.len(), 2);
    assert_eq!(
        report.failed,
        vec![SubscriptionError::SetupFailed {
            topic: "download-progress".to_string(),
            reason: "refused".to_string(),
        }]
    );
    assert_eq!(
        manager.live_topics(),
        vec!["download-started".to_string(), "test-event".to_string()]
    );
    assert_eq!(manager.deactivate(), 2);
}

#[tokio::test]
async fn reactivation_does_not_double_subscribe() {
    init_logging();
    let bus = Arc::new(LocalEventBus::new());
    let manager = SubscriptionManager::new(bus.clone());
    let recorder = Recorder::default();

    manager.activate(specs(&recorder, &["test-event"])).await;
    let report = manager.activate(specs(&recorder, &["test-event"])).await;

    assert!(report.established.is_empty());
    assert_eq!(report.skipped, vec!["test-event".to_string()]);
    assert_eq!(bus.listener_count("test-event"), 1);

    bus.publish("test-event", json!({"url": "https://a.com/file"}));
    settle().await;
    assert_eq!(recorder.take().len(), 1);
    assert_eq!(manager.deactivate(), 1);
}

#[tokio::test]
async fn new_cycle_after_deactivation_subscribes_again() {
    init_logging();
    let bus = Arc::new(LocalEventBus::new());
    let manager = SubscriptionManager::new(bus.clone());
    let recorder = Recorder::default();

    manager.activate(specs(&recorder, &["test-event"])).await;
    manager.deactivate();
    let report = manager.activate(specs(&recorder, &["test-event"])).await;

    assert_eq!(report.established, vec!["test-event".to_string()]);
    assert_eq!(bus.listener_count("test-event"), 1);
}

#[tokio::test]
async fn setup_resolving_after_deactivation_is_torn_down() {
    init_logging();
    let bus = Arc::new(GatedBus::default());
    let manager = SubscriptionManager::new(bus.clone());
    let recorder = Recorder::default();
    let topics = specs(&recorder, &["test-event"]);

    let activation = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.activate(topics).await })
    };
    tokio::task::yield_now().await;

    // Nothing established yet, so nothing to tear down; must not panic.
    assert_eq!(manager.deactivate(), 0);

    bus.gate.notify_one();
    let report = activation.await.unwrap();

    assert!(report.established.is_empty());
    assert_eq!(report.abandoned, vec!["test-event".to_string()]);
    assert_eq!(manager.teardown_count(), 1);
    assert_eq!(bus.inner.listener_count("test-event"), 0);
    assert!(manager.live_topics().is_empty());
}

#[test]
fn payload_text_unquotes_strings() {
    assert_eq!(payload_text(&json!("https://a.com/file")), "https://a.com/file");
    assert_eq!(payload_text(&json!(70)), "70");
    assert_eq!(
        payload_text(&json!({"url": "https://a.com/file"})),
        r#"{"url":"https://a.com/file"}"#
    );
}
