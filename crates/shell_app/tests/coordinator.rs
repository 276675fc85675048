use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use shell_app::{AppConfig, Coordinator};
use shell_core::{
    HostCall, Msg, PromptAnswer, PromptKind, PromptRequest, Session, StatusKind, StatusMessage,
    StreamEvent, Topic,
};
use shell_engine::{
    Capabilities, CommandEndpoint, CommandError, DetachedPrompts, EventBus, EventSender,
    HostSettings, KvStore, Listener, ListenerId, LocalEventBus, StoreError, StoreProvider,
    SubscriptionError,
};
use tokio::sync::Notify;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(shell_logging::initialize_for_tests);
}

/// In-memory store that can be told to fail on save.
#[derive(Default)]
struct MemoryStore {
    values: Mutex<Map<String, Value>>,
    persisted: Mutex<Map<String, Value>>,
    saves: AtomicUsize,
    fail_save: bool,
}

impl MemoryStore {
    fn seeded(key: &str, value: &str) -> Self {
        let mut map = Map::new();
        map.insert(key.to_string(), json!(value));
        Self {
            values: Mutex::new(map.clone()),
            persisted: Mutex::new(map),
            ..Self::default()
        }
    }

    fn failing_save(mut self) -> Self {
        self.fail_save = true;
        self
    }

    fn persisted(&self, key: &str) -> Option<Value> {
        self.persisted.lock().unwrap().get(key).cloned()
    }
}

#[async_trait::async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn save(&self) -> Result<(), StoreError> {
        if self.fail_save {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.persisted.lock().unwrap() = self.values.lock().unwrap().clone();
        Ok(())
    }
}

struct MemoryProvider {
    store: Arc<MemoryStore>,
}

#[async_trait::async_trait]
impl StoreProvider for MemoryProvider {
    async fn open(
        &self,
        _namespace: &str,
        _defaults: Map<String, Value>,
    ) -> Result<Arc<dyn KvStore>, StoreError> {
        Ok(self.store.clone())
    }
}

/// Host double: streams a fixed script and answers login with a fixed value.
struct ScriptedHost {
    script: Vec<StreamEvent>,
    login_reply: Value,
}

#[async_trait::async_trait]
impl CommandEndpoint for ScriptedHost {
    async fn call(&self, command: &str, _args: Value) -> Result<Value, CommandError> {
        match command {
            "login" => Ok(self.login_reply.clone()),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    async fn call_streaming(
        &self,
        _command: &str,
        _args: Value,
        events: EventSender,
    ) -> Result<Value, CommandError> {
        for event in &self.script {
            events.send(event.clone())?;
        }
        Ok(Value::Null)
    }
}

/// Host double: streams a start and one progress event, then holds the call open until released.
struct GatedHost {
    gate: Arc<Notify>,
}

#[async_trait::async_trait]
impl CommandEndpoint for GatedHost {
    async fn call(&self, command: &str, _args: Value) -> Result<Value, CommandError> {
        Err(CommandError::UnknownCommand(command.to_string()))
    }

    async fn call_streaming(
        &self,
        _command: &str,
        args: Value,
        events: EventSender,
    ) -> Result<Value, CommandError> {
        let url = args["url"].as_str().unwrap_or_default().to_string();
        events.send(StreamEvent::Started { url, total: 100 })?;
        events.send(StreamEvent::Progress { received: 50 })?;
        self.gate.notified().await;
        events.send(StreamEvent::Finished)?;
        Ok(Value::Null)
    }
}

/// Local bus that refuses one topic.
struct RefusingBus {
    inner: LocalEventBus,
    refused: &'static str,
}

#[async_trait::async_trait]
impl EventBus for RefusingBus {
    async fn subscribe(&self, topic: &str) -> Result<Listener, SubscriptionError> {
        if topic == self.refused {
            return Err(SubscriptionError::SetupFailed {
                topic: topic.to_string(),
                reason: "permission denied".to_string(),
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

fn with_store(store: Arc<MemoryStore>) -> Capabilities {
    Capabilities {
        store: Some(Arc::new(MemoryProvider { store })),
        ..Capabilities::detached()
    }
}

async fn in_process(dir: &Path) -> Capabilities {
    let settings = HostSettings {
        progress_delay: Duration::ZERO,
        ..HostSettings::default()
    };
    Capabilities::in_process(dir.to_path_buf(), settings, Arc::new(DetachedPrompts)).await
}

fn latest(coordinator: &Coordinator) -> Option<StatusMessage> {
    coordinator.state().status().latest().cloned()
}

fn posted(coordinator: &Coordinator) -> u64 {
    coordinator.state().status().posted()
}

/// Lets background tasks run, then dispatches what they queued, until nothing new arrives.
async fn settle(coordinator: &mut Coordinator) {
    loop {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        if coordinator.process_pending().await == 0 {
            break;
        }
    }
}

#[tokio::test]
async fn first_run_seeds_the_default_theme() {
    init_logging();
    let store = Arc::new(MemoryStore::default());
    let mut coordinator = Coordinator::new(with_store(store.clone()), &AppConfig::default());

    coordinator.dispatch(Msg::Activated).await;

    assert_eq!(coordinator.state().presentation().theme(), "light");
    assert_eq!(store.persisted("currentTheme"), Some(json!("light")));
    assert_eq!(latest(&coordinator), None);
}

#[tokio::test]
async fn stored_theme_is_applied_without_writing() {
    init_logging();
    let store = Arc::new(MemoryStore::seeded("currentTheme", "dark"));
    let mut coordinator = Coordinator::new(with_store(store.clone()), &AppConfig::default());

    coordinator.dispatch(Msg::Activated).await;

    assert_eq!(coordinator.state().presentation().theme(), "dark");
    assert_eq!(store.persisted("currentTheme"), Some(json!("dark")));
    assert_eq!(store.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_theme_save_keeps_the_new_theme_and_reports_an_error() {
    init_logging();
    let store = Arc::new(MemoryStore::seeded("currentTheme", "dark").failing_save());
    let mut coordinator = Coordinator::new(with_store(store.clone()), &AppConfig::default());
    coordinator.dispatch(Msg::Activated).await;

    coordinator
        .dispatch(Msg::ThemeSelected("blue".to_string()))
        .await;

    assert_eq!(coordinator.state().presentation().theme(), "blue");
    let status = latest(&coordinator).expect("status posted");
    assert_eq!(status.kind, StatusKind::Error);
    assert_eq!(status.text, "failed to switch theme");
    assert_eq!(store.persisted("currentTheme"), Some(json!("dark")));
}

#[tokio::test]
async fn theme_switch_is_persisted() {
    init_logging();
    let store = Arc::new(MemoryStore::default());
    let mut coordinator = Coordinator::new(with_store(store.clone()), &AppConfig::default());
    coordinator.dispatch(Msg::Activated).await;

    coordinator
        .dispatch(Msg::ThemeSelected("dark".to_string()))
        .await;

    assert_eq!(store.persisted("currentTheme"), Some(json!("dark")));
    assert_eq!(
        latest(&coordinator),
        Some(StatusMessage::success("theme switched to dark"))
    );
}

#[tokio::test]
async fn unreadable_store_falls_back_to_the_default_theme() {
    init_logging();
    let store = Arc::new(MemoryStore::default().failing_save());
    let config = AppConfig {
        default_theme: "dark".to_string(),
        ..AppConfig::default()
    };
    let mut coordinator = Coordinator::new(with_store(store), &config);

    coordinator.dispatch(Msg::Activated).await;

    assert_eq!(coordinator.state().presentation().theme(), "dark");
    assert_eq!(
        latest(&coordinator),
        Some(StatusMessage::error("failed to initialize settings"))
    );
}

#[tokio::test]
async fn streamed_download_posts_one_status_per_event() {
    init_logging();
    let url = "https://example.com/file.bin".to_string();
    let host = ScriptedHost {
        script: vec![
            StreamEvent::Started {
                url: url.clone(),
                total: 100,
            },
            StreamEvent::Progress { received: 50 },
            StreamEvent::Finished,
        ],
        login_reply: json!(false),
    };
    let caps = Capabilities {
        host: Arc::new(host),
        ..Capabilities::detached()
    };
    let mut coordinator = Coordinator::new(caps, &AppConfig::default());
    let before = posted(&coordinator);

    coordinator
        .dispatch(Msg::StreamDownloadClicked { url: url.clone() })
        .await;
    settle(&mut coordinator).await;

    assert_eq!(posted(&coordinator) - before, 3);
    assert_eq!(
        latest(&coordinator),
        Some(StatusMessage::success("download finished"))
    );
    let view = coordinator.view();
    let download = view.download.expect("download view");
    assert_eq!(download.url, url);
    assert_eq!(download.total, Some(100));
    assert_eq!(download.received, 50);
    assert!(download.finished);
    assert!(!view.stream_in_flight);
}

#[tokio::test]
async fn streamed_progress_is_shown_before_the_host_call_returns() {
    init_logging();
    let gate = Arc::new(Notify::new());
    let caps = Capabilities {
        host: Arc::new(GatedHost { gate: gate.clone() }),
        ..Capabilities::detached()
    };
    let mut coordinator = Coordinator::new(caps, &AppConfig::default());

    coordinator
        .dispatch(Msg::StreamDownloadClicked {
            url: "https://example.com/file.bin".to_string(),
        })
        .await;
    for _ in 0..2 {
        let msg = coordinator.next_message().await.expect("stream event");
        coordinator.dispatch(msg).await;
    }

    assert_eq!(
        latest(&coordinator),
        Some(StatusMessage::success("download progress: 50 bytes"))
    );
    let view = coordinator.view();
    assert!(view.stream_in_flight);
    assert!(!view.download.expect("download view").finished);

    gate.notify_one();
    // Finished event, then the call's completion.
    for _ in 0..2 {
        let msg = coordinator.next_message().await.expect("stream message");
        coordinator.dispatch(msg).await;
    }

    assert_eq!(
        latest(&coordinator),
        Some(StatusMessage::success("download finished"))
    );
    let view = coordinator.view();
    assert!(view.download.expect("download view").finished);
    assert!(!view.stream_in_flight);
}

#[tokio::test]
async fn rejected_login_stays_anonymous_with_one_error() {
    init_logging();
    let caps = Capabilities {
        host: Arc::new(ScriptedHost {
            script: Vec::new(),
            login_reply: json!(false),
        }),
        ..Capabilities::detached()
    };
    let mut coordinator = Coordinator::new(caps, &AppConfig::default());
    coordinator
        .dispatch(Msg::UsernameEdited("admin".to_string()))
        .await;
    coordinator
        .dispatch(Msg::PasswordEdited("wrongpass".to_string()))
        .await;
    let before = posted(&coordinator);

    coordinator.dispatch(Msg::LoginClicked).await;

    assert_eq!(*coordinator.state().session().session(), Session::Anonymous);
    assert_eq!(posted(&coordinator) - before, 1);
    assert_eq!(
        latest(&coordinator),
        Some(StatusMessage::error("invalid username or password"))
    );
}

#[tokio::test]
async fn in_process_login_and_logout() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let mut coordinator = Coordinator::new(in_process(dir.path()).await, &AppConfig::default());

    coordinator.dispatch(Msg::UsernameEdited("x".to_string())).await;
    coordinator
        .dispatch(Msg::PasswordEdited("wrong".to_string()))
        .await;
    let before = posted(&coordinator);
    coordinator.dispatch(Msg::LoginClicked).await;
    assert_eq!(*coordinator.state().session().session(), Session::Anonymous);
    assert_eq!(posted(&coordinator) - before, 1);
    assert!(latest(&coordinator).unwrap().is_error());

    coordinator
        .dispatch(Msg::UsernameEdited("admin".to_string()))
        .await;
    coordinator
        .dispatch(Msg::PasswordEdited("123456".to_string()))
        .await;
    coordinator.dispatch(Msg::LoginClicked).await;
    assert_eq!(
        *coordinator.state().session().session(),
        Session::Authenticated {
            username: "admin".to_string()
        }
    );

    coordinator.dispatch(Msg::LogoutClicked).await;
    let view = coordinator.view();
    assert_eq!(view.session, Session::Anonymous);
    assert_eq!(view.username_field, "");
    assert_eq!(view.password_field_len, 0);
}

#[tokio::test]
async fn deactivation_tears_down_every_subscription_once() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let mut coordinator = Coordinator::new(in_process(dir.path()).await, &AppConfig::default());

    coordinator.dispatch(Msg::Activated).await;
    assert_eq!(coordinator.subscriptions().live_topics().len(), Topic::ALL.len());

    coordinator.dispatch(Msg::Deactivated).await;
    assert_eq!(coordinator.subscriptions().teardown_count(), Topic::ALL.len());

    coordinator.dispatch(Msg::Deactivated).await;
    assert_eq!(coordinator.subscriptions().deactivate(), 0);
    assert_eq!(coordinator.subscriptions().teardown_count(), Topic::ALL.len());
}

#[tokio::test]
async fn background_download_is_reported_through_topics() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let mut coordinator = Coordinator::new(in_process(dir.path()).await, &AppConfig::default());
    coordinator.dispatch(Msg::Activated).await;
    settle(&mut coordinator).await;
    let before = posted(&coordinator);

    coordinator
        .dispatch(Msg::StartDownloadClicked {
            url: "https://a.com/file".to_string(),
        })
        .await;
    assert_eq!(
        latest(&coordinator),
        Some(StatusMessage::success("download task started"))
    );

    settle(&mut coordinator).await;
    // started, four progress updates, finished
    assert_eq!(posted(&coordinator) - before, 1 + 6);
    assert!(!latest(&coordinator).unwrap().is_error());
}

#[tokio::test]
async fn test_event_round_trips_through_the_bus() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let mut coordinator = Coordinator::new(in_process(dir.path()).await, &AppConfig::default());
    coordinator.dispatch(Msg::Activated).await;

    coordinator.dispatch(Msg::SendTestEventClicked).await;
    assert_eq!(
        latest(&coordinator),
        Some(StatusMessage::success("test event sent"))
    );

    settle(&mut coordinator).await;
    assert_eq!(
        latest(&coordinator),
        Some(StatusMessage::success(
            r#"received event: {"url":"https://a.com/file"}"#
        ))
    );
}

#[tokio::test]
async fn no_topic_events_after_deactivation() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let mut coordinator = Coordinator::new(in_process(dir.path()).await, &AppConfig::default());
    coordinator.dispatch(Msg::Activated).await;
    coordinator.dispatch(Msg::Deactivated).await;
    let before = posted(&coordinator);

    coordinator.dispatch(Msg::SendTestEventClicked).await;
    settle(&mut coordinator).await;

    assert_eq!(posted(&coordinator) - before, 1);
    assert_eq!(
        latest(&coordinator),
        Some(StatusMessage::success("test event sent"))
    );
}

#[tokio::test]
async fn refused_topic_is_reported_and_others_still_work() {
    init_logging();
    let bus = Arc::new(RefusingBus {
        inner: LocalEventBus::new(),
        refused: "download-progress",
    });
    let caps = Capabilities {
        bus,
        ..Capabilities::detached()
    };
    let mut coordinator = Coordinator::new(caps, &AppConfig::default());

    coordinator.dispatch(Msg::Activated).await;

    assert_eq!(
        latest(&coordinator),
        Some(StatusMessage::error(
            "failed to listen to download-progress: permission denied"
        ))
    );
    assert_eq!(
        coordinator.subscriptions().live_topics(),
        vec!["download-finished", "download-started", "test-event"]
    );
}

#[tokio::test]
async fn host_commands_report_their_results() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let mut coordinator = Coordinator::new(in_process(dir.path()).await, &AppConfig::default());

    coordinator
        .dispatch(Msg::HostCallClicked(HostCall::Greet {
            name: "World".to_string(),
        }))
        .await;
    assert_eq!(
        latest(&coordinator),
        Some(StatusMessage::success(
            "greet: Hello, World! Welcome to the shell."
        ))
    );

    coordinator
        .dispatch(Msg::HostCallClicked(HostCall::IncrementCounter))
        .await;
    coordinator
        .dispatch(Msg::HostCallClicked(HostCall::GetCounter))
        .await;
    assert_eq!(
        latest(&coordinator),
        Some(StatusMessage::success("get_counter: 1"))
    );
}

#[tokio::test]
async fn detached_mode_degrades_quietly() {
    init_logging();
    let mut coordinator = Coordinator::new(Capabilities::detached(), &AppConfig::default());

    coordinator.dispatch(Msg::Activated).await;
    assert_eq!(coordinator.state().presentation().theme(), "light");
    assert_eq!(latest(&coordinator), None);

    coordinator
        .dispatch(Msg::HostCallClicked(HostCall::GetCounter))
        .await;
    assert_eq!(
        latest(&coordinator),
        Some(StatusMessage::error(
            "get_counter failed: host process unavailable"
        ))
    );

    coordinator
        .dispatch(Msg::PromptRequested(PromptRequest::AskYesNo {
            title: "Shell".to_string(),
            message: "Sure?".to_string(),
            kind: PromptKind::Warning,
        }))
        .await;
    assert_eq!(
        coordinator.view().last_prompt_answer,
        Some(PromptAnswer::Cancelled)
    );
}
