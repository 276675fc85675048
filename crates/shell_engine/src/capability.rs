use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value};
use shell_core::{PromptAnswer, PromptRequest, StreamEvent};
use tokio::sync::mpsc;

use crate::{
    CommandError, DetachedBus, DetachedHost, DetachedPrompts, HostSettings, InProcessHost,
    JsonStoreProvider, LocalEventBus, StoreError, SubscriptionError,
};

/// One opened key-value namespace. `set` is not durable until `save`.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
    async fn save(&self) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
pub trait StoreProvider: Send + Sync {
    async fn open(
        &self,
        namespace: &str,
        defaults: Map<String, Value>,
    ) -> Result<Arc<dyn KvStore>, StoreError>;
}

pub type ListenerId = u64;

/// An established bus subscription: ordered payloads for one topic.
pub struct Listener {
    pub id: ListenerId,
    pub events: mpsc::UnboundedReceiver<Value>,
}

#[async_trait::async_trait]
pub trait EventBus: Send + Sync {
    async fn subscribe(&self, topic: &str) -> Result<Listener, SubscriptionError>;
    /// Removes a listener. Unknown ids are ignored.
    fn unsubscribe(&self, topic: &str, id: ListenerId);
    fn publish(&self, topic: &str, payload: Value);
}

/// Sending half of a streaming command's event channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl EventSender {
    pub fn new(tx: mpsc::UnboundedSender<StreamEvent>) -> Self {
        Self { tx }
    }

    pub fn send(&self, event: StreamEvent) -> Result<(), CommandError> {
        self.tx.send(event).map_err(|_| CommandError::ChannelClosed)
    }
}

#[async_trait::async_trait]
pub trait CommandEndpoint: Send + Sync {
    async fn call(&self, command: &str, args: Value) -> Result<Value, CommandError>;

    async fn call_streaming(
        &self,
        command: &str,
        args: Value,
        events: EventSender,
    ) -> Result<Value, CommandError>;
}

#[async_trait::async_trait]
pub trait PromptProvider: Send + Sync {
    async fn prompt(&self, request: &PromptRequest) -> PromptAnswer;
}

/// External capabilities, chosen once at startup.
#[derive(Clone)]
pub struct Capabilities {
    /// `None` when no persistent store exists; the config store then runs detached.
    pub store: Option<Arc<dyn StoreProvider>>,
    pub bus: Arc<dyn EventBus>,
    pub host: Arc<dyn CommandEndpoint>,
    pub prompts: Arc<dyn PromptProvider>,
}

impl Capabilities {
    /// No host shell: nothing persists, no events arrive, host calls fail and
    /// prompts are cancelled.
    pub fn detached() -> Self {
        Self {
            store: None,
            bus: Arc::new(DetachedBus),
            host: Arc::new(DetachedHost),
            prompts: Arc::new(DetachedPrompts),
        }
    }

    /// In-process host with a JSON store under `store_dir`.
    ///
    /// Must be called inside a tokio runtime: the host starts its own
    /// listeners.
    pub async fn in_process(
        store_dir: PathBuf,
        settings: HostSettings,
        prompts: Arc<dyn PromptProvider>,
    ) -> Self {
        let bus = Arc::new(LocalEventBus::new());
        let host = InProcessHost::new(settings, bus.clone());
        host.listen().await;
        Self {
            store: Some(Arc::new(JsonStoreProvider::new(store_dir))),
            bus,
            host: Arc::new(host),
            prompts,
        }
    }
}
