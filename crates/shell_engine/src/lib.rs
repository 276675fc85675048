//! Shell engine: capability adapters, subscriptions and host commands.
mod bus;
mod capability;
mod config_store;
mod detached;
mod error;
mod host;
mod json_store;
mod persist;
mod streaming;
mod subscriptions;

pub use bus::LocalEventBus;
pub use capability::{
    Capabilities, CommandEndpoint, EventBus, EventSender, KvStore, Listener, ListenerId,
    PromptProvider, StoreProvider,
};
pub use config_store::ConfigStore;
pub use detached::{DetachedBus, DetachedHost, DetachedPrompts};
pub use error::{CommandError, StoreError, SubscriptionError};
pub use host::{HostSettings, InProcessHost};
pub use json_store::{JsonFileStore, JsonStoreProvider};
pub use persist::{PersistError, StoreDir};
pub use streaming::{invoke_streaming, StreamReport};
pub use subscriptions::{payload_text, ActivationReport, SubscriptionManager, TopicHandler, TopicSpec};
