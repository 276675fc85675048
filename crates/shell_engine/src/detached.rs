use serde_json::Value;
use shell_core::{PromptAnswer, PromptRequest};
use tokio::sync::mpsc;

use crate::{
    CommandEndpoint, CommandError, EventBus, EventSender, Listener, ListenerId, PromptProvider,
    SubscriptionError,
};

/// Bus used without a host shell: subscriptions succeed but never deliver.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedBus;

#[async_trait::async_trait]
impl EventBus for DetachedBus {
    async fn subscribe(&self, _topic: &str) -> Result<Listener, SubscriptionError> {
        let (_tx, rx) = mpsc::unbounded_channel();
        Ok(Listener { id: 0, events: rx })
    }

    fn unsubscribe(&self, _topic: &str, _id: ListenerId) {}

    fn publish(&self, _topic: &str, _payload: Value) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedHost;

#[async_trait::async_trait]
impl CommandEndpoint for DetachedHost {
    async fn call(&self, _command: &str, _args: Value) -> Result<Value, CommandError> {
        Err(CommandError::HostUnavailable)
    }

    async fn call_streaming(
        &self,
        _command: &str,
        _args: Value,
        _events: EventSender,
    ) -> Result<Value, CommandError> {
        Err(CommandError::HostUnavailable)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedPrompts;

#[async_trait::async_trait]
impl PromptProvider for DetachedPrompts {
    async fn prompt(&self, request: &PromptRequest) -> PromptAnswer {
        match request {
            PromptRequest::ShowMessage { .. } => PromptAnswer::Acknowledged,
            _ => PromptAnswer::Cancelled,
        }
    }
}
