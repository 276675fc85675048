use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use shell_core::{StreamEvent, Topic, CREDENTIALS_REJECTED_TEXT};
use shell_logging::{shell_debug, shell_info};

use crate::{
    payload_text, CommandEndpoint, CommandError, EventBus, EventSender, SubscriptionManager,
    TopicSpec,
};

#[derive(Debug, Clone)]
pub struct HostSettings {
    pub username: String,
    pub password: String,
    pub download_total: u64,
    pub download_chunks: Vec<u64>,
    /// Pause after each streamed progress chunk.
    pub progress_delay: Duration,
    pub broadcast_progress: Vec<u8>,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "123456".to_string(),
            download_total: 1000,
            download_chunks: vec![120, 300, 250, 330],
            progress_delay: Duration::from_millis(100),
            broadcast_progress: vec![10, 30, 70, 100],
        }
    }
}

#[derive(Debug, Default)]
struct HostState {
    counter: u32,
    username: String,
    logged_in: bool,
}

#[derive(Deserialize)]
struct NameArgs {
    name: String,
}

#[derive(Deserialize)]
struct LoginArgs {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct UrlArgs {
    url: String,
}

#[derive(Deserialize)]
struct UsernameArgs {
    username: String,
}

/// Host process running in the same address space as the UI layer.
///
/// Broadcasts go out on the shared bus; streamed commands report through the
/// caller's event channel.
pub struct InProcessHost {
    settings: HostSettings,
    bus: Arc<dyn EventBus>,
    state: Mutex<HostState>,
    listeners: SubscriptionManager,
}

impl InProcessHost {
    pub fn new(settings: HostSettings, bus: Arc<dyn EventBus>) -> Self {
        Self {
            settings,
            listeners: SubscriptionManager::new(bus.clone()),
            bus,
            state: Mutex::new(HostState::default()),
        }
    }

    /// Starts the host's own listener for `test-event`.
    pub async fn listen(&self) {
        let handler = Arc::new(|topic: &str, payload: Value| {
            shell_info!("Host received {}: {}", topic, payload_text(&payload));
        });
        self.listeners
            .activate(vec![TopicSpec::new(Topic::TestEvent.name(), handler)])
            .await;
    }

    pub fn is_logged_in(&self) -> bool {
        self.state().logged_in
    }

    fn state(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn greet(&self, args: NameArgs) -> Result<Value, CommandError> {
        if args.name.is_empty() {
            return Err(CommandError::Failed("name must not be empty".to_string()));
        }
        Ok(json!(format!("Hello, {}! Welcome to the shell.", args.name)))
    }

    fn login(&self, args: LoginArgs) -> Result<Value, CommandError> {
        let mut state = self.state();
        if args.username.trim() == self.settings.username
            && args.password.trim() == self.settings.password
        {
            state.logged_in = true;
            state.username = args.username;
            shell_info!("Host login accepted for {}", state.username);
            Ok(json!(true))
        } else {
            state.logged_in = false;
            shell_info!("Host login rejected");
            Err(CommandError::Failed(CREDENTIALS_REJECTED_TEXT.to_string()))
        }
    }

    fn start_download(&self, args: UrlArgs) -> Result<Value, CommandError> {
        self.bus
            .publish(Topic::DownloadStarted.name(), json!(args.url.clone()));
        for percent in &self.settings.broadcast_progress {
            self.bus.publish(Topic::DownloadProgress.name(), json!(percent));
        }
        self.bus
            .publish(Topic::DownloadFinished.name(), json!(args.url));
        Ok(Value::Null)
    }

    async fn download(&self, args: UrlArgs, events: EventSender) -> Result<Value, CommandError> {
        events.send(StreamEvent::Started {
            url: args.url,
            total: self.settings.download_total,
        })?;
        for &received in &self.settings.download_chunks {
            events.send(StreamEvent::Progress { received })?;
            if !self.settings.progress_delay.is_zero() {
                tokio::time::sleep(self.settings.progress_delay).await;
            }
        }
        events.send(StreamEvent::Finished)?;
        Ok(Value::Null)
    }
}

#[async_trait::async_trait]
impl CommandEndpoint for InProcessHost {
    async fn call(&self, command: &str, args: Value) -> Result<Value, CommandError> {
        shell_debug!("Host call {}", command);
        match command {
            "greet" => self.greet(parse_args(command, args)?),
            "login" => self.login(parse_args(command, args)?),
            "get_counter" => Ok(json!(self.state().counter)),
            "increment_counter" => {
                let mut state = self.state();
                state.counter = state.counter.saturating_add(1);
                Ok(json!(state.counter))
            }
            "set_username" => {
                let UsernameArgs { username } = parse_args(command, args)?;
                let mut state = self.state();
                state.username = username;
                Ok(json!(state.username))
            }
            "start_download" => self.start_download(parse_args(command, args)?),
            "download1" => Err(CommandError::InvalidArgs {
                command: command.to_string(),
                reason: "requires an event channel".to_string(),
            }),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    async fn call_streaming(
        &self,
        command: &str,
        args: Value,
        events: EventSender,
    ) -> Result<Value, CommandError> {
        match command {
            "download1" => self.download(parse_args(command, args)?, events).await,
            _ => self.call(command, args).await,
        }
    }
}

fn parse_args<T: DeserializeOwned>(command: &str, args: Value) -> Result<T, CommandError> {
    serde_json::from_value(args).map_err(|err| CommandError::InvalidArgs {
        command: command.to_string(),
        reason: err.to_string(),
    })
}
