use std::sync::Arc;

use serde_json::{json, Value};
use shell_core::{Effect, HostCall, LoginOutcome, Msg, Topic, CREDENTIALS_REJECTED_TEXT};
use shell_engine::{
    invoke_streaming, payload_text, Capabilities, CommandError, SubscriptionError,
    SubscriptionManager, TopicHandler, TopicSpec,
};
use shell_logging::{shell_debug, shell_error, shell_info, shell_warn};
use tokio::sync::mpsc;

use crate::ThemeCoordinator;

const STREAM_COMMAND: &str = "download1";

/// Executes effects against the capabilities and reports back as messages.
pub struct EffectRunner {
    caps: Capabilities,
    theme: ThemeCoordinator,
    subscriptions: SubscriptionManager,
    msg_tx: mpsc::UnboundedSender<Msg>,
}

impl EffectRunner {
    pub fn new(
        caps: Capabilities,
        theme: ThemeCoordinator,
        msg_tx: mpsc::UnboundedSender<Msg>,
    ) -> Self {
        let subscriptions = SubscriptionManager::new(caps.bus.clone());
        Self {
            caps,
            theme,
            subscriptions,
            msg_tx,
        }
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    pub async fn run(&mut self, effect: Effect) {
        match effect {
            Effect::InitializeTheme => {
                let result = self.theme.initialize().await;
                if let Err(err) = &result {
                    shell_error!("Theme initialization failed: {}", err);
                }
                self.send(Msg::ThemeInitialized(result.map_err(|err| err.to_string())));
            }
            Effect::PersistTheme { name } => {
                let result = self.theme.persist(&name).await;
                if let Err(err) = &result {
                    shell_error!("Persisting theme {} failed: {}", name, err);
                }
                self.send(Msg::ThemePersisted {
                    name,
                    result: result.map_err(|err| err.to_string()),
                });
            }
            Effect::Subscribe { topics } => {
                let specs = topics
                    .into_iter()
                    .map(|topic| TopicSpec::new(topic.name(), self.forwarder(topic)))
                    .collect();
                let report = self.subscriptions.activate(specs).await;
                shell_info!(
                    "Subscriptions established={} skipped={} abandoned={} failed={}",
                    report.established.len(),
                    report.skipped.len(),
                    report.abandoned.len(),
                    report.failed.len()
                );
                for failure in report.failed {
                    match failure {
                        SubscriptionError::SetupFailed { topic, reason } => {
                            match Topic::from_name(&topic) {
                                Some(topic) => self.send(Msg::SubscriptionFailed { topic, reason }),
                                None => shell_warn!("Setup failed for unknown topic {}", topic),
                            }
                        }
                    }
                }
            }
            Effect::Unsubscribe => {
                let removed = self.subscriptions.deactivate();
                shell_info!("Released {} subscriptions", removed);
            }
            Effect::Login {
                attempt,
                username,
                password,
            } => {
                shell_info!("Login attempt={} username_len={}", attempt, username.len());
                let result = self
                    .caps
                    .host
                    .call("login", json!({ "username": username, "password": password }))
                    .await;
                self.send(Msg::LoginResolved {
                    attempt,
                    outcome: classify_login(result),
                });
            }
            Effect::StreamDownload { url } => {
                shell_info!("Streaming download url={}", url);
                let host = self.caps.host.clone();
                let tx = self.msg_tx.clone();
                // Events reach the coordinator while the call is still running.
                tokio::spawn(async move {
                    let events = tx.clone();
                    let report = invoke_streaming(
                        host.as_ref(),
                        STREAM_COMMAND,
                        json!({ "url": url }),
                        |event| {
                            let _ = events.send(Msg::DownloadEvent(event));
                        },
                    )
                    .await;
                    if report.dropped > 0 {
                        shell_warn!("Dropped {} out-of-order download events", report.dropped);
                    }
                    shell_debug!(
                        "Stream report delivered={} finished={}",
                        report.delivered,
                        report.finished
                    );
                    let _ = tx.send(Msg::StreamDownloadCompleted(
                        report.result.map(|_| ()).map_err(|err| err.to_string()),
                    ));
                });
            }
            Effect::StartDownload { url } => {
                shell_info!("Starting download url={}", url);
                let result = self
                    .caps
                    .host
                    .call("start_download", json!({ "url": url }))
                    .await;
                if let Err(err) = &result {
                    shell_error!("start_download failed: {}", err);
                }
                self.send(Msg::StartDownloadIssued(
                    result.map(|_| ()).map_err(|err| err.to_string()),
                ));
            }
            Effect::PublishTestEvent { url } => {
                self.caps
                    .bus
                    .publish(Topic::TestEvent.name(), json!({ "url": url }));
            }
            Effect::Call(call) => {
                let command = call.command();
                let result = self.caps.host.call(command, call_args(&call)).await;
                if let Err(err) = &result {
                    shell_warn!("Host command {} failed: {}", command, err);
                }
                self.send(Msg::HostCallCompleted {
                    command,
                    result: result
                        .map(|value| payload_text(&value))
                        .map_err(|err| err.to_string()),
                });
            }
            Effect::Prompt(request) => {
                let answer = self.caps.prompts.prompt(&request).await;
                shell_debug!("Prompt {} answered {:?}", request.label(), answer);
                self.send(Msg::PromptAnswered(answer));
            }
        }
    }

    fn forwarder(&self, topic: Topic) -> TopicHandler {
        let tx = self.msg_tx.clone();
        Arc::new(move |_name: &str, payload: Value| {
            let _ = tx.send(Msg::TopicEvent {
                topic,
                payload: payload_text(&payload),
            });
        })
    }

    fn send(&self, msg: Msg) {
        let _ = self.msg_tx.send(msg);
    }
}

/// Maps the host's login answer onto the three outcomes the session knows.
pub fn classify_login(result: Result<Value, CommandError>) -> LoginOutcome {
    match result {
        Ok(Value::Bool(true)) => LoginOutcome::Accepted,
        Ok(Value::Bool(false)) => LoginOutcome::CredentialsRejected,
        Ok(other) => LoginOutcome::Failed(format!("unexpected login reply: {other}")),
        Err(CommandError::Failed(reason)) if reason == CREDENTIALS_REJECTED_TEXT => {
            LoginOutcome::CredentialsRejected
        }
        Err(err) => LoginOutcome::Failed(err.to_string()),
    }
}

fn call_args(call: &HostCall) -> Value {
    match call {
        HostCall::Greet { name } => json!({ "name": name }),
        HostCall::GetCounter | HostCall::IncrementCounter => json!({}),
        HostCall::SetUsername { username } => json!({ "username": username }),
    }
}
