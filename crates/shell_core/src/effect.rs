use crate::{LoginAttemptId, PromptRequest, Topic};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    InitializeTheme,
    PersistTheme {
        name: String,
    },
    Subscribe {
        topics: Vec<Topic>,
    },
    Unsubscribe,
    Login {
        attempt: LoginAttemptId,
        username: String,
        password: String,
    },
    StreamDownload {
        url: String,
    },
    StartDownload {
        url: String,
    },
    PublishTestEvent {
        url: String,
    },
    Call(HostCall),
    Prompt(PromptRequest),
}

/// Plain request/response host commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Greet { name: String },
    GetCounter,
    IncrementCounter,
    SetUsername { username: String },
}

impl HostCall {
    pub fn command(&self) -> &'static str {
        match self {
            HostCall::Greet { .. } => "greet",
            HostCall::GetCounter => "get_counter",
            HostCall::IncrementCounter => "increment_counter",
            HostCall::SetUsername { .. } => "set_username",
        }
    }
}
