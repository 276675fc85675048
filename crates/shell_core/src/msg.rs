use crate::{HostCall, InitialTheme, LoginAttemptId, LoginOutcome, PromptAnswer, PromptRequest};
use crate::{StreamEvent, Topic};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The UI surface was mounted.
    Activated,
    /// The UI surface was unmounted.
    Deactivated,
    /// Result of reading (and possibly seeding) the persisted theme.
    ThemeInitialized(Result<InitialTheme, String>),
    /// User picked a theme.
    ThemeSelected(String),
    ThemePersisted {
        name: String,
        result: Result<(), String>,
    },
    UsernameEdited(String),
    PasswordEdited(String),
    LoginClicked,
    LoginResolved {
        attempt: LoginAttemptId,
        outcome: LoginOutcome,
    },
    LogoutClicked,
    /// User asked for a streamed download.
    StreamDownloadClicked {
        url: String,
    },
    /// One lifecycle event of the streamed download, in host order.
    DownloadEvent(StreamEvent),
    /// Completion of the streamed download call itself.
    StreamDownloadCompleted(Result<(), String>),
    /// User asked for a fire-and-forget download reported over topics.
    StartDownloadClicked {
        url: String,
    },
    StartDownloadIssued(Result<(), String>),
    SendTestEventClicked,
    HostCallClicked(HostCall),
    HostCallCompleted {
        command: &'static str,
        result: Result<String, String>,
    },
    /// Payload received on a subscribed topic.
    TopicEvent {
        topic: Topic,
        payload: String,
    },
    SubscriptionFailed {
        topic: Topic,
        reason: String,
    },
    PromptRequested(PromptRequest),
    PromptAnswered(PromptAnswer),
    /// Fallback for unrecognized input.
    NoOp,
}
