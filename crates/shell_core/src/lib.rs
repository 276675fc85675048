//! Shell core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod prompt;
mod session;
mod state;
mod status;
mod stream;
mod theme;
mod topic;
mod update;
mod view_model;

pub use effect::{Effect, HostCall};
pub use msg::Msg;
pub use prompt::{FileFilter, PromptAnswer, PromptKind, PromptRequest};
pub use session::{
    CredentialForm, LoginAttemptId, LoginOutcome, LoginRequest, Session, SessionMachine,
    CREDENTIALS_REJECTED_TEXT,
};
pub use state::AppState;
pub use status::{StatusBoard, StatusKind, StatusMessage};
pub use stream::{SequenceViolation, StreamEvent, StreamSequence};
pub use theme::{InitialTheme, Presentation, BUILTIN_THEMES, DEFAULT_THEME, THEME_PREFERENCE_KEY};
pub use topic::Topic;
pub use update::update;
pub use view_model::{AppViewModel, DownloadView};
