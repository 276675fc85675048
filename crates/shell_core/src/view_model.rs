use crate::{PromptAnswer, Session, StatusMessage};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownloadView {
    pub url: String,
    pub total: Option<u64>,
    pub received: u64,
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub theme: String,
    pub active: bool,
    pub session: Session,
    pub username_field: String,
    pub password_field_len: usize,
    pub login_pending: bool,
    pub status: Option<StatusMessage>,
    pub status_posted: u64,
    pub download: Option<DownloadView>,
    pub stream_in_flight: bool,
    pub last_prompt_answer: Option<PromptAnswer>,
    pub dirty: bool,
}
