use crate::view_model::{AppViewModel, DownloadView};
use crate::{Presentation, PromptAnswer, SessionMachine, StatusBoard, StatusMessage, StreamEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    presentation: Presentation,
    theme_initialized: bool,
    active: bool,
    session: SessionMachine,
    status: StatusBoard,
    download: Option<DownloadView>,
    stream_in_flight: bool,
    last_prompt_answer: Option<PromptAnswer>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_default_theme(crate::DEFAULT_THEME)
    }

    /// State whose in-memory theme (and first-run persisted value) is `theme`.
    pub fn with_default_theme(theme: &str) -> Self {
        Self {
            presentation: Presentation::new(theme),
            theme_initialized: false,
            active: false,
            session: SessionMachine::default(),
            status: StatusBoard::default(),
            download: None,
            stream_in_flight: false,
            last_prompt_answer: None,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            theme: self.presentation.theme().to_string(),
            active: self.active,
            session: self.session.session().clone(),
            username_field: self.session.form().username.clone(),
            password_field_len: self.session.form().password.chars().count(),
            login_pending: self.session.is_login_pending(),
            status: self.status.latest().cloned(),
            status_posted: self.status.posted(),
            download: self.download.clone(),
            stream_in_flight: self.stream_in_flight,
            last_prompt_answer: self.last_prompt_answer.clone(),
            dirty: self.dirty,
        }
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn session(&self) -> &SessionMachine {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut SessionMachine {
        &mut self.session
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn post(&mut self, message: StatusMessage) {
        self.status.post(message);
        self.dirty = true;
    }

    pub(crate) fn apply_theme(&mut self, theme: &str) {
        self.presentation.apply(theme);
        self.dirty = true;
    }

    /// Flips to active. Returns false if already active.
    pub(crate) fn activate(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.dirty = true;
        true
    }

    pub(crate) fn deactivate(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.dirty = true;
        true
    }

    /// Claims the once-per-process theme initialization.
    pub(crate) fn claim_theme_initialization(&mut self) -> bool {
        !std::mem::replace(&mut self.theme_initialized, true)
    }

    pub(crate) fn begin_stream(&mut self, url: &str) -> bool {
        if self.stream_in_flight {
            return false;
        }
        self.stream_in_flight = true;
        self.download = Some(DownloadView {
            url: url.to_string(),
            total: None,
            received: 0,
            finished: false,
        });
        self.dirty = true;
        true
    }

    pub(crate) fn end_stream(&mut self) {
        self.stream_in_flight = false;
        self.dirty = true;
    }

    pub(crate) fn apply_stream_event(&mut self, event: &StreamEvent) {
        let download = self.download.get_or_insert_with(DownloadView::default);
        match event {
            StreamEvent::Started { url, total } => {
                download.url = url.clone();
                download.total = Some(*total);
                download.received = 0;
            }
            StreamEvent::Progress { received } => {
                download.received = download.received.saturating_add(*received);
            }
            StreamEvent::Finished => download.finished = true,
        }
        self.dirty = true;
    }

    pub(crate) fn record_prompt_answer(&mut self, answer: PromptAnswer) {
        self.last_prompt_answer = Some(answer);
        self.dirty = true;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
