#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Latest user-visible outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

/// Last-write-wins status slot. `posted` counts every message ever posted so
/// callers can tell two identical messages apart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusBoard {
    latest: Option<StatusMessage>,
    posted: u64,
}

impl StatusBoard {
    pub fn post(&mut self, message: StatusMessage) {
        self.latest = Some(message);
        self.posted += 1;
    }

    pub fn latest(&self) -> Option<&StatusMessage> {
        self.latest.as_ref()
    }

    pub fn posted(&self) -> u64 {
        self.posted
    }
}
