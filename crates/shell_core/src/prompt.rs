use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

/// A native prompt the app should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRequest {
    AskYesNo {
        title: String,
        message: String,
        kind: PromptKind,
    },
    ConfirmOkCancel {
        title: String,
        message: String,
        kind: PromptKind,
    },
    ShowMessage {
        title: String,
        message: String,
        kind: PromptKind,
    },
    PickOpenPath {
        directory: bool,
    },
    PickSavePath {
        filters: Vec<FileFilter>,
    },
}

impl PromptRequest {
    pub fn label(&self) -> &'static str {
        match self {
            PromptRequest::AskYesNo { .. } => "ask",
            PromptRequest::ConfirmOkCancel { .. } => "confirm",
            PromptRequest::ShowMessage { .. } => "message",
            PromptRequest::PickOpenPath { .. } => "open",
            PromptRequest::PickSavePath { .. } => "save",
        }
    }
}

/// What the user answered. Dismissing a prompt is `Cancelled`, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAnswer {
    Confirmed(bool),
    Acknowledged,
    Path(PathBuf),
    Cancelled,
}
