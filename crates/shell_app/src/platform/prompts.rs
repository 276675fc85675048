use std::path::PathBuf;
use std::sync::Arc;

use shell_core::{PromptAnswer, PromptKind, PromptRequest};
use shell_engine::PromptProvider;
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::Mutex;

/// Line source shared between the command loop and the prompts.
pub type SharedLines<R> = Arc<Mutex<Lines<R>>>;

/// Asks native prompts on the terminal, one input line per answer.
pub struct TerminalPrompts<R> {
    lines: SharedLines<R>,
}

impl<R> TerminalPrompts<R> {
    pub fn new(lines: SharedLines<R>) -> Self {
        Self { lines }
    }
}

#[async_trait::async_trait]
impl<R> PromptProvider for TerminalPrompts<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn prompt(&self, request: &PromptRequest) -> PromptAnswer {
        println!("{}", question(request));
        let line = self.lines.lock().await.next_line().await.ok().flatten();
        interpret_answer(request, line.as_deref())
    }
}

/// Reads one typed line as the answer to `request`. End of input cancels.
pub fn interpret_answer(request: &PromptRequest, line: Option<&str>) -> PromptAnswer {
    let Some(line) = line.map(str::trim) else {
        return PromptAnswer::Cancelled;
    };
    match request {
        PromptRequest::AskYesNo { .. } => match line.to_ascii_lowercase().as_str() {
            "y" | "yes" => PromptAnswer::Confirmed(true),
            "n" | "no" => PromptAnswer::Confirmed(false),
            _ => PromptAnswer::Cancelled,
        },
        PromptRequest::ConfirmOkCancel { .. } => match line.to_ascii_lowercase().as_str() {
            "ok" | "y" | "yes" => PromptAnswer::Confirmed(true),
            "cancel" | "n" | "no" => PromptAnswer::Confirmed(false),
            _ => PromptAnswer::Cancelled,
        },
        PromptRequest::ShowMessage { .. } => PromptAnswer::Acknowledged,
        PromptRequest::PickOpenPath { .. } | PromptRequest::PickSavePath { .. } => {
            if line.is_empty() {
                PromptAnswer::Cancelled
            } else {
                PromptAnswer::Path(PathBuf::from(line))
            }
        }
    }
}

fn question(request: &PromptRequest) -> String {
    match request {
        PromptRequest::AskYesNo {
            title,
            message,
            kind,
        } => format!("{} {}: {} [y/n]", marker(*kind), title, message),
        PromptRequest::ConfirmOkCancel {
            title,
            message,
            kind,
        } => format!("{} {}: {} [ok/cancel]", marker(*kind), title, message),
        PromptRequest::ShowMessage {
            title,
            message,
            kind,
        } => format!("{} {}: {} [enter]", marker(*kind), title, message),
        PromptRequest::PickOpenPath { directory: true } => {
            "directory to open (empty cancels):".to_string()
        }
        PromptRequest::PickOpenPath { directory: false } => {
            "file to open (empty cancels):".to_string()
        }
        PromptRequest::PickSavePath { filters } => {
            let filters = filters
                .iter()
                .map(|filter| format!("{} ({})", filter.name, filter.extensions.join(", ")))
                .collect::<Vec<_>>()
                .join("; ");
            format!("save as [{filters}] (empty cancels):")
        }
    }
}

fn marker(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::Info => "[info]",
        PromptKind::Warning => "[warning]",
        PromptKind::Error => "[error]",
    }
}
