use shell_core::{FileFilter, HostCall, Msg, PromptKind, PromptRequest};
use thiserror::Error;

const DEFAULT_STREAM_URL: &str = "https://example.com";
const DEFAULT_DOWNLOAD_URL: &str = "https://a.com/file";
const PROMPT_TITLE: &str = "Shell";

pub const HELP: &str = "\
commands:
  theme <name>        switch theme (light, dark, blue, ...)
  user <name>         edit the username field
  pass <password>     edit the password field
  login | logout
  stream [url]        streamed download with progress events
  download [url]      background download reported over topics
  emit                publish a test event
  greet [name] | counter | incr | rename <name>
  ask | confirm | message | open | save
  activate | deactivate
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Msg),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown command: {0} (try help)")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
}

pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let msg = match word {
        "" => return Err(ParseError::Empty),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        "theme" => Msg::ThemeSelected(required("theme", rest)?.to_string()),
        "user" => Msg::UsernameEdited(rest.to_string()),
        "pass" => Msg::PasswordEdited(rest.to_string()),
        "login" => Msg::LoginClicked,
        "logout" => Msg::LogoutClicked,
        "stream" => Msg::StreamDownloadClicked {
            url: or_default(rest, DEFAULT_STREAM_URL),
        },
        "download" => Msg::StartDownloadClicked {
            url: or_default(rest, DEFAULT_DOWNLOAD_URL),
        },
        "emit" => Msg::SendTestEventClicked,
        "greet" => Msg::HostCallClicked(HostCall::Greet {
            name: or_default(rest, "World"),
        }),
        "counter" => Msg::HostCallClicked(HostCall::GetCounter),
        "incr" => Msg::HostCallClicked(HostCall::IncrementCounter),
        "rename" => Msg::HostCallClicked(HostCall::SetUsername {
            username: required("rename", rest)?.to_string(),
        }),
        "ask" | "confirm" | "message" | "open" | "save" => match prompt_preset(word) {
            Some(request) => Msg::PromptRequested(request),
            None => return Err(ParseError::Unknown(word.to_string())),
        },
        "activate" => Msg::Activated,
        "deactivate" => Msg::Deactivated,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Command::Dispatch(msg))
}

/// The canned prompt behind each prompt command.
pub fn prompt_preset(name: &str) -> Option<PromptRequest> {
    let warning = "This action cannot be reverted. Are you sure?".to_string();
    Some(match name {
        "ask" => PromptRequest::AskYesNo {
            title: PROMPT_TITLE.to_string(),
            message: warning,
            kind: PromptKind::Warning,
        },
        "confirm" => PromptRequest::ConfirmOkCancel {
            title: PROMPT_TITLE.to_string(),
            message: warning,
            kind: PromptKind::Warning,
        },
        "message" => PromptRequest::ShowMessage {
            title: PROMPT_TITLE.to_string(),
            message: "File not found".to_string(),
            kind: PromptKind::Error,
        },
        "open" => PromptRequest::PickOpenPath { directory: false },
        "save" => PromptRequest::PickSavePath {
            filters: vec![FileFilter {
                name: "My Filter".to_string(),
                extensions: vec!["png".to_string(), "jpeg".to_string()],
            }],
        },
        _ => return None,
    })
}

fn required<'a>(command: &'static str, rest: &'a str) -> Result<&'a str, ParseError> {
    if rest.is_empty() {
        Err(ParseError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

fn or_default(rest: &str, default: &str) -> String {
    if rest.is_empty() {
        default.to_string()
    } else {
        rest.to_string()
    }
}
