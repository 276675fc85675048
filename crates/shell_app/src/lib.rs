//! Shell app: coordinator, effect execution and the terminal front end.
pub mod platform;

pub use platform::commands::{parse_command, prompt_preset, Command, ParseError, HELP};
pub use platform::config::{AppConfig, ConfigError, HostConfig, CONFIG_FILENAME};
pub use platform::coordinator::Coordinator;
pub use platform::effects::{classify_login, EffectRunner};
pub use platform::logging::LogDestination;
pub use platform::prompts::{interpret_answer, SharedLines, TerminalPrompts};
pub use platform::render::render;
pub use platform::theme::ThemeCoordinator;
