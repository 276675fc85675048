//! Logger setup for the shell binary.
//!
//! Terminal output goes to stderr so it never interleaves with the rendered
//! view on stdout.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

pub const LOG_FILE: &str = "shell.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogDestination {
    /// `shell.log` in the log directory.
    #[default]
    File,
    Terminal,
    Both,
}

impl LogDestination {
    fn wants_file(self) -> bool {
        matches!(self, LogDestination::File | LogDestination::Both)
    }

    fn wants_terminal(self) -> bool {
        matches!(self, LogDestination::Terminal | LogDestination::Both)
    }
}

/// Installs the global logger. Returns the log file path when one is written.
pub fn initialize(destination: LogDestination, level: LevelFilter, dir: &Path) -> Option<PathBuf> {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if destination.wants_terminal() {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }

    let mut file_path = None;
    if destination.wants_file() {
        let path = dir.join(LOG_FILE);
        match File::create(&path) {
            Ok(file) => {
                loggers.push(WriteLogger::new(level, config, file));
                file_path = Some(path);
            }
            Err(err) => eprintln!("Warning: could not create log file {}: {}", path.display(), err),
        }
    }

    if loggers.is_empty() || CombinedLogger::init(loggers).is_err() {
        return None;
    }
    file_path
}
