//! Terminal platform: configuration, logging, effect execution and the REPL.
mod app;
pub mod commands;
pub mod config;
pub mod coordinator;
pub mod effects;
pub mod logging;
pub mod prompts;
pub mod render;
pub mod theme;

pub use app::run_app;
