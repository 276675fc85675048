use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use shell_core::Msg;
use shell_engine::{Capabilities, DetachedPrompts, PromptProvider};
use shell_logging::{shell_info, shell_warn};
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

use super::logging;
use crate::{
    parse_command, render, AppConfig, Command, Coordinator, ParseError, SharedLines,
    TerminalPrompts, CONFIG_FILENAME, HELP,
};

type StdinLines = SharedLines<BufReader<Stdin>>;

pub async fn run_app() -> anyhow::Result<()> {
    let (config, config_error) = AppConfig::load_or_default(Path::new(CONFIG_FILENAME));
    logging::initialize(config.log_destination, config.level(), Path::new("."));
    match config_error {
        Some(err) => shell_warn!("{}; using defaults", err),
        None => shell_info!("Starting shell_app detached={}", config.detached),
    }

    let lines: StdinLines = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    let caps = capabilities(&config, lines.clone()).await;
    let mut coordinator = Coordinator::new(caps, &config);

    coordinator.dispatch(Msg::Activated).await;
    println!("{HELP}");
    print_view(&mut coordinator);

    loop {
        tokio::select! {
            line = next_line(&lines) => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::Dispatch(msg)) => coordinator.dispatch(msg).await,
                    Err(ParseError::Empty) => {}
                    Err(err) => println!("{err}"),
                }
            }
            Some(msg) = coordinator.next_message() => {
                coordinator.dispatch(msg).await;
                // A burst of topic events renders once.
                coordinator.process_pending().await;
            }
        }
        print_view(&mut coordinator);
    }

    coordinator.dispatch(Msg::Deactivated).await;
    shell_info!("Shutting down");
    Ok(())
}

async fn capabilities(config: &AppConfig, lines: StdinLines) -> Capabilities {
    let prompts: Arc<dyn PromptProvider> = if config.interactive_prompts {
        Arc::new(TerminalPrompts::new(lines))
    } else {
        Arc::new(DetachedPrompts)
    };

    if config.detached {
        return Capabilities {
            prompts,
            ..Capabilities::detached()
        };
    }
    Capabilities::in_process(config.store_dir(), config.host_settings(), prompts).await
}

async fn next_line(lines: &StdinLines) -> std::io::Result<Option<String>> {
    lines.lock().await.next_line().await
}

fn print_view(coordinator: &mut Coordinator) {
    if coordinator.consume_dirty() {
        for line in render(&coordinator.view(), Utc::now()) {
            println!("{line}");
        }
    }
}
