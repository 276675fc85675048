use std::collections::VecDeque;

use shell_core::{update, AppState, AppViewModel, Msg};
use shell_engine::{Capabilities, SubscriptionManager};
use tokio::sync::mpsc;

use crate::{AppConfig, EffectRunner, ThemeCoordinator};

/// Owns the state and feeds every message through `update`.
///
/// Effects run in the order `update` returned them; the messages they produce
/// are processed before `dispatch` returns. A streamed download runs in the
/// background and reports through `next_message`, one event at a time.
pub struct Coordinator {
    state: AppState,
    runner: EffectRunner,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
}

impl Coordinator {
    pub fn new(caps: Capabilities, config: &AppConfig) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let theme = ThemeCoordinator::new(
            caps.store.clone(),
            config.store_namespace.clone(),
            config.default_theme.clone(),
        );
        Self {
            state: AppState::with_default_theme(&config.default_theme),
            runner: EffectRunner::new(caps, theme, msg_tx),
            msg_rx,
        }
    }

    pub async fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;

            for effect in effects {
                self.runner.run(effect).await;
                while let Ok(follow_up) = self.msg_rx.try_recv() {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    /// Dispatches every message background work has already queued.
    /// Returns how many were dispatched.
    pub async fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.dispatch(msg).await;
            processed += 1;
        }
        processed
    }

    /// Next message produced outside of `dispatch`, such as a topic event.
    pub async fn next_message(&mut self) -> Option<Msg> {
        self.msg_rx.recv().await
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        self.runner.subscriptions()
    }
}
