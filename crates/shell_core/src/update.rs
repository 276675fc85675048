use crate::{AppState, Effect, Msg, StatusMessage, StreamEvent, Topic};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Activated => {
            if !state.activate() {
                return (state, Vec::new());
            }
            let mut effects = Vec::with_capacity(2);
            if state.claim_theme_initialization() {
                effects.push(Effect::InitializeTheme);
            }
            effects.push(Effect::Subscribe {
                topics: Topic::ALL.to_vec(),
            });
            effects
        }
        Msg::Deactivated => {
            if state.deactivate() {
                vec![Effect::Unsubscribe]
            } else {
                Vec::new()
            }
        }
        Msg::ThemeInitialized(result) => {
            match result {
                Ok(initial) => state.apply_theme(initial.name()),
                // The in-memory theme stays whatever was applied before.
                Err(_) => state.post(StatusMessage::error("failed to initialize settings")),
            }
            Vec::new()
        }
        Msg::ThemeSelected(name) => {
            let name = name.trim();
            if name.is_empty() {
                return (state, Vec::new());
            }
            state.apply_theme(name);
            vec![Effect::PersistTheme {
                name: name.to_string(),
            }]
        }
        Msg::ThemePersisted { name, result } => {
            // A failed save never reverts the applied theme.
            let status = match result {
                Ok(()) => StatusMessage::success(format!("theme switched to {name}")),
                Err(_) => StatusMessage::error("failed to switch theme"),
            };
            state.post(status);
            Vec::new()
        }
        Msg::UsernameEdited(username) => {
            if state.session_mut().edit_username(username) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PasswordEdited(password) => {
            if state.session_mut().edit_password(password) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::LoginClicked => match state.session_mut().begin_login() {
            Some(request) => {
                state.mark_dirty();
                vec![Effect::Login {
                    attempt: request.attempt,
                    username: request.username,
                    password: request.password,
                }]
            }
            None => Vec::new(),
        },
        Msg::LoginResolved { attempt, outcome } => {
            if let Some(status) = state.session_mut().resolve_login(attempt, outcome) {
                state.post(status);
            }
            Vec::new()
        }
        Msg::LogoutClicked => {
            let status = state.session_mut().logout();
            state.post(status);
            Vec::new()
        }
        Msg::StreamDownloadClicked { url } => match validate_url(&url) {
            Ok(url) => {
                if state.begin_stream(&url) {
                    vec![Effect::StreamDownload { url }]
                } else {
                    Vec::new()
                }
            }
            Err(status) => {
                state.post(status);
                Vec::new()
            }
        },
        Msg::DownloadEvent(event) => {
            state.apply_stream_event(&event);
            state.post(describe_stream_event(&event));
            Vec::new()
        }
        Msg::StreamDownloadCompleted(result) => {
            state.end_stream();
            if let Err(reason) = result {
                state.post(StatusMessage::error(format!(
                    "download command failed: {reason}"
                )));
            }
            Vec::new()
        }
        Msg::StartDownloadClicked { url } => match validate_url(&url) {
            Ok(url) => vec![Effect::StartDownload { url }],
            Err(status) => {
                state.post(status);
                Vec::new()
            }
        },
        Msg::StartDownloadIssued(result) => {
            let status = match result {
                Ok(()) => StatusMessage::success("download task started"),
                Err(_) => StatusMessage::error("failed to start download"),
            };
            state.post(status);
            Vec::new()
        }
        Msg::SendTestEventClicked => {
            state.post(StatusMessage::success("test event sent"));
            vec![Effect::PublishTestEvent {
                url: TEST_EVENT_URL.to_string(),
            }]
        }
        Msg::HostCallClicked(call) => vec![Effect::Call(call)],
        Msg::HostCallCompleted { command, result } => {
            let status = match result {
                Ok(text) => StatusMessage::success(format!("{command}: {text}")),
                Err(reason) => StatusMessage::error(format!("{command} failed: {reason}")),
            };
            state.post(status);
            Vec::new()
        }
        Msg::TopicEvent { topic, payload } => {
            state.post(StatusMessage::success(topic.describe(&payload)));
            Vec::new()
        }
        Msg::SubscriptionFailed { topic, reason } => {
            state.post(StatusMessage::error(format!(
                "failed to listen to {}: {reason}",
                topic.name()
            )));
            Vec::new()
        }
        Msg::PromptRequested(request) => vec![Effect::Prompt(request)],
        Msg::PromptAnswered(answer) => {
            state.record_prompt_answer(answer);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

const TEST_EVENT_URL: &str = "https://a.com/file";

fn validate_url(raw: &str) -> Result<String, StatusMessage> {
    let trimmed = raw.trim();
    url::Url::parse(trimmed)
        .map(|_| trimmed.to_string())
        .map_err(|err| StatusMessage::error(format!("invalid download url: {err}")))
}

fn describe_stream_event(event: &StreamEvent) -> StatusMessage {
    let text = match event {
        StreamEvent::Started { url, total } => format!("download started: {url} ({total} bytes)"),
        StreamEvent::Progress { received } => format!("download progress: {received} bytes"),
        StreamEvent::Finished => "download finished".to_string(),
    };
    StatusMessage::success(text)
}
