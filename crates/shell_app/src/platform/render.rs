use chrono::{DateTime, Utc};
use shell_core::{AppViewModel, PromptAnswer, Session, StatusKind, BUILTIN_THEMES};

/// Renders the view model as terminal lines, status stamped with `now`.
pub fn render(view: &AppViewModel, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![theme_line(&view.theme)];

    match &view.session {
        Session::Authenticated { username } => {
            lines.push(format!("signed in as {username} (logout to leave)"));
        }
        Session::Anonymous => {
            let mut form = format!(
                "username: {}  password: {}",
                view.username_field,
                "*".repeat(view.password_field_len)
            );
            if view.login_pending {
                form.push_str("  (signing in)");
            }
            lines.push(form);
        }
    }

    if let Some(download) = &view.download {
        let total = download
            .total
            .map(|total| total.to_string())
            .unwrap_or_else(|| "?".to_string());
        let state = if download.finished { "done" } else { "running" };
        lines.push(format!(
            "download {}: {}/{} bytes [{}]",
            download.url, download.received, total, state
        ));
    }

    if let Some(answer) = &view.last_prompt_answer {
        lines.push(format!("last answer: {}", describe_answer(answer)));
    }

    if let Some(status) = &view.status {
        let label = match status.kind {
            StatusKind::Success => "ok",
            StatusKind::Error => "error",
        };
        lines.push(format!(
            "[{}] {}: {}",
            now.format("%H:%M:%S"),
            label,
            status.text
        ));
    }

    if !view.active {
        lines.push("(inactive)".to_string());
    }
    lines
}

fn theme_line(current: &str) -> String {
    let mut choices: Vec<String> = BUILTIN_THEMES
        .iter()
        .map(|theme| {
            if *theme == current {
                format!("[*{theme}*]")
            } else {
                format!("[{theme}]")
            }
        })
        .collect();
    if !BUILTIN_THEMES.contains(&current) {
        choices.push(format!("[*{current}*]"));
    }
    format!("theme: {}", choices.join(" "))
}

fn describe_answer(answer: &PromptAnswer) -> String {
    match answer {
        PromptAnswer::Confirmed(true) => "yes".to_string(),
        PromptAnswer::Confirmed(false) => "no".to_string(),
        PromptAnswer::Acknowledged => "acknowledged".to_string(),
        PromptAnswer::Path(path) => path.display().to_string(),
        PromptAnswer::Cancelled => "cancelled".to_string(),
    }
}
