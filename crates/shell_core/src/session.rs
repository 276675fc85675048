use crate::StatusMessage;

pub type LoginAttemptId = u64;

/// Status text shown when the host refuses the supplied credentials.
pub const CREDENTIALS_REJECTED_TEXT: &str = "invalid username or password";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        username: String,
    },
}

/// Credential fields as the user sees them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CredentialForm {
    pub username: String,
    pub password: String,
}

impl CredentialForm {
    pub fn clear(&mut self) {
        self.username.clear();
        self.password.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.password.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted,
    CredentialsRejected,
    Failed(String),
}

/// A login the app must send to the host, exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub attempt: LoginAttemptId,
    pub username: String,
    pub password: String,
}

/// Anonymous/authenticated state machine.
///
/// At most one login is outstanding. Logging out abandons it: its eventual
/// result no longer matches `pending` and is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionMachine {
    session: Session,
    form: CredentialForm,
    pending: Option<LoginAttemptId>,
    next_attempt: LoginAttemptId,
}

impl SessionMachine {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn form(&self) -> &CredentialForm {
        &self.form
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.session, Session::Authenticated { .. })
    }

    pub fn is_login_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn edit_username(&mut self, username: String) -> bool {
        if self.is_authenticated() {
            return false;
        }
        self.form.username = username;
        true
    }

    pub(crate) fn edit_password(&mut self, password: String) -> bool {
        if self.is_authenticated() {
            return false;
        }
        self.form.password = password;
        true
    }

    /// Starts a login attempt, or returns `None` when already authenticated or
    /// another attempt is still outstanding.
    pub(crate) fn begin_login(&mut self) -> Option<LoginRequest> {
        if self.is_authenticated() || self.pending.is_some() {
            return None;
        }
        self.next_attempt += 1;
        let attempt = self.next_attempt;
        self.pending = Some(attempt);
        Some(LoginRequest {
            attempt,
            username: self.form.username.clone(),
            password: self.form.password.clone(),
        })
    }

    /// Applies a host answer. Stale answers (abandoned attempts) return `None`
    /// and leave the machine untouched.
    pub(crate) fn resolve_login(
        &mut self,
        attempt: LoginAttemptId,
        outcome: LoginOutcome,
    ) -> Option<StatusMessage> {
        if self.pending != Some(attempt) {
            return None;
        }
        self.pending = None;
        let status = match outcome {
            LoginOutcome::Accepted => {
                self.session = Session::Authenticated {
                    username: self.form.username.clone(),
                };
                StatusMessage::success("login succeeded")
            }
            LoginOutcome::CredentialsRejected => StatusMessage::error(CREDENTIALS_REJECTED_TEXT),
            LoginOutcome::Failed(reason) => StatusMessage::error(format!("login failed: {reason}")),
        };
        Some(status)
    }

    pub(crate) fn logout(&mut self) -> StatusMessage {
        self.session = Session::Anonymous;
        self.form.clear();
        self.pending = None;
        StatusMessage::success("logged out")
    }
}
