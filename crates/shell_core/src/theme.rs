/// Store key holding the persisted theme name.
pub const THEME_PREFERENCE_KEY: &str = "currentTheme";

pub const DEFAULT_THEME: &str = "light";

pub const BUILTIN_THEMES: [&str; 3] = ["light", "dark", "blue"];

/// Where the theme applied during initialization came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialTheme {
    /// A non-empty value was already persisted; the store was left untouched.
    Stored(String),
    /// Nothing usable was persisted; the default was applied and written back.
    Defaulted(String),
}

impl InitialTheme {
    pub fn name(&self) -> &str {
        match self {
            InitialTheme::Stored(name) | InitialTheme::Defaulted(name) => name,
        }
    }
}

/// Global presentation state. Only the update function writes to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    theme: String,
}

impl Presentation {
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
        }
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub(crate) fn apply(&mut self, theme: &str) {
        self.theme = theme.to_string();
    }
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}
