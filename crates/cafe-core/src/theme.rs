use serde::{Deserialize, Serialize};

use crate::storage::Storage;

/// Storage key holding `"true"` when the dark theme is selected.
pub const THEME_KEY: &str = "darkTheme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Persisted theme preference. Anything other than a stored `"true"` is light.
pub struct ThemeStore<S> {
    storage: S,
    current: Theme,
}

impl<S: Storage> ThemeStore<S> {
    pub fn open(storage: S) -> Self {
        let current = match storage.get(THEME_KEY) {
            Ok(Some(raw)) if raw.trim() == "true" => Theme::Dark,
            Ok(_) => Theme::Light,
            Err(e) => {
                tracing::warn!(error = %e, "theme preference could not be read; using light");
                Theme::Light
            }
        };
        Self { storage, current }
    }

    #[must_use]
    pub fn current(&self) -> Theme {
        self.current
    }

    /// Switches theme and persists the choice, returning the new theme.
    pub fn toggle(&mut self) -> Theme {
        self.current = self.current.toggled();
        let flag = if self.current == Theme::Dark {
            "true"
        } else {
            "false"
        };
        if let Err(e) = self.storage.set(THEME_KEY, flag) {
            tracing::error!(error = %e, "failed to persist theme preference");
        }
        self.current
    }
}
