//! Theme context: resolves, applies and persists the display mode

use std::collections::BTreeSet;

use super::{ThemeError, ThemeMode, ThemeStorage, THEME_KEY};

/// Class set on the root element while dark mode is active
pub const DARK_CLASS: &str = "dark";

/// Read-only query for the platform's dark-mode preference
pub trait SystemPreference {
    fn prefers_dark(&self) -> bool;
}

impl SystemPreference for bool {
    fn prefers_dark(&self) -> bool {
        *self
    }
}

impl<F: Fn() -> bool> SystemPreference for F {
    fn prefers_dark(&self) -> bool {
        self()
    }
}

/// Document-level styling hook the mode is applied to
pub trait DocumentStyle {
    fn apply(&mut self, mode: ThemeMode);
}

/// Class list of the document root element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootClassList {
    classes: BTreeSet<String>,
}

impl RootClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// Space-separated `class` attribute value
    pub fn to_attr(&self) -> String {
        self.classes.iter().cloned().collect::<Vec<_>>().join(" ")
    }
}

impl DocumentStyle for RootClassList {
    fn apply(&mut self, mode: ThemeMode) {
        if mode.is_dark() {
            self.classes.insert(DARK_CLASS.to_string());
        } else {
            self.classes.remove(DARK_CLASS);
        }
    }
}

/// Owns the current mode together with its storage and document hook.
///
/// The mode is resolved once in [`ThemeProvider::mount`]; afterwards it only
/// changes through [`toggle`](ThemeProvider::toggle) or
/// [`set`](ThemeProvider::set), and every change is applied to the document
/// and written to storage.
#[derive(Debug)]
pub struct ThemeProvider<S, D> {
    mode: ThemeMode,
    storage: S,
    document: D,
}

impl<S: ThemeStorage, D: DocumentStyle> ThemeProvider<S, D> {
    /// Resolve the initial mode: stored value first, then system preference
    pub fn mount<P>(storage: S, preference: &P, document: D) -> Result<Self, ThemeError>
    where
        P: SystemPreference + ?Sized,
    {
        let mode = match initial_mode(&storage)? {
            Some(mode) => mode,
            None if preference.prefers_dark() => ThemeMode::Dark,
            None => ThemeMode::Light,
        };
        tracing::debug!("Theme mounted in {} mode", mode);

        let mut provider = Self {
            mode,
            storage,
            document,
        };
        provider.commit()?;
        Ok(provider)
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Flip between light and dark
    pub fn toggle(&mut self) -> Result<ThemeMode, ThemeError> {
        self.set(self.mode.toggled())
    }

    /// Switch to an explicit mode
    pub fn set(&mut self, mode: ThemeMode) -> Result<ThemeMode, ThemeError> {
        self.mode = mode;
        self.commit()?;
        Ok(self.mode)
    }

    pub fn into_parts(self) -> (ThemeMode, S, D) {
        (self.mode, self.storage, self.document)
    }

    fn commit(&mut self) -> Result<(), ThemeError> {
        self.document.apply(self.mode);
        self.storage.set(THEME_KEY, self.mode.as_str())
    }
}

/// Stored mode, ignoring values that are not a known mode
fn initial_mode<S: ThemeStorage>(storage: &S) -> Result<Option<ThemeMode>, ThemeError> {
    let Some(stored) = storage.get(THEME_KEY)? else {
        return Ok(None);
    };
    match stored.parse::<ThemeMode>() {
        Ok(mode) => Ok(Some(mode)),
        Err(e) => {
            tracing::warn!("Ignoring stored theme: {}", e);
            Ok(None)
        }
    }
}
