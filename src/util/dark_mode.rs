//! Light/dark theme preference.
//!
//! Reads the stored preference through the same key-value store as the
//! credential, falling back to the system preference when nothing valid is
//! stored. In the browser, `apply` toggles the `dark` class on `<html>`.
//!
//! TRADE-OFFS
//! ==========
//! Persistence is best-effort: the preference is cosmetic, so write failures
//! are reported but never block a toggle from taking effect on screen.

#[cfg(test)]
#[path = "dark_mode_test.rs"]
mod dark_mode_test;

use std::rc::Rc;

use super::storage::{KeyValueStore, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemePreference {
    Light,
    Dark,
}

impl ThemePreference {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark { Self::Dark } else { Self::Light }
    }
}

#[derive(Clone)]
pub struct ThemeStore {
    store: Rc<dyn KeyValueStore>,
    key: String,
}

impl ThemeStore {
    pub fn new(store: Rc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    /// Stored preference, or the system preference if none is stored.
    #[must_use]
    pub fn read(&self, system_prefers_dark: bool) -> ThemePreference {
        self.store
            .get(&self.key)
            .as_deref()
            .and_then(ThemePreference::parse)
            .unwrap_or_else(|| ThemePreference::from_system(system_prefers_dark))
    }

    /// # Errors
    ///
    /// Returns an error if the preference could not be persisted.
    pub fn write(&self, preference: ThemePreference) -> Result<(), StorageError> {
        self.store.set(&self.key, preference.as_str())
    }

    /// Flip the current preference and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the new preference could not be persisted.
    pub fn toggle(&self, system_prefers_dark: bool) -> Result<ThemePreference, StorageError> {
        let next = self.read(system_prefers_dark).toggled();
        apply(next);
        self.write(next)?;
        Ok(next)
    }
}

/// Whether the browser reports a dark color-scheme preference.
#[must_use]
pub fn system_prefers_dark() -> bool {
    #[cfg(feature = "hydrate")]
    {
        web_sys::window()
            .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
            .map_or(false, |mq| mq.matches())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        false
    }
}

/// Toggle the `dark` class on the `<html>` element.
pub fn apply(preference: ThemePreference) {
    #[cfg(feature = "hydrate")]
    {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|doc| doc.document_element())
        {
            let _ = el
                .class_list()
                .toggle_with_force("dark", preference == ThemePreference::Dark);
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = preference;
    }
}
