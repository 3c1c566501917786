//! Router surface used by the session layer.
//!
//! The real router (browser history, page components) lives outside this
//! crate; it plugs in through `Navigator`. `MemoryNavigator` keeps an
//! in-memory history for the CLI and for embedding without a browser.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

use std::cell::RefCell;
use std::fmt;

use async_trait::async_trait;

/// A named navigation target with optional query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), query: Vec::new() }
    }

    #[must_use]
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_owned(), value.to_owned()));
        self
    }

    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("navigation to {target} failed: {reason}")]
pub struct NavigationError {
    pub target: String,
    pub reason: String,
}

#[async_trait(?Send)]
pub trait Navigator {
    /// Name of the route currently shown, if any.
    fn current_route_name(&self) -> Option<String>;

    /// Replace the current history entry with `target`.
    async fn replace(&self, target: Location) -> Result<(), NavigationError>;
}

#[derive(Debug, Default)]
pub struct MemoryNavigator {
    history: RefCell<Vec<Location>>,
}

impl MemoryNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at `location` without going through `replace`.
    #[must_use]
    pub fn starting_at(location: Location) -> Self {
        Self { history: RefCell::new(vec![location]) }
    }

    #[must_use]
    pub fn current(&self) -> Option<Location> {
        self.history.borrow().last().cloned()
    }

    #[must_use]
    pub fn history(&self) -> Vec<Location> {
        self.history.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Navigator for MemoryNavigator {
    fn current_route_name(&self) -> Option<String> {
        self.history.borrow().last().map(|l| l.name.clone())
    }

    async fn replace(&self, target: Location) -> Result<(), NavigationError> {
        let mut history = self.history.borrow_mut();
        history.pop();
        history.push(target);
        Ok(())
    }
}
