//! Current-URL access for state synchronization.
//!
//! Only the query (`search`) part is read or written. Writes replace the
//! current history entry, so state changes never pile up behind the back button.

use std::sync::Mutex;

pub trait Location {
    /// Current query string without the leading `?` (may be empty).
    fn search(&self) -> String;

    /// Replace the query string, keeping the pathname. No new history entry.
    fn replace_search(&self, search: &str);
}

/// In-process location for native builds and tests.
#[derive(Debug)]
pub struct MemoryLocation {
    pathname: String,
    search: Mutex<String>,
}

impl MemoryLocation {
    pub fn new(pathname: &str) -> Self {
        Self {
            pathname: pathname.to_string(),
            search: Mutex::new(String::new()),
        }
    }

    pub fn with_search(pathname: &str, search: &str) -> Self {
        let loc = Self::new(pathname);
        loc.replace_search(search);
        loc
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// `pathname?search` (or just the pathname when there is no query).
    pub fn href(&self) -> String {
        let search = self.search();
        if search.is_empty() {
            self.pathname.clone()
        } else {
            format!("{}?{}", self.pathname, search)
        }
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Location for MemoryLocation {
    fn search(&self) -> String {
        self.search.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn replace_search(&self, search: &str) {
        if let Ok(mut s) = self.search.lock() {
            *s = search.trim_start_matches('?').to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn href_keeps_pathname() {
        let loc = MemoryLocation::new("/staking/list");
        assert_eq!(loc.href(), "/staking/list");
        loc.replace_search("?sortBy=x");
        assert_eq!(loc.search(), "sortBy=x");
        assert_eq!(loc.href(), "/staking/list?sortBy=x");
    }
}
