// crates/client/src/history.rs

/// The page URL's query string.
pub trait History {
    /// Current query string, without the leading `?`.
    fn search(&self) -> String;

    /// Record a new entry with the given query string.
    fn push(&mut self, search: &str);
}

/// History kept in memory; every push is one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryHistory {
    entries: Vec<String>,
}

impl MemoryHistory {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![initial.trim_start_matches('?').to_owned()],
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Entries added after the initial one.
    pub fn pushes(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }
}

impl History for MemoryHistory {
    fn search(&self) -> String {
        self.entries.last().cloned().unwrap_or_default()
    }

    fn push(&mut self, search: &str) {
        self.entries.push(search.trim_start_matches('?').to_owned());
    }
}
