use std::fmt;

/// How many entries the sidebar shows. The full log is retained.
pub const VISIBLE_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub lhs: String,
    pub operator: &'static str,
    pub rhs: String,
    pub result: String,
}

impl HistoryEntry {
    pub fn expression(&self) -> String {
        format!("{} {} {}", self.lhs, self.operator, self.rhs)
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {} = {}", self.lhs, self.operator, self.rhs, self.result)
    }
}

/// Append-only log of completed calculations. Consecutive duplicates
/// collapse into one entry.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, lhs: String, operator: &'static str, rhs: String, result: String) {
        let entry = HistoryEntry { lhs, operator, rhs, result };
        if self.entries.last() == Some(&entry) {
            return;
        }
        self.entries.push(entry);
    }

    /// The most recent entries, oldest first, capped to [`VISIBLE_ENTRIES`].
    pub fn recent(&self) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(VISIBLE_ENTRIES);
        &self.entries[start..]
    }

    /// Index of the first entry returned by [`recent`](History::recent)
    /// within the full log. Lets the UI delete a visible row.
    pub fn recent_offset(&self) -> usize {
        self.entries.len().saturating_sub(VISIBLE_ENTRIES)
    }

    pub fn remove(&mut self, index: usize) -> Option<HistoryEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Right-hand operand of the latest calculation, for re-editing.
    pub fn last_operand(&self) -> Option<&str> {
        self.entries.last().map(|entry| entry.rhs.as_str())
    }
}
