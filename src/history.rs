//! Linear undo history with redo-branch truncation.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use crate::element::{Element, ElementOptions};

/// Immutable snapshot captured on every committed change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Version {
    pub elements: Vec<Element>,
    pub element_options: ElementOptions,
}

/// Ordered versions plus a cursor. Never empty.
#[derive(Debug, Clone)]
pub struct History {
    versions: Vec<Version>,
    cursor: usize,
}

impl History {
    /// History holding only `initial`.
    #[must_use]
    pub fn new(initial: Version) -> Self {
        Self { versions: vec![initial], cursor: 0 }
    }

    /// Append `version` after the cursor, discarding any redo branch.
    pub fn record(&mut self, version: Version) {
        self.versions.truncate(self.cursor + 1);
        self.versions.push(version);
        self.cursor = self.versions.len() - 1;
    }

    /// Move the cursor by `delta`, clamped to the recorded range.
    pub fn seek(&mut self, delta: isize) -> &Version {
        let last = self.versions.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
        &self.versions[self.cursor]
    }

    /// Version under the cursor.
    #[must_use]
    pub fn current(&self) -> &Version {
        &self.versions[self.cursor]
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of versions held, never less than one.
    #[must_use]
    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.versions.len()
    }

    /// Drop everything and start over from `initial`.
    pub fn reset(&mut self, initial: Version) {
        self.versions = vec![initial];
        self.cursor = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Version::default())
    }
}
