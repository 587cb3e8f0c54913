//! Command tag generator.

use std::sync::atomic::{AtomicU32, Ordering};

/// Produces sequential tags `A0000`, `A0001`, ... for one connection.
#[derive(Debug)]
pub struct TagGenerator {
    counter: AtomicU32,
    prefix: char,
}

impl TagGenerator {
    /// Creates a generator with the given prefix letter.
    #[must_use]
    pub const fn new(prefix: char) -> Self {
        Self {
            counter: AtomicU32::new(0),
            prefix,
        }
    }

    /// Returns the next tag.
    ///
    /// The counter wraps after `u32::MAX`; by then the earlier tags have
    /// long been completed, so reuse cannot be confused with a pending one.
    #[must_use]
    pub fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{n:04}", self.prefix)
    }

    /// Number of tags issued so far.
    #[must_use]
    pub fn issued(&self) -> u32 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new('A')
    }
}
