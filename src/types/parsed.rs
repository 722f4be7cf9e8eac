//! Lenient parse results.
//!
//! Target and port parsing never abort a batch because of one bad entry.
//! Instead they return whatever parsed cleanly together with a list of the
//! entries that were skipped and why.

use std::fmt;

/// An input fragment that was dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped<E> {
    /// The offending input, verbatim.
    pub input: String,
    /// Why it was dropped.
    pub reason: E,
}

impl<E: fmt::Display> fmt::Display for Skipped<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.input, self.reason)
    }
}

/// Items that parsed, plus the inputs that did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T, E> {
    pub items: Vec<T>,
    pub skipped: Vec<Skipped<E>>,
}

impl<T, E> Parsed<T, E> {
    /// An empty result.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// A result holding only successfully parsed items.
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            items,
            skipped: Vec::new(),
        }
    }

    /// Record a dropped input.
    pub fn skip(&mut self, input: impl Into<String>, reason: E) {
        self.skipped.push(Skipped {
            input: input.into(),
            reason,
        });
    }

    /// Append another result, keeping order.
    pub fn extend(&mut self, other: Parsed<T, E>) {
        self.items.extend(other.items);
        self.skipped.extend(other.skipped);
    }

    /// True if nothing was dropped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl<T, E> Default for Parsed<T, E> {
    fn default() -> Self {
        Self::new()
    }
}
