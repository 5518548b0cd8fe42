//! Persistent stack of previous values for the history operators
//!
//! Pushing returns a new stack that shares every older frame with the
//! original, so child contexts and nested sequences extend the history
//! without copying it and without affecting their parent.

use serde_json::Value;
use std::sync::Arc;

#[derive(Debug)]
struct Frame {
    value: Value,
    previous: Option<Arc<Frame>>,
}

impl Drop for Frame {
    // Unlink iteratively so very long chains cannot overflow the stack on drop.
    fn drop(&mut self) {
        let mut next = self.previous.take();
        while let Some(frame) = next {
            match Arc::try_unwrap(frame) {
                Ok(mut frame) => next = frame.previous.take(),
                Err(_) => break,
            }
        }
    }
}

/// Bounded view over a shared stack of previous values
#[derive(Debug, Clone)]
pub struct History {
    head: Option<Arc<Frame>>,
    len: usize,
    limit: usize,
}

impl History {
    /// Empty history exposing at most `limit` entries
    pub fn new(limit: usize) -> Self {
        Self {
            head: None,
            len: 0,
            limit,
        }
    }

    /// A new history with `value` on top
    pub fn push(&self, value: Value) -> History {
        History {
            head: Some(Arc::new(Frame {
                value,
                previous: self.head.clone(),
            })),
            len: self.len + 1,
            limit: self.limit,
        }
    }

    /// Entry `n` counted from the top (0 is the most recent).
    ///
    /// Entries beyond the limit have dropped off and read as `None`.
    pub fn get(&self, n: usize) -> Option<&Value> {
        if n >= self.len() {
            return None;
        }
        self.iter().nth(n)
    }

    /// Number of reachable entries
    pub fn len(&self) -> usize {
        self.len.min(self.limit)
    }

    /// Whether no entries are reachable
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reachable entries, most recent first
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        let mut frame = self.head.as_deref();
        std::iter::from_fn(move || {
            let current = frame?;
            frame = current.previous.as_deref();
            Some(&current.value)
        })
        .take(self.limit)
    }
}
