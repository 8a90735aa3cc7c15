//! Per-call identity tracking.

use std::collections::HashSet;

/// Identities already emitted during one extraction call.
///
/// Keys are `(namespace, text)` with the text lowercased, so the first
/// occurrence of a detector or entity wins and later ones are dropped.
#[derive(Debug, Default)]
pub struct SeenKeys {
    keys: HashSet<(String, String)>,
}

impl SeenKeys {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key; returns `true` the first time it is seen.
    pub fn insert(&mut self, namespace: &str, text: &str) -> bool {
        self.keys
            .insert((namespace.to_string(), text.to_lowercase()))
    }
}
