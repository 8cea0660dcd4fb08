//! Symbol tables mapping label and feature strings to dense ids.

use std::sync::RwLock;

use hashbrown::HashMap;

use crate::common::{NULL_ROLE_LABEL, NULL_TRIGGER_LABEL};

/// The id the null trigger and null role labels are interned with.
///
/// [`Alphabets::new`] interns both null labels first, so this id is valid in
/// every run.
pub(crate) const NULL_LABEL_ID: u32 = 0;

/// A bidirectional mapping between strings and dense integer ids.
///
/// Ids are assigned in insertion order and are stable for the lifetime of a
/// run. A table grows while training and is frozen for decoding; looking up
/// an unknown key never fails, it returns `None` and the caller decides how
/// to handle the out-of-vocabulary case.
///
/// The table is internally locked so that a shared [`Alphabets`] can grow
/// during (serialized) training and be read concurrently once frozen.
#[derive(Debug, Default)]
pub struct Alphabet {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    ids: HashMap<String, u32>,
    entries: Vec<String>,
    frozen: bool,
}

impl Alphabet {
    /// Creates a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the id of `key`, optionally interning it when absent.
    ///
    /// Returns `None` when the key is unknown and either `add_if_absent` is
    /// false or the table has been frozen.
    pub fn lookup_index(&self, key: &str, add_if_absent: bool) -> Option<u32> {
        {
            let inner = self.inner.read().unwrap();
            if let Some(&id) = inner.ids.get(key) {
                return Some(id);
            }
            if !add_if_absent || inner.frozen {
                return None;
            }
        }
        let mut inner = self.inner.write().unwrap();
        if inner.frozen {
            return None;
        }
        if let Some(&id) = inner.ids.get(key) {
            // Interned by a racing writer between the two lock scopes.
            return Some(id);
        }
        let id = u32::try_from(inner.entries.len()).ok()?;
        inner.entries.push(key.to_string());
        inner.ids.insert(key.to_string(), id);
        Some(id)
    }

    /// Returns the string interned with `id`, or `None` for unknown ids.
    pub fn lookup_object(&self, id: u32) -> Option<String> {
        self.inner
            .read()
            .unwrap()
            .entries
            .get(id as usize)
            .cloned()
    }

    /// Returns the number of interned entries.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().entries.len()
    }

    /// Checks if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stops the table from growing; subsequent `add_if_absent` requests for
    /// unknown keys return `None`.
    pub fn freeze(&self) {
        self.inner.write().unwrap().frozen = true;
    }

    /// Checks if the table has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.inner.read().unwrap().frozen
    }
}

/// The three symbol tables shared across a run.
#[derive(Debug, Default)]
pub struct Alphabets {
    /// Trigger (node) label table.
    pub node_labels: Alphabet,

    /// Argument-role (edge) label table.
    pub edge_labels: Alphabet,

    /// Feature-string table.
    pub features: Alphabet,
}

impl Alphabets {
    /// Creates the tables with the null trigger and null role labels
    /// interned first, so both resolve to id 0.
    pub fn new() -> Self {
        let alphabets = Self::default();
        alphabets
            .node_labels
            .lookup_index(NULL_TRIGGER_LABEL, true);
        alphabets.edge_labels.lookup_index(NULL_ROLE_LABEL, true);
        alphabets
    }

    /// Freezes all three tables for decoding.
    pub fn freeze(&self) {
        self.node_labels.freeze();
        self.edge_labels.freeze();
        self.features.freeze();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_stable() {
        let alpha = Alphabet::new();
        let a = alpha.lookup_index("Attack", true).unwrap();
        let b = alpha.lookup_index("Die", true).unwrap();
        assert_ne!(a, b);
        assert_eq!(alpha.lookup_index("Attack", true), Some(a));
        assert_eq!(alpha.lookup_index("Attack", false), Some(a));
        assert_eq!(alpha.lookup_object(a).as_deref(), Some("Attack"));
        assert_eq!(alpha.len(), 2);
    }

    #[test]
    fn test_unknown_returns_none() {
        let alpha = Alphabet::new();
        assert_eq!(alpha.lookup_index("Attack", false), None);
        assert_eq!(alpha.lookup_object(7), None);
    }

    #[test]
    fn test_frozen_rejects_growth() {
        let alpha = Alphabet::new();
        alpha.lookup_index("Attack", true);
        alpha.freeze();
        assert!(alpha.is_frozen());
        assert_eq!(alpha.lookup_index("Die", true), None);
        assert_eq!(alpha.lookup_index("Attack", true), Some(0));
    }

    #[test]
    fn test_null_labels_interned_first() {
        let alphabets = Alphabets::new();
        assert_eq!(
            alphabets.node_labels.lookup_index(NULL_TRIGGER_LABEL, false),
            Some(NULL_LABEL_ID)
        );
        assert_eq!(
            alphabets.edge_labels.lookup_index(NULL_ROLE_LABEL, false),
            Some(NULL_LABEL_ID)
        );
    }
}
