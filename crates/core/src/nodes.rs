//! Node bookkeeping for a conversion run.
//!
//! Every id seen in a `subject_id` or `object_id` column must become exactly
//! one node row. Ids offered with a label are written straight away; ids
//! offered without one wait in a pending list until the end of the run and
//! are then written with the id itself as label.
//!
//! Emission is immediate and never retroactive: an id whose first offer had
//! no label stays pending even if a later record supplies one, and once an
//! id is written later labels for it are ignored.

use std::collections::HashSet;

use crate::curie::ResolvedCurie;

// ---------------------------------------------------------------------------
// NodeRecord
// ---------------------------------------------------------------------------

/// One row of the node output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    /// The CURIE as it appeared in the mapping file.
    pub id: String,
    pub prefix: String,
    pub local_part: String,
    pub label: String,
    /// Expanded URI, empty when the prefix is unknown.
    pub uri: String,
}

impl NodeRecord {
    pub fn new(id: &str, label: &str, resolved: ResolvedCurie) -> Self {
        Self {
            id: id.to_string(),
            prefix: resolved.prefix,
            local_part: resolved.local_part,
            label: label.to_string(),
            uri: resolved.uri,
        }
    }
}

// ---------------------------------------------------------------------------
// NodeRegistry
// ---------------------------------------------------------------------------

/// What the caller must do after offering an id to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOffer {
    /// First labelled sighting: write the node now with the offered label.
    Emit,
    /// First sighting, no label: the id is parked until [`NodeRegistry::flush_pending`].
    Deferred,
    /// Already written or already pending; nothing to do.
    Known,
}

/// Tracks which node ids have been written and which are waiting for the
/// end-of-run flush.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    emitted: HashSet<String>,
    pending: Vec<String>,
    pending_set: HashSet<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer an id with the label the current record gives it.
    ///
    /// An empty label counts as no label.
    pub fn offer(&mut self, id: &str, label: Option<&str>) -> NodeOffer {
        if self.emitted.contains(id) || self.pending_set.contains(id) {
            return NodeOffer::Known;
        }

        match label {
            Some(label) if !label.is_empty() => {
                self.emitted.insert(id.to_string());
                NodeOffer::Emit
            }
            _ => {
                self.pending_set.insert(id.to_string());
                self.pending.push(id.to_string());
                NodeOffer::Deferred
            }
        }
    }

    /// Drain the ids that never got a label, in first-seen order, and mark
    /// them written. The caller emits each with its id as label.
    pub fn flush_pending(&mut self) -> Vec<String> {
        let pending = std::mem::take(&mut self.pending);
        self.pending_set.clear();
        self.emitted.extend(pending.iter().cloned());
        pending
    }

    #[cfg(test)]
    fn is_emitted(&self, id: &str) -> bool {
        self.emitted.contains(id)
    }

    #[cfg(test)]
    fn is_pending(&self, id: &str) -> bool {
        self.pending_set.contains(id)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    fn emitted_len(&self) -> usize {
        self.emitted.len()
    }
}
