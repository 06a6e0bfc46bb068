//! Local edit buffer for inline list editing.
//!
//! Each entity moves between two states:
//!
//! ```text
//! Viewing --begin--> Editing --stage (any number of times)--> Editing
//! Editing --take_for_save (with staged edits)--> Viewing, entry cleared
//! ```
//!
//! Staged edits are keyed by entity id, so several entities can be edited
//! at once without their edits mixing. The value shown for a field is the
//! staged value when one exists and the canonical cached value otherwise,
//! independently per field.
//!
//! No discard transition exists: once started, an edit can only be
//! overwritten or saved.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// A pending change to a single field of an entity.
pub trait FieldPatch {
    /// Identifies which field the patch writes. Two patches with the same
    /// field replace each other in the buffer.
    type Field: Copy + Eq;

    /// The field this patch writes.
    fn field(&self) -> Self::Field;
}

/// An entity that staged patches can be overlaid on for display.
pub trait Overlay<P> {
    /// Write the patch's value over the corresponding field.
    fn apply(&mut self, patch: &P);
}

/// Per-entity buffer of uncommitted field edits.
#[derive(Debug, Clone)]
pub struct EditBuffer<K, P> {
    editing: HashSet<K>,
    staged: HashMap<K, Vec<P>>,
}

impl<K, P> Default for EditBuffer<K, P> {
    fn default() -> Self {
        Self {
            editing: HashSet::new(),
            staged: HashMap::new(),
        }
    }
}

impl<K, P> EditBuffer<K, P>
where
    K: Eq + Hash + Clone,
    P: FieldPatch + Clone,
{
    /// Create an empty buffer with every entity in the Viewing state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move an entity into the Editing state.
    pub fn begin(&mut self, id: K) {
        self.editing.insert(id);
    }

    /// Whether the entity is in the Editing state.
    #[must_use]
    pub fn is_editing(&self, id: &K) -> bool {
        self.editing.contains(id)
    }

    /// Stage an edit for an entity.
    ///
    /// A later edit to the same field replaces the earlier one in place, so
    /// fields keep the order in which they were first edited.
    pub fn stage(&mut self, id: K, patch: P) {
        let entry = self.staged.entry(id).or_default();
        let field = patch.field();
        match entry.iter_mut().find(|staged| staged.field() == field) {
            Some(existing) => *existing = patch,
            None => entry.push(patch),
        }
    }

    /// Edits currently staged for an entity, in first-edit order.
    #[must_use]
    pub fn staged(&self, id: &K) -> &[P] {
        self.staged.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// The staged edit for one field of an entity, if any.
    #[must_use]
    pub fn staged_field(&self, id: &K, field: P::Field) -> Option<&P> {
        self.staged(id).iter().find(|patch| patch.field() == field)
    }

    /// The entity as it should be displayed: canonical values with staged
    /// edits written over them.
    #[must_use]
    pub fn overlay<T>(&self, id: &K, canonical: &T) -> T
    where
        T: Overlay<P> + Clone,
    {
        let mut effective = canonical.clone();
        for patch in self.staged(id) {
            effective.apply(patch);
        }
        effective
    }

    /// Take an entity's staged edits for saving.
    ///
    /// Returns `None` and leaves the entity in the Editing state when
    /// nothing is staged. Otherwise clears the entity's entry, moves it back
    /// to Viewing and returns the edits. Other entities are untouched.
    pub fn take_for_save(&mut self, id: &K) -> Option<Vec<P>> {
        let patches = self.staged.remove(id)?;
        self.editing.remove(id);
        Some(patches)
    }

    /// Number of entities with staged edits.
    #[must_use]
    pub fn pending_entities(&self) -> usize {
        self.staged.len()
    }
}
