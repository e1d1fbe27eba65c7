//! Index comparison.

use crate::schema::Index;

/// Compares two versions of a plain or unique index.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexComparator {
    case_insensitive: bool,
}

impl IndexComparator {
    #[must_use]
    pub const fn new(case_insensitive: bool) -> Self {
        Self { case_insensitive }
    }

    /// Returns `true` if the indexes differ.
    ///
    /// Field order matters: `[a, b]` and `[b, a]` are different indexes.
    /// A prefix size is only checked when the side being walked sets one.
    #[must_use]
    pub fn compute_diff(&self, from: &Index, to: &Index) -> bool {
        !self.covers(from, to) || !self.covers(to, from) || from.unique != to.unique
    }

    /// Returns whether every field of `a` sits at the same position in `b`.
    fn covers(&self, a: &Index, b: &Index) -> bool {
        for (position, field) in a.fields.iter().enumerate() {
            if !b.has_field_at(position, &field.name, field.size, self.case_insensitive) {
                return false;
            }
        }
        true
    }
}
