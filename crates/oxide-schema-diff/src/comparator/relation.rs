//! Foreign key comparison.

use crate::schema::{names_match, Relation};

/// Compares two versions of a foreign key.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationComparator {
    case_insensitive: bool,
}

impl RelationComparator {
    #[must_use]
    pub const fn new(case_insensitive: bool) -> Self {
        Self { case_insensitive }
    }

    /// Returns `true` if the foreign keys differ.
    ///
    /// Local and foreign field names are compared as sorted, case-folded
    /// lists, so the order of the reference pairs does not matter.
    #[must_use]
    pub fn compute_diff(&self, from: &Relation, to: &Relation) -> bool {
        if !self.same_name(&from.entity, &to.entity) {
            return true;
        }
        if !self.same_name(&from.foreign_entity, &to.foreign_entity) {
            return true;
        }

        if folded(from.local_fields()) != folded(to.local_fields()) {
            return true;
        }
        if folded(from.foreign_fields()) != folded(to.foreign_fields()) {
            return true;
        }

        from.on_update != to.on_update
            || from.on_delete != to.on_delete
            || from.skip_sql != to.skip_sql
    }

    fn same_name(&self, a: &str, b: &str) -> bool {
        names_match(a, b, self.case_insensitive)
    }
}

fn folded<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = names.map(str::to_lowercase).collect();
    names.sort_unstable();
    names
}
