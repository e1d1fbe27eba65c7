//! Database-level diff.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::schema::{Database, Entity};

use super::EntityDiff;

/// Structural difference between two versions of a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseDiff {
    pub(crate) from_database: Database,
    pub(crate) to_database: Database,
    pub(crate) added_entities: BTreeMap<String, Entity>,
    pub(crate) removed_entities: BTreeMap<String, Entity>,
    pub(crate) modified_entities: BTreeMap<String, EntityDiff>,
    pub(crate) renamed_entities: BTreeMap<String, String>,
    pub(crate) possible_renamed_entities: BTreeMap<String, String>,
}

impl DatabaseDiff {
    /// Creates an empty diff between two databases.
    #[must_use]
    pub const fn new(from_database: Database, to_database: Database) -> Self {
        Self {
            from_database,
            to_database,
            added_entities: BTreeMap::new(),
            removed_entities: BTreeMap::new(),
            modified_entities: BTreeMap::new(),
            renamed_entities: BTreeMap::new(),
            possible_renamed_entities: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn from_database(&self) -> &Database {
        &self.from_database
    }

    #[must_use]
    pub const fn to_database(&self) -> &Database {
        &self.to_database
    }

    #[must_use]
    pub const fn added_entities(&self) -> &BTreeMap<String, Entity> {
        &self.added_entities
    }

    #[must_use]
    pub const fn removed_entities(&self) -> &BTreeMap<String, Entity> {
        &self.removed_entities
    }

    #[must_use]
    pub const fn modified_entities(&self) -> &BTreeMap<String, EntityDiff> {
        &self.modified_entities
    }

    /// Committed renames, old name to new name.
    #[must_use]
    pub const fn renamed_entities(&self) -> &BTreeMap<String, String> {
        &self.renamed_entities
    }

    /// Rename candidates that were not committed, old name to new name.
    ///
    /// Both sides of each candidate also stay in the added and removed
    /// buckets.
    #[must_use]
    pub const fn possible_renamed_entities(&self) -> &BTreeMap<String, String> {
        &self.possible_renamed_entities
    }

    /// Returns whether no entity was added, removed, modified or renamed.
    ///
    /// Possible renames alone never make a diff non-empty, since their
    /// entities are already counted as added and removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added_entities.is_empty()
            && self.removed_entities.is_empty()
            && self.modified_entities.is_empty()
            && self.renamed_entities.is_empty()
    }

    /// Returns a one-line summary such as `1 added entity, 2 modified entities`.
    #[must_use]
    pub fn description(&self) -> String {
        let counts = [
            (self.added_entities.len(), "added"),
            (self.removed_entities.len(), "removed"),
            (self.modified_entities.len(), "modified"),
            (self.renamed_entities.len(), "renamed"),
        ];
        counts
            .iter()
            .filter(|(count, _)| *count > 0)
            .map(|(count, kind)| {
                let noun = if *count == 1 { "entity" } else { "entities" };
                format!("{count} {kind} {noun}")
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns the diff that turns `to` back into `from`.
    #[must_use]
    pub fn reverse(&self) -> Self {
        let flip = |renames: &BTreeMap<String, String>| {
            renames
                .iter()
                .map(|(old, new)| (new.clone(), old.clone()))
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            from_database: self.to_database.clone(),
            to_database: self.from_database.clone(),
            added_entities: self.removed_entities.clone(),
            removed_entities: self.added_entities.clone(),
            modified_entities: self
                .modified_entities
                .values()
                .map(EntityDiff::reverse)
                .map(|diff| (diff.from_entity().name.clone(), diff))
                .collect(),
            renamed_entities: flip(&self.renamed_entities),
            possible_renamed_entities: flip(&self.possible_renamed_entities),
        }
    }
}

impl fmt::Display for DatabaseDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.added_entities.is_empty() {
            writeln!(f, "addedEntities:")?;
            for name in self.added_entities.keys() {
                writeln!(f, "  - {name}")?;
            }
        }
        if !self.removed_entities.is_empty() {
            writeln!(f, "removedEntities:")?;
            for name in self.removed_entities.keys() {
                writeln!(f, "  - {name}")?;
            }
        }
        if !self.modified_entities.is_empty() {
            writeln!(f, "modifiedEntities:")?;
            for diff in self.modified_entities.values() {
                for line in diff.to_string().lines() {
                    writeln!(f, "  {line}")?;
                }
            }
        }
        if !self.renamed_entities.is_empty() {
            writeln!(f, "renamedEntities:")?;
            for (old, new) in &self.renamed_entities {
                writeln!(f, "  {old}: {new}")?;
            }
        }
        if !self.possible_renamed_entities.is_empty() {
            writeln!(f, "possibleRenamedEntities:")?;
            for (old, new) in &self.possible_renamed_entities {
                writeln!(f, "  {old}: {new}")?;
            }
        }
        Ok(())
    }
}
