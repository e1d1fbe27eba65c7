//! Entity-level diff.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::schema::{Entity, Field, Index, Relation};

use super::FieldDiff;

/// Structural difference between two versions of an entity.
///
/// Every bucket is keyed by name. Renamed buckets are keyed by the old name
/// and hold `(old, new)`; modified index and foreign key buckets hold
/// `(from, to)` and are keyed by the `from` name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDiff {
    pub(crate) from_entity: Entity,
    pub(crate) to_entity: Entity,

    pub(crate) added_fields: BTreeMap<String, Field>,
    pub(crate) removed_fields: BTreeMap<String, Field>,
    pub(crate) modified_fields: BTreeMap<String, FieldDiff>,
    pub(crate) renamed_fields: BTreeMap<String, (Field, Field)>,

    pub(crate) added_pk_fields: BTreeMap<String, Field>,
    pub(crate) removed_pk_fields: BTreeMap<String, Field>,
    pub(crate) renamed_pk_fields: BTreeMap<String, (Field, Field)>,

    pub(crate) added_indices: BTreeMap<String, Index>,
    pub(crate) removed_indices: BTreeMap<String, Index>,
    pub(crate) modified_indices: BTreeMap<String, (Index, Index)>,

    pub(crate) added_fks: BTreeMap<String, Relation>,
    pub(crate) removed_fks: BTreeMap<String, Relation>,
    pub(crate) modified_fks: BTreeMap<String, (Relation, Relation)>,
}

impl EntityDiff {
    /// Creates an empty diff between two entities.
    #[must_use]
    pub const fn new(from_entity: Entity, to_entity: Entity) -> Self {
        Self {
            from_entity,
            to_entity,
            added_fields: BTreeMap::new(),
            removed_fields: BTreeMap::new(),
            modified_fields: BTreeMap::new(),
            renamed_fields: BTreeMap::new(),
            added_pk_fields: BTreeMap::new(),
            removed_pk_fields: BTreeMap::new(),
            renamed_pk_fields: BTreeMap::new(),
            added_indices: BTreeMap::new(),
            removed_indices: BTreeMap::new(),
            modified_indices: BTreeMap::new(),
            added_fks: BTreeMap::new(),
            removed_fks: BTreeMap::new(),
            modified_fks: BTreeMap::new(),
        }
    }

    /// The entity before the change.
    #[must_use]
    pub const fn from_entity(&self) -> &Entity {
        &self.from_entity
    }

    /// The entity after the change.
    #[must_use]
    pub const fn to_entity(&self) -> &Entity {
        &self.to_entity
    }

    #[must_use]
    pub const fn added_fields(&self) -> &BTreeMap<String, Field> {
        &self.added_fields
    }

    #[must_use]
    pub const fn removed_fields(&self) -> &BTreeMap<String, Field> {
        &self.removed_fields
    }

    #[must_use]
    pub const fn modified_fields(&self) -> &BTreeMap<String, FieldDiff> {
        &self.modified_fields
    }

    /// Renamed fields, keyed by old name.
    #[must_use]
    pub const fn renamed_fields(&self) -> &BTreeMap<String, (Field, Field)> {
        &self.renamed_fields
    }

    #[must_use]
    pub const fn added_pk_fields(&self) -> &BTreeMap<String, Field> {
        &self.added_pk_fields
    }

    #[must_use]
    pub const fn removed_pk_fields(&self) -> &BTreeMap<String, Field> {
        &self.removed_pk_fields
    }

    /// Renamed primary-key fields, keyed by old name.
    #[must_use]
    pub const fn renamed_pk_fields(&self) -> &BTreeMap<String, (Field, Field)> {
        &self.renamed_pk_fields
    }

    #[must_use]
    pub const fn added_indices(&self) -> &BTreeMap<String, Index> {
        &self.added_indices
    }

    #[must_use]
    pub const fn removed_indices(&self) -> &BTreeMap<String, Index> {
        &self.removed_indices
    }

    #[must_use]
    pub const fn modified_indices(&self) -> &BTreeMap<String, (Index, Index)> {
        &self.modified_indices
    }

    #[must_use]
    pub const fn added_fks(&self) -> &BTreeMap<String, Relation> {
        &self.added_fks
    }

    #[must_use]
    pub const fn removed_fks(&self) -> &BTreeMap<String, Relation> {
        &self.removed_fks
    }

    #[must_use]
    pub const fn modified_fks(&self) -> &BTreeMap<String, (Relation, Relation)> {
        &self.modified_fks
    }

    /// Returns whether any field was added, removed, modified or renamed.
    #[must_use]
    pub fn has_modified_fields(&self) -> bool {
        !self.added_fields.is_empty()
            || !self.removed_fields.is_empty()
            || !self.modified_fields.is_empty()
            || !self.renamed_fields.is_empty()
    }

    /// Returns whether the primary key changed.
    #[must_use]
    pub fn has_modified_pk(&self) -> bool {
        !self.added_pk_fields.is_empty()
            || !self.removed_pk_fields.is_empty()
            || !self.renamed_pk_fields.is_empty()
    }

    #[must_use]
    pub fn has_modified_indices(&self) -> bool {
        !self.added_indices.is_empty()
            || !self.removed_indices.is_empty()
            || !self.modified_indices.is_empty()
    }

    #[must_use]
    pub fn has_modified_fks(&self) -> bool {
        !self.added_fks.is_empty() || !self.removed_fks.is_empty() || !self.modified_fks.is_empty()
    }

    /// Returns whether every bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.has_modified_fields()
            && !self.has_modified_pk()
            && !self.has_modified_indices()
            && !self.has_modified_fks()
    }

    /// Returns the diff that turns `to` back into `from`.
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self {
            from_entity: self.to_entity.clone(),
            to_entity: self.from_entity.clone(),

            added_fields: self.removed_fields.clone(),
            removed_fields: self.added_fields.clone(),
            modified_fields: self
                .modified_fields
                .values()
                .map(FieldDiff::reverse)
                .map(|diff| (diff.from_field().name.clone(), diff))
                .collect(),
            renamed_fields: swap_pairs(&self.renamed_fields, |f| &f.name),

            added_pk_fields: self.removed_pk_fields.clone(),
            removed_pk_fields: self.added_pk_fields.clone(),
            renamed_pk_fields: swap_pairs(&self.renamed_pk_fields, |f| &f.name),

            added_indices: self.removed_indices.clone(),
            removed_indices: self.added_indices.clone(),
            modified_indices: swap_pairs(&self.modified_indices, |i| &i.name),

            added_fks: self.removed_fks.clone(),
            removed_fks: self.added_fks.clone(),
            modified_fks: swap_pairs(&self.modified_fks, |r| &r.name),
        }
    }
}

/// Swaps every `(a, b)` pair and re-keys it by the name of `b`.
fn swap_pairs<T: Clone>(
    pairs: &BTreeMap<String, (T, T)>,
    name: impl Fn(&T) -> &String,
) -> BTreeMap<String, (T, T)> {
    pairs
        .values()
        .map(|(from, to)| (name(to).clone(), (to.clone(), from.clone())))
        .collect()
}

fn write_names<V>(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    bucket: &BTreeMap<String, V>,
) -> fmt::Result {
    if bucket.is_empty() {
        return Ok(());
    }
    writeln!(f, "  {label}:")?;
    for name in bucket.keys() {
        writeln!(f, "    - {name}")?;
    }
    Ok(())
}

fn write_pairs<T>(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    pairs: &BTreeMap<String, (T, T)>,
    name: impl Fn(&T) -> &String,
) -> fmt::Result {
    if pairs.is_empty() {
        return Ok(());
    }
    writeln!(f, "  {label}:")?;
    for (from, to) in pairs.values() {
        writeln!(f, "    {}: {}", name(from), name(to))?;
    }
    Ok(())
}

impl fmt::Display for EntityDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.from_entity.name)?;

        write_names(f, "addedFields", &self.added_fields)?;
        write_names(f, "removedFields", &self.removed_fields)?;
        if !self.modified_fields.is_empty() {
            writeln!(f, "  modifiedFields:")?;
            for diff in self.modified_fields.values() {
                for line in diff.to_string().lines() {
                    writeln!(f, "    {line}")?;
                }
            }
        }
        write_pairs(f, "renamedFields", &self.renamed_fields, |x| &x.name)?;

        write_names(f, "addedPkFields", &self.added_pk_fields)?;
        write_names(f, "removedPkFields", &self.removed_pk_fields)?;
        write_pairs(f, "renamedPkFields", &self.renamed_pk_fields, |x| &x.name)?;

        write_names(f, "addedIndices", &self.added_indices)?;
        write_names(f, "removedIndices", &self.removed_indices)?;
        write_names(f, "modifiedIndices", &self.modified_indices)?;

        write_names(f, "addedFks", &self.added_fks)?;
        write_names(f, "removedFks", &self.removed_fks)?;
        write_names(f, "modifiedFks", &self.modified_fks)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{ChangedProperties, FieldProperty, PropertyChange};
    use crate::schema::ColumnType;

    fn book() -> Entity {
        Entity::new("book")
            .field(Field::new("id", ColumnType::Integer).primary_key())
            .field(Field::new("title", ColumnType::Varchar).size(100))
    }

    fn sample() -> EntityDiff {
        let mut diff = EntityDiff::new(book(), book());

        let isbn = Field::new("isbn", ColumnType::Varchar).size(13);
        diff.added_fields.insert(isbn.name.clone(), isbn);

        let old = Field::new("title", ColumnType::Varchar).size(100);
        let new = Field::new("title", ColumnType::Varchar).size(255);
        let mut changes = ChangedProperties::new();
        changes.insert(
            FieldProperty::Size,
            PropertyChange::new(Some(100_u32), Some(255_u32)),
        );
        diff.modified_fields
            .insert("title".into(), FieldDiff::new(old, new, changes));

        let code = Field::new("code", ColumnType::Integer).primary_key();
        let key = Field::new("key", ColumnType::Integer).primary_key();
        diff.renamed_pk_fields.insert("code".into(), (code, key));

        let from_idx = Index::new("idx").field("a").field("b");
        let to_idx = Index::new("idx").field("b").field("a");
        diff.modified_indices
            .insert("idx".into(), (from_idx, to_idx));

        let fk = Relation::new("book_author", "author").reference("author_id", "id");
        diff.removed_fks.insert(fk.name.clone(), fk);
        diff
    }

    #[test]
    fn empty_diff() {
        let diff = EntityDiff::new(book(), book());
        assert!(diff.is_empty());
        assert!(!diff.has_modified_pk());
    }

    #[test]
    fn predicates() {
        let diff = sample();
        assert!(!diff.is_empty());
        assert!(diff.has_modified_fields());
        assert!(diff.has_modified_pk());
        assert!(diff.has_modified_indices());
        assert!(diff.has_modified_fks());
    }

    #[test]
    fn reverse_swaps_buckets() {
        let diff = sample();
        let reversed = diff.reverse();

        assert!(reversed.added_fields().is_empty());
        assert_eq!(reversed.removed_fields(), diff.added_fields());
        assert_eq!(reversed.added_fks(), diff.removed_fks());

        let (from, to) = &reversed.renamed_pk_fields()["key"];
        assert_eq!(from.name, "key");
        assert_eq!(to.name, "code");

        let (from, _) = &reversed.modified_indices()["idx"];
        assert_eq!(from.fields[0].name, "b");

        assert_eq!(
            reversed.modified_fields()["title"].changed(FieldProperty::Size),
            Some(&PropertyChange::new(Some(255_u32), Some(100_u32)))
        );
    }

    #[test]
    fn reverse_twice_is_identity() {
        let diff = sample();
        assert_eq!(diff.reverse().reverse(), diff);
    }

    #[test]
    fn display_lists_buckets() {
        let text = sample().to_string();
        assert!(text.starts_with("book:\n"));
        assert!(text.contains("  addedFields:\n    - isbn\n"));
        assert!(text.contains("  modifiedFields:\n    title:\n"));
        assert!(text.contains("  renamedPkFields:\n    code: key\n"));
        assert!(text.contains("  removedFks:\n    - book_author\n"));
        assert!(!text.contains("removedFields"));
    }
}
