//! Entity comparison.
//!
//! Fields are matched by name, then unmatched added and removed fields are
//! paired into renames when they are structurally identical. The rename
//! scan is quadratic and first-match-wins: removed candidates are tried in
//! name order and the first one equal to the added field is taken. Two
//! removed fields that both match one added field are not reported as
//! ambiguous.
//!
//! Indexes and foreign keys are matched by name only.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::diff::EntityDiff;
use crate::platform::Platform;
use crate::schema::{names_match, Entity, Field};

use super::{FieldComparator, IndexComparator, RelationComparator};

/// Compares two versions of an entity.
#[derive(Clone, Copy, Default)]
pub struct EntityComparator<'a> {
    fields: FieldComparator<'a>,
    indices: IndexComparator,
    relations: RelationComparator,
    case_insensitive: bool,
}

impl<'a> EntityComparator<'a> {
    /// Creates a case-sensitive comparator without a platform.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: FieldComparator::new(),
            indices: IndexComparator::new(false),
            relations: RelationComparator::new(false),
            case_insensitive: false,
        }
    }

    /// Uses `platform` for the field DDL equivalence check.
    #[must_use]
    pub const fn with_platform(mut self, platform: &'a dyn Platform) -> Self {
        self.fields = FieldComparator::with_platform(platform);
        self
    }

    /// Sets whether names are matched ignoring ASCII case.
    #[must_use]
    pub const fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.indices = IndexComparator::new(case_insensitive);
        self.relations = RelationComparator::new(case_insensitive);
        self.case_insensitive = case_insensitive;
        self
    }

    /// Returns the diff between two entities, or `None` if they are equal.
    ///
    /// Entity names are not compared.
    #[must_use]
    pub fn compute_diff(&self, from: &Entity, to: &Entity) -> Option<EntityDiff> {
        let (diff, differences) = self.compare(from, to);
        if differences == 0 {
            None
        } else {
            Some(diff)
        }
    }

    /// Builds the diff and counts its differences.
    ///
    /// A committed rename counts as one difference.
    #[must_use]
    pub fn compare(&self, from: &Entity, to: &Entity) -> (EntityDiff, usize) {
        let mut diff = EntityDiff::new(from.clone(), to.clone());
        let differences = self.compare_fields(&mut diff)
            + self.compare_primary_keys(&mut diff)
            + self.compare_indices(&mut diff)
            + self.compare_relations(&mut diff);
        (diff, differences)
    }

    /// Fills the added, removed, modified and renamed field buckets.
    pub fn compare_fields(&self, diff: &mut EntityDiff) -> usize {
        let EntityDiff {
            from_entity,
            to_entity,
            added_fields,
            removed_fields,
            modified_fields,
            renamed_fields,
            ..
        } = diff;
        let mut differences = 0;

        for field in &to_entity.fields {
            if !self.has_field(from_entity, &field.name) {
                trace!(entity = %to_entity.name, field = %field.name, "Added field");
                added_fields.insert(field.name.clone(), field.clone());
                differences += 1;
            }
        }

        for field in &from_entity.fields {
            match to_entity.find_field(&field.name, self.case_insensitive) {
                None => {
                    trace!(entity = %from_entity.name, field = %field.name, "Removed field");
                    removed_fields.insert(field.name.clone(), field.clone());
                    differences += 1;
                }
                Some(to_field) => {
                    if let Some(field_diff) = self.fields.compute_diff(field, to_field) {
                        modified_fields.insert(field.name.clone(), field_diff);
                        differences += 1;
                    }
                }
            }
        }

        let renames = self.detect_renames(
            &from_entity.name,
            added_fields,
            removed_fields,
            renamed_fields,
        );
        differences - renames
    }

    /// Fills the primary-key buckets.
    ///
    /// A field belongs to the primary key of a side only if it is flagged
    /// primary-key on that side.
    pub fn compare_primary_keys(&self, diff: &mut EntityDiff) -> usize {
        let EntityDiff {
            from_entity,
            to_entity,
            added_pk_fields,
            removed_pk_fields,
            renamed_pk_fields,
            ..
        } = diff;
        let mut differences = 0;

        for field in to_entity.primary_key() {
            if !self.in_primary_key(from_entity, &field.name) {
                added_pk_fields.insert(field.name.clone(), field.clone());
                differences += 1;
            }
        }

        for field in from_entity.primary_key() {
            if !self.in_primary_key(to_entity, &field.name) {
                removed_pk_fields.insert(field.name.clone(), field.clone());
                differences += 1;
            }
        }

        let renames = self.detect_renames(
            &from_entity.name,
            added_pk_fields,
            removed_pk_fields,
            renamed_pk_fields,
        );
        differences - renames
    }

    /// Fills the index buckets. Plain and unique indexes share one namespace.
    pub fn compare_indices(&self, diff: &mut EntityDiff) -> usize {
        let EntityDiff {
            from_entity,
            to_entity,
            added_indices,
            removed_indices,
            modified_indices,
            ..
        } = diff;
        let to_indices: Vec<_> = to_entity.all_indices().collect();
        let mut matched_to = vec![false; to_indices.len()];
        let mut differences = 0;

        for from_index in from_entity.all_indices() {
            let position = (0..to_indices.len()).find(|&i| {
                !matched_to[i] && self.same_name(&to_indices[i].name, &from_index.name)
            });
            match position {
                Some(i) => {
                    matched_to[i] = true;
                    let to_index = to_indices[i];
                    if self.indices.compute_diff(from_index, to_index) {
                        modified_indices.insert(
                            from_index.name.clone(),
                            (from_index.clone(), to_index.clone()),
                        );
                        differences += 1;
                    }
                }
                None => {
                    removed_indices.insert(from_index.name.clone(), from_index.clone());
                    differences += 1;
                }
            }
        }

        let unmatched = to_indices.iter().zip(&matched_to).filter(|(_, m)| !**m);
        for (to_index, _) in unmatched {
            added_indices.insert(to_index.name.clone(), (*to_index).clone());
            differences += 1;
        }

        differences
    }

    /// Fills the foreign key buckets.
    ///
    /// Unmatched foreign keys flagged `skip_sql` are neither added nor
    /// removed.
    pub fn compare_relations(&self, diff: &mut EntityDiff) -> usize {
        let EntityDiff {
            from_entity,
            to_entity,
            added_fks,
            removed_fks,
            modified_fks,
            ..
        } = diff;
        let to_fks = &to_entity.relations;
        let mut matched_to = vec![false; to_fks.len()];
        let mut differences = 0;

        for from_fk in &from_entity.relations {
            let position = (0..to_fks.len()).find(|&i| {
                !matched_to[i] && self.same_name(&to_fks[i].name, &from_fk.name)
            });
            match position {
                Some(i) => {
                    matched_to[i] = true;
                    let to_fk = &to_fks[i];
                    if self.relations.compute_diff(from_fk, to_fk) {
                        modified_fks.insert(from_fk.name.clone(), (from_fk.clone(), to_fk.clone()));
                        differences += 1;
                    }
                }
                None if from_fk.skip_sql => {}
                None => {
                    removed_fks.insert(from_fk.name.clone(), from_fk.clone());
                    differences += 1;
                }
            }
        }

        let unmatched = to_fks.iter().zip(&matched_to).filter(|(_, m)| !**m);
        for (to_fk, _) in unmatched {
            if !to_fk.skip_sql {
                added_fks.insert(to_fk.name.clone(), to_fk.clone());
                differences += 1;
            }
        }

        differences
    }

    fn same_name(&self, a: &str, b: &str) -> bool {
        names_match(a, b, self.case_insensitive)
    }

    fn has_field(&self, entity: &Entity, name: &str) -> bool {
        entity.find_field(name, self.case_insensitive).is_some()
    }

    fn in_primary_key(&self, entity: &Entity, name: &str) -> bool {
        entity
            .find_field(name, self.case_insensitive)
            .is_some_and(|field| field.primary_key)
    }

    fn fields_differ(&self, a: &Field, b: &Field) -> bool {
        self.fields.compute_diff(a, b).is_some()
    }

    /// Moves structurally identical added/removed pairs into `renamed`.
    ///
    /// Returns the number of renames.
    fn detect_renames(
        &self,
        entity: &str,
        added: &mut BTreeMap<String, Field>,
        removed: &mut BTreeMap<String, Field>,
        renamed: &mut BTreeMap<String, (Field, Field)>,
    ) -> usize {
        let mut taken: BTreeSet<String> = BTreeSet::new();
        let mut renames: Vec<(String, String)> = Vec::new();

        for (new_name, added_field) in added.iter() {
            let candidate = removed.iter().find(|(old_name, removed_field)| {
                !taken.contains(*old_name) && !self.fields_differ(added_field, removed_field)
            });
            if let Some((old_name, _)) = candidate {
                taken.insert(old_name.clone());
                renames.push((old_name.clone(), new_name.clone()));
            }
        }

        for (old_name, new_name) in &renames {
            if let (Some(old), Some(new)) = (removed.remove(old_name), added.remove(new_name)) {
                debug!(entity = %entity, from = %old_name, to = %new_name, "Detected field rename");
                renamed.insert(old_name.clone(), (old, new));
            }
        }

        renames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::FieldProperty;
    use crate::platform::SqlitePlatform;
    use crate::schema::{ColumnType, Index, ReferentialAction, Relation};

    fn pk(name: &str) -> Field {
        Field::new(name, ColumnType::Integer).primary_key()
    }

    fn col(name: &str) -> Field {
        Field::new(name, ColumnType::Varchar).size(255)
    }

    fn entity_diff(from: &Entity, to: &Entity) -> Option<EntityDiff> {
        EntityComparator::new().compute_diff(from, to)
    }

    fn book() -> Entity {
        let author_fk = Relation::new("book_author", "author").reference("author_id", "id");
        Entity::new("book")
            .field(pk("id"))
            .field(col("title"))
            .field(Field::new("author_id", ColumnType::Integer))
            .index(Index::new("book_title").field("title"))
            .relation(author_fk)
    }

    #[test]
    fn identical_entities() {
        assert!(entity_diff(&book(), &book()).is_none());
    }

    #[test]
    fn entity_name_is_not_compared() {
        let books = Entity::new("books").field(pk("id")).field(col("title"));
        let tome = Entity::new("tome").field(pk("id")).field(col("title"));
        assert!(entity_diff(&books, &tome).is_none());
    }

    #[test]
    fn added_removed_and_modified_fields() {
        let from = Entity::new("t")
            .field(pk("id"))
            .field(col("a"))
            .field(col("b"));
        let to = Entity::new("t")
            .field(pk("id"))
            .field(col("a").not_null())
            .field(Field::new("c", ColumnType::Integer));

        let (diff, differences) = EntityComparator::new().compare(&from, &to);
        assert_eq!(differences, 3);
        assert!(diff.added_fields().contains_key("c"));
        assert!(diff.removed_fields().contains_key("b"));
        assert!(diff.modified_fields()["a"]
            .changed(FieldProperty::NotNull)
            .is_some());
        assert!(diff.renamed_fields().is_empty());
    }

    #[test]
    fn field_rename() {
        let from = Entity::new("t").field(pk("id")).field(col("foo"));
        let to = Entity::new("t").field(pk("id")).field(col("bar"));

        let (diff, differences) = EntityComparator::new().compare(&from, &to);
        assert_eq!(differences, 1);
        assert!(diff.added_fields().is_empty());
        assert!(diff.removed_fields().is_empty());
        let (old, new) = &diff.renamed_fields()["foo"];
        assert_eq!(old.name, "foo");
        assert_eq!(new.name, "bar");
    }

    #[test]
    fn rename_takes_first_removed_match() {
        let from = Entity::new("t").field(col("a")).field(col("b"));
        let to = Entity::new("t").field(col("c"));

        let diff = entity_diff(&from, &to).unwrap();
        assert!(diff.renamed_fields().contains_key("a"));
        assert!(diff.removed_fields().contains_key("b"));
    }

    #[test]
    fn each_removed_field_renames_once() {
        let from = Entity::new("t").field(col("a"));
        let to = Entity::new("t").field(col("b")).field(col("c"));

        let diff = entity_diff(&from, &to).unwrap();
        assert_eq!(diff.renamed_fields().len(), 1);
        assert_eq!(diff.renamed_fields()["a"].1.name, "b");
        assert!(diff.added_fields().contains_key("c"));
    }

    #[test]
    fn primary_key_changes() {
        let from = Entity::new("t").field(pk("id")).field(col("code"));
        let to = Entity::new("t")
            .field(Field::new("id", ColumnType::Integer).not_null())
            .field(col("code").primary_key());

        let diff = entity_diff(&from, &to).unwrap();
        assert!(diff.has_modified_pk());
        assert!(diff.removed_pk_fields().contains_key("id"));
        assert!(diff.added_pk_fields().contains_key("code"));
    }

    #[test]
    fn primary_key_rename() {
        let from = Entity::new("t").field(pk("id"));
        let to = Entity::new("t").field(pk("key"));

        let diff = entity_diff(&from, &to).unwrap();
        assert!(diff.renamed_fields().contains_key("id"));
        assert!(diff.renamed_pk_fields().contains_key("id"));
        assert!(diff.added_pk_fields().is_empty());
    }

    #[test]
    fn index_changes() {
        let from = Entity::new("t")
            .field(col("a"))
            .field(col("b"))
            .index(Index::new("idx1").field("a").field("b"))
            .index(Index::new("idx2").field("a"))
            .unique(Index::new("uniq").field("b"));
        let to = Entity::new("t")
            .field(col("a"))
            .field(col("b"))
            .index(Index::new("idx1").field("b").field("a"))
            .index(Index::new("idx3").field("b"))
            .unique(Index::new("uniq").field("b"));

        let (diff, differences) = EntityComparator::new().compare(&from, &to);
        assert_eq!(differences, 3);
        assert!(diff.modified_indices().contains_key("idx1"));
        assert!(diff.removed_indices().contains_key("idx2"));
        assert!(diff.added_indices().contains_key("idx3"));
        assert!(!diff.modified_indices().contains_key("uniq"));
    }

    #[test]
    fn index_becoming_unique_is_modified() {
        let idx = Index::new("idx").field("a");
        let from = Entity::new("t").field(col("a")).index(idx.clone());
        let to = Entity::new("t").field(col("a")).unique(idx);

        let diff = entity_diff(&from, &to).unwrap();
        let (old, new) = &diff.modified_indices()["idx"];
        assert!(!old.unique);
        assert!(new.unique);
    }

    #[test]
    fn relation_changes() {
        let author_fk = Relation::new("book_author", "author").reference("author_id", "id");
        let from = book();
        let to = Entity::new("book")
            .field(pk("id"))
            .field(col("title"))
            .field(Field::new("author_id", ColumnType::Integer))
            .index(Index::new("book_title").field("title"))
            .relation(author_fk.on_delete(ReferentialAction::Cascade))
            .relation(Relation::new("book_self", "book").reference("id", "id"));

        let diff = entity_diff(&from, &to).unwrap();
        assert!(diff.modified_fks().contains_key("book_author"));
        assert!(diff.added_fks().contains_key("book_self"));
        assert!(diff.removed_fks().is_empty());
    }

    #[test]
    fn skip_sql_relations_are_ignored() {
        let from = Entity::new("t")
            .field(col("a"))
            .relation(Relation::new("fk_old", "x").reference("a", "id").skip_sql());
        let to = Entity::new("t")
            .field(col("a"))
            .relation(Relation::new("fk_new", "x").reference("a", "id").skip_sql());

        assert!(entity_diff(&from, &to).is_none());
    }

    #[test]
    fn case_insensitive_names() {
        let from = Entity::new("t")
            .field(col("Title"))
            .index(Index::new("IDX").field("Title"));
        let to = Entity::new("t")
            .field(col("title"))
            .index(Index::new("idx").field("title"));

        assert!(entity_diff(&from, &to).is_some());
        assert!(EntityComparator::new()
            .case_insensitive(true)
            .compute_diff(&from, &to)
            .is_none());
    }

    #[test]
    fn platform_equivalent_fields() {
        let from = Entity::new("t").field(col("title"));
        let to = Entity::new("t").field(Field::new("title", ColumnType::LongVarchar));

        let sqlite = SqlitePlatform::new();
        assert!(entity_diff(&from, &to).is_some());
        assert!(EntityComparator::new()
            .with_platform(&sqlite)
            .compute_diff(&from, &to)
            .is_none());
    }
}
