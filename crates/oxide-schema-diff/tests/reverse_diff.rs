//! Integration tests for reverse diffs.
//!
//! A reverse diff must describe the change from `to` back to `from`, so
//! comparing the databases in the opposite order has to agree with it.

mod common;

use common::{bookstore, compute_expect, int, pk, user, varchar};
use oxide_schema_diff::prelude::*;

fn evolved() -> (Database, Database) {
    let author = Relation::new("post_author", "User").reference("author_id", "id");
    let post = Entity::new("post")
        .field(pk("id"))
        .field(varchar("title", 100))
        .field(int("author_id"))
        .index(Index::new("post_title").field("title"))
        .relation(author.clone());
    let legacy = Entity::new("legacy").field(pk("id")).field(int("flag"));
    let from = Database::new("app")
        .entity(user().field(varchar("nickname", 30)))
        .entity(post)
        .entity(legacy);

    let title_author = Index::new("post_title").field("title").field("author_id");
    let post = Entity::new("post")
        .field(pk("id"))
        .field(varchar("title", 255).not_null())
        .field(int("author_id"))
        .index(title_author)
        .relation(author.on_delete(ReferentialAction::Cascade));
    let tag = Entity::new("tag")
        .field(pk("id"))
        .field(varchar("label", 50));
    let to = Database::new("app")
        .entity(user().field(varchar("handle", 30)).field(int("age")))
        .entity(post)
        .entity(tag);

    (from, to)
}

#[test]
fn reverse_twice_is_identity() {
    let (from, to) = evolved();
    let diff = compute_expect(&from, &to, &ComparatorOptions::new());
    assert_eq!(diff.reverse().reverse(), diff);

    for entity_diff in diff.modified_entities().values() {
        assert_eq!(entity_diff.reverse().reverse(), *entity_diff);
        for field_diff in entity_diff.modified_fields().values() {
            assert_eq!(field_diff.reverse().reverse(), *field_diff);
        }
    }
}

#[test]
fn reverse_swaps_entity_buckets() {
    let (from, to) = evolved();
    let diff = compute_expect(&from, &to, &ComparatorOptions::new());
    let reversed = diff.reverse();

    assert_eq!(reversed.from_database(), diff.to_database());
    assert_eq!(reversed.added_entities(), diff.removed_entities());
    assert_eq!(reversed.removed_entities(), diff.added_entities());
    assert!(reversed.added_entities().contains_key("legacy"));
    assert!(reversed.removed_entities().contains_key("tag"));
}

#[test]
fn reverse_swaps_field_buckets() {
    let (from, to) = evolved();
    let diff = compute_expect(&from, &to, &ComparatorOptions::new());
    let user_diff = &diff.modified_entities()["User"];
    let reversed = user_diff.reverse();

    assert_eq!(user_diff.added_fields().len(), 1);
    assert_eq!(reversed.removed_fields(), user_diff.added_fields());
    assert_eq!(reversed.added_fields(), user_diff.removed_fields());

    let (old, new) = &user_diff.renamed_fields()["nickname"];
    assert_eq!(old.name, "nickname");
    assert_eq!(new.name, "handle");
    let (old, new) = &reversed.renamed_fields()["handle"];
    assert_eq!(old.name, "handle");
    assert_eq!(new.name, "nickname");
}

#[test]
fn reverse_recurses_into_field_diffs() {
    let (from, to) = evolved();
    let diff = compute_expect(&from, &to, &ComparatorOptions::new());
    let reversed = diff.reverse();
    let post = &reversed.modified_entities()["post"];

    let title = &post.modified_fields()["title"];
    assert_eq!(title.from_field(), &varchar("title", 255).not_null());
    assert_eq!(
        title.changed(FieldProperty::Size),
        Some(&PropertyChange::new(Some(255_u32), Some(100_u32)))
    );
    assert_eq!(
        title.changed(FieldProperty::NotNull),
        Some(&PropertyChange::new(true, false))
    );

    let (old, new) = &post.modified_indices()["post_title"];
    assert_eq!(old.fields.len(), 2);
    assert_eq!(new.fields.len(), 1);

    let (old, new) = &post.modified_fks()["post_author"];
    assert_eq!(old.on_delete, ReferentialAction::Cascade);
    assert_eq!(new.on_delete, ReferentialAction::None);
}

#[test]
fn reverse_matches_swapped_comparison() {
    let (from, to) = evolved();
    let options = ComparatorOptions::new();
    let forward = compute_expect(&from, &to, &options);
    let backward = compute_expect(&to, &from, &options);

    let reversed = forward.reverse();
    assert_eq!(
        reversed.added_entities().keys().collect::<Vec<_>>(),
        backward.added_entities().keys().collect::<Vec<_>>()
    );
    assert_eq!(
        reversed.removed_entities().keys().collect::<Vec<_>>(),
        backward.removed_entities().keys().collect::<Vec<_>>()
    );
    assert_eq!(
        reversed.modified_entities()["post"].modified_fields(),
        backward.modified_entities()["post"].modified_fields()
    );
}

#[test]
fn reverse_flips_entity_renames() {
    let from = bookstore("Books");
    let to = bookstore("Book");

    let committed = compute_expect(&from, &to, &ComparatorOptions::new().with_renaming());
    assert_eq!(committed.reverse().renamed_entities()["Book"], "Books");

    let possible = compute_expect(&from, &to, &ComparatorOptions::new());
    let reversed = possible.reverse();
    assert_eq!(reversed.possible_renamed_entities()["Book"], "Books");
    assert!(reversed.added_entities().contains_key("Books"));
    assert!(reversed.removed_entities().contains_key("Book"));
}

#[test]
fn display_lists_changes() {
    let (from, to) = evolved();
    let diff = compute_expect(&from, &to, &ComparatorOptions::new());
    let text = diff.to_string();

    assert!(text.contains("addedEntities:\n  - tag\n"));
    assert!(text.contains("removedEntities:\n  - legacy\n"));
    let renamed = "    renamedFields:\n      nickname: handle\n";
    assert!(text.contains(renamed));

    let reversed = diff.reverse().to_string();
    assert!(reversed.contains("addedEntities:\n  - legacy\n"));
}
