#![allow(dead_code)]

use oxide_schema_diff::prelude::*;

/// Routes comparator events to the test output. Later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

pub fn pk(name: &str) -> Field {
    Field::new(name, ColumnType::Integer).primary_key()
}

pub fn varchar(name: &str, size: u32) -> Field {
    Field::new(name, ColumnType::Varchar).size(size)
}

pub fn int(name: &str) -> Field {
    Field::new(name, ColumnType::Integer)
}

/// `User{id PK, email VARCHAR(255) NOT NULL}`.
pub fn user() -> Entity {
    Entity::new("User")
        .field(pk("id"))
        .field(varchar("email", 255).not_null())
}

/// A bookstore with books, authors and a foreign key between them.
pub fn bookstore(book_table: &str) -> Database {
    let author = Entity::new("author")
        .field(pk("id"))
        .field(varchar("name", 100).not_null());
    let title_author = Index::new("book_title_author")
        .field("title")
        .field("author_id");
    let book = Entity::new(book_table)
        .field(pk("id"))
        .field(varchar("title", 255).not_null())
        .field(int("author_id"))
        .index(Index::new("book_title").field("title"))
        .unique(title_author);
    Database::new("bookstore").entity(author).entity(book)
}

pub fn compute(
    from: &Database,
    to: &Database,
    options: &ComparatorOptions,
) -> Option<DatabaseDiff> {
    DatabaseComparator::compute_diff(from, to, options, None)
        .unwrap_or_else(|e| panic!("Comparison failed: {e}"))
}

pub fn compute_expect(from: &Database, to: &Database, options: &ComparatorOptions) -> DatabaseDiff {
    compute(from, to, options).expect("Expected differences between the databases")
}
