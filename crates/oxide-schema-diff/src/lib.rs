//! Structural, reversible diffs between relational database schemas.
//!
//! `oxide-schema-diff` compares two snapshots of a schema and classifies
//! every change:
//! - Entities (tables) added, removed, modified or renamed
//! - Fields (columns) added, removed, modified or renamed
//! - Primary key, index and foreign key changes
//!
//! Every diff can produce its reverse, which is what a migration's
//! `down` step needs.
//!
//! # Architecture
//!
//! - **Schema** - The input graph: `Database`, `Entity`, `Field`, `Index`, `Relation`
//! - **Comparators** - `FieldComparator`, `IndexComparator`, `RelationComparator`,
//!   `EntityComparator` and `DatabaseComparator`, composed bottom-up
//! - **Diffs** - `FieldDiff`, `EntityDiff` and `DatabaseDiff`
//! - **Platform** - Normalization and column DDL used to ignore cosmetic changes
//!
//! # Example
//!
//! ```rust
//! use oxide_schema_diff::prelude::*;
//!
//! let from = Database::new("app").entity(
//!     Entity::new("user")
//!         .field(Field::new("id", ColumnType::Integer).primary_key())
//!         .field(Field::new("email", ColumnType::Varchar).size(255).not_null()),
//! );
//! let to = Database::new("app").entity(
//!     Entity::new("user")
//!         .field(Field::new("id", ColumnType::Integer).primary_key())
//!         .field(Field::new("email", ColumnType::Varchar).size(255).not_null())
//!         .field(Field::new("age", ColumnType::Integer)),
//! );
//!
//! let diff = DatabaseComparator::compute_diff(&from, &to, &ComparatorOptions::new(), None)?
//!     .expect("age was added");
//! assert!(diff.modified_entities()["user"].added_fields().contains_key("age"));
//!
//! let down = diff.reverse();
//! assert!(down.modified_entities()["user"].removed_fields().contains_key("age"));
//! # Ok::<(), oxide_schema_diff::error::DiffError>(())
//! ```

pub mod comparator;
pub mod diff;
pub mod error;
pub mod options;
pub mod platform;
pub mod schema;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::comparator::{
        DatabaseComparator, EntityComparator, FieldComparator, IndexComparator, RelationComparator,
    };
    pub use crate::diff::{
        ChangedProperties, DatabaseDiff, EntityDiff, FieldDiff, FieldProperty, PropertyChange,
        PropertyValue,
    };
    pub use crate::error::{DiffError, Result, SchemaError};
    pub use crate::options::{ComparatorOptions, Exclusions};
    pub use crate::platform::{GenericPlatform, Platform, SqlitePlatform};
    pub use crate::schema::{
        ColumnType, Database, DefaultKind, Domain, Entity, Field, FieldDefault, Index, IndexField,
        Reference, ReferentialAction, Relation,
    };
}
