//! Schema comparators.
//!
//! Each comparator is pure: it reads two schema objects and builds a new
//! diff without touching its inputs. [`DatabaseComparator`] composes
//! [`EntityComparator`], which composes the field, index and relation
//! comparators.

mod database;
mod entity;
mod field;
mod index;
mod relation;

pub use database::DatabaseComparator;
pub use entity::EntityComparator;
pub use field::FieldComparator;
pub use index::IndexComparator;
pub use relation::RelationComparator;
