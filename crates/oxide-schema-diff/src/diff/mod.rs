//! Diff value objects.
//!
//! A diff is built once by a comparator and never changes afterwards.
//! Every diff can produce its reverse, the diff that would turn the `to`
//! schema back into the `from` schema.

mod database;
mod entity;
mod field;

pub use database::DatabaseDiff;
pub use entity::EntityDiff;
pub use field::{ChangedProperties, FieldDiff, FieldProperty, PropertyChange, PropertyValue};
