//! SQLite platform.
//!
//! SQLite stores values by type affinity, so many declared types collapse
//! to the same storage class. Column DDL is rendered with the affinity
//! rather than the declared type, which makes e.g. `VARCHAR(255)` and
//! `TEXT` indistinguishable to the field comparator.

use crate::error::{DiffError, Result};
use crate::schema::{Entity, Field};

use super::{normalize_sql_type, Platform};

/// SQLite platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlitePlatform;

impl SqlitePlatform {
    /// Creates a new SQLite platform.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Resolves a declared type to its SQLite affinity.
    ///
    /// Follows the rules of section 3.1 of the SQLite datatype docs, in
    /// order: INT, then CHAR/CLOB/TEXT, then BLOB (or no type), then
    /// REAL/FLOA/DOUB, otherwise NUMERIC.
    #[must_use]
    pub fn affinity(declared: &str) -> &'static str {
        let declared = declared.to_ascii_uppercase();
        if declared.contains("INT") {
            "INTEGER"
        } else if ["CHAR", "CLOB", "TEXT"].iter().any(|t| declared.contains(t)) {
            "TEXT"
        } else if declared.contains("BLOB") || declared.trim().is_empty() {
            "BLOB"
        } else if ["REAL", "FLOA", "DOUB"].iter().any(|t| declared.contains(t)) {
            "REAL"
        } else {
            "NUMERIC"
        }
    }
}

impl Platform for SqlitePlatform {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn normalize_entity(&self, entity: &mut Entity) -> Result<()> {
        for field in &mut entity.fields {
            normalize_sql_type(field);
            // AUTOINCREMENT is only valid on an INTEGER PRIMARY KEY
            if field.auto_increment && !field.primary_key {
                return Err(DiffError::Platform {
                    platform: self.name().to_string(),
                    message: format!(
                        "AUTOINCREMENT on non-primary-key field {}.{}",
                        entity.name, field.name
                    ),
                });
            }
        }
        Ok(())
    }

    fn sql_type_name(&self, field: &Field) -> String {
        let declared = if field.domain.sql_type.is_empty() {
            field.domain.column_type.default_sql_type()
        } else {
            field.domain.sql_type.as_str()
        };
        Self::affinity(declared).to_string()
    }

    fn auto_increment_keyword(&self) -> &'static str {
        " AUTOINCREMENT"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    #[test]
    fn affinity_rules() {
        assert_eq!(SqlitePlatform::affinity("BIGINT"), "INTEGER");
        assert_eq!(SqlitePlatform::affinity("varchar"), "TEXT");
        assert_eq!(SqlitePlatform::affinity("CLOB"), "TEXT");
        assert_eq!(SqlitePlatform::affinity(""), "BLOB");
        assert_eq!(SqlitePlatform::affinity("DOUBLE"), "REAL");
        assert_eq!(SqlitePlatform::affinity("DECIMAL"), "NUMERIC");
        assert_eq!(SqlitePlatform::affinity("BOOLEAN"), "NUMERIC");
        // "POINT" contains INT
        assert_eq!(SqlitePlatform::affinity("POINT"), "INTEGER");
    }

    #[test]
    fn varchar_and_text_render_alike() {
        let p = SqlitePlatform::new();
        let a = Field::new("title", ColumnType::Varchar).size(255);
        let b = Field::new("title", ColumnType::LongVarchar);
        assert_eq!(p.column_ddl(&a), p.column_ddl(&b));
        assert_eq!(p.column_ddl(&a), "\"title\" TEXT");
    }

    #[test]
    fn rejects_autoincrement_outside_primary_key() {
        let p = SqlitePlatform::new();
        let counter = Field::new("n", ColumnType::Integer).auto_increment();
        let mut e = Entity::new("t").field(counter);
        let err = p.normalize_entity(&mut e).unwrap_err();
        assert!(matches!(err, DiffError::Platform { ref platform, .. } if platform == "sqlite"));
    }
}
