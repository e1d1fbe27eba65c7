//! Database platform collaborators.
//!
//! A platform canonicalizes entities before they are compared and renders
//! single-column DDL, which the field comparator uses to discard
//! differences that the platform cannot express (two spellings of the same
//! type, for example).

mod generic;
mod sqlite;

pub use generic::GenericPlatform;
pub use sqlite::SqlitePlatform;

use crate::error::Result;
use crate::schema::{DefaultKind, Entity, Field, FieldDefault};

/// Trait for platform-specific normalization and column DDL rendering.
pub trait Platform: Send + Sync {
    /// Returns the platform name.
    fn name(&self) -> &'static str;

    /// Canonicalizes an entity in place before comparison.
    ///
    /// The default fills empty SQL types from the logical type and
    /// upper-cases them.
    ///
    /// # Errors
    ///
    /// Returns `DiffError::Platform` if the entity cannot be represented
    /// on this platform.
    fn normalize_entity(&self, entity: &mut Entity) -> Result<()> {
        for field in &mut entity.fields {
            normalize_sql_type(field);
        }
        Ok(())
    }

    /// Returns the rendered SQL type of a field, including size and scale.
    fn sql_type_name(&self, field: &Field) -> String {
        let domain = &field.domain;
        let base = if domain.sql_type.is_empty() {
            domain.column_type.default_sql_type().to_string()
        } else {
            domain.sql_type.to_ascii_uppercase()
        };
        if !domain.column_type.is_sized() {
            return base;
        }
        match (domain.size, domain.scale) {
            (Some(size), Some(scale)) => format!("{base}({size}, {scale})"),
            (Some(size), None) => format!("{base}({size})"),
            _ => base,
        }
    }

    /// Renders the column definition used in CREATE/ALTER TABLE.
    fn column_ddl(&self, field: &Field) -> String {
        let mut sql = format!(
            "{} {}",
            self.quote_identifier(&field.name),
            self.sql_type_name(field)
        );

        if let Some(ref default) = field.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.default_sql(default));
        }

        if field.not_null {
            sql.push_str(" NOT NULL");
        }

        if field.auto_increment {
            sql.push_str(self.auto_increment_keyword());
        }

        sql
    }

    /// Renders a default value.
    fn default_sql(&self, default: &FieldDefault) -> String {
        match default.kind {
            DefaultKind::Expression => default.literal.clone(),
            DefaultKind::Value if is_bare_literal(&default.literal) => {
                default.literal.to_ascii_uppercase()
            }
            DefaultKind::Value => format!("'{}'", default.literal.replace('\'', "''")),
        }
    }

    /// Returns the auto-increment keyword, including its leading space.
    fn auto_increment_keyword(&self) -> &'static str;

    /// Returns the identifier quote character.
    fn quote_char(&self) -> char {
        '"'
    }

    /// Quotes an identifier, doubling embedded quote characters.
    fn quote_identifier(&self, name: &str) -> String {
        let q = self.quote_char();
        let escaped = name.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }
}

/// Fills an empty SQL type from the logical type and upper-cases it.
pub(crate) fn normalize_sql_type(field: &mut Field) {
    let domain = &mut field.domain;
    if domain.sql_type.trim().is_empty() {
        domain.sql_type = domain.column_type.default_sql_type().to_string();
    } else {
        domain.sql_type = domain.sql_type.trim().to_ascii_uppercase();
    }
}

/// Returns whether a literal default can be emitted without quotes.
fn is_bare_literal(literal: &str) -> bool {
    literal.parse::<f64>().is_ok()
        || ["TRUE", "FALSE", "NULL"]
            .iter()
            .any(|k| k.eq_ignore_ascii_case(literal))
}
