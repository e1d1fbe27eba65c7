//! Column comparison.

use tracing::debug;

use crate::diff::{ChangedProperties, FieldDiff, FieldProperty, PropertyChange, PropertyValue};
use crate::platform::Platform;
use crate::schema::Field;

/// Compares two versions of a field.
#[derive(Clone, Copy, Default)]
pub struct FieldComparator<'a> {
    platform: Option<&'a dyn Platform>,
}

impl<'a> FieldComparator<'a> {
    /// Creates a comparator without a platform.
    #[must_use]
    pub const fn new() -> Self {
        Self { platform: None }
    }

    /// Creates a comparator that discards differences the platform renders
    /// identically.
    #[must_use]
    pub const fn with_platform(platform: &'a dyn Platform) -> Self {
        Self {
            platform: Some(platform),
        }
    }

    /// Returns every property that differs between `from` and `to`.
    ///
    /// The field name is not compared.
    #[must_use]
    pub fn compare_fields(from: &Field, to: &Field) -> ChangedProperties {
        let mut changes = ChangedProperties::new();
        let (from_domain, to_domain) = (&from.domain, &to.domain);

        if from_domain.scale != to_domain.scale {
            changes.insert(
                FieldProperty::Scale,
                PropertyChange::new(from_domain.scale, to_domain.scale),
            );
        }
        if from_domain.size != to_domain.size {
            changes.insert(
                FieldProperty::Size,
                PropertyChange::new(from_domain.size, to_domain.size),
            );
        }

        let (from_sql, to_sql) = (&from_domain.sql_type, &to_domain.sql_type);
        if !from_sql.eq_ignore_ascii_case(to_sql) {
            changes.insert(
                FieldProperty::SqlType,
                PropertyChange::new(from_sql.as_str(), to_sql.as_str()),
            );
            if from_domain.column_type != to_domain.column_type {
                changes.insert(
                    FieldProperty::Type,
                    PropertyChange::new(from_domain.column_type, to_domain.column_type),
                );
            }
        }

        if from.not_null != to.not_null {
            changes.insert(
                FieldProperty::NotNull,
                PropertyChange::new(from.not_null, to.not_null),
            );
        }

        match (&from.default, &to.default) {
            (Some(default), None) => {
                changes.insert(
                    FieldProperty::DefaultValueType,
                    PropertyChange::new(default.kind, PropertyValue::Absent),
                );
                changes.insert(
                    FieldProperty::DefaultValueValue,
                    PropertyChange::new(default.literal.as_str(), PropertyValue::Absent),
                );
            }
            (None, Some(default)) => {
                changes.insert(
                    FieldProperty::DefaultValueType,
                    PropertyChange::new(PropertyValue::Absent, default.kind),
                );
                changes.insert(
                    FieldProperty::DefaultValueValue,
                    PropertyChange::new(PropertyValue::Absent, default.literal.as_str()),
                );
            }
            (Some(a), Some(b)) if !a.equivalent(b) => {
                if a.kind != b.kind {
                    changes.insert(
                        FieldProperty::DefaultValueType,
                        PropertyChange::new(a.kind, b.kind),
                    );
                }
                if a.literal != b.literal {
                    changes.insert(
                        FieldProperty::DefaultValueValue,
                        PropertyChange::new(a.literal.as_str(), b.literal.as_str()),
                    );
                }
            }
            _ => {}
        }

        if from.auto_increment != to.auto_increment {
            changes.insert(
                FieldProperty::AutoIncrement,
                PropertyChange::new(from.auto_increment, to.auto_increment),
            );
        }

        changes
    }

    /// Returns the diff between two fields, or `None` if they are equal.
    ///
    /// With a platform, fields whose column DDL renders identically are
    /// equal even when their properties differ.
    #[must_use]
    pub fn compute_diff(&self, from: &Field, to: &Field) -> Option<FieldDiff> {
        let changes = Self::compare_fields(from, to);
        if changes.is_empty() {
            return None;
        }

        if let Some(platform) = self.platform {
            let from_ddl = platform.column_ddl(from);
            if from_ddl == platform.column_ddl(to) {
                debug!(
                    field = %from.name,
                    platform = platform.name(),
                    ddl = %from_ddl,
                    "Ignoring field changes with identical DDL"
                );
                return None;
            }
        }

        Some(FieldDiff::new(from.clone(), to.clone(), changes))
    }
}
