//! Field-level diff.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::schema::{ColumnType, DefaultKind, Field};

/// A field property the comparator inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldProperty {
    /// Domain scale.
    Scale,
    /// Domain size.
    Size,
    /// Physical SQL type.
    SqlType,
    /// Logical type.
    Type,
    /// NOT NULL flag.
    NotNull,
    /// Kind of the default value.
    DefaultValueType,
    /// Text of the default value.
    DefaultValueValue,
    /// Auto-increment flag.
    AutoIncrement,
}

impl FieldProperty {
    /// Returns the property name used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scale => "scale",
            Self::Size => "size",
            Self::SqlType => "sqlType",
            Self::Type => "type",
            Self::NotNull => "notNull",
            Self::DefaultValueType => "defaultValueType",
            Self::DefaultValueValue => "defaultValueValue",
            Self::AutoIncrement => "autoIncrement",
        }
    }
}

impl fmt::Display for FieldProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a property change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// The property is unset on this side.
    Absent,
    /// A size or scale.
    Number(u32),
    /// A SQL type name or default literal.
    Text(String),
    /// A boolean flag.
    Flag(bool),
    /// A logical type.
    Type(ColumnType),
    /// A default value kind.
    DefaultKind(DefaultKind),
}

impl From<Option<u32>> for PropertyValue {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Self::Absent, Self::Number)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<ColumnType> for PropertyValue {
    fn from(value: ColumnType) -> Self {
        Self::Type(value)
    }
}

impl From<DefaultKind> for PropertyValue {
    fn from(value: DefaultKind) -> Self {
        Self::DefaultKind(value)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("null"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Type(t) => f.write_str(t.default_sql_type()),
            Self::DefaultKind(DefaultKind::Value) => f.write_str("value"),
            Self::DefaultKind(DefaultKind::Expression) => f.write_str("expression"),
        }
    }
}

/// A `(from, to)` value pair for one property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PropertyChange {
    /// Value on the `from` side.
    pub from: PropertyValue,
    /// Value on the `to` side.
    pub to: PropertyValue,
}

impl PropertyChange {
    /// Creates a change.
    #[must_use]
    pub fn new(from: impl Into<PropertyValue>, to: impl Into<PropertyValue>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Returns the change with both sides swapped.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

/// Changed properties keyed by property, in a stable order.
pub type ChangedProperties = BTreeMap<FieldProperty, PropertyChange>;

/// Structural difference between two versions of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    from_field: Field,
    to_field: Field,
    changed_properties: ChangedProperties,
}

impl FieldDiff {
    /// Creates a diff from its parts.
    #[must_use]
    pub const fn new(
        from_field: Field,
        to_field: Field,
        changed_properties: ChangedProperties,
    ) -> Self {
        Self {
            from_field,
            to_field,
            changed_properties,
        }
    }

    /// The field before the change.
    #[must_use]
    pub const fn from_field(&self) -> &Field {
        &self.from_field
    }

    /// The field after the change.
    #[must_use]
    pub const fn to_field(&self) -> &Field {
        &self.to_field
    }

    /// Every changed property.
    #[must_use]
    pub const fn changed_properties(&self) -> &ChangedProperties {
        &self.changed_properties
    }

    /// Looks up the change of a single property.
    #[must_use]
    pub fn changed(&self, property: FieldProperty) -> Option<&PropertyChange> {
        self.changed_properties.get(&property)
    }

    /// Returns the diff that turns `to` back into `from`.
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self {
            from_field: self.to_field.clone(),
            to_field: self.from_field.clone(),
            changed_properties: self
                .changed_properties
                .iter()
                .map(|(property, change)| (*property, change.reversed()))
                .collect(),
        }
    }
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.from_field.name)?;
        writeln!(f, "  modifiedProperties:")?;
        for (property, change) in &self.changed_properties {
            writeln!(f, "    {property}: {} => {}", change.from, change.to)?;
        }
        Ok(())
    }
}
