//! Schema graph types.
//!
//! These types describe the structure of a relational database (entities,
//! fields, indexes and relations) as handed over by a schema loader. The
//! comparators read them; they never build them.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Compares two identifiers, optionally ignoring ASCII case.
pub(crate) fn names_match(a: &str, b: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// Key under which a name is deduplicated.
fn name_key(name: &str, case_insensitive: bool) -> Cow<'_, str> {
    if case_insensitive {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

/// Logical column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    /// Boolean.
    Boolean,
    /// Tiny integer (8-bit).
    TinyInt,
    /// Small integer (16-bit).
    SmallInt,
    /// Integer (32-bit).
    Integer,
    /// Big integer (64-bit).
    BigInt,
    /// Floating point (single precision).
    Float,
    /// Floating point (real).
    Real,
    /// Floating point (double precision).
    Double,
    /// Fixed-point decimal.
    Decimal,
    /// Numeric (alias for Decimal on most platforms).
    Numeric,
    /// Fixed-length character string.
    Char,
    /// Variable-length character string.
    Varchar,
    /// Long variable-length character string.
    LongVarchar,
    /// Character large object.
    Clob,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Date and time.
    Timestamp,
    /// Fixed-length binary data.
    Binary,
    /// Variable-length binary data.
    VarBinary,
    /// Binary large object.
    Blob,
    /// JSON document.
    Json,
    /// UUID.
    Uuid,
}

impl ColumnType {
    /// Returns the physical SQL type used when the loader supplies none.
    #[must_use]
    pub const fn default_sql_type(self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Float => "FLOAT",
            Self::Real => "REAL",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Numeric => "NUMERIC",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::LongVarchar => "TEXT",
            Self::Clob => "CLOB",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::Blob => "BLOB",
            Self::Json => "JSON",
            Self::Uuid => "UUID",
        }
    }

    /// Returns whether the `size` of the domain is meaningful for this type.
    #[must_use]
    pub const fn is_sized(self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::Varchar
                | Self::Binary
                | Self::VarBinary
                | Self::Decimal
                | Self::Numeric
        )
    }
}

/// Logical and physical type descriptor of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    /// Logical type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Physical SQL type name, compared case-insensitively.
    #[serde(default)]
    pub sql_type: String,
    /// Length or precision.
    #[serde(default)]
    pub size: Option<u32>,
    /// Scale for fixed-point types.
    #[serde(default)]
    pub scale: Option<u32>,
}

impl Domain {
    /// Creates a domain whose SQL type is the logical type's default.
    #[must_use]
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            sql_type: column_type.default_sql_type().to_string(),
            size: None,
            scale: None,
        }
    }
}

/// How a default value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultKind {
    /// A literal value.
    Value,
    /// A SQL expression (e.g. `CURRENT_TIMESTAMP`).
    Expression,
}

/// Spellings treated as the same "current time" default.
const CURRENT_TIME_EQUIVALENTS: [&str; 2] = ["CURRENT_TIMESTAMP", "NOW()"];

/// Default value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDefault {
    /// Literal value or expression.
    pub kind: DefaultKind,
    /// The raw text.
    pub literal: String,
}

impl FieldDefault {
    /// Creates a literal default.
    #[must_use]
    pub fn value(literal: impl Into<String>) -> Self {
        Self {
            kind: DefaultKind::Value,
            literal: literal.into(),
        }
    }

    /// Creates an expression default.
    #[must_use]
    pub fn expression(literal: impl Into<String>) -> Self {
        Self {
            kind: DefaultKind::Expression,
            literal: literal.into(),
        }
    }

    /// Returns whether two defaults are semantically equal.
    ///
    /// Kinds must match. `CURRENT_TIMESTAMP` and `NOW()` are equivalent.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        if self.literal == other.literal {
            return true;
        }
        let is_now = |s: &str| {
            CURRENT_TIME_EQUIVALENTS
                .iter()
                .any(|e| e.eq_ignore_ascii_case(s.trim()))
        };
        is_now(&self.literal) && is_now(&other.literal)
    }
}

/// A column of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Type descriptor.
    pub domain: Domain,
    /// Whether NULL is rejected.
    #[serde(default)]
    pub not_null: bool,
    /// Default value, if any.
    #[serde(default)]
    pub default: Option<FieldDefault>,
    /// Whether the field auto-increments.
    #[serde(default)]
    pub auto_increment: bool,
    /// Whether the field is part of the primary key.
    #[serde(default)]
    pub primary_key: bool,
}

impl Field {
    /// Creates a nullable field with the type's default SQL type.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            domain: Domain::new(column_type),
            not_null: false,
            default: None,
            auto_increment: false,
            primary_key: false,
        }
    }

    /// Sets the physical SQL type.
    #[must_use]
    pub fn sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.domain.sql_type = sql_type.into();
        self
    }

    /// Sets the size.
    #[must_use]
    pub fn size(mut self, size: u32) -> Self {
        self.domain.size = Some(size);
        self
    }

    /// Sets the scale.
    #[must_use]
    pub fn scale(mut self, scale: u32) -> Self {
        self.domain.scale = Some(scale);
        self
    }

    /// Marks the field NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Marks the field as part of the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true; // Primary keys are always NOT NULL
        self
    }

    /// Marks the field auto-incrementing.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets a literal default.
    #[must_use]
    pub fn default_value(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(FieldDefault::value(literal));
        self
    }

    /// Sets an expression default.
    #[must_use]
    pub fn default_expression(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(FieldDefault::expression(expr));
        self
    }
}

/// One position of an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexField {
    /// Indexed field name.
    pub name: String,
    /// Prefix length, if the index covers only part of the value.
    #[serde(default)]
    pub size: Option<u32>,
}

/// A plain or unique index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Indexed fields, in order.
    pub fields: Vec<IndexField>,
    /// Whether this is a unique index.
    #[serde(default)]
    pub unique: bool,
}

impl Index {
    /// Creates an empty plain index.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            unique: false,
        }
    }

    /// Creates an empty unique index.
    #[must_use]
    pub fn unique(name: impl Into<String>) -> Self {
        Self {
            unique: true,
            ..Self::new(name)
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(IndexField {
            name: name.into(),
            size: None,
        });
        self
    }

    /// Appends a field with a prefix length.
    #[must_use]
    pub fn field_with_size(mut self, name: impl Into<String>, size: u32) -> Self {
        self.fields.push(IndexField {
            name: name.into(),
            size: Some(size),
        });
        self
    }

    /// Returns whether `name` sits at `position`.
    ///
    /// When `size` is given, the field at that position must carry the
    /// same prefix length.
    #[must_use]
    pub fn has_field_at(
        &self,
        position: usize,
        name: &str,
        size: Option<u32>,
        case_insensitive: bool,
    ) -> bool {
        let Some(field) = self.fields.get(position) else {
            return false;
        };
        if !names_match(&field.name, name, case_insensitive) {
            return false;
        }
        size.is_none() || field.size == size
    }
}

/// Referential action of a foreign key.
///
/// Parsing is case-insensitive and accepts the spaced and unspaced forms
/// (`SET NULL`, `SETNULL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReferentialAction {
    /// No action clause.
    #[default]
    None,
    /// Cascade the change to referencing rows.
    Cascade,
    /// Set referencing fields to NULL.
    SetNull,
    /// Reject the change.
    Restrict,
    /// Set referencing fields to their default.
    SetDefault,
    /// Explicit NO ACTION.
    NoAction,
}

impl ReferentialAction {
    /// Returns the SQL representation, empty for [`ReferentialAction::None`].
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::Restrict => "RESTRICT",
            Self::SetDefault => "SET DEFAULT",
            Self::NoAction => "NO ACTION",
        }
    }
}

impl FromStr for ReferentialAction {
    type Err = SchemaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let token: String = s
            .split_whitespace()
            .collect::<String>()
            .to_ascii_uppercase();
        match token.as_str() {
            "" | "NONE" => Ok(Self::None),
            "CASCADE" => Ok(Self::Cascade),
            "SETNULL" => Ok(Self::SetNull),
            "RESTRICT" => Ok(Self::Restrict),
            "SETDEFAULT" => Ok(Self::SetDefault),
            "NOACTION" => Ok(Self::NoAction),
            _ => Err(SchemaError::UnknownAction(s.to_string())),
        }
    }
}

impl TryFrom<String> for ReferentialAction {
    type Error = SchemaError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReferentialAction> for String {
    fn from(action: ReferentialAction) -> Self {
        action.as_sql().to_string()
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("NONE"),
            other => f.write_str(other.as_sql()),
        }
    }
}

/// A (local field, foreign field) pair of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Field in the owning entity.
    pub local: String,
    /// Field in the target entity.
    pub foreign: String,
}

/// A foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// Constraint name.
    pub name: String,
    /// Owning entity name, taken from the parent entity when deserialized.
    #[serde(default)]
    pub entity: String,
    /// Target entity name.
    pub foreign_entity: String,
    /// Reference pairs, in declaration order.
    pub references: Vec<Reference>,
    /// ON UPDATE action.
    #[serde(default)]
    pub on_update: ReferentialAction,
    /// ON DELETE action.
    #[serde(default)]
    pub on_delete: ReferentialAction,
    /// Whether the constraint is excluded from DDL.
    #[serde(default)]
    pub skip_sql: bool,
}

impl Relation {
    /// Creates a relation pointing at `foreign_entity`.
    ///
    /// The owning entity is filled in by [`Entity::relation`].
    #[must_use]
    pub fn new(name: impl Into<String>, foreign_entity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity: String::new(),
            foreign_entity: foreign_entity.into(),
            references: Vec::new(),
            on_update: ReferentialAction::None,
            on_delete: ReferentialAction::None,
            skip_sql: false,
        }
    }

    /// Appends a reference pair.
    #[must_use]
    pub fn reference(mut self, local: impl Into<String>, foreign: impl Into<String>) -> Self {
        self.references.push(Reference {
            local: local.into(),
            foreign: foreign.into(),
        });
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Excludes the constraint from DDL.
    #[must_use]
    pub fn skip_sql(mut self) -> Self {
        self.skip_sql = true;
        self
    }

    /// Returns the local field names in declaration order.
    pub fn local_fields(&self) -> impl Iterator<Item = &str> {
        self.references.iter().map(|r| r.local.as_str())
    }

    /// Returns the foreign field names in declaration order.
    pub fn foreign_fields(&self) -> impl Iterator<Item = &str> {
        self.references.iter().map(|r| r.foreign.as_str())
    }
}

/// A table.
///
/// Deserialization fills in the owning entity of every relation, as
/// [`Entity::relation`] does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EntityRepr")]
pub struct Entity {
    /// Entity name.
    pub name: String,
    /// Fields, in declaration order.
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Plain indexes.
    #[serde(default)]
    pub indices: Vec<Index>,
    /// Unique indexes.
    #[serde(default)]
    pub uniques: Vec<Index>,
    /// Foreign keys.
    #[serde(default)]
    pub relations: Vec<Relation>,
    /// Whether the entity is excluded from DDL.
    #[serde(default)]
    pub skip_sql: bool,
}

#[derive(Deserialize)]
struct EntityRepr {
    name: String,
    #[serde(default)]
    fields: Vec<Field>,
    #[serde(default)]
    indices: Vec<Index>,
    #[serde(default)]
    uniques: Vec<Index>,
    #[serde(default)]
    relations: Vec<Relation>,
    #[serde(default)]
    skip_sql: bool,
}

impl From<EntityRepr> for Entity {
    fn from(repr: EntityRepr) -> Self {
        let mut entity = Self {
            name: repr.name,
            fields: repr.fields,
            indices: repr.indices,
            uniques: repr.uniques,
            relations: repr.relations,
            skip_sql: repr.skip_sql,
        };
        for relation in &mut entity.relations {
            relation.entity.clone_from(&entity.name);
        }
        entity
    }
}

impl Entity {
    /// Creates an empty entity.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            indices: Vec::new(),
            uniques: Vec::new(),
            relations: Vec::new(),
            skip_sql: false,
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a plain index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indices.push(index);
        self
    }

    /// Adds a unique index.
    #[must_use]
    pub fn unique(mut self, mut index: Index) -> Self {
        index.unique = true;
        self.uniques.push(index);
        self
    }

    /// Adds a foreign key owned by this entity.
    #[must_use]
    pub fn relation(mut self, mut relation: Relation) -> Self {
        relation.entity.clone_from(&self.name);
        self.relations.push(relation);
        self
    }

    /// Excludes the entity from DDL.
    #[must_use]
    pub fn skip_sql(mut self) -> Self {
        self.skip_sql = true;
        self
    }

    /// Gets a field by exact name.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.find_field(name, false)
    }

    /// Gets a field by name, optionally ignoring case.
    #[must_use]
    pub fn find_field(&self, name: &str, case_insensitive: bool) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| names_match(&f.name, name, case_insensitive))
    }

    /// Returns the primary-key fields in declaration order.
    pub fn primary_key(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.primary_key)
    }

    /// Returns plain indexes followed by unique indexes.
    pub fn all_indices(&self) -> impl Iterator<Item = &Index> {
        self.indices.iter().chain(self.uniques.iter())
    }

    /// Checks the entity's invariants, collecting every violation.
    ///
    /// With `case_insensitive`, names differing only in ASCII case count as
    /// duplicates.
    ///
    /// # Errors
    ///
    /// Returns the single violation found, or `SchemaError::Multiple`.
    pub fn validate(&self, case_insensitive: bool) -> std::result::Result<(), SchemaError> {
        SchemaError::from_list(self.violations(case_insensitive))
    }

    fn violations(&self, case_insensitive: bool) -> Vec<SchemaError> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(name_key(&field.name, case_insensitive)) {
                errors.push(SchemaError::DuplicateField {
                    entity: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for index in self.all_indices() {
            if !seen.insert(name_key(&index.name, case_insensitive)) {
                errors.push(SchemaError::DuplicateIndex {
                    entity: self.name.clone(),
                    index: index.name.clone(),
                });
            }
            for indexed in &index.fields {
                if self.find_field(&indexed.name, case_insensitive).is_none() {
                    errors.push(SchemaError::UnknownIndexField {
                        entity: self.name.clone(),
                        index: index.name.clone(),
                        field: indexed.name.clone(),
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        for relation in &self.relations {
            if !seen.insert(name_key(&relation.name, case_insensitive)) {
                errors.push(SchemaError::DuplicateRelation {
                    entity: self.name.clone(),
                    relation: relation.name.clone(),
                });
            }
            if relation.references.is_empty() {
                errors.push(SchemaError::EmptyRelation {
                    entity: self.name.clone(),
                    relation: relation.name.clone(),
                });
            }
            for local in relation.local_fields() {
                if self.find_field(local, case_insensitive).is_none() {
                    errors.push(SchemaError::UnknownRelationField {
                        entity: self.name.clone(),
                        relation: relation.name.clone(),
                        field: local.to_string(),
                    });
                }
            }
        }

        errors
    }
}

/// A database schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    /// Database name.
    pub name: String,
    /// Entities, in declaration order.
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Database {
    /// Creates an empty database.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: Vec::new(),
        }
    }

    /// Adds an entity.
    #[must_use]
    pub fn entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    /// Gets an entity by exact name.
    #[must_use]
    pub fn get_entity(&self, name: &str) -> Option<&Entity> {
        self.find_entity(name, false)
    }

    /// Gets an entity by name, optionally ignoring case.
    #[must_use]
    pub fn find_entity(&self, name: &str, case_insensitive: bool) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| names_match(&e.name, name, case_insensitive))
    }

    /// Gets a mutable entity by exact name.
    #[must_use]
    pub fn get_entity_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.name == name)
    }

    /// Checks the invariants of the database and every entity.
    ///
    /// See [`Entity::validate`] for `case_insensitive`.
    ///
    /// # Errors
    ///
    /// Returns the single violation found, or `SchemaError::Multiple`.
    pub fn validate(&self, case_insensitive: bool) -> std::result::Result<(), SchemaError> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        for entity in &self.entities {
            if !seen.insert(name_key(&entity.name, case_insensitive)) {
                errors.push(SchemaError::DuplicateEntity {
                    database: self.name.clone(),
                    entity: entity.name.clone(),
                });
            }
            errors.extend(entity.violations(case_insensitive));
        }
        SchemaError::from_list(errors)
    }
}
