//! Error types for schema validation and diff computation.

/// Violations of the schema graph invariants.
///
/// These are caller-contract errors: the comparators assume a well-formed
/// graph, so they should be caught when the graph is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Two entities in one database share a name.
    #[error("Duplicate entity '{entity}' in database '{database}'")]
    DuplicateEntity {
        /// Database name.
        database: String,
        /// The repeated entity name.
        entity: String,
    },

    /// Two fields in one entity share a name.
    #[error("Duplicate field '{field}' in entity '{entity}'")]
    DuplicateField {
        /// Entity name.
        entity: String,
        /// The repeated field name.
        field: String,
    },

    /// Two indexes (plain or unique) in one entity share a name.
    #[error("Duplicate index '{index}' in entity '{entity}'")]
    DuplicateIndex {
        /// Entity name.
        entity: String,
        /// The repeated index name.
        index: String,
    },

    /// Two relations in one entity share a name.
    #[error("Duplicate relation '{relation}' in entity '{entity}'")]
    DuplicateRelation {
        /// Entity name.
        entity: String,
        /// The repeated relation name.
        relation: String,
    },

    /// An index refers to a field the entity does not define.
    #[error("Index '{index}' on entity '{entity}' references unknown field '{field}'")]
    UnknownIndexField {
        /// Entity name.
        entity: String,
        /// Index name.
        index: String,
        /// The missing field.
        field: String,
    },

    /// A relation refers to a local field the entity does not define.
    #[error("Relation '{relation}' on entity '{entity}' references unknown field '{field}'")]
    UnknownRelationField {
        /// Entity name.
        entity: String,
        /// Relation name.
        relation: String,
        /// The missing field.
        field: String,
    },

    /// A relation has no reference pairs.
    #[error("Relation '{relation}' on entity '{entity}' has no references")]
    EmptyRelation {
        /// Entity name.
        entity: String,
        /// Relation name.
        relation: String,
    },

    /// A referential action token could not be parsed.
    #[error("Unknown referential action '{0}'")]
    UnknownAction(String),

    /// Multiple violations were found.
    #[error("Multiple schema errors:\n{}", bullet_list(.0))]
    Multiple(Vec<SchemaError>),
}

fn bullet_list(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl SchemaError {
    /// Collapses a list of violations into a single error.
    ///
    /// Returns `Ok(())` for an empty list.
    ///
    /// # Errors
    ///
    /// Returns the only error of a one-element list, or
    /// `SchemaError::Multiple` for longer lists.
    pub fn from_list(mut errors: Vec<Self>) -> std::result::Result<(), Self> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Self::Multiple(errors)),
        }
    }
}

/// Errors that can occur while computing a diff.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// One of the input schemas violates the graph invariants.
    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// The platform collaborator failed while normalizing an entity.
    #[error("Platform '{platform}' failed: {message}")]
    Platform {
        /// Platform name.
        platform: String,
        /// Error message.
        message: String,
    },

    /// Comparator configuration could not be parsed.
    #[error("Invalid comparator configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// An exclusion pattern could not be compiled.
    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    Exclusion {
        /// The offending pattern.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

/// Result type for diff operations.
pub type Result<T> = std::result::Result<T, DiffError>;
