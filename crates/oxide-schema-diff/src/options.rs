//! Comparator configuration.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DiffError, Result};

/// Options for the database comparator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparatorOptions {
    /// Commit detected entity renames instead of reporting them as possible.
    pub with_renaming: bool,
    /// Report entities missing from the target as removed.
    pub remove_entity: bool,
    /// Entity names skipped entirely. `*` matches any run of characters.
    pub excluded_entities: Vec<String>,
    /// Match entity, field, index and relation names ignoring ASCII case.
    pub case_insensitive: bool,
    /// Validate both schemas before comparing them.
    pub validate_inputs: bool,
}

impl Default for ComparatorOptions {
    fn default() -> Self {
        Self {
            with_renaming: false,
            remove_entity: true,
            excluded_entities: Vec::new(),
            case_insensitive: false,
            validate_inputs: false,
        }
    }
}

impl ComparatorOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from a JSON document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `DiffError::Config` if the document is not valid JSON or a
    /// key has the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Enables committing entity renames.
    #[must_use]
    pub const fn with_renaming(mut self) -> Self {
        self.with_renaming = true;
        self
    }

    /// Sets whether removed entities are reported.
    #[must_use]
    pub const fn remove_entity(mut self, remove: bool) -> Self {
        self.remove_entity = remove;
        self
    }

    /// Excludes an entity name or wildcard pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excluded_entities.push(pattern.into());
        self
    }

    /// Enables case-insensitive name matching.
    #[must_use]
    pub const fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Enables input validation.
    #[must_use]
    pub const fn validate_inputs(mut self) -> Self {
        self.validate_inputs = true;
        self
    }

    /// Compiles the exclusion list.
    ///
    /// # Errors
    ///
    /// Returns `DiffError::Exclusion` if a pattern cannot be compiled.
    pub fn exclusions(&self) -> Result<Exclusions> {
        Exclusions::new(&self.excluded_entities, self.case_insensitive)
    }
}

/// Compiled entity exclusion list.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    patterns: Vec<Regex>,
}

impl Exclusions {
    /// Compiles names and `*` patterns. Other characters match literally.
    ///
    /// # Errors
    ///
    /// Returns `DiffError::Exclusion` if a pattern exceeds the regex size
    /// limit.
    pub fn new(patterns: &[String], case_insensitive: bool) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let body = pattern
                    .split('*')
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(".*");
                let flags = if case_insensitive { "(?i)" } else { "" };
                Regex::new(&format!("{flags}^{body}$")).map_err(|source| DiffError::Exclusion {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Returns whether an entity name is excluded.
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(name))
    }
}
