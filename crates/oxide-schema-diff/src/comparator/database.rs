//! Database comparison.

use std::collections::BTreeSet;

use tracing::{debug, info, trace};

use crate::diff::DatabaseDiff;
use crate::error::Result;
use crate::options::{ComparatorOptions, Exclusions};
use crate::platform::Platform;
use crate::schema::{Database, Entity};

use super::EntityComparator;

/// Compares two versions of a database.
///
/// Inputs are cloned before the platform normalizes them, so the caller's
/// schemas are never modified.
pub struct DatabaseComparator<'a> {
    options: ComparatorOptions,
    exclusions: Exclusions,
    platform: Option<&'a dyn Platform>,
}

impl<'a> DatabaseComparator<'a> {
    /// Creates a comparator, compiling the exclusion patterns.
    ///
    /// # Errors
    ///
    /// Returns `DiffError::Exclusion` if an exclusion pattern is invalid.
    pub fn new(options: ComparatorOptions) -> Result<Self> {
        let exclusions = options.exclusions()?;
        Ok(Self {
            options,
            exclusions,
            platform: None,
        })
    }

    /// Normalizes entities with `platform` and uses it for the field DDL
    /// equivalence check.
    #[must_use]
    pub const fn with_platform(mut self, platform: &'a dyn Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Compares two databases in one call.
    ///
    /// Returns `None` when no difference was found.
    ///
    /// # Errors
    ///
    /// See [`DatabaseComparator::new`] and [`DatabaseComparator::compare`].
    pub fn compute_diff(
        from: &Database,
        to: &Database,
        options: &ComparatorOptions,
        platform: Option<&'a dyn Platform>,
    ) -> Result<Option<DatabaseDiff>> {
        let mut comparator = Self::new(options.clone())?;
        if let Some(platform) = platform {
            comparator = comparator.with_platform(platform);
        }
        comparator.diff(from, to)
    }

    /// Returns the diff between two databases, or `None` if they are equal.
    ///
    /// # Errors
    ///
    /// See [`DatabaseComparator::compare`].
    pub fn diff(&self, from: &Database, to: &Database) -> Result<Option<DatabaseDiff>> {
        let (diff, differences) = self.compare(from, to)?;
        Ok((differences > 0).then_some(diff))
    }

    /// Validates and normalizes both inputs, then builds the diff and counts
    /// its differences.
    ///
    /// # Errors
    ///
    /// Returns `DiffError::Schema` when `validate_inputs` is set and either
    /// database is malformed, and any error raised by
    /// [`Platform::normalize_entity`] unchanged.
    pub fn compare(&self, from: &Database, to: &Database) -> Result<(DatabaseDiff, usize)> {
        if self.options.validate_inputs {
            from.validate(self.options.case_insensitive)?;
            to.validate(self.options.case_insensitive)?;
        }

        let mut from = from.clone();
        let mut to = to.clone();
        if let Some(platform) = self.platform {
            for entity in from.entities.iter_mut().chain(to.entities.iter_mut()) {
                platform.normalize_entity(entity)?;
            }
        }

        let mut diff = DatabaseDiff::new(from, to);
        let differences = self.compare_entities(&mut diff);

        info!(
            from = %diff.from_database.name,
            to = %diff.to_database.name,
            differences,
            "Compared databases"
        );

        Ok((diff, differences))
    }

    /// Fills the entity buckets of `diff` and returns the difference count.
    ///
    /// Excluded entities are skipped on both sides. Entities flagged
    /// `skip_sql` are never added or removed, but are still compared when
    /// present on both sides.
    pub fn compare_entities(&self, diff: &mut DatabaseDiff) -> usize {
        let DatabaseDiff {
            from_database,
            to_database,
            added_entities,
            removed_entities,
            modified_entities,
            renamed_entities,
            possible_renamed_entities,
        } = diff;
        let case_insensitive = self.options.case_insensitive;
        let comparator = self.entity_comparator();
        let mut differences = 0;

        for entity in self.included_entities(to_database) {
            if !entity.skip_sql
                && from_database
                    .find_entity(&entity.name, case_insensitive)
                    .is_none()
            {
                trace!(entity = %entity.name, "Added entity");
                added_entities.insert(entity.name.clone(), entity.clone());
                differences += 1;
            }
        }

        for entity in self.included_entities(from_database) {
            match to_database.find_entity(&entity.name, case_insensitive) {
                None if self.options.remove_entity && !entity.skip_sql => {
                    trace!(entity = %entity.name, "Removed entity");
                    removed_entities.insert(entity.name.clone(), entity.clone());
                    differences += 1;
                }
                None => {}
                Some(to_entity) => {
                    if let Some(entity_diff) = comparator.compute_diff(entity, to_entity) {
                        modified_entities.insert(entity.name.clone(), entity_diff);
                        differences += 1;
                    }
                }
            }
        }

        let mut taken: BTreeSet<String> = BTreeSet::new();
        let mut renames: Vec<(String, String)> = Vec::new();
        for (new_name, added) in added_entities.iter() {
            let candidate = removed_entities.iter().find(|(old_name, removed)| {
                !taken.contains(*old_name) && comparator.compute_diff(added, removed).is_none()
            });
            let Some((old_name, _)) = candidate else {
                continue;
            };
            let (old_name, new_name) = (old_name.clone(), new_name.clone());
            if self.options.with_renaming {
                taken.insert(old_name.clone());
                renames.push((old_name, new_name));
            } else {
                debug!(from = %old_name, to = %new_name, "Possible entity rename");
                possible_renamed_entities.insert(old_name, new_name);
            }
        }

        for (old_name, new_name) in renames {
            added_entities.remove(&new_name);
            removed_entities.remove(&old_name);
            debug!(from = %old_name, to = %new_name, "Detected entity rename");
            renamed_entities.insert(old_name, new_name);
            differences -= 1;
        }

        differences
    }

    fn entity_comparator(&self) -> EntityComparator<'a> {
        let case_insensitive = self.options.case_insensitive;
        let comparator = EntityComparator::new().case_insensitive(case_insensitive);
        match self.platform {
            Some(platform) => comparator.with_platform(platform),
            None => comparator,
        }
    }

    /// Entities not matched by an exclusion pattern.
    fn included_entities<'d>(
        &'d self,
        database: &'d Database,
    ) -> impl Iterator<Item = &'d Entity> {
        let exclusions = &self.exclusions;
        database.entities.iter().filter(move |entity| {
            let excluded = exclusions.is_excluded(&entity.name);
            if excluded {
                debug!(entity = %entity.name, "Skipping excluded entity");
            }
            !excluded
        })
    }
}
