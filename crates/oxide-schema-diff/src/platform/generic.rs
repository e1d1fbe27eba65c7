//! Platform-neutral rendering based on ANSI SQL spellings.

use super::Platform;

/// ANSI-flavoured platform used when no specific database is targeted.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericPlatform;

impl GenericPlatform {
    /// Creates a new generic platform.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Platform for GenericPlatform {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn auto_increment_keyword(&self) -> &'static str {
        " GENERATED BY DEFAULT AS IDENTITY"
    }
}
