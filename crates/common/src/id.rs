//! ID generation utilities.

use ulid::Ulid;
use uuid::Uuid;

/// ID generator for entities and auth tokens.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based entity ID.
    ///
    /// ULIDs are lexicographically sortable, so ordering by ID descending
    /// is also ordering by creation time descending.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate an opaque authentication token.
    ///
    /// Tokens are random UUIDs with no time component.
    #[must_use]
    pub fn generate_token(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
