//! Shared test utilities for the FAQ sync crates
//!
//! - `TestDatabase`: PostgreSQL container with migrations applied (feature: "postgres")
//! - `TestDataBuilder`: ids and questions derived from a seed, stable across runs
//! - `assertions`: assertion helpers with context messages
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! # async fn example() {
//! let db = TestDatabase::new().await;
//! let builder = TestDataBuilder::from_test_name("bulk_upload_skips_duplicates");
//!
//! let chatbot_id = builder.chatbot_id();
//! let question = builder.question("billing");
//! # }
//! ```

use std::hash::{DefaultHasher, Hash, Hasher};

use uuid::Uuid;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Seeded generator for chatbot ids, FAQ ids and question text
///
/// Two builders with the same seed produce the same values, so a failing
/// test can be rerun against identical data.
#[derive(Debug, Clone, Copy)]
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the hash of the test name
    pub fn from_test_name(name: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    pub fn chatbot_id(&self) -> Uuid {
        Uuid::from_u64_pair(self.seed, !self.seed)
    }

    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.question("refunds"), "How do refunds work? (test 7)");
    /// ```
    pub fn question(&self, topic: &str) -> String {
        format!("How do {} work? (test {})", topic, self.seed)
    }

    /// FAQ id in the `faq_` namespace used by the record store
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.faq_id("main"), "faq_test_7_main");
    /// ```
    pub fn faq_id(&self, suffix: &str) -> String {
        format!("faq_test_{}_{}", self.seed, suffix)
    }
}

/// Test assertion helpers
pub mod assertions {
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    /// Unwrap `value`, failing the test with `context` on `None`
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
