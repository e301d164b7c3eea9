use async_trait::async_trait;

use crate::error::FaqResult;

/// Turns text into a fixed-length dense vector via an external model
///
/// Implementations return the first error they hit; retry and fallback
/// policy belong to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorGenerator: Send + Sync {
    /// Output dimensionality
    fn dimension(&self) -> usize;

    /// Embed a single text
    async fn embed(&self, text: &str) -> FaqResult<Vec<f32>>;
}

/// Placeholder vector used when embedding fails, every component set to `value`
pub fn fallback_vector(dimension: usize, value: f32) -> Vec<f32> {
    vec![value; dimension]
}
