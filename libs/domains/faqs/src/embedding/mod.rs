mod openai;
mod provider;

pub use openai::{OpenAIConfig, OpenAIVectorGenerator};
pub use provider::{VectorGenerator, fallback_vector};

#[cfg(test)]
pub use provider::MockVectorGenerator;
