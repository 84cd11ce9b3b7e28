//! The AI generation boundary.
//!
//! The session reaches the model through one narrow, object-safe trait:
//! [`Generator`] takes a prompt plus the JSON schema the response must
//! satisfy and returns raw JSON. Everything typed lives on this side of the
//! boundary: [`requests`] builds the per-capability prompt/schema pairs and
//! [`contract`] validates and decodes the raw JSON into plan records. Keeping
//! the trait this thin makes a scripted in-memory generator trivial to write
//! for tests.

pub mod contract;
pub mod requests;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// One generation call: the prompt text and the response schema the model
/// is instructed to follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// A JSON schema object in the Gemini `responseSchema` dialect.
    pub schema: Value,
}

/// Failure modes of a generation call.
///
/// `Transport` and `Api` originate in the concrete generator; `MalformedJson`
/// and `Contract` are raised here when decoding the response. All of them
/// surface to the caller as a failed operation that leaves the plan
/// untouched.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request never produced a response (connect, timeout, I/O).
    #[error("generation transport failure: {0}")]
    Transport(String),

    /// The backing service answered with an error.
    #[error("generation service error: {0}")]
    Api(String),

    /// The response body was not valid JSON.
    #[error("generation response is not valid JSON: {0}")]
    MalformedJson(String),

    /// The response was valid JSON but violated the capability contract.
    #[error("generation response violates contract: {0}")]
    Contract(String),
}

/// The AI generation capability.
///
/// # Object Safety
///
/// This trait is object-safe: the session holds it as
/// `Box<dyn Generator>` so tests can substitute a scripted generator.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Execute one structured-output generation call.
    ///
    /// Implementations return the decoded JSON body on success; they do not
    /// validate it against the schema. Contract checking happens in
    /// [`contract`].
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError>;
}

// Compile-time assertion: Generator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Generator) {}
};
