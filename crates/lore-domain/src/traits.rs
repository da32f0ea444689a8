//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

/// A schema-constrained generation request
///
/// The provider receives the two messages in order and must answer with a
/// JSON value conforming to `schema`.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    /// System instruction defining the task
    pub system: &'a str,

    /// User instruction carrying the query and its context
    pub user: &'a str,

    /// Name of the target schema
    pub schema_name: &'a str,

    /// Target JSON schema, serialized
    pub schema: &'a str,
}

/// Trait for language model providers with structured output
///
/// Implemented by the infrastructure layer (lore-llm)
pub trait GenerationProvider {
    /// Error type for generation operations
    type Error;

    /// Identifier of the model answering requests
    fn model_name(&self) -> &str;

    /// Generate a JSON document conforming to the request's schema
    ///
    /// Returns the raw JSON text; validating it is the caller's job.
    fn generate_structured(&self, request: &GenerationRequest<'_>) -> Result<String, Self::Error>;
}
