//! Request and response types for the external generative service.

use crate::{error::ServiceError, schema::ResponseSchema};

/// One structured-generation request, built fresh for each chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest<'a> {
    /// Model identifier passed through to the service.
    pub model: &'a str,
    /// System instruction; opaque policy text controlled by the caller.
    pub instruction: &'a str,
    /// Entity the attributes belong to, when the preset carries one.
    pub entity: Option<&'a str>,
    /// Newline-joined attribute labels of the chunk.
    pub chunk_text: String,
    /// Shape the service must return.
    pub schema: &'a ResponseSchema,
}

impl GenerationRequest<'_> {
    /// Returns the user message: the chunk text, prefixed by the entity name
    /// when one is set.
    ///
    /// # Examples
    /// ```
    /// use aura_core::{GenerationRequest, ResponseSchema};
    ///
    /// let request = GenerationRequest {
    ///     model: "gpt-4o",
    ///     instruction: "tag attributes",
    ///     entity: Some("Customer"),
    ///     chunk_text: "Customer ID".to_owned(),
    ///     schema: &ResponseSchema::STEREOTYPES,
    /// };
    /// assert_eq!(request.user_content(), "Entity Name: Customer\nCustomer ID");
    /// ```
    #[must_use]
    pub fn user_content(&self) -> String {
        match self.entity {
            Some(entity) => format!("Entity Name: {entity}\n{}", self.chunk_text),
            None => self.chunk_text.clone(),
        }
    }
}

/// Schema-validated reply for one chunk.
///
/// The pipeline expects `attribute_names` and `descriptions` to have equal
/// lengths but does not enforce it; see [`crate::pair`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    /// Attribute names echoed by the service, in request order.
    pub attribute_names: Vec<String>,
    /// Generated description (or stereotype tag) for each attribute.
    pub descriptions: Vec<String>,
    /// Entity name echoed back by the stereotype variant.
    pub entity_name: Option<String>,
}

/// Abstraction over a generative text service that answers one chunk at a
/// time.
///
/// Implementations perform exactly one logical request per call and must
/// return [`ServiceError::SchemaValidation`] when the reply does not match
/// `request.schema`.
///
/// # Examples
/// ```
/// use aura_core::{CompletionService, GenerationRequest, GenerationResponse, ServiceError};
///
/// struct Echo;
///
/// impl CompletionService for Echo {
///     fn name(&self) -> &str { "echo" }
///     fn complete(&self, request: &GenerationRequest<'_>) -> Result<GenerationResponse, ServiceError> {
///         let names: Vec<String> = request.chunk_text.lines().map(ToOwned::to_owned).collect();
///         Ok(GenerationResponse {
///             descriptions: names.clone(),
///             attribute_names: names,
///             entity_name: None,
///         })
///     }
/// }
///
/// assert_eq!(Echo.name(), "echo");
/// ```
pub trait CompletionService {
    /// Returns a human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Sends `request` and returns the validated response.
    ///
    /// # Errors
    /// Returns [`ServiceError::Upstream`] when the service cannot be reached
    /// or answers with an error, and [`ServiceError::SchemaValidation`] when
    /// its output does not conform to the declared schema.
    fn complete(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<GenerationResponse, ServiceError>;
}

impl<S: CompletionService + ?Sized> CompletionService for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn complete(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<GenerationResponse, ServiceError> {
        (**self).complete(request)
    }
}

impl<S: CompletionService + ?Sized> CompletionService for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn complete(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<GenerationResponse, ServiceError> {
        (**self).complete(request)
    }
}
