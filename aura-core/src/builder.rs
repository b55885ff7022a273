//! Builder utilities for configuring an [`Augmenter`].
//!
//! Validates chunk size, model, and entity context before a run can start so
//! configuration mistakes never reach the service.

use std::num::NonZeroUsize;

use crate::{
    Result, augmenter::Augmenter, error::AuraError, preset::Preset, schema::ResponseSchema,
};

/// Configures and constructs [`Augmenter`] instances.
///
/// # Examples
/// ```
/// use aura_core::{AugmenterBuilder, Preset};
///
/// let augmenter = AugmenterBuilder::from_preset(&Preset::DESCRIPTIONS)
///     .with_chunk_size(25)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(augmenter.chunk_size().get(), 25);
/// assert_eq!(augmenter.model(), "gpt-4o-mini");
/// ```
#[derive(Debug, Clone)]
pub struct AugmenterBuilder {
    model: String,
    instruction: String,
    chunk_size: usize,
    entity: Option<String>,
    schema: &'static ResponseSchema,
}

impl Default for AugmenterBuilder {
    fn default() -> Self {
        Self::from_preset(&Preset::DESCRIPTIONS)
    }
}

impl AugmenterBuilder {
    /// Creates a builder populated with the description preset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder seeded from `preset`.
    ///
    /// # Examples
    /// ```
    /// use aura_core::{AugmenterBuilder, Preset};
    ///
    /// let builder = AugmenterBuilder::from_preset(&Preset::STEREOTYPES);
    /// assert_eq!(builder.model(), "gpt-4o");
    /// assert_eq!(builder.chunk_size(), 100);
    /// ```
    #[must_use]
    pub fn from_preset(preset: &Preset) -> Self {
        Self {
            model: preset.model.to_owned(),
            instruction: preset.instruction.to_owned(),
            chunk_size: preset.chunk_size,
            entity: None,
            schema: preset.schema,
        }
    }

    /// Overrides the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Returns the configured model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Overrides the system instruction.
    #[must_use]
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Returns the configured system instruction.
    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Overrides the number of lines sent per request.
    ///
    /// # Examples
    /// ```
    /// use aura_core::AugmenterBuilder;
    ///
    /// let builder = AugmenterBuilder::new().with_chunk_size(10);
    /// assert_eq!(builder.chunk_size(), 10);
    /// ```
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Returns the configured chunk size.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Sets the entity the attributes belong to.
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Returns the configured entity, if any.
    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// Validates the configuration and constructs an [`Augmenter`].
    ///
    /// # Errors
    /// Returns [`AuraError::InvalidConfiguration`] when the chunk size is
    /// zero, the model is blank, or the schema expects an entity and none
    /// (or a blank one) was set.
    ///
    /// # Examples
    /// ```
    /// use aura_core::{AugmenterBuilder, AuraError, Preset};
    ///
    /// let err = AugmenterBuilder::from_preset(&Preset::STEREOTYPES)
    ///     .build()
    ///     .expect_err("stereotypes need an entity");
    /// assert!(matches!(err, AuraError::InvalidConfiguration { setting: "entity", .. }));
    /// ```
    pub fn build(self) -> Result<Augmenter> {
        let chunk_size = NonZeroUsize::new(self.chunk_size).ok_or_else(|| {
            AuraError::invalid("chunk_size", format!("must be at least 1 (got {})", self.chunk_size))
        })?;
        if self.model.trim().is_empty() {
            return Err(AuraError::invalid("model", "must not be blank"));
        }
        let entity = match self.entity {
            Some(entity) if entity.trim().is_empty() => {
                return Err(AuraError::invalid("entity", "must not be blank"));
            }
            Some(entity) => Some(entity),
            None if self.schema.expects_entity() => {
                return Err(AuraError::invalid(
                    "entity",
                    format!("schema `{}` requires an entity name", self.schema.name),
                ));
            }
            None => None,
        };

        Ok(Augmenter::new(
            self.model,
            self.instruction,
            chunk_size,
            entity,
            self.schema,
        ))
    }
}
