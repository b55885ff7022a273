//! Pipeline driver: chunk, complete, pair, commit.
//!
//! Provides the [`Augmenter`] entry point. Chunks are processed strictly in
//! input order, one request at a time, and the output artifact is rewritten
//! after each one. Any failure aborts the run and leaves the artifact holding
//! every chunk committed before it.

use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use tracing::{info, instrument, warn};

use crate::{
    Result,
    accumulator::{ResultAccumulator, pair},
    chunk::{Chunk, Chunks},
    completion::{CompletionService, GenerationRequest},
    error::AuraError,
    input::read_lines_from_path,
    progress::ProgressSink,
    schema::ResponseSchema,
};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of chunks sent to the service.
    pub chunks: usize,
    /// Number of lines read from the input.
    pub lines: usize,
    /// Number of entries written to the output artifact.
    pub entries: usize,
    /// Path of the output artifact.
    pub output: PathBuf,
}

/// Entry point for running the augmentation pipeline.
///
/// Construct one with [`crate::AugmenterBuilder`].
///
/// # Examples
/// ```
/// use aura_core::{
///     AugmenterBuilder, CompletionService, GenerationRequest, GenerationResponse, NoProgress,
///     ServiceError,
/// };
///
/// struct Upper;
///
/// impl CompletionService for Upper {
///     fn name(&self) -> &str { "upper" }
///     fn complete(&self, request: &GenerationRequest<'_>) -> Result<GenerationResponse, ServiceError> {
///         let names: Vec<String> = request.chunk_text.lines().map(ToOwned::to_owned).collect();
///         Ok(GenerationResponse {
///             descriptions: names.iter().map(|name| name.to_uppercase()).collect(),
///             attribute_names: names,
///             entity_name: None,
///         })
///     }
/// }
///
/// let dir = tempfile::tempdir()?;
/// let output = dir.path().join("out.txt");
/// let augmenter = AugmenterBuilder::new().with_chunk_size(1).build()?;
/// let lines = vec!["id".to_owned(), "name".to_owned()];
/// let summary = augmenter.run(&Upper, &lines, &output, &mut NoProgress)?;
/// assert_eq!(summary.chunks, 2);
/// assert_eq!(std::fs::read_to_string(&output)?, "id: ID\nname: NAME");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Augmenter {
    model: String,
    instruction: String,
    chunk_size: NonZeroUsize,
    entity: Option<String>,
    schema: &'static ResponseSchema,
}

impl Augmenter {
    pub(crate) fn new(
        model: String,
        instruction: String,
        chunk_size: NonZeroUsize,
        entity: Option<String>,
        schema: &'static ResponseSchema,
    ) -> Self {
        Self {
            model,
            instruction,
            chunk_size,
            entity,
            schema,
        }
    }

    /// Returns the model identifier sent with every request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the system instruction sent with every request.
    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Returns the number of lines per request.
    #[must_use]
    pub const fn chunk_size(&self) -> NonZeroUsize {
        self.chunk_size
    }

    /// Returns the entity context, if any.
    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// Returns the response schema requested from the service.
    #[must_use]
    pub const fn schema(&self) -> &'static ResponseSchema {
        self.schema
    }

    /// Reads `input` and runs the pipeline into `output`.
    ///
    /// # Errors
    /// Returns [`AuraError::InvalidConfiguration`] when either path is empty,
    /// [`AuraError::ReadInput`] when the input cannot be read, and otherwise
    /// whatever [`Augmenter::run`] returns.
    pub fn run_path<S, P>(
        &self,
        service: &S,
        input: &Path,
        output: &Path,
        progress: &mut P,
    ) -> Result<RunSummary>
    where
        S: CompletionService + ?Sized,
        P: ProgressSink + ?Sized,
    {
        if input.as_os_str().is_empty() {
            return Err(AuraError::invalid("input", "path must not be empty"));
        }
        let lines = read_lines_from_path(input)?;
        self.run(service, &lines, output, progress)
    }

    /// Runs the pipeline over `lines`, rewriting `output` after every chunk.
    ///
    /// Empty input sends no requests and leaves an empty artifact. The
    /// artifact always mirrors this run's results, so content left by an
    /// earlier run is cleared even when there is nothing to process.
    ///
    /// # Errors
    /// Returns [`AuraError::InvalidConfiguration`] when `output` is empty,
    /// [`AuraError::Service`] when a request fails, and
    /// [`AuraError::WriteOutput`] when the artifact cannot be written. On
    /// error the artifact keeps the entries of every chunk committed so far.
    #[instrument(
        name = "core.run",
        err,
        skip(self, service, lines, progress),
        fields(
            service = %service.name(),
            lines = lines.len(),
            chunk_size = %self.chunk_size,
            model = %self.model,
            schema = self.schema.name,
        ),
    )]
    pub fn run<S, P>(
        &self,
        service: &S,
        lines: &[String],
        output: &Path,
        progress: &mut P,
    ) -> Result<RunSummary>
    where
        S: CompletionService + ?Sized,
        P: ProgressSink + ?Sized,
    {
        if output.as_os_str().is_empty() {
            return Err(AuraError::invalid("output", "path must not be empty"));
        }

        let chunks = Chunks::with_size(lines, self.chunk_size);
        let total = chunks.total();
        let mut accumulator = ResultAccumulator::new(output);

        if total == 0 {
            warn!("input contains no lines, writing an empty artifact");
            accumulator.persist()?;
        }

        for chunk in chunks {
            let request = self.request_for(&chunk);
            let response = service
                .complete(&request)
                .map_err(|error| AuraError::Service {
                    chunk: chunk.index(),
                    error,
                })?;
            accumulator.commit(pair(&response))?;
            info!(
                chunk = chunk.index(),
                total,
                entries = accumulator.entries().len(),
                "chunk committed"
            );
            progress.chunk_committed(chunk.index(), total);
        }

        Ok(RunSummary {
            chunks: total,
            lines: lines.len(),
            entries: accumulator.entries().len(),
            output: output.to_path_buf(),
        })
    }

    /// Builds the request for `chunk`.
    ///
    /// # Examples
    /// ```
    /// use aura_core::{AugmenterBuilder, Chunks, Preset};
    ///
    /// let augmenter = AugmenterBuilder::from_preset(&Preset::STEREOTYPES)
    ///     .with_entity("Customer")
    ///     .build()?;
    /// let lines = vec!["Customer ID".to_owned()];
    /// let chunk = Chunks::new(&lines, 1)?.next().expect("one chunk");
    /// let request = augmenter.request_for(&chunk);
    /// assert_eq!(request.model, "gpt-4o");
    /// assert_eq!(request.user_content(), "Entity Name: Customer\nCustomer ID");
    /// # Ok::<(), aura_core::AuraError>(())
    /// ```
    #[must_use]
    pub fn request_for(&self, chunk: &Chunk<'_>) -> GenerationRequest<'_> {
        GenerationRequest {
            model: &self.model,
            instruction: &self.instruction,
            entity: self.entity.as_deref(),
            chunk_text: chunk.text(),
            schema: self.schema,
        }
    }
}
