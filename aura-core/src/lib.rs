//! AURA core library.
//!
//! Splits attribute labels into fixed-size chunks, asks a
//! [`CompletionService`] to describe each chunk, and persists the ordered
//! `name: description` pairs after every chunk so an interrupted run leaves a
//! valid partial artifact behind.

mod accumulator;
mod augmenter;
mod builder;
mod chunk;
mod completion;
mod error;
mod input;
mod preset;
mod progress;
mod schema;

pub use crate::{
    accumulator::{ResultAccumulator, ResultEntry, pair},
    augmenter::{Augmenter, RunSummary},
    builder::AugmenterBuilder,
    chunk::{Chunk, Chunks},
    completion::{CompletionService, GenerationRequest, GenerationResponse},
    error::{AuraError, AuraErrorCode, Result, ServiceError, ServiceErrorCode},
    input::{read_lines, read_lines_from_path},
    preset::{DEFAULT_CHUNK_SIZE, Preset},
    progress::{NoProgress, ProgressSink},
    schema::{FieldKind, ResponseSchema, SchemaField},
};
