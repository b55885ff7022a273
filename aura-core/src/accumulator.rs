//! Positional pairing and incremental persistence of results.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument, warn};

use crate::{Result, completion::GenerationResponse, error::AuraError};

/// One `name: description` line of the output artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry(String);

impl ResultEntry {
    /// Formats `name` and `description` as `"{name}: {description}"`.
    #[must_use]
    pub fn new(name: &str, description: &str) -> Self {
        Self(format!("{name}: {description}"))
    }

    /// Returns the formatted line.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResultEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pairs `attribute_names[i]` with `descriptions[i]` in order.
///
/// When the two lists differ in length the extra items of the longer one are
/// dropped; a warning records how many.
///
/// # Examples
/// ```
/// use aura_core::{GenerationResponse, pair};
///
/// let response = GenerationResponse {
///     attribute_names: vec!["Customer ID".into(), "Customer Name".into()],
///     descriptions: vec!["Müşteri Tekil Anahtarı".into(), "Müşteri Adı".into()],
///     entity_name: None,
/// };
/// let entries = pair(&response);
/// assert_eq!(entries[0].as_str(), "Customer ID: Müşteri Tekil Anahtarı");
/// assert_eq!(entries.len(), 2);
/// ```
#[must_use]
pub fn pair(response: &GenerationResponse) -> Vec<ResultEntry> {
    let names = response.attribute_names.len();
    let descriptions = response.descriptions.len();
    if names != descriptions {
        warn!(
            names,
            descriptions,
            dropped = names.abs_diff(descriptions),
            "response lists differ in length, truncating to the shorter"
        );
    }
    response
        .attribute_names
        .iter()
        .zip(&response.descriptions)
        .map(|(name, description)| ResultEntry::new(name, description))
        .collect()
}

/// Ordered, append-only result list mirrored to an output artifact.
///
/// Every [`commit`](Self::commit) rewrites the whole artifact, so after
/// committing chunks `1..=k` the file holds exactly their entries regardless
/// of what happens to chunk `k + 1`.
#[derive(Debug)]
pub struct ResultAccumulator {
    path: PathBuf,
    entries: Vec<ResultEntry>,
}

impl ResultAccumulator {
    /// Creates an empty accumulator targeting `path`. The file is not touched
    /// until the first commit.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// Returns the output artifact path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the committed entries in order.
    #[must_use]
    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    /// Returns the newline-joined serialisation of all entries.
    #[must_use]
    pub fn render(&self) -> String {
        let lines: Vec<&str> = self.entries.iter().map(ResultEntry::as_str).collect();
        lines.join("\n")
    }

    /// Appends `entries` and rewrites the output artifact.
    ///
    /// # Errors
    /// Returns [`AuraError::WriteOutput`] when the artifact cannot be written.
    /// The in-memory entries are kept so a later commit can retry the write.
    #[instrument(
        name = "core.commit",
        err,
        skip(self, entries),
        fields(path = %self.path.display(), added = entries.len()),
    )]
    pub fn commit(&mut self, entries: Vec<ResultEntry>) -> Result<()> {
        self.entries.extend(entries);
        self.persist()
    }

    /// Writes the current serialisation to the output artifact.
    ///
    /// The content goes to a sibling `.part` file first and is then renamed
    /// over the target, so the artifact always holds a complete serialisation.
    ///
    /// # Errors
    /// Returns [`AuraError::WriteOutput`] when writing or renaming fails.
    pub fn persist(&self) -> Result<()> {
        let contents = self.render();
        write_atomic(&self.path, contents.as_bytes()).map_err(|source| {
            AuraError::WriteOutput {
                path: self.path.clone(),
                source,
            }
        })?;
        debug!(entries = self.entries.len(), "output artifact rewritten");
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut part_path = path.as_os_str().to_owned();
    part_path.push(".part");
    let part_path = PathBuf::from(part_path);
    if part_path.exists() {
        fs::remove_file(&part_path)?;
    }
    fs::write(&part_path, bytes)?;
    fs::rename(&part_path, path).inspect_err(|_| {
        if let Err(cleanup) = fs::remove_file(&part_path) {
            debug!(
                path = %part_path.display(),
                error = %cleanup,
                "could not remove partial artifact"
            );
        }
    })
}
