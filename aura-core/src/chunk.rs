//! Fixed-size chunking of attribute labels.

use std::{num::NonZeroUsize, slice};

use crate::{Result, error::AuraError};

/// A contiguous, ordered group of input lines sent in one request.
///
/// # Examples
/// ```
/// use aura_core::Chunks;
///
/// let lines = vec!["Customer ID".to_owned(), "Order Date".to_owned()];
/// let chunk = Chunks::new(&lines, 5)?.next().expect("one chunk");
/// assert_eq!(chunk.index(), 1);
/// assert_eq!(chunk.text(), "Customer ID\nOrder Date");
/// # Ok::<(), aura_core::AuraError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    index: usize,
    lines: &'a [String],
}

impl<'a> Chunk<'a> {
    /// Returns the 1-based position of this chunk within the run.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the lines in this chunk, in input order.
    #[must_use]
    pub const fn lines(&self) -> &'a [String] {
        self.lines
    }

    /// Returns the number of lines in this chunk.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns whether the chunk holds no lines. Chunks yielded by [`Chunks`]
    /// are never empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Joins the lines with `\n`, preserving blank lines.
    ///
    /// Lines are read without their terminators, so the text never ends with
    /// a newline, including for the final chunk of a file that had one.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Lazy iterator splitting a slice of lines into [`Chunk`]s of at most
/// `chunk_size` lines.
///
/// The chunks cover the input exactly once, in order, and only the final
/// chunk may be shorter than `chunk_size`. Empty input yields no chunks.
///
/// # Examples
/// ```
/// use aura_core::Chunks;
///
/// let lines: Vec<String> = ["a", "b", "c"].iter().map(|s| (*s).to_owned()).collect();
/// let sizes: Vec<usize> = Chunks::new(&lines, 2)?.map(|chunk| chunk.len()).collect();
/// assert_eq!(sizes, [2, 1]);
/// # Ok::<(), aura_core::AuraError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    inner: slice::Chunks<'a, String>,
    next_index: usize,
    total: usize,
}

impl<'a> Chunks<'a> {
    /// Creates a chunk iterator over `lines`.
    ///
    /// # Errors
    /// Returns [`AuraError::InvalidConfiguration`] when `chunk_size` is zero.
    pub fn new(lines: &'a [String], chunk_size: usize) -> Result<Self> {
        let size = NonZeroUsize::new(chunk_size)
            .ok_or_else(|| AuraError::invalid("chunk_size", "must be at least 1 (got 0)"))?;
        Ok(Self::with_size(lines, size))
    }

    /// Creates a chunk iterator with an already validated size.
    #[must_use]
    pub fn with_size(lines: &'a [String], chunk_size: NonZeroUsize) -> Self {
        Self {
            inner: lines.chunks(chunk_size.get()),
            next_index: 1,
            total: lines.len().div_ceil(chunk_size.get()),
        }
    }

    /// Returns the total number of chunks the input splits into, independent
    /// of how many have been consumed.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.inner.next()?;
        let index = self.next_index;
        self.next_index += 1;
        Some(Chunk { index, lines })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Chunks<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn labels(count: usize) -> Vec<String> {
        (0..count).map(|idx| format!("attr {idx}")).collect()
    }

    #[rstest]
    #[case::exact_multiple(4, 2, vec![2, 2])]
    #[case::short_tail(5, 2, vec![2, 2, 1])]
    #[case::single_chunk(3, 100, vec![3])]
    #[case::one_per_chunk(3, 1, vec![1, 1, 1])]
    #[case::empty(0, 3, vec![])]
    fn chunk_sizes_follow_input(
        #[case] count: usize,
        #[case] size: usize,
        #[case] expected: Vec<usize>,
    ) {
        let lines = labels(count);
        let chunks = Chunks::new(&lines, size).expect("size is positive");
        assert_eq!(chunks.total(), expected.len());
        let sizes: Vec<usize> = chunks.map(|chunk| chunk.len()).collect();
        assert_eq!(sizes, expected);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let lines = labels(2);
        let err = Chunks::new(&lines, 0).expect_err("zero chunk size must fail");
        assert!(matches!(
            err,
            AuraError::InvalidConfiguration {
                setting: "chunk_size",
                ..
            }
        ));
    }

    #[test]
    fn indices_are_one_based_and_sequential() {
        let lines = labels(5);
        let indices: Vec<usize> = Chunks::new(&lines, 2)
            .expect("size is positive")
            .map(|chunk| chunk.index())
            .collect();
        assert_eq!(indices, [1, 2, 3]);
    }

    #[test]
    fn text_preserves_blank_lines() {
        let lines = vec!["Customer ID".to_owned(), String::new(), "Order Date".to_owned()];
        let chunk = Chunks::new(&lines, 3)
            .expect("size is positive")
            .next()
            .expect("one chunk");
        assert_eq!(chunk.text(), "Customer ID\n\nOrder Date");
    }

    #[test]
    fn text_has_no_trailing_newline() {
        let lines = labels(3);
        let last = Chunks::new(&lines, 2)
            .expect("size is positive")
            .last()
            .expect("two chunks");
        assert!(!last.text().ends_with('\n'));
        assert_eq!(last.text(), lines[2]);
    }

    #[test]
    fn total_is_stable_while_iterating() {
        let lines = labels(3);
        let mut chunks = Chunks::new(&lines, 2).expect("size is positive");
        let _ = chunks.next();
        assert_eq!(chunks.total(), 2);
        assert_eq!(chunks.len(), 1);
    }
}
