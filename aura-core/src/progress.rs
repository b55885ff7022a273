//! Progress reporting side channel.

/// Receives `(completed, total)` after every committed chunk.
///
/// Closures taking `(usize, usize)` implement the trait directly.
///
/// # Examples
/// ```
/// use aura_core::ProgressSink;
///
/// let mut seen = Vec::new();
/// let mut sink = |completed: usize, total: usize| seen.push((completed, total));
/// sink.chunk_committed(1, 2);
/// assert_eq!(seen, [(1, 2)]);
/// ```
pub trait ProgressSink {
    /// Called once per committed chunk, with `completed` counting from 1.
    fn chunk_committed(&mut self, completed: usize, total: usize);
}

impl<F: FnMut(usize, usize)> ProgressSink for F {
    fn chunk_committed(&mut self, completed: usize, total: usize) {
        self(completed, total);
    }
}

/// Sink that discards progress updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn chunk_committed(&mut self, _completed: usize, _total: usize) {}
}
