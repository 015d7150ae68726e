//! Progress reporting for index builds.

use std::time::Instant;

/// Progress of a chunk embedding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexingProgress {
    /// Number of chunks embedded so far
    pub chunks_completed: usize,
    /// Total number of chunks to embed
    pub chunks_total: usize,
    /// Time elapsed since start (milliseconds)
    pub elapsed_ms: u64,
}

impl IndexingProgress {
    pub fn new(chunks_completed: usize, chunks_total: usize, elapsed_ms: u64) -> Self {
        Self {
            chunks_completed,
            chunks_total,
            elapsed_ms,
        }
    }

    /// Returns the completion percentage (0.0 to 100.0).
    pub fn percent_complete(&self) -> f64 {
        if self.chunks_total == 0 {
            0.0
        } else {
            (self.chunks_completed as f64 / self.chunks_total as f64) * 100.0
        }
    }

    pub fn is_complete(&self) -> bool {
        self.chunks_completed >= self.chunks_total
    }

    /// Returns estimated time remaining in milliseconds, if computable.
    pub fn estimated_remaining_ms(&self) -> Option<u64> {
        if self.chunks_completed == 0 || self.chunks_completed >= self.chunks_total {
            return None;
        }
        let remaining_chunks = self.chunks_total - self.chunks_completed;
        let ms_per_chunk = self.elapsed_ms / self.chunks_completed as u64;
        Some(remaining_chunks as u64 * ms_per_chunk)
    }
}

/// Elapsed-time helper for progress reports.
pub(crate) struct ProgressTimer {
    start: Instant,
}

impl ProgressTimer {
    pub(crate) fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub(crate) fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing_progress_percent() {
        let progress = IndexingProgress::new(50, 100, 1000);
        assert!((progress.percent_complete() - 50.0).abs() < 0.01);

        let progress = IndexingProgress::new(100, 100, 2000);
        assert!((progress.percent_complete() - 100.0).abs() < 0.01);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_indexing_progress_empty() {
        let progress = IndexingProgress::new(0, 0, 0);
        assert!((progress.percent_complete() - 0.0).abs() < 0.01);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_estimated_remaining() {
        let progress = IndexingProgress::new(50, 100, 1000);
        // 50 chunks in 1000ms = 20ms/chunk, 50 remaining = 1000ms
        assert_eq!(progress.estimated_remaining_ms(), Some(1000));
        assert_eq!(IndexingProgress::new(0, 10, 0).estimated_remaining_ms(), None);
    }
}
