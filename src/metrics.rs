//! Conversion run metrics

use serde::Serialize;
use std::time::Duration;

/// Timing and size figures accumulated over one conversion run.
///
/// Owned exclusively by the run that produces it; on failure it reflects
/// only the chunks completed before the error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionMetrics {
    /// Wall-clock duration of the whole run
    pub total_duration: Duration,
    /// Per-chunk wall-clock durations, in processing order
    pub chunk_times: Vec<Duration>,
    /// Cumulative encode-and-append duration
    pub compression_time: Duration,
    /// Input file size in bytes, captured before any reading
    pub input_size: u64,
    /// Output file size in bytes, captured after the final flush
    pub output_size: u64,
}

impl ConversionMetrics {
    /// Number of chunks processed
    pub fn chunk_count(&self) -> usize {
        self.chunk_times.len()
    }

    /// Mean per-chunk duration, `None` when no chunk completed
    pub fn average_chunk_time(&self) -> Option<Duration> {
        let count = self.chunk_times.len() as u32;
        if count == 0 {
            None
        } else {
            Some(self.chunk_times.iter().sum::<Duration>() / count)
        }
    }

    /// Output bytes divided by input bytes, `None` for an empty input
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.input_size == 0 {
            None
        } else {
            Some(self.output_size as f64 / self.input_size as f64)
        }
    }
}
