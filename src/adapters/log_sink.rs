//! Log-based sample sink.
//!
//! Used when no sample file is configured: every scheduled sample goes to
//! the `log` facade instead, in the same CSV layout as the file adapter.

use std::io;

use log::info;

use crate::app::events::SampleRecord;
use crate::app::ports::SampleSink;

/// Adapter that logs every [`SampleRecord`] at `info`.
pub struct LogSampleSink;

impl LogSampleSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogSampleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSink for LogSampleSink {
    fn record(&mut self, sample: &SampleRecord) -> io::Result<()> {
        info!("SAMPLE | {}", sample);
        Ok(())
    }
}
