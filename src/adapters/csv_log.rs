//! CSV sample log.
//!
//! One line per scheduled sample, `ctime,t0,f0,t1,f1`, appended and flushed
//! immediately so a power cut loses at most the line being written.
//! Rotation is left to the host (logrotate with `copytruncate`).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use log::info;

use crate::app::events::SampleRecord;
use crate::app::ports::SampleSink;

pub struct CsvSampleLog<W> {
    out: W,
}

impl CsvSampleLog<File> {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        info!("CSV: appending samples to {}", path.display());
        Ok(Self::new(file))
    }
}

impl<W: Write> CsvSampleLog<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SampleSink for CsvSampleLog<W> {
    fn record(&mut self, sample: &SampleRecord) -> io::Result<()> {
        writeln!(self.out, "{sample}")?;
        self.out.flush()
    }
}
