use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ElogError, Result};
use crate::record::RecordBody;
use crate::rotation;

/// Text file the flush task renders records into.
///
/// Only the flush task (or a rotation running under the same lock) touches
/// it. Writes are buffered and pushed to the OS at the end of every flush
/// pass; nothing is synced to disk.
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    bytes_written: u64,
}

impl FileSink {
    /// Opens `path`, truncating it unless `append` is set.
    pub fn open(path: impl Into<PathBuf>, append: bool) -> Result<Self> {
        let path = path.into();
        let file = open_file(&path, append)?;
        let bytes_written = if append {
            file.metadata().map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            bytes_written,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes in the active file, as far as this sink knows.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Renders one record as a line.
    pub fn write_record(&mut self, body: &RecordBody) -> io::Result<()> {
        let mut counter = CountingWriter {
            inner: &mut self.writer,
            count: 0,
        };
        let result = body.render(&mut counter);
        self.bytes_written += counter.count;
        result
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Replaces the handle with a fresh, truncated file at the same path.
    pub fn reopen(&mut self) -> Result<()> {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(path = %self.path.display(), error = %e, "flush before reopen failed");
        }
        let file = open_file(&self.path, false)?;
        self.writer = BufWriter::new(file);
        self.bytes_written = 0;
        Ok(())
    }

    /// Rotates the active file into `<path>.0` and reopens `<path>`.
    pub fn rotate(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| ElogError::io(format!("flushing {}", self.path.display()), e))?;
        rotation::shift_files(&self.path)?;
        self.reopen()
    }
}

fn open_file(path: &Path, append: bool) -> Result<File> {
    let mut options = OpenOptions::new();
    if append {
        options.append(true).create(true);
    } else {
        options.write(true).create(true).truncate(true);
    }
    options
        .open(path)
        .map_err(|e| ElogError::io(format!("opening log file {}", path.display()), e))
}

struct CountingWriter<'w, W: Write> {
    inner: &'w mut W,
    count: u64,
}

impl<W: Write> Write for CountingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
