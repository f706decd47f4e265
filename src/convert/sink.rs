//! Output sinks.
//!
//! A sink receives fragments in output order and is closed once at the end
//! of a conversion. [`FileSink`] writes the Markdown file; [`MemorySink`]
//! collects output in a string.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Append-only destination for converted text.
pub trait OutputSink {
    /// Append a fragment.
    fn write_fragment(&mut self, fragment: &str) -> Result<()>;

    /// Flush everything written so far.
    fn close(&mut self) -> Result<()>;
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write_fragment(&mut self, fragment: &str) -> Result<()> {
        (**self).write_fragment(fragment)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// How an existing output file is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate (or create) the file
    Overwrite,
    /// Add to the end of the file, creating it if absent
    Append,
}

impl WriteMode {
    /// The short mode string (`"w"` or `"a"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMode::Overwrite => "w",
            WriteMode::Append => "a",
        }
    }
}

impl FromStr for WriteMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "w" | "overwrite" => Ok(WriteMode::Overwrite),
            "a" | "append" => Ok(WriteMode::Append),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buffered writer over the output file.
///
/// The file handle is released when the sink is dropped, whether or not
/// [`OutputSink::close`] was reached.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    bytes_written: u64,
}

impl FileSink {
    /// Open `path` in the given mode.
    pub fn open<P: AsRef<Path>>(path: P, mode: WriteMode) -> Result<Self> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        match mode {
            WriteMode::Overwrite => options.write(true).create(true).truncate(true),
            WriteMode::Append => options.append(true).create(true),
        };
        let file = options.open(path).map_err(|source| Error::OutputOpen {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Opened {} for writing (mode {})", path.display(), mode);

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            bytes_written: 0,
        })
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written through this sink.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl OutputSink for FileSink {
    fn write_fragment(&mut self, fragment: &str) -> Result<()> {
        self.writer.write_all(fragment.as_bytes())?;
        self.bytes_written += fragment.len() as u64;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// In-memory sink.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    buffer: String,
    closed: bool,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Whether [`OutputSink::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Take the collected output.
    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl OutputSink for MemorySink {
    fn write_fragment(&mut self, fragment: &str) -> Result<()> {
        if self.closed {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "write to closed sink",
            )));
        }
        self.buffer.push_str(fragment);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_mode_from_str() {
        assert_eq!("w".parse::<WriteMode>().unwrap(), WriteMode::Overwrite);
        assert_eq!("overwrite".parse::<WriteMode>().unwrap(), WriteMode::Overwrite);
        assert_eq!("a".parse::<WriteMode>().unwrap(), WriteMode::Append);
        assert_eq!("append".parse::<WriteMode>().unwrap(), WriteMode::Append);
        assert!(matches!(
            "r".parse::<WriteMode>(),
            Err(Error::InvalidMode(m)) if m == "r"
        ));
        assert!("W".parse::<WriteMode>().is_err());
    }

    #[test]
    fn test_write_mode_display() {
        assert_eq!(WriteMode::Overwrite.to_string(), "w");
        assert_eq!(WriteMode::Append.to_string(), "a");
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.write_fragment("one\n\n").unwrap();
        sink.write_fragment("two\n\n").unwrap();
        sink.close().unwrap();
        assert!(sink.is_closed());
        assert!(sink.write_fragment("three").is_err());
        assert_eq!(sink.into_string(), "one\n\ntwo\n\n");
    }

    #[test]
    fn test_file_sink_overwrite_and_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");

        let mut sink = FileSink::open(&path, WriteMode::Overwrite).unwrap();
        sink.write_fragment("first\n\n").unwrap();
        sink.close().unwrap();
        assert_eq!(sink.bytes_written(), 7);
        drop(sink);

        let mut sink = FileSink::open(&path, WriteMode::Append).unwrap();
        sink.write_fragment("second\n\n").unwrap();
        sink.close().unwrap();
        drop(sink);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\n\nsecond\n\n");

        let mut sink = FileSink::open(&path, WriteMode::Overwrite).unwrap();
        sink.write_fragment("third\n\n").unwrap();
        sink.close().unwrap();
        assert_eq!(sink.path(), path.as_path());
        drop(sink);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "third\n\n");
    }

    #[test]
    fn test_file_sink_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.md");
        let err = FileSink::open(&path, WriteMode::Append).unwrap_err();
        assert!(matches!(err, Error::OutputOpen { .. }));
    }
}
