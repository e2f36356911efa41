//! Line sources over plain and compressed log files.

use crate::Result;
use anyhow::Context;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use xz2::read::XzDecoder;

/// Compression of a log file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Plain,
    Xz,
    Gzip,
    Zstd,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("xz") => Compression::Xz,
            Some("gz") => Compression::Gzip,
            Some("zst") => Compression::Zstd,
            _ => Compression::Plain,
        }
    }
}

/// An opened log file.
pub struct LogSource {
    path: PathBuf,
    reader: Box<dyn BufRead>,
}

impl LogSource {
    /// Open `path`, decompressing transparently when the extension says so.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;

        let inner: Box<dyn Read> = match Compression::from_path(path) {
            Compression::Plain => Box::new(file),
            Compression::Xz => Box::new(XzDecoder::new(file)),
            Compression::Gzip => Box::new(MultiGzDecoder::new(file)),
            Compression::Zstd => Box::new(
                zstd::stream::read::Decoder::new(file)
                    .with_context(|| format!("init zstd decoder for {}", path.display()))?,
            ),
        };

        Ok(Self {
            path: path.to_path_buf(),
            reader: Box::new(BufReader::new(inner)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lazily yield the lines of the file without their line terminator.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; syslog occasionally
    /// carries stray bytes from unrelated programs.
    pub fn lines(self) -> Lines {
        Lines {
            reader: self.reader,
            buf: Vec::new(),
        }
    }
}

pub struct Lines {
    reader: Box<dyn BufRead>,
    buf: Vec<u8>,
}

impl Iterator for Lines {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
