//! Event stream drivers
//!
//! [`BinlogEventReader`] pulls events from a byte source until it is
//! exhausted; [`BinlogFileReader`] does the same for a binlog file on disk
//! after checking its magic number.

use crate::config::BinlogConfig;
use crate::deserialization::EventDeserializer;
use crate::error::{BinlogError, Result};
use crate::event::Event;
use crate::io::BinlogInputStream;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Magic number at the start of every binlog file
pub const BINLOG_MAGIC: [u8; 4] = [0xFE, b'b', b'i', b'n'];

/// Reader lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamState {
    /// More events may follow
    Active,
    /// The byte source reported end of data; no further reads happen
    Ended,
}

/// Reads events from a byte source until it is exhausted.
///
/// # Example
///
/// ```rust
/// use rivven_binlog::{BinlogEventReader, BinlogInputStream};
///
/// let mut reader = BinlogEventReader::new(BinlogInputStream::from_bytes(Vec::new()));
/// assert!(reader.next_event().unwrap().is_none());
/// assert!(reader.is_ended());
/// ```
#[derive(Debug)]
pub struct BinlogEventReader {
    input: BinlogInputStream,
    deserializer: EventDeserializer,
    state: StreamState,
}

impl BinlogEventReader {
    pub fn new(input: BinlogInputStream) -> Self {
        Self::with_deserializer(input, EventDeserializer::new())
    }

    pub fn with_config(input: BinlogInputStream, config: &BinlogConfig) -> Result<Self> {
        Ok(Self::with_deserializer(
            input,
            EventDeserializer::with_config(config)?,
        ))
    }

    pub fn with_deserializer(input: BinlogInputStream, deserializer: EventDeserializer) -> Self {
        Self {
            input,
            deserializer,
            state: StreamState::Active,
        }
    }

    /// Next event, or `None` once the source is exhausted.
    ///
    /// After the first `None` every call returns `None` without touching the
    /// source again. Errors leave the reader active: when
    /// [`BinlogError::is_recoverable`] holds, the following call decodes the
    /// next record.
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        if self.state == StreamState::Ended {
            return Ok(None);
        }

        match self.deserializer.next_event(&mut self.input)? {
            Some(event) => Ok(Some(event)),
            None => {
                debug!(
                    "End of binlog stream at position {}",
                    self.input.position()
                );
                self.state = StreamState::Ended;
                Ok(None)
            }
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_ended(&self) -> bool {
        self.state == StreamState::Ended
    }

    /// Bytes consumed from the source so far.
    pub fn position(&self) -> u64 {
        self.input.position()
    }

    pub fn deserializer(&self) -> &EventDeserializer {
        &self.deserializer
    }

    /// Reconfigure decoding between events (checksum length, overrides).
    pub fn deserializer_mut(&mut self) -> &mut EventDeserializer {
        &mut self.deserializer
    }

    pub fn into_parts(self) -> (BinlogInputStream, EventDeserializer) {
        (self.input, self.deserializer)
    }
}

impl Iterator for BinlogEventReader {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

/// Reads events from a binlog file (`mysql-bin.000001` and friends).
#[derive(Debug)]
pub struct BinlogFileReader {
    path: PathBuf,
    reader: BinlogEventReader,
}

impl BinlogFileReader {
    /// Open `path` with the default configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, &BinlogConfig::default())
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: &BinlogConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = BufReader::new(File::open(&path)?);

        let mut magic = [0u8; 4];
        file.read_exact(&mut magic)?;
        if magic != BINLOG_MAGIC {
            return Err(BinlogError::invalid_format(format!(
                "{} is not a binlog file (magic {:02x?})",
                path.display(),
                magic
            )));
        }
        debug!("Opened binlog file {}", path.display());

        let reader = BinlogEventReader::with_config(BinlogInputStream::new(file), config)?;
        Ok(Self { path, reader })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn next_event(&mut self) -> Result<Option<Event>> {
        self.reader.next_event()
    }

    /// File offset of the next record.
    pub fn position(&self) -> u64 {
        BINLOG_MAGIC.len() as u64 + self.reader.position()
    }

    pub fn reader_mut(&mut self) -> &mut BinlogEventReader {
        &mut self.reader
    }
}

impl Iterator for BinlogFileReader {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next()
    }
}
