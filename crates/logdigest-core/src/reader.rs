use crate::Result;
use crate::locate::{LogExtension, LogFile};
use crate::parse::{LineParser, ParsedLine};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub struct LogReader;

impl LogReader {
    /// Open a located log file, decompressing it if it is gzipped
    pub fn open(log: &LogFile) -> Result<LogLines> {
        Self::open_as(&log.path, log.extension)
    }

    /// Open a log file by path, treating a `.gz` suffix as gzip
    pub fn open_path(path: &Path) -> Result<LogLines> {
        let extension = match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => LogExtension::Gzip,
            _ => LogExtension::Plain,
        };
        Self::open_as(path, extension)
    }

    /// Stream parsed lines from any buffered reader
    pub fn from_reader(reader: impl BufRead + 'static) -> LogLines {
        LogLines {
            reader: Box::new(reader),
            parser: LineParser,
            buf: Vec::new(),
            done: false,
        }
    }

    fn open_as(path: &Path, extension: LogExtension) -> Result<LogLines> {
        tracing::debug!("Opening log file: {} ({:?})", path.display(), extension);

        let file = File::open(path)?;
        let lines = match extension {
            LogExtension::Gzip => Self::from_reader(BufReader::new(MultiGzDecoder::new(file))),
            LogExtension::Plain => Self::from_reader(BufReader::new(file)),
        };

        Ok(lines)
    }
}

/// Lazy, single-pass sequence of parsed log lines
///
/// Owns the underlying reader; the file is closed when this is dropped.
/// After the first I/O error the iterator yields nothing more.
pub struct LogLines {
    reader: Box<dyn BufRead>,
    parser: LineParser,
    buf: Vec<u8>,
    done: bool,
}

impl Iterator for LogLines {
    type Item = Result<ParsedLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => Some(Ok(match std::str::from_utf8(&self.buf) {
                Ok(line) => self.parser.parse(line),
                Err(_) => ParsedLine::Unparsable,
            })),
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

impl std::iter::FusedIterator for LogLines {}
