//! Address trace reader.
//!
//! A trace is a text file with one address literal per line. Blank lines and
//! lines starting with `#` are skipped. Files ending in `.xz` are
//! decompressed on the fly.
//!
//! Reading happens on a background thread which sends fixed-size chunks of
//! addresses over a bounded channel. The channel closes at end of file or
//! after the first error.

use std::{
    fmt, fs,
    io::{self, BufRead, BufReader, Read},
    path::{Path, PathBuf},
    thread::{self, JoinHandle},
};

use crossbeam::channel::{Receiver, Sender};
use log::{debug, warn};
use xz2::read::XzDecoder;

use crate::{addr, error::CacheError};

#[derive(Debug)]
pub enum TraceError {
    Io(io::Error),
    Parse { line: usize, source: CacheError },
}

impl From<io::Error> for TraceError {
    fn from(e: io::Error) -> Self {
        TraceError::Io(e)
    }
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::Io(e) => write!(f, "I/O error: {}", e),
            TraceError::Parse { line, source } => write!(f, "line {}: {}", line, source),
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TraceError::Io(e) => Some(e),
            TraceError::Parse { source, .. } => Some(source),
        }
    }
}

pub type Chunk = Result<Vec<u64>, TraceError>;

pub struct Trace {
    pub rec: Receiver<Chunk>,
    _thread: JoinHandle<()>,
}

impl Trace {
    pub fn read(
        path: PathBuf,
        addrs_per_chunk: usize,
        chunks_per_queue: usize,
    ) -> io::Result<Trace> {
        let stream = open(&path)?;
        let (sender, receiver) = crossbeam::channel::bounded(chunks_per_queue);

        let t = thread::spawn(move || {
            Trace::run_thread(BufReader::new(stream), addrs_per_chunk.max(1), sender)
        });

        Ok(Trace {
            rec: receiver,
            _thread: t,
        })
    }

    fn run_thread<R: BufRead>(stream: R, addrs_per_chunk: usize, queue: Sender<Chunk>) {
        let mut chunk = Vec::with_capacity(addrs_per_chunk);
        for (idx, line) in stream.lines().enumerate() {
            let parsed = line.map_err(TraceError::from).and_then(|line| {
                parse_line(&line).map_err(|source| TraceError::Parse {
                    line: idx + 1,
                    source,
                })
            });
            match parsed {
                Ok(Some(addr)) => chunk.push(addr),
                Ok(None) => continue,
                Err(err) => {
                    warn!("Stopping trace reader: {}", err);
                    // Deliver what was read before the bad line first
                    if !chunk.is_empty() && queue.send(Ok(chunk)).is_err() {
                        return;
                    }
                    let _ = queue.send(Err(err));
                    return;
                }
            }

            if chunk.len() == addrs_per_chunk {
                let full = std::mem::replace(&mut chunk, Vec::with_capacity(addrs_per_chunk));
                if queue.send(Ok(full)).is_err() {
                    debug!("Trace consumer hung up");
                    return;
                }
            }
        }

        if !chunk.is_empty() {
            let _ = queue.send(Ok(chunk));
        }
        debug!("Trace reader reached end of file");
    }
}

fn open(path: &Path) -> io::Result<Box<dyn Read + Send>> {
    let file = fs::File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "xz") {
        Ok(Box::new(XzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

fn parse_line(line: &str) -> Result<Option<u64>, CacheError> {
    let text = line.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }
    addr::parse_address(text).map(Some)
}
