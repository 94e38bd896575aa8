use crate::config::{DEFAULT_CONCURRENCY, MAX_CONCURRENCY};
use crate::probe::TransferMetadata;
use std::fmt;
use tracing::debug;

/// Inclusive byte range of the remote resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start: u64,
    end: u64,
}

impl ByteRange {
    /// `None` when `end` lies before `start`
    pub fn new(start: u64, end: u64) -> Option<Self> {
        if end < start {
            None
        } else {
            Some(Self { start, end })
        }
    }
    pub fn start(&self) -> u64 {
        self.start
    }
    pub fn end(&self) -> u64 {
        self.end
    }
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
    /// Value for the [`RANGE`][reqwest::header::RANGE] header
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// One unit of work, `range` is `None` when the whole resource is fetched unranged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub range: Option<ByteRange>,
}

impl Chunk {
    pub fn expected_len(&self) -> Option<u64> {
        self.range.map(|r| r.len())
    }
}

/// Iterator over the chunks of a resource of `length` bytes split between `workers`
#[derive(Debug, Clone, Copy)]
pub struct Ranges {
    length: u64,
    workers: usize,
    chunk_size: u64,
    current: usize,
}

impl Ranges {
    /// `workers` has to be in `1..=length`
    fn new(length: u64, workers: usize) -> Self {
        Ranges {
            length,
            workers,
            chunk_size: length / workers as u64,
            current: 0,
        }
    }
}

impl Iterator for Ranges {
    type Item = Chunk;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.workers {
            return None;
        }
        let index = self.current;
        let start = index as u64 * self.chunk_size;
        // the last chunk absorbs the remainder of the division
        let end = if index + 1 == self.workers {
            self.length - 1
        } else {
            (index as u64 + 1) * self.chunk_size - 1
        };
        self.current += 1;
        Some(Chunk {
            index,
            range: Some(ByteRange { start, end }),
        })
    }
}

/// Ordered set of chunks covering the resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    chunk_size: Option<u64>,
    chunks: Vec<Chunk>,
}

impl ChunkPlan {
    pub fn workers(&self) -> usize {
        self.chunks.len()
    }
    /// `None` when the resource is fetched in one unranged request
    pub fn chunk_size(&self) -> Option<u64> {
        self.chunk_size
    }
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }
    pub fn is_ranged(&self) -> bool {
        self.chunk_size.is_some()
    }
}

/// Clamp a requested worker count to `1..=MAX_CONCURRENCY`, anything below 1 means the default
pub fn clamp_concurrency(requested: i64) -> usize {
    if requested < 1 {
        DEFAULT_CONCURRENCY
    } else {
        (requested as u64).min(MAX_CONCURRENCY as u64) as usize
    }
}

/// Split the resource described by `metadata` between `requested` workers
///
/// Without range support or a known length the plan is a single unranged chunk.
/// The worker count never exceeds the length, so no chunk is empty.
pub fn plan(metadata: &TransferMetadata, requested: usize) -> ChunkPlan {
    let length = match metadata.content_length() {
        Some(len) if len > 0 && metadata.accepts_ranges() => len,
        _ => {
            debug!("Planning a single unranged chunk");
            return ChunkPlan {
                chunk_size: None,
                chunks: vec![Chunk {
                    index: 0,
                    range: None,
                }],
            };
        }
    };
    let workers = requested.clamp(1, MAX_CONCURRENCY);
    let workers = if (workers as u64) > length {
        length as usize
    } else {
        workers
    };
    let ranges = Ranges::new(length, workers);
    let chunk_size = ranges.chunk_size;
    debug!(
        "Planning {} chunks of {} bytes for {} bytes",
        workers, chunk_size, length
    );
    ChunkPlan {
        chunk_size: Some(chunk_size),
        chunks: ranges.collect(),
    }
}
