use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested worker count is invalid.
    #[error("worker count must be > 0, got {0}")]
    InvalidWorkerCount(usize),

    /// The buffer cannot hold the requested rows.
    #[error("buffer of length {len} cannot hold {rows} rows of stride {stride}")]
    BufferTooSmall {
        /// Buffer length in elements.
        len: usize,
        /// Number of rows requested.
        rows: usize,
        /// Row stride in elements.
        stride: usize,
    },
}

/// Controls how many row chunks an operation is split into and where they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// One chunk per available hardware thread, run on the global Rayon thread pool.
    #[default]
    Auto,

    /// Run sequentially on the current thread as a single chunk.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Split the rows into `n` chunks and run them on the global Rayon thread pool.
    Workers(usize),

    /// Split the rows into `n` chunks and run them on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Resolve the strategy to the number of row chunks to use.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::InvalidWorkerCount`] for `Workers(0)` and `Fixed(0)`.
    pub fn num_workers(&self) -> Result<usize, ParallelError> {
        match *self {
            ExecutionStrategy::Auto => Ok(std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)),
            ExecutionStrategy::Serial => Ok(1),
            ExecutionStrategy::Workers(0) | ExecutionStrategy::Fixed(0) => {
                Err(ParallelError::InvalidWorkerCount(0))
            }
            ExecutionStrategy::Workers(n) | ExecutionStrategy::Fixed(n) => Ok(n),
        }
    }

    /// Run `op` inside the thread pool selected by the strategy.
    ///
    /// `Fixed` builds a dedicated pool for the call; every other strategy runs `op`
    /// directly on the calling thread, and work spawned from it goes to the global pool.
    pub fn install<R, F>(&self, op: F) -> Result<R, ParallelError>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match *self {
            ExecutionStrategy::Fixed(n) => {
                if n == 0 {
                    return Err(ParallelError::InvalidWorkerCount(n));
                }
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| ParallelError::BuildError(e.to_string()))?;
                Ok(pool.install(op))
            }
            _ => Ok(op()),
        }
    }
}

/// A contiguous range of image rows assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowChunk {
    /// First row of the chunk.
    pub start: usize,
    /// Number of rows in the chunk.
    pub len: usize,
}

impl RowChunk {
    /// One past the last row of the chunk.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Partition `height` rows into contiguous chunks for `workers` workers.
///
/// The first `workers - 1` chunks get `height / workers` rows each and the last chunk
/// takes whatever is left, so the chunks cover `[0, height)` exactly once. When there
/// are fewer rows than workers a single chunk covers the whole image.
///
/// # Arguments
///
/// * `height` - The number of rows to split.
/// * `workers` - The number of workers. Zero is treated as one.
///
/// # Returns
///
/// The chunks in row order. Empty when `height` is zero.
///
/// # Examples
///
/// ```
/// use wrapconv_imgproc::parallel::{partition_rows, RowChunk};
///
/// let chunks = partition_rows(10, 3);
/// assert_eq!(
///     chunks,
///     vec![
///         RowChunk { start: 0, len: 3 },
///         RowChunk { start: 3, len: 3 },
///         RowChunk { start: 6, len: 4 },
///     ]
/// );
/// ```
pub fn partition_rows(height: usize, workers: usize) -> Vec<RowChunk> {
    if height == 0 {
        return Vec::new();
    }

    let workers = workers.max(1);
    let rows_per_worker = height / workers;
    if rows_per_worker == 0 {
        return vec![RowChunk {
            start: 0,
            len: height,
        }];
    }

    let mut chunks = (0..workers - 1)
        .map(|i| RowChunk {
            start: i * rows_per_worker,
            len: rows_per_worker,
        })
        .collect::<Vec<_>>();

    let last_start = (workers - 1) * rows_per_worker;
    chunks.push(RowChunk {
        start: last_start,
        len: height - last_start,
    });

    chunks
}

/// Split a row-major buffer into one mutable sub-slice per chunk.
///
/// The chunks must be in row order and contiguous, as produced by [`partition_rows`].
/// Every returned slice is borrowed from a distinct region of `buf`, so two chunks can
/// never alias the same rows.
///
/// # Arguments
///
/// * `buf` - The buffer to split.
/// * `row_stride` - The number of elements per row.
/// * `chunks` - The row chunks.
///
/// # Errors
///
/// Returns [`ParallelError::BufferTooSmall`] if `buf` does not hold all the chunk rows.
pub fn split_rows_mut<'a, T>(
    buf: &'a mut [T],
    row_stride: usize,
    chunks: &[RowChunk],
) -> Result<Vec<(RowChunk, &'a mut [T])>, ParallelError> {
    let rows = chunks.last().map_or(0, RowChunk::end);
    if buf.len() < rows * row_stride {
        return Err(ParallelError::BufferTooSmall {
            len: buf.len(),
            rows,
            stride: row_stride,
        });
    }

    let mut rest = buf;
    let mut parts = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(chunk.len * row_stride);
        parts.push((*chunk, head));
        rest = tail;
    }

    Ok(parts)
}

/// Run `op` on every chunk, spawning all but the last one on the Rayon pool.
///
/// The last chunk is evaluated on the calling thread while the others run, and the
/// function returns once every chunk has finished. A single chunk never touches the pool.
/// `op` receives the chunk index in row order, the chunk and its rows.
///
/// # Arguments
///
/// * `parts` - The chunks and their rows, as produced by [`split_rows_mut`].
/// * `op` - The operation to run on each chunk.
pub fn for_each_chunk<T, F>(mut parts: Vec<(RowChunk, &mut [T])>, op: F)
where
    T: Send,
    F: Fn(usize, RowChunk, &mut [T]) + Sync,
{
    let Some((last_chunk, last_rows)) = parts.pop() else {
        return;
    };
    let last_id = parts.len();

    if parts.is_empty() {
        op(last_id, last_chunk, last_rows);
        return;
    }

    let op = &op;
    rayon::in_place_scope(|s| {
        for (id, (chunk, rows)) in parts.into_iter().enumerate() {
            s.spawn(move |_| op(id, chunk, rows));
        }

        op(last_id, last_chunk, last_rows);
    });
}
