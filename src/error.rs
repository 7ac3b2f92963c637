use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelaxError {
    #[error("dimension must be at least 3 (got {0})")]
    DimensionTooSmall(usize),
    #[error("precision must be a finite, non-negative number (got {0})")]
    InvalidPrecision(f64),
    #[error("worker count must be at least 1")]
    NoWorkers,
    #[error("worker count {workers} exceeds the {interior_rows} interior rows")]
    TooManyWorkers { workers: usize, interior_rows: usize },
    #[error("cell ({row}, {col}) is not an interior cell of a {dimension}x{dimension} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        dimension: usize,
    },
    #[error("grid is {actual}x{actual} but the configuration expects {expected}x{expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("could not build the rayon thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("could not create worker thread {index}: {source}")]
    WorkerSpawn {
        index: usize,
        #[source]
        source: io::Error,
    },
}
