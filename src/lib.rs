pub mod config;
pub mod error;
pub mod grid;
pub mod implementations;
pub mod partition;
pub mod report;

pub use config::RelaxConfig;
pub use error::RelaxError;
pub use grid::{ConvergenceCheck, Direction, Grid, GridPair};
pub use report::{RelaxOutcome, Timings};
