use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use log::info;

use jacobi_relax::implementations::unsafe_impl::barrier_unsafe::barrier_unsafe;
use jacobi_relax::{ConvergenceCheck, RelaxConfig};

// 2次元ラプラス方程式の緩和計算 (バリア同期の並列版)
#[derive(Parser)]
#[command(name = "relax", about = "Parallel Jacobi relaxation on a square grid")]
struct Cli {
    /// Side length of the grid, boundary included
    dimension: usize,
    /// Number of worker threads (at most dimension - 2)
    worker_count: usize,
    /// Convergence threshold
    #[arg(allow_negative_numbers = true)]
    precision: f64,
    /// Print parallel and serial elapsed time
    #[arg(short = 't')]
    time: bool,
    /// Print the final grid
    #[arg(short = 'p')]
    print: bool,
    /// Compare |new - old| instead of new - old when checking convergence
    #[arg(long)]
    absolute: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let cli = Cli::parse();
    let check = if cli.absolute {
        ConvergenceCheck::Absolute
    } else {
        ConvergenceCheck::OneSided
    };
    let config = RelaxConfig::new(cli.dimension, cli.precision)
        .worker_count(cli.worker_count)
        .check(check);
    config.validate().context("invalid configuration")?;

    info!(
        "relaxing {}x{} grid with {} workers, precision {}",
        config.dimension, config.dimension, config.worker_count, config.precision
    );
    let outcome = barrier_unsafe(&config).context("relaxation failed")?;

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    if cli.time {
        outcome.timings.write_parallel(&mut out)?;
    }
    if cli.print {
        outcome.grid().write_to(&mut out)?;
    }
    out.flush()?;

    Ok(())
}
