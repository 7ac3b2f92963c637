use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use jacobi_relax::implementations::safe::rayon::relax_rayon;
use jacobi_relax::implementations::safe::single::relax_single;
use jacobi_relax::implementations::unsafe_impl::barrier_unsafe::barrier_unsafe;
use jacobi_relax::{RelaxConfig, RelaxError, RelaxOutcome};

#[derive(Parser)]
#[command(name = "bench", about = "Compare serial, barrier and rayon relaxation")]
struct Cli {
    dimension: usize,
    worker_count: usize,
    precision: f64,
    /// Measured runs per implementation
    #[arg(long, default_value_t = 15)]
    iterations: usize,
    /// Unmeasured warm-up runs per implementation
    #[arg(long, default_value_t = 3)]
    warmup: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_micros()
        .init();

    let cli = Cli::parse();
    let config = RelaxConfig::new(cli.dimension, cli.precision).worker_count(cli.worker_count);
    config.validate().context("invalid configuration")?;
    anyhow::ensure!(cli.iterations > 0, "--iterations must be at least 1");

    println!("=== Jacobi relaxation benchmark ===");
    println!(
        "dimension: {}, workers: {}, precision: {}, iterations: {}\n",
        config.dimension, config.worker_count, config.precision, cli.iterations
    );

    run_benchmark("Single Thread", &cli, || relax_single(&config))?;
    run_benchmark("Barrier", &cli, || barrier_unsafe(&config))?;
    run_benchmark("Rayon", &cli, || relax_rayon(&config))?;

    println!("=== done ===");
    Ok(())
}

fn run_benchmark<F>(name: &str, cli: &Cli, mut bench_fn: F) -> anyhow::Result<()>
where
    F: FnMut() -> Result<RelaxOutcome, RelaxError>,
{
    println!("{}:", name);

    // ウォームアップ
    for _ in 0..cli.warmup {
        bench_fn()?;
        std::thread::sleep(Duration::from_millis(100));
    }

    // 本番計測
    let mut times = Vec::with_capacity(cli.iterations);
    let mut rounds = 0;
    for i in 0..cli.iterations {
        let outcome = bench_fn()?;
        let duration = outcome.timings.total();
        rounds = outcome.rounds;
        times.push(duration);
        println!("  run {:2}: {:?}", i + 1, duration);

        std::thread::sleep(Duration::from_millis(50));
    }

    // 統計計算
    times.sort();
    let median = times[times.len() / 2];
    let avg = times.iter().sum::<Duration>() / times.len() as u32;
    let min = times[0];
    let max = times[times.len() - 1];

    println!("  ---");
    println!("  rounds: {}", rounds);
    println!("  min:    {:?}", min);
    println!("  median: {:?}", median);
    println!("  mean:   {:?}", avg);
    println!("  max:    {:?}", max);
    println!();
    Ok(())
}
