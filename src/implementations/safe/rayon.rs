use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::config::RelaxConfig;
use crate::error::RelaxError;
use crate::grid::{relax_row, Direction, GridPair};
use crate::report::{RelaxOutcome, Timings};

/*
  Rayon版

  ラウンドごとに出力バッファの内部行を par_chunks_mut で分割し、
  各行を別々のタスクで計算する。書き込み先が行単位で分離しているので
  ロックは不要。収束判定も行単位で並列に行う。

  バリア版と違いスレッドは常駐しない (ラウンドごとに fork/join)。
  比較とベンチマーク用。
*/

pub fn relax_rayon(config: &RelaxConfig) -> Result<RelaxOutcome, RelaxError> {
    let start = Instant::now();
    config.validate()?;
    let pair = GridPair::new(config.dimension);
    run(pair, config, start)
}

pub fn relax_rayon_from(pair: GridPair, config: &RelaxConfig) -> Result<RelaxOutcome, RelaxError> {
    let start = Instant::now();
    config.validate_for(pair.dimension())?;
    run(pair, config, start)
}

fn run(mut pair: GridPair, config: &RelaxConfig, start: Instant) -> Result<RelaxOutcome, RelaxError> {
    let n = pair.dimension();
    let precision = config.precision;
    let check = config.check;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_count)
        .thread_name(|i| format!("relax-rayon-{}", i))
        .build()?;

    debug!(
        "rayon relaxation: {}x{} grid, {} threads, precision {}",
        n, n, config.worker_count, precision
    );

    let setup = start.elapsed();
    let parallel_start = Instant::now();

    let (rounds, direction) = pool.install(|| {
        let mut direction = Direction::LeftToRight;
        let mut rounds = 0;

        loop {
            let (input, output) = pair.split(direction);
            let src = input.as_slice();

            // 内部行 (1行目 ～ n-2行目) のみを切り出して行ごとに並列計算
            output.as_mut_slice()[n..(n - 1) * n]
                .par_chunks_mut(n)
                .enumerate()
                .for_each(|(r, dst_row)| relax_row(src, n, r + 1, dst_row));
            rounds += 1;

            let dst = output.as_slice();
            let converged = (1..n - 1).into_par_iter().all(|y| {
                let row = y * n;
                (1..n - 1).all(|x| !check.exceeds(dst[row + x] - src[row + x], precision))
            });

            if converged {
                break (rounds, direction);
            }
            direction = direction.flip();
        }
    });

    info!("rayon relaxation converged after {} rounds", rounds);

    Ok(RelaxOutcome {
        buffers: pair,
        rounds,
        direction,
        timings: Timings {
            parallel: parallel_start.elapsed(),
            serial: setup,
        },
    })
}
