use std::time::Instant;

use log::{debug, info};

use crate::config::RelaxConfig;
use crate::error::RelaxError;
use crate::grid::{has_converged, relax_rows, Direction, GridPair};
use crate::report::{RelaxOutcome, Timings};

/*
  シングルスレッド版 (基準実装)

  ワーカー1つ・バリアなしの並列版と同じ手順:
  - direction に従って入力/出力バッファを決める
  - 内部セル全体を緩和
  - 収束判定。未収束なら direction を反転して繰り返す

  反復回数の上限はない。収束しない入力を与えると終わらない。
*/

pub fn relax_single(config: &RelaxConfig) -> Result<RelaxOutcome, RelaxError> {
    let start = Instant::now();
    config.validate()?;
    let pair = GridPair::new(config.dimension);
    run(pair, config, start)
}

/// 初期値を与えた格子から開始する
pub fn relax_single_from(pair: GridPair, config: &RelaxConfig) -> Result<RelaxOutcome, RelaxError> {
    let start = Instant::now();
    config.validate_for(pair.dimension())?;
    run(pair, config, start)
}

fn run(mut pair: GridPair, config: &RelaxConfig, start: Instant) -> Result<RelaxOutcome, RelaxError> {
    let n = pair.dimension();
    let mut direction = Direction::LeftToRight;
    let mut rounds = 0;

    debug!("serial relaxation: {}x{} grid, precision {}", n, n, config.precision);

    loop {
        let (input, output) = pair.split(direction);
        relax_rows(input, output, 1..=n - 2);
        rounds += 1;

        if has_converged(input, output, config.precision, config.check) {
            break;
        }
        direction = direction.flip();
    }

    info!("serial relaxation converged after {} rounds", rounds);

    Ok(RelaxOutcome {
        buffers: pair,
        rounds,
        direction,
        timings: Timings {
            serial: start.elapsed(),
            ..Timings::default()
        },
    })
}
