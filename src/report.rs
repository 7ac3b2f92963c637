use std::io::{self, Write};
use std::time::Duration;

use crate::grid::{Direction, Grid, GridPair};

/// 経過時間の内訳
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Timings {
    /// ワーカーの計算とバリア待ち
    pub parallel: Duration,
    /// 初期化とコーディネーターの判定処理
    pub serial: Duration,
}

impl Timings {
    pub fn total(&self) -> Duration {
        self.parallel + self.serial
    }

    pub fn write_parallel<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Parallel time: {:.6}", self.parallel.as_secs_f64())?;
        writeln!(out, "Serial time: {:.6}", self.serial.as_secs_f64())
    }

    pub fn write_serial<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Serial time: {:.6}", self.serial.as_secs_f64())
    }
}

/// 収束後の結果
#[derive(Clone, Debug)]
pub struct RelaxOutcome {
    /// 両バッファ。最新値は direction の出力側にある。
    pub buffers: GridPair,
    /// 実行したラウンド数 (最後の収束判定ラウンドを含む)
    pub rounds: usize,
    /// 最後のラウンドの向き
    pub direction: Direction,
    pub timings: Timings,
}

impl RelaxOutcome {
    pub fn grid(&self) -> &Grid {
        self.buffers.result(self.direction)
    }

    /// 最後のラウンドの入力側 (1つ前の値)
    pub fn previous(&self) -> &Grid {
        self.buffers.view(self.direction).0
    }

    pub fn into_grid(self) -> Grid {
        self.buffers.into_result(self.direction)
    }
}
