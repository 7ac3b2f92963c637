use std::io::{self, Write};
use std::ops::RangeInclusive;

use crate::error::RelaxError;

pub const HOT_EDGE: f64 = 1.0;   // 0行目・0列目
pub const COLD_EDGE: f64 = 0.0;  // それ以外の境界と内部の初期値

/// n×n の格子。1本の連続したバッファに行優先で格納する。
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    data: Vec<f64>,
    dimension: usize,
}

impl Grid {
    /// 0行目と0列目を 1.0、それ以外を 0.0 で初期化する (ディリクレ境界条件)
    pub fn new(dimension: usize) -> Self {
        let mut data = vec![COLD_EDGE; dimension * dimension];
        for (idx, cell) in data.iter_mut().enumerate() {
            if idx / dimension == 0 || idx % dimension == 0 {
                *cell = HOT_EDGE;
            }
        }
        Grid { data, dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.dimension && col < self.dimension {
            Some(self.data[row * self.dimension + col])
        } else {
            None
        }
    }

    /// 内部セルのみ書き換え可能。境界セルは初期化後に変化しない。
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), RelaxError> {
        if !self.is_interior(row, col) {
            return Err(RelaxError::OutOfBounds {
                row,
                col,
                dimension: self.dimension,
            });
        }
        self.data[row * self.dimension + col] = value;
        Ok(())
    }

    pub fn is_interior(&self, row: usize, col: usize) -> bool {
        (1..self.dimension.saturating_sub(1)).contains(&row)
            && (1..self.dimension.saturating_sub(1)).contains(&col)
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.dimension..(row + 1) * self.dimension]
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.dimension..(row + 1) * self.dimension]
    }

    /// 1行1行、"%f " 形式で書き出す
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for row in self.data.chunks(self.dimension) {
            for value in row {
                write!(out, "{:.6} ", value)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn print(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = io::BufWriter::new(stdout.lock());
        self.write_to(&mut out)?;
        out.flush()
    }
}

/// どちらのバッファを入力として読むか。元の ±1 に対応する。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(i8)]
pub enum Direction {
    /// left が入力、right が出力
    #[default]
    LeftToRight = 1,
    /// right が入力、left が出力
    RightToLeft = -1,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::LeftToRight => Direction::RightToLeft,
            Direction::RightToLeft => Direction::LeftToRight,
        }
    }

    pub fn as_i8(self) -> i8 {
        self as i8
    }

    pub fn from_i8(sign: i8) -> Self {
        if sign < 0 {
            Direction::RightToLeft
        } else {
            Direction::LeftToRight
        }
    }
}

/// 収束判定の比較方法
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConvergenceCheck {
    /// new - old > precision のときだけ未収束とみなす (値が大きく下がったセルは見逃す)
    #[default]
    OneSided,
    /// |new - old| > precision で未収束
    Absolute,
}

impl ConvergenceCheck {
    #[inline]
    pub fn exceeds(self, diff: f64, precision: f64) -> bool {
        match self {
            ConvergenceCheck::OneSided => diff > precision,
            ConvergenceCheck::Absolute => diff.abs() > precision,
        }
    }
}

/// ダブルバッファ。境界セルは両方で常に一致する。
#[derive(Clone, Debug, PartialEq)]
pub struct GridPair {
    pub left: Grid,
    pub right: Grid,
}

impl GridPair {
    pub fn new(dimension: usize) -> Self {
        Self::from_grid(Grid::new(dimension))
    }

    /// 同じ初期値を左右両方に複製する
    pub fn from_grid(grid: Grid) -> Self {
        GridPair {
            right: grid.clone(),
            left: grid,
        }
    }

    pub fn dimension(&self) -> usize {
        self.left.dimension()
    }

    pub fn split(&mut self, direction: Direction) -> (&Grid, &mut Grid) {
        match direction {
            Direction::LeftToRight => (&self.left, &mut self.right),
            Direction::RightToLeft => (&self.right, &mut self.left),
        }
    }

    /// (入力, 出力)
    pub fn view(&self, direction: Direction) -> (&Grid, &Grid) {
        match direction {
            Direction::LeftToRight => (&self.left, &self.right),
            Direction::RightToLeft => (&self.right, &self.left),
        }
    }

    /// 最新の値を持つバッファ (そのラウンドの出力側)
    pub fn result(&self, direction: Direction) -> &Grid {
        self.view(direction).1
    }

    pub fn into_result(self, direction: Direction) -> Grid {
        match direction {
            Direction::LeftToRight => self.right,
            Direction::RightToLeft => self.left,
        }
    }
}

/// y行目の内部列を上下左右4点の平均で更新する。
/// src は入力バッファ全体、dst_row は出力バッファの y 行目。
#[inline]
pub fn relax_row(src: &[f64], dimension: usize, y: usize, dst_row: &mut [f64]) {
    let n = dimension;
    let above = &src[(y - 1) * n..y * n];
    let here = &src[y * n..(y + 1) * n];
    let below = &src[(y + 1) * n..(y + 2) * n];

    for x in 1..n - 1 {
        dst_row[x] = (above[x] + below[x] + here[x - 1] + here[x + 1]) / 4.0;
    }
}

/// rows の各行を input から output へ緩和する
pub fn relax_rows(input: &Grid, output: &mut Grid, rows: RangeInclusive<usize>) {
    let n = input.dimension();
    let src = input.as_slice();
    for y in rows {
        relax_row(src, n, y, output.row_mut(y));
    }
}

/// 全内部セルについて new - old を比較する。
/// 1つでも precision を超えたら false。
pub fn compare(old: &[f64], new: &[f64], dimension: usize, precision: f64, check: ConvergenceCheck) -> bool {
    let n = dimension;
    for y in 1..n - 1 {
        let row = y * n;
        for x in 1..n - 1 {
            if check.exceeds(new[row + x] - old[row + x], precision) {
                return false;
            }
        }
    }

    true
}

pub fn has_converged(input: &Grid, output: &Grid, precision: f64, check: ConvergenceCheck) -> bool {
    debug_assert_eq!(input.dimension(), output.dimension());
    compare(input.as_slice(), output.as_slice(), input.dimension(), precision, check)
}
