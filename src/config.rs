use crate::error::RelaxError;
use crate::grid::ConvergenceCheck;

/// 緩和計算の設定
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelaxConfig {
    /// 格子の一辺のセル数 (境界を含む)
    pub dimension: usize,
    /// ワーカースレッド数。dimension - 2 以下。
    pub worker_count: usize,
    /// 収束判定のしきい値
    pub precision: f64,
    pub check: ConvergenceCheck,
}

impl RelaxConfig {
    pub fn new(dimension: usize, precision: f64) -> Self {
        RelaxConfig {
            dimension,
            worker_count: 1,
            precision,
            check: ConvergenceCheck::default(),
        }
    }

    pub fn worker_count(mut self, n: usize) -> Self {
        self.worker_count = n;
        self
    }

    pub fn check(mut self, check: ConvergenceCheck) -> Self {
        self.check = check;
        self
    }

    pub fn interior_rows(&self) -> usize {
        self.dimension.saturating_sub(2)
    }

    pub fn validate(&self) -> Result<(), RelaxError> {
        if self.dimension < 3 {
            return Err(RelaxError::DimensionTooSmall(self.dimension));
        }
        if !self.precision.is_finite() || self.precision < 0.0 {
            return Err(RelaxError::InvalidPrecision(self.precision));
        }
        if self.worker_count == 0 {
            return Err(RelaxError::NoWorkers);
        }
        if self.worker_count > self.interior_rows() {
            return Err(RelaxError::TooManyWorkers {
                workers: self.worker_count,
                interior_rows: self.interior_rows(),
            });
        }
        Ok(())
    }

    /// 既存の格子をこの設定で使えるか確認する
    pub fn validate_for(&self, grid_dimension: usize) -> Result<(), RelaxError> {
        if grid_dimension != self.dimension {
            return Err(RelaxError::DimensionMismatch {
                expected: self.dimension,
                actual: grid_dimension,
            });
        }
        self.validate()
    }
}
