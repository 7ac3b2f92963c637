use std::ops::RangeInclusive;

use crate::error::RelaxError;

/// ワーカー1つが担当する内部行の範囲 (両端を含む)。列は常に内部全体。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowRange {
    pub lower_y: usize,
    pub upper_y: usize,
}

impl RowRange {
    pub fn len(&self) -> usize {
        (self.upper_y + 1).saturating_sub(self.lower_y)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> RangeInclusive<usize> {
        self.lower_y..=self.upper_y
    }
}

/// 内部行 1..=interior_rows を workers 個の連続区間に分ける。
/// 余りの行は先頭のワーカーから1行ずつ配る。
pub fn partition_rows(interior_rows: usize, workers: usize) -> Result<Vec<RowRange>, RelaxError> {
    if workers == 0 {
        return Err(RelaxError::NoWorkers);
    }
    if workers > interior_rows {
        return Err(RelaxError::TooManyWorkers {
            workers,
            interior_rows,
        });
    }

    // 各ワーカーは lower_y から base 行先まで (= base + 1 行) を基本とする
    let base = interior_rows / workers - 1;
    let mut remainder = interior_rows % workers;

    let mut ranges = Vec::with_capacity(workers);
    let mut lower_y = 1;
    for _ in 0..workers {
        let mut upper_y = lower_y + base;
        if remainder > 0 {
            upper_y += 1;
            remainder -= 1;
        }
        ranges.push(RowRange { lower_y, upper_y });
        lower_y = upper_y + 1;
    }

    debug_assert_eq!(lower_y, interior_rows + 1);
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths(ranges: &[RowRange]) -> Vec<usize> {
        ranges.iter().map(RowRange::len).collect()
    }

    #[test]
    fn ten_by_ten_with_three_workers() {
        let ranges = partition_rows(8, 3).unwrap();
        assert_eq!(lengths(&ranges), vec![3, 3, 2]);
        assert_eq!(ranges[0], RowRange { lower_y: 1, upper_y: 3 });
        assert_eq!(ranges[1], RowRange { lower_y: 4, upper_y: 6 });
        assert_eq!(ranges[2], RowRange { lower_y: 7, upper_y: 8 });
    }

    #[test]
    fn single_worker_takes_every_row() {
        let ranges = partition_rows(8, 1).unwrap();
        assert_eq!(ranges, vec![RowRange { lower_y: 1, upper_y: 8 }]);
    }

    #[test]
    fn one_row_per_worker() {
        let ranges = partition_rows(5, 5).unwrap();
        assert_eq!(lengths(&ranges), vec![1; 5]);
        for (i, range) in ranges.iter().enumerate() {
            assert_eq!(range.lower_y, i + 1);
            assert_eq!(range.upper_y, i + 1);
        }
    }

    #[test]
    fn rejects_bad_worker_counts() {
        assert!(matches!(partition_rows(4, 0), Err(RelaxError::NoWorkers)));
        assert!(matches!(
            partition_rows(4, 5),
            Err(RelaxError::TooManyWorkers { workers: 5, interior_rows: 4 })
        ));
    }

    #[test]
    fn covers_interior_exactly_for_all_sizes() {
        for n in 3..=40usize {
            let m = n - 2;
            for k in 1..=m {
                let ranges = partition_rows(m, k).unwrap();
                assert_eq!(ranges.len(), k);

                let base = m / k - 1;
                let remainder = m % k;

                let mut expected_lower = 1;
                let mut larger = 0;
                for range in &ranges {
                    assert_eq!(range.lower_y, expected_lower, "n={} k={}", n, k);
                    assert!(range.upper_y >= range.lower_y);
                    let len = range.len();
                    assert!(len == base + 1 || len == base + 2, "n={} k={} len={}", n, k, len);
                    if len == base + 2 {
                        larger += 1;
                    }
                    expected_lower = range.upper_y + 1;
                }
                assert_eq!(expected_lower, n - 1, "n={} k={}", n, k);
                assert_eq!(larger, remainder, "n={} k={}", n, k);
                assert_eq!(lengths(&ranges).iter().sum::<usize>(), m);
            }
        }
    }
}
