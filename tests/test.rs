use jacobi_relax::grid::{has_converged, relax_rows, ConvergenceCheck, Grid, GridPair};
use jacobi_relax::implementations::safe::single::relax_single;
use jacobi_relax::implementations::unsafe_impl::barrier_unsafe::{barrier_unsafe, barrier_unsafe_from};
use jacobi_relax::partition::partition_rows;
use jacobi_relax::{RelaxConfig, RelaxError};

fn assert_boundary(grid: &Grid) {
    let n = grid.dimension();
    for i in 0..n {
        assert_eq!(grid.get(0, i), Some(1.0), "top boundary at (0, {})", i);
        assert_eq!(grid.get(i, 0), Some(1.0), "left boundary at ({}, 0)", i);
    }
    for i in 1..n {
        assert_eq!(grid.get(n - 1, i), Some(0.0), "bottom boundary at ({}, {})", n - 1, i);
        assert_eq!(grid.get(i, n - 1), Some(0.0), "right boundary at ({}, {})", i, n - 1);
    }
}

#[test_log::test]
fn test_boundary_conditions() {
    for workers in [1, 3, 6] {
        let config = RelaxConfig::new(8, 0.001).worker_count(workers);
        let outcome = barrier_unsafe(&config).unwrap();

        // 両方のバッファで境界が保持されている
        assert_boundary(&outcome.buffers.left);
        assert_boundary(&outcome.buffers.right);
    }

    println!("✓ Boundary conditions: both buffers keep their boundaries!");
}

#[test]
fn test_five_by_five_single_worker() {
    let config = RelaxConfig::new(5, 0.01);
    let outcome = barrier_unsafe(&config).unwrap();
    let grid = outcome.grid();

    let corner = grid.get(1, 1).unwrap();
    assert!(corner > 0.0 && corner < 1.0, "(1,1) = {}", corner);

    // "1" の境界から離れるほど小さくなる
    let diagonal: Vec<f64> = (1..4).map(|i| grid.get(i, i).unwrap()).collect();
    assert!(diagonal[0] > diagonal[1] && diagonal[1] > diagonal[2], "{:?}", diagonal);
    let top_row: Vec<f64> = (1..4).map(|x| grid.get(1, x).unwrap()).collect();
    assert!(top_row[0] > top_row[1] && top_row[1] > top_row[2], "{:?}", top_row);

    // 境界条件が対角線について対称なので解も対称
    for y in 1..4 {
        for x in 1..4 {
            let a = grid.get(y, x).unwrap();
            let b = grid.get(x, y).unwrap();
            assert!((a - b).abs() < 1e-12, "({}, {}) = {} vs {}", y, x, a, b);
        }
    }

    let serial = relax_single(&config).unwrap();
    assert_eq!(serial.grid(), grid);
}

#[test]
fn test_converged_grid_is_near_harmonic() {
    let precision = 1e-7;
    let outcome = barrier_unsafe(&RelaxConfig::new(9, precision).worker_count(3)).unwrap();
    let grid = outcome.grid();

    for y in 1..8 {
        for x in 1..8 {
            let average = (grid.get(y - 1, x).unwrap()
                + grid.get(y + 1, x).unwrap()
                + grid.get(y, x - 1).unwrap()
                + grid.get(y, x + 1).unwrap())
                / 4.0;
            assert!((average - grid.get(y, x).unwrap()).abs() <= 1e-5);
        }
    }
}

#[test]
fn test_no_round_after_completion() {
    let config = RelaxConfig::new(10, 0.001).worker_count(4);
    let outcome = barrier_unsafe(&config).unwrap();

    // 最終ラウンドの入力から1回だけ緩和すると結果と完全に一致する
    let mut replay = outcome.previous().clone();
    relax_rows(outcome.previous(), &mut replay, 1..=8);
    assert_eq!(&replay, outcome.grid());

    // 収束後にもう1ラウンド回しても precision を超えて増えるセルはない
    let mut next = outcome.grid().clone();
    relax_rows(outcome.grid(), &mut next, 1..=8);
    assert!(has_converged(outcome.grid(), &next, config.precision, config.check));
}

#[test]
fn test_result_is_output_of_final_direction() {
    let config = RelaxConfig::new(6, 0.01).worker_count(2);
    let outcome = barrier_unsafe(&config).unwrap();
    let (input, output) = outcome.buffers.view(outcome.direction);
    assert_eq!(output, outcome.grid());
    assert_eq!(input, outcome.previous());
    assert!(has_converged(input, output, config.precision, config.check));
}

#[test]
fn test_one_row_per_worker_and_single_worker_coverage() {
    let n = 12;
    let ranges = partition_rows(n - 2, n - 2).unwrap();
    assert!(ranges.iter().all(|r| r.len() == 1));

    let single_range = partition_rows(n - 2, 1).unwrap();
    assert_eq!(single_range.len(), 1);
    assert_eq!(single_range[0].rows(), 1..=n - 2);

    let per_row = barrier_unsafe(&RelaxConfig::new(n, 0.001).worker_count(n - 2)).unwrap();
    let one = barrier_unsafe(&RelaxConfig::new(n, 0.001)).unwrap();
    assert_eq!(per_row.grid(), one.grid());
    assert_eq!(per_row.rounds, one.rounds);
}

#[test]
fn test_absolute_check_never_stops_earlier() {
    // 初期値を境界より大きくしておくと値が下がっていく
    let mut grid = Grid::new(8);
    for y in 1..7 {
        for x in 1..7 {
            grid.set(y, x, 3.0).unwrap();
        }
    }

    let one_sided = RelaxConfig::new(8, 0.001).worker_count(2);
    let absolute = one_sided.check(ConvergenceCheck::Absolute);

    let a = barrier_unsafe_from(GridPair::from_grid(grid.clone()), &one_sided).unwrap();
    let b = barrier_unsafe_from(GridPair::from_grid(grid), &absolute).unwrap();

    // 片側比較は減少を見逃すので1ラウンド目で止まる
    assert_eq!(a.rounds, 1);
    assert!(b.rounds > a.rounds);
    assert!(has_converged(b.previous(), b.grid(), 0.001, ConvergenceCheck::Absolute));
}

#[test]
fn test_configuration_errors() {
    assert!(matches!(
        barrier_unsafe(&RelaxConfig::new(5, 0.01).worker_count(4)),
        Err(RelaxError::TooManyWorkers { workers: 4, interior_rows: 3 })
    ));
    assert!(matches!(
        barrier_unsafe(&RelaxConfig::new(5, 0.01).worker_count(0)),
        Err(RelaxError::NoWorkers)
    ));
    assert!(matches!(
        relax_single(&RelaxConfig::new(2, 0.01)),
        Err(RelaxError::DimensionTooSmall(2))
    ));
    assert!(matches!(
        barrier_unsafe_from(GridPair::new(6), &RelaxConfig::new(7, 0.01)),
        Err(RelaxError::DimensionMismatch { expected: 7, actual: 6 })
    ));
}

#[test]
fn test_print_final_grid() {
    let outcome = relax_single(&RelaxConfig::new(3, 0.01)).unwrap();
    let mut out = Vec::new();
    outcome.grid().write_to(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    // 唯一の内部セル: (1 + 0 + 1 + 0) / 4
    assert_eq!(lines[1], "1.000000 0.500000 0.000000 ");
}
