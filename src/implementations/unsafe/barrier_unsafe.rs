use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicI8, Ordering};
use std::sync::Barrier;
use std::thread;
use std::time::Instant;

use log::{debug, error, info, trace};

use crate::config::RelaxConfig;
use crate::error::RelaxError;
use crate::grid::{compare, relax_row, ConvergenceCheck, Direction, GridPair};
use crate::partition::{partition_rows, RowRange};
use crate::report::{RelaxOutcome, Timings};

/*
  バリア同期版 (常駐ワーカー + コーディネーター)

  - 内部行を worker_count 個の連続区間に静的に分割し、各ワーカーが担当
  - 2つのバッファ (left/right) を direction に従って入力/出力として交互に使う
  - 1ラウンド:
      ワーカー: 担当行を計算 -> work_done 待ち -> decision_made 待ち
      コーディネーター: work_done 待ち -> 収束判定 -> direction 反転 or 完了 -> decision_made
  - 参加者は ワーカー数 + 1 (コーディネーター)

  バッファはロックせずに共有する。書き込みは行の所有で分離され、
  隣の行 (ハロー) の読み取りはバリア2回で前ラウンドの書き込み完了が保証される。
  反復回数の上限もキャンセルもない。
*/

/// 両バッファへの生ポインタ
#[derive(Clone, Copy)]
struct SharedPair<'a> {
    left: *mut f64,
    right: *mut f64,
    dimension: usize,
    _pair: PhantomData<&'a mut GridPair>,
}

// ポインタ自体はどのスレッドに渡してもよい。
// 実際のアクセスは input/output_rows/view の SAFETY 条件で縛る。
unsafe impl Send for SharedPair<'_> {}
unsafe impl Sync for SharedPair<'_> {}

impl<'a> SharedPair<'a> {
    fn new(pair: &'a mut GridPair) -> Self {
        let dimension = pair.dimension();
        SharedPair {
            left: pair.left.as_mut_slice().as_mut_ptr(),
            right: pair.right.as_mut_slice().as_mut_ptr(),
            dimension,
            _pair: PhantomData,
        }
    }

    fn buffers(self, direction: Direction) -> (*mut f64, *mut f64) {
        match direction {
            Direction::LeftToRight => (self.left, self.right),
            Direction::RightToLeft => (self.right, self.left),
        }
    }

    fn len(self) -> usize {
        self.dimension * self.dimension
    }

    /// このラウンドの入力バッファ全体
    ///
    /// # Safety
    /// 返したスライスが生きている間、入力側に書き込むスレッドがないこと。
    /// (ラウンド中は誰も入力側に書かない)
    unsafe fn input(self, direction: Direction) -> &'a [f64] {
        let (src, _) = self.buffers(direction);
        unsafe { std::slice::from_raw_parts(src, self.len()) }
    }

    /// 出力バッファのうち range の行だけ
    ///
    /// # Safety
    /// range は他のワーカーの範囲と重ならないこと。
    /// 返したスライスは次のバリアより前に破棄すること。
    unsafe fn output_rows(self, direction: Direction, range: RowRange) -> &'a mut [f64] {
        let (_, dst) = self.buffers(direction);
        let n = self.dimension;
        debug_assert!(range.upper_y < n - 1);
        unsafe {
            std::slice::from_raw_parts_mut(dst.add(range.lower_y * n), range.len() * n)
        }
    }

    /// (入力, 出力)。コーディネーターが収束判定で読む。
    ///
    /// # Safety
    /// 全ワーカーがバリアで停止中で、どのワーカーも出力スライスを保持していないこと。
    unsafe fn view(self, direction: Direction) -> (&'a [f64], &'a [f64]) {
        let (src, dst) = self.buffers(direction);
        unsafe {
            (
                std::slice::from_raw_parts(src, self.len()),
                std::slice::from_raw_parts(dst, self.len()),
            )
        }
    }
}

/// コーディネーターだけが書き込み、ワーカーは読むだけのフラグ
struct RoundState {
    direction: AtomicI8,
    complete: AtomicBool,
}

impl RoundState {
    fn new() -> Self {
        RoundState {
            direction: AtomicI8::new(Direction::LeftToRight.as_i8()),
            complete: AtomicBool::new(false),
        }
    }

    fn direction(&self) -> Direction {
        Direction::from_i8(self.direction.load(Ordering::Acquire))
    }

    fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    fn flip(&self) {
        let next = self.direction().flip();
        self.direction.store(next.as_i8(), Ordering::Release);
    }

    fn finish(&self) {
        self.complete.store(true, Ordering::Release);
    }
}

/// ラウンドの区切りとなる2つのバリア (どちらも ワーカー数 + 1)
struct RoundBarriers {
    work_done: Barrier,
    decision_made: Barrier,
}

impl RoundBarriers {
    fn new(workers: usize) -> Self {
        RoundBarriers {
            work_done: Barrier::new(workers + 1),
            decision_made: Barrier::new(workers + 1),
        }
    }
}

pub fn barrier_unsafe(config: &RelaxConfig) -> Result<RelaxOutcome, RelaxError> {
    let start = Instant::now();
    config.validate()?;
    let pair = GridPair::new(config.dimension);
    run(pair, config, start)
}

pub fn barrier_unsafe_from(pair: GridPair, config: &RelaxConfig) -> Result<RelaxOutcome, RelaxError> {
    let start = Instant::now();
    config.validate_for(pair.dimension())?;
    run(pair, config, start)
}

fn run(mut pair: GridPair, config: &RelaxConfig, start: Instant) -> Result<RelaxOutcome, RelaxError> {
    let n = pair.dimension();
    let ranges = partition_rows(n - 2, config.worker_count)?;
    debug!(
        "barrier relaxation: {}x{} grid, precision {}, row ranges {:?}",
        n,
        n,
        config.precision,
        ranges.iter().map(|r| (r.lower_y, r.upper_y)).collect::<Vec<_>>()
    );

    let state = RoundState::new();
    let barriers = RoundBarriers::new(ranges.len());
    let shared = SharedPair::new(&mut pair);

    let mut timings = Timings {
        serial: start.elapsed(),
        ..Timings::default()
    };

    let rounds = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(ranges.len());
        for (index, range) in ranges.iter().copied().enumerate() {
            let state = &state;
            let barriers = &barriers;
            let spawned = thread::Builder::new()
                .name(format!("relax-worker-{}", index))
                .spawn_scoped(scope, move || worker(index, range, shared, state, barriers));

            match spawned {
                Ok(handle) => handles.push(handle),
                // 起動済みのワーカーはバリアで待っているので後始末できない
                Err(source) => spawn_failed(RelaxError::WorkerSpawn { index, source }),
            }
        }

        let rounds = coordinate(shared, &state, &barriers, config.precision, config.check, &mut timings);

        let join_start = Instant::now();
        for handle in handles {
            if let Err(panic) = handle.join() {
                std::panic::resume_unwind(panic);
            }
        }
        timings.parallel += join_start.elapsed();
        rounds
    });

    let direction = state.direction();
    info!(
        "barrier relaxation converged after {} rounds with {} workers",
        rounds,
        ranges.len()
    );

    Ok(RelaxOutcome {
        buffers: pair,
        rounds,
        direction,
        timings,
    })
}

/// ワーカー: Completion を見るまで 計算 -> バリア -> バリア を繰り返す
fn worker(index: usize, range: RowRange, shared: SharedPair<'_>, state: &RoundState, barriers: &RoundBarriers) {
    let n = shared.dimension;
    trace!("worker {} owns rows {}..={}", index, range.lower_y, range.upper_y);

    while !state.is_complete() {
        let direction = state.direction();
        {
            // SAFETY: ラウンド中に入力側へ書くスレッドはない。
            // 出力の担当行は partition_rows により他のワーカーと重ならない。
            // どちらのスライスもこのブロックを出る (バリアに入る) 前に破棄される。
            let src = unsafe { shared.input(direction) };
            let dst = unsafe { shared.output_rows(direction, range) };

            for (y, dst_row) in range.rows().zip(dst.chunks_exact_mut(n)) {
                relax_row(src, n, y, dst_row);
            }
        }

        barriers.work_done.wait();
        barriers.decision_made.wait();
    }

    trace!("worker {} exiting", index);
}

/// コーディネーター: 収束するまでラウンドごとに判定し、ラウンド数を返す
fn coordinate(
    shared: SharedPair<'_>,
    state: &RoundState,
    barriers: &RoundBarriers,
    precision: f64,
    check: ConvergenceCheck,
    timings: &mut Timings,
) -> usize {
    let n = shared.dimension;
    let mut rounds = 0;
    let mut parallel_start = Instant::now();

    loop {
        barriers.work_done.wait();
        let serial_start = Instant::now();
        timings.parallel += serial_start.duration_since(parallel_start);
        rounds += 1;

        let direction = state.direction();
        // SAFETY: 全ワーカーは decision_made で待機中で、出力スライスは破棄済み
        let (old, new) = unsafe { shared.view(direction) };
        let converged = compare(old, new, n, precision, check);

        if converged {
            state.finish();
        } else {
            state.flip();
        }
        trace!("round {}: direction {:?}, converged {}", rounds, direction, converged);

        barriers.decision_made.wait();
        parallel_start = Instant::now();
        timings.serial += parallel_start.duration_since(serial_start);

        if converged {
            return rounds;
        }
    }
}

fn spawn_failed(err: RelaxError) -> ! {
    error!("{}", err);
    eprintln!("{}", err);
    std::process::abort();
}
