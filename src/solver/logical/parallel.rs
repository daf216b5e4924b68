//! The independently-parallel orchestrator: several workers run the full
//! dirty-box sweep concurrently over one shared board.
//!
//! Workers coordinate through the board's advisory counters. Before working
//! on a box a worker must move the box's writer counter from 0 to 1 and
//! then the reader counter of the scanned row band or column stack from 0
//! to 1. On contention the worker first simply skips the box; only when a
//! whole sweep made no progress while contention was observed does it relax
//! the avoidance and increment the counters unconditionally (multiple
//! readers of one line are harmless, and a box writer counter above 1 can
//! only arise once its holder has stopped making progress anyway). Releases
//! happen in reverse acquisition order on every exit path, including
//! contradictions.
//!
//! A worker exits its sweep when a full pass finds no dirty box and no
//! contention. Once all workers have exited, the guess driver branches onto
//! the thread pool as in the other variants.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{NUM_BOXES_X, NUM_BOXES_Y, SudokuGrid};
use crate::error::{Axis, SolveResult};
use crate::solver::{Solution, Solver};
use crate::solver::logical::{SolveStats, solve_shared, unsolvable};
use crate::solver::logical::board::{Board, SharedBoard};
use crate::solver::logical::scheduler;

/// The number of workers that sweep one board concurrently if not
/// configured otherwise.
const DEFAULT_WORKERS: usize = 3;

/// A [Solver] running the same deductions as
/// [LogicalSolver](super::LogicalSolver), with several workers sweeping the
/// shared grid state concurrently and guess branches solved as parallel
/// tasks on the thread pool.
pub struct ParallelLogicalSolver {
    workers: usize
}

impl ParallelLogicalSolver {

    /// Creates a new parallel logical solver with the given number of
    /// concurrent sweep workers per grid state. `workers` must be at least
    /// one.
    pub fn new(workers: usize) -> ParallelLogicalSolver {
        assert!(workers > 0, "at least one sweep worker is required");

        ParallelLogicalSolver { workers }
    }

    /// Solves the puzzle like [Solver::solve] and additionally reports
    /// [SolveStats].
    pub fn solve_with_stats(&self, grid: &SudokuGrid)
            -> (Solution, SolveStats) {
        let mut stats = SolveStats::default();
        let board = SharedBoard::blank();

        if let Err(reason) = board.apply_givens(grid) {
            return (unsolvable(&board, reason), stats);
        }

        let guesses = AtomicUsize::new(0);
        let result =
            solve_shared(&board, &|shared| self.propagate(shared), &guesses);
        stats.guesses = guesses.load(Ordering::Relaxed);

        match result {
            Ok(solved) => (Solution::Solved(solved), stats),
            Err(reason) => (unsolvable(&board, reason), stats)
        }
    }

    /// Runs the configured number of sweep workers over the board until all
    /// of them quiesce. The first contradiction any worker found is
    /// reported; the other workers finish their sweep on their own.
    fn propagate(&self, board: &SharedBoard) -> SolveResult<()> {
        let mut outcomes: Vec<SolveResult<()>> = vec![Ok(()); self.workers];

        rayon::scope(|scope| {
            for outcome in outcomes.iter_mut() {
                scope.spawn(move |_| {
                    *outcome = sweep(board);
                });
            }
        });

        for outcome in outcomes {
            outcome?;
        }

        Ok(())
    }
}

impl Default for ParallelLogicalSolver {
    fn default() -> ParallelLogicalSolver {
        ParallelLogicalSolver::new(DEFAULT_WORKERS)
    }
}

impl Solver for ParallelLogicalSolver {
    fn solve(&self, grid: &SudokuGrid) -> Solution {
        self.solve_with_stats(grid).0
    }
}

/// One worker's sweep loop over the shared board, with the contention
/// avoidance state machine described in the module documentation.
fn sweep(board: &SharedBoard) -> SolveResult<()> {
    let mut avoid_box_contention = true;
    let mut avoid_line_contention = true;

    loop {
        let mut any_box_contended = false;
        let mut any_line_contended = false;
        let mut any_dirtied = false;

        for box_x in 0..NUM_BOXES_X {
            for box_y in 0..NUM_BOXES_Y {
                if !board.row_dirty(box_y, box_x) {
                    continue;
                }

                if !board.try_acquire_box(box_y, box_x) {
                    any_box_contended = true;

                    if avoid_box_contention {
                        continue;
                    }

                    board.acquire_box_anyway(box_y, box_x);
                }

                if !board.try_acquire_row_band(box_y) {
                    any_line_contended = true;

                    if avoid_line_contention {
                        board.release_box(box_y, box_x);
                        continue;
                    }

                    board.acquire_row_band_anyway(box_y);
                }

                // the flag may have been handled while we were acquiring
                let step = if board.row_dirty(box_y, box_x) {
                    scheduler::do_solve_step(board, box_y, box_x, Axis::Row)
                        .map(|_| true)
                }
                else {
                    Ok(false)
                };

                board.release_row_band(box_y);
                board.release_box(box_y, box_x);

                any_dirtied |= step?;
            }
        }

        for box_y in 0..NUM_BOXES_Y {
            for box_x in 0..NUM_BOXES_X {
                if !board.column_dirty(box_y, box_x) {
                    continue;
                }

                if !board.try_acquire_box(box_y, box_x) {
                    any_box_contended = true;

                    if avoid_box_contention {
                        continue;
                    }

                    board.acquire_box_anyway(box_y, box_x);
                }

                if !board.try_acquire_column_stack(box_x) {
                    any_line_contended = true;

                    if avoid_line_contention {
                        board.release_box(box_y, box_x);
                        continue;
                    }

                    board.acquire_column_stack_anyway(box_x);
                }

                let step = if board.column_dirty(box_y, box_x) {
                    scheduler::do_solve_step(board, box_y, box_x,
                        Axis::Column).map(|_| true)
                }
                else {
                    Ok(false)
                };

                board.release_column_stack(box_x);
                board.release_box(box_y, box_x);

                any_dirtied |= step?;
            }
        }

        if any_dirtied {
            avoid_line_contention = true;
            avoid_box_contention = true;
        }
        else if avoid_line_contention && any_line_contended {
            avoid_line_contention = false;
        }
        else if avoid_box_contention && any_box_contended {
            avoid_box_contention = false;
            avoid_line_contention = true;
        }
        else {
            return Ok(());
        }
    }
}
