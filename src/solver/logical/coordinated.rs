//! The coordinated-parallel orchestrator: one worker per box per round.
//!
//! Instead of locking, the workers are statically partitioned. Each round
//! spawns `NUM_BOXES_Y` row-oriented workers and `NUM_BOXES_X`
//! column-oriented workers, each owning one box, and joins them all before
//! the next round begins. Within a round no two workers enter digits into
//! the same box; candidate eliminations a worker makes in foreign boxes
//! (through its lines and pointing) are tolerated, since the owners of
//! those boxes re-scan them in a later round. Between rounds every worker's
//! box rotates one step horizontally, so all box and orientation
//! combinations are covered. Rounds repeat until a full
//! `max(NUM_BOXES_X, NUM_BOXES_Y)` consecutive rounds reported no change,
//! after which the guess driver takes over.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{NUM_BOXES_X, NUM_BOXES_Y, SudokuGrid};
use crate::error::{Axis, SolveResult};
use crate::solver::{Solution, Solver};
use crate::solver::logical::{SolveStats, solve_shared, unsolvable};
use crate::solver::logical::board::{Board, SharedBoard};
use crate::solver::logical::scheduler;

/// How many consecutive rounds must pass without any worker reporting a
/// change before the deduction phase is considered quiescent.
const MAX_CLEAN_ROUNDS: usize = if NUM_BOXES_X > NUM_BOXES_Y {
    NUM_BOXES_X
}
else {
    NUM_BOXES_Y
};

/// A [Solver] running the same deductions as
/// [LogicalSolver](super::LogicalSolver) with statically partitioned
/// workers that are re-invoked in rounds, as described in the module
/// documentation.
pub struct CoordinatedLogicalSolver;

impl CoordinatedLogicalSolver {

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
        let result = solve_shared(&board,
            &CoordinatedLogicalSolver::run_rounds, &guesses);
        stats.guesses = guesses.load(Ordering::Relaxed);

        match result {
            Ok(solved) => (Solution::Solved(solved), stats),
            Err(reason) => (unsolvable(&board, reason), stats)
        }
    }

    /// Runs worker rounds over the board until [MAX_CLEAN_ROUNDS]
    /// consecutive rounds made no change. The first contradiction any
    /// worker found ends the deduction phase.
    fn run_rounds(board: &SharedBoard) -> SolveResult<()> {
        let mut workers: Vec<(usize, usize, Axis)> =
            Vec::with_capacity(NUM_BOXES_Y + NUM_BOXES_X);

        for box_y in 0..NUM_BOXES_Y {
            workers.push((box_y, box_y % NUM_BOXES_X, Axis::Row));
        }

        for box_x in 0..NUM_BOXES_X {
            workers.push(((box_x + 1) % NUM_BOXES_Y, box_x, Axis::Column));
        }

        let mut clean_rounds = 0;

        while clean_rounds < MAX_CLEAN_ROUNDS {
            let mut outcomes: Vec<SolveResult<bool>> =
                vec![Ok(false); workers.len()];

            rayon::scope(|scope| {
                let iter = outcomes.iter_mut().zip(workers.iter());

                for (outcome, &(box_y, box_x, axis)) in iter {
                    scope.spawn(move |_| {
                        *outcome = scheduler::do_round_step(board, box_y,
                            box_x, axis);
                    });
                }
            });

            clean_rounds += 1;

            for outcome in outcomes {
                if outcome? {
                    clean_rounds = 0;
                }
            }

            for worker in workers.iter_mut() {
                worker.1 = (worker.1 + 1) % NUM_BOXES_X;
            }
        }

        Ok(())
    }
}

impl Solver for CoordinatedLogicalSolver {
    fn solve(&self, grid: &SudokuGrid) -> Solution {
        self.solve_with_stats(grid).0
    }
}
