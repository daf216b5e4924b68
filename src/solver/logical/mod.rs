//! The logical deduction engine.
//!
//! The engine keeps, for every cell, the set of digits that could still go
//! there, and narrows those sets with the box-local deduction
//! [strategies] a human solver would use. A dirty-box [scheduler] re-runs
//! the strategies wherever something changed until the grid quiesces. If
//! cells remain unknown at quiescence, the guess driver branches on the cell
//! with the fewest candidates and recursively solves deep copies of the
//! state, so a failed branch never pollutes its siblings.
//!
//! Three orchestrators share that machinery:
//!
//! * [LogicalSolver] runs everything on the calling thread.
//! * [ParallelLogicalSolver] lets several workers sweep one shared board
//! concurrently, backing off of contended boxes before insisting on them.
//! * [CoordinatedLogicalSolver] assigns each worker a fixed box and scan
//! orientation per round and rotates the assignments between rounds, so the
//! workers never compete for a box.
//!
//! The parallel orchestrators branch their guesses onto the thread pool;
//! sibling branches already running are not cancelled when one of them
//! succeeds, which is harmless because any returned completion is checked
//! against the same rules.

pub(crate) mod board;
pub(crate) mod scheduler;
pub(crate) mod strategies;

mod coordinated;
mod parallel;

pub use coordinated::CoordinatedLogicalSolver;
pub use parallel::ParallelLogicalSolver;

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::debug;

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{SIZE, SudokuGrid, UNKNOWN};
use crate::error::{SolveError, SolveResult};
use crate::solver::{Solution, Solver, Unsolvable};
use board::{Board, LocalBoard, SharedBoard};

/// Counters the logical solvers report alongside their [Solution], mainly
/// so callers can tell deduction-only solves from solves that needed
/// guessing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SolveStats {

    /// The number of guess branches that were started. Zero means the
    /// puzzle fell to deduction alone.
    pub guesses: usize
}

/// Finds the unknown cell with the fewest remaining candidates, breaking
/// ties towards the first such cell in row-major order. `None` means the
/// grid is complete.
pub(crate) fn fewest_candidates<B: Board>(board: &B)
        -> Option<(usize, usize)> {
    let mut best = None;
    let mut best_len = SIZE + 1;

    for row in 0..SIZE {
        for column in 0..SIZE {
            if board.value(row, column) != UNKNOWN {
                continue;
            }

            let len = board.candidates(row, column).len();

            if len < best_len {
                best_len = len;
                best = Some((row, column));
            }
        }
    }

    best
}

/// Packages the current state of a failed board into a [Solution] carrying
/// the partial grid and remaining candidates for diagnostics.
pub(crate) fn unsolvable<B: Board>(board: &B, reason: SolveError)
        -> Solution {
    Solution::Unsolvable(Unsolvable {
        reason,
        partial: board.to_grid(),
        candidates: board.candidate_grid()
    })
}

/// The recursive solve shared by the parallel orchestrators: propagate with
/// the given strategy driver, and if cells remain, branch on the cell with
/// the fewest candidates and solve the branches on the thread pool. The
/// first branch to succeed wins; remaining branches are not awaited for
/// their results beyond that.
pub(crate) fn solve_shared<P>(board: &SharedBoard, propagate: &P,
        guesses: &AtomicUsize) -> SolveResult<SudokuGrid>
where
    P: Fn(&SharedBoard) -> SolveResult<()> + Sync
{
    propagate(board)?;

    let (row, column) = match fewest_candidates(board) {
        None => return Ok(board.to_grid()),
        Some(cell) => cell
    };

    let branches: Vec<SharedBoard> = board.candidates(row, column).iter()
        .map(|digit| board.branch(row, column, digit))
        .collect();
    guesses.fetch_add(branches.len(), Ordering::Relaxed);
    debug!(row, column, branches = branches.len(),
        "deductions exhausted, branching");

    branches.into_par_iter()
        .find_map_any(|branch| solve_shared(&branch, propagate, guesses).ok())
        .ok_or(SolveError::ExhaustedGuesses { row, column })
}

/// The single-threaded deduction solver: applies the givens, sweeps the
/// dirty boxes with the strategy ladder until quiescence, and falls back to
/// guess-and-check on the cell with the fewest candidates when deduction
/// alone does not finish the grid.
///
/// ```
/// use sudoku_logical::SudokuGrid;
/// use sudoku_logical::solver::{Solution, Solver};
/// use sudoku_logical::solver::logical::LogicalSolver;
///
/// let puzzle = SudokuGrid::parse(
///     "53..7....\n\
///      6..195...\n\
///      .98....6.\n\
///      8...6...3\n\
///      4..8.3..1\n\
///      7...2...6\n\
///      .6....28.\n\
///      ...419..5\n\
///      ....8..79").unwrap();
///
/// let (solution, stats) = LogicalSolver.solve_with_stats(&puzzle);
///
/// assert!(solution.is_solved());
/// // this one falls to deduction alone
/// assert_eq!(0, stats.guesses);
/// ```
pub struct LogicalSolver;

impl LogicalSolver {

    /// Solves the puzzle like [Solver::solve] and additionally reports
    /// [SolveStats].
    pub fn solve_with_stats(&self, grid: &SudokuGrid)
            -> (Solution, SolveStats) {
        let mut stats = SolveStats::default();
        let board = LocalBoard::blank();

        if let Err(reason) = board.apply_givens(grid) {
            return (unsolvable(&board, reason), stats);
        }

        match LogicalSolver::solve_board(&board, &mut stats) {
            Ok(solved) => (Solution::Solved(solved), stats),
            Err(reason) => (unsolvable(&board, reason), stats)
        }
    }

    fn solve_board(board: &LocalBoard, stats: &mut SolveStats)
            -> SolveResult<SudokuGrid> {
        scheduler::run_to_quiescence(board)?;

        let (row, column) = match fewest_candidates(board) {
            None => return Ok(board.to_grid()),
            Some(cell) => cell
        };

        let options = board.candidates(row, column);
        debug!(row, column, options = options.len(),
            "deductions exhausted, guessing");

        for digit in options.iter() {
            stats.guesses += 1;
            let branch = board.branch(row, column, digit);

            if let Ok(solved) = LogicalSolver::solve_board(&branch, stats) {
                return Ok(solved);
            }
        }

        Err(SolveError::ExhaustedGuesses { row, column })
    }
}

impl Solver for LogicalSolver {
    fn solve(&self, grid: &SudokuGrid) -> Solution {
        self.solve_with_stats(grid).0
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn fewest_candidates_prefers_row_major_on_ties() {
        let board = LocalBoard::blank();

        assert_eq!(Some((0, 0)), fewest_candidates(&board));

        board.remove_candidate(4, 4, 1);
        board.remove_candidate(4, 4, 2);

        assert_eq!(Some((4, 4)), fewest_candidates(&board));

        board.remove_candidate(2, 7, 1);
        board.remove_candidate(2, 7, 2);

        assert_eq!(Some((2, 7)), fewest_candidates(&board));
    }

    #[test]
    fn complete_board_has_no_guess_target() {
        let board = LocalBoard::blank();
        let grid = SudokuGrid::parse(
            "534678912\n\
             672195348\n\
             198342567\n\
             859761423\n\
             426853791\n\
             713924856\n\
             961537284\n\
             287419635\n\
             345286179").unwrap();
        board.apply_givens(&grid).unwrap();

        assert_eq!(None, fewest_candidates(&board));
    }
}
