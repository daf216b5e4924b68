//! This module contains the logic for solving Sudoku.
//!
//! Most importantly, it contains the definition of the [Solver] trait, which
//! all solving algorithms in this crate implement. The deduction engine lives
//! in the [logical] submodule; this module provides the shared result types
//! as well as the two backtracking solvers and the [annealing] fallback.

pub mod annealing;
pub mod logical;

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use std::fmt::{self, Display, Formatter};

use crate::{BOX_HEIGHT, BOX_WIDTH, SIZE, SudokuGrid, UNKNOWN};
use crate::error::SolveError;
use crate::util::DigitSet;

/// The remaining candidate digits of every cell, with rows as the outer
/// dimension. Attached to an [Unsolvable] result for diagnostics.
pub type CandidateGrid = [[DigitSet; SIZE]; SIZE];

/// The diagnosis attached to a failed solve attempt: the reason the attempt
/// was abandoned together with as much of the grid as could be determined.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Unsolvable {

    /// The error that ended the attempt.
    pub reason: SolveError,

    /// The grid as far as it could be filled in before the attempt failed.
    pub partial: SudokuGrid,

    /// The candidates that remained for every cell when the attempt failed.
    /// Known cells hold a singleton set of their digit.
    pub candidates: CandidateGrid
}

impl Display for Unsolvable {

    /// Renders the partial grid as nine lines of digits and dots and, if any
    /// cell is unknown, the remaining candidates of every cell below it.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut any_unknown = false;

        for row in 0..SIZE {
            for column in 0..SIZE {
                let digit = self.partial.get_cell(row, column);

                if digit == UNKNOWN {
                    any_unknown = true;
                    write!(f, ".")?;
                }
                else {
                    write!(f, "{}", digit)?;
                }
            }

            writeln!(f)?;
        }

        if !any_unknown {
            return Ok(());
        }

        writeln!(f)?;

        for row in 0..SIZE {
            for column in 0..SIZE {
                write!(f, "[")?;

                for digit in DigitSet::all().iter() {
                    if self.candidates[row][column].contains(digit) {
                        write!(f, "{}", digit)?;
                    }
                    else {
                        write!(f, ".")?;
                    }
                }

                write!(f, "]")?;

                if (column + 1) % BOX_WIDTH == 0 {
                    write!(f, "  ")?;
                }
            }

            writeln!(f)?;

            if (row + 1) % BOX_HEIGHT == 0 {
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

/// The outcome of a solve attempt. When a puzzle has multiple solutions, any
/// one of them may be returned; none of the solvers in this crate enumerate
/// them all.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Solution {

    /// The puzzle was solved; the wrapped grid is full and breaks no rules.
    Solved(SudokuGrid),

    /// The puzzle could not be solved; the wrapped diagnosis explains why
    /// and carries the partial state.
    Unsolvable(Unsolvable)
}

impl Solution {

    /// Gets the solved grid, or `None` if the puzzle was unsolvable.
    pub fn solved_grid(&self) -> Option<&SudokuGrid> {
        match self {
            Solution::Solved(grid) => Some(grid),
            Solution::Unsolvable(_) => None
        }
    }

    /// Indicates whether the puzzle was solved.
    pub fn is_solved(&self) -> bool {
        matches!(self, Solution::Solved(_))
    }
}

/// A trait for structs which have the ability to solve Sudoku. Not all
/// implementers are complete: the [logical](logical) and backtracking
/// solvers always terminate with a definitive answer, while the
/// [annealing](annealing::AnnealingSolver) fallback is stochastic and may
/// give up on hard instances. All implementers must report a correct grid
/// whenever they return [Solution::Solved].
pub trait Solver {

    /// Solves, or attempts to solve, the provided puzzle.
    fn solve(&self, grid: &SudokuGrid) -> Solution;
}

/// Computes the candidates every cell of the given grid could hold under the
/// plain Sudoku rules, for diagnostics of solvers which do not track
/// candidates themselves. Known cells yield a singleton set.
pub(crate) fn candidate_snapshot(grid: &SudokuGrid) -> CandidateGrid {
    let mut snapshot = [[DigitSet::empty(); SIZE]; SIZE];

    for row in 0..SIZE {
        for column in 0..SIZE {
            let digit = grid.get_cell(row, column);

            snapshot[row][column] = if digit != UNKNOWN {
                DigitSet::singleton(digit)
            }
            else {
                DigitSet::all().iter()
                    .filter(|&d| grid.is_valid_number(row, column, d))
                    .collect()
            };
        }
    }

    snapshot
}

/// Finds the first unknown cell of the grid in row-major order.
pub(crate) fn first_empty(grid: &SudokuGrid) -> Option<(usize, usize)> {
    for row in 0..SIZE {
        for column in 0..SIZE {
            if grid.get_cell(row, column) == UNKNOWN {
                return Some((row, column));
            }
        }
    }

    None
}

fn unsolvable_from_grid(grid: &SudokuGrid, reason: SolveError) -> Solution {
    Solution::Unsolvable(Unsolvable {
        reason,
        partial: *grid,
        candidates: candidate_snapshot(grid)
    })
}

fn givens_failure(grid: &SudokuGrid) -> Solution {
    let reason = match grid.first_conflict() {
        Some((row, column)) => SolveError::GivensConflict { row, column },
        None => {
            let (row, column) = first_empty(grid).unwrap_or((0, 0));
            SolveError::ExhaustedGuesses { row, column }
        }
    };

    unsolvable_from_grid(grid, reason)
}

/// A complete [Solver] which solves Sudoku by recursively testing all valid
/// digits for each cell in turn. Its worst-case runtime is exponential, but
/// it requires no candidate bookkeeping and serves as the reference the
/// deduction engine is checked against.
pub struct BacktrackingSolver;

impl BacktrackingSolver {

    fn solve_rec(grid: &mut SudokuGrid, column: usize, row: usize) -> bool {
        if row == SIZE {
            return true;
        }

        let next_column = (column + 1) % SIZE;
        let next_row = if next_column == 0 { row + 1 } else { row };

        if grid.get_cell(row, column) != UNKNOWN {
            return BacktrackingSolver::solve_rec(grid, next_column, next_row);
        }

        for digit in 1..=(SIZE as u8) {
            if grid.is_valid_number(row, column, digit) {
                grid.set_cell(row, column, digit).unwrap();

                if BacktrackingSolver::solve_rec(grid, next_column, next_row) {
                    return true;
                }

                grid.clear_cell(row, column);
            }
        }

        false
    }

    fn count_rec(grid: &mut SudokuGrid, column: usize, row: usize,
            limit: usize, count: &mut usize) {
        if *count >= limit {
            return;
        }

        if row == SIZE {
            *count += 1;
            return;
        }

        let next_column = (column + 1) % SIZE;
        let next_row = if next_column == 0 { row + 1 } else { row };

        if grid.get_cell(row, column) != UNKNOWN {
            BacktrackingSolver::count_rec(grid, next_column, next_row, limit,
                count);
            return;
        }

        for digit in 1..=(SIZE as u8) {
            if grid.is_valid_number(row, column, digit) {
                grid.set_cell(row, column, digit).unwrap();
                BacktrackingSolver::count_rec(grid, next_column, next_row,
                    limit, count);
                grid.clear_cell(row, column);

                if *count >= limit {
                    return;
                }
            }
        }
    }

    /// Counts the solutions of the given puzzle, stopping as soon as `limit`
    /// of them have been found. `count_solutions(grid, 2) == 1` is the usual
    /// way of checking that a puzzle is uniquely solvable.
    pub fn count_solutions(&self, grid: &SudokuGrid, limit: usize) -> usize {
        if grid.first_conflict().is_some() {
            return 0;
        }

        let mut work = *grid;
        let mut count = 0;
        BacktrackingSolver::count_rec(&mut work, 0, 0, limit, &mut count);
        count
    }
}

impl Solver for BacktrackingSolver {
    fn solve(&self, grid: &SudokuGrid) -> Solution {
        if grid.first_conflict().is_some() {
            return givens_failure(grid);
        }

        let mut work = *grid;

        if BacktrackingSolver::solve_rec(&mut work, 0, 0) {
            Solution::Solved(work)
        }
        else {
            givens_failure(grid)
        }
    }
}

/// The recursion depth down to which [ParallelBacktrackingSolver] keeps
/// fanning out branches onto the thread pool. Deeper subtrees are searched
/// sequentially, since by then there is more than enough parallel work.
const MAX_FORK_DEPTH: usize = 4;

/// A [Solver] which performs the same search as [BacktrackingSolver], but
/// tries the digits of the first empty cell in parallel, recursively, down to
/// a bounded depth. Every parallel branch works on its own copy of the grid,
/// so no synchronization is required beyond joining the branches.
pub struct ParallelBacktrackingSolver {
    max_fork_depth: usize
}

impl ParallelBacktrackingSolver {

    /// Creates a new parallel backtracking solver which forks branches down
    /// to the given recursion depth.
    pub fn new(max_fork_depth: usize) -> ParallelBacktrackingSolver {
        ParallelBacktrackingSolver { max_fork_depth }
    }

    fn solve_rec(grid: &SudokuGrid, depth: usize, max_fork_depth: usize)
            -> Option<SudokuGrid> {
        let (row, column) = match first_empty(grid) {
            Some(cell) => cell,
            None => return Some(*grid)
        };

        let digits: Vec<u8> = (1..=(SIZE as u8))
            .filter(|&digit| grid.is_valid_number(row, column, digit))
            .collect();

        if depth < max_fork_depth {
            digits.into_par_iter()
                .find_map_any(|digit| {
                    let mut child = *grid;
                    child.set_cell(row, column, digit).unwrap();
                    ParallelBacktrackingSolver::solve_rec(&child, depth + 1,
                        max_fork_depth)
                })
        }
        else {
            for digit in digits {
                let mut child = *grid;
                child.set_cell(row, column, digit).unwrap();

                if let Some(solved) = ParallelBacktrackingSolver::solve_rec(
                        &child, depth + 1, max_fork_depth) {
                    return Some(solved);
                }
            }

            None
        }
    }
}

impl Default for ParallelBacktrackingSolver {
    fn default() -> ParallelBacktrackingSolver {
        ParallelBacktrackingSolver::new(MAX_FORK_DEPTH)
    }
}

impl Solver for ParallelBacktrackingSolver {
    fn solve(&self, grid: &SudokuGrid) -> Solution {
        if grid.first_conflict().is_some() {
            return givens_failure(grid);
        }

        match ParallelBacktrackingSolver::solve_rec(grid, 0,
                self.max_fork_depth) {
            Some(solved) => Solution::Solved(solved),
            None => givens_failure(grid)
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn easy_puzzle() -> SudokuGrid {
        SudokuGrid::parse(
            "53..7....\n\
             6..195...\n\
             .98....6.\n\
             8...6...3\n\
             4..8.3..1\n\
             7...2...6\n\
             .6....28.\n\
             ...419..5\n\
             ....8..79").unwrap()
    }

    fn easy_solution() -> SudokuGrid {
        SudokuGrid::parse(
            "534678912\n\
             672195348\n\
             198342567\n\
             859761423\n\
             426853791\n\
             713924856\n\
             961537284\n\
             287419635\n\
             345286179").unwrap()
    }

    #[test]
    fn backtracking_solves_classic_sudoku() {
        assert_eq!(Solution::Solved(easy_solution()),
            BacktrackingSolver.solve(&easy_puzzle()));
    }

    #[test]
    fn parallel_backtracking_agrees_on_unique_puzzle() {
        assert_eq!(Solution::Solved(easy_solution()),
            ParallelBacktrackingSolver::default().solve(&easy_puzzle()));
    }

    #[test]
    fn backtracking_reports_conflicting_givens() {
        let mut grid = SudokuGrid::new();
        grid.set_cell(0, 0, 5).unwrap();
        grid.set_cell(0, 4, 5).unwrap();

        match BacktrackingSolver.solve(&grid) {
            Solution::Unsolvable(unsolvable) => assert_eq!(
                SolveError::GivensConflict { row: 0, column: 4 },
                unsolvable.reason),
            Solution::Solved(_) => panic!("conflicting givens were solved")
        }
    }

    #[test]
    fn unique_puzzle_has_one_solution() {
        assert_eq!(1,
            BacktrackingSolver.count_solutions(&easy_puzzle(), 2));
    }

    #[test]
    fn blank_grid_has_many_solutions() {
        assert_eq!(2,
            BacktrackingSolver.count_solutions(&SudokuGrid::new(), 2));
    }

    #[test]
    fn conflicting_grid_has_no_solutions() {
        let mut grid = SudokuGrid::new();
        grid.set_cell(0, 0, 5).unwrap();
        grid.set_cell(0, 4, 5).unwrap();

        assert_eq!(0, BacktrackingSolver.count_solutions(&grid, 2));
    }

    #[test]
    fn unsolvable_displays_partial_state_and_candidates() {
        let mut grid = SudokuGrid::new();
        grid.set_cell(0, 0, 5).unwrap();
        grid.set_cell(0, 4, 5).unwrap();

        let solution = BacktrackingSolver.solve(&grid);
        let rendered = match solution {
            Solution::Unsolvable(unsolvable) => unsolvable.to_string(),
            Solution::Solved(_) => panic!("conflicting givens were solved")
        };

        assert!(rendered.starts_with("5...5....\n"));
        assert!(rendered.contains('['));
    }
}
