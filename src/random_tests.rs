//! Randomized consistency tests: random full grids are reduced to puzzles
//! and every solver variant must reproduce the original completion.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::{SIZE, SudokuGrid, UNKNOWN};
use crate::solver::{BacktrackingSolver, Solution, Solver};
use crate::solver::logical::{
    CoordinatedLogicalSolver,
    LogicalSolver,
    ParallelLogicalSolver
};
use crate::solver::logical::board::{Board, LocalBoard};
use crate::solver::logical::scheduler;

const UNIQUE_PUZZLE_ITERATIONS: usize = 8;
const AMBIGUOUS_PUZZLE_ITERATIONS: usize = 5;

fn fill_rec(grid: &mut SudokuGrid, column: usize, row: usize,
        rng: &mut impl Rng) -> bool {
    if row == SIZE {
        return true;
    }

    let next_column = (column + 1) % SIZE;
    let next_row = if next_column == 0 { row + 1 } else { row };

    let mut digits: Vec<u8> = (1..=(SIZE as u8)).collect();
    digits.shuffle(rng);

    for digit in digits {
        if grid.is_valid_number(row, column, digit) {
            grid.set_cell(row, column, digit).unwrap();

            if fill_rec(grid, next_column, next_row, rng) {
                return true;
            }

            grid.clear_cell(row, column);
        }
    }

    false
}

/// Generates a random full grid by backtracking with shuffled digit order.
fn random_full_grid(rng: &mut impl Rng) -> SudokuGrid {
    let mut grid = SudokuGrid::new();
    assert!(fill_rec(&mut grid, 0, 0, rng));
    grid
}

fn shuffled_cells(rng: &mut impl Rng) -> Vec<(usize, usize)> {
    let mut cells: Vec<(usize, usize)> = (0..SIZE)
        .flat_map(|row| (0..SIZE).map(move |column| (row, column)))
        .collect();
    cells.shuffle(rng);
    cells
}

/// Removes as many givens as possible while the puzzle stays uniquely
/// solvable, so the original completion is the only valid answer.
fn reduce_to_unique_puzzle(solution: &SudokuGrid, rng: &mut impl Rng)
        -> SudokuGrid {
    let mut puzzle = *solution;

    for (row, column) in shuffled_cells(rng) {
        let digit = puzzle.get_cell(row, column);
        puzzle.clear_cell(row, column);

        if BacktrackingSolver.count_solutions(&puzzle, 2) != 1 {
            puzzle.set_cell(row, column, digit).unwrap();
        }
    }

    puzzle
}

/// Removes a fixed number of givens without regard for uniqueness.
fn punch_holes(solution: &SudokuGrid, holes: usize, rng: &mut impl Rng)
        -> SudokuGrid {
    let mut puzzle = *solution;

    for &(row, column) in shuffled_cells(rng).iter().take(holes) {
        puzzle.clear_cell(row, column);
    }

    puzzle
}

#[test]
fn variants_reproduce_unique_completions() {
    for iteration in 0..UNIQUE_PUZZLE_ITERATIONS {
        let mut rng = StdRng::seed_from_u64(0xC0FFEE + iteration as u64);
        let solution = random_full_grid(&mut rng);
        let puzzle = reduce_to_unique_puzzle(&solution, &mut rng);

        let expected = Solution::Solved(solution);

        assert_eq!(expected, LogicalSolver.solve(&puzzle));
        assert_eq!(expected, ParallelLogicalSolver::default().solve(&puzzle));
        assert_eq!(expected, CoordinatedLogicalSolver.solve(&puzzle));
        assert_eq!(expected, BacktrackingSolver.solve(&puzzle));
    }
}

#[test]
fn ambiguous_puzzles_yield_some_valid_completion() {
    for iteration in 0..AMBIGUOUS_PUZZLE_ITERATIONS {
        let mut rng = StdRng::seed_from_u64(0xBEEF + iteration as u64);
        let solution = random_full_grid(&mut rng);
        let puzzle = punch_holes(&solution, 50, &mut rng);

        let solvers: Vec<Box<dyn Solver>> = vec![
            Box::new(LogicalSolver),
            Box::new(ParallelLogicalSolver::default()),
            Box::new(CoordinatedLogicalSolver)
        ];

        for solver in solvers {
            match solver.solve(&puzzle) {
                Solution::Solved(grid) =>
                    assert!(grid.is_solution_of(&puzzle)),
                Solution::Unsolvable(unsolvable) =>
                    panic!("solvable puzzle reported unsolvable: {}",
                        unsolvable.reason)
            }
        }
    }
}

#[test]
fn quiescence_is_a_fixed_point_on_random_puzzles() {
    for iteration in 0..UNIQUE_PUZZLE_ITERATIONS {
        let mut rng = StdRng::seed_from_u64(0xF1DE + iteration as u64);
        let solution = random_full_grid(&mut rng);
        let puzzle = punch_holes(&solution, 40, &mut rng);

        let board = LocalBoard::blank();
        board.apply_givens(&puzzle).unwrap();
        scheduler::run_to_quiescence(&board).unwrap();
        let first = board.snapshot();

        board.mark_all_dirty();
        scheduler::run_to_quiescence(&board).unwrap();

        assert_eq!(first, board.snapshot());
    }
}

#[test]
fn deduction_never_eliminates_the_true_completion() {
    for iteration in 0..UNIQUE_PUZZLE_ITERATIONS {
        let mut rng = StdRng::seed_from_u64(0xABBA + iteration as u64);
        let solution = random_full_grid(&mut rng);
        let puzzle = punch_holes(&solution, 45, &mut rng);

        let board = LocalBoard::blank();
        board.apply_givens(&puzzle).unwrap();
        scheduler::run_to_quiescence(&board).unwrap();

        for row in 0..SIZE {
            for column in 0..SIZE {
                let truth = solution.get_cell(row, column);
                let value = board.value(row, column);

                if value != UNKNOWN {
                    assert_eq!(truth, value,
                        "deduction entered a wrong digit at R{}C{}", row,
                        column);
                }
                else {
                    assert!(board.candidates(row, column).contains(truth),
                        "deduction eliminated the true digit at R{}C{}", row,
                        column);
                }
            }
        }
    }
}
