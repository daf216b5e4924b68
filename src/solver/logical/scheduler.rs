//! The dirty-box scheduler which drives the [strategies](super::strategies)
//! over a board until quiescence.
//!
//! Every box carries two dirty flags, one per scan orientation. A solve step
//! on a box clears the matching flag, runs the strategy ladder, and, if
//! anything inside the box changed, re-dirties the box's whole row band and
//! column stack, since the eliminations may have enabled further deductions
//! there. Foreign eliminations made by the line-scoped strategies arrive as
//! a [DirtyMask] which the scheduler applies. The sweep loop alternates a
//! row-oriented and a column-oriented pass so the scanner picks up
//! cross-band information, and exits once neither pass finds a dirty box.

use crate::{NUM_BOXES_X, NUM_BOXES_Y};
use crate::error::{Axis, SolveResult};
use crate::solver::logical::board::{Board, BoxBounds, DirtyMask};
use crate::solver::logical::strategies;

/// What a pass of the strategy ladder over one box did.
pub(crate) struct StepEffects {

    /// Whether any candidate inside the box was eliminated or any digit was
    /// entered. Eliminations the line-scoped strategies made along the
    /// scanned lines count as well.
    pub(crate) changed: bool,

    /// Whether the pointing strategy eliminated anything. Pointing only ever
    /// modifies foreign boxes, so this is kept separate from `changed`; the
    /// flag-driven scheduler relies on the mask alone to reschedule the
    /// affected boxes.
    pub(crate) pointed: bool,

    /// The foreign dirty flags recorded by the line-scoped strategies.
    pub(crate) foreign: DirtyMask
}

/// Runs the full strategy ladder over one box in the order singles, pairs,
/// box-line, pointing. `axis` selects whether the line-scoped strategies
/// scan the box's row band or its column stack.
pub(crate) fn apply_strategies<B: Board>(board: &B, bounds: BoxBounds,
        axis: Axis) -> SolveResult<StepEffects> {
    let mut changed = false;
    let mut foreign = DirtyMask::default();

    changed |= strategies::naked_singles(board, bounds)?;
    changed |= match axis {
        Axis::Row => strategies::hidden_singles_rows(board, bounds),
        Axis::Column => strategies::hidden_singles_columns(board, bounds)
    };
    changed |= strategies::hidden_singles_box(board, bounds);
    changed |= match axis {
        Axis::Row => strategies::naked_pairs_rows(board, bounds),
        Axis::Column => strategies::naked_pairs_columns(board, bounds)
    };
    changed |= strategies::naked_pairs_box(board, bounds);

    let (pairs_changed, pairs_foreign) = match axis {
        Axis::Row => strategies::hidden_pairs_rows(board, bounds),
        Axis::Column => strategies::hidden_pairs_columns(board, bounds)
    };
    changed |= pairs_changed;
    foreign |= pairs_foreign;

    changed |= strategies::hidden_pairs_box(board, bounds);
    changed |= match axis {
        Axis::Row => strategies::box_line_rows(board, bounds)?,
        Axis::Column => strategies::box_line_columns(board, bounds)?
    };

    let (pointed, pointing_foreign) = strategies::pointing(board, bounds);
    foreign |= pointing_foreign;

    Ok(StepEffects { changed, pointed, foreign })
}

/// Performs one scheduled solve step on the given box: clears the dirty flag
/// matching `axis`, applies the strategy ladder, applies the recorded
/// foreign flags, and on any in-box change re-dirties the box's row band and
/// column stack (both orientations, including this box itself, since an
/// elimination may have set up a single or pair for the next pass).
///
/// Returns whether anything inside the box changed.
pub(crate) fn do_solve_step<B: Board>(board: &B, box_y: usize, box_x: usize,
        axis: Axis) -> SolveResult<bool> {
    match axis {
        Axis::Row => board.clear_row_dirty(box_y, box_x),
        Axis::Column => board.clear_column_dirty(box_y, box_x)
    }

    let effects = apply_strategies(board, BoxBounds::of_box(box_y, box_x),
        axis)?;
    effects.foreign.apply(board);

    if effects.changed {
        for box_x1 in 0..NUM_BOXES_X {
            board.mark_row_dirty(box_y, box_x1);
        }

        for box_y1 in 0..NUM_BOXES_Y {
            board.mark_column_dirty(box_y1, box_x);
        }
    }

    Ok(effects.changed)
}

/// Performs one unscheduled solve step on the given box, as the round-based
/// coordinated solver uses it: no dirty flags are consulted or maintained,
/// and the report covers every elimination including those of pointing.
pub(crate) fn do_round_step<B: Board>(board: &B, box_y: usize, box_x: usize,
        axis: Axis) -> SolveResult<bool> {
    let effects = apply_strategies(board, BoxBounds::of_box(box_y, box_x),
        axis)?;
    Ok(effects.changed || effects.pointed)
}

/// Sweeps dirty boxes until quiescence. A row-oriented pass visits boxes
/// column by column, then a column-oriented pass visits them row by row;
/// the loop ends when a full double pass found no dirty box.
pub(crate) fn run_to_quiescence<B: Board>(board: &B) -> SolveResult<()> {
    loop {
        let mut any_dirtied = false;

        for box_x in 0..NUM_BOXES_X {
            for box_y in 0..NUM_BOXES_Y {
                if board.row_dirty(box_y, box_x) {
                    do_solve_step(board, box_y, box_x, Axis::Row)?;
                    any_dirtied = true;
                }
            }
        }

        for box_y in 0..NUM_BOXES_Y {
            for box_x in 0..NUM_BOXES_X {
                if board.column_dirty(box_y, box_x) {
                    do_solve_step(board, box_y, box_x, Axis::Column)?;
                    any_dirtied = true;
                }
            }
        }

        if !any_dirtied {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::SudokuGrid;
    use crate::solver::logical::board::LocalBoard;

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

    #[test]
    fn quiescent_board_is_a_fixed_point() {
        let board = LocalBoard::blank();
        board.apply_givens(&easy_puzzle()).unwrap();

        run_to_quiescence(&board).unwrap();
        let first = board.snapshot();

        board.mark_all_dirty();
        run_to_quiescence(&board).unwrap();
        let second = board.snapshot();

        assert_eq!(first, second);
    }

    #[test]
    fn set_value_matches_strategy_entry() {
        // Entering a digit directly and letting naked singles find it must
        // converge to the same state.
        let strategic = LocalBoard::blank();

        for digit in 2..=9 {
            strategic.remove_candidate(4, 4, digit);
        }

        strategic.mark_all_dirty();
        run_to_quiescence(&strategic).unwrap();

        let direct = LocalBoard::blank();

        for digit in 2..=9 {
            direct.remove_candidate(4, 4, digit);
        }

        direct.set_value(4, 4, 1);
        direct.mark_all_dirty();
        run_to_quiescence(&direct).unwrap();

        assert_eq!(strategic.snapshot(), direct.snapshot());
    }

    #[test]
    fn scheduler_fills_deducible_cells() {
        let board = LocalBoard::blank();
        board.apply_givens(&easy_puzzle()).unwrap();
        run_to_quiescence(&board).unwrap();

        // this puzzle falls to singles alone, so the board must be complete
        let grid = board.to_grid();

        assert!(grid.is_full());
        assert!(grid.is_solution_of(&easy_puzzle()));
    }

    #[test]
    fn contradiction_aborts_the_sweep() {
        let board = LocalBoard::blank();

        // row 0 holds 1 to 8, and a 9 below the empty corner cell
        let grid = SudokuGrid::parse(
            "12345678.\n\
             ........9\n\
             .........\n\
             .........\n\
             .........\n\
             .........\n\
             .........\n\
             .........\n\
             .........").unwrap();

        board.apply_givens(&grid).unwrap();

        assert!(run_to_quiescence(&board).is_err());
    }
}
