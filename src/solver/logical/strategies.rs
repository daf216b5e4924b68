//! The library of box-local deduction strategies.
//!
//! Every strategy takes the [BoxBounds] of one 3x3 box and mutates the board
//! through candidate eliminations and, for the singles, by entering digits.
//! All of them obey the same contract:
//!
//! * A strategy never adds a candidate and never unsets a known value, and
//! it only enters digits inside its box.
//! * The returned `bool` reports whether any candidate was removed or any
//! digit was entered. The line-scoped hidden pairs and the pointing strategy
//! additionally return a [DirtyMask] of foreign boxes whose dirty flags must
//! be set because candidates outside this box were eliminated; they never
//! touch the flags themselves.
//! * A strategy may find the grid to be contradictory, in which case it
//! returns a [SolveError] which aborts the surrounding solve attempt.
//!
//! Within each function, `row`/`column` refer to the cell being modified,
//! `row1`/`column1` (and so on) to cells being compared, and `digit` to the
//! candidate under consideration.

use crate::{BOX_HEIGHT, BOX_WIDTH, SIZE, UNKNOWN};
use crate::error::{Axis, SolveError, SolveResult};
use crate::solver::logical::board::{Board, BoxBounds, DirtyMask};
use crate::util::DigitSet;

/// Fills in cells that have only one remaining candidate.
///
/// # Errors
///
/// `SolveError::EmptyCell` if a cell in the box has no candidates left.
pub(crate) fn naked_singles(board: &impl Board, bounds: BoxBounds)
        -> SolveResult<bool> {
    let mut changed = false;

    for row in bounds.rows() {
        for column in bounds.columns() {
            if board.value(row, column) != UNKNOWN {
                continue;
            }

            let candidates = board.candidates(row, column);

            if candidates.is_empty() {
                return Err(SolveError::EmptyCell { row, column });
            }

            if let Some(digit) = candidates.single() {
                board.set_value(row, column, digit);
                changed = true;
            }
        }
    }

    Ok(changed)
}

/// Fills in cells that have a candidate no other cell in their row has.
pub(crate) fn hidden_singles_rows(board: &impl Board, bounds: BoxBounds)
        -> bool {
    let mut changed = false;

    for row in bounds.rows() {
        for column in bounds.columns() {
            if board.value(row, column) != UNKNOWN {
                continue;
            }

            for digit in board.candidates(row, column).iter() {
                let elsewhere = (0..SIZE)
                    .filter(|&column1| column1 != column)
                    .any(|column1|
                        board.candidates(row, column1).contains(digit));

                if !elsewhere {
                    board.set_value(row, column, digit);
                    changed = true;
                    break;
                }
            }
        }
    }

    changed
}

/// Fills in cells that have a candidate no other cell in their column has.
pub(crate) fn hidden_singles_columns(board: &impl Board, bounds: BoxBounds)
        -> bool {
    let mut changed = false;

    for row in bounds.rows() {
        for column in bounds.columns() {
            if board.value(row, column) != UNKNOWN {
                continue;
            }

            for digit in board.candidates(row, column).iter() {
                let elsewhere = (0..SIZE)
                    .filter(|&row1| row1 != row)
                    .any(|row1| board.candidates(row1, column).contains(digit));

                if !elsewhere {
                    board.set_value(row, column, digit);
                    changed = true;
                    break;
                }
            }
        }
    }

    changed
}

/// Fills in cells that have a candidate no other cell in their box has.
pub(crate) fn hidden_singles_box(board: &impl Board, bounds: BoxBounds)
        -> bool {
    let mut changed = false;

    for row in bounds.rows() {
        for column in bounds.columns() {
            if board.value(row, column) != UNKNOWN {
                continue;
            }

            'digits: for digit in board.candidates(row, column).iter() {
                for row1 in bounds.rows() {
                    for column1 in bounds.columns() {
                        if row1 == row && column1 == column {
                            continue;
                        }

                        if board.candidates(row1, column1).contains(digit) {
                            continue 'digits;
                        }
                    }
                }

                board.set_value(row, column, digit);
                changed = true;
                break;
            }
        }
    }

    changed
}

/// Looks for cells in the same row which share their only (at most) two
/// candidates and eliminates those candidates from the rest of the row. A
/// cell pair sharing a single candidate matches too, which merely reduces to
/// naked singles again.
pub(crate) fn naked_pairs_rows(board: &impl Board, bounds: BoxBounds)
        -> bool {
    let mut changed = false;

    for row in bounds.rows() {
        'cells: for column in bounds.columns() {
            if board.value(row, column) != UNKNOWN {
                continue;
            }

            let pair = board.candidates(row, column);

            if pair.len() > 2 {
                continue;
            }

            for column1 in 0..SIZE {
                if column1 == column
                        || board.candidates(row, column1) != pair {
                    continue;
                }

                // partner found, clear the pair from the rest of the row
                for column2 in 0..SIZE {
                    if column2 == column || column2 == column1
                            || board.value(row, column2) != UNKNOWN {
                        continue;
                    }

                    for digit in pair.iter() {
                        changed |= board.remove_candidate(row, column2, digit);
                    }
                }

                continue 'cells;
            }
        }
    }

    changed
}

/// Looks for cells in the same column which share their only (at most) two
/// candidates and eliminates those candidates from the rest of the column.
pub(crate) fn naked_pairs_columns(board: &impl Board, bounds: BoxBounds)
        -> bool {
    let mut changed = false;

    for row in bounds.rows() {
        'cells: for column in bounds.columns() {
            if board.value(row, column) != UNKNOWN {
                continue;
            }

            let pair = board.candidates(row, column);

            if pair.len() > 2 {
                continue;
            }

            for row1 in 0..SIZE {
                if row1 == row || board.candidates(row1, column) != pair {
                    continue;
                }

                for row2 in 0..SIZE {
                    if row2 == row || row2 == row1
                            || board.value(row2, column) != UNKNOWN {
                        continue;
                    }

                    for digit in pair.iter() {
                        changed |= board.remove_candidate(row2, column, digit);
                    }
                }

                continue 'cells;
            }
        }
    }

    changed
}

/// Looks for cells in the same box which share their only (at most) two
/// candidates and eliminates those candidates from the rest of the box.
pub(crate) fn naked_pairs_box(board: &impl Board, bounds: BoxBounds) -> bool {
    let mut changed = false;

    for row in bounds.rows() {
        'cells: for column in bounds.columns() {
            if board.value(row, column) != UNKNOWN {
                continue;
            }

            let pair = board.candidates(row, column);

            if pair.len() > 2 {
                continue;
            }

            for row1 in bounds.rows() {
                for column1 in bounds.columns() {
                    if (row1 == row && column1 == column)
                            || board.candidates(row1, column1) != pair {
                        continue;
                    }

                    for row2 in bounds.rows() {
                        for column2 in bounds.columns() {
                            if (row2 == row && column2 == column)
                                    || (row2 == row1 && column2 == column1)
                                    || board.value(row2, column2) != UNKNOWN {
                                continue;
                            }

                            for digit in pair.iter() {
                                changed |= board.remove_candidate(row2,
                                    column2, digit);
                            }
                        }
                    }

                    continue 'cells;
                }
            }
        }
    }

    changed
}

/// Looks for a pair of candidates which, within a row, only two cells can
/// hold, and eliminates all other candidates from those two cells. The
/// second cell may lie outside this box, in which case its box's column
/// flag is recorded in the returned mask.
pub(crate) fn hidden_pairs_rows(board: &impl Board, bounds: BoxBounds)
        -> (bool, DirtyMask) {
    let mut changed = false;
    let mut foreign = DirtyMask::default();

    for row in bounds.rows() {
        'cells: for column in bounds.columns() {
            if board.value(row, column) != UNKNOWN {
                continue;
            }

            let digits: Vec<u8> =
                board.candidates(row, column).iter().collect();

            for (index, &digit1) in digits.iter().enumerate() {
                'pairs: for &digit2 in &digits[index + 1..] {
                    let mut other_column = None;

                    for column1 in 0..SIZE {
                        if column1 == column {
                            continue;
                        }

                        let other = board.candidates(row, column1);

                        if other.contains(digit1) || other.contains(digit2) {
                            if other_column.is_some() {
                                continue 'pairs;
                            }

                            other_column = Some(column1);
                        }
                    }

                    if let Some(other_column) = other_column {
                        for digit in DigitSet::all().iter() {
                            if digit == digit1 || digit == digit2 {
                                continue;
                            }

                            let removed_here =
                                board.remove_candidate(row, column, digit);
                            let removed_there = board.remove_candidate(row,
                                other_column, digit);

                            if removed_here || removed_there {
                                foreign.mark_column(row / BOX_HEIGHT,
                                    other_column / BOX_WIDTH);
                                changed = true;
                            }
                        }

                        continue 'cells;
                    }
                }
            }
        }
    }

    (changed, foreign)
}

/// Looks for a pair of candidates which, within a column, only two cells can
/// hold, and eliminates all other candidates from those two cells. The
/// second cell may lie outside this box, in which case its box's row flag is
/// recorded in the returned mask.
pub(crate) fn hidden_pairs_columns(board: &impl Board, bounds: BoxBounds)
        -> (bool, DirtyMask) {
    let mut changed = false;
    let mut foreign = DirtyMask::default();

    for row in bounds.rows() {
        'cells: for column in bounds.columns() {
            if board.value(row, column) != UNKNOWN {
                continue;
            }

            let digits: Vec<u8> =
                board.candidates(row, column).iter().collect();

            for (index, &digit1) in digits.iter().enumerate() {
                'pairs: for &digit2 in &digits[index + 1..] {
                    let mut other_row = None;

                    for row1 in 0..SIZE {
                        if row1 == row {
                            continue;
                        }

                        let other = board.candidates(row1, column);

                        if other.contains(digit1) || other.contains(digit2) {
                            if other_row.is_some() {
                                continue 'pairs;
                            }

                            other_row = Some(row1);
                        }
                    }

                    if let Some(other_row) = other_row {
                        for digit in DigitSet::all().iter() {
                            if digit == digit1 || digit == digit2 {
                                continue;
                            }

                            let removed_here =
                                board.remove_candidate(row, column, digit);
                            let removed_there = board.remove_candidate(
                                other_row, column, digit);

                            if removed_here || removed_there {
                                foreign.mark_row(other_row / BOX_HEIGHT,
                                    column / BOX_WIDTH);
                                changed = true;
                            }
                        }

                        continue 'cells;
                    }
                }
            }
        }
    }

    (changed, foreign)
}

/// Looks for a pair of candidates which, within this box, only two cells can
/// hold, and eliminates all other candidates from those two cells.
pub(crate) fn hidden_pairs_box(board: &impl Board, bounds: BoxBounds)
        -> bool {
    let mut changed = false;

    for row in bounds.rows() {
        'cells: for column in bounds.columns() {
            if board.value(row, column) != UNKNOWN {
                continue;
            }

            let digits: Vec<u8> =
                board.candidates(row, column).iter().collect();

            for (index, &digit1) in digits.iter().enumerate() {
                'pairs: for &digit2 in &digits[index + 1..] {
                    let mut other = None;

                    for row1 in bounds.rows() {
                        for column1 in bounds.columns() {
                            if row1 == row && column1 == column {
                                continue;
                            }

                            let candidates = board.candidates(row1, column1);

                            if candidates.contains(digit1)
                                    || candidates.contains(digit2) {
                                if other.is_some() {
                                    continue 'pairs;
                                }

                                other = Some((row1, column1));
                            }
                        }
                    }

                    if let Some((other_row, other_column)) = other {
                        for digit in DigitSet::all().iter() {
                            if digit == digit1 || digit == digit2 {
                                continue;
                            }

                            let removed_here =
                                board.remove_candidate(row, column, digit);
                            let removed_there = board.remove_candidate(
                                other_row, other_column, digit);

                            changed |= removed_here || removed_there;
                        }

                        continue 'cells;
                    }
                }
            }
        }
    }

    changed
}

/// Looks for digits which, within a row, can only be placed inside this box,
/// and eliminates them from the other rows of the box.
///
/// # Errors
///
/// `SolveError::MissingDigit` if some digit has no candidate cell anywhere
/// in one of the rows.
pub(crate) fn box_line_rows(board: &impl Board, bounds: BoxBounds)
        -> SolveResult<bool> {
    let mut changed = false;

    for row in bounds.rows() {
        'digits: for digit in DigitSet::all().iter() {
            let mut found_inside = false;

            for column1 in 0..SIZE {
                if board.candidates(row, column1).contains(digit) {
                    if bounds.contains_column(column1) {
                        found_inside = true;
                    }
                    else {
                        continue 'digits;
                    }
                }
            }

            if !found_inside {
                return Err(SolveError::MissingDigit {
                    digit,
                    axis: Axis::Row,
                    index: row
                });
            }

            for row2 in bounds.rows() {
                if row2 == row {
                    continue;
                }

                for column2 in bounds.columns() {
                    changed |= board.remove_candidate(row2, column2, digit);
                }
            }
        }
    }

    Ok(changed)
}

/// Looks for digits which, within a column, can only be placed inside this
/// box, and eliminates them from the other columns of the box.
///
/// # Errors
///
/// `SolveError::MissingDigit` if some digit has no candidate cell anywhere
/// in one of the columns.
pub(crate) fn box_line_columns(board: &impl Board, bounds: BoxBounds)
        -> SolveResult<bool> {
    let mut changed = false;

    for column in bounds.columns() {
        'digits: for digit in DigitSet::all().iter() {
            let mut found_inside = false;

            for row1 in 0..SIZE {
                if board.candidates(row1, column).contains(digit) {
                    if bounds.contains_row(row1) {
                        found_inside = true;
                    }
                    else {
                        continue 'digits;
                    }
                }
            }

            if !found_inside {
                return Err(SolveError::MissingDigit {
                    digit,
                    axis: Axis::Column,
                    index: column
                });
            }

            for column2 in bounds.columns() {
                if column2 == column {
                    continue;
                }

                for row2 in bounds.rows() {
                    changed |= board.remove_candidate(row2, column2, digit);
                }
            }
        }
    }

    Ok(changed)
}

/// Looks for digits whose only candidate cells within this box share a row
/// or column, and eliminates them from that row or column outside the box.
/// This strategy never modifies its own box; every elimination lands in a
/// foreign box, whose flags (and the matching flag of this box) are recorded
/// in the returned mask.
pub(crate) fn pointing(board: &impl Board, bounds: BoxBounds)
        -> (bool, DirtyMask) {
    let mut changed = false;
    let mut foreign = DirtyMask::default();

    for row in bounds.rows() {
        'digits: for digit in DigitSet::all().iter() {
            for row1 in bounds.rows() {
                let mut found = false;

                for column1 in bounds.columns() {
                    if board.candidates(row1, column1).contains(digit) {
                        found = true;
                    }
                }

                if found != (row1 == row) {
                    continue 'digits;
                }
            }

            for column in 0..SIZE {
                if bounds.contains_column(column) {
                    continue;
                }

                if board.remove_candidate(row, column, digit) {
                    foreign.mark_row(row / BOX_HEIGHT, column / BOX_WIDTH);
                    foreign.mark_column(row / BOX_HEIGHT, column / BOX_WIDTH);
                    foreign.mark_row(bounds.box_y(), bounds.box_x());
                    changed = true;
                }
            }
        }
    }

    for column in bounds.columns() {
        'digits: for digit in DigitSet::all().iter() {
            for column1 in bounds.columns() {
                let mut found = false;

                for row1 in bounds.rows() {
                    if board.candidates(row1, column1).contains(digit) {
                        found = true;
                    }
                }

                if found != (column1 == column) {
                    continue 'digits;
                }
            }

            for row in 0..SIZE {
                if bounds.contains_row(row) {
                    continue;
                }

                if board.remove_candidate(row, column, digit) {
                    foreign.mark_row(row / BOX_HEIGHT, column / BOX_WIDTH);
                    foreign.mark_column(row / BOX_HEIGHT, column / BOX_WIDTH);
                    foreign.mark_column(bounds.box_y(), bounds.box_x());
                    changed = true;
                }
            }
        }
    }

    (changed, foreign)
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::solver::logical::board::LocalBoard;

    fn remove_from_cells(board: &LocalBoard, digit: u8,
            cells: &[(usize, usize)]) {
        for &(row, column) in cells {
            board.remove_candidate(row, column, digit);
        }
    }

    #[test]
    fn naked_single_is_filled_in() {
        let board = LocalBoard::blank();

        for digit in 2..=9 {
            board.remove_candidate(0, 0, digit);
        }

        let changed =
            naked_singles(&board, BoxBounds::of_box(0, 0)).unwrap();

        assert!(changed);
        assert_eq!(1, board.value(0, 0));
        assert!(!board.candidates(0, 1).contains(1));
        assert!(!board.candidates(1, 0).contains(1));
    }

    #[test]
    fn exhausted_cell_is_a_contradiction() {
        let board = LocalBoard::blank();

        for digit in 1..=9 {
            board.remove_candidate(1, 2, digit);
        }

        assert_eq!(Err(SolveError::EmptyCell { row: 1, column: 2 }),
            naked_singles(&board, BoxBounds::of_box(0, 0)));
    }

    #[test]
    fn hidden_single_in_row_is_filled_in() {
        let board = LocalBoard::blank();
        remove_from_cells(&board, 5, &[(0, 1), (0, 2), (0, 3), (0, 4),
            (0, 5), (0, 6), (0, 7), (0, 8)]);

        assert!(hidden_singles_rows(&board, BoxBounds::of_box(0, 0)));
        assert_eq!(5, board.value(0, 0));
    }

    #[test]
    fn hidden_single_in_column_is_filled_in() {
        let board = LocalBoard::blank();
        remove_from_cells(&board, 6, &[(0, 0), (1, 0), (2, 0), (3, 0),
            (4, 0), (5, 0), (6, 0), (7, 0)]);

        assert!(hidden_singles_columns(&board, BoxBounds::of_box(2, 0)));
        assert_eq!(6, board.value(8, 0));
    }

    #[test]
    fn hidden_single_in_box_is_filled_in() {
        let board = LocalBoard::blank();
        remove_from_cells(&board, 3, &[(0, 0), (0, 1), (0, 2), (1, 0),
            (1, 2), (2, 0), (2, 1), (2, 2)]);

        assert!(hidden_singles_box(&board, BoxBounds::of_box(0, 0)));
        assert_eq!(3, board.value(1, 1));
    }

    #[test]
    fn naked_pair_clears_rest_of_row() {
        let board = LocalBoard::blank();
        let pair: DigitSet = vec![1, 2].into_iter().collect();
        board.write_candidates(0, 0, pair);
        board.write_candidates(0, 1, pair);

        assert!(naked_pairs_rows(&board, BoxBounds::of_box(0, 0)));

        for column in 2..SIZE {
            assert!(!board.candidates(0, column).contains(1));
            assert!(!board.candidates(0, column).contains(2));
            assert!(board.candidates(0, column).contains(3));
        }

        assert_eq!(pair, board.candidates(0, 0));
        assert_eq!(pair, board.candidates(0, 1));
    }

    #[test]
    fn naked_pair_clears_rest_of_box() {
        let board = LocalBoard::blank();
        let pair: DigitSet = vec![8, 9].into_iter().collect();
        board.write_candidates(0, 0, pair);
        board.write_candidates(1, 1, pair);

        assert!(naked_pairs_box(&board, BoxBounds::of_box(0, 0)));

        assert!(!board.candidates(2, 2).contains(8));
        assert!(!board.candidates(2, 2).contains(9));
        assert!(board.candidates(0, 4).contains(8));
        assert!(board.candidates(4, 0).contains(9));
    }

    #[test]
    fn hidden_pair_in_row_strips_other_candidates() {
        let board = LocalBoard::blank();

        for column in 2..SIZE {
            board.remove_candidate(0, column, 1);
            board.remove_candidate(0, column, 2);
        }

        let (changed, foreign) =
            hidden_pairs_rows(&board, BoxBounds::of_box(0, 0));

        assert!(changed);
        assert!(!foreign.is_empty());

        let pair: DigitSet = vec![1, 2].into_iter().collect();

        assert_eq!(pair, board.candidates(0, 0));
        assert_eq!(pair, board.candidates(0, 1));
        assert!(board.candidates(1, 0).contains(3));
    }

    #[test]
    fn hidden_pair_in_box_strips_other_candidates() {
        let board = LocalBoard::blank();

        for row in 0..BOX_HEIGHT {
            for column in 0..BOX_WIDTH {
                if (row, column) == (0, 0) || (row, column) == (2, 2) {
                    continue;
                }

                board.remove_candidate(row, column, 4);
                board.remove_candidate(row, column, 5);
            }
        }

        assert!(hidden_pairs_box(&board, BoxBounds::of_box(0, 0)));

        let pair: DigitSet = vec![4, 5].into_iter().collect();

        assert_eq!(pair, board.candidates(0, 0));
        assert_eq!(pair, board.candidates(2, 2));
    }

    #[test]
    fn box_line_confines_digit_to_one_row_of_the_box() {
        let board = LocalBoard::blank();
        remove_from_cells(&board, 7, &[(0, 3), (0, 4), (0, 5), (0, 6),
            (0, 7), (0, 8)]);

        let changed =
            box_line_rows(&board, BoxBounds::of_box(0, 0)).unwrap();

        assert!(changed);
        assert!(!board.candidates(1, 0).contains(7));
        assert!(!board.candidates(2, 2).contains(7));
        assert!(board.candidates(0, 0).contains(7));
        assert!(board.candidates(1, 3).contains(7));
    }

    #[test]
    fn digit_missing_from_entire_row_is_a_contradiction() {
        let board = LocalBoard::blank();
        remove_from_cells(&board, 7, &[(0, 0), (0, 1), (0, 2), (0, 3),
            (0, 4), (0, 5), (0, 6), (0, 7), (0, 8)]);

        assert_eq!(
            Err(SolveError::MissingDigit {
                digit: 7,
                axis: Axis::Row,
                index: 0
            }),
            box_line_rows(&board, BoxBounds::of_box(0, 0)));
    }

    #[test]
    fn pointing_clears_the_rest_of_the_line() {
        let board = LocalBoard::blank();
        remove_from_cells(&board, 9, &[(1, 0), (1, 1), (1, 2), (2, 0),
            (2, 1), (2, 2)]);

        let (changed, foreign) = pointing(&board, BoxBounds::of_box(0, 0));

        assert!(changed);
        assert!(!foreign.is_empty());

        for column in 3..SIZE {
            assert!(!board.candidates(0, column).contains(9));
        }

        // the box itself and other rows are untouched
        assert!(board.candidates(0, 0).contains(9));
        assert!(board.candidates(1, 5).contains(9));

        let probe = LocalBoard::blank();
        foreign.apply(&probe);

        assert!(probe.row_dirty(0, 1));
        assert!(probe.column_dirty(0, 2));
        assert!(probe.row_dirty(0, 0));
    }

    #[test]
    fn pointing_reports_no_change_on_a_blank_board() {
        let board = LocalBoard::blank();
        let (changed, foreign) = pointing(&board, BoxBounds::of_box(1, 1));

        assert!(!changed);
        assert!(foreign.is_empty());
    }
}
