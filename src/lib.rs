// Code lints

#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_import_braces)]
#![warn(unused_lifetimes)]
#![warn(unused_qualifications)]

// Doc lints

#![warn(rustdoc::broken_intra_doc_links)]
#![warn(missing_docs)]

//! This crate implements a 9x9 Sudoku engine which solves puzzles the way a
//! human would: by accumulating pencil-mark candidates for every cell and
//! repeatedly applying a library of logical deduction strategies (naked and
//! hidden singles, naked and hidden pairs, box-line reduction, and pointing
//! pairs) until nothing more can be deduced. Only then does it fall back to
//! guess-and-check on the cell with the fewest remaining candidates.
//!
//! The deduction engine comes in three execution flavours:
//!
//! * [LogicalSolver](solver::logical::LogicalSolver) runs on a single thread.
//! * [ParallelLogicalSolver](solver::logical::ParallelLogicalSolver) lets
//! several workers sweep the same grid concurrently, coordinating through
//! per-box writer and per-line reader counters.
//! * [CoordinatedLogicalSolver](solver::logical::CoordinatedLogicalSolver)
//! statically assigns one box to each worker per round and rotates the
//! assignment between rounds, so no locking is needed.
//!
//! For comparison, the crate also ships a plain recursive
//! [BacktrackingSolver](solver::BacktrackingSolver), a depth-bounded
//! [ParallelBacktrackingSolver](solver::ParallelBacktrackingSolver) and a
//! simulated-annealing [AnnealingSolver](solver::annealing::AnnealingSolver).
//!
//! # Parsing and printing grids
//!
//! A puzzle is nine lines of nine characters, where `1` to `9` are givens and
//! `0` or `.` mark unknown cells. See [SudokuGrid::parse].
//!
//! ```
//! use sudoku_logical::SudokuGrid;
//!
//! let grid = SudokuGrid::parse(
//!     "53..7....\n\
//!      6..195...\n\
//!      .98....6.\n\
//!      8...6...3\n\
//!      4..8.3..1\n\
//!      7...2...6\n\
//!      .6....28.\n\
//!      ...419..5\n\
//!      ....8..79").unwrap();
//!
//! assert_eq!(5, grid.get_cell(0, 0));
//! assert_eq!(0, grid.get_cell(0, 2));
//! println!("{}", grid);
//! ```
//!
//! # Solving
//!
//! All solvers implement the [Solver](solver::Solver) trait, which takes a
//! grid of givens and either returns a completed grid or a diagnosis of why
//! no solution exists.
//!
//! ```
//! use sudoku_logical::SudokuGrid;
//! use sudoku_logical::solver::{Solution, Solver};
//! use sudoku_logical::solver::logical::LogicalSolver;
//!
//! let puzzle = SudokuGrid::parse(
//!     "53..7....\n\
//!      6..195...\n\
//!      .98....6.\n\
//!      8...6...3\n\
//!      4..8.3..1\n\
//!      7...2...6\n\
//!      .6....28.\n\
//!      ...419..5\n\
//!      ....8..79").unwrap();
//! let expected = SudokuGrid::parse(
//!     "534678912\n\
//!      672195348\n\
//!      198342567\n\
//!      859761423\n\
//!      426853791\n\
//!      713924856\n\
//!      961537284\n\
//!      287419635\n\
//!      345286179").unwrap();
//!
//! assert_eq!(Solution::Solved(expected), LogicalSolver.solve(&puzzle));
//! ```
//!
//! When a puzzle cannot be solved, the returned
//! [Unsolvable](solver::Unsolvable) carries the partially solved grid and the
//! remaining candidates of every cell for diagnostics, along with the
//! [SolveError](error::SolveError) that ended the attempt.

pub mod error;
pub mod solver;
pub mod util;

#[cfg(test)]
mod random_tests;

use std::fmt::{self, Display, Formatter};

use error::GridParseError;
use util::DigitSet;

/// The width and height of the grid, which is also the largest digit.
pub const SIZE: usize = 9;

/// The width of one box of the grid.
pub const BOX_WIDTH: usize = 3;

/// The height of one box of the grid.
pub const BOX_HEIGHT: usize = 3;

/// The number of boxes which span the grid horizontally.
pub const NUM_BOXES_X: usize = SIZE / BOX_WIDTH;

/// The number of boxes which span the grid vertically.
pub const NUM_BOXES_Y: usize = SIZE / BOX_HEIGHT;

/// The cell value which stands for a cell whose digit is not (yet) known.
pub const UNKNOWN: u8 = 0;

/// A 9x9 Sudoku grid of cells, each of which holds a digit from 1 to 9 or
/// [UNKNOWN]. This type carries no candidate information; it is the input
/// and output format of the [solvers](solver::Solver).
///
/// `SudokuGrid` implements `Display` using box-drawing characters, so it can
/// be printed directly:
///
/// ```text
/// ╔═══╤═══╤═══╦═══╤═══╤═══╦═══╤═══╤═══╗
/// ║ 5 │ 3 │   ║   │ 7 │   ║   │   │   ║
/// ╟───┼───┼───╫───┼───┼───╫───┼───┼───╢
/// ║ 6 │   │   ║ 1 │ 9 │ 5 ║   │   │   ║
/// ...
/// ╚═══╧═══╧═══╩═══╧═══╧═══╩═══╧═══╧═══╝
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SudokuGrid {
    cells: [[u8; SIZE]; SIZE]
}

impl SudokuGrid {

    /// Creates a new, empty grid in which every cell is [UNKNOWN].
    pub fn new() -> SudokuGrid {
        SudokuGrid {
            cells: [[UNKNOWN; SIZE]; SIZE]
        }
    }

    /// Creates a grid from a 9x9 array of cell values, where rows are the
    /// outer dimension. Every value must be in the range `[0, 9]`, with 0
    /// standing for an unknown cell.
    ///
    /// # Errors
    ///
    /// `GridParseError::InvalidDigit` if any value is greater than 9.
    pub fn from_cells(cells: [[u8; SIZE]; SIZE])
            -> Result<SudokuGrid, GridParseError> {
        for row in &cells {
            for &digit in row {
                if digit as usize > SIZE {
                    return Err(GridParseError::InvalidDigit { digit });
                }
            }
        }

        Ok(SudokuGrid { cells })
    }

    pub(crate) fn from_cells_unchecked(cells: [[u8; SIZE]; SIZE])
            -> SudokuGrid {
        SudokuGrid { cells }
    }

    /// Parses a grid from the nine-line text format: nine lines of nine
    /// characters each, where `1` to `9` are givens and `0` or `.` mark
    /// unknown cells. A trailing carriage return on a line and trailing blank
    /// lines are ignored, so files from any platform parse equally.
    ///
    /// # Errors
    ///
    /// Any specialization of [GridParseError] (see that documentation).
    pub fn parse(text: &str) -> Result<SudokuGrid, GridParseError> {
        let mut lines: Vec<&str> = text.lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();

        while lines.last() == Some(&"") {
            lines.pop();
        }

        if lines.len() != SIZE {
            return Err(GridParseError::WrongNumberOfRows(lines.len()));
        }

        let mut cells = [[UNKNOWN; SIZE]; SIZE];

        for (row, line) in lines.iter().enumerate() {
            let length = line.chars().count();

            if length != SIZE {
                return Err(GridParseError::WrongRowLength { row, length });
            }

            for (column, character) in line.chars().enumerate() {
                cells[row][column] = match character {
                    '.' | '0' => UNKNOWN,
                    '1'..='9' => character as u8 - b'0',
                    _ => return Err(GridParseError::InvalidCharacter {
                        row,
                        column,
                        character
                    })
                };
            }
        }

        Ok(SudokuGrid { cells })
    }

    /// Converts the grid into a `String` in the nine-line format accepted by
    /// [SudokuGrid::parse], using `.` for unknown cells. Parsing the result
    /// yields back an equal grid.
    pub fn to_parseable_string(&self) -> String {
        let mut result = String::with_capacity(SIZE * (SIZE + 1));

        for row in 0..SIZE {
            for column in 0..SIZE {
                let digit = self.cells[row][column];

                if digit == UNKNOWN {
                    result.push('.');
                }
                else {
                    result.push((b'0' + digit) as char);
                }
            }

            if row + 1 < SIZE {
                result.push('\n');
            }
        }

        result
    }

    /// Gets the content of the cell in the given row and column, both of
    /// which must be less than [SIZE]. A return value of [UNKNOWN] indicates
    /// an empty cell.
    pub fn get_cell(&self, row: usize, column: usize) -> u8 {
        self.cells[row][column]
    }

    /// Sets the content of the cell in the given row and column to the given
    /// digit, overwriting any previous content. Both coordinates must be less
    /// than [SIZE].
    ///
    /// # Errors
    ///
    /// `GridParseError::InvalidDigit` if `digit` is 0 or greater than 9. Use
    /// [SudokuGrid::clear_cell] to empty a cell.
    pub fn set_cell(&mut self, row: usize, column: usize, digit: u8)
            -> Result<(), GridParseError> {
        if digit == UNKNOWN || digit as usize > SIZE {
            return Err(GridParseError::InvalidDigit { digit });
        }

        self.cells[row][column] = digit;
        Ok(())
    }

    /// Clears the content of the cell in the given row and column, i.e. sets
    /// it to [UNKNOWN]. Both coordinates must be less than [SIZE].
    pub fn clear_cell(&mut self, row: usize, column: usize) {
        self.cells[row][column] = UNKNOWN;
    }

    /// Gets a reference to the arrays which hold the cells, with rows as the
    /// outer dimension.
    pub fn cells(&self) -> &[[u8; SIZE]; SIZE] {
        &self.cells
    }

    /// Indicates whether this grid is full, i.e. no cell is [UNKNOWN].
    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(|&digit| digit != UNKNOWN)
    }

    /// Counts the number of givens in this grid, that is, the number of
    /// cells which are not [UNKNOWN].
    pub fn count_clues(&self) -> usize {
        self.cells.iter()
            .flatten()
            .filter(|&&digit| digit != UNKNOWN)
            .count()
    }

    /// Indicates whether placing `digit` in the cell at the given row and
    /// column would break the Sudoku rules, i.e. whether the digit already
    /// occurs somewhere in the same row, column, or box. `true` means the
    /// placement is allowed.
    pub fn is_valid_number(&self, row: usize, column: usize, digit: u8)
            -> bool {
        for i in 0..SIZE {
            if self.cells[row][i] == digit || self.cells[i][column] == digit {
                return false;
            }
        }

        let box_min_row = row / BOX_HEIGHT * BOX_HEIGHT;
        let box_min_column = column / BOX_WIDTH * BOX_WIDTH;

        for r in box_min_row..(box_min_row + BOX_HEIGHT) {
            for c in box_min_column..(box_min_column + BOX_WIDTH) {
                if self.cells[r][c] == digit {
                    return false;
                }
            }
        }

        true
    }

    /// Searches for a pair of equal known digits in the same row, column, or
    /// box. If one exists, the coordinates of the later of the two cells in
    /// row-major order are returned, and `None` otherwise.
    pub fn first_conflict(&self) -> Option<(usize, usize)> {
        for row in 0..SIZE {
            let mut seen = DigitSet::empty();

            for column in 0..SIZE {
                let digit = self.cells[row][column];

                if digit != UNKNOWN && !seen.insert(digit) {
                    return Some((row, column));
                }
            }
        }

        for column in 0..SIZE {
            let mut seen = DigitSet::empty();

            for row in 0..SIZE {
                let digit = self.cells[row][column];

                if digit != UNKNOWN && !seen.insert(digit) {
                    return Some((row, column));
                }
            }
        }

        for box_y in 0..NUM_BOXES_Y {
            for box_x in 0..NUM_BOXES_X {
                let mut seen = DigitSet::empty();

                for row in (box_y * BOX_HEIGHT)..((box_y + 1) * BOX_HEIGHT) {
                    for column in
                            (box_x * BOX_WIDTH)..((box_x + 1) * BOX_WIDTH) {
                        let digit = self.cells[row][column];

                        if digit != UNKNOWN && !seen.insert(digit) {
                            return Some((row, column));
                        }
                    }
                }
            }
        }

        None
    }

    /// Indicates whether this grid breaks no Sudoku rules, i.e. no row,
    /// column, or box contains the same digit twice. Unknown cells are
    /// ignored, so a partial grid can be valid.
    pub fn is_valid(&self) -> bool {
        self.first_conflict().is_none()
    }

    /// Indicates whether this grid is a solution of the given puzzle. That is
    /// the case if this grid is full, breaks no Sudoku rules, and agrees with
    /// every given of the puzzle.
    pub fn is_solution_of(&self, puzzle: &SudokuGrid) -> bool {
        if !self.is_full() || !self.is_valid() {
            return false;
        }

        for row in 0..SIZE {
            for column in 0..SIZE {
                let given = puzzle.cells[row][column];

                if given != UNKNOWN && given != self.cells[row][column] {
                    return false;
                }
            }
        }

        true
    }
}

impl Default for SudokuGrid {
    fn default() -> SudokuGrid {
        SudokuGrid::new()
    }
}

fn separator_line(start: char, thick_sep: char, thin_sep: char, fill: char,
        end: char) -> String {
    let mut result = String::new();

    for column in 0..SIZE {
        if column == 0 {
            result.push(start);
        }
        else if column % BOX_WIDTH == 0 {
            result.push(thick_sep);
        }
        else {
            result.push(thin_sep);
        }

        for _ in 0..3 {
            result.push(fill);
        }
    }

    result.push(end);
    result
}

impl Display for SudokuGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let top = separator_line('╔', '╦', '╤', '═', '╗');
        let thin = separator_line('╟', '╫', '┼', '─', '╢');
        let thick = separator_line('╠', '╬', '╪', '═', '╣');
        let bottom = separator_line('╚', '╩', '╧', '═', '╝');

        for row in 0..SIZE {
            if row == 0 {
                writeln!(f, "{}", top)?;
            }
            else if row % BOX_HEIGHT == 0 {
                writeln!(f, "{}", thick)?;
            }
            else {
                writeln!(f, "{}", thin)?;
            }

            for column in 0..SIZE {
                let separator = if column % BOX_WIDTH == 0 { '║' }
                    else { '│' };
                let digit = self.cells[row][column];
                let content = if digit == UNKNOWN { ' ' }
                    else { (b'0' + digit) as char };

                write!(f, "{} {} ", separator, content)?;
            }

            writeln!(f, "║")?;
        }

        write!(f, "{}", bottom)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn parse_ok() {
        let grid = SudokuGrid::parse(
            "53..7....\n\
             6..195...\n\
             .98....6.\n\
             8...6...3\n\
             4..8.3..1\n\
             7...2...6\n\
             .6....28.\n\
             ...419..5\n\
             ....8..79").unwrap();

        assert_eq!(5, grid.get_cell(0, 0));
        assert_eq!(3, grid.get_cell(0, 1));
        assert_eq!(0, grid.get_cell(0, 2));
        assert_eq!(7, grid.get_cell(0, 4));
        assert_eq!(9, grid.get_cell(8, 8));
        assert_eq!(30, grid.count_clues());
    }

    #[test]
    fn parse_accepts_zero_for_unknown() {
        let dots = SudokuGrid::parse(&".........\n".repeat(9)).unwrap();
        let zeros = SudokuGrid::parse(&"000000000\n".repeat(9)).unwrap();

        assert_eq!(dots, zeros);
        assert_eq!(0, zeros.count_clues());
    }

    #[test]
    fn parse_wrong_number_of_rows() {
        assert_eq!(Err(GridParseError::WrongNumberOfRows(3)),
            SudokuGrid::parse(".........\n.........\n........."));
    }

    #[test]
    fn parse_wrong_row_length() {
        let mut text = ".........\n".repeat(8);
        text.push_str("......");

        assert_eq!(Err(GridParseError::WrongRowLength { row: 8, length: 6 }),
            SudokuGrid::parse(&text));
    }

    #[test]
    fn parse_invalid_character() {
        let mut text = ".........\n".repeat(8);
        text.push_str("....x....");

        assert_eq!(
            Err(GridParseError::InvalidCharacter {
                row: 8,
                column: 4,
                character: 'x'
            }),
            SudokuGrid::parse(&text));
    }

    #[test]
    fn parse_tolerates_crlf_and_trailing_newline() {
        let text = ".........\r\n".repeat(9);

        assert!(SudokuGrid::parse(&text).is_ok());
    }

    #[test]
    fn parseable_string_round_trip() {
        let grid = SudokuGrid::parse(
            "53..7....\n\
             6..195...\n\
             .98....6.\n\
             8...6...3\n\
             4..8.3..1\n\
             7...2...6\n\
             .6....28.\n\
             ...419..5\n\
             ....8..79").unwrap();

        assert_eq!(Ok(grid), SudokuGrid::parse(&grid.to_parseable_string()));
    }

    #[test]
    fn from_cells_rejects_large_digits() {
        let mut cells = [[0u8; SIZE]; SIZE];
        cells[4][4] = 10;

        assert_eq!(Err(GridParseError::InvalidDigit { digit: 10 }),
            SudokuGrid::from_cells(cells));
    }

    #[test]
    fn valid_number_checks_row_column_and_box() {
        let mut grid = SudokuGrid::new();
        grid.set_cell(0, 0, 5).unwrap();

        assert!(!grid.is_valid_number(0, 8, 5));
        assert!(!grid.is_valid_number(8, 0, 5));
        assert!(!grid.is_valid_number(2, 2, 5));
        assert!(grid.is_valid_number(3, 3, 5));
        assert!(grid.is_valid_number(0, 8, 6));
    }

    #[test]
    fn conflict_in_row_is_found() {
        let mut grid = SudokuGrid::new();
        grid.set_cell(0, 0, 5).unwrap();
        grid.set_cell(0, 4, 5).unwrap();

        assert_eq!(Some((0, 4)), grid.first_conflict());
        assert!(!grid.is_valid());
    }

    #[test]
    fn conflict_in_box_is_found() {
        let mut grid = SudokuGrid::new();
        grid.set_cell(3, 0, 2).unwrap();
        grid.set_cell(5, 2, 2).unwrap();

        assert_eq!(Some((5, 2)), grid.first_conflict());
    }

    #[test]
    fn empty_grid_is_valid() {
        assert!(SudokuGrid::new().is_valid());
        assert!(!SudokuGrid::new().is_full());
    }

    #[test]
    fn solution_must_agree_with_givens() {
        let puzzle = SudokuGrid::parse(
            "53..7....\n\
             6..195...\n\
             .98....6.\n\
             8...6...3\n\
             4..8.3..1\n\
             7...2...6\n\
             .6....28.\n\
             ...419..5\n\
             ....8..79").unwrap();
        let solution = SudokuGrid::parse(
            "534678912\n\
             672195348\n\
             198342567\n\
             859761423\n\
             426853791\n\
             713924856\n\
             961537284\n\
             287419635\n\
             345286179").unwrap();

        assert!(solution.is_solution_of(&puzzle));
        assert!(!puzzle.is_solution_of(&puzzle));

        let mut other = solution;
        other.set_cell(0, 2, 1).unwrap();

        assert!(!other.is_solution_of(&puzzle));
    }

    #[test]
    fn display_draws_boxes() {
        let grid = SudokuGrid::new();
        let rendered = format!("{}", grid);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(19, lines.len());
        assert!(lines[0].starts_with('╔'));
        assert!(lines[18].starts_with('╚'));
        assert!(lines[1].starts_with('║'));
    }
}
