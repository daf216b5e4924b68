//! This module contains the error and result definitions used in this crate.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

/// The orientation of a line of cells, used to report which kind of line a
/// deduction was scanning when it found a contradiction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Axis {

    /// A horizontal line of nine cells.
    Row,

    /// A vertical line of nine cells.
    Column
}

impl Display for Axis {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Column => f.write_str("column")
        }
    }
}

/// An enumeration of the errors that may occur when parsing or constructing a
/// [SudokuGrid](crate::SudokuGrid).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum GridParseError {

    /// Indicates that the input does not consist of exactly nine lines.
    #[error("wrong number of rows: expected 9, found {0}")]
    WrongNumberOfRows(usize),

    /// Indicates that one of the input lines does not consist of exactly nine
    /// characters.
    #[error("row {row} has {length} cells, expected 9")]
    WrongRowLength {

        /// The index of the offending row.
        row: usize,

        /// The number of characters found in that row.
        length: usize
    },

    /// Indicates that the input contains a character which is neither a digit
    /// nor one of the accepted placeholders for an unknown cell (`0` or `.`).
    #[error("invalid character {character:?} at row {row}, column {column}")]
    InvalidCharacter {

        /// The index of the row containing the offending character.
        row: usize,

        /// The index of the column containing the offending character.
        column: usize,

        /// The offending character itself.
        character: char
    },

    /// Indicates that a cell was assigned a number outside the range
    /// `[0, 9]`, where 0 stands for an unknown cell.
    #[error("invalid digit {digit}, cells hold 0 (unknown) to 9")]
    InvalidDigit {

        /// The offending number.
        digit: u8
    }
}

/// An enumeration of the ways a solve attempt can fail. Within the engine
/// these are ordinary values that strategies return and the scheduler and
/// guess driver propagate; a failure of a guessed branch merely rejects that
/// branch, while a failure of the root attempt makes the puzzle unsolvable.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SolveError {

    /// Indicates that a given directly conflicts with another given in the
    /// same row, column or box. Detected while the givens are applied.
    #[error("given at R{row}C{column} conflicts with another given")]
    GivensConflict {

        /// The row of the given that could no longer be placed.
        row: usize,

        /// The column of the given that could no longer be placed.
        column: usize
    },

    /// Indicates that an unknown cell has no remaining candidate digits.
    #[error("no candidates left in cell R{row}C{column}")]
    EmptyCell {

        /// The row of the exhausted cell.
        row: usize,

        /// The column of the exhausted cell.
        column: usize
    },

    /// Indicates that some digit has no remaining candidate cell in an entire
    /// row or column.
    #[error("digit {digit} has no remaining place in {axis} {index}")]
    MissingDigit {

        /// The digit that can no longer be placed.
        digit: u8,

        /// Whether the exhausted line is a row or a column.
        axis: Axis,

        /// The index of the exhausted line.
        index: usize
    },

    /// Indicates that every candidate of the branching cell led to a
    /// contradiction in the guess driver.
    #[error("no guess for R{row}C{column} worked")]
    ExhaustedGuesses {

        /// The row of the cell whose candidates were all tried.
        row: usize,

        /// The column of the cell whose candidates were all tried.
        column: usize
    },

    /// Indicates that the stochastic brute-force solver gave up after the
    /// configured number of restarts without finding a solution. This does
    /// not prove the puzzle unsolvable.
    #[error("search did not converge after {restarts} restarts")]
    DidNotConverge {

        /// The number of annealing restarts that were attempted.
        restarts: usize
    }
}

/// Syntactic sugar for `Result<V, SolveError>`.
pub type SolveResult<V> = Result<V, SolveError>;
