//! The mutable grid state the deduction strategies operate on: the known
//! values, the per-cell candidate sets, and the per-box dirty flags that
//! drive the scheduler.
//!
//! The state exists in two representations behind the common [Board] trait.
//! [LocalBoard] stores cells in [Cell]s and is used by the single-threaded
//! solver; [SharedBoard] stores them in atomics so several workers can sweep
//! the same grid concurrently. The strategies are generic over the trait and
//! therefore written only once.

use std::array;
use std::cell::Cell;
use std::sync::atomic::{
    AtomicBool,
    AtomicU16,
    AtomicU32,
    AtomicU8,
    Ordering
};

use crate::{
    BOX_HEIGHT,
    BOX_WIDTH,
    NUM_BOXES_X,
    NUM_BOXES_Y,
    SIZE,
    SudokuGrid,
    UNKNOWN
};
use crate::error::{SolveError, SolveResult};
use crate::solver::CandidateGrid;
use crate::util::DigitSet;

/// The cell range of one 3x3 box. Minima are inclusive, maxima exclusive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct BoxBounds {
    pub(crate) min_row: usize,
    pub(crate) max_row: usize,
    pub(crate) min_column: usize,
    pub(crate) max_column: usize
}

impl BoxBounds {

    /// The bounds of the box with the given box coordinates.
    pub(crate) fn of_box(box_y: usize, box_x: usize) -> BoxBounds {
        BoxBounds {
            min_row: box_y * BOX_HEIGHT,
            max_row: (box_y + 1) * BOX_HEIGHT,
            min_column: box_x * BOX_WIDTH,
            max_column: (box_x + 1) * BOX_WIDTH
        }
    }

    /// The bounds of the box which contains the cell at the given
    /// coordinates.
    pub(crate) fn containing(row: usize, column: usize) -> BoxBounds {
        BoxBounds::of_box(row / BOX_HEIGHT, column / BOX_WIDTH)
    }

    /// The rows this box spans.
    pub(crate) fn rows(&self) -> std::ops::Range<usize> {
        self.min_row..self.max_row
    }

    /// The columns this box spans.
    pub(crate) fn columns(&self) -> std::ops::Range<usize> {
        self.min_column..self.max_column
    }

    /// Whether the given column lies inside this box.
    pub(crate) fn contains_column(&self, column: usize) -> bool {
        self.min_column <= column && column < self.max_column
    }

    /// Whether the given row lies inside this box.
    pub(crate) fn contains_row(&self, row: usize) -> bool {
        self.min_row <= row && row < self.max_row
    }

    /// The vertical box coordinate of this box.
    pub(crate) fn box_y(&self) -> usize {
        self.min_row / BOX_HEIGHT
    }

    /// The horizontal box coordinate of this box.
    pub(crate) fn box_x(&self) -> usize {
        self.min_column / BOX_WIDTH
    }
}

const ROW_FLAG_COUNT: usize = NUM_BOXES_Y * NUM_BOXES_X;

/// A set of foreign dirty flags collected by a strategy. Line-scoped hidden
/// pairs and pointing eliminate candidates in boxes other than the one they
/// were invoked on; instead of mutating the scheduler's flags directly, they
/// record the affected `(box, axis)` pairs here and the scheduler applies
/// the mask afterwards.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct DirtyMask(u32);

impl DirtyMask {

    fn row_bit(box_y: usize, box_x: usize) -> u32 {
        1 << (box_y * NUM_BOXES_X + box_x)
    }

    fn column_bit(box_y: usize, box_x: usize) -> u32 {
        1 << (ROW_FLAG_COUNT + box_y * NUM_BOXES_X + box_x)
    }

    /// Records that the row flag of the given box must be set.
    pub(crate) fn mark_row(&mut self, box_y: usize, box_x: usize) {
        self.0 |= DirtyMask::row_bit(box_y, box_x);
    }

    /// Records that the column flag of the given box must be set.
    pub(crate) fn mark_column(&mut self, box_y: usize, box_x: usize) {
        self.0 |= DirtyMask::column_bit(box_y, box_x);
    }

    /// Whether no flag has been recorded.
    pub(crate) fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Sets every recorded flag on the given board.
    pub(crate) fn apply<B: Board>(&self, board: &B) {
        if self.is_empty() {
            return;
        }

        for box_y in 0..NUM_BOXES_Y {
            for box_x in 0..NUM_BOXES_X {
                if self.0 & DirtyMask::row_bit(box_y, box_x) != 0 {
                    board.mark_row_dirty(box_y, box_x);
                }

                if self.0 & DirtyMask::column_bit(box_y, box_x) != 0 {
                    board.mark_column_dirty(box_y, box_x);
                }
            }
        }
    }
}

impl std::ops::BitOrAssign for DirtyMask {
    fn bitor_assign(&mut self, rhs: DirtyMask) {
        self.0 |= rhs.0;
    }
}

/// The storage interface the strategies and schedulers are written against.
/// All mutation goes through shared references; the sequential
/// implementation uses [Cell]s and the concurrent one atomics.
///
/// Implementors must uphold the candidate invariants between strategy
/// invocations: a known cell holds a singleton candidate set of its digit,
/// and candidate sets only ever shrink. The provided [Board::set_value]
/// maintains them; primitive operations are not meant to be called directly
/// by strategies except for candidate elimination.
pub(crate) trait Board {

    /// The digit of the cell at the given coordinates, or [UNKNOWN].
    fn value(&self, row: usize, column: usize) -> u8;

    /// The candidate set of the cell at the given coordinates. Known cells
    /// report the singleton set of their digit.
    fn candidates(&self, row: usize, column: usize) -> DigitSet;

    /// Removes the given digit from the candidates of a cell. Returns
    /// whether the digit was present before.
    fn remove_candidate(&self, row: usize, column: usize, digit: u8) -> bool;

    /// Overwrites the candidate set of a cell. Used by [Board::set_value] to
    /// collapse a cell to a singleton; strategies never add candidates.
    fn write_candidates(&self, row: usize, column: usize,
        candidates: DigitSet);

    /// Writes the digit of a cell. In the shared implementation this is a
    /// releasing store, so a worker which observes the digit also observes
    /// the candidate eliminations written before it.
    fn store_value(&self, row: usize, column: usize, digit: u8);

    /// Whether the row-oriented dirty flag of the given box is set.
    fn row_dirty(&self, box_y: usize, box_x: usize) -> bool;

    /// Whether the column-oriented dirty flag of the given box is set.
    fn column_dirty(&self, box_y: usize, box_x: usize) -> bool;

    /// Sets the row-oriented dirty flag of the given box.
    fn mark_row_dirty(&self, box_y: usize, box_x: usize);

    /// Sets the column-oriented dirty flag of the given box.
    fn mark_column_dirty(&self, box_y: usize, box_x: usize);

    /// Clears the row-oriented dirty flag of the given box.
    fn clear_row_dirty(&self, box_y: usize, box_x: usize);

    /// Clears the column-oriented dirty flag of the given box.
    fn clear_column_dirty(&self, box_y: usize, box_x: usize);

    /// Builds a board from raw values and candidates, with all dirty flags
    /// cleared.
    fn from_parts(values: [[u8; SIZE]; SIZE], candidates: CandidateGrid)
        -> Self where Self: Sized;

    /// Builds a board on which every cell is unknown and holds all nine
    /// candidates.
    fn blank() -> Self where Self: Sized {
        Self::from_parts([[UNKNOWN; SIZE]; SIZE],
            [[DigitSet::all(); SIZE]; SIZE])
    }

    /// Makes the digit of a cell known. This collapses the cell's candidates
    /// to the digit and eliminates the digit from every other cell in the
    /// same row, column, and box. The value itself is written last, after
    /// all candidate updates.
    fn set_value(&self, row: usize, column: usize, digit: u8) {
        self.write_candidates(row, column, DigitSet::singleton(digit));

        for row1 in 0..SIZE {
            if row1 != row {
                self.remove_candidate(row1, column, digit);
            }
        }

        for column1 in 0..SIZE {
            if column1 != column {
                self.remove_candidate(row, column1, digit);
            }
        }

        let bounds = BoxBounds::containing(row, column);

        for row1 in bounds.rows() {
            for column1 in bounds.columns() {
                if row1 != row && column1 != column {
                    self.remove_candidate(row1, column1, digit);
                }
            }
        }

        self.store_value(row, column, digit);
    }

    /// Applies the givens of the grid in row-major order and marks the whole
    /// board dirty.
    ///
    /// # Errors
    ///
    /// `SolveError::GivensConflict` if a given lands on a cell from whose
    /// candidates an earlier given has already removed that digit, i.e. two
    /// equal givens share a row, column, or box. The board then holds the
    /// partially applied state for diagnostics.
    fn apply_givens(&self, grid: &SudokuGrid) -> SolveResult<()> {
        for row in 0..SIZE {
            for column in 0..SIZE {
                let digit = grid.get_cell(row, column);

                if digit == UNKNOWN {
                    continue;
                }

                if !self.candidates(row, column).contains(digit) {
                    return Err(SolveError::GivensConflict { row, column });
                }

                self.set_value(row, column, digit);
            }
        }

        self.mark_all_dirty();
        Ok(())
    }

    /// Sets every dirty flag of every box, in both orientations.
    fn mark_all_dirty(&self) {
        for box_y in 0..NUM_BOXES_Y {
            for box_x in 0..NUM_BOXES_X {
                self.mark_row_dirty(box_y, box_x);
                self.mark_column_dirty(box_y, box_x);
            }
        }
    }

    /// Copies the values and candidates out of this board.
    fn snapshot(&self) -> ([[u8; SIZE]; SIZE], CandidateGrid) {
        let mut values = [[UNKNOWN; SIZE]; SIZE];
        let mut candidates = [[DigitSet::empty(); SIZE]; SIZE];

        for row in 0..SIZE {
            for column in 0..SIZE {
                values[row][column] = self.value(row, column);
                candidates[row][column] = self.candidates(row, column);
            }
        }

        (values, candidates)
    }

    /// The current values of this board as a [SudokuGrid].
    fn to_grid(&self) -> SudokuGrid {
        SudokuGrid::from_cells_unchecked(self.snapshot().0)
    }

    /// The current candidates of this board, for diagnostics.
    fn candidate_grid(&self) -> CandidateGrid {
        self.snapshot().1
    }

    /// Deep-copies this board into an independent child on which the given
    /// digit has additionally been entered at the given cell and all dirty
    /// flags are set. This is the branching step of the guess driver; the
    /// child shares no state with this board, so a failed branch leaves no
    /// trace.
    fn branch(&self, row: usize, column: usize, digit: u8) -> Self
            where Self: Sized {
        let (values, candidates) = self.snapshot();
        let child = Self::from_parts(values, candidates);
        child.set_value(row, column, digit);
        child.mark_all_dirty();
        child
    }
}

/// The single-threaded [Board]. Interior mutability through [Cell] lets the
/// strategies take `&self` like their concurrent counterparts, at no runtime
/// cost.
pub(crate) struct LocalBoard {
    values: [[Cell<u8>; SIZE]; SIZE],
    candidates: [[Cell<DigitSet>; SIZE]; SIZE],
    row_dirty: [[Cell<bool>; NUM_BOXES_X]; NUM_BOXES_Y],
    column_dirty: [[Cell<bool>; NUM_BOXES_X]; NUM_BOXES_Y]
}

impl Board for LocalBoard {

    fn value(&self, row: usize, column: usize) -> u8 {
        self.values[row][column].get()
    }

    fn candidates(&self, row: usize, column: usize) -> DigitSet {
        self.candidates[row][column].get()
    }

    fn remove_candidate(&self, row: usize, column: usize, digit: u8) -> bool {
        let mut candidates = self.candidates[row][column].get();
        let removed = candidates.remove(digit);
        self.candidates[row][column].set(candidates);
        removed
    }

    fn write_candidates(&self, row: usize, column: usize,
            candidates: DigitSet) {
        self.candidates[row][column].set(candidates);
    }

    fn store_value(&self, row: usize, column: usize, digit: u8) {
        self.values[row][column].set(digit);
    }

    fn row_dirty(&self, box_y: usize, box_x: usize) -> bool {
        self.row_dirty[box_y][box_x].get()
    }

    fn column_dirty(&self, box_y: usize, box_x: usize) -> bool {
        self.column_dirty[box_y][box_x].get()
    }

    fn mark_row_dirty(&self, box_y: usize, box_x: usize) {
        self.row_dirty[box_y][box_x].set(true);
    }

    fn mark_column_dirty(&self, box_y: usize, box_x: usize) {
        self.column_dirty[box_y][box_x].set(true);
    }

    fn clear_row_dirty(&self, box_y: usize, box_x: usize) {
        self.row_dirty[box_y][box_x].set(false);
    }

    fn clear_column_dirty(&self, box_y: usize, box_x: usize) {
        self.column_dirty[box_y][box_x].set(false);
    }

    fn from_parts(values: [[u8; SIZE]; SIZE], candidates: CandidateGrid)
            -> LocalBoard {
        LocalBoard {
            values: array::from_fn(|row|
                array::from_fn(|column| Cell::new(values[row][column]))),
            candidates: array::from_fn(|row|
                array::from_fn(|column| Cell::new(candidates[row][column]))),
            row_dirty: array::from_fn(|_|
                array::from_fn(|_| Cell::new(false))),
            column_dirty: array::from_fn(|_|
                array::from_fn(|_| Cell::new(false)))
        }
    }
}

/// The concurrently shared [Board]. Every cell value, candidate set, and
/// dirty flag is an atomic; the writer and reader counters implement the
/// advisory locking of the contended scheduler.
///
/// Candidate stores use `Release` and loads `Acquire`, and
/// [Board::set_value] writes the value itself last, so any worker which
/// reads a digit also sees all eliminations that digit caused. Dirty flags
/// may be observed spuriously true, which only costs a re-scan, but are
/// never missing after a mutation.
pub(crate) struct SharedBoard {
    values: [[AtomicU8; SIZE]; SIZE],
    candidates: [[AtomicU16; SIZE]; SIZE],
    row_dirty: [[AtomicBool; NUM_BOXES_X]; NUM_BOXES_Y],
    column_dirty: [[AtomicBool; NUM_BOXES_X]; NUM_BOXES_Y],
    box_writers: [[AtomicU32; NUM_BOXES_X]; NUM_BOXES_Y],
    row_readers: [AtomicU32; NUM_BOXES_Y],
    column_readers: [AtomicU32; NUM_BOXES_X]
}

impl SharedBoard {

    /// Attempts to take the writer lock of a box by moving its counter from
    /// 0 to 1. Returns whether the lock was taken.
    pub(crate) fn try_acquire_box(&self, box_y: usize, box_x: usize) -> bool {
        self.box_writers[box_y][box_x]
            .compare_exchange(0, 1, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Takes the writer counter of a box regardless of contention. Used once
    /// a worker has decided to stop backing off.
    pub(crate) fn acquire_box_anyway(&self, box_y: usize, box_x: usize) {
        self.box_writers[box_y][box_x].fetch_add(1, Ordering::Acquire);
    }

    /// Releases the writer counter of a box.
    pub(crate) fn release_box(&self, box_y: usize, box_x: usize) {
        self.box_writers[box_y][box_x].fetch_sub(1, Ordering::Release);
    }

    /// Attempts to take the reader lock of a row band. Returns whether the
    /// lock was taken.
    pub(crate) fn try_acquire_row_band(&self, box_y: usize) -> bool {
        self.row_readers[box_y]
            .compare_exchange(0, 1, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Takes the reader counter of a row band regardless of contention.
    /// Concurrent readers on the same band are harmless.
    pub(crate) fn acquire_row_band_anyway(&self, box_y: usize) {
        self.row_readers[box_y].fetch_add(1, Ordering::Acquire);
    }

    /// Releases the reader counter of a row band.
    pub(crate) fn release_row_band(&self, box_y: usize) {
        self.row_readers[box_y].fetch_sub(1, Ordering::Release);
    }

    /// Attempts to take the reader lock of a column stack. Returns whether
    /// the lock was taken.
    pub(crate) fn try_acquire_column_stack(&self, box_x: usize) -> bool {
        self.column_readers[box_x]
            .compare_exchange(0, 1, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Takes the reader counter of a column stack regardless of contention.
    pub(crate) fn acquire_column_stack_anyway(&self, box_x: usize) {
        self.column_readers[box_x].fetch_add(1, Ordering::Acquire);
    }

    /// Releases the reader counter of a column stack.
    pub(crate) fn release_column_stack(&self, box_x: usize) {
        self.column_readers[box_x].fetch_sub(1, Ordering::Release);
    }
}

impl Board for SharedBoard {

    fn value(&self, row: usize, column: usize) -> u8 {
        self.values[row][column].load(Ordering::Acquire)
    }

    fn candidates(&self, row: usize, column: usize) -> DigitSet {
        DigitSet::from_bits(
            self.candidates[row][column].load(Ordering::Acquire))
    }

    fn remove_candidate(&self, row: usize, column: usize, digit: u8) -> bool {
        let mask = DigitSet::singleton(digit).bits();
        let previous = self.candidates[row][column]
            .fetch_and(!mask, Ordering::AcqRel);
        previous & mask != 0
    }

    fn write_candidates(&self, row: usize, column: usize,
            candidates: DigitSet) {
        self.candidates[row][column].store(candidates.bits(),
            Ordering::Release);
    }

    fn store_value(&self, row: usize, column: usize, digit: u8) {
        self.values[row][column].store(digit, Ordering::Release);
    }

    fn row_dirty(&self, box_y: usize, box_x: usize) -> bool {
        self.row_dirty[box_y][box_x].load(Ordering::Acquire)
    }

    fn column_dirty(&self, box_y: usize, box_x: usize) -> bool {
        self.column_dirty[box_y][box_x].load(Ordering::Acquire)
    }

    fn mark_row_dirty(&self, box_y: usize, box_x: usize) {
        self.row_dirty[box_y][box_x].store(true, Ordering::Release);
    }

    fn mark_column_dirty(&self, box_y: usize, box_x: usize) {
        self.column_dirty[box_y][box_x].store(true, Ordering::Release);
    }

    fn clear_row_dirty(&self, box_y: usize, box_x: usize) {
        self.row_dirty[box_y][box_x].store(false, Ordering::Release);
    }

    fn clear_column_dirty(&self, box_y: usize, box_x: usize) {
        self.column_dirty[box_y][box_x].store(false, Ordering::Release);
    }

    fn from_parts(values: [[u8; SIZE]; SIZE], candidates: CandidateGrid)
            -> SharedBoard {
        SharedBoard {
            values: array::from_fn(|row| array::from_fn(|column|
                AtomicU8::new(values[row][column]))),
            candidates: array::from_fn(|row| array::from_fn(|column|
                AtomicU16::new(candidates[row][column].bits()))),
            row_dirty: array::from_fn(|_| array::from_fn(|_|
                AtomicBool::new(false))),
            column_dirty: array::from_fn(|_| array::from_fn(|_|
                AtomicBool::new(false))),
            box_writers: array::from_fn(|_| array::from_fn(|_|
                AtomicU32::new(0))),
            row_readers: array::from_fn(|_| AtomicU32::new(0)),
            column_readers: array::from_fn(|_| AtomicU32::new(0))
        }
    }
}
