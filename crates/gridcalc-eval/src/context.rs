//! The per-evaluation calculation context and the control-flow carrier
//! used inside function bodies.

use gridcalc_common::{CalcError, ScalarValue};

use crate::locale::Locale;

/// Coordinates of the cell whose formula is currently being evaluated
/// (1-based). Needed for implicit intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

/// Evaluation was abandoned on a cancellation request. Not a value and
/// not a spreadsheet error; the recalculation driver decides what to do
/// with the half-finished pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

/// Why a function body stopped early. `Error` folds back into an error
/// value at the dispatch boundary; `Cancelled` surfaces as
/// [`Interrupted`]. Both ride on `?` inside function bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalBreak {
    Error(CalcError),
    Cancelled,
}

impl From<CalcError> for EvalBreak {
    fn from(e: CalcError) -> Self {
        EvalBreak::Error(e)
    }
}

impl From<gridcalc_common::ErrorKind> for EvalBreak {
    fn from(kind: gridcalc_common::ErrorKind) -> Self {
        EvalBreak::Error(CalcError::new(kind))
    }
}

/// Everything a function may consume from its surroundings during one
/// evaluation: locale, cooperative cancellation, the calling cell, lazy
/// cell access, and the date-system bound. Read-only from the core's
/// perspective; owned by the evaluator for one recalculation pass.
pub trait CalcContext {
    fn locale(&self) -> &Locale;

    /// Polled by long-running iterations; `true` requests abandonment.
    fn cancellation_requested(&self) -> bool;

    fn calling_cell(&self) -> CellCoord;

    /// Resolves one cell of a reference. An unset cell is `Blank`.
    fn get_cell_value(&self, sheet: &str, row: u32, col: u32) -> ScalarValue;

    /// `(last_row, last_col)` of the sheet's used region, `(0, 0)` when
    /// the sheet is empty. Unbounded reference areas are clamped to this
    /// before enumeration.
    fn used_extent(&self, sheet: &str) -> (u32, u32);

    /// Exclusive upper bound of the date serial range.
    fn date_system_upper_limit(&self) -> f64 {
        2_958_466.0
    }

    /// Year substituted by text-to-date conversion for patterns
    /// without a year component.
    fn current_year(&self) -> i32;

    /// Convenience poll that converts a cancellation request into the
    /// break used by function bodies.
    fn check_cancelled(&self) -> Result<(), EvalBreak> {
        if self.cancellation_requested() {
            Err(EvalBreak::Cancelled)
        } else {
            Ok(())
        }
    }
}
