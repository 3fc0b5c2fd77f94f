//! Implicit intersection of a reference against the calling cell.

use gridcalc_common::{CalcError, ErrorKind, Reference, ScalarValue};

use crate::context::CalcContext;

/// Reduces a reference to the single cell that intersects the calling
/// cell, per pre-dynamic-array semantics.
///
/// A multi-area reference never intersects. A single-area reference
/// intersects when it is one cell, or one column wide with the calling
/// row inside its rows, or one row tall with the calling column inside
/// its columns.
pub fn implicit_intersection(
    ctx: &dyn CalcContext,
    reference: &Reference,
) -> Result<ScalarValue, CalcError> {
    let area = reference
        .as_single_area()
        .ok_or_else(|| CalcError::new(ErrorKind::IncompatibleValue))?;
    let caller = ctx.calling_cell();

    let (row, col) = if area.row_count() == 1 && area.col_count() == 1 {
        (area.first_row, area.first_col)
    } else if area.col_count() == 1 && area.contains_row(caller.row) {
        (caller.row, area.first_col)
    } else if area.row_count() == 1 && area.contains_col(caller.col) {
        (area.first_row, caller.col)
    } else {
        return Err(CalcError::new(ErrorKind::IncompatibleValue));
    };

    Ok(ctx.get_cell_value(&area.sheet, row, col))
}
