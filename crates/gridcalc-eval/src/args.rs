//! Argument access and coercion for function implementations.
//!
//! Scalar-typed parameters collapse arrays to their top-left element
//! and references through implicit intersection, then coerce the
//! resulting scalar. Error scalars always propagate instead of
//! coercing. The `opt_*` variants fall back to a default only when the
//! argument is absent, never when it is blank.

use gridcalc_common::{AnyValue, CalcError, ErrorKind, ScalarValue};

use crate::context::{CalcContext, EvalBreak};
use crate::intersect::implicit_intersection;

/// The scalar form of argument `i`, without further coercion.
pub fn scalar_arg(
    ctx: &dyn CalcContext,
    args: &[AnyValue],
    i: usize,
) -> Result<ScalarValue, EvalBreak> {
    let scalar = match &args[i] {
        AnyValue::Scalar(s) => s.clone(),
        AnyValue::Array(a) => a.top_left().clone(),
        AnyValue::Reference(r) => implicit_intersection(ctx, r)?,
    };
    match scalar {
        ScalarValue::Error(e) => Err(EvalBreak::Error(e)),
        other => Ok(other),
    }
}

pub fn text_arg(ctx: &dyn CalcContext, args: &[AnyValue], i: usize) -> Result<String, EvalBreak> {
    let scalar = scalar_arg(ctx, args, i)?;
    to_text(ctx, &scalar)
}

pub fn number_arg(ctx: &dyn CalcContext, args: &[AnyValue], i: usize) -> Result<f64, EvalBreak> {
    let scalar = scalar_arg(ctx, args, i)?;
    to_number(ctx, &scalar)
}

pub fn logical_arg(ctx: &dyn CalcContext, args: &[AnyValue], i: usize) -> Result<bool, EvalBreak> {
    let scalar = scalar_arg(ctx, args, i)?;
    to_logical(&scalar)
}

pub fn opt_text_arg(
    ctx: &dyn CalcContext,
    args: &[AnyValue],
    i: usize,
    default: &str,
) -> Result<String, EvalBreak> {
    if i < args.len() {
        text_arg(ctx, args, i)
    } else {
        Ok(default.to_string())
    }
}

pub fn opt_number_arg(
    ctx: &dyn CalcContext,
    args: &[AnyValue],
    i: usize,
    default: f64,
) -> Result<f64, EvalBreak> {
    if i < args.len() {
        number_arg(ctx, args, i)
    } else {
        Ok(default)
    }
}

pub fn opt_logical_arg(
    ctx: &dyn CalcContext,
    args: &[AnyValue],
    i: usize,
    default: bool,
) -> Result<bool, EvalBreak> {
    if i < args.len() {
        logical_arg(ctx, args, i)
    } else {
        Ok(default)
    }
}

/// Text rendition of a scalar: blanks are empty, logicals upper-case,
/// numbers and serial date-times in the locale's general format.
pub fn to_text(ctx: &dyn CalcContext, scalar: &ScalarValue) -> Result<String, EvalBreak> {
    Ok(match scalar {
        ScalarValue::Blank => String::new(),
        ScalarValue::Text(t) => t.clone(),
        ScalarValue::Logical(true) => "TRUE".to_string(),
        ScalarValue::Logical(false) => "FALSE".to_string(),
        ScalarValue::Number(n) => ctx.locale().format_general(*n),
        ScalarValue::DateTime(serial) | ScalarValue::Duration(serial) => {
            ctx.locale().format_general(*serial)
        }
        ScalarValue::Error(e) => return Err(EvalBreak::Error(e.clone())),
    })
}

/// Numeric rendition of a scalar. Text is parsed as a locale number,
/// then as a date or time.
pub fn to_number(ctx: &dyn CalcContext, scalar: &ScalarValue) -> Result<f64, EvalBreak> {
    match scalar {
        ScalarValue::Number(n) => Ok(*n),
        ScalarValue::Logical(b) => Ok(if *b { 1.0 } else { 0.0 }),
        ScalarValue::Blank => Ok(0.0),
        ScalarValue::DateTime(serial) | ScalarValue::Duration(serial) => Ok(*serial),
        ScalarValue::Text(t) => {
            let locale = ctx.locale();
            locale
                .parse_number(t)
                .or_else(|| locale.parse_date_time(t, ctx.current_year()))
                .ok_or_else(|| EvalBreak::Error(CalcError::new(ErrorKind::IncompatibleValue)))
        }
        ScalarValue::Error(e) => Err(EvalBreak::Error(e.clone())),
    }
}

/// Logical rendition of a scalar. Only the literal texts TRUE and
/// FALSE convert; blanks do not.
pub fn to_logical(scalar: &ScalarValue) -> Result<bool, EvalBreak> {
    match scalar {
        ScalarValue::Logical(b) => Ok(*b),
        ScalarValue::Number(n) => Ok(*n != 0.0),
        ScalarValue::DateTime(serial) | ScalarValue::Duration(serial) => Ok(*serial != 0.0),
        ScalarValue::Text(t) if t.eq_ignore_ascii_case("TRUE") => Ok(true),
        ScalarValue::Text(t) if t.eq_ignore_ascii_case("FALSE") => Ok(false),
        ScalarValue::Text(_) | ScalarValue::Blank => {
            Err(EvalBreak::Error(CalcError::new(ErrorKind::IncompatibleValue)))
        }
        ScalarValue::Error(e) => Err(EvalBreak::Error(e.clone())),
    }
}

/// Visits every scalar inside an argument in row-major order.
///
/// Arrays and bounded areas are enumerated in full, blanks included.
/// Whole-column and whole-row areas are clamped to the sheet's used
/// extent first. Multi-area unions are rejected. Cancellation is
/// checked once per visited cell.
pub fn for_each_flattened<F>(
    ctx: &dyn CalcContext,
    value: &AnyValue,
    f: &mut F,
) -> Result<(), EvalBreak>
where
    F: FnMut(ScalarValue) -> Result<(), EvalBreak>,
{
    match value {
        AnyValue::Scalar(s) => f(s.clone()),
        AnyValue::Array(a) => {
            for row in a.rows() {
                for cell in row {
                    ctx.check_cancelled()?;
                    f(cell.clone())?;
                }
            }
            Ok(())
        }
        AnyValue::Reference(r) => {
            let area = r
                .as_single_area()
                .ok_or_else(|| EvalBreak::Error(CalcError::new(ErrorKind::IncompatibleValue)))?;
            let Some((last_row, last_col)) = clamp_to_used(ctx, area) else {
                return Ok(());
            };
            for row in area.first_row..=last_row {
                for col in area.first_col..=last_col {
                    ctx.check_cancelled()?;
                    f(ctx.get_cell_value(&area.sheet, row, col))?;
                }
            }
            Ok(())
        }
    }
}

/// Effective last row/column of an area, with unbounded dimensions
/// clamped to the sheet's used extent. `None` when the clamp leaves
/// nothing to visit.
fn clamp_to_used(ctx: &dyn CalcContext, area: &gridcalc_common::Area) -> Option<(u32, u32)> {
    let mut last_row = area.last_row;
    let mut last_col = area.last_col;
    if area.is_unbounded() {
        let (used_rows, used_cols) = ctx.used_extent(&area.sheet);
        if area.last_row == gridcalc_common::MAX_ROW {
            last_row = last_row.min(used_rows);
        }
        if area.last_col == gridcalc_common::MAX_COL {
            last_col = last_col.min(used_cols);
        }
    }
    (last_row >= area.first_row && last_col >= area.first_col).then_some((last_row, last_col))
}
