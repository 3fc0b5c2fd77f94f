//! CONCAT, CONCATENATE, TEXTJOIN and T.

use gridcalc_common::{AnyValue, Array, ErrorKind, ScalarValue, CELL_TEXT_LIMIT};

use super::scalar_fn;
use crate::args::{for_each_flattened, logical_arg, text_arg, to_text};
use crate::context::{CalcContext, EvalBreak};
use crate::registry::{AllowRange, FnFlags, FunctionDescriptor, FunctionRegistry};

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(FunctionDescriptor {
        name: "CONCAT",
        min_args: 1,
        max_args: 255,
        flags: FnFlags::RANGE | FnFlags::FUTURE,
        allow_range: AllowRange::All,
        imp: concat,
    });
    registry.register(scalar_fn("CONCATENATE", 1, 255, concatenate));
    registry.register(FunctionDescriptor {
        name: "TEXTJOIN",
        min_args: 3,
        max_args: 255,
        flags: FnFlags::RANGE | FnFlags::FUTURE,
        allow_range: AllowRange::Except(&[0, 1]),
        imp: textjoin,
    });
    registry.register(FunctionDescriptor {
        name: "T",
        min_args: 1,
        max_args: 1,
        flags: FnFlags::RANGE | FnFlags::RETURNS_ARRAY,
        allow_range: AllowRange::All,
        imp: t,
    });
}

/// Appends `piece` while watching the cell text limit in code units.
fn push_limited(out: &mut String, unit_len: &mut usize, piece: &str) -> Result<(), EvalBreak> {
    out.push_str(piece);
    *unit_len += piece.encode_utf16().count();
    if *unit_len > CELL_TEXT_LIMIT {
        return Err(ErrorKind::IncompatibleValue.into());
    }
    Ok(())
}

fn concat(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let mut out = String::new();
    let mut unit_len = 0;
    for arg in args {
        for_each_flattened(ctx, arg, &mut |scalar| {
            let text = to_text(ctx, &scalar)?;
            push_limited(&mut out, &mut unit_len, &text)
        })?;
    }
    Ok(out.into())
}

fn concatenate(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let mut out = String::new();
    let mut unit_len = 0;
    for i in 0..args.len() {
        let text = text_arg(ctx, args, i)?;
        push_limited(&mut out, &mut unit_len, &text)?;
    }
    Ok(out.into())
}

fn textjoin(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let delimiter = text_arg(ctx, args, 0)?;
    let ignore_empty = logical_arg(ctx, args, 1)?;

    let mut out = String::new();
    let mut unit_len = 0;
    let mut first = true;
    for arg in &args[2..] {
        for_each_flattened(ctx, arg, &mut |scalar| {
            let text = to_text(ctx, &scalar)?;
            if ignore_empty && text.is_empty() {
                return Ok(());
            }
            if !first {
                push_limited(&mut out, &mut unit_len, &delimiter)?;
            }
            first = false;
            push_limited(&mut out, &mut unit_len, &text)
        })?;
    }
    Ok(out.into())
}

fn t(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    match &args[0] {
        AnyValue::Scalar(scalar) => Ok(AnyValue::Scalar(t_scalar(scalar)?)),
        AnyValue::Array(array) => {
            let mut rows = Vec::with_capacity(array.height());
            for row in array.rows() {
                let mut out_row = Vec::with_capacity(row.len());
                for cell in row {
                    ctx.check_cancelled()?;
                    // Errors inside an array stay in place.
                    out_row.push(match cell {
                        ScalarValue::Error(_) => cell.clone(),
                        other if other.is_text() => other.clone(),
                        _ => ScalarValue::Text(String::new()),
                    });
                }
                rows.push(out_row);
            }
            Ok(AnyValue::Array(Array::new(rows)))
        }
        AnyValue::Reference(reference) => {
            // First cell of the first area; no implicit intersection.
            let area = &reference.areas()[0];
            let cell = ctx.get_cell_value(&area.sheet, area.first_row, area.first_col);
            Ok(AnyValue::Scalar(t_scalar(&cell)?))
        }
    }
}

fn t_scalar(scalar: &ScalarValue) -> Result<ScalarValue, EvalBreak> {
    match scalar {
        ScalarValue::Error(e) => Err(EvalBreak::Error(e.clone())),
        other if other.is_text() => Ok(other.clone()),
        _ => Ok(ScalarValue::Text(String::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use crate::test_workbook::TestWorkbook;
    use gridcalc_common::{Area, Reference};

    fn s(v: impl Into<ScalarValue>) -> AnyValue {
        AnyValue::Scalar(v.into())
    }

    fn area(r1: u32, c1: u32, r2: u32, c2: u32) -> AnyValue {
        AnyValue::Reference(Reference::single(Area::new("Sheet1", r1, c1, r2, c2)))
    }

    fn joined_workbook() -> TestWorkbook {
        TestWorkbook::new()
            .with_cell(1, 1, "A")
            .with_cell(2, 1, "B")
            .with_cell(1, 2, "")
            .with_cell(2, 2, "D")
    }

    #[test]
    fn concat_joins_scalars_and_ranges() {
        let wb = joined_workbook();
        assert_eq!(
            wb.invoke("CONCAT", &[area(1, 1, 2, 2)]).unwrap(),
            s("ABD")
        );
        assert_eq!(
            wb.invoke("CONCAT", &[s("AB"), s("C")]).unwrap(),
            s("ABC")
        );
    }

    #[test]
    fn concat_formats_values_by_locale() {
        let wb = TestWorkbook::new().with_locale(Locale::cs_cz());
        let args = [s("ABC"), s(123.0), s(true), s(1.25)];
        assert_eq!(wb.invoke("CONCAT", &args).unwrap(), s("ABC123TRUE1,25"));
    }

    #[test]
    fn concat_rejects_union_references() {
        let wb = joined_workbook();
        let union = AnyValue::Reference(Reference::union(vec![
            Area::new("Sheet1", 1, 1, 1, 1),
            Area::new("Sheet1", 2, 1, 2, 1),
        ]));
        assert_eq!(
            wb.invoke("CONCAT", &[union]).unwrap(),
            AnyValue::error(ErrorKind::IncompatibleValue)
        );
    }

    #[test]
    fn concat_length_limit() {
        let wb = TestWorkbook::new();
        let long = "x".repeat(CELL_TEXT_LIMIT);
        assert_eq!(
            wb.invoke("CONCAT", &[s(long.clone())]).unwrap(),
            s(long.clone())
        );
        assert_eq!(
            wb.invoke("CONCAT", &[s(long), s("y")]).unwrap(),
            AnyValue::error(ErrorKind::IncompatibleValue)
        );
    }

    #[test]
    fn concatenate_intersects_implicitly() {
        let wb = TestWorkbook::new()
            .with_cell(1, 1, "a")
            .with_cell(2, 1, "b")
            .with_cell(3, 1, "c");
        // A formula in row 2 sees row 2 of the spanned column.
        assert_eq!(
            wb.invoke_at(2, 3, "CONCATENATE", &[area(1, 1, 3, 1), s("!")])
                .unwrap(),
            s("b!")
        );
        // A formula outside the span has no intersection.
        assert_eq!(
            wb.invoke_at(4, 3, "CONCATENATE", &[area(1, 1, 3, 1)]).unwrap(),
            AnyValue::error(ErrorKind::IncompatibleValue)
        );
    }

    #[test]
    fn textjoin_grid_cases() {
        let wb = joined_workbook();
        let join = |ignore: bool, rest: &[AnyValue]| {
            let mut args = vec![s(","), s(ignore)];
            args.extend_from_slice(rest);
            wb.invoke("TEXTJOIN", &args).unwrap()
        };
        assert_eq!(join(true, &[area(1, 1, 2, 2)]), s("A,B,D"));
        assert_eq!(join(false, &[area(1, 1, 2, 2)]), s("A,,B,D"));
        assert_eq!(join(false, &[s(1.0)]), s("1"));
        assert_eq!(join(true, &[area(1, 4, 2, 5)]), s(""));
        assert_eq!(join(false, &[area(1, 4, 2, 5)]), s(",,,"));
    }

    #[test]
    fn textjoin_clamps_whole_columns() {
        let wb = joined_workbook();
        let whole_a = AnyValue::Reference(Reference::single(Area::columns("Sheet1", 1, 1)));
        let whole_b = AnyValue::Reference(Reference::single(Area::columns("Sheet1", 2, 2)));
        assert_eq!(
            wb.invoke("TEXTJOIN", &[s(","), s(true), whole_a, whole_b])
                .unwrap(),
            s("A,B,D")
        );
    }

    #[test]
    fn textjoin_rejects_non_logical_flag() {
        let wb = joined_workbook();
        assert_eq!(
            wb.invoke("TEXTJOIN", &[s(","), s("Invalid"), area(1, 1, 2, 2)])
                .unwrap(),
            AnyValue::error(ErrorKind::IncompatibleValue)
        );
    }

    #[test]
    fn t_keeps_text_only() {
        let wb = TestWorkbook::new()
            .with_cell(1, 1, "keep")
            .with_cell(2, 1, 42.0);
        assert_eq!(wb.invoke("T", &[s("text")]).unwrap(), s("text"));
        assert_eq!(wb.invoke("T", &[s(19.0)]).unwrap(), s(""));
        assert_eq!(wb.invoke("T", &[s(true)]).unwrap(), s(""));
        assert_eq!(wb.invoke("T", &[area(1, 1, 1, 1)]).unwrap(), s("keep"));
        assert_eq!(wb.invoke("T", &[area(2, 1, 2, 1)]).unwrap(), s(""));
        // Multi-cell references read their first cell without
        // intersecting against the calling cell.
        assert_eq!(wb.invoke_at(9, 9, "T", &[area(1, 1, 2, 1)]).unwrap(), s("keep"));
        assert_eq!(
            wb.invoke("T", &[AnyValue::error(ErrorKind::NoValueAvailable)])
                .unwrap(),
            AnyValue::error(ErrorKind::NoValueAvailable)
        );
    }

    #[test]
    fn t_maps_arrays_elementwise() {
        let wb = TestWorkbook::new();
        let array = Array::new(vec![vec![
            ScalarValue::Text("a".into()),
            ScalarValue::Number(1.0),
        ]]);
        let result = wb.invoke("T", &[AnyValue::Array(array)]).unwrap();
        let expected = Array::new(vec![vec![
            ScalarValue::Text("a".into()),
            ScalarValue::Text(String::new()),
        ]]);
        assert_eq!(result, AnyValue::Array(expected));
    }
}
