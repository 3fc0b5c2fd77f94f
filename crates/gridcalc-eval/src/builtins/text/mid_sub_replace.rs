//! MID, SUBSTITUTE, REPLACE and REPT.

use gridcalc_common::{AnyValue, ErrorKind, CELL_TEXT_LIMIT};

use super::scalar_fn;
use super::util::{from_units, to_units, truncate_index};
use crate::args::{number_arg, text_arg};
use crate::context::{CalcContext, EvalBreak};
use crate::registry::FunctionRegistry;

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(scalar_fn("MID", 3, 3, mid));
    registry.register(scalar_fn("SUBSTITUTE", 3, 4, substitute));
    registry.register(scalar_fn("REPLACE", 4, 4, replace));
    registry.register(scalar_fn("REPT", 2, 2, rept));
}

fn mid(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let text = text_arg(ctx, args, 0)?;
    let start_pos = number_arg(ctx, args, 1)?;
    let num_chars = number_arg(ctx, args, 2)?;
    if start_pos < 1.0 {
        return Err(ErrorKind::IncompatibleValue.into());
    }
    let start = truncate_index(start_pos).ok_or(ErrorKind::IncompatibleValue)? as usize - 1;
    let length = truncate_index(num_chars).ok_or(ErrorKind::IncompatibleValue)? as usize;

    let units = to_units(&text);
    if start >= units.len() {
        return Ok(String::new().into());
    }
    let end = units.len().min(start + length);
    Ok(from_units(&units[start..end]).into())
}

fn substitute(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let text = text_arg(ctx, args, 0)?;
    let old_text = text_arg(ctx, args, 1)?;
    let new_text = text_arg(ctx, args, 2)?;
    let occurrence = if args.len() > 3 {
        let n = number_arg(ctx, args, 3)?;
        if n < 1.0 || n >= 2_147_483_647.0 {
            return Err(ErrorKind::IncompatibleValue.into());
        }
        Some(n.trunc() as usize)
    } else {
        None
    };

    if text.is_empty() || old_text.is_empty() {
        return Ok(text.into());
    }
    let Some(occurrence) = occurrence else {
        return Ok(text.replace(&old_text, &new_text).into());
    };

    // The n-th match is looked up with overlapping steps: each search
    // resumes one unit past the previous hit, not past its end.
    let mut pos: Option<usize> = None;
    for _ in 0..occurrence {
        let from = pos.map_or(0, |p| {
            p + text[p..].chars().next().map_or(1, char::len_utf8)
        });
        match text[from..].find(&old_text) {
            Some(offset) => pos = Some(from + offset),
            None => return Ok(text.into()),
        }
    }

    let pos = pos.expect("occurrence is at least one");
    let mut out = String::with_capacity(text.len() - old_text.len() + new_text.len());
    out.push_str(&text[..pos]);
    out.push_str(&new_text);
    out.push_str(&text[pos + old_text.len()..]);
    Ok(out.into())
}

fn replace(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let old_text = text_arg(ctx, args, 0)?;
    let start_pos = number_arg(ctx, args, 1)?;
    let num_chars = number_arg(ctx, args, 2)?;
    let replacement = text_arg(ctx, args, 3)?;

    let limit = CELL_TEXT_LIMIT as f64;
    if start_pos < 1.0 || start_pos >= limit + 1.0 || num_chars < 0.0 || num_chars >= limit + 1.0 {
        return Err(ErrorKind::IncompatibleValue.into());
    }

    let units = to_units(&old_text);
    let prefix_len = (start_pos.trunc() as usize - 1).min(units.len());
    let deleted_len = (num_chars.trunc() as usize).min(units.len() - prefix_len);

    let mut out_units = Vec::with_capacity(units.len() - deleted_len + replacement.len());
    out_units.extend_from_slice(&units[..prefix_len]);
    out_units.extend(replacement.encode_utf16());
    out_units.extend_from_slice(&units[prefix_len + deleted_len..]);
    Ok(from_units(&out_units).into())
}

fn rept(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let text = text_arg(ctx, args, 0)?;
    let count = number_arg(ctx, args, 1)?;
    let count = truncate_index(count).ok_or(ErrorKind::IncompatibleValue)? as usize;

    if text.is_empty() {
        return Ok(String::new().into());
    }
    let unit_len = text.encode_utf16().count();
    if unit_len * count > CELL_TEXT_LIMIT {
        return Err(ErrorKind::IncompatibleValue.into());
    }
    Ok(text.repeat(count).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_workbook::TestWorkbook;
    use gridcalc_common::ScalarValue;

    fn eval(name: &str, args: &[AnyValue]) -> AnyValue {
        TestWorkbook::new().invoke(name, args).unwrap()
    }

    fn s(v: impl Into<ScalarValue>) -> AnyValue {
        AnyValue::Scalar(v.into())
    }

    #[test]
    fn mid_slices_code_units() {
        assert_eq!(eval("MID", &[s("ABC"), s(2.0), s(2.0)]), s("BC"));
        assert_eq!(eval("MID", &[s("ABC"), s(1.0), s(5.0)]), s("ABC"));
        // The last code unit is reachable on its own.
        assert_eq!(eval("MID", &[s("ABC"), s(3.0), s(1.0)]), s("C"));
        assert_eq!(eval("MID", &[s("ABC"), s(4.0), s(1.0)]), s(""));
        assert_eq!(eval("MID", &[s("ABC"), s(5.0), s(5.0)]), s(""));
        assert_eq!(eval("MID", &[s(""), s(1.0), s(1.0)]), s(""));
        // Splitting a surrogate pair leaves a replacement character.
        assert_eq!(eval("MID", &[s("😊😊"), s(1.0), s(3.0)]), s("😊\u{FFFD}"));
    }

    #[test]
    fn mid_rejects_out_of_range_positions() {
        let err = AnyValue::error(ErrorKind::IncompatibleValue);
        assert_eq!(eval("MID", &[s("ABC"), s(0.0), s(1.0)]), err);
        assert_eq!(eval("MID", &[s("ABC"), s(1.0), s(-1.0)]), err);
        assert_eq!(eval("MID", &[s("ABC"), s(2_147_483_648.0), s(1.0)]), err);
    }

    #[test]
    fn substitute_all_occurrences() {
        assert_eq!(
            eval("SUBSTITUTE", &[s("Sales Data"), s("Sales"), s("Cost")]),
            s("Cost Data")
        );
        assert_eq!(eval("SUBSTITUTE", &[s("abcabc"), s("b"), s("")]), s("acac"));
        assert_eq!(eval("SUBSTITUTE", &[s("abc"), s(""), s("x")]), s("abc"));
        assert_eq!(eval("SUBSTITUTE", &[s(""), s("a"), s("x")]), s(""));
    }

    #[test]
    fn substitute_single_occurrence() {
        assert_eq!(
            eval("SUBSTITUTE", &[s("Q1, Q1, Q1"), s("Q1"), s("Q2"), s(2.0)]),
            s("Q1, Q2, Q1")
        );
        assert_eq!(
            eval("SUBSTITUTE", &[s("abc"), s("b"), s("x"), s(5.0)]),
            s("abc")
        );
        assert_eq!(
            eval("SUBSTITUTE", &[s("abc"), s("b"), s("x"), s(0.0)]),
            AnyValue::error(ErrorKind::IncompatibleValue)
        );
        assert_eq!(
            eval("SUBSTITUTE", &[s("abc"), s("b"), s("x"), s(2_147_483_647.0)]),
            AnyValue::error(ErrorKind::IncompatibleValue)
        );
    }

    #[test]
    fn replace_splices_code_units() {
        assert_eq!(
            eval("REPLACE", &[s("abcdef"), s(2.0), s(3.0), s("XY")]),
            s("aXYef")
        );
        assert_eq!(
            eval("REPLACE", &[s("abc"), s(10.0), s(2.0), s("XY")]),
            s("abcXY")
        );
        assert_eq!(
            eval("REPLACE", &[s("abc"), s(0.0), s(1.0), s("X")]),
            AnyValue::error(ErrorKind::IncompatibleValue)
        );
        assert_eq!(
            eval("REPLACE", &[s("abc"), s(1.0), s(32_768.0), s("X")]),
            AnyValue::error(ErrorKind::IncompatibleValue)
        );
    }

    #[test]
    fn rept_truncates_count() {
        assert_eq!(eval("REPT", &[s("123"), s(2.5)]), s("123123"));
        assert_eq!(eval("REPT", &[s("ab"), s(0.0)]), s(""));
        assert_eq!(eval("REPT", &[s(""), s(1e9)]), s(""));
        assert_eq!(
            eval("REPT", &[s("x"), s(-1.0)]),
            AnyValue::error(ErrorKind::IncompatibleValue)
        );
        assert_eq!(
            eval("REPT", &[s("ab"), s(20_000.0)]),
            AnyValue::error(ErrorKind::IncompatibleValue)
        );
    }
}
