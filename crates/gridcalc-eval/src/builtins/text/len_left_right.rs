//! LEN, LEFT and RIGHT.
//!
//! LEN reports UTF-16 code units; LEFT and RIGHT take whole code
//! points, so an astral character counts as one there but as two for
//! LEN.

use gridcalc_common::{AnyValue, ErrorKind};

use super::scalar_fn;
use crate::args::{opt_number_arg, text_arg};
use crate::context::{CalcContext, EvalBreak};
use crate::registry::FunctionRegistry;

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(scalar_fn("LEN", 1, 1, len));
    registry.register(scalar_fn("LEFT", 1, 2, left));
    registry.register(scalar_fn("RIGHT", 1, 2, right));
}

fn len(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let text = text_arg(ctx, args, 0)?;
    Ok((text.encode_utf16().count() as f64).into())
}

fn left(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let text = text_arg(ctx, args, 0)?;
    let num_chars = opt_number_arg(ctx, args, 1, 1.0)?;
    if num_chars < 0.0 {
        return Err(ErrorKind::IncompatibleValue.into());
    }
    let take = num_chars.trunc();
    let mut end = 0;
    let mut taken = 0.0;
    for (i, c) in text.char_indices() {
        if taken >= take {
            break;
        }
        end = i + c.len_utf8();
        taken += 1.0;
    }
    Ok(text[..end].to_string().into())
}

fn right(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let text = text_arg(ctx, args, 0)?;
    let num_chars = opt_number_arg(ctx, args, 1, 1.0)?;
    if num_chars < 0.0 {
        return Err(ErrorKind::IncompatibleValue.into());
    }
    let take = num_chars.trunc();
    let total = text.chars().count() as f64;
    if take >= total {
        return Ok(text.into());
    }
    let skip = (total - take) as usize;
    let start = text
        .char_indices()
        .nth(skip)
        .map_or(text.len(), |(i, _)| i);
    Ok(text[start..].to_string().into())
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
    fn len_counts_code_units() {
        assert_eq!(eval("LEN", &[s("abc")]), s(3.0));
        assert_eq!(eval("LEN", &[s("")]), s(0.0));
        // One astral emoji is two code units.
        assert_eq!(eval("LEN", &[s("😊")]), s(2.0));
        // Numbers coerce through their text form.
        assert_eq!(eval("LEN", &[s(12.5)]), s(4.0));
    }

    #[test]
    fn left_takes_code_points() {
        assert_eq!(eval("LEFT", &[s("hello")]), s("h"));
        assert_eq!(eval("LEFT", &[s("hello"), s(3.0)]), s("hel"));
        assert_eq!(eval("LEFT", &[s("hello"), s(99.0)]), s("hello"));
        assert_eq!(eval("LEFT", &[s("hello"), s(0.0)]), s(""));
        assert_eq!(eval("LEFT", &[s("😊😊"), s(1.0)]), s("😊"));
        assert_eq!(
            eval("LEFT", &[s("x"), s(-1.0)]),
            AnyValue::error(ErrorKind::IncompatibleValue)
        );
    }

    #[test]
    fn right_takes_code_points_from_the_end() {
        assert_eq!(eval("RIGHT", &[s("hello")]), s("o"));
        assert_eq!(eval("RIGHT", &[s("hello"), s(3.0)]), s("llo"));
        assert_eq!(eval("RIGHT", &[s("hello"), s(99.0)]), s("hello"));
        assert_eq!(eval("RIGHT", &[s("😊ab"), s(3.0)]), s("😊ab"));
        assert_eq!(
            eval("RIGHT", &[s("x"), s(-1.0)]),
            AnyValue::error(ErrorKind::IncompatibleValue)
        );
    }
}
