//! CHAR and CODE, inverse of each other over win-1252.

use gridcalc_common::{AnyValue, ErrorKind};

use super::scalar_fn;
use crate::args::{number_arg, text_arg};
use crate::codepage;
use crate::context::{CalcContext, EvalBreak};
use crate::registry::FunctionRegistry;

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(scalar_fn("CHAR", 1, 1, char_fn));
    registry.register(scalar_fn("CODE", 1, 1, code_fn));
}

fn char_fn(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let number = number_arg(ctx, args, 0)?.trunc();
    if !(1.0..=255.0).contains(&number) {
        return Err(ErrorKind::IncompatibleValue.into());
    }
    let ch = codepage::char_for_code(number as u32).ok_or(ErrorKind::IncompatibleValue)?;
    Ok(ch.to_string().into())
}

fn code_fn(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let text = text_arg(ctx, args, 0)?;
    // The first UTF-16 code unit decides; a lone surrogate is never in
    // the code page and falls back like any other unmapped character.
    let unit = text
        .encode_utf16()
        .next()
        .ok_or(ErrorKind::IncompatibleValue)?;
    let code = char::from_u32(u32::from(unit))
        .and_then(codepage::code_for_char)
        .unwrap_or(u32::from(b'?'));
    Ok(f64::from(code).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_workbook::TestWorkbook;
    use gridcalc_common::ScalarValue;

    fn eval1(name: &str, arg: impl Into<ScalarValue>) -> AnyValue {
        TestWorkbook::new()
            .invoke(name, &[AnyValue::Scalar(arg.into())])
            .unwrap()
    }

    #[test]
    fn char_uses_win_1252() {
        assert_eq!(eval1("CHAR", 65.0), AnyValue::Scalar("A".into()));
        assert_eq!(eval1("CHAR", 128.0), AnyValue::Scalar("€".into()));
        // Fractions truncate.
        assert_eq!(eval1("CHAR", 255.9), AnyValue::Scalar("ÿ".into()));
    }

    #[test]
    fn char_rejects_out_of_range() {
        assert_eq!(eval1("CHAR", 0.0), AnyValue::error(ErrorKind::IncompatibleValue));
        assert_eq!(eval1("CHAR", 256.0), AnyValue::error(ErrorKind::IncompatibleValue));
        assert_eq!(eval1("CHAR", -1.0), AnyValue::error(ErrorKind::IncompatibleValue));
    }

    #[test]
    fn code_inverts_char() {
        assert_eq!(eval1("CODE", "A"), AnyValue::Scalar(65.0.into()));
        assert_eq!(eval1("CODE", "€"), AnyValue::Scalar(128.0.into()));
        assert_eq!(eval1("CODE", "Abc"), AnyValue::Scalar(65.0.into()));
    }

    #[test]
    fn code_falls_back_to_question_mark() {
        assert_eq!(eval1("CODE", "Ω"), AnyValue::Scalar(63.0.into()));
        assert_eq!(eval1("CODE", ""), AnyValue::error(ErrorKind::IncompatibleValue));
    }
}
