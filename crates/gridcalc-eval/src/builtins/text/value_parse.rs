//! VALUE and NUMBERVALUE.

use gridcalc_common::{AnyValue, ErrorKind, ScalarValue};

use super::scalar_fn;
use crate::args::{opt_text_arg, scalar_arg, text_arg};
use crate::context::{CalcContext, EvalBreak};
use crate::registry::{AllowRange, FnFlags, FunctionDescriptor, FunctionRegistry};

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(scalar_fn("VALUE", 1, 1, value));
    registry.register(FunctionDescriptor {
        name: "NUMBERVALUE",
        min_args: 1,
        max_args: 3,
        flags: FnFlags::SCALAR | FnFlags::FUTURE,
        allow_range: AllowRange::None,
        imp: numbervalue,
    });
}

fn value(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let scalar = scalar_arg(ctx, args, 0)?;
    let text = match scalar {
        ScalarValue::Blank => return Ok(0.0.into()),
        ScalarValue::Number(n) => return Ok(n.into()),
        ScalarValue::DateTime(serial) | ScalarValue::Duration(serial) => {
            return Ok(serial.into())
        }
        ScalarValue::Text(t) => t,
        // Logicals are neither text nor numbers here.
        ScalarValue::Logical(_) => return Err(ErrorKind::IncompatibleValue.into()),
        ScalarValue::Error(e) => return Err(EvalBreak::Error(e)),
    };

    let locale = ctx.locale();

    // A percent sign anywhere scales the parsed number down.
    let is_percent = text.contains('%');
    let without_percent: String;
    let numeric_text = if is_percent {
        without_percent = text.replace('%', "");
        &without_percent
    } else {
        &text
    };
    if let Some(number) = locale.parse_number_strict(numeric_text) {
        return Ok(if is_percent { number / 100.0 } else { number }.into());
    }

    match locale.parse_date_time(&text, ctx.current_year()) {
        Some(serial) => Ok(serial.into()),
        None => Err(ErrorKind::IncompatibleValue.into()),
    }
}

fn numbervalue(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let locale = ctx.locale();
    let text = text_arg(ctx, args, 0)?;
    let decimal = opt_text_arg(ctx, args, 1, &locale.decimal_sep.to_string())?;
    let group = opt_text_arg(ctx, args, 2, &locale.group_sep.to_string())?;

    let (Some(decimal_sep), Some(group_sep)) = (decimal.chars().next(), group.chars().next())
    else {
        return Err(ErrorKind::IncompatibleValue.into());
    };
    if text.is_empty() {
        return Ok(0.0.into());
    }
    if decimal_sep == group_sep {
        return Err(ErrorKind::IncompatibleValue.into());
    }
    if text.encode_utf16().count() >= 256 {
        return Err(ErrorKind::IncompatibleValue.into());
    }

    // Group separators only vanish before the first decimal separator;
    // later ones survive and poison the parse.
    let mut normalized = String::with_capacity(text.len() + 1);
    let mut decimal_seen = false;
    for c in text.chars() {
        if c == decimal_sep {
            normalized.push(if decimal_seen { c } else { '.' });
            decimal_seen = true;
        } else if c == group_sep && !decimal_seen {
            // skip
        } else if !c.is_whitespace() {
            normalized.push(c);
        }
    }
    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }

    let mut percent_count = 0;
    while normalized.ends_with('%') {
        normalized.pop();
        percent_count += 1;
    }

    let mut number = parse_invariant(&normalized).ok_or(ErrorKind::IncompatibleValue)?;
    if number.is_infinite() {
        return Err(ErrorKind::NumberInvalid.into());
    }
    for _ in 0..percent_count {
        number /= 100.0;
    }

    if number <= -1e308 || number >= 1e308 {
        return Err(ErrorKind::IncompatibleValue.into());
    }
    if number != 0.0 && (-1e-309..=1e-309).contains(&number) {
        return Err(ErrorKind::IncompatibleValue.into());
    }
    if (-1e-308..=1e-308).contains(&number) {
        number = 0.0;
    }
    Ok(number.into())
}

/// Invariant float parse with parentheses for negatives and no digit
/// grouping.
fn parse_invariant(text: &str) -> Option<f64> {
    let (negative, body) = match text.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, text),
    };
    if body.is_empty()
        || !body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    let number: f64 = body.parse().ok()?;
    Some(if negative { -number } else { number })
}
