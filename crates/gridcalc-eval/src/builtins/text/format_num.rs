//! DOLLAR, FIXED and TEXT.

use gridcalc_common::{AnyValue, ErrorKind, ScalarValue};

use super::scalar_fn;
use crate::args::{opt_logical_arg, opt_number_arg, number_arg, scalar_arg, text_arg, to_number, to_text};
use crate::context::{CalcContext, EvalBreak};
use crate::locale::round_to;
use crate::numfmt;
use crate::registry::FunctionRegistry;

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(scalar_fn("DOLLAR", 1, 2, dollar));
    registry.register(scalar_fn("FIXED", 1, 3, fixed));
    registry.register(scalar_fn("TEXT", 2, 2, text));
}

fn dollar(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let number = number_arg(ctx, args, 0)?;
    let decimals = opt_number_arg(ctx, args, 1, 2.0)?.trunc();
    if decimals > 99.0 {
        return Err(ErrorKind::IncompatibleValue.into());
    }

    let locale = ctx.locale();
    if decimals >= 0.0 {
        return Ok(locale.format_currency(number, decimals as usize).into());
    }

    // Negative decimals round to powers of ten; an exact zero is not
    // scaled back up.
    let factor = 10f64.powf(-decimals);
    let mut rounded = (number / factor).round();
    if rounded != 0.0 {
        rounded *= factor;
    }
    Ok(locale.format_currency(rounded, 0).into())
}

fn fixed(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let number = number_arg(ctx, args, 0)?;
    let decimals = opt_number_arg(ctx, args, 1, 2.0)?.trunc();
    let no_commas = opt_logical_arg(ctx, args, 2, false)?;
    if decimals > 99.0 {
        return Err(ErrorKind::IncompatibleValue.into());
    }

    let rounded = round_to(number, decimals);
    let digits = decimals.max(0.0) as usize;
    Ok(ctx
        .locale()
        .format_fixed(rounded, digits, !no_commas)
        .into())
}

fn text(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let value = scalar_arg(ctx, args, 0)?;
    let format = text_arg(ctx, args, 1)?;

    // Logicals and unconvertible values pass through as their own text.
    let number = match &value {
        ScalarValue::Logical(_) => None,
        other => to_number(ctx, other).ok(),
    };
    let Some(number) = number else {
        return Ok(to_text(ctx, &value)?.into());
    };

    if format.trim().is_empty() {
        return Ok(format.into());
    }

    if numfmt::is_date_time_format(&format)
        && (number < 0.0 || number >= ctx.date_system_upper_limit())
    {
        return Err(ErrorKind::IncompatibleValue.into());
    }

    let rendered = numfmt::format_number(number, &format, ctx.locale())?;
    Ok(rendered.into())
}
