//! FIND and SEARCH.
//!
//! FIND is case-sensitive and literal; SEARCH is case-insensitive and
//! wildcard-aware. Both report 1-based UTF-16 code unit positions.

use gridcalc_common::{AnyValue, ErrorKind};

use super::scalar_fn;
use super::util::{find_units, to_units};
use crate::args::{scalar_arg, text_arg, to_number};
use crate::context::{CalcContext, EvalBreak};
use crate::registry::FunctionRegistry;
use crate::wildcard::Wildcard;

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(scalar_fn("FIND", 2, 3, find));
    registry.register(scalar_fn("SEARCH", 2, 3, search));
}

fn find(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let find_text = text_arg(ctx, args, 0)?;
    let within_text = text_arg(ctx, args, 1)?;
    let start = match start_arg(ctx, args, 2)? {
        Some(n) => n.trunc() - 1.0,
        None => 0.0,
    };

    let needle = to_units(&find_text);
    let haystack = to_units(&within_text);
    if start < 0.0 || start > haystack.len() as f64 {
        return Err(ErrorKind::IncompatibleValue.into());
    }
    let start = start as usize;

    match find_units(&haystack[start..], &needle) {
        Some(index) => Ok(((index + start) as f64 + 1.0).into()),
        None => Err(ErrorKind::IncompatibleValue.into()),
    }
}

fn search(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let find_text = text_arg(ctx, args, 0)?;
    let within_text = text_arg(ctx, args, 1)?;
    let haystack = to_units(&within_text);
    if haystack.is_empty() {
        return Err(ErrorKind::IncompatibleValue.into());
    }

    let start = match start_arg(ctx, args, 2)? {
        Some(n) => n.trunc() - 1.0,
        None => 0.0,
    };
    if start < 0.0 || start >= haystack.len() as f64 {
        return Err(ErrorKind::IncompatibleValue.into());
    }
    let start = start as usize;

    match Wildcard::new(&find_text).search(&haystack[start..]) {
        Some(index) => Ok(((index + start) as f64 + 1.0).into()),
        None => Err(ErrorKind::IncompatibleValue.into()),
    }
}

/// The optional start position; a blank argument counts as absent.
fn start_arg(
    ctx: &dyn CalcContext,
    args: &[AnyValue],
    i: usize,
) -> Result<Option<f64>, EvalBreak> {
    if i >= args.len() {
        return Ok(None);
    }
    let scalar = scalar_arg(ctx, args, i)?;
    if scalar.is_blank() {
        return Ok(None);
    }
    to_number(ctx, &scalar).map(Some)
}
