//! UPPER, LOWER, PROPER, TRIM, CLEAN, EXACT and ASC.

use gridcalc_common::AnyValue;

use super::scalar_fn;
use crate::args::text_arg;
use crate::context::{CalcContext, EvalBreak};
use crate::registry::FunctionRegistry;

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(scalar_fn("UPPER", 1, 1, upper));
    registry.register(scalar_fn("LOWER", 1, 1, lower));
    registry.register(scalar_fn("PROPER", 1, 1, proper));
    registry.register(scalar_fn("TRIM", 1, 1, trim));
    registry.register(scalar_fn("CLEAN", 1, 1, clean));
    registry.register(scalar_fn("EXACT", 2, 2, exact));
    registry.register(scalar_fn("ASC", 1, 1, asc));
}

fn upper(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let text = text_arg(ctx, args, 0)?;
    Ok(text.to_uppercase().into())
}

fn lower(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let text = text_arg(ctx, args, 0)?;
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        // Word-final capital sigma takes its final form.
        if c == 'Σ' && chars.peek().is_none() {
            out.push('ς');
        } else {
            out.push(lower_char(c));
        }
    }
    Ok(out.into())
}

fn proper(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let text = text_arg(ctx, args, 0)?;
    let mut out = String::with_capacity(text.len());
    let mut prev_was_letter = false;
    for c in text.chars() {
        out.push(if prev_was_letter {
            lower_char(c)
        } else {
            upper_char(c)
        });
        prev_was_letter = c.is_alphabetic();
    }
    Ok(out.into())
}

fn trim(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let text = text_arg(ctx, args, 0)?;
    let trimmed = text.trim_matches(' ');
    let mut out = String::with_capacity(trimmed.len());
    let mut prev_was_space = false;
    for c in trimmed.chars() {
        if c == ' ' && prev_was_space {
            continue;
        }
        prev_was_space = c == ' ';
        out.push(c);
    }
    Ok(out.into())
}

fn clean(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let text = text_arg(ctx, args, 0)?;
    let cleaned: String = text
        .chars()
        .filter(|&c| !matches!(c as u32, 0x00..=0x1F | 0x80..=0x9F))
        .collect();
    Ok(cleaned.into())
}

fn exact(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let lhs = text_arg(ctx, args, 0)?;
    let rhs = text_arg(ctx, args, 1)?;
    Ok((lhs == rhs).into())
}

fn asc(ctx: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
    let text = text_arg(ctx, args, 0)?;
    let converted: String = text.chars().map(to_half_form).collect();
    Ok(converted.into())
}

/// Single-character lowercase mapping; characters with multi-character
/// mappings are left alone.
fn lower_char(c: char) -> char {
    let mut mapped = c.to_lowercase();
    match (mapped.next(), mapped.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

fn upper_char(c: char) -> char {
    let mut mapped = c.to_uppercase();
    match (mapped.next(), mapped.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

/// Full-width to half-width mapping from the Halfwidth and Fullwidth
/// Forms block, per the ODF ASC definition.
fn to_half_form(c: char) -> char {
    let c = c as u32;
    let half = match c {
        0x30A1..=0x30AA if c % 2 == 0 => (c - 0x30A2) / 2 + 0xFF71, // katakana a-o
        0x30A1..=0x30AA => (c - 0x30A1) / 2 + 0xFF67,               // katakana small a-o
        0x30AB..=0x30C2 if c % 2 == 1 => (c - 0x30AB) / 2 + 0xFF76, // katakana ka-chi
        0x30AB..=0x30C2 => (c - 0x30AC) / 2 + 0xFF76,               // katakana ga-dhi
        0x30C3 => 0xFF6F,                                           // katakana small tsu
        0x30C4..=0x30C9 if c % 2 == 0 => (c - 0x30C4) / 2 + 0xFF82, // katakana tsu-to
        0x30C4..=0x30C9 => (c - 0x30C5) / 2 + 0xFF82,               // katakana du-do
        0x30CA..=0x30CE => c - 0x30CA + 0xFF85,                     // katakana na-no
        0x30CF..=0x30DD if c % 3 == 0 => (c - 0x30CF) / 3 + 0xFF8A, // katakana ha-ho
        0x30CF..=0x30DD if c % 3 == 1 => (c - 0x30D0) / 3 + 0xFF8A, // katakana ba-bo
        0x30CF..=0x30DD => (c - 0x30D1) / 3 + 0xFF8A,               // katakana pa-po
        0x30DE..=0x30E2 => c - 0x30DE + 0xFF8F,                     // katakana ma-mo
        0x30E3..=0x30E8 if c % 2 == 0 => (c - 0x30E4) / 2 + 0xFF94, // katakana ya-yo
        0x30E3..=0x30E8 => (c - 0x30E3) / 2 + 0xFF6C,               // katakana small ya-yo
        0x30E9..=0x30ED => c - 0x30E9 + 0xFF97,                     // katakana ra-ro
        0x30EF => 0xFF9C,                                           // katakana wa
        0x30F2 => 0xFF66,                                           // katakana wo
        0x30F3 => 0xFF9D,                                           // katakana n
        0xFF01..=0xFF5E => c - 0xFF01 + 0x0021,                     // fullwidth ASCII
        0x2015 => 0xFF70, // horizontal bar to prolonged sound mark
        0x2018 => 0x0060, // left single quotation mark to grave accent
        0x2019 => 0x0027, // right single quotation mark to apostrophe
        0x201D => 0x0022, // right double quotation mark to quotation mark
        0x3001 => 0xFF64, // ideographic comma
        0x3002 => 0xFF61, // ideographic full stop
        0x300C => 0xFF62, // left corner bracket
        0x300D => 0xFF63, // right corner bracket
        0x309B => 0xFF9E, // voiced sound mark
        0x309C => 0xFF9F, // semi-voiced sound mark
        0x30FB => 0xFF65, // katakana middle dot
        0x30FC => 0xFF70, // prolonged sound mark
        0xFFE5 => 0x005C, // fullwidth yen sign to reverse solidus
        other => other,
    };
    char::from_u32(half).unwrap_or('\u{FFFD}')
}
