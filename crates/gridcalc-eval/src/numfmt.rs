//! Rendering of numbers through format strings for TEXT.
//!
//! Covers the placeholder subset actually exercised by formulas:
//! digit placeholders with grouping, percent scaling, literal affixes,
//! and the date/time token alphabet. Section separators, color codes
//! and elapsed-time brackets are out of scope.

use gridcalc_common::{serial_to_datetime, CalcError, ErrorKind};

use crate::locale::{round_to, Locale};

use chrono::{Datelike, Timelike};

/// Whether a format renders its number as a date or time, which also
/// restricts the acceptable serial range.
pub fn is_date_time_format(format: &str) -> bool {
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '\\' => {
                chars.next();
            }
            'y' | 'Y' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' | 'm' | 'M' => return true,
            _ => {}
        }
    }
    false
}

/// Renders `n` through `format`.
pub fn format_number(n: f64, format: &str, locale: &Locale) -> Result<String, CalcError> {
    if is_date_time_format(format) {
        format_date_time(n, format, locale)
    } else {
        Ok(format_numeric(n, format, locale))
    }
}

/* ───────────────────────── numeric formats ───────────────────────── */

#[derive(Default)]
struct NumericPattern {
    prefix: String,
    suffix: String,
    min_int_digits: usize,
    min_decimals: usize,
    max_decimals: usize,
    grouping: bool,
    percent: bool,
    has_placeholders: bool,
}

fn parse_numeric(format: &str) -> NumericPattern {
    let mut pat = NumericPattern::default();
    let mut in_decimals = false;
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        match c {
            '0' | '#' | '?' => {
                pat.has_placeholders = true;
                if in_decimals {
                    pat.max_decimals += 1;
                    if c == '0' {
                        pat.min_decimals = pat.max_decimals;
                    }
                } else if c == '0' {
                    pat.min_int_digits += 1;
                }
            }
            '.' if !in_decimals => in_decimals = true,
            ',' if pat.has_placeholders && !in_decimals => pat.grouping = true,
            '%' => {
                pat.percent = true;
                pat.suffix.push('%');
            }
            '"' => {
                let literal: String = chars.by_ref().take_while(|&q| q != '"').collect();
                pat.affix(&literal);
            }
            '\\' => {
                if let Some(escaped) = chars.next() {
                    pat.affix(&escaped.to_string());
                }
            }
            other => pat.affix(&other.to_string()),
        }
    }
    pat
}

impl NumericPattern {
    fn affix(&mut self, text: &str) {
        if self.has_placeholders {
            self.suffix.push_str(text);
        } else {
            self.prefix.push_str(text);
        }
    }
}

fn format_numeric(n: f64, format: &str, locale: &Locale) -> String {
    let pat = parse_numeric(format);
    if !pat.has_placeholders {
        return format!("{}{}", pat.prefix, pat.suffix);
    }

    let scaled = if pat.percent { n * 100.0 } else { n };
    let rounded = round_to(scaled, pat.max_decimals as f64);
    let plain = format!("{:.*}", pat.max_decimals, rounded.abs());
    let (int_digits, frac_digits) = match plain.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (plain, String::new()),
    };

    let mut int_digits = int_digits;
    while int_digits.len() < pat.min_int_digits {
        int_digits.insert(0, '0');
    }
    let mut frac_digits = frac_digits;
    while frac_digits.len() > pat.min_decimals && frac_digits.ends_with('0') {
        frac_digits.pop();
    }

    let mut out = String::new();
    if rounded < 0.0 {
        out.push('-');
    }
    out.push_str(&pat.prefix);
    if pat.grouping {
        let len = int_digits.len();
        for (i, ch) in int_digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(locale.group_sep);
            }
            out.push(ch);
        }
    } else {
        out.push_str(&int_digits);
    }
    if !frac_digits.is_empty() {
        out.push(locale.decimal_sep);
        out.push_str(&frac_digits);
    }
    out.push_str(&pat.suffix);
    out
}

/* ──────────────────────── date/time formats ──────────────────────── */

fn format_date_time(serial: f64, format: &str, locale: &Locale) -> Result<String, CalcError> {
    // Sub-second noise rounds to the displayed second.
    let serial = (serial * 86_400.0).round() / 86_400.0;
    let dt = serial_to_datetime(serial);
    let twelve_hour = has_am_pm(format);

    let mut out = String::new();
    let mut after_hour = false;
    let chars: Vec<char> = format.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        match c {
            '"' => {
                i += 1;
                while i < chars.len() && chars[i] != '"' {
                    out.push(chars[i]);
                    i += 1;
                }
                i += 1;
                continue;
            }
            '\\' => {
                if let Some(&escaped) = chars.get(i + 1) {
                    out.push(escaped);
                }
                i += 2;
                continue;
            }
            'y' | 'Y' => {
                let year = dt.year();
                if run <= 2 {
                    out.push_str(&format!("{:02}", year.rem_euclid(100)));
                } else {
                    out.push_str(&format!("{year:04}"));
                }
            }
            'm' | 'M' => {
                if after_hour || followed_by_seconds(&chars[i + run..]) {
                    push_padded(&mut out, dt.minute(), run.min(2));
                    after_hour = false;
                } else {
                    let month = dt.month();
                    match run {
                        1 | 2 => push_padded(&mut out, month, run),
                        3 => out.push_str(locale.month_abbrs[month as usize - 1]),
                        _ => out.push_str(locale.month_names[month as usize - 1]),
                    }
                }
            }
            'd' | 'D' => push_padded(&mut out, dt.day(), run.min(2)),
            'h' | 'H' => {
                let hour = if twelve_hour {
                    match dt.hour() % 12 {
                        0 => 12,
                        h => h,
                    }
                } else {
                    dt.hour()
                };
                push_padded(&mut out, hour, run.min(2));
                after_hour = true;
            }
            's' | 'S' => {
                push_padded(&mut out, dt.second(), run.min(2));
                after_hour = false;
            }
            'A' | 'a' => {
                let Some(len) = am_pm_token_len(&chars[i..]) else {
                    return Err(CalcError::new(ErrorKind::IncompatibleValue));
                };
                out.push_str(if dt.hour() < 12 {
                    locale.am_designator
                } else {
                    locale.pm_designator
                });
                i += len;
                continue;
            }
            other => {
                for _ in 0..run {
                    out.push(other);
                }
            }
        }
        i += run;
    }
    Ok(out)
}

fn push_padded(out: &mut String, value: u32, width: usize) {
    if width >= 2 {
        out.push_str(&format!("{value:02}"));
    } else {
        out.push_str(&value.to_string());
    }
}

/// Minutes also bind forward: `mm` immediately before `ss` is minutes
/// even without a preceding hour token.
fn followed_by_seconds(rest: &[char]) -> bool {
    rest.iter()
        .find(|c| c.is_ascii_alphabetic())
        .is_some_and(|&c| matches!(c, 's' | 'S'))
}

fn has_am_pm(format: &str) -> bool {
    let upper = format.to_ascii_uppercase();
    upper.contains("AM/PM") || upper.contains("A/P")
}

fn am_pm_token_len(rest: &[char]) -> Option<usize> {
    let text: String = rest.iter().take(5).collect();
    let upper = text.to_ascii_uppercase();
    if upper.starts_with("AM/PM") {
        Some(5)
    } else if upper.starts_with("A/P") {
        Some(3)
    } else {
        None
    }
}
