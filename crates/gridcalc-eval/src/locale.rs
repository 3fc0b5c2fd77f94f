//! Locale data for the engine.
//!
//! All locale-sensitive behavior (separators, currency placement,
//! date/time pattern sets, number parsing) flows through a `Locale`
//! handed in via the calculation context, never through process-wide
//! state. The shipped locales are the ones the reference behavior is
//! pinned against; `invariant()` is the en-US-compatible default.

use chrono::NaiveDate;
use gridcalc_common::datetime_to_serial;

/// Whether the currency symbol precedes or follows the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyPosition {
    Prefix,
    SuffixSpaced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub name: &'static str,
    pub decimal_sep: char,
    pub group_sep: char,
    pub currency_symbol: &'static str,
    pub currency_position: CurrencyPosition,
    /// Patterns tried by VALUE before giving up, most specific first.
    /// Token language: `y`/`yy` two-digit year, `yyyy` four-digit,
    /// `M`/`MM` numeric month, `MMM`/`MMMM` month name, `d`/`dd` day,
    /// `H` 24-hour, `h` 12-hour, `m` minute, `s` second, `tt` AM/PM.
    pub date_patterns: &'static [&'static str],
    pub month_names: [&'static str; 12],
    pub month_abbrs: [&'static str; 12],
    pub am_designator: &'static str,
    pub pm_designator: &'static str,
}

/// Fixed fallback patterns shared by every locale (legacy number
/// formats 14–21).
const COMMON_DATE_PATTERNS: &[&str] = &[
    "M-d-yy",
    "d-MMMM-yy",
    "d-MMMM",
    "d-MMM-yyyy",
    "H:mm",
    "H:mm:ss",
];

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const EN_MONTH_ABBRS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const CS_MONTHS: [&str; 12] = [
    "leden",
    "únor",
    "březen",
    "duben",
    "květen",
    "červen",
    "červenec",
    "srpen",
    "září",
    "říjen",
    "listopad",
    "prosinec",
];

const CS_MONTH_ABBRS: [&str; 12] = [
    "led", "úno", "bře", "dub", "kvě", "čvn", "čvc", "srp", "zář", "říj", "lis", "pro",
];

const DE_MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

const DE_MONTH_ABBRS: [&str; 12] = [
    "Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez",
];

impl Locale {
    pub const fn en_us() -> Self {
        Self {
            name: "en-US",
            decimal_sep: '.',
            group_sep: ',',
            currency_symbol: "$",
            currency_position: CurrencyPosition::Prefix,
            date_patterns: &["M/d/yyyy", "MMMM yyyy", "h:mm tt", "h:mm:ss tt"],
            month_names: EN_MONTHS,
            month_abbrs: EN_MONTH_ABBRS,
            am_designator: "AM",
            pm_designator: "PM",
        }
    }

    /// The deterministic default used when no culture is configured.
    pub const fn invariant() -> Self {
        Self::en_us()
    }

    pub const fn cs_cz() -> Self {
        Self {
            name: "cs-CZ",
            decimal_sep: ',',
            group_sep: '\u{a0}',
            currency_symbol: "Kč",
            currency_position: CurrencyPosition::SuffixSpaced,
            date_patterns: &["d.M.yyyy", "MMMM yyyy", "H:mm", "H:mm:ss"],
            month_names: CS_MONTHS,
            month_abbrs: CS_MONTH_ABBRS,
            am_designator: "dop.",
            pm_designator: "odp.",
        }
    }

    pub const fn de_de() -> Self {
        Self {
            name: "de-DE",
            decimal_sep: ',',
            group_sep: '.',
            currency_symbol: "€",
            currency_position: CurrencyPosition::SuffixSpaced,
            date_patterns: &["d.M.yyyy", "MMMM yyyy", "HH:mm", "HH:mm:ss"],
            month_names: DE_MONTHS,
            month_abbrs: DE_MONTH_ABBRS,
            am_designator: "AM",
            pm_designator: "PM",
        }
    }

    /* ─────────────────────── number formatting ─────────────────────── */

    /// General (unformatted) rendition of a number: shortest round-trip
    /// representation with the locale decimal separator.
    pub fn format_general(&self, n: f64) -> String {
        let s = n.to_string();
        if self.decimal_sep == '.' {
            s
        } else {
            s.replace('.', &self.decimal_sep.to_string())
        }
    }

    /// Fixed-decimal rendition with optional digit grouping. Rounds
    /// half-away-from-zero.
    pub fn format_fixed(&self, n: f64, decimals: usize, grouping: bool) -> String {
        let rounded = round_to(n, decimals as f64);
        let plain = format!("{rounded:.decimals$}");
        let (int_part, frac_part) = match plain.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (plain.as_str(), None),
        };
        let (sign, digits) = match int_part.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", int_part),
        };

        let mut out = String::with_capacity(plain.len() + 4);
        out.push_str(sign);
        if grouping {
            push_grouped(&mut out, digits, self.group_sep);
        } else {
            out.push_str(digits);
        }
        if let Some(frac) = frac_part {
            out.push(self.decimal_sep);
            out.push_str(frac);
        }
        out
    }

    /// Currency rendition per the locale's symbol placement.
    pub fn format_currency(&self, n: f64, decimals: usize) -> String {
        let sign = if n.is_sign_negative() && round_to(n, decimals as f64) != 0.0 {
            "-"
        } else {
            ""
        };
        let magnitude = self.format_fixed(n.abs(), decimals, true);
        match self.currency_position {
            CurrencyPosition::Prefix => format!("{sign}{}{magnitude}", self.currency_symbol),
            CurrencyPosition::SuffixSpaced => {
                format!("{sign}{magnitude} {}", self.currency_symbol)
            }
        }
    }

    /* ─────────────────────── number parsing ────────────────────────── */

    /// Lenient locale-aware number parse: optional surrounding
    /// whitespace, sign, parentheses for negatives, currency symbol at
    /// either end, group separators, and simple fractions (`2 1/2`).
    pub fn parse_number(&self, text: &str) -> Option<f64> {
        self.parse_number_inner(text, true)
    }

    /// As [`parse_number`](Self::parse_number) but without the
    /// fraction form, matching plain numeric-style parsing.
    pub fn parse_number_strict(&self, text: &str) -> Option<f64> {
        self.parse_number_inner(text, false)
    }

    fn parse_number_inner(&self, text: &str, allow_fraction: bool) -> Option<f64> {
        let mut s = text.trim();
        let mut negative = false;

        if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
            negative = true;
            s = inner.trim();
        }
        if let Some(rest) = s.strip_prefix(self.currency_symbol) {
            s = rest.trim_start();
        } else if let Some(rest) = s.strip_suffix(self.currency_symbol) {
            s = rest.trim_end();
        }
        if let Some(rest) = s.strip_prefix('-') {
            negative = !negative;
            s = rest.trim_start();
        } else if let Some(rest) = s.strip_prefix('+') {
            s = rest.trim_start();
        }
        if s.is_empty() {
            return None;
        }

        let magnitude = if allow_fraction {
            self.parse_fraction(s).or_else(|| self.parse_plain(s))?
        } else {
            self.parse_plain(s)?
        };
        Some(if negative { -magnitude } else { magnitude })
    }

    fn parse_plain(&self, s: &str) -> Option<f64> {
        // A breaking-space group separator also accepts plain spaces.
        let is_group = |c: char| {
            c == self.group_sep || (self.group_sep == '\u{a0}' && c == ' ')
        };
        let cleaned: String = s
            .chars()
            .filter(|&c| !is_group(c))
            .map(|c| if c == self.decimal_sep { '.' } else { c })
            .collect();
        if cleaned.is_empty()
            || !cleaned
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        {
            return None;
        }
        cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// `a b/c` or `b/c` with nonzero denominator.
    fn parse_fraction(&self, s: &str) -> Option<f64> {
        let (num, den) = s.rsplit_once('/')?;
        let den: f64 = den.trim().parse().ok()?;
        if den == 0.0 {
            return None;
        }
        let (whole, numerator) = match num.trim().rsplit_once(char::is_whitespace) {
            Some((w, n)) => (w.trim().parse::<f64>().ok()?, n.parse::<f64>().ok()?),
            None => (0.0, num.trim().parse::<f64>().ok()?),
        };
        Some(whole + numerator / den)
    }

    /* ─────────────────────── date/time parsing ─────────────────────── */

    /// Tries the locale's date/time patterns and the fixed legacy
    /// fallbacks, returning the serial number of the first hit.
    /// `default_year` fills in for patterns without a year token.
    pub fn parse_date_time(&self, text: &str, default_year: i32) -> Option<f64> {
        for pattern in self
            .date_patterns
            .iter()
            .chain(COMMON_DATE_PATTERNS.iter())
        {
            if let Some(serial) = self.parse_with_pattern(text, pattern, default_year) {
                return Some(serial);
            }
        }
        None
    }

    fn parse_with_pattern(&self, text: &str, pattern: &str, default_year: i32) -> Option<f64> {
        let mut parsed = ParsedDateTime::default();
        let mut input = text.trim();

        let mut tokens = pattern.chars().peekable();
        while let Some(&tok) = tokens.peek() {
            let run = take_run(&mut tokens, tok);
            input = input.trim_start();
            match tok {
                'y' => {
                    let (digits, rest) = take_digits(input, 4)?;
                    let raw: i32 = digits.parse().ok()?;
                    parsed.year = Some(if digits.len() <= 2 {
                        if raw < 30 { 2000 + raw } else { 1900 + raw }
                    } else {
                        raw
                    });
                    input = rest;
                }
                'M' => {
                    if run >= 3 {
                        let (month, rest) = self.match_month_name(input, run == 3)?;
                        parsed.month = Some(month);
                        input = rest;
                    } else {
                        let (digits, rest) = take_digits(input, 2)?;
                        parsed.month = Some(digits.parse().ok()?);
                        input = rest;
                    }
                }
                'd' => {
                    let (digits, rest) = take_digits(input, 2)?;
                    parsed.day = Some(digits.parse().ok()?);
                    input = rest;
                }
                'H' | 'h' => {
                    let (digits, rest) = take_digits(input, 2)?;
                    parsed.hour = Some(digits.parse().ok()?);
                    parsed.twelve_hour = tok == 'h';
                    input = rest;
                }
                'm' => {
                    let (digits, rest) = take_digits(input, 2)?;
                    parsed.minute = Some(digits.parse().ok()?);
                    input = rest;
                }
                's' => {
                    let (digits, rest) = take_digits(input, 2)?;
                    parsed.second = Some(digits.parse().ok()?);
                    input = rest;
                }
                't' => {
                    if let Some(rest) = strip_prefix_ci(input, self.pm_designator) {
                        parsed.pm = true;
                        input = rest;
                    } else if let Some(rest) = strip_prefix_ci(input, self.am_designator) {
                        input = rest;
                    } else {
                        return None;
                    }
                }
                // The leading trim already consumed whitespace separators.
                sep if sep.is_whitespace() => {}
                sep => {
                    input = input.strip_prefix(sep)?;
                }
            }
        }

        if !input.trim().is_empty() {
            return None;
        }
        parsed.into_serial(default_year)
    }

    fn match_month_name<'a>(&self, input: &'a str, abbreviated: bool) -> Option<(u32, &'a str)> {
        let names = if abbreviated {
            &self.month_abbrs
        } else {
            &self.month_names
        };
        for (idx, name) in names.iter().enumerate() {
            if let Some(rest) = strip_prefix_ci(input, name) {
                return Some((idx as u32 + 1, rest));
            }
        }
        None
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::invariant()
    }
}

#[derive(Default)]
struct ParsedDateTime {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    twelve_hour: bool,
    pm: bool,
}

impl ParsedDateTime {
    fn into_serial(self, default_year: i32) -> Option<f64> {
        let mut hour = self.hour.unwrap_or(0);
        if self.twelve_hour {
            if hour == 0 || hour > 12 {
                return None;
            }
            hour = (hour % 12) + if self.pm { 12 } else { 0 };
        }
        let (minute, second) = (self.minute.unwrap_or(0), self.second.unwrap_or(0));
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        let time_fraction = f64::from(hour * 3600 + minute * 60 + second) / 86_400.0;

        let has_date = self.year.is_some() || self.month.is_some() || self.day.is_some();
        if !has_date {
            // Time-only input: a day fraction with no date component.
            return Some(time_fraction);
        }

        let date = NaiveDate::from_ymd_opt(
            self.year.unwrap_or(default_year),
            self.month.unwrap_or(1),
            self.day.unwrap_or(1),
        )?;
        let day_serial =
            datetime_to_serial(&date.and_hms_opt(0, 0, 0).expect("midnight is valid"));
        Some(day_serial + time_fraction)
    }
}

/// Rounds half-away-from-zero to `digits` decimal places; `digits` may
/// be negative (rounding to powers of ten) or extreme (collapsing to 0).
pub fn round_to(n: f64, digits: f64) -> f64 {
    let factor = 10f64.powf(digits);
    if factor == 0.0 || !factor.is_finite() {
        return 0.0;
    }
    (n * factor).round() / factor
}

fn push_grouped(out: &mut String, digits: &str, sep: char) {
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
}

fn take_run(tokens: &mut std::iter::Peekable<std::str::Chars<'_>>, tok: char) -> usize {
    let mut n = 0;
    while tokens.peek() == Some(&tok) {
        tokens.next();
        n += 1;
    }
    n
}

/// Up to `max` ASCII digits from the front of `input`.
fn take_digits(input: &str, max: usize) -> Option<(&str, &str)> {
    let end = input
        .char_indices()
        .take(max)
        .take_while(|(_, c)| c.is_ascii_digit())
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    Some(input.split_at(end))
}

// Char-wise rather than a sliced byte comparison: `prefix.len()` bytes
// into `input` may land inside a multibyte character.
fn strip_prefix_ci<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let mut rest = input;
    for pc in prefix.chars() {
        let ic = rest.chars().next()?;
        if ic.to_lowercase().ne(pc.to_lowercase()) {
            return None;
        }
        rest = &rest[ic.len_utf8()..];
    }
    Some(rest)
}
