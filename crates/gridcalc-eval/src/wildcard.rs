//! Wildcard pattern used by SEARCH.
//!
//! `*` matches any run of code units, `?` matches exactly one, and `~`
//! escapes the following character (a trailing `~` is dropped).
//! Matching is case-insensitive and operates on UTF-16 code units,
//! which is also the unit of the returned position.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tok {
    Literal(u16),
    AnyRun,
    AnyOne,
}

#[derive(Debug, Clone)]
pub struct Wildcard {
    tokens: Vec<Tok>,
}

impl Wildcard {
    pub fn new(pattern: &str) -> Self {
        let units: Vec<u16> = pattern.encode_utf16().collect();
        let mut tokens = Vec::with_capacity(units.len());
        let mut i = 0;
        while i < units.len() {
            let tok = match units[i] {
                u if u == b'~' as u16 => {
                    i += 1;
                    match units.get(i) {
                        Some(&next) => Tok::Literal(next),
                        None => break,
                    }
                }
                u if u == b'*' as u16 => Tok::AnyRun,
                u if u == b'?' as u16 => Tok::AnyOne,
                u => Tok::Literal(u),
            };
            tokens.push(tok);
            i += 1;
        }
        Self { tokens }
    }

    /// Index of the first code unit where the pattern matches, or
    /// `None`. The match may end before the end of `text`.
    pub fn search(&self, text: &[u16]) -> Option<usize> {
        (0..=text.len()).find(|&start| matches_at(&self.tokens, &text[start..]))
    }
}

fn matches_at(tokens: &[Tok], text: &[u16]) -> bool {
    match tokens.split_first() {
        None => true,
        Some((Tok::AnyRun, rest)) => {
            (0..=text.len()).any(|skip| matches_at(rest, &text[skip..]))
        }
        Some((Tok::AnyOne, rest)) => !text.is_empty() && matches_at(rest, &text[1..]),
        Some((Tok::Literal(p), rest)) => match text.split_first() {
            Some((t, tail)) => units_eq_ci(*p, *t) && matches_at(rest, tail),
            None => false,
        },
    }
}

/// Case-insensitive comparison of two code units. Only single-unit
/// uppercase mappings apply; anything else compares exact.
fn units_eq_ci(a: u16, b: u16) -> bool {
    a == b || fold(a) == fold(b)
}

fn fold(u: u16) -> u16 {
    match char::from_u32(u32::from(u)) {
        Some(c) => {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(single), None) if (single as u32) <= 0xFFFF => single as u16,
                _ => u,
            }
        }
        None => u,
    }
}
