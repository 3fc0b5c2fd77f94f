//! Code-unit helpers shared by the text functions.

pub fn to_units(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

pub fn from_units(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

/// First code-unit index of `needle` in `haystack`, exact match.
pub fn find_units(haystack: &[u16], needle: &[u16]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).find(|&i| &haystack[i..i + needle.len()] == needle)
}

/// A non-negative argument truncated to an integer, rejected when it
/// does not fit `i32`.
pub fn truncate_index(n: f64) -> Option<i64> {
    let t = n.trunc();
    (t >= 0.0 && t < 2_147_483_648.0).then_some(t as i64)
}
