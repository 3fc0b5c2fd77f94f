//! Windows-1252 conversion table for CHAR and CODE.
//!
//! Codes 0..=0x7F map straight to ASCII. The high half is a fixed
//! 128-entry table since the code page is not representable as a
//! simple offset from Unicode.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// Characters for codes 0x80..=0xFF.
const HIGH_TABLE: [char; 128] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
    '\u{00A0}', '\u{00A1}', '\u{00A2}', '\u{00A3}', '\u{00A4}', '\u{00A5}', '\u{00A6}', '\u{00A7}',
    '\u{00A8}', '\u{00A9}', '\u{00AA}', '\u{00AB}', '\u{00AC}', '\u{00AD}', '\u{00AE}', '\u{00AF}',
    '\u{00B0}', '\u{00B1}', '\u{00B2}', '\u{00B3}', '\u{00B4}', '\u{00B5}', '\u{00B6}', '\u{00B7}',
    '\u{00B8}', '\u{00B9}', '\u{00BA}', '\u{00BB}', '\u{00BC}', '\u{00BD}', '\u{00BE}', '\u{00BF}',
    '\u{00C0}', '\u{00C1}', '\u{00C2}', '\u{00C3}', '\u{00C4}', '\u{00C5}', '\u{00C6}', '\u{00C7}',
    '\u{00C8}', '\u{00C9}', '\u{00CA}', '\u{00CB}', '\u{00CC}', '\u{00CD}', '\u{00CE}', '\u{00CF}',
    '\u{00D0}', '\u{00D1}', '\u{00D2}', '\u{00D3}', '\u{00D4}', '\u{00D5}', '\u{00D6}', '\u{00D7}',
    '\u{00D8}', '\u{00D9}', '\u{00DA}', '\u{00DB}', '\u{00DC}', '\u{00DD}', '\u{00DE}', '\u{00DF}',
    '\u{00E0}', '\u{00E1}', '\u{00E2}', '\u{00E3}', '\u{00E4}', '\u{00E5}', '\u{00E6}', '\u{00E7}',
    '\u{00E8}', '\u{00E9}', '\u{00EA}', '\u{00EB}', '\u{00EC}', '\u{00ED}', '\u{00EE}', '\u{00EF}',
    '\u{00F0}', '\u{00F1}', '\u{00F2}', '\u{00F3}', '\u{00F4}', '\u{00F5}', '\u{00F6}', '\u{00F7}',
    '\u{00F8}', '\u{00F9}', '\u{00FA}', '\u{00FB}', '\u{00FC}', '\u{00FD}', '\u{00FE}', '\u{00FF}',
];

static CHAR_TO_CODE: Lazy<FxHashMap<char, u32>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    for code in 0u32..0x80 {
        map.insert(char::from_u32(code).expect("ascii"), code);
    }
    for (i, &ch) in HIGH_TABLE.iter().enumerate() {
        map.insert(ch, i as u32 + 0x80);
    }
    map
});

/// The character for a win-1252 code in 1..=255.
pub fn char_for_code(code: u32) -> Option<char> {
    match code {
        1..=0x7F => char::from_u32(code),
        0x80..=0xFF => Some(HIGH_TABLE[code as usize - 0x80]),
        _ => None,
    }
}

/// The win-1252 code for a character, if it belongs to the code page.
pub fn code_for_char(ch: char) -> Option<u32> {
    CHAR_TO_CODE.get(&ch).copied()
}
