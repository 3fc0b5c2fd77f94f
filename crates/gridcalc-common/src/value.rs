use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use smallvec::SmallVec;
use std::fmt::{self, Display};

use crate::CalcError;

/* ───────────────────── date-serial utilities ─────────────────────
The 1900 date system:
  Serial 1  = 1900-01-01
  Serial 59 = 1900-02-28
  Serial 60 = 1900-02-29  (phantom – doesn't exist, but the legacy
                           application thinks it does)
  Serial 61 = 1900-03-01
Base date = 1899-12-31 so that serial 1 = base + 1 day = 1900-01-01.
Time is stored as fractional days (no timezone).
------------------------------------------------------------------- */

/// Base date for the 1900 date system. Serial 1 = base + 1 day = 1900-01-01.
const SERIAL_EPOCH: NaiveDate = NaiveDate::from_ymd_opt(1899, 12, 31).unwrap();

/// First real day after the phantom leap day.
const POST_PHANTOM: NaiveDate = NaiveDate::from_ymd_opt(1900, 3, 1).unwrap();

pub fn datetime_to_serial(dt: &NaiveDateTime) -> f64 {
    let days = (dt.date() - SERIAL_EPOCH).num_days();
    // Dates on or after 1900-03-01 get +1 to account for phantom Feb 29
    let serial_days = if dt.date() >= POST_PHANTOM {
        days + 1
    } else {
        days
    };

    let secs_in_day = dt.time().num_seconds_from_midnight() as f64;
    serial_days as f64 + secs_in_day / 86_400.0
}

pub fn serial_to_datetime(serial: f64) -> NaiveDateTime {
    let days = serial.trunc() as i64;
    let frac_secs = (serial.fract() * 86_400.0).round() as i64;

    // Serial 60 is phantom 1900-02-29; map to 1900-02-28
    let date = if days == 60 {
        NaiveDate::from_ymd_opt(1900, 2, 28).unwrap()
    } else {
        // serial < 60: offset = serial (no phantom day yet)
        // serial > 60: offset = serial - 1 (skip phantom day)
        let offset = if days < 60 { days } else { days - 1 };
        SERIAL_EPOCH + chrono::Duration::days(offset)
    };

    let time =
        NaiveTime::from_num_seconds_from_midnight_opt((frac_secs.rem_euclid(86_400)) as u32, 0)
            .unwrap();
    date.and_time(time)
}

/* ─────────────────────────── sheet bounds ─────────────────────────── */

/// Maximum 1-based row number of a worksheet.
pub const MAX_ROW: u32 = 1_048_576;
/// Maximum 1-based column number of a worksheet.
pub const MAX_COL: u32 = 16_384;

/// Upper bound on the length of a cell's text content, in UTF-16 code
/// units. Shared with the host's cell-content limit.
pub const CELL_TEXT_LIMIT: usize = 32_767;

/* ─────────────────────────── scalar values ────────────────────────── */

/// A single cell's computed value. Exactly one variant is active;
/// `Blank` is distinct from empty text and from zero.
///
/// Date/time and durations are serial-day doubles in the 1900 date
/// system (see the serial utilities above).
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Number(f64),
    Text(String),
    Logical(bool),
    Error(CalcError),
    Blank,
    DateTime(f64),
    Duration(f64),
}

impl ScalarValue {
    pub fn is_blank(&self) -> bool {
        matches!(self, ScalarValue::Blank)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ScalarValue::Text(_))
    }

    /// The serial-number view of the value, when it has one.
    pub fn as_serial_number(&self) -> Option<f64> {
        match self {
            ScalarValue::Number(n) => Some(*n),
            ScalarValue::DateTime(s) => Some(*s),
            ScalarValue::Duration(s) => Some(*s),
            ScalarValue::Logical(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Number(n) => write!(f, "{n}"),
            ScalarValue::Text(s) => write!(f, "{s}"),
            ScalarValue::Logical(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            ScalarValue::Error(e) => write!(f, "{e}"),
            ScalarValue::Blank => Ok(()),
            ScalarValue::DateTime(s) => write!(f, "{s}"),
            ScalarValue::Duration(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for ScalarValue {
    fn from(n: f64) -> Self {
        ScalarValue::Number(n)
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Text(s)
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Text(s.to_string())
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Logical(b)
    }
}

/* ─────────────────────────── 2-D arrays ───────────────────────────── */

/// A dense row-major grid of scalars. Always at least 1×1.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    rows: Vec<Vec<ScalarValue>>,
}

impl Array {
    /// Builds an array from rows. Every row must have the same, nonzero
    /// width; a violation is a programming defect, not a user error.
    pub fn new(rows: Vec<Vec<ScalarValue>>) -> Self {
        assert!(!rows.is_empty(), "array must have at least one row");
        let width = rows[0].len();
        assert!(width > 0, "array must have at least one column");
        assert!(
            rows.iter().all(|r| r.len() == width),
            "array rows must be rectangular"
        );
        Self { rows }
    }

    pub fn single(value: ScalarValue) -> Self {
        Self {
            rows: vec![vec![value]],
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn get(&self, row: usize, col: usize) -> &ScalarValue {
        &self.rows[row][col]
    }

    pub fn top_left(&self) -> &ScalarValue {
        &self.rows[0][0]
    }

    pub fn rows(&self) -> &[Vec<ScalarValue>] {
        &self.rows
    }

    /// Row-major iteration over every element.
    pub fn iter(&self) -> impl Iterator<Item = &ScalarValue> {
        self.rows.iter().flat_map(|r| r.iter())
    }
}

/* ─────────────────────────── references ───────────────────────────── */

/// One rectangular block of cells on a worksheet, 1-based and inclusive.
/// Whole-row/column areas use the `MAX_ROW`/`MAX_COL` bounds and are
/// clamped to the sheet's used extent when enumerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub sheet: String,
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl Area {
    pub fn new(sheet: impl Into<String>, first_row: u32, first_col: u32, last_row: u32, last_col: u32) -> Self {
        debug_assert!(first_row >= 1 && first_col >= 1);
        debug_assert!(first_row <= last_row && first_col <= last_col);
        Self {
            sheet: sheet.into(),
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    pub fn cell(sheet: impl Into<String>, row: u32, col: u32) -> Self {
        Self::new(sheet, row, col, row, col)
    }

    /// A whole column, `first_col..=last_col` over every row.
    pub fn columns(sheet: impl Into<String>, first_col: u32, last_col: u32) -> Self {
        Self::new(sheet, 1, first_col, MAX_ROW, last_col)
    }

    pub fn row_count(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    pub fn col_count(&self) -> u32 {
        self.last_col - self.first_col + 1
    }

    pub fn contains_row(&self, row: u32) -> bool {
        (self.first_row..=self.last_row).contains(&row)
    }

    pub fn contains_col(&self, col: u32) -> bool {
        (self.first_col..=self.last_col).contains(&col)
    }

    /// True for whole-column or whole-row areas, which are clamped to
    /// the used extent before enumeration.
    pub fn is_unbounded(&self) -> bool {
        self.last_row == MAX_ROW || self.last_col == MAX_COL
    }
}

/// An ordered list of areas. Always at least one; more than one area is
/// a union, which most scalar contexts reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    areas: SmallVec<[Area; 1]>,
}

impl Reference {
    pub fn single(area: Area) -> Self {
        Self {
            areas: SmallVec::from_buf([area]),
        }
    }

    pub fn union(areas: Vec<Area>) -> Self {
        assert!(
            !areas.is_empty(),
            "reference must have at least one area"
        );
        Self {
            areas: SmallVec::from_vec(areas),
        }
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// The sole area of a non-union reference.
    pub fn as_single_area(&self) -> Option<&Area> {
        match self.areas.as_slice() {
            [area] => Some(area),
            _ => None,
        }
    }
}

/* ─────────────────────────── any values ───────────────────────────── */

/// A function argument: a scalar, a 2-D array literal, or a worksheet
/// reference resolved lazily through the calculation context.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyValue {
    Scalar(ScalarValue),
    Array(Array),
    Reference(Reference),
}

impl AnyValue {
    pub fn error(kind: crate::ErrorKind) -> Self {
        AnyValue::Scalar(ScalarValue::Error(CalcError::new(kind)))
    }
}

impl From<ScalarValue> for AnyValue {
    fn from(v: ScalarValue) -> Self {
        AnyValue::Scalar(v)
    }
}

impl From<f64> for AnyValue {
    fn from(n: f64) -> Self {
        AnyValue::Scalar(ScalarValue::Number(n))
    }
}

impl From<String> for AnyValue {
    fn from(s: String) -> Self {
        AnyValue::Scalar(ScalarValue::Text(s))
    }
}

impl From<&str> for AnyValue {
    fn from(s: &str) -> Self {
        AnyValue::Scalar(ScalarValue::Text(s.to_string()))
    }
}

impl From<bool> for AnyValue {
    fn from(b: bool) -> Self {
        AnyValue::Scalar(ScalarValue::Logical(b))
    }
}

impl From<CalcError> for AnyValue {
    fn from(e: CalcError) -> Self {
        AnyValue::Scalar(ScalarValue::Error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serials_skip_phantom_leap_day() {
        let d = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(datetime_to_serial(&d), 43_466.0);

        let d = NaiveDate::from_ymd_opt(1900, 2, 28).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(datetime_to_serial(&d), 59.0);
        let d = NaiveDate::from_ymd_opt(1900, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(datetime_to_serial(&d), 61.0);
    }

    #[test]
    fn serial_round_trip() {
        for serial in [1.0, 59.0, 61.0, 40_179.0, 43_466.5] {
            let dt = serial_to_datetime(serial);
            assert_eq!(datetime_to_serial(&dt), serial);
        }
    }

    #[test]
    fn blank_is_not_zero_or_empty_text() {
        assert_ne!(ScalarValue::Blank, ScalarValue::Number(0.0));
        assert_ne!(ScalarValue::Blank, ScalarValue::Text(String::new()));
    }

    #[test]
    fn scalars_lift_into_any_value() {
        assert_eq!(AnyValue::from(1.5), AnyValue::Scalar(ScalarValue::Number(1.5)));
        assert_eq!(AnyValue::from("ab"), AnyValue::Scalar(ScalarValue::Text("ab".into())));
        assert_eq!(
            AnyValue::from(String::from("cd")),
            AnyValue::Scalar(ScalarValue::Text("cd".into()))
        );
        assert_eq!(AnyValue::from(true), AnyValue::Scalar(ScalarValue::Logical(true)));
    }
}
