//! Core value, reference, and error types shared across the gridcalc
//! engine. Leaf crate: everything else depends on it, it depends on
//! nothing of ours.

mod error;
mod value;

pub use error::{CalcError, ErrorKind};
pub use value::{
    datetime_to_serial, serial_to_datetime, AnyValue, Area, Array, Reference, ScalarValue,
    CELL_TEXT_LIMIT, MAX_COL, MAX_ROW,
};
