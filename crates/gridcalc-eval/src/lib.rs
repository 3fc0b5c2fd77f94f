//! Scalar function evaluation core: value coercion, implicit
//! intersection, the function registry and the built-in library.

pub mod args;
pub mod codepage;
pub mod context;
pub mod intersect;
pub mod locale;
pub mod numfmt;
pub mod registry;
pub mod wildcard;

pub mod builtins;
pub mod test_workbook;

pub use context::{CalcContext, CellCoord, EvalBreak, Interrupted};
pub use locale::Locale;
pub use registry::{AllowRange, FnFlags, FunctionDescriptor, FunctionRegistry};
