//! Text functions.
//!
//! Position and length semantics deliberately differ per function:
//! LEN, MID, FIND, SEARCH and REPLACE count UTF-16 code units, while
//! LEFT and RIGHT step over whole code points. Splitting a surrogate
//! pair is allowed where code units rule; the severed half becomes
//! U+FFFD on the way back to a string.

mod case_trim;
mod codes;
mod concat_join;
mod format_num;
mod len_left_right;
mod mid_sub_replace;
mod search_find;
mod util;
mod value_parse;

use crate::registry::{AllowRange, FnFlags, FnImpl, FunctionDescriptor, FunctionRegistry};

pub fn register(registry: &mut FunctionRegistry) {
    case_trim::register(registry);
    codes::register(registry);
    concat_join::register(registry);
    format_num::register(registry);
    len_left_right::register(registry);
    mid_sub_replace::register(registry);
    search_find::register(registry);
    value_parse::register(registry);
}

/// Descriptor for the common case of a scalar-only function.
fn scalar_fn(name: &'static str, min_args: usize, max_args: usize, imp: FnImpl) -> FunctionDescriptor {
    FunctionDescriptor {
        name,
        min_args,
        max_args,
        flags: FnFlags::SCALAR,
        allow_range: AllowRange::None,
        imp,
    }
}
