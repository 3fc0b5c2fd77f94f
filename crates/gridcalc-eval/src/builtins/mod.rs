//! Built-in worksheet functions.

pub mod text;

use crate::registry::FunctionRegistry;

/// Installs every built-in into `registry`.
pub fn register(registry: &mut FunctionRegistry) {
    text::register(registry);
}
