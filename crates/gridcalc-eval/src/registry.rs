//! Function registry and dispatch.
//!
//! The registry maps case-insensitive function names to descriptors.
//! Dispatch performs the uniform pre-call work: arity checking,
//! collapsing references for parameters that do not accept them, and
//! propagating error arguments. Function bodies then only deal with
//! the shapes they declared.

use gridcalc_common::{AnyValue, CalcError, ErrorKind, ScalarValue};
use rustc_hash::FxHashMap;

use crate::context::{CalcContext, EvalBreak, Interrupted};
use crate::intersect::implicit_intersection;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FnFlags: u8 {
        /// Takes and returns scalars.
        const SCALAR = 0x1;
        /// Accepts range (reference) arguments.
        const RANGE = 0x2;
        /// May return an array.
        const RETURNS_ARRAY = 0x4;
        /// Post-2007 function, also reachable under the `_xlfn.` prefix.
        const FUTURE = 0x8;
    }
}

/// Which parameter positions may receive an un-collapsed reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowRange {
    None,
    All,
    Except(&'static [usize]),
}

impl AllowRange {
    fn allows(&self, index: usize) -> bool {
        match self {
            AllowRange::None => false,
            AllowRange::All => true,
            AllowRange::Except(indexes) => !indexes.contains(&index),
        }
    }
}

pub type FnImpl = fn(&dyn CalcContext, &[AnyValue]) -> Result<AnyValue, EvalBreak>;

pub struct FunctionDescriptor {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub flags: FnFlags,
    pub allow_range: AllowRange,
    pub imp: FnImpl,
}

#[derive(Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, FunctionDescriptor>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in function library installed.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register(&mut registry);
        registry
    }

    pub fn register(&mut self, descriptor: FunctionDescriptor) {
        debug_assert!(descriptor.min_args <= descriptor.max_args);
        self.functions
            .insert(descriptor.name.to_ascii_uppercase(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(&normalize_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Calls a function. Evaluation errors come back as error values;
    /// only cancellation aborts the calculation.
    pub fn invoke(
        &self,
        ctx: &dyn CalcContext,
        name: &str,
        args: &[AnyValue],
    ) -> Result<AnyValue, Interrupted> {
        if ctx.cancellation_requested() {
            return Err(Interrupted);
        }
        let Some(descriptor) = self.get(name) else {
            return Ok(AnyValue::error(ErrorKind::NameNotRecognized));
        };
        if args.len() < descriptor.min_args || args.len() > descriptor.max_args {
            return Ok(AnyValue::error(ErrorKind::IncompatibleValue));
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(function = descriptor.name, arg_count = args.len(), "dispatch");

        let collapsed = match collapse_disallowed_references(ctx, descriptor, args) {
            Ok(collapsed) => collapsed,
            Err(e) => return Ok(AnyValue::Scalar(ScalarValue::Error(e))),
        };
        let args = collapsed.as_deref().unwrap_or(args);

        // Top-level error arguments win before the function runs.
        for arg in args {
            if let AnyValue::Scalar(ScalarValue::Error(e)) = arg {
                return Ok(AnyValue::Scalar(ScalarValue::Error(e.clone())));
            }
        }

        match (descriptor.imp)(ctx, args) {
            Ok(value) => Ok(value),
            Err(EvalBreak::Error(e)) => Ok(AnyValue::Scalar(ScalarValue::Error(e))),
            Err(EvalBreak::Cancelled) => Err(Interrupted),
        }
    }
}

/// Applies implicit intersection to reference arguments in positions
/// that do not accept ranges. Returns `None` when nothing changed.
fn collapse_disallowed_references(
    ctx: &dyn CalcContext,
    descriptor: &FunctionDescriptor,
    args: &[AnyValue],
) -> Result<Option<Vec<AnyValue>>, CalcError> {
    if args.iter().enumerate().all(|(i, arg)| {
        !matches!(arg, AnyValue::Reference(_)) || descriptor.allow_range.allows(i)
    }) {
        return Ok(None);
    }
    let collapsed = args
        .iter()
        .enumerate()
        .map(|(i, arg)| match arg {
            AnyValue::Reference(r) if !descriptor.allow_range.allows(i) => {
                implicit_intersection(ctx, r).map(AnyValue::Scalar)
            }
            other => Ok(other.clone()),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(collapsed))
}

fn normalize_name(name: &str) -> String {
    let upper = name.to_ascii_uppercase();
    match upper.strip_prefix("_XLFN.") {
        Some(stripped) => stripped.to_string(),
        None => upper,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_workbook::TestWorkbook;

    fn echo(_: &dyn CalcContext, args: &[AnyValue]) -> Result<AnyValue, EvalBreak> {
        Ok(args[0].clone())
    }

    fn registry_with_echo() -> FunctionRegistry {
        let mut registry = FunctionRegistry::new();
        registry.register(FunctionDescriptor {
            name: "ECHO",
            min_args: 1,
            max_args: 2,
            flags: FnFlags::SCALAR | FnFlags::FUTURE,
            allow_range: AllowRange::None,
            imp: echo,
        });
        registry
    }

    #[test]
    fn lookup_is_case_insensitive_and_strips_future_prefix() {
        let registry = registry_with_echo();
        assert!(registry.contains("echo"));
        assert!(registry.contains("_xlfn.Echo"));
        assert!(!registry.contains("NOPE"));
    }

    #[test]
    fn unknown_function_is_name_error() {
        let registry = registry_with_echo();
        let wb = TestWorkbook::new();
        let result = registry
            .invoke(&wb.context(), "MISSING", &[AnyValue::Scalar(1.0.into())])
            .unwrap();
        assert_eq!(result, AnyValue::error(ErrorKind::NameNotRecognized));
    }

    #[test]
    fn arity_is_enforced() {
        let registry = registry_with_echo();
        let wb = TestWorkbook::new();
        let result = registry.invoke(&wb.context(), "ECHO", &[]).unwrap();
        assert_eq!(result, AnyValue::error(ErrorKind::IncompatibleValue));
    }

    #[test]
    fn error_arguments_short_circuit() {
        let registry = registry_with_echo();
        let wb = TestWorkbook::new();
        let args = [
            AnyValue::Scalar(1.0.into()),
            AnyValue::error(ErrorKind::NoValueAvailable),
        ];
        let result = registry.invoke(&wb.context(), "ECHO", &args).unwrap();
        assert_eq!(result, AnyValue::error(ErrorKind::NoValueAvailable));
    }

    #[test]
    fn cancellation_aborts_dispatch() {
        let registry = registry_with_echo();
        let wb = TestWorkbook::new();
        wb.cancel();
        let result = registry.invoke(&wb.context(), "ECHO", &[AnyValue::Scalar(1.0.into())]);
        assert_eq!(result, Err(Interrupted));
    }
}
