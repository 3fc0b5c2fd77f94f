//! In-memory single-sheet workbook used by unit and integration tests.

use std::sync::atomic::{AtomicBool, Ordering};

use gridcalc_common::{AnyValue, ScalarValue};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::context::{CalcContext, CellCoord, Interrupted};
use crate::locale::Locale;
use crate::registry::FunctionRegistry;

static BUILTINS: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::with_builtins);

pub struct TestWorkbook {
    cells: FxHashMap<(u32, u32), ScalarValue>,
    locale: Locale,
    current_year: i32,
    cancelled: AtomicBool,
}

impl TestWorkbook {
    pub fn new() -> Self {
        Self {
            cells: FxHashMap::default(),
            locale: Locale::invariant(),
            current_year: 2022,
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn with_cell(mut self, row: u32, col: u32, value: impl Into<ScalarValue>) -> Self {
        self.cells.insert((row, col), value.into());
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// A context whose calling cell is A1.
    pub fn context(&self) -> TestContext<'_> {
        self.context_at(1, 1)
    }

    pub fn context_at(&self, row: u32, col: u32) -> TestContext<'_> {
        TestContext {
            workbook: self,
            calling: CellCoord { row, col },
        }
    }

    /// Calls a built-in through the shared registry with A1 as the
    /// calling cell.
    pub fn invoke(&self, name: &str, args: &[AnyValue]) -> Result<AnyValue, Interrupted> {
        self.invoke_at(1, 1, name, args)
    }

    pub fn invoke_at(
        &self,
        row: u32,
        col: u32,
        name: &str,
        args: &[AnyValue],
    ) -> Result<AnyValue, Interrupted> {
        BUILTINS.invoke(&self.context_at(row, col), name, args)
    }
}

impl Default for TestWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TestContext<'a> {
    workbook: &'a TestWorkbook,
    calling: CellCoord,
}

impl CalcContext for TestContext<'_> {
    fn locale(&self) -> &Locale {
        &self.workbook.locale
    }

    fn cancellation_requested(&self) -> bool {
        self.workbook.cancelled.load(Ordering::SeqCst)
    }

    fn calling_cell(&self) -> CellCoord {
        self.calling
    }

    fn get_cell_value(&self, _sheet: &str, row: u32, col: u32) -> ScalarValue {
        self.workbook
            .cells
            .get(&(row, col))
            .cloned()
            .unwrap_or(ScalarValue::Blank)
    }

    fn used_extent(&self, _sheet: &str) -> (u32, u32) {
        self.workbook
            .cells
            .keys()
            .fold((0, 0), |(rows, cols), &(r, c)| (rows.max(r), cols.max(c)))
    }

    fn current_year(&self) -> i32 {
        self.workbook.current_year
    }
}
