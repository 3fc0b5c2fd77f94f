//! End-to-end checks of the text function library through the
//! registry, driving whole scenarios rather than single functions.

use gridcalc_common::{AnyValue, Area, ErrorKind, Reference, ScalarValue, CELL_TEXT_LIMIT};
use gridcalc_eval::locale::Locale;
use gridcalc_eval::test_workbook::TestWorkbook;

fn s(v: impl Into<ScalarValue>) -> AnyValue {
    AnyValue::Scalar(v.into())
}

fn area(r1: u32, c1: u32, r2: u32, c2: u32) -> AnyValue {
    AnyValue::Reference(Reference::single(Area::new("Sheet1", r1, c1, r2, c2)))
}

fn text_of(value: AnyValue) -> String {
    match value {
        AnyValue::Scalar(ScalarValue::Text(t)) => t,
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn concat_over_mixed_workbook_data() {
    // 2019-01-01 as a date serial.
    let wb = TestWorkbook::new()
        .with_cell(1, 1, "ABC")
        .with_cell(2, 1, 123.0)
        .with_cell(3, 1, true)
        .with_cell(4, 1, ScalarValue::DateTime(43_466.0))
        .with_cell(5, 1, 1.25)
        .with_locale(Locale::cs_cz());

    let joined = wb.invoke("CONCAT", &[area(1, 1, 3, 1)]).unwrap();
    assert_eq!(text_of(joined), "ABC123TRUE");

    let date = wb.invoke("CONCAT", &[area(4, 1, 5, 1)]).unwrap();
    assert_eq!(text_of(date), "434661,25");
}

#[test]
fn concat_propagates_cell_errors() {
    let wb = TestWorkbook::new()
        .with_cell(1, 1, "ok")
        .with_cell(2, 1, ScalarValue::Error(ErrorKind::NoValueAvailable.into()));
    assert_eq!(
        wb.invoke("CONCAT", &[area(1, 1, 2, 1)]).unwrap(),
        AnyValue::error(ErrorKind::NoValueAvailable)
    );
}

#[test]
fn concatenate_length_boundary() {
    let wb = TestWorkbook::new();
    let half = "x".repeat(CELL_TEXT_LIMIT - 1);
    let exact = wb
        .invoke("CONCATENATE", &[s(half.clone()), s("y")])
        .unwrap();
    assert_eq!(text_of(exact).len(), CELL_TEXT_LIMIT);
    assert_eq!(
        wb.invoke("CONCATENATE", &[s(half), s("yz")]).unwrap(),
        AnyValue::error(ErrorKind::IncompatibleValue)
    );
}

#[test]
fn implicit_intersection_row_by_row() {
    let wb = TestWorkbook::new()
        .with_cell(1, 1, "a")
        .with_cell(2, 1, "b")
        .with_cell(3, 1, "c");
    for (row, expected) in [(1, "a"), (2, "b"), (3, "c")] {
        let result = wb
            .invoke_at(row, 4, "CONCATENATE", &[area(1, 1, 3, 1)])
            .unwrap();
        assert_eq!(text_of(result), expected, "row {row}");
    }
    assert_eq!(
        wb.invoke_at(4, 4, "CONCATENATE", &[area(1, 1, 3, 1)]).unwrap(),
        AnyValue::error(ErrorKind::IncompatibleValue)
    );
}

#[test]
fn find_and_search_disagree_on_empty_subject() {
    let wb = TestWorkbook::new();
    assert_eq!(
        wb.invoke("FIND", &[s(""), s("")]).unwrap(),
        s(1.0)
    );
    assert_eq!(
        wb.invoke("SEARCH", &[s(""), s("")]).unwrap(),
        AnyValue::error(ErrorKind::IncompatibleValue)
    );
}

#[test]
fn find_is_sensitive_where_search_is_not() {
    let wb = TestWorkbook::new();
    let args = [s("excel"), s("Microsoft Excel 2010")];
    assert_eq!(
        wb.invoke("FIND", &args).unwrap(),
        AnyValue::error(ErrorKind::IncompatibleValue)
    );
    assert_eq!(wb.invoke("SEARCH", &args).unwrap(), s(11.0));
}

#[test]
fn textjoin_long_range_overflows() {
    let wb = TestWorkbook::new();
    // 32769 blank cells joined by commas overflow the cell limit.
    let result = wb
        .invoke("TEXTJOIN", &[s(","), s(false), area(1, 4, 32_769, 4)])
        .unwrap();
    assert_eq!(result, AnyValue::error(ErrorKind::IncompatibleValue));
}

#[test]
fn error_arguments_always_win() {
    let wb = TestWorkbook::new();
    for name in ["LEN", "UPPER", "VALUE", "TEXT", "SEARCH", "CONCAT"] {
        let mut args = vec![AnyValue::error(ErrorKind::NoValueAvailable)];
        if matches!(name, "TEXT" | "SEARCH") {
            args.push(s("x"));
        }
        assert_eq!(
            wb.invoke(name, &args).unwrap(),
            AnyValue::error(ErrorKind::NoValueAvailable),
            "{name}"
        );
    }
}

#[test]
fn unknown_names_and_arity() {
    let wb = TestWorkbook::new();
    assert_eq!(
        wb.invoke("NOSUCHFN", &[s(1.0)]).unwrap(),
        AnyValue::error(ErrorKind::NameNotRecognized)
    );
    assert_eq!(
        wb.invoke("LEN", &[]).unwrap(),
        AnyValue::error(ErrorKind::IncompatibleValue)
    );
    assert_eq!(
        wb.invoke("MID", &[s("a"), s(1.0)]).unwrap(),
        AnyValue::error(ErrorKind::IncompatibleValue)
    );
}

#[test]
fn future_prefix_resolves() {
    let wb = TestWorkbook::new();
    assert_eq!(
        text_of(wb.invoke("_xlfn.CONCAT", &[s("a"), s("b")]).unwrap()),
        "ab"
    );
}

#[test]
fn cancellation_interrupts_long_iterations() {
    let wb = TestWorkbook::new().with_cell(1, 1, "a");
    wb.cancel();
    assert!(wb.invoke("CONCAT", &[area(1, 1, 100, 1)]).is_err());
}

#[test]
fn chained_text_pipeline() {
    // TRIM(PROPER(...)) style composition through separate invokes.
    let wb = TestWorkbook::new();
    let proper = wb
        .invoke("PROPER", &[s("  mixed   CASE text ")])
        .unwrap();
    let trimmed = wb.invoke("TRIM", &[proper]).unwrap();
    assert_eq!(text_of(trimmed), "Mixed Case Text");
}

#[test]
fn substitute_targets_one_occurrence() {
    let wb = TestWorkbook::new();
    let out = wb
        .invoke(
            "SUBSTITUTE",
            &[
                s("This is a Tuesday. Next week also has a Tuesday."),
                s("Tuesday"),
                s("Monday"),
                s(2.0),
            ],
        )
        .unwrap();
    assert_eq!(
        text_of(out),
        "This is a Tuesday. Next week also has a Monday."
    );
}

#[test]
fn rounding_is_half_away_from_zero() {
    let wb = TestWorkbook::new();
    assert_eq!(text_of(wb.invoke("FIXED", &[s(2.5), s(0.0)]).unwrap()), "3");
    assert_eq!(
        text_of(wb.invoke("FIXED", &[s(-2.5), s(0.0)]).unwrap()),
        "-3"
    );
    assert_eq!(
        text_of(wb.invoke("DOLLAR", &[s(1250.0), s(-2.0)]).unwrap()),
        "$1,300"
    );
}
