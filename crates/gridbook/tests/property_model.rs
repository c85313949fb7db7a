// Property-based tests for document model invariants.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use chrono::{Days, NaiveDate};
use gridbook::prelude::*;
use gridbook::{column_to_letters, date_to_serial, letters_to_column, serial_to_date};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn config_128() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(128),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Arbitrary cell reference over the whole addressable grid.
fn arb_address() -> impl Strategy<Value = CellAddress> {
    (0..MAX_ROWS, 0..MAX_COLS, any::<bool>(), any::<bool>()).prop_map(
        |(row, col, abs_row, abs_col)| CellAddress::with_flags(row, col, abs_row, abs_col),
    )
}

/// Arbitrary range; both corners share one `$` flag pair so normalization
/// cannot cross the markers.
fn arb_range() -> impl Strategy<Value = CellRange> {
    (
        0..MAX_ROWS,
        0..MAX_COLS,
        0..MAX_ROWS,
        0..MAX_COLS,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(r1, c1, r2, c2, abs_row, abs_col)| {
            CellRange::new(
                CellAddress::with_flags(r1, c1, abs_row, abs_col),
                CellAddress::with_flags(r2, c2, abs_row, abs_col),
            )
        })
}

/// Content for one row of a shift window.
#[derive(Debug, Clone)]
struct RowSpec {
    value: u32,
    formula: bool,
    height: Option<u32>,
}

fn arb_row_spec() -> impl Strategy<Value = RowSpec> {
    (0u32..1000, any::<bool>(), prop::option::of(10u32..60)).prop_map(
        |(value, formula, height)| RowSpec {
            value,
            formula,
            height,
        },
    )
}

/// A window start, its row contents, and a delta larger than the window so
/// the source and destination never overlap.
fn arb_shift_case() -> impl Strategy<Value = (u32, Vec<RowSpec>, i64)> {
    (0u32..200, 0usize..8).prop_flat_map(|(start, span)| {
        (
            Just(start),
            prop::collection::vec(arb_row_spec(), span + 1),
            (span as i64 + 1)..(span as i64 + 40),
        )
    })
}

/// Window contents keyed by offset from the window start.
fn snapshot(sheet: &Sheet, first: u32, last: u32) -> Vec<(u32, Option<f64>, Vec<(u16, Cell)>)> {
    sheet
        .rows()
        .filter(|r| first <= r.row_num() && r.row_num() <= last)
        .map(|r| {
            (
                r.row_num() - first,
                r.height,
                r.cells().map(|(col, cell)| (col, cell.clone())).collect(),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pinned endpoints
// ---------------------------------------------------------------------------

/// The column letter scheme at its seams
#[test]
fn column_letter_pins() {
    for (col, letters) in [
        (0, "A"),
        (25, "Z"),
        (26, "AA"),
        (701, "ZZ"),
        (702, "AAA"),
        (MAX_COLS - 1, "XFD"),
    ] {
        assert_eq!(column_to_letters(col), letters);
        assert_eq!(letters_to_column(letters).unwrap(), col);
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn address_roundtrip(addr in arb_address()) {
        let text = addr.to_a1();
        prop_assert_eq!(CellAddress::parse(&text).unwrap(), addr);
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn range_roundtrip(range in arb_range()) {
        let text = range.to_a1();
        prop_assert_eq!(CellRange::parse(&text).unwrap(), range);
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn intern_is_content_addressed(labels in prop::collection::vec(r"[a-c]{0,3}", 0..30)) {
        let mut table = SharedStringTable::new();
        let handles: Vec<Handle> = labels.iter().map(|s| table.intern(s.clone())).collect();

        // Equal handles exactly for equal strings
        for (i, a) in labels.iter().enumerate() {
            for (j, b) in labels.iter().enumerate() {
                prop_assert_eq!(handles[i] == handles[j], a == b);
            }
        }
        for (label, &handle) in labels.iter().zip(&handles) {
            prop_assert_eq!(table.get(handle).unwrap(), label);
        }

        // Iteration follows first use
        let mut first_use: Vec<&str> = Vec::new();
        for label in &labels {
            if !first_use.contains(&label.as_str()) {
                first_use.push(label);
            }
        }
        prop_assert_eq!(table.iter().map(|(_, s)| s).collect::<Vec<_>>(), first_use.clone());
        prop_assert_eq!(table.unique_count(), first_use.len());
        prop_assert_eq!(table.total_count(), labels.len() as u64);
    }
}

proptest! {
    #![proptest_config(config_128())]
    #[test]
    fn shift_then_unshift_restores((start, specs, delta) in arb_shift_case()) {
        let mut wb = Workbook::new();
        wb.add_sheet("Data").unwrap();
        wb.define_name(NamedRange::workbook_scope("Probe", "Data!$A$1")).unwrap();
        let end = start + specs.len() as u32 - 1;

        for (i, spec) in specs.iter().enumerate() {
            let row = start + i as u32;
            wb.set_cell_value(0, row, 0, spec.value as f64).unwrap();
            if spec.formula {
                // references its own row, so it stays inside the window
                wb.set_cell_formula(0, row, 1, format!("A{}*2", row + 1)).unwrap();
            }
            if let Some(h) = spec.height {
                wb.sheet_mut(0).unwrap().set_row_height(row, h as f64).unwrap();
            }
        }
        let before = snapshot(wb.sheet(0).unwrap(), start, end);
        prop_assert_eq!(before.len(), specs.len());

        wb.shift_rows(0, start, end, delta).unwrap();
        // the source window is fully vacated
        prop_assert!(wb.sheet(0).unwrap().first_row_num().unwrap() >= start + delta as u32);
        prop_assert_eq!(wb.sheet(0).unwrap().physical_row_count(), specs.len());

        wb.shift_rows(0, start + delta as u32, end + delta as u32, -delta).unwrap();

        let after = snapshot(wb.sheet(0).unwrap(), start, end);
        prop_assert_eq!(after, before);
        prop_assert_eq!(wb.sheet(0).unwrap().physical_row_count(), specs.len());
        prop_assert_eq!(&wb.named_range("Probe", 0).unwrap().refers_to, "Data!$A$1");
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn serial_date_roundtrip(days in 0u64..110_000, date_1904 in any::<bool>()) {
        // the 1900 side starts past the fictitious leap day, where serials
        // are unambiguous
        let base = if date_1904 {
            NaiveDate::from_ymd_opt(1904, 1, 1).unwrap()
        } else {
            NaiveDate::from_ymd_opt(1900, 3, 1).unwrap()
        };
        let date = base.checked_add_days(Days::new(days)).unwrap();

        let serial = date_to_serial(date, date_1904).unwrap();
        prop_assert_eq!(serial.fract(), 0.0);
        prop_assert_eq!(serial_to_date(serial, date_1904), Some(date));
    }
}
