//! Behavior-driven tests for the derived-metrics pipeline
//!
//! These tests pin down how margins, EPS alignment and historic P/E treat
//! missing values, sparse reports and mismatched calendars.

mod support;

use stockscope_core::line_items::{DILUTED_EPS, GROSS_PROFIT, OPERATING_INCOME, TOTAL_REVENUE};
use stockscope_core::{
    eps_history, forward_fill, historic_pe, margins, ratio, DatedSeries, ValidationError,
};
use time::macros::offset;

use support::{day, prices, statement};

// =============================================================================
// Margins
// =============================================================================

#[test]
fn when_revenue_is_missing_for_a_period_its_margin_is_undefined() {
    // Given: three fiscal years, the last without reported revenue
    let income = statement(&[
        ("2022-12-31", &[(TOTAL_REVENUE, 100.0), (GROSS_PROFIT, 40.0)]),
        ("2023-12-31", &[(TOTAL_REVENUE, 200.0), (GROSS_PROFIT, 100.0)]),
        ("2024-12-31", &[(GROSS_PROFIT, 50.0)]),
    ]);

    // When: margins are derived
    let margins = margins(&income).expect("equal column lengths");

    // Then: present pairs divide, the missing revenue yields undefined
    let gross: Vec<Option<f64>> = margins
        .values()
        .map(|row| row.gross_profit_margin)
        .collect();
    assert_eq!(gross, vec![Some(0.4), Some(0.5), None]);
    assert!(margins.values().all(|row| row.operating_margin.is_none()));
}

#[test]
fn when_revenue_is_present_and_nonzero_margins_are_exact_quotients() {
    // Given: awkward but complete figures
    let rows: [(&str, f64, f64, f64); 3] = [
        ("2021-06-30", 365_817.0, 152_836.0, 108_949.0),
        ("2022-06-30", 394_328.0, 170_782.0, 119_437.0),
        ("2023-06-30", 383_285.0, 169_148.0, 114_301.0),
    ];
    let periods: Vec<(&str, [(&str, f64); 3])> = rows
        .iter()
        .map(|(end, revenue, gross, operating)| {
            (
                *end,
                [
                    (TOTAL_REVENUE, *revenue),
                    (GROSS_PROFIT, *gross),
                    (OPERATING_INCOME, *operating),
                ],
            )
        })
        .collect();
    let borrowed: Vec<(&str, &[(&str, f64)])> = periods
        .iter()
        .map(|(end, items)| (*end, items.as_slice()))
        .collect();
    let income = statement(&borrowed);

    // When: margins are derived
    let margins = margins(&income).expect("equal column lengths");

    // Then: each margin is exactly the IEEE quotient
    for ((_, revenue, gross, operating), row) in rows.iter().zip(margins.values()) {
        assert_eq!(row.gross_profit_margin, Some(gross / revenue));
        assert_eq!(row.operating_margin, Some(operating / revenue));
    }
}

#[test]
fn when_statement_is_empty_margins_are_empty_not_an_error() {
    let income = statement(&[]);
    let margins = margins(&income).expect("empty statement is fine");
    assert!(margins.is_empty());
}

// =============================================================================
// Historic P/E
// =============================================================================

#[test]
fn when_eps_is_sparse_it_is_carried_forward_onto_every_trading_day() {
    // Given: five daily closes and EPS reported on Jan 2 and Jan 4
    let closes = prices(&[
        ("2024-01-01", 10.0),
        ("2024-01-02", 10.0),
        ("2024-01-03", 10.0),
        ("2024-01-04", 12.0),
        ("2024-01-05", 12.0),
    ]);
    let income = statement(&[
        ("2024-01-02", &[(DILUTED_EPS, 2.0)]),
        ("2024-01-04", &[(DILUTED_EPS, 3.0)]),
    ]);

    // When: the historic P/E table is built
    let history = historic_pe(&closes, &income).expect("aligned columns");

    // Then: EPS is forward-filled and the ratio follows it
    let eps: Vec<Option<f64>> = history.values().map(|row| row.diluted_eps).collect();
    let pe: Vec<Option<f64>> = history.values().map(|row| row.pe_ratio).collect();
    assert_eq!(eps, vec![None, Some(2.0), Some(2.0), Some(3.0), Some(3.0)]);
    assert_eq!(pe, vec![None, Some(5.0), Some(5.0), Some(4.0), Some(4.0)]);
    assert_eq!(history.len(), 5, "one row per trading day");
}

#[test]
fn when_prices_end_before_first_report_pe_column_is_all_undefined() {
    // Given: prices that precede every EPS report
    let closes = prices(&[("2020-01-02", 50.0), ("2020-01-03", 51.0)]);
    let income = statement(&[("2023-12-31", &[(DILUTED_EPS, 4.0)])]);

    // When: the table is built
    let history = historic_pe(&closes, &income).expect("no overlap is not an error");

    // Then: every row is kept and every ratio is undefined
    assert_eq!(history.len(), 2);
    assert!(history.values().all(|row| row.pe_ratio.is_none()));
}

#[test]
fn when_prices_carry_an_exchange_zone_historic_pe_still_aligns() {
    // Given: zone-annotated prices and a naive statement
    let zoned = DatedSeries::from_pairs(
        Some(offset!(-5)),
        prices(&[("2024-03-01", 30.0), ("2024-03-04", 33.0)])
            .into_entries()
            .into_iter()
            .map(|entry| (entry.date, entry.value)),
    )
    .expect("unique dates");
    let income = statement(&[("2024-02-29", &[(DILUTED_EPS, 3.0)])]);

    // When: the table is built
    let history = historic_pe(&zoned, &income).expect("aligned columns");

    // Then: zones are normalized before alignment
    assert!(history.is_naive());
    let pe: Vec<Option<f64>> = history.values().map(|row| row.pe_ratio).collect();
    assert_eq!(pe, vec![Some(10.0), Some(11.0)]);
}

#[test]
fn eps_history_without_the_line_item_is_all_undefined() {
    let income = statement(&[
        ("2023-12-31", &[(TOTAL_REVENUE, 1.0)]),
        ("2024-12-31", &[(TOTAL_REVENUE, 2.0)]),
    ]);
    let eps = eps_history(&income);
    assert_eq!(eps.len(), 2);
    assert!(eps.values().all(Option::is_none));
}

// =============================================================================
// Aligner and Ratio Calculator
// =============================================================================

#[test]
fn when_daily_index_meets_quarterly_reports_each_day_gets_latest_prior_report() {
    // Given: a daily index spanning two quarterly reports
    let daily = prices(&[
        ("2024-03-28", 1.0),
        ("2024-03-29", 1.0),
        ("2024-04-01", 1.0),
        ("2024-06-28", 1.0),
        ("2024-07-01", 1.0),
    ]);
    let quarterly = DatedSeries::from_pairs(
        None,
        [(day("2024-03-29"), 1.5), (day("2024-06-30"), 1.7)],
    )
    .expect("unique dates");

    // When: the reports are forward-filled
    let aligned = forward_fill(&daily, &quarterly);

    // Then: days before the first report are undefined
    let values: Vec<Option<f64>> = aligned.values().copied().collect();
    assert_eq!(values, vec![None, Some(1.5), Some(1.5), Some(1.5), Some(1.7)]);
}

#[test]
fn when_zones_differ_aligner_reports_every_value_as_undefined() {
    // Given: a zoned target and a naive source
    let target = DatedSeries::from_pairs(Some(offset!(+1)), [(day("2024-01-02"), 1.0)])
        .expect("unique dates");
    let source = DatedSeries::from_pairs(None, [(day("2024-01-01"), 9.0)]).expect("unique dates");

    // When: aligned without normalizing
    let aligned = forward_fill(&target, &source);

    // Then: nothing is matched and nothing panics
    assert_eq!(aligned.len(), 1);
    assert_eq!(aligned.values().copied().collect::<Vec<_>>(), vec![None]);
}

#[test]
fn ratio_is_pure_and_keeps_division_by_zero_visible() {
    let numerator = [Some(1.0), Some(0.0), None, Some(6.0)];
    let denominator = [Some(0.0), Some(0.0), Some(2.0), Some(3.0)];

    let first = ratio(&numerator, &denominator).expect("same length");
    let second = ratio(&numerator, &denominator).expect("same length");

    assert_eq!(first, second);
    assert_eq!(first[0], Some(f64::INFINITY));
    assert_eq!(first[1], None, "0/0 is undefined");
    assert_eq!(first[2], None);
    assert_eq!(first[3], Some(2.0));
}

#[test]
fn ratio_rejects_columns_of_different_length() {
    let err = ratio(&[Some(1.0)], &[]).expect_err("length mismatch");
    assert_eq!(
        err,
        ValidationError::ColumnLengthMismatch {
            numerator: 1,
            denominator: 0
        }
    );
}

#[test]
fn series_reject_duplicate_dates() {
    let err = DatedSeries::from_pairs(None, [(day("2024-01-02"), 1.0), (day("2024-01-02"), 2.0)])
        .expect_err("duplicate date");
    assert!(matches!(err, ValidationError::DuplicateDate { .. }));
}
