//! End-to-end tests for the payroll ingestion engine.
//!
//! This suite covers:
//! - Header mapping with statutory columns and derived fields
//! - Header echo and blank row handling
//! - Embedded header detection below report banners
//! - Header-free pattern extraction
//! - Whole-input failures
//! - Statutory deductions under both shipped rulesets
//! - The HTTP adapter

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;
use uuid::Uuid;

use payroll_ingest::api::{AppState, create_router};
use payroll_ingest::calculation::{calculate, calculate_prorated};
use payroll_ingest::config::ConfigLoader;
use payroll_ingest::ingest::IngestionPipeline;
use payroll_ingest::models::{
    CanonicalField, CellValue, EmployeeRecord, FailedRow, IngestionResult, RawRow, SkipReason,
    StrategyKind, WarningCode,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/ke").expect("Failed to load config")
}

fn pipeline(version: &str) -> IngestionPipeline {
    let config = load_config();
    let ruleset = config.ruleset(version).unwrap();
    IngestionPipeline::from_config(&config, ruleset)
}

fn ingest(rows: &[RawRow]) -> IngestionResult {
    pipeline("2024-12-27").ingest("payroll.xlsx", rows)
}

fn keyed(cells: &[(&str, CellValue)]) -> RawRow {
    cells.iter().cloned().collect()
}

fn positional(values: &[&str]) -> RawRow {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let key = if i == 0 {
                "__EMPTY".to_string()
            } else {
                format!("__EMPTY_{}", i)
            };
            (key, CellValue::from(*value))
        })
        .collect()
}

fn text(value: &str) -> CellValue {
    CellValue::from(value)
}

fn num(value: i64) -> CellValue {
    CellValue::number(value)
}

fn without_ids(records: &[EmployeeRecord]) -> Vec<EmployeeRecord> {
    records
        .iter()
        .cloned()
        .map(|mut record| {
            record.id = Uuid::nil();
            record
        })
        .collect()
}

fn assert_complete(result: &IngestionResult, row_count: usize) {
    let failed_rows = result
        .failed_rows
        .iter()
        .filter(|failed| failed.row_number > 0)
        .count();
    assert_eq!(
        result.extracted_records.len() + failed_rows + result.skipped_rows.len(),
        row_count,
        "every input row must be extracted, failed or skipped"
    );
}

// =============================================================================
// SECTION 1: Header Mapping
// =============================================================================

#[test]
fn test_full_payroll_sheet() {
    let rows = vec![
        keyed(&[
            ("Emp No", text("E001")),
            ("Employee Name", text("Jane Mary Doe")),
            ("ID No", text("23456789")),
            ("KRA PIN", text("A123456789Z")),
            ("Gross Pay", text("100,000.00")),
            ("PAYE", num(20460)),
            ("NSSF", num(2160)),
            ("SHIF", num(2750)),
            ("Housing Levy", num(1500)),
            ("Phone", text("0712345678")),
        ]),
        keyed(&[
            ("Emp No", text("E002")),
            ("Employee Name", text("John Kamau")),
            ("ID No", text("12345678")),
            ("KRA PIN", text("A987654321B")),
            ("Gross Pay", text("45,000")),
            ("PAYE", num(4500)),
            ("NSSF", num(2160)),
            ("SHIF", num(1238)),
            ("Housing Levy", num(675)),
            ("Phone", text("0722000111")),
        ]),
    ];

    let result = ingest(&rows);
    assert_eq!(result.strategy, Some(StrategyKind::HeaderMapping));
    assert_eq!(result.extracted_records.len(), 2);
    assert!(result.failed_rows.is_empty());
    assert_complete(&result, 2);

    let jane = &result.extracted_records[0];
    assert_eq!(jane.employee_number, "E001");
    assert_eq!(jane.given_names, "Jane Mary");
    assert_eq!(jane.surname, "Doe");
    assert_eq!(jane.national_id, "23456789");
    assert_eq!(jane.tax_pin, "A123456789Z");
    assert_eq!(jane.gross_income, decimal("100000"));
    assert_eq!(jane.statutory_deductions.tax, decimal("20460"));
    assert_eq!(jane.statutory_deductions.housing_levy, decimal("1500"));
    assert_eq!(jane.total_deductions, decimal("26870"));
    assert_eq!(jane.net_income, decimal("73130"));
    assert_eq!(jane.advance_limit, decimal("36565"));
    assert_eq!(jane.available_advance_limit, jane.advance_limit);
    assert_eq!(jane.contact.phone_number, "0712345678");
    assert!(jane.warnings.is_empty());

    let mapped: Vec<CanonicalField> = result.column_mapping.iter().map(|m| m.field).collect();
    assert!(mapped.contains(&CanonicalField::StatutoryHealth));
    assert!(mapped.contains(&CanonicalField::PhoneNumber));
}

#[test]
fn test_supplied_net_income_is_kept() {
    let rows = vec![keyed(&[
        ("Staff No", text("E001")),
        ("Name", text("Jane Doe")),
        ("Gross Pay", num(60000)),
        ("PAYE", num(9000)),
        ("Net Pay", num(50000)),
    ])];

    let record = &ingest(&rows).extracted_records[0];
    assert_eq!(record.total_deductions, decimal("9000"));
    assert_eq!(record.net_income, decimal("50000"));
}

#[test]
fn test_cap_warnings_follow_selected_ruleset() {
    let rows = vec![keyed(&[
        ("Staff No", text("E001")),
        ("Name", text("Jane Doe")),
        ("Gross Pay", num(100000)),
        ("NSSF", num(2160)),
    ])];

    let current = pipeline("2024-12-27").ingest("a.xlsx", &rows);
    assert!(current.extracted_records[0].warnings.is_empty());

    let legacy = pipeline("2023-07-01").ingest("a.xlsx", &rows);
    let warnings = &legacy.extracted_records[0].warnings;
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, WarningCode::PensionAboveCap);
}

#[test]
fn test_deductions_exceeding_gross_warn_but_keep_record() {
    let rows = vec![keyed(&[
        ("Staff No", text("E001")),
        ("Name", text("Jane Doe")),
        ("Gross Pay", num(10000)),
        ("Loan", num(15000)),
    ])];

    let result = ingest(&rows);
    let record = &result.extracted_records[0];
    assert_eq!(record.net_income, decimal("-5000"));
    assert_eq!(record.advance_limit, Decimal::ZERO);
    assert!(
        record
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::DeductionsExceedGross)
    );
}

#[test]
fn test_unparseable_salary_defaults_to_zero_with_warning() {
    let rows = vec![keyed(&[
        ("Staff No", text("E001")),
        ("Name", text("Jane Doe")),
        ("Gross Pay", text("n/a")),
    ])];

    let result = ingest(&rows);
    assert_eq!(result.extracted_records.len(), 1);
    let record = &result.extracted_records[0];
    assert_eq!(record.gross_income, Decimal::ZERO);
    assert!(
        record
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::UnparseableValue)
    );
}

#[test]
fn test_configured_aliases_are_recognised() {
    let rows = vec![keyed(&[
        ("Works Number", text("W-17")),
        ("Name", text("Jane Doe")),
        ("Monthly Pay", num(52000)),
    ])];

    let record = &ingest(&rows).extracted_records[0];
    assert_eq!(record.employee_number, "W-17");
    assert_eq!(record.gross_income, decimal("52000"));
}

#[test]
fn test_header_echo_and_blank_rows_are_skipped() {
    let rows = vec![
        keyed(&[
            ("Staff No", text("Staff No")),
            ("Name", text("Name")),
            ("Gross Pay", text("Gross Pay")),
        ]),
        keyed(&[
            ("Staff No", text("E001")),
            ("Name", text("Jane Doe")),
            ("Gross Pay", num(60000)),
        ]),
        keyed(&[
            ("Staff No", CellValue::Empty),
            ("Name", text("  ")),
            ("Gross Pay", CellValue::Empty),
        ]),
        keyed(&[
            ("Staff No", text("E002")),
            ("Name", text("John Kamau")),
            ("Gross Pay", num(45000)),
        ]),
    ];

    let result = ingest(&rows);
    assert_eq!(result.extracted_records.len(), 2);
    assert_eq!(result.skipped_rows.len(), 2);
    assert_eq!(result.skipped_rows[0].reason, SkipReason::HeaderEcho);
    assert_eq!(result.skipped_rows[0].row_number, 1);
    assert_eq!(result.skipped_rows[1].reason, SkipReason::BlankRow);
    assert_eq!(result.skipped_rows[1].row_number, 3);
    assert_complete(&result, 4);
}

#[test]
fn test_unmappable_row_names_one_mapped_field() {
    let rows = vec![keyed(&[("Gross Pay", num(60000))])];

    let result = ingest(&rows);
    assert!(result.extracted_records.is_empty());
    assert_eq!(result.failed_rows.len(), 1);
    assert_eq!(result.failed_rows[0].row_number, 1);
    assert!(result.failed_rows[0].reason.contains('1'));
    assert!(result.failed_rows[0].reason.contains("no identity"));
    assert_complete(&result, 1);
}

#[test]
fn test_mixed_good_and_bad_rows_keep_input_order() {
    let rows = vec![
        keyed(&[
            ("Staff No", text("E001")),
            ("Name", text("Jane Doe")),
            ("Gross Pay", num(60000)),
        ]),
        keyed(&[
            ("Staff No", CellValue::Empty),
            ("Name", CellValue::Empty),
            ("Gross Pay", num(45000)),
        ]),
        keyed(&[
            ("Staff No", text("E003")),
            ("Name", text("Ann Wanjiru")),
            ("Gross Pay", num(38000)),
        ]),
    ];

    let result = ingest(&rows);
    assert_eq!(result.extracted_records.len(), 2);
    assert_eq!(result.extracted_records[1].employee_number, "E003");
    assert_eq!(result.failed_rows.len(), 1);
    assert_eq!(result.failed_rows[0].row_number, 2);
    assert_complete(&result, 3);
}

#[test]
fn test_amounts_beyond_decimal_range_do_not_abort_ingestion() {
    let huge = "79228162514264337593543950335";
    let rows = vec![
        keyed(&[
            ("Staff No", text("E001")),
            ("Name", text("Jane Doe")),
            ("Gross Pay", text("50000")),
            ("PAYE", text(huge)),
            ("NSSF", text(huge)),
        ]),
        keyed(&[
            ("Staff No", text("E002")),
            ("Name", text("John Kamau")),
            ("Gross Pay", text(&format!("-{}", huge))),
            ("PAYE", text(huge)),
            ("NSSF", num(0)),
        ]),
    ];

    let result = ingest(&rows);
    assert_eq!(result.extracted_records.len(), 2);
    assert_complete(&result, 2);

    let first = &result.extracted_records[0];
    assert_eq!(first.total_deductions, Decimal::ZERO);
    assert_eq!(first.net_income, decimal("50000"));
    assert!(first.warnings.iter().any(|w| w.code == WarningCode::UnparseableValue));

    let second = &result.extracted_records[1];
    assert_eq!(second.total_deductions, decimal(huge));
    assert_eq!(second.net_income, Decimal::ZERO);
    assert!(second.warnings.iter().any(|w| w.code == WarningCode::UnparseableValue));
}

// =============================================================================
// SECTION 2: Embedded Header Detection
// =============================================================================

fn banner_rows() -> Vec<RawRow> {
    vec![
        positional(&["Monthly Payroll", "", "", ""]),
        positional(&["", "", "", ""]),
        positional(&["", "", "", ""]),
        positional(&["Staff No", "Employee Name", "KRA PIN", "Basic Salary"]),
        positional(&["E001", "Jane Mary Doe", "A123456789Z", "60,000"]),
        positional(&["E002", "John Kamau", "A987654321B", "45,000"]),
    ]
}

#[test]
fn test_embedded_header_below_banner() {
    let rows = banner_rows();
    let result = ingest(&rows);

    assert_eq!(result.strategy, Some(StrategyKind::EmbeddedHeader));
    assert_eq!(result.extracted_records.len(), 2);
    assert_eq!(result.extracted_records[0].surname, "Doe");
    assert_eq!(result.extracted_records[1].gross_income, decimal("45000"));
    assert_eq!(result.skipped_rows.len(), 4);
    assert_eq!(result.skipped_rows[3].reason, SkipReason::DetectedHeader);
    assert_complete(&result, rows.len());
}

#[test]
fn test_embedded_header_matches_promoted_header() {
    let embedded = ingest(&banner_rows());

    let headers = ["Staff No", "Employee Name", "KRA PIN", "Basic Salary"];
    let promoted: Vec<RawRow> = banner_rows()[4..]
        .iter()
        .map(|row| {
            headers
                .iter()
                .zip(row.values())
                .map(|(header, cell)| (header.to_string(), cell.clone()))
                .collect()
        })
        .collect();
    let direct = ingest(&promoted);

    assert_eq!(direct.strategy, Some(StrategyKind::HeaderMapping));
    assert_eq!(
        without_ids(&embedded.extracted_records),
        without_ids(&direct.extracted_records)
    );
}

#[test]
fn test_weak_embedded_header_fails_rows_with_reason() {
    let rows = vec![
        positional(&["Employee Name", "Remarks"]),
        positional(&["Jane Doe", "on leave"]),
    ];

    let result = ingest(&rows);
    assert!(result.extracted_records.is_empty());
    assert!(
        result
            .failed_rows
            .iter()
            .any(|failed| failed.reason.contains("could not reliably map detected headers"))
    );
}

// =============================================================================
// SECTION 3: Pattern Extraction
// =============================================================================

#[test]
fn test_pattern_extraction_estimates_deductions() {
    let rows = vec![
        positional(&["Jane Doe", "23456789", "A123456789Z", "60,000.00"]),
        positional(&["John Kamau", "12345678", "A987654321B", "45,000.00"]),
    ];

    let result = ingest(&rows);
    assert_eq!(result.strategy, Some(StrategyKind::PatternMatch));
    assert_eq!(result.extracted_records.len(), 2);

    let jane = &result.extracted_records[0];
    assert_eq!(jane.given_names, "Jane");
    assert_eq!(jane.surname, "Doe");
    assert_eq!(jane.national_id, "23456789");
    assert_eq!(jane.tax_pin, "A123456789Z");
    assert_eq!(jane.gross_income, decimal("60000"));
    assert_eq!(jane.statutory_deductions.tax, decimal("18000"));
    assert_eq!(jane.statutory_deductions.pension, decimal("900"));
    assert_eq!(jane.statutory_deductions.health, decimal("600"));
    assert_eq!(jane.statutory_deductions.housing_levy, decimal("900"));
    assert_eq!(jane.net_income, decimal("39600"));
    assert!(
        jane.warnings
            .iter()
            .any(|w| w.code == WarningCode::EstimatedDeductions)
    );
}

#[test]
fn test_pattern_rows_without_name_fail() {
    let rows = vec![
        positional(&["Jane Doe", "23456789", "60,000.00"]),
        positional(&["misc", "12345678", "45,000.00"]),
    ];

    let result = ingest(&rows);
    assert_eq!(result.extracted_records.len(), 1);
    assert_eq!(result.failed_rows.len(), 1);
    assert_eq!(result.failed_rows[0].row_number, 2);
    assert!(result.failed_rows[0].reason.contains("name"));
}

// =============================================================================
// SECTION 4: Whole-Input Failures
// =============================================================================

#[test]
fn test_no_rows_is_no_data_found() {
    let result = ingest(&[]);
    assert_eq!(result.failed_rows, vec![FailedRow::no_data_found()]);
    assert!(result.extracted_records.is_empty());
}

#[test]
fn test_only_blank_rows_is_no_data_found() {
    let rows = vec![positional(&["", ""]), positional(&["", ""])];
    let result = ingest(&rows);

    assert_eq!(result.failed_rows, vec![FailedRow::no_data_found()]);
    assert_eq!(result.failed_rows[0].row_number, 0);
    assert_eq!(result.skipped_rows.len(), 2);
    assert_complete(&result, 2);
}

// =============================================================================
// SECTION 5: Statutory Deductions
// =============================================================================

#[test]
fn test_deductions_differ_by_ruleset() {
    let config = load_config();

    let current = calculate(decimal("50000"), config.ruleset("2024-12-27").unwrap());
    assert_eq!(current.pension, decimal("2160"));
    assert_eq!(current.health, decimal("1375"));
    assert_eq!(current.levy, decimal("750"));
    assert_eq!(current.taxable_base, decimal("45715"));
    assert_eq!(current.tax, decimal("6098"));
    assert_eq!(current.net, decimal("39617"));

    let legacy = calculate(decimal("50000"), config.ruleset("2023-07-01").unwrap());
    assert_eq!(legacy.pension, decimal("1080"));
    assert_eq!(legacy.health, decimal("1200"));
    assert_eq!(legacy.taxable_base, decimal("48920"));
    assert_eq!(legacy.tax, decimal("7059"));
    assert_eq!(legacy.net, decimal("39911"));
}

#[test]
fn test_ruleset_selected_by_date() {
    let config = load_config();
    let date = |y, m, d| chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap();

    assert_eq!(config.ruleset_for(date(2024, 6, 30)).unwrap().version, "2023-07-01");
    assert_eq!(config.ruleset_for(date(2024, 12, 27)).unwrap().version, "2024-12-27");
    assert!(config.ruleset_for(date(2020, 1, 1)).is_err());
}

#[test]
fn test_prorated_deductions() {
    let config = load_config();
    let ruleset = config.ruleset("2024-12-27").unwrap();

    let result = calculate_prorated(decimal("100000"), decimal("200"), decimal("100"), ruleset);
    assert_eq!(result, calculate(decimal("50000"), ruleset));
}

// =============================================================================
// SECTION 6: HTTP Adapter
// =============================================================================

fn create_router_for_test() -> Router {
    create_router(AppState::new(load_config()))
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_http_ingest_then_calculate() {
    let (status, ingested) = post_json(
        create_router_for_test(),
        "/ingest",
        json!({
            "source_name": "march.xlsx",
            "as_of": "2025-03-31",
            "rows": [
                { "Staff No": "E001", "Employee Name": "Jane Doe", "Gross Pay": "50,000" }
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ingested["strategy"], "header_mapping");
    let gross = ingested["extracted_records"][0]["grossIncome"].clone();
    assert_eq!(decimal(gross.as_str().unwrap()), decimal("50000"));

    let (status, breakdown) = post_json(
        create_router_for_test(),
        "/deductions",
        json!({ "gross_income": gross, "as_of": "2025-03-31" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(breakdown["result"]["ruleset_version"], "2024-12-27");
    assert_eq!(decimal(breakdown["result"]["net"].as_str().unwrap()), decimal("39617"));
    assert_eq!(breakdown["audit_steps"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_http_failed_rows_are_returned_not_errors() {
    let (status, body) = post_json(
        create_router_for_test(),
        "/ingest",
        json!({
            "source_name": "bad.xlsx",
            "ruleset_version": "2024-12-27",
            "rows": [ { "Remarks": "nothing useful" } ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["extracted_records"].as_array().unwrap().is_empty());
    assert!(!body["failed_rows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_http_unknown_ruleset() {
    let (status, body) = post_json(
        create_router_for_test(),
        "/ingest",
        json!({ "source_name": "a.xlsx", "ruleset_version": "1990-01-01", "rows": [] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "RULESET_NOT_FOUND");
}
