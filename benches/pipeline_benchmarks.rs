//! Performance benchmarks for the payroll ingestion engine.
//!
//! Covers each extraction strategy at increasing sheet sizes, the deduction
//! calculator, and the HTTP round trip for an ingestion request.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use payroll_ingest::api::{AppState, create_router};
use payroll_ingest::calculation::{calculate, calculate_with_audit};
use payroll_ingest::config::ConfigLoader;
use payroll_ingest::ingest::IngestionPipeline;
use payroll_ingest::models::{CellValue, RawRow};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

const NAMES: [&str; 4] = ["Jane Mary Doe", "John Kamau", "Ann Wanjiru", "Peter Otieno"];

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/ke").expect("Failed to load config")
}

fn create_pipeline(config: &ConfigLoader) -> IngestionPipeline {
    let ruleset = config.ruleset("2024-12-27").expect("shipped ruleset");
    IngestionPipeline::from_config(config, ruleset)
}

/// A sheet whose column keys are its headers.
fn headed_sheet(rows: usize) -> Vec<RawRow> {
    (0..rows)
        .map(|i| {
            RawRow::from_iter([
                ("Staff No", CellValue::from(format!("E{:05}", i))),
                ("Employee Name", CellValue::from(NAMES[i % NAMES.len()])),
                ("KRA PIN", CellValue::from(format!("A{:09}Z", i))),
                ("Gross Pay", CellValue::number(40_000 + (i as i64 % 50) * 1_000)),
                ("PAYE", CellValue::number(6_000)),
                ("NSSF", CellValue::number(2_160)),
                ("SHIF", CellValue::number(1_100)),
                ("Housing Levy", CellValue::number(600)),
            ])
        })
        .collect()
}

fn positional(values: Vec<CellValue>) -> RawRow {
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| (format!("__EMPTY_{}", i), value))
        .collect()
}

/// A sheet with a report banner above its header row.
fn banner_sheet(rows: usize) -> Vec<RawRow> {
    let mut sheet = vec![
        positional(vec![CellValue::from("ACME Ltd payroll"), CellValue::Empty, CellValue::Empty]),
        positional(vec![
            CellValue::from("Staff No"),
            CellValue::from("Employee Name"),
            CellValue::from("Gross Pay"),
        ]),
    ];
    sheet.extend((0..rows).map(|i| {
        positional(vec![
            CellValue::from(format!("E{:05}", i)),
            CellValue::from(NAMES[i % NAMES.len()]),
            CellValue::from(format!("{},000", 40 + i % 50)),
        ])
    }));
    sheet
}

/// A sheet with no headers at all.
fn headerless_sheet(rows: usize) -> Vec<RawRow> {
    (0..rows)
        .map(|i| {
            positional(vec![
                CellValue::from(NAMES[i % NAMES.len()]),
                CellValue::from(format!("{:08}", 20_000_000 + i)),
                CellValue::from(format!("A{:09}Z", i)),
                CellValue::from(format!("{},000.00", 40 + i % 50)),
            ])
        })
        .collect()
}

/// Benchmark: each strategy at several sheet sizes.
fn bench_strategies(c: &mut Criterion) {
    let config = load_config();
    let pipeline = create_pipeline(&config);

    let sheets: [(&str, fn(usize) -> Vec<RawRow>); 3] = [
        ("header_mapping", headed_sheet),
        ("embedded_header", banner_sheet),
        ("pattern_match", headerless_sheet),
    ];

    for (name, build) in sheets {
        let mut group = c.benchmark_group(name);
        for row_count in [10usize, 100, 1_000] {
            let rows = build(row_count);
            group.throughput(Throughput::Elements(row_count as u64));
            group.bench_with_input(BenchmarkId::new("rows", row_count), &rows, |b, rows| {
                b.iter(|| black_box(pipeline.ingest("bench.xlsx", black_box(rows))))
            });
        }
        group.finish();
    }
}

/// Benchmark: deduction calculation with and without the audit trail.
fn bench_deductions(c: &mut Criterion) {
    let config = load_config();
    let ruleset = config.ruleset("2024-12-27").expect("shipped ruleset");
    let grosses: Vec<Decimal> = (0..1_000).map(|i| Decimal::new(1_500_000 + i * 25_000, 2)).collect();

    let mut group = c.benchmark_group("deductions");
    group.throughput(Throughput::Elements(grosses.len() as u64));

    group.bench_function("calculate_1000", |b| {
        b.iter(|| {
            for gross in &grosses {
                black_box(calculate(*gross, ruleset));
            }
        })
    });

    group.bench_function("calculate_with_audit_1000", |b| {
        b.iter(|| {
            for gross in &grosses {
                black_box(calculate_with_audit(*gross, ruleset));
            }
        })
    });

    group.finish();
}

/// Benchmark: HTTP round trip for a 100-row ingestion request.
fn bench_http_ingest(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(AppState::new(load_config()));
    let body = serde_json::json!({
        "source_name": "bench.xlsx",
        "ruleset_version": "2024-12-27",
        "rows": headed_sheet(100),
    })
    .to_string();

    c.bench_function("http_ingest_100_rows", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/ingest")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(benches, bench_strategies, bench_deductions, bench_http_ingest);
criterion_main!(benches);
