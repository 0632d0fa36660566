//! Metadata benchmarks
//!
//! - Run-name parsing
//! - Well-number lookup over growing plates (re-scans the dataset per call)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use uncle_db::container::{MemoryContainer, UniFile};
use uncle_db::metadata::parse_run_name;

fn bench_parse_run_name(c: &mut Criterion) {
    c.bench_function("parse_run_name", |b| {
        b.iter(|| parse_run_name(black_box("210607-01-T4 RNA Ligase-Gen006L")).unwrap());
    });
}

/// Wells named A1..H12 in row-major order
fn plate(wells: usize) -> Vec<(String, String)> {
    (0..wells)
        .map(|i| {
            let label = format!("{}{}", char::from(b'A' + u8::try_from(i % 8).unwrap()), i / 8 + 1);
            let sample = format!("0.1 mg/ml Uni {label}");
            (label, sample)
        })
        .collect()
}

fn bench_well_number(c: &mut Criterion) {
    let mut group = c.benchmark_group("well_number");

    for wells in [16, 48, 96] {
        let rows = plate(wells);
        let samples: Vec<(&str, &str)> = rows.iter().map(|(w, s)| (w.as_str(), s.as_str())).collect();
        let file = UniFile::new(MemoryContainer::uncle_run("210602-01-Seq1 Cas9-pH003R", &samples));
        let last = rows[wells - 1].0.clone();

        group.bench_with_input(BenchmarkId::from_parameter(wells), &last, |b, label| {
            b.iter(|| file.well_number(black_box(label)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_run_name, bench_well_number);
criterion_main!(benches);
