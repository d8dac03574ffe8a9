//! Parser performance benchmarks.
//!
//! Run with: cargo bench -p ledgerscan-parser

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ledgerscan_parser::{parse_amount, parse_journal};

/// Generate a synthetic journal with N transactions.
fn generate_ledger(num_transactions: usize) -> String {
    let mut lines = vec![
        "; Generated journal".to_string(),
        "account Assets:Bank Checking ; type:asset".to_string(),
        "account Expenses:Food ; type:expense".to_string(),
        "account Expenses:Coffee ; type:expense".to_string(),
        "account Expenses:Groceries ; type:expense".to_string(),
        "account Expenses:Transport ; type:expense".to_string(),
        String::new(),
        "= /^Expenses:Food/".to_string(),
        "    (Budget:Food)  -1".to_string(),
        String::new(),
    ];

    let categories = ["Food", "Coffee", "Groceries", "Transport"];
    let payees = ["Store A", "Store B", "Cafe", "Gas Station", "Supermarket"];
    let mut day = 1;
    let mut month = 1;
    let mut year = 2024;

    for i in 0..num_transactions {
        let category = categories[i % categories.len()];
        let payee = payees[i % payees.len()];
        let amount = format!("{}.{:02}", 10 + i % 1000, i % 100);

        lines.push(format!("{year:04}/{month:02}/{day:02} * ({i}) {payee} ; auto"));
        if i % 3 == 0 {
            lines.push("    ; :generated:".to_string());
            lines.push(format!("    ; Receipt: {i}"));
        }
        lines.push(format!("    Expenses:{category}  ${amount}"));
        lines.push("    Assets:Bank Checking".to_string());
        lines.push(String::new());

        day += 1;
        if day > 28 {
            day = 1;
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
    }

    lines.join("\n")
}

fn bench_parse_small(c: &mut Criterion) {
    let ledger = generate_ledger(10);

    let mut group = c.benchmark_group("parse_small");
    group.throughput(Throughput::Bytes(ledger.len() as u64));

    group.bench_function("10_transactions", |b| {
        b.iter(|| parse_journal(black_box(&ledger)));
    });

    group.finish();
}

fn bench_parse_large(c: &mut Criterion) {
    let ledger = generate_ledger(1000);

    let mut group = c.benchmark_group("parse_large");
    group.throughput(Throughput::Bytes(ledger.len() as u64));

    group.bench_function("1000_transactions", |b| {
        b.iter(|| parse_journal(black_box(&ledger)));
    });

    group.finish();
}

fn bench_parse_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_scaling");

    for size in [10, 50, 100, 500, 1000] {
        let ledger = generate_ledger(size);
        group.throughput(Throughput::Bytes(ledger.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &ledger, |b, ledger| {
            b.iter(|| parse_journal(black_box(ledger)));
        });
    }

    group.finish();
}

fn bench_parse_amount(c: &mut Criterion) {
    let inputs = ["$4.50", "-$1,234,567.89", "100 EUR", "1,234.56", "USD -12.5"];

    c.bench_function("parse_amount", |b| {
        b.iter(|| {
            for input in inputs {
                let _ = parse_amount(black_box(input));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_parse_small,
    bench_parse_large,
    bench_parse_scaling,
    bench_parse_amount
);
criterion_main!(benches);
