use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flowzi_core::{financial_overview, OverviewInputs, SummaryService};
use flowzi_domain::{default_profiles, Goal, Transaction, TransactionType, UserSettings};

fn sample_transactions(count: usize) -> Vec<Transaction> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let categories = ["Rent", "Food", "Dining Out", "Transport", "Trip", "Salary"];
    (0..count)
        .map(|idx| {
            let category = categories[idx % categories.len()];
            let date = start + Duration::days((idx % 365) as i64);
            let (amount, kind) = match category {
                "Salary" => (2500.0, TransactionType::Miscellaneous),
                "Trip" => (40.0 + (idx % 10) as f64, TransactionType::SideIncome),
                "Rent" => (-900.0, TransactionType::RegularExpense),
                _ => (-(10.0 + (idx % 90) as f64), TransactionType::Miscellaneous),
            };
            Transaction::new(category, amount, date, kind).with_id(format!("t{idx}"))
        })
        .collect()
}

fn bench_aggregation(c: &mut Criterion) {
    let transactions = sample_transactions(10_000);
    let goals: Vec<Goal> = ["Trip", "Car", "Laptop"]
        .iter()
        .enumerate()
        .map(|(idx, name)| Goal::new(*name, 5_000.0, 12).with_id(format!("g{idx}")))
        .collect();
    let profiles = default_profiles();
    let settings = UserSettings {
        monthly_income: 4_000.0,
        ..UserSettings::default()
    };

    c.bench_function("aggregate_10k", |b| {
        b.iter(|| SummaryService::aggregate(black_box(&transactions), 4_000.0))
    });

    c.bench_function("financial_overview_10k", |b| {
        b.iter(|| {
            let overview = financial_overview(&OverviewInputs {
                transactions: black_box(&transactions),
                goals: &goals,
                bills: &[],
                settings: Some(&settings),
                profiles: &profiles,
            });
            black_box(overview);
        })
    });
}

criterion_group!(benches, bench_aggregation);
criterion_main!(benches);
