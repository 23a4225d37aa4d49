//! Lendledger Engine Benchmarks
//!
//! Critical paths:
//! - Installment schedule and early-payoff pricing
//! - Settlement split
//! - Full loan lifecycle through the engine

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lendledger_engine::loan::{days_used, schedule};
use lendledger_engine::{
    Address, Amount, EngineConfig, FeeBps, InMemoryEnvironment, LendingEngine, Loan, LoanId,
    LoanTerms,
};

const START: i64 = 1_700_000_000;

fn terms() -> LoanTerms {
    LoanTerms::new(Amount::new(1_000_000), Amount::new(85_000), 12)
}

// ============ PRICING BENCHMARKS ============

fn bench_pricing(c: &mut Criterion) {
    let mut group = c.benchmark_group("pricing");

    group.bench_function("schedule", |b| {
        let terms = terms();
        b.iter(|| schedule(black_box(&terms)))
    });

    let loan = Loan::originate(
        LoanId::FIRST,
        Address::new("lender"),
        Address::new("borrower"),
        terms(),
        START,
    )
    .unwrap_or_default();

    for days in [0i64, 10, 45].iter() {
        group.bench_with_input(BenchmarkId::new("early_payoff_quote", days), days, |b, &days| {
            let now = START + days * 86_400;
            b.iter(|| black_box(&loan).early_payoff_quote(black_box(now)))
        });
    }

    group.bench_function("days_used", |b| {
        b.iter(|| days_used(black_box(START), black_box(START + 1_234_567)))
    });

    group.finish();
}

// ============ SETTLEMENT BENCHMARKS ============

fn bench_settlement(c: &mut Criterion) {
    let mut group = c.benchmark_group("settlement");

    for bps in [0u16, 200, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("fee_apply", bps), bps, |b, &bps| {
            let fee = FeeBps::new(bps).unwrap_or_default();
            b.iter(|| fee.apply(black_box(Amount::new(85_000))))
        });
    }

    group.finish();
}

// ============ LIFECYCLE BENCHMARKS ============

fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");
    group.measurement_time(Duration::from_secs(10));
    group.throughput(Throughput::Elements(1));

    let env = InMemoryEnvironment::starting_at(START);
    let engine = Arc::new(LendingEngine::new(
        EngineConfig::new("admin"),
        env.collaborators(),
    ));
    let admin = Address::new("admin");
    let lender = Address::new("lender");
    let borrower = Address::new("borrower");
    engine.register_lender(&lender);
    engine.register_borrower(&borrower);

    group.bench_function("create_and_repay", |b| {
        b.iter(|| {
            engine
                .deposit(&lender, Amount::new(1_000_000))
                .and_then(|_| engine.create_loan(&admin, &lender, &borrower, terms()))
                .and_then(|loan_id| {
                    let installment = engine.get_loan(loan_id).installment_amount;
                    for _ in 0..12 {
                        engine.pay_installment(&borrower, loan_id, installment)?;
                    }
                    Ok(loan_id)
                })
        })
    });

    group.bench_function("create_and_pay_early", |b| {
        b.iter(|| {
            engine
                .deposit(&lender, Amount::new(1_000_000))
                .and_then(|_| engine.create_loan(&admin, &lender, &borrower, terms()))
                .and_then(|loan_id| {
                    let quote = engine.quote_early_payoff(loan_id)?;
                    engine.pay_early(&borrower, loan_id, quote.final_payment)
                })
        })
    });

    group.finish();
}

// ============ CRITERION CONFIGURATION ============

criterion_group!(pricing, bench_pricing, bench_settlement);

criterion_group!(lifecycle, bench_lifecycle);

criterion_main!(pricing, lifecycle);
