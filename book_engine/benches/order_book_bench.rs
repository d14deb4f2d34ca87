// Benchmarks for order book operations
//
// Tests:
// - add_order latency, flat and at increasing book depth
// - amend_order latency (qty-only vs. reprice)
// - cancel_order latency at increasing book depth
// - top-of-book / is_cross lookup at increasing depth
// - mixed add/amend/cancel workload

use book_engine::{AddOutcome, OrderBook};
use common::{Price, Side};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn px(v: f64) -> Price {
    Price::from_f64(v).unwrap()
}

fn populate(depth: u32) -> OrderBook {
    let mut book = OrderBook::new();
    for i in 1..=depth {
        let side = if i % 2 == 0 { Side::Bid } else { Side::Ask };
        let price = if side == Side::Bid { 100.0 - (i as f64) * 0.01 } else { 100.0 + (i as f64) * 0.01 };
        book.add_order(i, side, 100, px(price));
    }
    book
}

fn bench_add_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_book_add");

    group.bench_function("add_single_order", |b| {
        b.iter_batched(
            OrderBook::new,
            |mut book| {
                let result = book.add_order(black_box(1), black_box(Side::Bid), black_box(100), black_box(px(100.50)));
                black_box(result);
            },
            criterion::BatchSize::SmallInput,
        );
    });

    for depth in [10u32, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("add_at_book_depth", depth), depth, |b, &depth| {
            b.iter_batched(
                || populate(depth),
                |mut book| {
                    let result = book.add_order(black_box(depth + 1), black_box(Side::Bid), black_box(100), black_box(px(100.50)));
                    black_box(result);
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_add_same_price_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_book_add_same_level");

    for depth in [10u32, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("add_to_existing_fifo", depth), depth, |b, &depth| {
            b.iter_batched(
                || {
                    let mut book = OrderBook::new();
                    for i in 1..=depth {
                        book.add_order(i, Side::Bid, 10, px(100.0));
                    }
                    book
                },
                |mut book| {
                    let result = book.add_order(black_box(depth + 1), black_box(Side::Bid), black_box(10), black_box(px(100.0)));
                    black_box(result);
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_amend_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_book_amend");

    group.bench_function("amend_qty_only", |b| {
        let mut book = OrderBook::new();
        book.add_order(1, Side::Bid, 100, px(100.0));
        let mut qty = 100u32;
        b.iter(|| {
            qty = qty.wrapping_add(1).max(1);
            let result = book.amend_order(black_box(1), black_box(Side::Bid), black_box(qty), black_box(px(100.0)));
            black_box(result);
        });
    });

    group.bench_function("amend_reprice", |b| {
        let mut book = OrderBook::new();
        book.add_order(1, Side::Bid, 100, px(100.0));
        let mut toggle = false;
        b.iter(|| {
            let price = if toggle { px(100.0) } else { px(99.0) };
            toggle = !toggle;
            let result = book.amend_order(black_box(1), black_box(Side::Bid), black_box(100), black_box(price));
            black_box(result);
        });
    });

    group.finish();
}

fn bench_cancel_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_book_cancel");

    for depth in [10u32, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("cancel_at_book_depth", depth), depth, |b, &depth| {
            b.iter_batched(
                || populate(depth),
                |mut book| {
                    let result = book.cancel_order(black_box(1));
                    black_box(result);
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_tob_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_book_tob");

    for depth in [10u32, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("tob_at_book_depth", depth), depth, |b, &depth| {
            let book = populate(depth);
            b.iter(|| {
                black_box(book.tob(black_box(Side::Bid)));
                black_box(book.tob(black_box(Side::Ask)));
                black_box(book.is_cross());
            });
        });
    }

    group.finish();
}

fn bench_mixed_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_book_mixed");

    group.bench_function("add_amend_cancel_70_20_10", |b| {
        b.iter_batched(
            || populate(200),
            |mut book| {
                let mut next_id = 201u32;
                for i in 0..100u32 {
                    match i % 10 {
                        0 => {
                            let result = book.cancel_order(black_box(i + 1));
                            black_box(result);
                        }
                        1 | 2 => {
                            let result = book.amend_order(black_box(i + 2), black_box(Side::Bid), black_box(150), black_box(px(100.0)));
                            black_box(result);
                        }
                        _ => {
                            let result = book.add_order(black_box(next_id), black_box(Side::Bid), black_box(100), black_box(px(100.50)));
                            black_box(result);
                            next_id += 1;
                        }
                    }
                }
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_duplicate_rejection(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_book_duplicate");

    group.bench_function("add_duplicate_id", |b| {
        let mut book = OrderBook::new();
        book.add_order(1, Side::Bid, 100, px(100.0));
        b.iter(|| {
            let result = book.add_order(black_box(1), black_box(Side::Bid), black_box(100), black_box(px(100.0)));
            black_box(result == AddOutcome::DuplicateOrder);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_add_order,
    bench_add_same_price_level,
    bench_amend_order,
    bench_cancel_order,
    bench_tob_lookup,
    bench_mixed_workload,
    bench_duplicate_rejection,
);
criterion_main!(benches);
