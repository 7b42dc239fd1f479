use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use contend_core::scheduler::compressed::CompressedScheduler;
use contend_core::scheduler::greedy::GreedyScheduler;
use contend_core::scheduler::tournament::TournamentScheduler;
use contend_core::scheduler::Scheduler;
use contend_core::set::ExactSet;
use contend_core::signature::parallel::ParallelFamily;
use contend_core::transaction::Transaction;

/// Build `n` transactions, each touching a disjoint pair of objects so every
/// transaction is mutually compatible -- the worst case for the schedulers
/// (no early rejection, every merge goes through).
fn disjoint_batch(n: u64) -> Vec<Transaction<ExactSet>> {
    (0..n)
        .map(|id| Transaction::singleton(id, ExactSet::from_iter([2 * id]), ExactSet::from_iter([2 * id + 1])))
        .collect()
}

/// Build `n` transactions all writing the same hot object, so only the
/// first one is ever selected -- exercises the early-reject path.
fn contended_batch(n: u64) -> Vec<Transaction<ExactSet>> {
    (0..n).map(|id| Transaction::singleton(id, ExactSet::new(), ExactSet::from_iter([0]))).collect()
}

fn bench_schedulers(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler");

    for &n in &[16u64, 256, 4096] {
        let disjoint = disjoint_batch(n);
        let contended = contended_batch(n);

        group.bench_function(format!("greedy_disjoint_{n}"), |b| {
            b.iter(|| GreedyScheduler.schedule(black_box(disjoint.clone())))
        });
        group.bench_function(format!("greedy_contended_{n}"), |b| {
            b.iter(|| GreedyScheduler.schedule(black_box(contended.clone())))
        });
        group.bench_function(format!("tournament_disjoint_{n}"), |b| {
            b.iter(|| TournamentScheduler.schedule(black_box(disjoint.clone())))
        });
        group.bench_function(format!("tournament_contended_{n}"), |b| {
            b.iter(|| TournamentScheduler.schedule(black_box(contended.clone())))
        });

        let family = ParallelFamily::new(4096, 4, 0xC0FFEE);
        group.bench_function(format!("compressed_greedy_disjoint_{n}"), |b| {
            let scheduler = CompressedScheduler::new(GreedyScheduler, family.clone());
            b.iter(|| scheduler.schedule(black_box(disjoint.clone())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_schedulers);
criterion_main!(benches);
