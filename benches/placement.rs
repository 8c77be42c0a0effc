//! Benchmarks for placement policies, coalescing and compaction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use partition_sim::{PlacementPolicy, Simulation};

fn simulation(policy: PlacementPolicy) -> Simulation {
    Simulation::builder()
        .total_memory(1_000_000)
        .policy(policy)
        .build()
        .unwrap()
}

/// Memory carved into 1000 jobs with every other one freed
fn fragmented(policy: PlacementPolicy) -> Simulation {
    let mut sim = simulation(policy);
    for i in 0..1000u64 {
        sim.allocate(&format!("J{}", i), 500 + (i % 7) * 50).unwrap();
    }
    for i in (0..1000).step_by(2) {
        sim.deallocate(&format!("J{}", i)).unwrap();
    }
    sim
}

fn restore(sim: &Simulation) -> Simulation {
    Simulation::from_snapshot(sim.snapshot().clone(), sim.cursor(), sim.policy()).unwrap()
}

/// Benchmark filling an empty address space
fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_1000_jobs");

    for policy in PlacementPolicy::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(policy), &policy, |b, &policy| {
            b.iter(|| {
                let mut sim = simulation(policy);
                for i in 0..1000 {
                    sim.allocate(&format!("J{}", i), 1000).unwrap();
                }
                black_box(sim.cursor());
            });
        });
    }

    group.finish();
}

/// Benchmark allocation + free cycles on a fragmented space
fn bench_alloc_free_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc_free_cycle");

    for policy in PlacementPolicy::ALL {
        let base = fragmented(policy);
        group.bench_with_input(BenchmarkId::from_parameter(policy), &policy, |b, _| {
            b.iter(|| {
                let mut sim = restore(&base);
                for i in 0..50 {
                    let job = format!("R{}", i);
                    if sim.allocate(&job, 400).is_ok() {
                        sim.deallocate(&job).unwrap();
                    }
                }
                black_box(sim.fragmentation());
            });
        });
    }

    group.finish();
}

/// Benchmark compaction of a fragmented space
fn bench_compact(c: &mut Criterion) {
    let base = fragmented(PlacementPolicy::FirstFit);

    c.bench_function("compact_500_jobs", |b| {
        b.iter(|| {
            let mut sim = restore(&base);
            black_box(sim.compact().jobs_moved);
        });
    });
}

/// Benchmark fragmentation metric calculation
fn bench_fragmentation(c: &mut Criterion) {
    let sim = fragmented(PlacementPolicy::FirstFit);

    c.bench_function("fragmentation_500_holes", |b| {
        b.iter(|| black_box(sim.fragmentation()));
    });
}

criterion_group!(
    benches,
    bench_fill,
    bench_alloc_free_cycle,
    bench_compact,
    bench_fragmentation
);
criterion_main!(benches);
