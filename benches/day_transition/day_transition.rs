use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use epigrid::allocation::AllocationTracker;
use epigrid::parameters::Parameters;
use epigrid::simulation::Simulation;
use epigrid::snapshot::NullSink;

static ALPHA: f64 = 0.01;
static OMEGA: u32 = 7;
static DAYS: usize = 30;

fn seeded_simulation(threads: usize, tracker: &AllocationTracker) -> Simulation {
    let parameters = Parameters::new(threads, ALPHA, 0.0, OMEGA, DAYS);
    let mut simulation =
        Simulation::new(parameters, tracker).expect("failed to create simulation");
    simulation.initialize();
    simulation
}

fn full_run() -> Simulation {
    let tracker = AllocationTracker::new();
    let parameters = Parameters::new(4, ALPHA, 0.0, OMEGA, DAYS);
    let mut simulation =
        Simulation::new(parameters, &tracker).expect("failed to create simulation");
    simulation
        .run(&mut NullSink, |_| Ok(()))
        .expect("simulation failed");
    simulation
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("day transition 500x500");
    for threads in [1, 2, 4, 8] {
        let tracker = AllocationTracker::new();
        let mut simulation = seeded_simulation(threads, &tracker);
        group.bench_with_input(
            BenchmarkId::from_parameter(threads),
            &threads,
            |bencher, _| bencher.iter(|| simulation.step()),
        );
    }
    group.finish();

    c.bench_function("full run 30 days", |bencher| {
        bencher.iter_with_large_drop(full_run)
    });
}

criterion_group!(transition_benches, criterion_benchmark);
criterion_main!(transition_benches);
