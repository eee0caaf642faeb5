use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::SmallRng};
use running_loops::models::{Coordinate, Distance};
use running_loops::planner::{project, seed_waypoints};

fn benchmark_seed_waypoints(c: &mut Criterion) {
    let mut group = c.benchmark_group("seed_waypoints");

    let test_cases = vec![
        ("new_york_2mi", Coordinate { lat: 40.7128, lon: -74.0060 }, Distance::imperial(2.0)),
        ("lyon_10km", Coordinate { lat: 45.7640, lon: 4.8357 }, Distance::metric(10.0)),
        ("oslo_marathon", Coordinate { lat: 59.9139, lon: 10.7522 }, Distance::metric(42.195)),
    ];

    for (name, origin, distance) in test_cases {
        let budget = distance.to_meters() / 2.0;
        let mut rng = SmallRng::seed_from_u64(42);

        group.bench_with_input(BenchmarkId::from_parameter(name), &budget, |b, budget| {
            b.iter(|| seed_waypoints(black_box(origin), black_box(*budget), &mut rng));
        });
    }

    group.finish();
}

fn benchmark_projection(c: &mut Criterion) {
    let origin = Coordinate { lat: 45.0, lon: 5.0 };
    c.bench_function("project", |b| {
        b.iter(|| project(black_box(origin), black_box(536.45), black_box(2.5)))
    });
}

criterion_group!(benches, benchmark_seed_waypoints, benchmark_projection);
criterion_main!(benches);
