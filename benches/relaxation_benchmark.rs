use capacitor::comm::threaded::run_group;
use capacitor::{solve, solve_serial, Config, UpdateScheme};
use criterion::{criterion_group, criterion_main, Criterion};

pub fn serial_solve(c: &mut Criterion) {
    let config = Config::new(4, 1.0, -1.0, 0.8, 1e-3);
    c.bench_function("serial in-place", |b| {
        b.iter(|| solve_serial(&config, UpdateScheme::InPlace).unwrap())
    });
    c.bench_function("serial buffered", |b| {
        b.iter(|| solve_serial(&config, UpdateScheme::Buffered).unwrap())
    });
}

pub fn threaded_solve(c: &mut Criterion) {
    let config = Config::new(4, 1.0, -1.0, 0.8, 1e-3);
    c.bench_function("threaded in-place 4 workers", |b| {
        b.iter(|| {
            run_group::<f64, _, _>(4, |comm| {
                solve(&comm, &config, UpdateScheme::InPlace).unwrap().report
            })
        })
    });
}

criterion_group!(benches, serial_solve, threaded_solve);
criterion_main!(benches);
