//? mpirun -n {{NPROCESSES}} --features "mpi"

#[cfg(feature = "mpi")]
fn main() {
    use std::io::Write;
    use std::time::Instant;

    use mpi::traits::{Communicator, CommunicatorCollectives};

    use capacitor::comm::mpi::MpiComm;
    use capacitor::{collect, solve, Config, UpdateScheme};

    env_logger::init();

    let universe = mpi::initialize().unwrap();
    let world = universe.world();
    let comm = MpiComm::new(&world);

    let config = Config::new(10, 1.0, -1.0, 0.8, 1e-4);
    // Start the clock only once every rank is up.
    world.barrier();
    let started = Instant::now();
    let solution = solve(&comm, &config, UpdateScheme::InPlace).unwrap();
    let grid = collect::gather(&comm, &config, &solution.partition).unwrap();

    if let Some(grid) = grid {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        collect::write_grid(&grid, config.cols(), &mut out).unwrap();
        out.flush().unwrap();
        eprintln!(
            "{} ranks, {} iterations, final delta {:e}, {:.3?} elapsed",
            world.size(),
            solution.report.iterations,
            solution.report.global_delta,
            started.elapsed()
        );
    }
}

#[cfg(not(feature = "mpi"))]
fn main() {}
