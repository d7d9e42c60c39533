//! Solve the capacitor grid on a group of in-process workers and print the
//! potential to stdout.

use std::io::Write;
use std::process::exit;
use std::time::Instant;

use clap::{Parser, ValueEnum};

use capacitor::comm::threaded;
use capacitor::{collect, solve, Config, SolveReport, UpdateScheme};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchemeArg {
    /// Update cells in place during the sweep (Gauss-Seidel).
    InPlace,
    /// Sweep into a back buffer and swap (Jacobi).
    Buffered,
}

impl From<SchemeArg> for UpdateScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::InPlace => UpdateScheme::InPlace,
            SchemeArg::Buffered => UpdateScheme::Buffered,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputArg {
    /// Assemble the grid on the root worker, then print it.
    Gather,
    /// Workers print their own rows in turn, passing a token.
    Token,
}

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Grid scale factor; the grid is 10*factor rows by 10*factor+1 columns.
    #[arg(long, default_value_t = 10)]
    factor: usize,

    /// Potential of the left plate.
    #[arg(long, allow_negative_numbers = true, default_value_t = 1.0)]
    v1: f64,

    /// Potential of the right plate.
    #[arg(long, allow_negative_numbers = true, default_value_t = -1.0)]
    v2: f64,

    /// Relaxation parameter.
    #[arg(long, allow_negative_numbers = true, default_value_t = 0.8)]
    omega: f64,

    /// Convergence tolerance on the global max delta.
    #[arg(long, default_value_t = 1e-4)]
    tolerance: f64,

    /// Number of worker threads.
    #[arg(short = 'n', long, default_value_t = 4)]
    workers: usize,

    /// Update discipline of the sweep.
    #[arg(long, value_enum, default_value_t = SchemeArg::InPlace)]
    scheme: SchemeArg,

    /// How the result reaches stdout.
    #[arg(long, value_enum, default_value_t = OutputArg::Gather)]
    output: OutputArg,
}

fn run(cli: &Cli) -> capacitor::Result<SolveReport<f64>> {
    let config = Config::new(cli.factor, cli.v1, cli.v2, cli.omega, cli.tolerance);
    config.validate()?;
    if cli.workers == 0 || cli.workers > config.rows() {
        return Err(capacitor::Error::InvalidPartition {
            rows: config.rows(),
            workers: cli.workers,
            msg: "worker count must be between 1 and the grid row count".to_string(),
        });
    }
    let scheme = UpdateScheme::from(cli.scheme);
    let output = cli.output;

    let results = threaded::run_group(cli.workers, |comm| -> capacitor::Result<SolveReport<f64>> {
        let solution = solve(&comm, &config, scheme)?;
        match output {
            OutputArg::Gather => {
                if let Some(grid) = collect::gather(&comm, &config, &solution.partition)? {
                    let stdout = std::io::stdout();
                    let mut out = stdout.lock();
                    collect::write_grid(&grid, config.cols(), &mut out)?;
                    out.flush()?;
                }
            }
            OutputArg::Token => {
                // Each worker takes the stdout lock per write while it holds
                // the token; holding the lock across the ring would deadlock.
                collect::write_ordered(
                    &comm,
                    &solution.topology,
                    &solution.partition,
                    &mut std::io::stdout(),
                )?;
            }
        }
        Ok(solution.report)
    });

    let mut report = None;
    for result in results {
        report = Some(result?);
    }
    Ok(report.expect("at least one worker ran"))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let started = Instant::now();
    match run(&cli) {
        Ok(report) => {
            eprintln!(
                "{} workers, {} iterations, final delta {:e}, {:.3?} elapsed",
                cli.workers,
                report.iterations,
                report.global_delta,
                started.elapsed()
            );
            if !report.converged() {
                eprintln!("run diverged; the printed grid is partial");
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            exit(1);
        }
    }
}
