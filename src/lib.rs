//! Relaxation solver for the electrostatic potential inside a
//! parallel-plate capacitor.
//!
//! The grid is split row-wise across a fixed group of workers that share no
//! memory: every iteration the workers exchange ghost rows with their
//! row-adjacent neighbours, sweep their own partition, and agree on a global
//! convergence signal via a max-reduction. The message-passing substrate is
//! abstracted behind [`comm::Communicator`]; an in-process threaded backend
//! is always available and an MPI backend is provided behind the `mpi`
//! feature.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod boundary;
pub mod collect;
pub mod comm;
pub mod config;
pub mod error;
pub mod halo;
pub mod kernel;
pub mod partition;
pub mod serial;
pub mod solver;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use serial::solve_serial;
pub use solver::{solve, Solution};
pub use types::{ProcessTopology, SolveReport, SolveStatus, UpdateScheme};
