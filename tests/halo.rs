//! Ghost-row exchange over the threaded communicator.

use capacitor::comm::threaded::run_group;
use capacitor::comm::Communicator;
use capacitor::halo;
use capacitor::partition::LocalPartition;
use capacitor::types::ProcessTopology;

fn exchange_once(size: usize) {
    let rows = 10;
    let cols = 11;
    run_group::<f64, _, _>(size, |comm| {
        let topology = ProcessTopology::new(comm.rank(), comm.size());
        let mut partition = LocalPartition::new(rows, cols, &topology).unwrap();
        // Every cell of an owned row carries its absolute row index.
        for local in 0..partition.local_rows() {
            let row = partition.range().start + local;
            for col in 0..cols {
                partition.set(local, col, row as f64);
            }
        }

        halo::exchange(&comm, &topology, &mut partition).unwrap();

        if let Some(ghost) = partition.ghost_top_row() {
            let above = partition.range().start - 1;
            assert!(ghost.iter().all(|&v| v == above as f64));
        }
        if let Some(ghost) = partition.ghost_bottom_row() {
            let below = partition.range().end();
            assert!(ghost.iter().all(|&v| v == below as f64));
        }
    });
}

#[test]
fn ghosts_mirror_the_adjacent_rows_two_workers() {
    exchange_once(2);
}

#[test]
fn ghosts_mirror_the_adjacent_rows_three_workers() {
    exchange_once(3);
}

#[test]
fn single_worker_exchanges_nothing() {
    exchange_once(1);
}
