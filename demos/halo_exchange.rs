// Runs a small 2-D scalar wave on a decomposed grid and prints the field
// range every few steps.
//
// Without features the ranks are threads of this process:
//     cargo run --example halo_exchange
// With MPI every process is one rank:
//     mpirun -n 4 cargo run --features mpi-support --example halo_exchange
use parallel_grid::prelude::*;

const STEPS: usize = 40;
const COURANT_SQ: f64 = 0.25;

fn config() -> GridConfig {
    GridConfig::new(Coord::new2(64, 48), Coord::new2(1, 1), AxisSet::XY)
        .with_time_levels(TimeLevels::Three)
}

fn seed<C: Communicator>(pg: &mut ParallelGrid<f64, C>) -> Result<(), GridError> {
    let centre = Coord::new2(32, 24);
    if let Some(local) = pg.to_local(&centre)? {
        let cell = pg.grid_mut()?.get_mut(&local)?;
        cell.set_current(1.0);
        cell.set_previous(1.0);
    }
    Ok(())
}

/// Leapfrog update of every owned cell from the previous two levels.
fn step<C: Communicator>(pg: &mut ParallelGrid<f64, C>) -> Result<(), GridError> {
    let halo = pg.config().halo();
    let owned = pg.owned_size()?;
    let grid = pg.grid()?;
    let prev = |x: usize, y: usize| -> Result<f64, GridError> {
        Ok(grid.get(&Coord::new2(x, y))?.previous().unwrap_or_default())
    };
    let mut next = Vec::with_capacity(owned.volume());
    for x in halo.x()..halo.x() + owned.x() {
        for y in halo.y()..halo.y() + owned.y() {
            let here = prev(x, y)?;
            let lap = prev(x - 1, y)? + prev(x + 1, y)? + prev(x, y - 1)? + prev(x, y + 1)?
                - 4.0 * here;
            let before = grid.get(&Coord::new2(x, y))?.previous_previous().unwrap_or_default();
            next.push((Coord::new2(x, y), 2.0 * here - before + COURANT_SQ * lap));
        }
    }
    let grid = pg.grid_mut()?;
    for (c, v) in next {
        grid.get_mut(&c)?.set_current(v);
    }
    Ok(())
}

fn run<C: Communicator>(comm: C) -> Result<(), GridError> {
    let mut pg = ParallelGrid::<f64, C>::new(config(), comm)?;
    if !pg.is_active() {
        for _ in 0..STEPS {
            pg.share()?;
        }
        return Ok(());
    }
    seed(&mut pg)?;
    for n in 0..STEPS {
        pg.shift_in_time()?;
        pg.share()?;
        step(&mut pg)?;
        if n % 10 == 0 {
            if let Some(r) = pg.value_range(0) {
                println!(
                    "rank {} step {n}: [{:.4}, {:.4}]",
                    pg.comm().rank(),
                    r.min_re,
                    r.max_re
                );
            }
        }
    }
    let stats = pg.buffer_stats();
    println!(
        "rank {} done: {} directions, {} buffered samples",
        pg.comm().rank(),
        stats.directions,
        stats.elements
    );
    Ok(())
}

#[cfg(not(feature = "mpi-support"))]
fn main() {
    let ranks = 4;
    let results: Vec<Result<(), GridError>> = std::thread::scope(|s| {
        let handles: Vec<_> = ThreadComm::world(ranks)
            .into_iter()
            .map(|comm| s.spawn(move || run(comm)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread panicked"))
            .collect()
    });
    for (rank, r) in results.into_iter().enumerate() {
        if let Err(e) = r {
            eprintln!("rank {rank}: {e}");
            std::process::abort();
        }
    }
}

#[cfg(feature = "mpi-support")]
fn main() {
    let (_universe, comm) = match MpiComm::init() {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("{e}");
            std::process::abort();
        }
    };
    if let Err(e) = run(comm) {
        eprintln!("{e}");
        std::process::abort();
    }
}
