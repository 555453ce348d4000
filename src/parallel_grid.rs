//! `ParallelGrid`: one rank's share of a domain-decomposed field grid.
//!
//! Construction decomposes the global grid, builds and validates the halo
//! plan and allocates the transfer buffers. After that the solver updates
//! owned cells through [`ParallelGrid::grid_mut`] and calls
//! [`ParallelGrid::share`] once per time step to refresh the halos.
//!
//! Ranks beyond the process-mesh volume are inactive: they own no cells,
//! skip the exchange and only join the closing barrier.

use crate::algs::communicator::Communicator;
use crate::config::GridConfig;
use crate::data::field_value::FieldPointValue;
use crate::data::grid::{Grid, ValueRange};
use crate::data::sample::Sample;
use crate::grid_error::GridError;
use crate::halo::buffers::BufferStats;
use crate::halo::exchange::HaloExchange;
use crate::halo::plan::HaloPlan;
use crate::topology::coord::Coord;
use crate::topology::decomposition::{Decomposition, decompose};
use crate::topology::mesh::ProcessMesh;

#[derive(Clone, Debug)]
struct Active<T> {
    decomposition: Decomposition,
    exchange: HaloExchange<T>,
    grid: Grid<T>,
}

/// Distributed grid seen from one rank.
#[derive(Debug)]
pub struct ParallelGrid<T, C> {
    config: GridConfig,
    comm: C,
    mesh: ProcessMesh,
    active: Option<Active<T>>,
}

impl<T: Sample, C: Communicator> ParallelGrid<T, C> {
    /// Set up this rank's part of the grid.
    ///
    /// # Errors
    /// Any configuration error, or a plan that fails validation.
    pub fn new(config: GridConfig, comm: C) -> Result<Self, GridError> {
        config.validate()?;
        let mesh = config.process_mesh(comm.size())?;
        let halo = config.halo();
        let id = comm.rank();

        let active = match decompose(&config.global_size, &mesh, &halo, id)? {
            None => {
                log::info!(
                    "rank {id} is inactive: process mesh {} uses {} of {} ranks",
                    mesh.shape(),
                    mesh.volume(),
                    comm.size()
                );
                None
            }
            Some(decomposition) => {
                let plan = HaloPlan::build(&decomposition, &mesh, &halo, config.time_levels)?;
                let exchange = HaloExchange::new(plan);
                let grid = Grid::new(exchange.plan().extended(), config.time_levels);
                let stats = exchange.stats();
                log::debug!(
                    "rank {id} at {} of mesh {}: owned {} from {}, extended {}, \
                     {} directions buffered ({} samples)",
                    decomposition.position,
                    mesh.shape(),
                    decomposition.owned,
                    decomposition.origin,
                    grid.size(),
                    stats.directions,
                    stats.elements
                );
                Some(Active {
                    decomposition,
                    exchange,
                    grid,
                })
            }
        };

        Ok(ParallelGrid {
            config,
            comm,
            mesh,
            active,
        })
    }

    #[inline]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[inline]
    pub fn comm(&self) -> &C {
        &self.comm
    }

    #[inline]
    pub fn mesh(&self) -> &ProcessMesh {
        &self.mesh
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn active(&self) -> Result<&Active<T>, GridError> {
        self.active.as_ref().ok_or(GridError::InactiveRank {
            rank: self.comm.rank(),
            volume: self.mesh.volume(),
        })
    }

    fn active_mut(&mut self) -> Result<&mut Active<T>, GridError> {
        let (rank, volume) = (self.comm.rank(), self.mesh.volume());
        self.active
            .as_mut()
            .ok_or(GridError::InactiveRank { rank, volume })
    }

    pub fn decomposition(&self) -> Option<&Decomposition> {
        self.active.as_ref().map(|a| &a.decomposition)
    }

    pub fn plan(&self) -> Result<&HaloPlan, GridError> {
        Ok(self.active()?.exchange.plan())
    }

    pub fn buffer_stats(&self) -> BufferStats {
        self.active
            .as_ref()
            .map(|a| a.exchange.stats())
            .unwrap_or_default()
    }

    pub fn grid(&self) -> Result<&Grid<T>, GridError> {
        Ok(&self.active()?.grid)
    }

    pub fn grid_mut(&mut self) -> Result<&mut Grid<T>, GridError> {
        Ok(&mut self.active_mut()?.grid)
    }

    #[inline]
    pub fn global_size(&self) -> Coord {
        self.config.global_size
    }

    pub fn owned_size(&self) -> Result<Coord, GridError> {
        Ok(self.active()?.decomposition.owned)
    }

    /// Owned size plus the halo on both sides.
    pub fn extended_size(&self) -> Result<Coord, GridError> {
        Ok(self.active()?.grid.size())
    }

    /// Value at a local (extended) coordinate.
    pub fn get(&self, local: &Coord) -> Result<&FieldPointValue<T>, GridError> {
        self.active()?.grid.get(local)
    }

    /// Replace the value at a local (extended) coordinate.
    pub fn set(&mut self, local: &Coord, value: FieldPointValue<T>) -> Result<(), GridError> {
        self.active_mut()?.grid.set(local, value)
    }

    /// Global coordinate of a local cell, `None` when the cell lies in a halo
    /// outside the global domain.
    pub fn to_global(&self, local: &Coord) -> Result<Option<Coord>, GridError> {
        let a = self.active()?;
        if !local.is_inside(&a.grid.size()) {
            return Err(GridError::OutOfBounds {
                coord: *local,
                size: a.grid.size(),
            });
        }
        let shifted = local.try_add(&a.decomposition.origin)?;
        Ok(shifted
            .checked_sub(&self.config.halo())
            .filter(|g| g.is_inside(&self.config.global_size)))
    }

    /// Local coordinate of a global cell, `None` when this rank holds no copy
    /// of it (neither owned nor in a halo).
    pub fn to_local(&self, global: &Coord) -> Result<Option<Coord>, GridError> {
        let a = self.active()?;
        let shifted = global.try_add(&self.config.halo())?;
        Ok(shifted
            .checked_sub(&a.decomposition.origin)
            .filter(|l| l.is_inside(&a.grid.size())))
    }

    /// `true` when this rank owns the global cell.
    pub fn is_owned(&self, global: &Coord) -> bool {
        self.active.as_ref().is_some_and(|a| {
            global
                .checked_sub(&a.decomposition.origin)
                .is_some_and(|o| o.is_inside(&a.decomposition.owned))
        })
    }

    /// Refresh every halo from the neighbouring ranks, then wait for all
    /// ranks at a barrier. Inactive ranks only take part in the barrier.
    ///
    /// # Errors
    /// A failed transfer returns before the barrier. The other ranks are
    /// then left waiting on this one, so the caller must abort the whole
    /// run rather than retry or carry on.
    pub fn share(&mut self) -> Result<(), GridError> {
        if let Some(a) = self.active.as_mut() {
            if let Err(e) = a.exchange.exchange(&mut a.grid, &self.comm) {
                log::error!("rank {}: halo exchange failed: {e}", self.comm.rank());
                return Err(e);
            }
        }
        self.comm.barrier();
        Ok(())
    }

    /// Move every cell one time level back and count the step.
    pub fn shift_in_time(&mut self) -> Result<(), GridError> {
        self.active_mut()?.grid.shift_in_time();
        Ok(())
    }

    /// Number of completed time steps.
    pub fn time_step(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.grid.time_step())
    }

    /// Range of this rank's values at `level`.
    pub fn value_range(&self, level: usize) -> Option<ValueRange> {
        self.active.as_ref().and_then(|a| a.grid.value_range(level))
    }
}
