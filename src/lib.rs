#![cfg_attr(docsrs, feature(doc_cfg))]
//! # parallel-grid
//!
//! Distributed, domain-decomposed field grids for finite-difference
//! time-domain solvers. Every rank owns a rectangular block of a global 1-D,
//! 2-D or 3-D grid plus a halo of ghost cells mirroring its neighbours' data,
//! and refreshes that halo once per time step.
//!
//! ## Features
//! - Decomposition along any non-empty subset of the grid axes, with an
//!   explicit or automatically chosen process mesh
//! - Face, edge and corner neighbours (up to 26 in 3-D), each with its own
//!   send/receive window and transfer buffer
//! - Up to three retained time levels per cell, exchanged together
//! - Pluggable communication backends: single process, in-process threads
//!   (for tests) and MPI (`mpi-support` feature)
//!
//! ## Usage
//!
//! ```
//! use parallel_grid::prelude::*;
//!
//! let config = GridConfig::new(Coord::new2(32, 32), Coord::new2(1, 1), AxisSet::XY);
//! let mut grid = ParallelGrid::<f64, _>::new(config, NoComm)?;
//! grid.grid_mut()?.get_mut(&Coord::new2(1, 1))?.set_current(1.0);
//! grid.share()?;
//! # Ok::<(), GridError>(())
//! ```
//!
//! ## Exchange protocol
//!
//! Directions are visited in one fixed order on every rank. A direction that
//! only sends issues a blocking send, one that only receives a blocking
//! receive and one that does both a combined send-receive. Messages are
//! tagged with the sender's rank, and every round ends with a barrier.

pub mod algs;
pub mod config;
pub mod data;
pub mod debug_invariants;
pub mod grid_error;
pub mod halo;
pub mod parallel_grid;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{Communicator, NoComm, ThreadComm};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::config::{GridConfig, MeshShape};
    pub use crate::data::field_value::{FieldPointValue, TimeLevels};
    pub use crate::data::grid::{Grid, ValueRange};
    pub use crate::data::sample::Sample;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::grid_error::GridError;
    pub use crate::halo::plan::HaloPlan;
    pub use crate::parallel_grid::ParallelGrid;
    pub use crate::topology::coord::{Axis, AxisSet, Coord};
    pub use crate::topology::direction::Direction;
    pub use crate::topology::mesh::ProcessMesh;
}
