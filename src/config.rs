//! Run configuration for a distributed grid.

use crate::data::field_value::TimeLevels;
use crate::grid_error::GridError;
use crate::topology::coord::{AxisSet, Coord};
use crate::topology::mesh::ProcessMesh;
use serde::{Deserialize, Serialize};

/// How the process mesh is chosen.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshShape {
    /// Factor the process count over the decomposed axes, minimising the
    /// cut surface.
    #[default]
    Auto,
    /// Fixed process count per axis; undecomposed axes must be 1.
    Explicit(Coord),
}

/// Configuration of a [`ParallelGrid`](crate::parallel_grid::ParallelGrid).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Extent of the whole simulation domain.
    pub global_size: Coord,
    pub halo_left: Coord,
    pub halo_right: Coord,
    /// Axes the process mesh is split along.
    pub axes: AxisSet,
    #[serde(default)]
    pub mesh: MeshShape,
    #[serde(default)]
    pub time_levels: TimeLevels,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig::new(Coord::new1(64), Coord::new1(1), AxisSet::X)
    }
}

impl GridConfig {
    /// Symmetric halo of `halo`, automatic mesh, three time levels.
    pub fn new(global_size: Coord, halo: Coord, axes: AxisSet) -> Self {
        GridConfig {
            global_size,
            halo_left: halo,
            halo_right: halo,
            axes,
            mesh: MeshShape::Auto,
            time_levels: TimeLevels::Three,
        }
    }

    pub fn with_mesh(mut self, shape: Coord) -> Self {
        self.mesh = MeshShape::Explicit(shape);
        self
    }

    pub fn with_time_levels(mut self, levels: TimeLevels) -> Self {
        self.time_levels = levels;
        self
    }

    /// Grid rank (number of dimensions).
    #[inline]
    pub fn rank(&self) -> usize {
        self.global_size.rank()
    }

    /// Halo width per axis (left and right are equal once validated).
    #[inline]
    pub fn halo(&self) -> Coord {
        self.halo_left
    }

    /// Check rank consistency, the axis set and halo symmetry.
    pub fn validate(&self) -> Result<(), GridError> {
        let rank = self.rank();
        self.global_size.same_rank(&self.halo_left)?;
        self.global_size.same_rank(&self.halo_right)?;
        if let MeshShape::Explicit(shape) = &self.mesh {
            self.global_size.same_rank(shape)?;
        }
        self.axes.validate(rank)?;
        if self.halo_left != self.halo_right {
            return Err(GridError::HaloMismatch {
                left: self.halo_left,
                right: self.halo_right,
            });
        }
        Ok(())
    }

    /// Process mesh for a world of `procs` ranks.
    ///
    /// # Errors
    /// [`GridError::InvalidMeshShape`] when an explicit mesh needs more ranks
    /// than the world has.
    pub fn process_mesh(&self, procs: usize) -> Result<ProcessMesh, GridError> {
        match self.mesh {
            MeshShape::Auto => {
                ProcessMesh::auto(procs, self.axes, &self.global_size, &self.halo())
            }
            MeshShape::Explicit(shape) => {
                let mesh = ProcessMesh::new(shape, self.axes)?;
                if mesh.volume() > procs {
                    return Err(GridError::InvalidMeshShape {
                        shape,
                        reason: format!(
                            "needs {} processes, only {procs} available",
                            mesh.volume()
                        ),
                    });
                }
                Ok(mesh)
            }
        }
    }
}
