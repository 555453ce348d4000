//! Per-direction exchange plan, computed and validated once at setup.

use crate::data::field_value::TimeLevels;
use crate::debug_invariants::DebugInvariants;
use crate::grid_error::GridError;
use crate::halo::buffers::buffer_len;
use crate::halo::geometry::{DirectionGeometry, direction_geometry};
use crate::halo::participation::{Participation, resolve};
use crate::topology::coord::{AxisSet, Coord};
use crate::topology::decomposition::Decomposition;
use crate::topology::direction::Direction;
use crate::topology::mesh::ProcessMesh;

/// Everything the exchange needs to know about one direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DirectionPlan {
    pub direction: Direction,
    pub geometry: DirectionGeometry,
    pub participation: Participation,
    /// Rank the send window goes to; set exactly when sending.
    pub send_to: Option<usize>,
    /// Rank the receive window comes from; set exactly when receiving.
    pub recv_from: Option<usize>,
    /// Samples per transfer buffer.
    pub buffer_len: usize,
}

/// Exchange plan of one active rank.
#[derive(Clone, Debug)]
pub struct HaloPlan {
    id: usize,
    axes: AxisSet,
    owned: Coord,
    halo: Coord,
    extended: Coord,
    levels: TimeLevels,
    entries: Vec<DirectionPlan>,
}

impl HaloPlan {
    /// Build the plan for every direction applicable to the mesh's axes.
    ///
    /// The result is validated before it is returned.
    pub fn build(
        decomp: &Decomposition,
        mesh: &ProcessMesh,
        halo: &Coord,
        levels: TimeLevels,
    ) -> Result<Self, GridError> {
        let extended = decomp.extended(halo)?;
        let axes = mesh.axes();
        let mut entries = Vec::new();
        for dir in Direction::for_axes(axes) {
            let geometry = direction_geometry(dir, &extended, halo)?;
            let participation = resolve(decomp, dir);
            let send_to = if participation.send {
                mesh.neighbor(decomp.id, dir)
            } else {
                None
            };
            let recv_from = if participation.recv {
                mesh.neighbor(decomp.id, dir.opposite())
            } else {
                None
            };
            entries.push(DirectionPlan {
                direction: dir,
                geometry,
                participation,
                send_to,
                recv_from,
                buffer_len: buffer_len(dir, &decomp.owned, halo, levels),
            });
        }
        let plan = HaloPlan {
            id: decomp.id,
            axes,
            owned: decomp.owned,
            halo: *halo,
            extended,
            levels,
            entries,
        };
        plan.validate_invariants()?;
        Ok(plan)
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn axes(&self) -> AxisSet {
        self.axes
    }

    #[inline]
    pub fn owned(&self) -> Coord {
        self.owned
    }

    #[inline]
    pub fn halo(&self) -> Coord {
        self.halo
    }

    #[inline]
    pub fn extended(&self) -> Coord {
        self.extended
    }

    #[inline]
    pub fn levels(&self) -> TimeLevels {
        self.levels
    }

    /// Applicable directions in table order.
    pub fn entries(&self) -> &[DirectionPlan] {
        &self.entries
    }

    /// Plan of one direction.
    ///
    /// # Errors
    /// [`GridError::DirectionNotApplicable`] when `dir` is not in the plan.
    pub fn entry(&self, dir: Direction) -> Result<&DirectionPlan, GridError> {
        self.entries
            .iter()
            .find(|e| e.direction == dir)
            .ok_or(GridError::DirectionNotApplicable(dir))
    }

    /// Ranks this plan exchanges data with, ascending and without repeats.
    pub fn neighbor_ranks(&self) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .entries
            .iter()
            .flat_map(|e| e.send_to.into_iter().chain(e.recv_from))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

impl DebugInvariants for HaloPlan {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "HaloPlan");
    }

    fn validate_invariants(&self) -> Result<(), GridError> {
        for a in 0..self.halo.rank() {
            if self.extended.get(a) != self.owned.get(a) + 2 * self.halo.get(a) {
                return Err(GridError::HaloMismatch {
                    left: self.halo,
                    right: self.halo,
                });
            }
        }
        for e in &self.entries {
            let dir = e.direction;
            if !dir.applies_to(self.axes) {
                return Err(GridError::DirectionNotApplicable(dir));
            }
            for (which, w) in [("send", &e.geometry.send), ("receive", &e.geometry.recv)] {
                if !w.fits(&self.extended) {
                    return Err(GridError::WindowOutOfBounds {
                        direction: dir,
                        which,
                        start: w.start,
                        end: w.end,
                        size: self.extended,
                    });
                }
                let expected = w.volume() * self.levels.count();
                if expected != e.buffer_len {
                    return Err(GridError::BufferLength {
                        direction: dir,
                        expected,
                        got: e.buffer_len,
                    });
                }
            }
            let send_ok = e.participation.send == e.send_to.is_some();
            let recv_ok = e.participation.recv == e.recv_from.is_some();
            if !send_ok || !recv_ok {
                return Err(GridError::NeighborMismatch {
                    rank: self.id,
                    direction: dir,
                });
            }
        }
        Ok(())
    }
}
