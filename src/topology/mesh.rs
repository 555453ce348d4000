//! Process mesh: the Cartesian arrangement of ranks and the rank ↔ position
//! mapping used to find neighbour ids.
//!
//! Ranks are laid out with X varying fastest: the stride of X is 1, of Y the
//! X count, of Z the X·Y count. Axes that are not decomposed have count 1, so
//! for an `XZ` decomposition the Z stride is the X count and for `YZ` it is
//! the Y count.

use crate::grid_error::GridError;
use crate::topology::coord::{AxisSet, Coord, MAX_RANK};
use crate::topology::direction::Direction;

/// Shape and linearisation of the process mesh.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProcessMesh {
    shape: Coord,
    axes: AxisSet,
    strides: [usize; MAX_RANK],
}

impl ProcessMesh {
    /// Build a mesh of an explicit shape.
    ///
    /// `shape` has the grid's rank. Decomposed axes need a count `>= 1`,
    /// every other axis must have count exactly 1.
    pub fn new(shape: Coord, axes: AxisSet) -> Result<Self, GridError> {
        axes.validate(shape.rank())?;
        for a in 0..shape.rank() {
            let count = shape.get(a);
            if count == 0 {
                return Err(GridError::InvalidMeshShape {
                    shape,
                    reason: format!("axis {a} has zero processes"),
                });
            }
            if !axes.contains(a) && count != 1 {
                return Err(GridError::InvalidMeshShape {
                    shape,
                    reason: format!("axis {a} is not decomposed but has {count} processes"),
                });
            }
        }
        let mut strides = [0; MAX_RANK];
        let mut acc = 1;
        for (a, s) in strides.iter_mut().enumerate() {
            *s = acc;
            acc *= shape.get(a).max(1);
        }
        Ok(ProcessMesh {
            shape,
            axes,
            strides,
        })
    }

    /// Pick a mesh for `procs` processes over the decomposed axes.
    ///
    /// Among all shapes that fit the global grid (every subdomain at least
    /// `halo` thick) the largest process count wins, then the smallest total
    /// cut surface, then the first shape in X-major enumeration order.
    /// Processes beyond the chosen volume are left inactive.
    pub fn auto(
        procs: usize,
        axes: AxisSet,
        global: &Coord,
        halo: &Coord,
    ) -> Result<Self, GridError> {
        let rank = global.rank();
        axes.validate(rank)?;
        if procs == 0 {
            return Err(GridError::InvalidMeshShape {
                shape: Coord::splat(rank, 0)?,
                reason: "no processes".into(),
            });
        }

        // Largest count per axis that still leaves a subdomain as thick as the halo.
        let limit = |a: usize| -> usize {
            if !axes.contains(a) {
                return 1;
            }
            let total = global.get(a);
            let h = halo.get(a).max(1);
            (total / h).clamp(1, procs)
        };

        let mut best: Option<(usize, u128, Coord)> = None;
        let mut shape = Coord::splat(rank, 1)?;
        let (lx, ly, lz) = (limit(0), limit(1), limit(2));
        for cx in 1..=lx {
            for cy in 1..=ly {
                if cx * cy > procs {
                    break;
                }
                for cz in 1..=lz {
                    let volume = cx * cy * cz;
                    if volume > procs {
                        break;
                    }
                    shape.set(0, cx);
                    shape.set(1, cy);
                    shape.set(2, cz);
                    let surface = cut_surface(&shape, global);
                    let better = match &best {
                        None => true,
                        Some((v, s, _)) => volume > *v || (volume == *v && surface < *s),
                    };
                    if better {
                        best = Some((volume, surface, shape));
                    }
                }
            }
        }
        let (_, _, shape) = best.ok_or_else(|| GridError::InvalidMeshShape {
            shape: *global,
            reason: "no process mesh fits the grid".into(),
        })?;
        log::debug!("auto process mesh for {procs} processes over {axes}: {shape}");
        ProcessMesh::new(shape, axes)
    }

    #[inline]
    pub fn shape(&self) -> Coord {
        self.shape
    }

    #[inline]
    pub fn axes(&self) -> AxisSet {
        self.axes
    }

    /// Linearisation strides per axis.
    #[inline]
    pub fn strides(&self) -> [usize; MAX_RANK] {
        self.strides
    }

    /// Number of ranks that own a subdomain.
    pub fn volume(&self) -> usize {
        self.shape.volume()
    }

    /// Mesh position of `id`, or `None` when the rank is inactive.
    pub fn position_of(&self, id: usize) -> Option<Coord> {
        if id >= self.volume() {
            return None;
        }
        let mut pos = self.shape;
        for a in 0..self.shape.rank() {
            pos.set(a, (id / self.strides[a]) % self.shape.get(a));
        }
        Some(pos)
    }

    /// Linear id of a mesh position.
    pub fn id_of(&self, position: &Coord) -> Result<usize, GridError> {
        self.shape.same_rank(position)?;
        if !position.is_inside(&self.shape) {
            return Err(GridError::OutOfBounds {
                coord: *position,
                size: self.shape,
            });
        }
        Ok((0..self.shape.rank())
            .map(|a| position.get(a) * self.strides[a])
            .sum())
    }

    /// Id of the neighbour of `id` in direction `dir`.
    ///
    /// `None` when `id` is inactive, the direction moves along an axis the
    /// grid does not have, or the neighbour would lie outside the mesh.
    pub fn neighbor(&self, id: usize, dir: Direction) -> Option<usize> {
        let pos = self.position_of(id)?;
        let mut target = id;
        for (a, &step) in dir.info().offset.iter().enumerate() {
            match step {
                0 => {}
                _ if a >= self.shape.rank() => return None,
                -1 => {
                    if pos.get(a) == 0 {
                        return None;
                    }
                    target -= self.strides[a];
                }
                _ => {
                    if pos.get(a) + 1 >= self.shape.get(a) {
                        return None;
                    }
                    target += self.strides[a];
                }
            }
        }
        Some(target)
    }
}

/// Total area of the cuts a mesh shape makes through the global grid.
fn cut_surface(shape: &Coord, global: &Coord) -> u128 {
    (0..shape.rank())
        .map(|a| {
            let face: u128 = (0..global.rank())
                .filter(|&b| b != a)
                .map(|b| global.get(b) as u128)
                .product();
            (shape.get(a) as u128 - 1) * face
        })
        .sum()
}
