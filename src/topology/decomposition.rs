//! Splitting the global grid into per-rank owned boxes.

use crate::grid_error::GridError;
use crate::topology::coord::{Coord, MAX_RANK};
use crate::topology::mesh::ProcessMesh;

/// The part of the global grid one rank owns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Decomposition {
    /// Linear rank id inside the process mesh.
    pub id: usize,
    /// Position of this rank in the process mesh.
    pub position: Coord,
    /// Owned extent (no halo).
    pub owned: Coord,
    /// Global coordinate of the first owned cell.
    pub origin: Coord,
    /// A neighbour exists on the negative side of each axis.
    pub has_neg: [bool; MAX_RANK],
    /// A neighbour exists on the positive side of each axis.
    pub has_pos: [bool; MAX_RANK],
}

impl Decomposition {
    /// Neighbour existence flag on one side of an axis (`step` is −1 or +1).
    #[inline]
    pub fn has_side(&self, axis: usize, step: i8) -> bool {
        match step {
            s if s < 0 => self.has_neg.get(axis).copied().unwrap_or(false),
            s if s > 0 => self.has_pos.get(axis).copied().unwrap_or(false),
            _ => false,
        }
    }

    /// Extended local extent: owned plus a halo of `halo` on both sides.
    ///
    /// Both sides are allocated even on the global boundary, where no
    /// neighbour exists. Those boundary halo cells are never written by an
    /// exchange and stay zero; exporters should skip them (see
    /// `ParallelGrid::to_global`, which maps them to `None`).
    pub fn extended(&self, halo: &Coord) -> Result<Coord, GridError> {
        self.owned.try_add(&halo.scale(2))
    }
}

/// Owned extent along one axis for mesh position `pos` out of `count`.
///
/// Every position gets `total / count` cells except the last, which also
/// takes the remainder.
#[inline]
pub fn owned_extent(total: usize, count: usize, pos: usize) -> usize {
    let base = total / count;
    if pos + 1 == count {
        total - (count - 1) * base
    } else {
        base
    }
}

/// Decompose `global` over `mesh` for rank `id`.
///
/// Returns `Ok(None)` when `id` lies beyond the mesh volume: such a rank owns
/// nothing and only takes part in collective barriers.
///
/// # Errors
/// * [`GridError::RankMismatch`] when the mesh and grid ranks differ.
/// * [`GridError::MeshTooLarge`] when an axis has more processes than cells.
/// * [`GridError::SubdomainTooSmall`] when a decomposed axis would leave a
///   subdomain thinner than its halo.
pub fn decompose(
    global: &Coord,
    mesh: &ProcessMesh,
    halo: &Coord,
    id: usize,
) -> Result<Option<Decomposition>, GridError> {
    let shape = mesh.shape();
    global.same_rank(&shape)?;
    global.same_rank(halo)?;

    for a in 0..global.rank() {
        let count = shape.get(a);
        let total = global.get(a);
        if count > total {
            return Err(GridError::MeshTooLarge {
                shape,
                global: *global,
            });
        }
        if count > 1 && total / count < halo.get(a) {
            return Err(GridError::SubdomainTooSmall {
                axis: a,
                owned: total / count,
                halo: halo.get(a),
            });
        }
    }

    let Some(position) = mesh.position_of(id) else {
        return Ok(None);
    };

    let mut owned = *global;
    let mut origin = Coord::zero(global.rank())?;
    let mut has_neg = [false; MAX_RANK];
    let mut has_pos = [false; MAX_RANK];
    for a in mesh.axes().iter() {
        let count = shape.get(a);
        let pos = position.get(a);
        owned.set(a, owned_extent(global.get(a), count, pos));
        origin.set(a, pos * (global.get(a) / count));
        has_neg[a] = pos > 0;
        has_pos[a] = pos + 1 < count;
    }

    Ok(Some(Decomposition {
        id,
        position,
        owned,
        origin,
        has_neg,
        has_pos,
    }))
}
