//! Which directions a rank sends to and receives from.
//!
//! A rank sends toward `d` only when a neighbour exists on the `d` side of
//! every axis `d` moves along, and receives for `d` only when the same holds
//! for `opposite(d)`. The rule depends on nothing but the rank's mesh
//! position, so it is fixed for the whole run.

use crate::topology::decomposition::Decomposition;
use crate::topology::direction::Direction;

/// Send/receive flags of one direction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Participation {
    pub send: bool,
    pub recv: bool,
}

impl Participation {
    /// `true` if the direction needs buffers at all.
    #[inline]
    pub fn any(&self) -> bool {
        self.send || self.recv
    }
}

/// `true` when a neighbour exists on the `dir` side of every touched axis.
pub fn has_neighbor(decomp: &Decomposition, dir: Direction) -> bool {
    dir.touched_axes().all(|a| decomp.has_side(a, dir.step(a)))
}

/// Participation of `dir` for the rank described by `decomp`.
pub fn resolve(decomp: &Decomposition, dir: Direction) -> Participation {
    Participation {
        send: has_neighbor(decomp, dir),
        recv: has_neighbor(decomp, dir.opposite()),
    }
}
