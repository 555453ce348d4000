//! Flat transfer buffers, one send and one receive buffer per direction.
//!
//! Send buffers are indexed by the direction the data travels. Receive
//! buffers are indexed by the side the data arrives from, so the data for
//! direction `d` lands in the receive buffer of `opposite(d)`.

use crate::data::field_value::TimeLevels;
use crate::data::sample::Sample;
use crate::halo::plan::HaloPlan;
use crate::topology::coord::Coord;
use crate::topology::direction::{DIRECTION_COUNT, Direction};

/// Samples needed to carry one direction's window.
///
/// Halo width on every touched axis, owned extent on every other axis, times
/// the number of retained time levels.
pub fn buffer_len(dir: Direction, owned: &Coord, halo: &Coord, levels: TimeLevels) -> usize {
    let cells: usize = (0..owned.rank())
        .map(|a| {
            if dir.step(a) != 0 {
                halo.get(a)
            } else {
                owned.get(a)
            }
        })
        .product();
    cells * levels.count()
}

/// Allocation summary, logged at setup.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Directions with at least one allocated buffer.
    pub directions: usize,
    /// Samples over all send and receive buffers.
    pub elements: usize,
}

/// Send and receive buffers of one rank.
#[derive(Clone, Debug)]
pub struct HaloBuffers<T> {
    send: Vec<Vec<T>>,
    recv: Vec<Vec<T>>,
}

impl<T: Sample> HaloBuffers<T> {
    /// Allocate the buffers a plan needs. Directions that neither send nor
    /// receive get nothing.
    pub fn allocate(plan: &HaloPlan) -> Self {
        let mut send = vec![Vec::new(); DIRECTION_COUNT];
        let mut recv = vec![Vec::new(); DIRECTION_COUNT];
        for entry in plan.entries() {
            if !entry.participation.any() {
                continue;
            }
            let n = entry.buffer_len;
            send[entry.direction.index()] = vec![T::zero(); n];
            recv[entry.direction.opposite().index()] = vec![T::zero(); n];
        }
        HaloBuffers { send, recv }
    }

    /// Send buffer of `dir`.
    #[inline]
    pub fn send(&self, dir: Direction) -> &[T] {
        &self.send[dir.index()]
    }

    #[inline]
    pub fn send_mut(&mut self, dir: Direction) -> &mut [T] {
        &mut self.send[dir.index()]
    }

    /// Receive buffer for data arriving from side `from`.
    #[inline]
    pub fn recv(&self, from: Direction) -> &[T] {
        &self.recv[from.index()]
    }

    #[inline]
    pub fn recv_mut(&mut self, from: Direction) -> &mut [T] {
        &mut self.recv[from.index()]
    }

    /// Send buffer of `dir` and the receive buffer of `opposite(dir)`,
    /// borrowed together for a combined exchange.
    pub fn pair_mut(&mut self, dir: Direction) -> (&[T], &mut [T]) {
        (&self.send[dir.index()], &mut self.recv[dir.opposite().index()])
    }

    pub fn stats(&self) -> BufferStats {
        let directions = self.send.iter().filter(|b| !b.is_empty()).count();
        let elements = self.send.iter().chain(&self.recv).map(Vec::len).sum();
        BufferStats {
            directions,
            elements,
        }
    }
}
