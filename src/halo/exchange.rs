//! One halo-exchange round: pack, transport, unpack per direction.
//!
//! Directions are processed in table order on every rank, so the partner of
//! a transfer toward `d` is always handling the same direction at the same
//! time. A direction that both sends and receives uses one combined
//! `send_recv`, which keeps chains of ranks along an axis from deadlocking.
//! Messages carry the sender's rank as tag.

use crate::algs::communicator::{Communicator, rank_tag};
use crate::algs::wire::{byte_len, cast_slice, cast_slice_mut};
use crate::data::field_value::FieldPointValue;
use crate::data::grid::Grid;
use crate::data::sample::Sample;
use crate::debug_invariants::DebugInvariants;
use crate::grid_error::GridError;
use crate::halo::buffers::{BufferStats, HaloBuffers};
use crate::halo::geometry::Window;
use crate::halo::plan::{DirectionPlan, HaloPlan};
use crate::topology::direction::Direction;

/// Copy the cells of `window` into `out`, row-major, levels interleaved per
/// cell (current, previous, previous-previous).
pub fn pack_window<T: Sample>(
    grid: &Grid<T>,
    dir: Direction,
    window: &Window,
    out: &mut [T],
) -> Result<(), GridError> {
    let n = grid.levels().count();
    check_len(dir, window.volume() * n, out.len())?;
    for (chunk, coord) in out.chunks_exact_mut(n).zip(window.coords()) {
        chunk.copy_from_slice(grid.get(&coord)?.as_slice());
    }
    Ok(())
}

/// Replace the cells of `window` with fresh values read from `input`, in the
/// layout written by [`pack_window`].
pub fn unpack_window<T: Sample>(
    grid: &mut Grid<T>,
    dir: Direction,
    window: &Window,
    input: &[T],
) -> Result<(), GridError> {
    let n = grid.levels().count();
    check_len(dir, window.volume() * n, input.len())?;
    for (chunk, coord) in input.chunks_exact(n).zip(window.coords()) {
        grid.set(&coord, FieldPointValue::from_levels(chunk)?)?;
    }
    Ok(())
}

fn check_len(direction: Direction, expected: usize, got: usize) -> Result<(), GridError> {
    if expected == got {
        Ok(())
    } else {
        Err(GridError::BufferLength {
            direction,
            expected,
            got,
        })
    }
}

/// Exchange state of one active rank: its plan and the buffers it needs.
#[derive(Clone, Debug)]
pub struct HaloExchange<T> {
    plan: HaloPlan,
    buffers: HaloBuffers<T>,
}

impl<T: Sample> HaloExchange<T> {
    pub fn new(plan: HaloPlan) -> Self {
        plan.debug_assert_invariants();
        let buffers = HaloBuffers::allocate(&plan);
        HaloExchange { plan, buffers }
    }

    #[inline]
    pub fn plan(&self) -> &HaloPlan {
        &self.plan
    }

    #[inline]
    pub fn buffers(&self) -> &HaloBuffers<T> {
        &self.buffers
    }

    pub fn stats(&self) -> BufferStats {
        self.buffers.stats()
    }

    /// Run one exchange over every applicable direction.
    ///
    /// Issues no barrier; the caller closes the round.
    pub fn exchange<C: Communicator>(&mut self, grid: &mut Grid<T>, comm: &C) -> Result<(), GridError> {
        if grid.size() != self.plan.extended() {
            return Err(GridError::OutOfBounds {
                coord: self.plan.extended(),
                size: grid.size(),
            });
        }
        if grid.levels() != self.plan.levels() {
            return Err(GridError::TimeLevelMismatch {
                expected: self.plan.levels().count(),
                got: grid.levels().count(),
            });
        }
        for entry in self.plan.entries() {
            exchange_direction(entry, self.plan.id(), &mut self.buffers, grid, comm)?;
        }
        grid.debug_assert_invariants();
        Ok(())
    }
}

fn exchange_direction<T: Sample, C: Communicator>(
    entry: &DirectionPlan,
    me: usize,
    buffers: &mut HaloBuffers<T>,
    grid: &mut Grid<T>,
    comm: &C,
) -> Result<(), GridError> {
    let dir = entry.direction;
    let from_side = dir.opposite();
    let missing = || GridError::NeighborMismatch {
        rank: me,
        direction: dir,
    };

    if entry.participation.send {
        pack_window(grid, dir, &entry.geometry.send, buffers.send_mut(dir))?;
    }

    match (entry.participation.send, entry.participation.recv) {
        (true, true) => {
            let to = entry.send_to.ok_or_else(missing)?;
            let from = entry.recv_from.ok_or_else(missing)?;
            log::trace!(
                "rank {me} {dir}: send_recv {} bytes to {to} / from {from}",
                byte_len::<T>(entry.buffer_len)
            );
            let (send, recv) = buffers.pair_mut(dir);
            comm.send_recv(
                to,
                rank_tag(me),
                cast_slice(send),
                from,
                rank_tag(from),
                cast_slice_mut(recv),
            )?;
        }
        (true, false) => {
            let to = entry.send_to.ok_or_else(missing)?;
            log::trace!("rank {me} {dir}: send {} bytes to {to}", byte_len::<T>(entry.buffer_len));
            comm.send(to, rank_tag(me), cast_slice(buffers.send(dir)))?;
        }
        (false, true) => {
            let from = entry.recv_from.ok_or_else(missing)?;
            log::trace!("rank {me} {dir}: recv {} bytes from {from}", byte_len::<T>(entry.buffer_len));
            comm.recv(from, rank_tag(from), cast_slice_mut(buffers.recv_mut(from_side)))?;
        }
        (false, false) => {}
    }

    if entry.participation.recv {
        unpack_window(grid, dir, &entry.geometry.recv, buffers.recv(from_side))?;
    }
    Ok(())
}
