//! Send and receive windows per direction.
//!
//! Windows are half-open boxes in local extended coordinates. Along an axis a
//! direction moves on, the send window is the halo-thick strip of owned cells
//! next to that side and the receive window is the halo on the opposite side
//! (the data for direction `d` arrives from the neighbour at `opposite(d)`).
//! Along untouched axes both windows cover the owned range.

use crate::grid_error::GridError;
use crate::topology::coord::Coord;
use crate::topology::direction::Direction;
use itertools::iproduct;

/// Half-open box `[start, end)` of local cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub start: Coord,
    pub end: Coord,
}

impl Window {
    /// Size of the window along each axis.
    pub fn extent(&self) -> Coord {
        self.end.checked_sub(&self.start).unwrap_or(self.start.scale(0))
    }

    /// Number of cells in the window.
    pub fn volume(&self) -> usize {
        self.extent().volume()
    }

    /// `true` if the window lies inside a grid of size `size`.
    pub fn fits(&self, size: &Coord) -> bool {
        self.start.all_le(&self.end) && self.end.all_le(size)
    }

    /// Cells of the window in row-major order, first axis slowest.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        let range = |a: usize| {
            if a < self.start.rank() {
                self.start.get(a)..self.end.get(a)
            } else {
                0..1
            }
        };
        let base = self.start;
        iproduct!(range(0), range(1), range(2)).map(move |(x, y, z)| {
            let mut c = base;
            c.set(0, x);
            c.set(1, y);
            c.set(2, z);
            c
        })
    }
}

/// Send and receive windows of one direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DirectionGeometry {
    pub send: Window,
    pub recv: Window,
}

/// `[start, end)` of the send strip along one axis.
#[inline]
pub fn send_range(step: i8, extended: usize, halo: usize) -> (usize, usize) {
    match step {
        s if s < 0 => (halo, 2 * halo),
        s if s > 0 => (extended - 2 * halo, extended - halo),
        _ => (halo, extended - halo),
    }
}

/// `[start, end)` of the receive strip along one axis.
#[inline]
pub fn recv_range(step: i8, extended: usize, halo: usize) -> (usize, usize) {
    match step {
        s if s < 0 => (extended - halo, extended),
        s if s > 0 => (0, halo),
        _ => (halo, extended - halo),
    }
}

/// Windows of `dir` for a local grid of extended size `extended` with halo
/// width `halo` on both sides.
///
/// # Errors
/// * [`GridError::DirectionNotApplicable`] when `dir` moves along an axis
///   the grid does not have.
/// * [`GridError::SubdomainTooSmall`] when an axis `dir` moves along owns
///   fewer cells than the halo is wide. The send strip would then reach
///   into the halo and overlap the receive strip.
pub fn direction_geometry(
    dir: Direction,
    extended: &Coord,
    halo: &Coord,
) -> Result<DirectionGeometry, GridError> {
    extended.same_rank(halo)?;
    let rank = extended.rank();
    if dir.touched_axes().any(|a| a >= rank) {
        return Err(GridError::DirectionNotApplicable(dir));
    }

    let mut send = Window {
        start: *extended,
        end: *extended,
    };
    let mut recv = send;
    for a in 0..rank {
        let (e, h) = (extended.get(a), halo.get(a));
        let step = dir.step(a);
        let owned = e.checked_sub(2 * h).ok_or(GridError::SubdomainTooSmall {
            axis: a,
            owned: 0,
            halo: h,
        })?;
        if step != 0 && owned < h {
            return Err(GridError::SubdomainTooSmall {
                axis: a,
                owned,
                halo: h,
            });
        }
        let (s0, s1) = send_range(step, e, h);
        let (r0, r1) = recv_range(step, e, h);
        send.start.set(a, s0);
        send.end.set(a, s1);
        recv.start.set(a, r0);
        recv.end.set(a, r1);
    }

    for (which, w) in [("send", &send), ("receive", &recv)] {
        if !w.fits(extended) {
            return Err(GridError::WindowOutOfBounds {
                direction: dir,
                which,
                start: w.start,
                end: w.end,
                size: *extended,
            });
        }
    }
    Ok(DirectionGeometry { send, recv })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_dimensional_strips() {
        // owned 5, halo 1 -> extended 7
        let e = Coord::new1(7);
        let h = Coord::new1(1);
        let left = direction_geometry(Direction::Left, &e, &h).unwrap();
        assert_eq!((left.send.start.x(), left.send.end.x()), (1, 2));
        assert_eq!((left.recv.start.x(), left.recv.end.x()), (6, 7));
        let right = direction_geometry(Direction::Right, &e, &h).unwrap();
        assert_eq!((right.send.start.x(), right.send.end.x()), (5, 6));
        assert_eq!((right.recv.start.x(), right.recv.end.x()), (0, 1));
    }

    #[test]
    fn untouched_axes_span_owned_range() {
        let e = Coord::new3(8, 6, 10);
        let h = Coord::new3(2, 1, 3);
        let g = direction_geometry(Direction::Up, &e, &h).unwrap();
        assert_eq!(g.send.start, Coord::new3(2, 4, 3));
        assert_eq!(g.send.end, Coord::new3(6, 5, 7));
        assert_eq!(g.recv.start, Coord::new3(2, 0, 3));
        assert_eq!(g.recv.end, Coord::new3(6, 1, 7));
        assert_eq!(g.send.volume(), 4 * 1 * 4);
        assert_eq!(g.send.volume(), g.recv.volume());
    }

    #[test]
    fn corner_windows_are_halo_cubes() {
        let e = Coord::new3(6, 6, 6);
        let h = Coord::new3(1, 1, 1);
        let g = direction_geometry(Direction::LeftDownFront, &e, &h).unwrap();
        assert_eq!(g.send.start, Coord::new3(1, 1, 4));
        assert_eq!(g.recv.start, Coord::new3(5, 5, 0));
        assert_eq!(g.send.volume(), 1);
    }

    #[test]
    fn window_cells_run_last_axis_fastest() {
        let w = Window {
            start: Coord::new2(1, 3),
            end: Coord::new2(3, 5),
        };
        let cells: Vec<_> = w.coords().collect();
        assert_eq!(
            cells,
            vec![
                Coord::new2(1, 3),
                Coord::new2(1, 4),
                Coord::new2(2, 3),
                Coord::new2(2, 4)
            ]
        );
    }

    #[test]
    fn owned_thinner_than_halo_is_rejected() {
        // owned 1, halo 2: a send strip of width 2 would start in the halo
        let e = Coord::new1(5);
        let h = Coord::new1(2);
        for dir in [Direction::Left, Direction::Right] {
            assert!(matches!(
                direction_geometry(dir, &e, &h),
                Err(GridError::SubdomainTooSmall { axis: 0, owned: 1, halo: 2 })
            ));
        }
        // owned exactly one halo wide is the smallest accepted strip
        let g = direction_geometry(Direction::Right, &Coord::new1(6), &h).unwrap();
        assert_eq!((g.send.start.x(), g.send.end.x()), (2, 4));
        assert_eq!((g.recv.start.x(), g.recv.end.x()), (0, 2));
    }

    #[test]
    fn thin_axis_is_fine_when_not_crossed() {
        // Y owns 1 cell under a halo of 2, but Left never moves along Y.
        let e = Coord::new2(7, 5);
        let h = Coord::new2(1, 2);
        let g = direction_geometry(Direction::Left, &e, &h).unwrap();
        assert_eq!((g.send.start.y(), g.send.end.y()), (2, 3));
        assert!(direction_geometry(Direction::Up, &e, &h).is_err());
    }

    #[test]
    fn rejects_directions_off_the_grid() {
        let e = Coord::new2(6, 6);
        let h = Coord::new2(1, 1);
        assert!(matches!(
            direction_geometry(Direction::Front, &e, &h),
            Err(GridError::DirectionNotApplicable(Direction::Front))
        ));
    }
}
