//! Neighbour directions: the 6 faces, 12 edges and 8 corners of a subdomain.
//!
//! Every direction is described by a per-axis offset in `{-1, 0, +1}`:
//! `Left/Right` move along −X/+X, `Down/Up` along −Y/+Y and `Back/Front`
//! along −Z/+Z. Edge and corner directions are compositions of those faces.
//! The descriptor table is built once and everything downstream (geometry,
//! participation, buffer sizes, neighbour ranks) iterates it generically.

use crate::topology::coord::{AxisSet, MAX_RANK};
use once_cell::sync::Lazy;
use std::fmt;

/// Number of possible neighbour directions in three dimensions.
pub const DIRECTION_COUNT: usize = 26;

/// Symbolic neighbour position relative to this subdomain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Left,
    Right,
    Down,
    Up,
    Back,
    Front,
    LeftDown,
    LeftUp,
    RightDown,
    RightUp,
    DownBack,
    DownFront,
    UpBack,
    UpFront,
    LeftBack,
    LeftFront,
    RightBack,
    RightFront,
    LeftDownBack,
    LeftDownFront,
    LeftUpBack,
    LeftUpFront,
    RightDownBack,
    RightDownFront,
    RightUpBack,
    RightUpFront,
}

/// Static description of one direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DirectionInfo {
    pub direction: Direction,
    /// Step along each axis, `-1`, `0` or `+1`.
    pub offset: [i8; MAX_RANK],
    /// Bit `a` set when the direction moves along axis `a`.
    pub mask: u8,
    pub opposite: Direction,
    pub name: &'static str,
}

static DIRECTION_TABLE: Lazy<[DirectionInfo; DIRECTION_COUNT]> = Lazy::new(|| {
    let mut table = Direction::ALL.map(|d| {
        let offset = d.offset();
        let mask = offset
            .iter()
            .enumerate()
            .filter(|(_, o)| **o != 0)
            .fold(0u8, |m, (a, _)| m | (1 << a));
        DirectionInfo {
            direction: d,
            offset,
            mask,
            opposite: d,
            name: d.name(),
        }
    });
    for i in 0..DIRECTION_COUNT {
        let neg = table[i].offset.map(|o| -o);
        if let Some(op) = table.iter().find(|e| e.offset == neg) {
            table[i].opposite = op.direction;
        }
    }
    table
});

impl Direction {
    /// All directions in table order.
    pub const ALL: [Direction; DIRECTION_COUNT] = [
        Direction::Left,
        Direction::Right,
        Direction::Down,
        Direction::Up,
        Direction::Back,
        Direction::Front,
        Direction::LeftDown,
        Direction::LeftUp,
        Direction::RightDown,
        Direction::RightUp,
        Direction::DownBack,
        Direction::DownFront,
        Direction::UpBack,
        Direction::UpFront,
        Direction::LeftBack,
        Direction::LeftFront,
        Direction::RightBack,
        Direction::RightFront,
        Direction::LeftDownBack,
        Direction::LeftDownFront,
        Direction::LeftUpBack,
        Direction::LeftUpFront,
        Direction::RightDownBack,
        Direction::RightDownFront,
        Direction::RightUpBack,
        Direction::RightUpFront,
    ];

    /// Stable index in `0..26`.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Direction> {
        Direction::ALL.get(i).copied()
    }

    /// Look a direction up by its per-axis offset.
    pub fn from_offset(offset: [i8; MAX_RANK]) -> Option<Direction> {
        DIRECTION_TABLE
            .iter()
            .find(|e| e.offset == offset)
            .map(|e| e.direction)
    }

    /// Descriptor for this direction.
    #[inline]
    pub fn info(self) -> &'static DirectionInfo {
        &DIRECTION_TABLE[self.index()]
    }

    /// Per-axis step of this direction.
    pub const fn offset(self) -> [i8; MAX_RANK] {
        use Direction::*;
        let x = match self {
            Left | LeftDown | LeftUp | LeftBack | LeftFront | LeftDownBack | LeftDownFront
            | LeftUpBack | LeftUpFront => -1,
            Right | RightDown | RightUp | RightBack | RightFront | RightDownBack
            | RightDownFront | RightUpBack | RightUpFront => 1,
            _ => 0,
        };
        let y = match self {
            Down | LeftDown | RightDown | DownBack | DownFront | LeftDownBack | LeftDownFront
            | RightDownBack | RightDownFront => -1,
            Up | LeftUp | RightUp | UpBack | UpFront | LeftUpBack | LeftUpFront | RightUpBack
            | RightUpFront => 1,
            _ => 0,
        };
        let z = match self {
            Back | DownBack | UpBack | LeftBack | RightBack | LeftDownBack | LeftUpBack
            | RightDownBack | RightUpBack => -1,
            Front | DownFront | UpFront | LeftFront | RightFront | LeftDownFront
            | LeftUpFront | RightDownFront | RightUpFront => 1,
            _ => 0,
        };
        [x, y, z]
    }

    /// Step along a single axis.
    #[inline]
    pub fn step(self, axis: usize) -> i8 {
        self.info().offset.get(axis).copied().unwrap_or(0)
    }

    /// Bitmask of the axes this direction touches.
    #[inline]
    pub fn axis_mask(self) -> u8 {
        self.info().mask
    }

    /// Axes this direction touches, in increasing order.
    pub fn touched_axes(self) -> impl Iterator<Item = usize> {
        let mask = self.axis_mask();
        (0..MAX_RANK).filter(move |a| mask & (1 << a) != 0)
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        self.info().opposite
    }

    /// Number of touched axes: 1 for faces, 2 for edges, 3 for corners.
    pub fn order(self) -> usize {
        self.axis_mask().count_ones() as usize
    }

    /// `true` when every axis this direction moves along is decomposed.
    #[inline]
    pub fn applies_to(self, axes: AxisSet) -> bool {
        axes.covers(self.axis_mask())
    }

    /// Directions applicable to a decomposed axis set, in table order.
    pub fn for_axes(axes: AxisSet) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| d.applies_to(axes))
    }

    /// Upper-case diagnostic name, e.g. `LEFT_DOWN_BACK`.
    pub const fn name(self) -> &'static str {
        use Direction::*;
        match self {
            Left => "LEFT",
            Right => "RIGHT",
            Down => "DOWN",
            Up => "UP",
            Back => "BACK",
            Front => "FRONT",
            LeftDown => "LEFT_DOWN",
            LeftUp => "LEFT_UP",
            RightDown => "RIGHT_DOWN",
            RightUp => "RIGHT_UP",
            DownBack => "DOWN_BACK",
            DownFront => "DOWN_FRONT",
            UpBack => "UP_BACK",
            UpFront => "UP_FRONT",
            LeftBack => "LEFT_BACK",
            LeftFront => "LEFT_FRONT",
            RightBack => "RIGHT_BACK",
            RightFront => "RIGHT_FRONT",
            LeftDownBack => "LEFT_DOWN_BACK",
            LeftDownFront => "LEFT_DOWN_FRONT",
            LeftUpBack => "LEFT_UP_BACK",
            LeftUpFront => "LEFT_UP_FRONT",
            RightDownBack => "RIGHT_DOWN_BACK",
            RightDownFront => "RIGHT_DOWN_FRONT",
            RightUpBack => "RIGHT_UP_BACK",
            RightUpFront => "RIGHT_UP_FRONT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
