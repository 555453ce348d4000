//! `Coord`: a fixed-rank grid coordinate, and the axis vocabulary.
//!
//! A `Coord` holds one, two or three unsigned components. Components past the
//! rank are kept at zero and never read, so equality and hashing only see the
//! active part. Coordinates double as sizes (extents) throughout the crate.

use crate::grid_error::GridError;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Highest supported grid rank.
pub const MAX_RANK: usize = 3;

/// One of the three grid axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; MAX_RANK] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Axis> {
        Axis::ALL.get(i).copied()
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(s)
    }
}

/// Fixed-rank tuple of unsigned grid coordinates.
#[derive(Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Coord {
    rank: u8,
    c: [usize; MAX_RANK],
}

impl Coord {
    /// One-dimensional coordinate.
    pub const fn new1(x: usize) -> Self {
        Coord { rank: 1, c: [x, 0, 0] }
    }

    /// Two-dimensional coordinate.
    pub const fn new2(x: usize, y: usize) -> Self {
        Coord { rank: 2, c: [x, y, 0] }
    }

    /// Three-dimensional coordinate.
    pub const fn new3(x: usize, y: usize, z: usize) -> Self {
        Coord { rank: 3, c: [x, y, z] }
    }

    /// Build a coordinate from a slice of 1..=3 components.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidRank`] for an empty or over-long slice.
    pub fn from_slice(v: &[usize]) -> Result<Self, GridError> {
        if v.is_empty() || v.len() > MAX_RANK {
            return Err(GridError::InvalidRank(v.len()));
        }
        let mut c = [0; MAX_RANK];
        c[..v.len()].copy_from_slice(v);
        Ok(Coord {
            rank: v.len() as u8,
            c,
        })
    }

    /// Coordinate of the given rank with every component set to `value`.
    pub fn splat(rank: usize, value: usize) -> Result<Self, GridError> {
        if rank == 0 || rank > MAX_RANK {
            return Err(GridError::InvalidRank(rank));
        }
        let mut c = [0; MAX_RANK];
        c[..rank].fill(value);
        Ok(Coord { rank: rank as u8, c })
    }

    /// All-zero coordinate of the given rank.
    pub fn zero(rank: usize) -> Result<Self, GridError> {
        Self::splat(rank, 0)
    }

    #[inline]
    pub const fn rank(&self) -> usize {
        self.rank as usize
    }

    /// Component along `axis`; zero for axes beyond the rank.
    #[inline]
    pub fn get(&self, axis: usize) -> usize {
        if axis < self.rank() { self.c[axis] } else { 0 }
    }

    /// Set the component along `axis`. Axes beyond the rank are ignored.
    #[inline]
    pub fn set(&mut self, axis: usize, value: usize) {
        if axis < self.rank() {
            self.c[axis] = value;
        }
    }

    /// Copy with one component replaced.
    pub fn with(mut self, axis: usize, value: usize) -> Self {
        self.set(axis, value);
        self
    }

    #[inline]
    pub fn x(&self) -> usize {
        self.get(0)
    }

    #[inline]
    pub fn y(&self) -> usize {
        self.get(1)
    }

    #[inline]
    pub fn z(&self) -> usize {
        self.get(2)
    }

    /// Active components as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.c[..self.rank()]
    }

    /// Number of elements in a box of this size (product of components).
    pub fn volume(&self) -> usize {
        self.as_slice().iter().product()
    }

    /// `true` if `self` lies inside a box of size `size` (component-wise `<`).
    pub fn is_inside(&self, size: &Coord) -> bool {
        self.rank == size.rank && self.as_slice().iter().zip(size.as_slice()).all(|(a, b)| a < b)
    }

    /// `true` if every component is `<=` the matching component of `other`.
    pub fn all_le(&self, other: &Coord) -> bool {
        self.rank == other.rank && self.as_slice().iter().zip(other.as_slice()).all(|(a, b)| a <= b)
    }

    /// Component-wise addition that reports a rank mismatch instead of panicking.
    pub fn try_add(&self, other: &Coord) -> Result<Coord, GridError> {
        self.same_rank(other)?;
        let mut out = *self;
        for a in 0..self.rank() {
            out.c[a] = self.c[a] + other.c[a];
        }
        Ok(out)
    }

    /// Component-wise subtraction; `None` on rank mismatch or underflow.
    pub fn checked_sub(&self, other: &Coord) -> Option<Coord> {
        if self.rank != other.rank {
            return None;
        }
        let mut out = *self;
        for a in 0..self.rank() {
            out.c[a] = self.c[a].checked_sub(other.c[a])?;
        }
        Some(out)
    }

    /// Multiply every component by `k`.
    pub fn scale(&self, k: usize) -> Coord {
        let mut out = *self;
        for a in 0..self.rank() {
            out.c[a] *= k;
        }
        out
    }

    pub(crate) fn same_rank(&self, other: &Coord) -> Result<(), GridError> {
        if self.rank == other.rank {
            Ok(())
        } else {
            Err(GridError::RankMismatch {
                expected: self.rank(),
                got: other.rank(),
            })
        }
    }
}

impl Add for Coord {
    type Output = Coord;

    /// # Panics
    /// Panics if the ranks differ.
    fn add(self, rhs: Coord) -> Coord {
        assert_eq!(self.rank, rhs.rank, "coordinate rank mismatch in add");
        let mut out = self;
        for a in 0..self.rank() {
            out.c[a] += rhs.c[a];
        }
        out
    }
}

impl Sub for Coord {
    type Output = Coord;

    /// # Panics
    /// Panics if the ranks differ or a component underflows.
    fn sub(self, rhs: Coord) -> Coord {
        assert_eq!(self.rank, rhs.rank, "coordinate rank mismatch in sub");
        let mut out = self;
        for a in 0..self.rank() {
            out.c[a] -= rhs.c[a];
        }
        out
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coord{:?}", self.as_slice())
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.as_slice().iter().map(|v| v.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}

impl TryFrom<Vec<usize>> for Coord {
    type Error = GridError;

    fn try_from(v: Vec<usize>) -> Result<Self, Self::Error> {
        Coord::from_slice(&v)
    }
}

impl From<Coord> for Vec<usize> {
    fn from(c: Coord) -> Self {
        c.as_slice().to_vec()
    }
}

/// Set of axes along which the process mesh is decomposed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AxisSet(u8);

impl AxisSet {
    pub const X: AxisSet = AxisSet(0b001);
    pub const Y: AxisSet = AxisSet(0b010);
    pub const Z: AxisSet = AxisSet(0b100);
    pub const XY: AxisSet = AxisSet(0b011);
    pub const YZ: AxisSet = AxisSet(0b110);
    pub const XZ: AxisSet = AxisSet(0b101);
    pub const XYZ: AxisSet = AxisSet(0b111);

    /// Raw bitmask (bit `a` set when axis `a` is active).
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u8) -> AxisSet {
        AxisSet(bits & 0b111)
    }

    #[inline]
    pub const fn contains(self, axis: usize) -> bool {
        axis < MAX_RANK && self.0 & (1 << axis) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// `true` if every axis of `mask` is in this set.
    #[inline]
    pub const fn covers(self, mask: u8) -> bool {
        mask & !self.0 == 0
    }

    /// Active axis indices in increasing order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..MAX_RANK).filter(move |&a| self.contains(a))
    }

    /// Check the set against a grid of rank `rank`.
    ///
    /// # Errors
    /// [`GridError::InvalidAxisSet`] when empty or naming an axis `>= rank`.
    pub fn validate(self, rank: usize) -> Result<(), GridError> {
        if self.is_empty() || self.iter().any(|a| a >= rank) {
            return Err(GridError::InvalidAxisSet {
                axes: self.to_string(),
                rank,
            });
        }
        Ok(())
    }
}

impl fmt::Display for AxisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for a in self.iter() {
            if let Some(axis) = Axis::from_index(a) {
                write!(f, "{axis}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for AxisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AxisSet({self})")
    }
}

impl FromStr for AxisSet {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = 0u8;
        for ch in s.trim().chars() {
            let bit = match ch.to_ascii_lowercase() {
                'x' => 0b001,
                'y' => 0b010,
                'z' => 0b100,
                _ => {
                    return Err(GridError::InvalidAxisSet {
                        axes: s.to_string(),
                        rank: MAX_RANK,
                    });
                }
            };
            if bits & bit != 0 {
                return Err(GridError::InvalidAxisSet {
                    axes: s.to_string(),
                    rank: MAX_RANK,
                });
            }
            bits |= bit;
        }
        Ok(AxisSet(bits))
    }
}

impl TryFrom<String> for AxisSet {
    type Error = GridError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AxisSet> for String {
    fn from(a: AxisSet) -> Self {
        a.to_string()
    }
}
