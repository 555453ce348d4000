//! Local field grid: owned cells plus halo, stored flat in row-major order.
//!
//! The first axis varies slowest and the last fastest, so for a 3-D grid of
//! size `(sx, sy, sz)` the cell `(x, y, z)` sits at `(x * sy + y) * sz + z`.
//! Halo cells are ordinary cells of the same array; the halo exchange reads
//! owned cells and replaces halo cells through the same accessors.

use crate::data::field_value::{FieldPointValue, TimeLevels};
use crate::data::sample::Sample;
use crate::debug_invariants::DebugInvariants;
use crate::grid_error::GridError;
use crate::topology::coord::Coord;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Minimum and maximum of the real and imaginary parts over a grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ValueRange {
    pub min_re: f64,
    pub max_re: f64,
    pub min_im: f64,
    pub max_im: f64,
}

impl ValueRange {
    fn of<T: Sample>(v: &T) -> Self {
        let (re, im) = (v.re(), v.im());
        ValueRange {
            min_re: re,
            max_re: re,
            min_im: im,
            max_im: im,
        }
    }

    fn merge(self, other: ValueRange) -> ValueRange {
        ValueRange {
            min_re: self.min_re.min(other.min_re),
            max_re: self.max_re.max(other.max_re),
            min_im: self.min_im.min(other.min_im),
            max_im: self.max_im.max(other.max_im),
        }
    }
}

/// Dense local grid of field-point values.
#[derive(Clone, Debug)]
pub struct Grid<T> {
    size: Coord,
    levels: TimeLevels,
    cells: Vec<FieldPointValue<T>>,
    time_step: usize,
}

impl<T: Sample> Grid<T> {
    /// Grid of `size` with every cell zeroed.
    pub fn new(size: Coord, levels: TimeLevels) -> Self {
        Grid {
            size,
            levels,
            cells: vec![FieldPointValue::zeroed(levels); size.volume()],
            time_step: 0,
        }
    }

    #[inline]
    pub fn size(&self) -> Coord {
        self.size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn levels(&self) -> TimeLevels {
        self.levels
    }

    /// Number of completed `shift_in_time` calls.
    #[inline]
    pub fn time_step(&self) -> usize {
        self.time_step
    }

    /// Row-major linear index of `coord`.
    pub fn linear_index(&self, coord: &Coord) -> Result<usize, GridError> {
        if !coord.is_inside(&self.size) {
            return Err(GridError::OutOfBounds {
                coord: *coord,
                size: self.size,
            });
        }
        Ok(coord
            .as_slice()
            .iter()
            .zip(self.size.as_slice())
            .fold(0, |idx, (c, s)| idx * s + c))
    }

    /// Coordinate of a linear index; inverse of [`Grid::linear_index`].
    pub fn coord_of(&self, index: usize) -> Result<Coord, GridError> {
        if index >= self.len() {
            return Err(GridError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        let mut out = self.size;
        let mut rest = index;
        for a in (0..self.size.rank()).rev() {
            let s = self.size.get(a);
            out.set(a, rest % s);
            rest /= s;
        }
        Ok(out)
    }

    pub fn get(&self, coord: &Coord) -> Result<&FieldPointValue<T>, GridError> {
        let i = self.linear_index(coord)?;
        Ok(&self.cells[i])
    }

    pub fn get_mut(&mut self, coord: &Coord) -> Result<&mut FieldPointValue<T>, GridError> {
        let i = self.linear_index(coord)?;
        Ok(&mut self.cells[i])
    }

    pub fn get_index(&self, index: usize) -> Result<&FieldPointValue<T>, GridError> {
        let len = self.len();
        self.cells
            .get(index)
            .ok_or(GridError::IndexOutOfBounds { index, len })
    }

    /// Replace the value at `coord`.
    ///
    /// # Errors
    /// [`GridError::OutOfBounds`] outside the grid and
    /// [`GridError::TimeLevelMismatch`] when `value` retains a different
    /// number of levels than the grid.
    pub fn set(&mut self, coord: &Coord, value: FieldPointValue<T>) -> Result<(), GridError> {
        let i = self.linear_index(coord)?;
        self.set_index(i, value)
    }

    pub fn set_index(&mut self, index: usize, value: FieldPointValue<T>) -> Result<(), GridError> {
        if value.levels() != self.levels {
            return Err(GridError::TimeLevelMismatch {
                expected: self.levels.count(),
                got: value.levels().count(),
            });
        }
        let len = self.len();
        let slot = self
            .cells
            .get_mut(index)
            .ok_or(GridError::IndexOutOfBounds { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Cells in linear-index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &FieldPointValue<T>)> {
        self.cells.iter().enumerate()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut FieldPointValue<T>)> {
        self.cells.iter_mut().enumerate()
    }

    /// Advance every cell one time step and bump the step counter.
    pub fn shift_in_time(&mut self) {
        for cell in &mut self.cells {
            cell.shift_in_time();
        }
        self.time_step += 1;
        self.debug_assert_invariants();
    }

    /// Range of the values stored at `level` (0 = current).
    ///
    /// `None` when the grid is empty or does not retain that level.
    pub fn value_range(&self, level: usize) -> Option<ValueRange> {
        if level >= self.levels.count() {
            return None;
        }
        #[cfg(feature = "rayon")]
        let range = self
            .cells
            .par_iter()
            .filter_map(|c| c.level(level).map(|v| ValueRange::of(&v)))
            .reduce_with(ValueRange::merge);
        #[cfg(not(feature = "rayon"))]
        let range = self
            .cells
            .iter()
            .filter_map(|c| c.level(level).map(|v| ValueRange::of(&v)))
            .reduce(ValueRange::merge);
        range
    }
}

impl<T: Sample> DebugInvariants for Grid<T> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Grid");
    }

    fn validate_invariants(&self) -> Result<(), GridError> {
        if self.cells.len() != self.size.volume() {
            return Err(GridError::IndexOutOfBounds {
                index: self.cells.len(),
                len: self.size.volume(),
            });
        }
        if let Some(bad) = self.cells.iter().find(|c| c.levels() != self.levels) {
            return Err(GridError::TimeLevelMismatch {
                expected: self.levels.count(),
                got: bad.levels().count(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;

    #[test]
    fn index_is_row_major_x_slowest() {
        let g = Grid::<f64>::new(Coord::new3(2, 3, 4), TimeLevels::One);
        assert_eq!(g.len(), 24);
        assert_eq!(g.linear_index(&Coord::new3(0, 0, 1)).unwrap(), 1);
        assert_eq!(g.linear_index(&Coord::new3(0, 1, 0)).unwrap(), 4);
        assert_eq!(g.linear_index(&Coord::new3(1, 0, 0)).unwrap(), 12);
        for i in 0..g.len() {
            let c = g.coord_of(i).unwrap();
            assert_eq!(g.linear_index(&c).unwrap(), i);
        }
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let mut g = Grid::<f32>::new(Coord::new2(2, 2), TimeLevels::Two);
        assert!(matches!(
            g.get(&Coord::new2(2, 0)),
            Err(GridError::OutOfBounds { .. })
        ));
        assert!(matches!(
            g.get(&Coord::new1(0)),
            Err(GridError::OutOfBounds { .. })
        ));
        assert!(g.coord_of(4).is_err());
        let one = FieldPointValue::from_levels(&[1.0f32]).unwrap();
        assert!(matches!(
            g.set(&Coord::new2(0, 0), one),
            Err(GridError::TimeLevelMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn set_replaces_the_cell() {
        let mut g = Grid::<f64>::new(Coord::new1(3), TimeLevels::Two);
        let v = FieldPointValue::from_levels(&[7.0, 6.0]).unwrap();
        g.set(&Coord::new1(1), v).unwrap();
        assert_eq!(g.get(&Coord::new1(1)).unwrap(), &v);
        g.validate_invariants().unwrap();
    }

    #[test]
    fn shift_counts_steps() {
        let mut g = Grid::<f64>::new(Coord::new1(2), TimeLevels::Three);
        g.get_mut(&Coord::new1(0)).unwrap().set_current(1.0);
        g.shift_in_time();
        g.shift_in_time();
        assert_eq!(g.time_step(), 2);
        assert_eq!(g.get(&Coord::new1(0)).unwrap().as_slice(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn value_range_covers_both_parts() {
        let mut g = Grid::<Complex<f64>>::new(Coord::new1(3), TimeLevels::One);
        g.get_mut(&Coord::new1(0)).unwrap().set_current(Complex::new(-2.0, 1.0));
        g.get_mut(&Coord::new1(2)).unwrap().set_current(Complex::new(5.0, -4.0));
        let r = g.value_range(0).unwrap();
        assert_eq!((r.min_re, r.max_re), (-2.0, 5.0));
        assert_eq!((r.min_im, r.max_im), (-4.0, 1.0));
        assert_eq!(g.value_range(1), None);
    }

    fn with_stray_cell() -> Grid<f64> {
        let mut g = Grid::<f64>::new(Coord::new1(4), TimeLevels::Two);
        g.cells[1] = FieldPointValue::zeroed(TimeLevels::Three);
        g
    }

    #[test]
    fn stray_time_levels_are_reported() {
        let g = with_stray_cell();
        assert!(matches!(
            g.validate_invariants(),
            Err(GridError::TimeLevelMismatch { expected: 2, got: 3 })
        ));
    }

    #[cfg(any(debug_assertions, feature = "check-invariants"))]
    #[test]
    #[should_panic(expected = "[invariants] Grid")]
    fn shift_checks_invariants() {
        with_stray_cell().shift_in_time();
    }

    #[cfg(any(debug_assertions, feature = "check-invariants"))]
    #[test]
    #[should_panic(expected = "[invariants] Grid")]
    fn exchange_checks_invariants() {
        use crate::algs::communicator::NoComm;
        use crate::halo::exchange::HaloExchange;
        use crate::halo::plan::HaloPlan;
        use crate::topology::coord::AxisSet;
        use crate::topology::decomposition::decompose;
        use crate::topology::mesh::ProcessMesh;

        let mesh = ProcessMesh::new(Coord::new1(1), AxisSet::X).unwrap();
        let halo = Coord::new1(1);
        let d = decompose(&Coord::new1(2), &mesh, &halo, 0).unwrap().unwrap();
        let plan = HaloPlan::build(&d, &mesh, &halo, TimeLevels::Two).unwrap();
        let mut ex = HaloExchange::<f64>::new(plan);
        let mut g = with_stray_cell();
        let _ = ex.exchange(&mut g, &NoComm);
    }
}
