//! Per-cell storage of a field across the retained time levels.

use crate::data::sample::Sample;
use crate::grid_error::GridError;
use serde::{Deserialize, Serialize};

/// How many time levels each cell retains.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum TimeLevels {
    /// Current value only.
    One = 1,
    /// Current and previous.
    Two = 2,
    /// Current, previous and previous-previous.
    #[default]
    Three = 3,
}

impl TimeLevels {
    #[inline]
    pub const fn count(self) -> usize {
        self as usize
    }

    pub fn from_count(n: usize) -> Result<Self, GridError> {
        match n {
            1 => Ok(TimeLevels::One),
            2 => Ok(TimeLevels::Two),
            3 => Ok(TimeLevels::Three),
            _ => Err(GridError::TimeLevelMismatch {
                expected: 3,
                got: n,
            }),
        }
    }
}

impl TryFrom<usize> for TimeLevels {
    type Error = GridError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        TimeLevels::from_count(n)
    }
}

impl From<TimeLevels> for usize {
    fn from(t: TimeLevels) -> Self {
        t.count()
    }
}

/// The value of a field at one cell: current, and optionally previous and
/// previous-previous time levels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FieldPointValue<T> {
    levels: TimeLevels,
    vals: [T; 3],
}

impl<T: Sample> FieldPointValue<T> {
    /// All retained levels set to zero.
    pub fn zeroed(levels: TimeLevels) -> Self {
        FieldPointValue {
            levels,
            vals: [T::zero(); 3],
        }
    }

    /// Build from the retained levels, current first.
    ///
    /// # Errors
    /// [`GridError::TimeLevelMismatch`] unless `vals` holds 1, 2 or 3 values.
    pub fn from_levels(vals: &[T]) -> Result<Self, GridError> {
        let levels = TimeLevels::from_count(vals.len())?;
        let mut out = Self::zeroed(levels);
        out.vals[..vals.len()].copy_from_slice(vals);
        Ok(out)
    }

    #[inline]
    pub fn levels(&self) -> TimeLevels {
        self.levels
    }

    /// Retained levels, current first.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.vals[..self.levels.count()]
    }

    #[inline]
    pub fn current(&self) -> T {
        self.vals[0]
    }

    pub fn previous(&self) -> Option<T> {
        (self.levels.count() >= 2).then_some(self.vals[1])
    }

    pub fn previous_previous(&self) -> Option<T> {
        (self.levels.count() >= 3).then_some(self.vals[2])
    }

    /// Value at level `level` (0 = current); `None` if not retained.
    pub fn level(&self, level: usize) -> Option<T> {
        self.as_slice().get(level).copied()
    }

    #[inline]
    pub fn set_current(&mut self, v: T) {
        self.vals[0] = v;
    }

    /// Set the previous level. Ignored when it is not retained.
    pub fn set_previous(&mut self, v: T) {
        if self.levels.count() >= 2 {
            self.vals[1] = v;
        }
    }

    /// Set the previous-previous level. Ignored when it is not retained.
    pub fn set_previous_previous(&mut self, v: T) {
        if self.levels.count() >= 3 {
            self.vals[2] = v;
        }
    }

    /// Advance one time step: previous moves to previous-previous and
    /// current to previous. Current keeps its value until the solver
    /// overwrites it.
    pub fn shift_in_time(&mut self) {
        let n = self.levels.count();
        for l in (1..n).rev() {
            self.vals[l] = self.vals[l - 1];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_beyond_count_are_absent() {
        let v = FieldPointValue::from_levels(&[1.0f64, 2.0]).unwrap();
        assert_eq!(v.levels(), TimeLevels::Two);
        assert_eq!(v.previous(), Some(2.0));
        assert_eq!(v.previous_previous(), None);
        assert_eq!(v.as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn shift_moves_levels_back() {
        let mut v = FieldPointValue::from_levels(&[3.0f32, 2.0, 1.0]).unwrap();
        v.shift_in_time();
        assert_eq!(v.as_slice(), &[3.0, 3.0, 2.0]);
        v.set_current(4.0);
        v.shift_in_time();
        assert_eq!(v.as_slice(), &[4.0, 4.0, 3.0]);
    }

    #[test]
    fn single_level_ignores_history() {
        let mut v = FieldPointValue::<f64>::zeroed(TimeLevels::One);
        v.set_previous(5.0);
        v.shift_in_time();
        assert_eq!(v.as_slice(), &[0.0]);
        assert!(FieldPointValue::<f64>::from_levels(&[]).is_err());
    }

    #[test]
    fn time_levels_serde_as_count() {
        assert_eq!(serde_json::to_string(&TimeLevels::Two).unwrap(), "2");
        let t: TimeLevels = serde_json::from_str("1").unwrap();
        assert_eq!(t, TimeLevels::One);
        assert!(serde_json::from_str::<TimeLevels>("4").is_err());
    }
}
