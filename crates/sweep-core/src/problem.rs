use serde::Serialize;
use std::fmt;

use crate::error::{SweepError, SweepResult};

/// Smallest exponent on both axes unless configured otherwise.
pub const DEFAULT_MIN_EXPONENT: u32 = 10;

/// Largest exponent accepted on either axis.
pub const MAX_EXPONENT: u32 = 62;

/// One `(N, Nx)` cell of the sweep: particle count and grid-point count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProblemSize {
    #[serde(rename = "N")]
    pub n: u64,
    #[serde(rename = "Nx")]
    pub nx: u64,
}

impl ProblemSize {
    pub fn new(n: u64, nx: u64) -> Self {
        Self { n, nx }
    }
}

impl fmt::Display for ProblemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(N={}, Nx={})", self.n, self.nx)
    }
}

/// Powers of two `2^min_exp ..= 2^max_exp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Axis {
    min_exp: u32,
    max_exp: u32,
}

impl Axis {
    pub fn new(min_exp: u32, max_exp: u32) -> SweepResult<Self> {
        if max_exp > MAX_EXPONENT {
            return Err(SweepError::InvalidAxis(format!(
                "exponent {max_exp} exceeds the maximum of {MAX_EXPONENT}"
            )));
        }
        if max_exp < min_exp {
            return Err(SweepError::InvalidAxis(format!(
                "max exponent {max_exp} is below the min exponent {min_exp}"
            )));
        }
        Ok(Self { min_exp, max_exp })
    }

    pub fn min_exp(&self) -> u32 {
        self.min_exp
    }

    pub fn max_exp(&self) -> u32 {
        self.max_exp
    }

    pub fn len(&self) -> usize {
        (self.max_exp - self.min_exp + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> impl Iterator<Item = u64> + Clone {
        (self.min_exp..=self.max_exp).map(|k| 1u64 << k)
    }

    /// Exponent of `value` if it is a power of two lying on this axis.
    pub fn exponent_of(&self, value: u64) -> Option<u32> {
        if !value.is_power_of_two() {
            return None;
        }
        let k = value.trailing_zeros();
        (self.min_exp..=self.max_exp).contains(&k).then_some(k)
    }

    pub fn contains(&self, value: u64) -> bool {
        self.exponent_of(value).is_some()
    }
}

/// The full grid of problem sizes for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sweep {
    pub n_axis: Axis,
    pub nx_axis: Axis,
}

impl Sweep {
    /// Both axes share `min_exp`.
    pub fn new(min_exp: u32, n_max_exp: u32, nx_max_exp: u32) -> SweepResult<Self> {
        Ok(Self {
            n_axis: Axis::new(min_exp, n_max_exp)?,
            nx_axis: Axis::new(min_exp, nx_max_exp)?,
        })
    }

    /// N-major, Nx-minor; matches the directory nesting.
    pub fn problem_sizes(&self) -> Vec<ProblemSize> {
        let nx_values = self.nx_axis.values();
        self.n_axis
            .values()
            .flat_map(|n| nx_values.clone().map(move |nx| ProblemSize::new(n, nx)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.n_axis.len() * self.nx_axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, size: ProblemSize) -> bool {
        self.n_axis.contains(size.n) && self.nx_axis.contains(size.nx)
    }
}
