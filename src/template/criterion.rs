//! Threshold criteria used to select template voxels.

use crate::util::CompMatchError;
use std::fmt;
use std::str::FromStr;

/// Comparison operator applied as `voxel <op> value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    GreaterEq,
    Less,
    LessEq,
    Equal,
    NotEqual,
}

impl Comparison {
    /// Returns the operator as written on the command line.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Greater => ">",
            Comparison::GreaterEq => ">=",
            Comparison::Less => "<",
            Comparison::LessEq => "<=",
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
        }
    }
}

impl FromStr for Comparison {
    type Err = CompMatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ">" | "gt" => Ok(Comparison::Greater),
            ">=" | "ge" => Ok(Comparison::GreaterEq),
            "<" | "lt" => Ok(Comparison::Less),
            "<=" | "le" => Ok(Comparison::LessEq),
            "==" | "=" | "eq" => Ok(Comparison::Equal),
            "!=" | "ne" => Ok(Comparison::NotEqual),
            other => Err(CompMatchError::InvalidCriterion(other.to_owned())),
        }
    }
}

/// Voxel predicate `value <comparison> threshold`.
///
/// NaN voxels never satisfy a criterion, including `!=`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Criterion {
    pub comparison: Comparison,
    pub value: f32,
}

impl Criterion {
    /// Creates a criterion.
    pub fn new(comparison: Comparison, value: f32) -> Self {
        Self { comparison, value }
    }

    /// Strictly positive voxels.
    pub fn positive() -> Self {
        Self::new(Comparison::Greater, 0.0)
    }

    /// Evaluates the predicate for one voxel value.
    #[inline]
    pub fn accepts(&self, v: f32) -> bool {
        if v.is_nan() {
            return false;
        }
        let t = self.value;
        match self.comparison {
            Comparison::Greater => v > t,
            Comparison::GreaterEq => v >= t,
            Comparison::Less => v < t,
            Comparison::LessEq => v <= t,
            Comparison::Equal => v == t,
            Comparison::NotEqual => v != t,
        }
    }
}

impl Default for Criterion {
    fn default() -> Self {
        Self::positive()
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.comparison.symbol(), self.value)
    }
}
