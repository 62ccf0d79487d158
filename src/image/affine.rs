//! Voxel-to-millimetre affine transforms.

use crate::util::math::{det3, invert3};
use crate::util::{CompMatchError, CompMatchResult};

/// Row-major 3x4 affine mapping voxel indices `(i, j, k)` to millimetres.
///
/// The implicit fourth row is `[0, 0, 0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    rows: [[f64; 4]; 3],
}

impl Affine {
    /// Creates an affine from its three explicit rows.
    pub fn new(rows: [[f64; 4]; 3]) -> Self {
        Self { rows }
    }

    /// Identity mapping: one voxel per millimetre, origin at voxel zero.
    pub fn identity() -> Self {
        Self::from_voxel_size([1.0, 1.0, 1.0], [0.0, 0.0, 0.0])
    }

    /// Axis-aligned affine from voxel sizes and the millimetre origin.
    pub fn from_voxel_size(size: [f64; 3], origin: [f64; 3]) -> Self {
        Self::new([
            [size[0], 0.0, 0.0, origin[0]],
            [0.0, size[1], 0.0, origin[1]],
            [0.0, 0.0, size[2], origin[2]],
        ])
    }

    /// Returns the explicit rows.
    pub fn rows(&self) -> &[[f64; 4]; 3] {
        &self.rows
    }

    /// Maps a (possibly fractional) voxel coordinate through the affine.
    pub fn apply(&self, p: [f64; 3]) -> [f64; 3] {
        let mut out = [0.0f64; 3];
        for (dst, row) in out.iter_mut().zip(self.rows.iter()) {
            *dst = row[0] * p[0] + row[1] * p[1] + row[2] * p[2] + row[3];
        }
        out
    }

    /// Returns the inverse affine (millimetres to voxel coordinates).
    pub fn inverse(&self) -> CompMatchResult<Self> {
        let linear = self.linear();
        let inv = invert3(&linear).ok_or(CompMatchError::SingularAffine {
            determinant: det3(&linear),
        })?;
        let t = [self.rows[0][3], self.rows[1][3], self.rows[2][3]];
        let mut rows = [[0.0f64; 4]; 3];
        for r in 0..3 {
            rows[r][..3].copy_from_slice(&inv[r]);
            rows[r][3] = -(inv[r][0] * t[0] + inv[r][1] * t[1] + inv[r][2] * t[2]);
        }
        Ok(Self { rows })
    }

    fn linear(&self) -> [[f64; 3]; 3] {
        let mut m = [[0.0f64; 3]; 3];
        for (dst, row) in m.iter_mut().zip(self.rows.iter()) {
            dst.copy_from_slice(&row[..3]);
        }
        m
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}
