//! Volumetric images and the image-provider seam.
//!
//! `Image` holds a 3D or 4D scalar field in column-major voxel order (x varies
//! fastest, then y, z and time) together with its voxel-to-millimetre affine.
//! Matching always works on a single 3D `Volume`, resolved with
//! [`Image::first_usable_volume`]: the first timepoint, or the second if the
//! first is entirely empty.

use crate::util::{CompMatchError, CompMatchResult};
use std::path::Path;

mod affine;
#[cfg(feature = "nifti-io")]
pub mod io;

pub use affine::Affine;

/// Loads images and answers existence queries for candidate discovery.
///
/// The pipeline never touches image files directly; tests substitute an
/// in-memory implementation.
pub trait ImageProvider: Sync {
    /// Loads the image stored at `path`.
    fn load(&self, path: &Path) -> CompMatchResult<Image>;

    /// Returns true when `path` names an existing file.
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Owned 3D/4D image with its affine.
#[derive(Clone, Debug)]
pub struct Image {
    data: Vec<f32>,
    dims: [usize; 4],
    affine: Affine,
}

impl Image {
    /// Creates an image from column-major data with dimensions `[nx, ny, nz, nt]`.
    pub fn new(data: Vec<f32>, dims: [usize; 4], affine: Affine) -> CompMatchResult<Self> {
        let needed = voxel_count(dims)?;
        if data.len() != needed {
            return Err(CompMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self { data, dims, affine })
    }

    /// Wraps a single 3D volume as a one-timepoint image.
    pub fn from_volume(volume: Volume) -> Self {
        let [nx, ny, nz] = volume.dims;
        Self {
            data: volume.data,
            dims: [nx, ny, nz, 1],
            affine: volume.affine,
        }
    }

    /// Returns `[nx, ny, nz, nt]`.
    pub fn dims(&self) -> [usize; 4] {
        self.dims
    }

    /// Returns the number of timepoints.
    pub fn timepoints(&self) -> usize {
        self.dims[3]
    }

    /// Returns the voxel-to-millimetre affine.
    pub fn affine(&self) -> &Affine {
        &self.affine
    }

    /// Returns the column-major samples of timepoint `t`.
    pub fn timepoint(&self, t: usize) -> Option<&[f32]> {
        if t >= self.dims[3] {
            return None;
        }
        let len = self.dims[0] * self.dims[1] * self.dims[2];
        self.data.get(t * len..(t + 1) * len)
    }

    /// Copies timepoint `t` out as a 3D volume.
    pub fn volume(&self, t: usize) -> Option<Volume> {
        let data = self.timepoint(t)?.to_vec();
        Some(Volume {
            data,
            dims: [self.dims[0], self.dims[1], self.dims[2]],
            affine: self.affine,
        })
    }

    /// Returns the first non-empty timepoint among the first two.
    ///
    /// A timepoint is empty when no voxel holds a non-zero, non-NaN value.
    pub fn first_usable_volume(&self) -> Option<Volume> {
        (0..self.timepoints().min(2))
            .find(|&t| self.timepoint(t).is_some_and(has_signal))
            .and_then(|t| self.volume(t))
    }
}

/// Owned 3D scalar field addressed by `(i, j, k)` voxel indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
    data: Vec<f32>,
    dims: [usize; 3],
    affine: Affine,
}

impl Volume {
    /// Creates a volume from column-major data (i varies fastest).
    pub fn new(data: Vec<f32>, dims: [usize; 3], affine: Affine) -> CompMatchResult<Self> {
        let needed = voxel_count([dims[0], dims[1], dims[2], 1])?;
        if data.len() != needed {
            return Err(CompMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self { data, dims, affine })
    }

    /// Builds a volume by evaluating `f(i, j, k)` at every voxel.
    pub fn from_fn<F>(dims: [usize; 3], affine: Affine, mut f: F) -> CompMatchResult<Self>
    where
        F: FnMut(usize, usize, usize) -> f32,
    {
        let needed = voxel_count([dims[0], dims[1], dims[2], 1])?;
        let mut data = Vec::with_capacity(needed);
        for k in 0..dims[2] {
            for j in 0..dims[1] {
                for i in 0..dims[0] {
                    data.push(f(i, j, k));
                }
            }
        }
        Ok(Self { data, dims, affine })
    }

    /// Returns `[nx, ny, nz]`.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Returns the voxel-to-millimetre affine.
    pub fn affine(&self) -> &Affine {
        &self.affine
    }

    /// Returns the column-major sample buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns the value at `(i, j, k)` if it is within bounds.
    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<f32> {
        let [nx, ny, nz] = self.dims;
        if i >= nx || j >= ny || k >= nz {
            return None;
        }
        self.data.get(i + nx * (j + ny * k)).copied()
    }

    /// Returns a copy with every sample multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            data: self.data.iter().map(|v| v * factor).collect(),
            dims: self.dims,
            affine: self.affine,
        }
    }
}

fn has_signal(samples: &[f32]) -> bool {
    samples.iter().any(|v| *v != 0.0 && !v.is_nan())
}

fn voxel_count(dims: [usize; 4]) -> CompMatchResult<usize> {
    if dims.contains(&0) {
        return Err(CompMatchError::InvalidDimensions { dims });
    }
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or(CompMatchError::InvalidDimensions { dims })
}
