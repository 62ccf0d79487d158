//! NIfTI-1 loading via the `nifti` crate.
//!
//! Available when the `nifti-io` feature is enabled. Both `.nii` and
//! `.nii.gz` are accepted; sample scaling (`scl_slope`/`scl_inter`) is applied
//! by the decoder.

use crate::image::{Affine, Image, ImageProvider};
use crate::util::{CompMatchError, CompMatchResult};
use ndarray::{Axis, Ix4};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use std::path::Path;

/// Image provider backed by NIfTI files on the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct NiftiProvider;

impl ImageProvider for NiftiProvider {
    fn load(&self, path: &Path) -> CompMatchResult<Image> {
        load_nifti_image(path)
    }
}

/// Loads a 3D or 4D NIfTI image from disk.
pub fn load_nifti_image<P: AsRef<Path>>(path: P) -> CompMatchResult<Image> {
    let obj = ReaderOptions::new()
        .read_file(path.as_ref())
        .map_err(|err| CompMatchError::ImageIo {
            reason: err.to_string(),
        })?;
    let affine = header_affine(obj.header());

    let array = obj
        .into_volume()
        .into_ndarray::<f32>()
        .map_err(|err| CompMatchError::ImageIo {
            reason: err.to_string(),
        })?;
    let array = match array.ndim() {
        3 => array.insert_axis(Axis(3)),
        4 => array,
        n => {
            return Err(CompMatchError::ImageIo {
                reason: format!("expected a 3D or 4D image, got {n}D"),
            })
        }
    };
    let array = array
        .into_dimensionality::<Ix4>()
        .map_err(|err| CompMatchError::ImageIo {
            reason: err.to_string(),
        })?;

    let (nx, ny, nz, nt) = array.dim();
    // Reversed axes iterate with x fastest, matching `Image`'s layout.
    let data: Vec<f32> = array.t().iter().copied().collect();
    Image::new(data, [nx, ny, nz, nt], affine)
}

/// Voxel-to-millimetre affine from the header: sform, then qform, then pixdim.
pub fn header_affine(header: &NiftiHeader) -> Affine {
    if header.sform_code > 0 {
        let row = |r: &[f32; 4]| [r[0] as f64, r[1] as f64, r[2] as f64, r[3] as f64];
        return Affine::new([
            row(&header.srow_x),
            row(&header.srow_y),
            row(&header.srow_z),
        ]);
    }
    let pixdim = [
        header.pixdim[1] as f64,
        header.pixdim[2] as f64,
        header.pixdim[3] as f64,
    ];
    if header.qform_code > 0 {
        return qform_affine(header, pixdim);
    }
    Affine::from_voxel_size(pixdim, [0.0, 0.0, 0.0])
}

fn qform_affine(header: &NiftiHeader, pixdim: [f64; 3]) -> Affine {
    let (b, c, d) = (
        header.quatern_b as f64,
        header.quatern_c as f64,
        header.quatern_d as f64,
    );
    let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();
    let qfac = if header.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
    let r = [
        [a * a + b * b - c * c - d * d, 2.0 * (b * c - a * d), 2.0 * (b * d + a * c)],
        [2.0 * (b * c + a * d), a * a + c * c - b * b - d * d, 2.0 * (c * d - a * b)],
        [2.0 * (b * d - a * c), 2.0 * (c * d + a * b), a * a + d * d - c * c - b * b],
    ];
    let scale = [pixdim[0], pixdim[1], pixdim[2] * qfac];
    let offset = [
        header.quatern_x as f64,
        header.quatern_y as f64,
        header.quatern_z as f64,
    ];
    let mut rows = [[0.0f64; 4]; 3];
    for i in 0..3 {
        for j in 0..3 {
            rows[i][j] = r[i][j] * scale[j];
        }
        rows[i][3] = offset[i];
    }
    Affine::new(rows)
}
