//! Template voxel selection.

use crate::image::Volume;
use crate::trace::{trace_event, trace_span};

/// Ordered millimetre coordinates of the template voxels that passed a predicate.
///
/// Built once per template and only read afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexSet {
    coords: Vec<[f64; 3]>,
}

impl IndexSet {
    /// Wraps precomputed millimetre coordinates.
    pub fn from_coords(coords: Vec<[f64; 3]>) -> Self {
        Self { coords }
    }

    /// Returns the coordinates in selection order.
    pub fn coords(&self) -> &[[f64; 3]] {
        &self.coords
    }

    /// Returns the number of selected coordinates.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Returns true when no voxel passed the predicate.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Iterates the coordinates in selection order.
    pub fn iter(&self) -> std::slice::Iter<'_, [f64; 3]> {
        self.coords.iter()
    }
}

/// Selects every voxel of `volume` whose value satisfies `predicate`.
///
/// Voxels are visited in lexicographic `(i, j, k)` order with `k` varying
/// fastest, so the result is reproducible for identical input data. Each
/// selected index is converted to millimetres through the volume's affine.
pub fn select_indices<F>(volume: &Volume, predicate: F) -> IndexSet
where
    F: Fn(f32) -> bool,
{
    let _span = trace_span!("select_indices").entered();
    let [nx, ny, nz] = volume.dims();
    let affine = volume.affine();
    let mut coords = Vec::new();
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                let Some(value) = volume.get(i, j, k) else {
                    continue;
                };
                if predicate(value) {
                    coords.push(affine.apply([i as f64, j as f64, k as f64]));
                }
            }
        }
    }
    trace_event!("indices_selected", count = coords.len());
    IndexSet { coords }
}
