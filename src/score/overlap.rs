//! Scalar overlap kernel.

use crate::image::Volume;
use crate::score::{OverlapScores, ScoreMode};
use crate::template::IndexSet;
use crate::util::math::nearest_index;
use crate::util::CompMatchResult;

/// Samples `candidate` at every index-set coordinate and sums the values.
///
/// Coordinates are mapped through the candidate's inverted affine and rounded
/// to the nearest voxel; lookups outside the volume and NaN voxels contribute
/// zero.
pub fn overlap_scores(index_set: &IndexSet, candidate: &Volume) -> CompMatchResult<OverlapScores> {
    let inv = candidate.affine().inverse()?;
    let [nx, ny, nz] = candidate.dims();

    let mut signed = 0.0f64;
    let mut absolute = 0.0f64;
    for &mm in index_set.iter() {
        let v = inv.apply(mm);
        let value = match (
            nearest_index(v[0], nx),
            nearest_index(v[1], ny),
            nearest_index(v[2], nz),
        ) {
            (Some(i), Some(j), Some(k)) => candidate.get(i, j, k).unwrap_or(0.0),
            _ => 0.0,
        };
        if value.is_nan() {
            continue;
        }
        let value = value as f64;
        signed += value;
        absolute += value.abs();
    }

    Ok(OverlapScores { signed, absolute })
}

/// Computes the overlap score of `candidate` under `mode`.
pub fn score(index_set: &IndexSet, candidate: &Volume, mode: ScoreMode) -> CompMatchResult<f64> {
    overlap_scores(index_set, candidate).map(|scores| scores.get(mode))
}
