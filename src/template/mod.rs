//! Template loading and index selection.

use crate::image::{Image, ImageProvider, Volume};
use crate::util::{CompMatchError, CompMatchResult};
use std::path::{Path, PathBuf};

mod criterion;
mod select;

pub use criterion::{Comparison, Criterion};
pub use select::{select_indices, IndexSet};

/// Reference map whose thresholded voxels define the scoring locations.
#[derive(Clone, Debug)]
pub struct Template {
    path: PathBuf,
    volume: Volume,
}

impl Template {
    /// Loads the template through `provider` and resolves its usable volume.
    pub fn load<P: ImageProvider + ?Sized>(path: &Path, provider: &P) -> CompMatchResult<Self> {
        let image = provider.load(path)?;
        Self::from_image(path, &image)
    }

    /// Resolves the first usable timepoint of an already loaded image.
    pub fn from_image(path: &Path, image: &Image) -> CompMatchResult<Self> {
        let volume = image
            .first_usable_volume()
            .ok_or_else(|| CompMatchError::TemplateEmpty {
                path: path.to_path_buf(),
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            volume,
        })
    }

    /// Returns the path the template was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the resolved 3D volume.
    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Selects the template voxels satisfying `criterion`.
    pub fn select(&self, criterion: &Criterion) -> IndexSet {
        select_indices(&self.volume, |v| criterion.accepts(v))
    }
}
