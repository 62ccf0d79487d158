#![allow(dead_code)]

use compmatch::{Affine, CompMatchError, CompMatchResult, Image, ImageProvider, Volume};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Serves images from memory and records every load request.
#[derive(Default)]
pub struct MemoryProvider {
    images: HashMap<PathBuf, Image>,
    loads: Mutex<Vec<PathBuf>>,
}

impl MemoryProvider {
    pub fn insert(&mut self, path: impl Into<PathBuf>, image: Image) {
        self.images.insert(path.into(), image);
    }

    pub fn insert_volume(&mut self, path: impl Into<PathBuf>, volume: Volume) {
        self.insert(path, Image::from_volume(volume));
    }

    pub fn loads(&self) -> Vec<PathBuf> {
        self.loads.lock().unwrap().clone()
    }
}

impl ImageProvider for MemoryProvider {
    fn load(&self, path: &Path) -> CompMatchResult<Image> {
        self.loads.lock().unwrap().push(path.to_path_buf());
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| CompMatchError::ImageIo {
                reason: format!("no such image {}", path.display()),
            })
    }

    fn exists(&self, path: &Path) -> bool {
        self.images.contains_key(path)
    }
}

/// 2 mm MNI-like grid with its origin shifted off zero.
pub fn mm_affine() -> Affine {
    Affine::from_voxel_size([2.0, 2.0, 2.0], [-6.0, -6.0, -6.0])
}

/// 6x6x6 template: a positive blob, a negative blob, zeros elsewhere.
pub fn template_volume() -> Volume {
    Volume::from_fn([6, 6, 6], mm_affine(), |i, j, k| {
        if (1..3).contains(&i) && (1..3).contains(&j) && (1..3).contains(&k) {
            (1 + i + j + k) as f32
        } else if i == 4 && j == 4 {
            -3.0
        } else {
            0.0
        }
    })
    .unwrap()
}

/// Deterministic pseudo-random volume sharing the template grid.
pub fn noise_volume(seed: usize) -> Volume {
    Volume::from_fn([6, 6, 6], mm_affine(), |i, j, k| {
        let h = (i * 73 + j * 151 + k * 197 + seed * 31) % 17;
        h as f32 - 8.0
    })
    .unwrap()
}

pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("compmatch-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
