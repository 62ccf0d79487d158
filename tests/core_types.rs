mod common;

use common::{mm_affine, template_volume, MemoryProvider};
use compmatch::{Affine, Candidate, CompMatchError, Image, Template, Volume};
use std::path::{Path, PathBuf};

fn four_d(first: f32, second: f32, third: f32) -> Image {
    let mut data = Vec::new();
    for value in [first, second, third] {
        data.extend(std::iter::repeat(value).take(8));
    }
    Image::new(data, [2, 2, 2, 3], Affine::identity()).unwrap()
}

#[test]
fn image_rejects_mismatched_buffers() {
    let err = Image::new(vec![0.0; 7], [2, 2, 2, 1], Affine::identity())
        .err()
        .unwrap();
    assert_eq!(err, CompMatchError::BufferTooSmall { needed: 8, got: 7 });

    let err = Volume::new(vec![], [0, 1, 1], Affine::identity())
        .err()
        .unwrap();
    assert_eq!(
        err,
        CompMatchError::InvalidDimensions {
            dims: [0, 1, 1, 1]
        }
    );
}

#[test]
fn volume_indexing_is_column_major() {
    let vol = Volume::new((0..24).map(|v| v as f32).collect(), [2, 3, 4], Affine::identity())
        .unwrap();
    assert_eq!(vol.get(1, 0, 0), Some(1.0));
    assert_eq!(vol.get(0, 1, 0), Some(2.0));
    assert_eq!(vol.get(0, 0, 1), Some(6.0));
    assert_eq!(vol.get(1, 2, 3), Some(23.0));
    assert_eq!(vol.get(2, 0, 0), None);
}

#[test]
fn first_usable_volume_prefers_first_timepoint() {
    let vol = four_d(1.0, 2.0, 3.0).first_usable_volume().unwrap();
    assert!(vol.as_slice().iter().all(|v| *v == 1.0));
}

#[test]
fn first_usable_volume_falls_back_to_second() {
    let vol = four_d(0.0, 2.0, 3.0).first_usable_volume().unwrap();
    assert!(vol.as_slice().iter().all(|v| *v == 2.0));
}

#[test]
fn first_usable_volume_never_reaches_third() {
    assert!(four_d(0.0, 0.0, 3.0).first_usable_volume().is_none());
    assert!(four_d(0.0, f32::NAN, 3.0).first_usable_volume().is_none());
}

#[test]
fn empty_template_is_rejected() {
    let path = Path::new("/t/empty.nii.gz");
    let err = Template::from_image(path, &four_d(0.0, 0.0, 0.0))
        .err()
        .unwrap();
    assert_eq!(
        err,
        CompMatchError::TemplateEmpty {
            path: PathBuf::from(path)
        }
    );
}

#[test]
fn template_resolves_its_volume() {
    let mut provider = MemoryProvider::default();
    provider.insert_volume("/t/dmn.nii", template_volume());
    let template = Template::load(Path::new("/t/dmn.nii"), &provider).unwrap();
    assert_eq!(template.volume(), &template_volume());
    assert_eq!(template.path(), Path::new("/t/dmn.nii"));
}

#[test]
fn candidate_load_failures_are_unreadable() {
    let mut provider = MemoryProvider::default();
    let empty = Volume::from_fn([2, 2, 2], mm_affine(), |_, _, _| 0.0).unwrap();
    provider.insert_volume("/s1/empty.nii", empty);

    let err = Candidate::load("/s1", Path::new("/s1/missing.nii"), &provider)
        .err()
        .unwrap();
    assert!(matches!(err, CompMatchError::CandidateUnreadable { ref path, .. } if path == Path::new("/s1/missing.nii")));

    let err = Candidate::load("/s1", Path::new("/s1/empty.nii"), &provider)
        .err()
        .unwrap();
    assert!(matches!(err, CompMatchError::CandidateUnreadable { .. }));
}

#[test]
fn candidate_identity_is_full_path() {
    let mut provider = MemoryProvider::default();
    provider.insert_volume("/s1/compA.nii", template_volume());
    let candidate = Candidate::load("/s1", Path::new("/s1/compA.nii"), &provider).unwrap();
    assert_eq!(candidate.identity(), "/s1/compA.nii");
    assert_eq!(candidate.subject(), "/s1");
}
