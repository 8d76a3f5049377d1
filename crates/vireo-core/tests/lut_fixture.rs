//! `.cube` fixtures on disk through the LUT slot.

use std::path::PathBuf;

use glam::Vec3;
use vireo_core::transform::lut::{LutCube, LutDimension, LutError};
use vireo_core::transform::slot::LutSlot;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_corner_fixture_parses() {
    let cube = LutCube::load(&fixture("rgb_corners.cube")).unwrap();
    assert_eq!(cube.dimension(), LutDimension::ThreeD(2));
    assert_eq!(cube.size(), 2);
    assert_eq!(cube.domain_min(), Vec3::ZERO);
    assert_eq!(cube.domain_max(), Vec3::ONE);
    assert_eq!(cube.values().len(), 8);
    assert_eq!(cube.title(), Some("RGB corners"));
    assert_eq!(cube.values()[1], Vec3::X);
    assert_eq!(cube.values()[7], Vec3::ONE);
}

#[test]
fn test_corner_fixture_is_identity() {
    let cube = LutCube::load(&fixture("rgb_corners.cube")).unwrap();
    for rgb in [[0.1, 0.5, 0.9], [0.33, 0.66, 0.0], [1.0, 0.25, 0.75]] {
        let out = cube.sample(rgb);
        for c in 0..3 {
            assert!((out[c] - rgb[c]).abs() < 1e-5, "{rgb:?} -> {out:?}");
        }
    }
}

#[test]
fn test_failed_load_keeps_previous_lut() {
    let slot = LutSlot::new();
    let first = slot.load_file(&fixture("rgb_corners.cube")).unwrap();

    let err = slot.load_file(&fixture("short_data.cube")).unwrap_err();
    assert!(matches!(
        err,
        LutError::InvalidDataCount {
            expected: 8,
            actual: 7
        }
    ));
    let current = slot.current().unwrap();
    assert_eq!(current, first);

    assert!(matches!(
        slot.load_file(&fixture("does_not_exist.cube")),
        Err(LutError::Io(_))
    ));
    assert_eq!(slot.current().unwrap().generation(), first.generation());
}

#[test]
fn test_generated_cube_round_trips_through_file() {
    let dir = std::env::temp_dir().join(format!("vireo-lut-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("generated.cube");

    let values: Vec<Vec3> = (0..27)
        .map(|i| Vec3::new(i as f32 / 26.0, (i % 5) as f32 * 0.1, 1.0 / (i + 1) as f32))
        .collect();
    let cube = LutCube::new(
        LutDimension::ThreeD(3),
        Vec3::new(-0.5, 0.0, 0.0),
        Vec3::new(1.5, 2.0, 1.0),
        values,
    )
    .unwrap();
    cube.save(&path).unwrap();
    let back = LutCube::load(&path).unwrap();
    assert_eq!(back, cube);

    std::fs::remove_dir_all(&dir).ok();
}
