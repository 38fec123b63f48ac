use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracking_frame::{
    Descriptor, Feature, FeatureGrid, GRID_COLS, GRID_ROWS, GridCalibration, ImageBounds,
    KeyPoint,
};

fn random_features(rng: &mut ChaCha8Rng, n: usize, bounds: &ImageBounds) -> Vec<Feature> {
    (0..n)
        .map(|_| {
            // spill a bit outside the bounds so some features are not gridded
            let x = rng.random_range(bounds.min_x - 30.0..bounds.max_x + 30.0);
            let y = rng.random_range(bounds.min_y - 30.0..bounds.max_y + 30.0);
            let kp = KeyPoint::new(x, y, rng.random_range(0..8));
            Feature {
                frame_id: 7,
                keypoint: kp,
                undistorted: kp,
                descriptor: Descriptor::zeros(),
            }
        })
        .collect()
}

fn brute_force(
    grid: &FeatureGrid,
    features: &[Feature],
    x: f32,
    y: f32,
    r: f32,
    min_level: i32,
    max_level: i32,
) -> Vec<usize> {
    let check_levels = min_level > 0 || max_level >= 0;
    let mut hits: Vec<usize> = features
        .iter()
        .enumerate()
        .filter(|(_, f)| grid.cell_of(f.undistorted.x(), f.undistorted.y()).is_some())
        .filter(|(_, f)| {
            let o = f.undistorted.octave;
            !check_levels || (o >= min_level && (max_level < 0 || o <= max_level))
        })
        .filter(|(_, f)| {
            (f.undistorted.x() - x).abs() < r && (f.undistorted.y() - y).abs() < r
        })
        .map(|(i, _)| i)
        .collect();
    hits.sort();
    hits
}

#[test]
fn query_matches_brute_force() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let bounds = ImageBounds {
        min_x: -35.5,
        max_x: 790.25,
        min_y: -20.0,
        max_y: 505.0,
    };
    let calibration = GridCalibration::from_bounds(bounds).unwrap();
    let features = random_features(&mut rng, 2000, &bounds);
    let grid = FeatureGrid::build(calibration, &features);

    for _ in 0..300 {
        let x = rng.random_range(-60.0..820.0);
        let y = rng.random_range(-60.0..540.0);
        let r = rng.random_range(0.0..60.0);
        let min_level = rng.random_range(-1..4);
        let max_level = rng.random_range(-1..8);

        let mut got = grid.features_in_area(&features, x, y, r, min_level, max_level);
        got.sort();
        let expected = brute_force(&grid, &features, x, y, r, min_level, max_level);
        assert_eq!(got, expected, "query ({x}, {y}, {r}, {min_level}, {max_level})");
    }
}

#[test]
fn every_feature_in_at_most_one_cell() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let bounds = ImageBounds::from_size(640, 480);
    let calibration = GridCalibration::from_bounds(bounds).unwrap();
    let features = random_features(&mut rng, 1500, &bounds);
    let grid = FeatureGrid::build(calibration, &features);

    let mut seen = vec![0usize; features.len()];
    for col in 0..GRID_COLS {
        for row in 0..GRID_ROWS {
            for &idx in grid.cell(col, row) {
                seen[idx] += 1;
                let f = &features[idx];
                assert_eq!(grid.cell_of(f.undistorted.x(), f.undistorted.y()), Some((col, row)));
            }
        }
    }
    for (idx, f) in features.iter().enumerate() {
        let (x, y) = (f.undistorted.x(), f.undistorted.y());
        let expected = usize::from(grid.cell_of(x, y).is_some());
        assert_eq!(seen[idx], expected, "feature {idx} at ({x}, {y})");
        // outside the bounds rectangle by more than half a cell: never gridded
        let half = calibration.cell_width() / 2.0;
        let far_outside =
            x < bounds.min_x - half || x > bounds.max_x || y < bounds.min_y - half || y > bounds.max_y;
        if far_outside {
            assert_eq!(seen[idx], 0);
        }
        // inside, away from the rounded-off far edge: gridded exactly once
        if bounds.contains(x, y) && x < bounds.max_x - half && y < bounds.max_y - half {
            assert_eq!(seen[idx], 1);
        }
    }
    assert_eq!(grid.len(), seen.iter().sum::<usize>());
}

#[test]
fn cells_keep_feature_list_order() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let bounds = ImageBounds::from_size(64, 48);
    let calibration = GridCalibration::from_bounds(bounds).unwrap();
    // 1 px cells, many collisions
    let features = random_features(&mut rng, 500, &bounds);
    let grid = FeatureGrid::build(calibration, &features);
    for col in 0..GRID_COLS {
        for row in 0..GRID_ROWS {
            let cell = grid.cell(col, row);
            assert!(cell.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

#[test]
fn radius_zero_never_matches() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let bounds = ImageBounds::from_size(640, 480);
    let calibration = GridCalibration::from_bounds(bounds).unwrap();
    let features = random_features(&mut rng, 300, &bounds);
    let grid = FeatureGrid::build(calibration, &features);
    for f in &features {
        let (x, y) = (f.undistorted.x(), f.undistorted.y());
        assert!(grid.features_in_area(&features, x, y, 0.0, -1, -1).is_empty());
    }
}
