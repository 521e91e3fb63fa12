use super::*;
use crate::grid::Pos;
use crate::image::Depth;

// Four one-pixel pockets separated by walls of height 5; the dividing line
// must form on the central cross. Pattern occupies the 5x5 corner of the
// (rounded) canvas.
//
//   5 5 5 5 5
//   5 . 5 . 5      pockets at (1,1) (3,1) (1,3) (3,3)
//   5 5 5 5 5
//   5 . 5 . 5
//   5 5 5 5 5
fn pocket_scene() -> (Image, Image) {
  let mut src = Image::new(64, 6, Depth::Grey).unwrap();
  for y in 0..5 {
    for x in 0..5 {
      if !(x % 2 == 1 && y % 2 == 1) {
        src.put(x, y, 5);
      }
    }
  }
  let mut marker = Image::new(64, 6, Depth::Wide).unwrap();
  marker.put(1, 1, 1);
  marker.put(3, 1, 2);
  marker.put(1, 3, 3);
  marker.put(3, 3, 4);
  (src, marker)
}

fn pocket_of(x: u32, y: u32) -> u32 {
  match (x < 2, y < 2) {
    (true, true) => 1,
    (false, true) => 2,
    (true, false) => 3,
    (false, false) => 4,
  }
}

#[test]
fn test_watershed_line_forms_on_central_cross() {
  let (src, mut marker) = pocket_scene();
  watershed(&src, &mut marker, 0, Grid2::Square).unwrap();

  for y in 0..5 {
    for x in 0..5 {
      let m = marker.get(x, y);
      if x == 2 || y == 2 {
        assert!(is_watershed_line(m), "({x},{y}) should be on the line");
      } else {
        assert!(!is_watershed_line(m), "({x},{y}) should be in a basin");
        assert_eq!(basin_label(m), pocket_of(x, y), "({x},{y})");
      }
    }
  }
}

#[test]
fn test_watershed_full_flood_labels_everything() {
  let (src, mut marker) = pocket_scene();
  watershed(&src, &mut marker, 0, Grid2::Square).unwrap();
  for y in 0..marker.height() {
    for x in 0..marker.width() {
      let m = marker.get(x, y);
      let status = m >> 24;
      assert!(status == 0 || status == 0xFF, "({x},{y}) status {status:#x}");
      if status == 0 {
        assert!((1..=4).contains(&basin_label(m)), "({x},{y})");
      }
    }
  }
}

#[test]
fn test_different_labels_never_touch_off_the_line() {
  let (src, mut marker) = pocket_scene();
  watershed(&src, &mut marker, 0, Grid2::Square).unwrap();
  let dims = crate::grid::Dims::new(marker.width(), marker.height(), 1);
  for y in 0..marker.height() {
    for x in 0..marker.width() {
      let m = marker.get(x, y);
      if is_watershed_line(m) {
        continue;
      }
      let p = Pos::new2(x as i32, y as i32);
      for q in Grid2::Square.neighbors_in(p, dims) {
        let qm = marker.get(q.x as u32, q.y as u32);
        if !is_watershed_line(qm) {
          assert_eq!(basin_label(m), basin_label(qm), "({x},{y}) vs {q:?}");
        }
      }
    }
  }
}

#[test]
fn test_basins_matches_watershed_off_the_line() {
  let (src, marker) = pocket_scene();
  let mut with_line = marker.clone();
  watershed(&src, &mut with_line, 0, Grid2::Square).unwrap();
  let mut bare = marker;
  basins(&src, &mut bare, 0, Grid2::Square).unwrap();

  for y in 0..5 {
    for x in 0..5 {
      // Every pattern pixel of the basins output is a bare label.
      assert_eq!(bare.get(x, y) >> 24, 0, "({x},{y}) keeps a status byte");
      if !is_watershed_line(with_line.get(x, y)) {
        assert_eq!(
          basin_label(with_line.get(x, y)),
          bare.get(x, y),
          "({x},{y})"
        );
      }
    }
  }
}

#[test]
fn test_watershed_line_is_stable_under_reflooding() {
  let (src, mut marker) = pocket_scene();
  watershed(&src, &mut marker, 0, Grid2::Square).unwrap();

  // Re-seed with the basins only: line pixels become free again.
  let mut again = Image::new(64, 6, Depth::Wide).unwrap();
  for y in 0..marker.height() {
    for x in 0..marker.width() {
      let m = marker.get(x, y);
      if !is_watershed_line(m) {
        again.put(x, y, basin_label(m));
      }
    }
  }
  watershed(&src, &mut again, 0, Grid2::Square).unwrap();

  for y in 0..marker.height() {
    for x in 0..marker.width() {
      let before = marker.get(x, y);
      let after = again.get(x, y);
      assert_eq!(
        is_watershed_line(before),
        is_watershed_line(after),
        "line moved at ({x},{y})"
      );
      if !is_watershed_line(before) {
        assert_eq!(basin_label(before), basin_label(after), "({x},{y})");
      }
    }
  }
}

#[test]
fn test_partial_flood_leaves_statuses() {
  let (src, mut marker) = pocket_scene();
  watershed(&src, &mut marker, 1, Grid2::Square).unwrap();
  // Pockets flooded at level 0.
  assert_eq!(marker.get(1, 1), 1);
  // Walls were queued by the pockets but never reached by the water.
  assert_eq!(marker.get(0, 0) >> 24, 0x02);
  // The sea beyond the pattern was never even queued, and no control pass
  // promotes it on a partial flood.
  assert_eq!(marker.get(20, 3) >> 24, 0x01);
}

#[test]
fn test_wide_watershed_crosses_ranges() {
  // A wall one 16-bit range up forces the over-list path on the way to the
  // dividing line.
  let mut src = Image::new(64, 4, Depth::Wide).unwrap();
  for y in 0..4 {
    src.put(31, y, 0x0001_0005);
  }
  let mut marker = Image::new(64, 4, Depth::Wide).unwrap();
  marker.put(5, 1, 1);
  marker.put(60, 1, 2);

  watershed(&src, &mut marker, 0, Grid2::Square).unwrap();

  for y in 0..4 {
    for x in 0..64 {
      let m = marker.get(x, y);
      match x.cmp(&31) {
        std::cmp::Ordering::Less => assert_eq!(basin_label(m), 1, "({x},{y})"),
        std::cmp::Ordering::Equal => assert!(is_watershed_line(m), "({x},{y})"),
        std::cmp::Ordering::Greater => assert_eq!(basin_label(m), 2, "({x},{y})"),
      }
      if x != 31 {
        assert!(!is_watershed_line(m), "({x},{y})");
      }
    }
  }
}

#[test]
fn test_watershed_3d_wall() {
  for grid in [Grid3::Cubic, Grid3::FaceCenteredCubic] {
    let mut src = Image3d::new(64, 4, 3, Depth::Grey).unwrap();
    for z in 0..3 {
      for y in 0..4 {
        src.put(31, y, z, 5);
      }
    }
    let mut marker = Image3d::new(64, 4, 3, Depth::Wide).unwrap();
    marker.put(5, 2, 1, 1);
    marker.put(60, 2, 1, 2);

    watershed_3d(&src, &mut marker, 0, grid).unwrap();

    for z in 0..3 {
      for y in 0..4 {
        for x in 0..64 {
          let m = marker.get(x, y, z);
          match x.cmp(&31) {
            std::cmp::Ordering::Less => {
              assert_eq!(basin_label(m), 1, "({x},{y},{z}) on {grid:?}")
            }
            std::cmp::Ordering::Equal => {
              assert!(is_watershed_line(m), "({x},{y},{z}) on {grid:?}")
            }
            std::cmp::Ordering::Greater => {
              assert_eq!(basin_label(m), 2, "({x},{y},{z}) on {grid:?}")
            }
          }
        }
      }
    }
  }
}

#[test]
fn test_basins_3d_wall() {
  let mut src = Image3d::new(64, 4, 3, Depth::Grey).unwrap();
  for z in 0..3 {
    for y in 0..4 {
      src.put(31, y, z, 5);
    }
  }
  let mut marker = Image3d::new(64, 4, 3, Depth::Wide).unwrap();
  marker.put(5, 2, 1, 1);
  marker.put(60, 2, 1, 2);

  basins_3d(&src, &mut marker, 0, Grid3::Cubic).unwrap();

  for z in 0..3 {
    for y in 0..4 {
      for x in 0..64 {
        let m = marker.get(x, y, z);
        assert_eq!(m >> 24, 0, "({x},{y},{z})");
        if x < 31 {
          assert_eq!(m, 1, "({x},{y},{z})");
        } else if x > 31 {
          assert_eq!(m, 2, "({x},{y},{z})");
        }
      }
    }
  }
}

#[test]
fn test_watershed_validates_inputs() {
  let src = Image::new(64, 4, Depth::Grey).unwrap();
  let mut marker = Image::new(64, 6, Depth::Wide).unwrap();
  assert_eq!(
    watershed(&src, &mut marker, 0, Grid2::Square),
    Err(MorphError::BadSize)
  );

  let mut marker = Image::new(64, 4, Depth::Grey).unwrap();
  assert_eq!(
    watershed(&src, &mut marker, 0, Grid2::Square),
    Err(MorphError::BadDepth)
  );

  let mut marker = Image::new(64, 4, Depth::Wide).unwrap();
  assert_eq!(
    watershed(&src, &mut marker, 257, Grid2::Square),
    Err(MorphError::BadValue)
  );
  assert!(watershed(&src, &mut marker, 256, Grid2::Square).is_ok());

  let bits = Image::new(64, 4, Depth::Bit).unwrap();
  let mut marker = Image::new(64, 4, Depth::Wide).unwrap();
  assert_eq!(
    basins(&bits, &mut marker, 0, Grid2::Square),
    Err(MorphError::BadDepth)
  );
}
