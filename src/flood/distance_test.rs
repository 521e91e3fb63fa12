use super::*;
use crate::grid::Pos;
use crate::image::Depth;

fn bit_image(w: u32, h: u32, set: &[(u32, u32)]) -> Image {
  let mut im = Image::new(w, h, Depth::Bit).unwrap();
  for &(x, y) in set {
    im.put(x, y, 1);
  }
  im
}

// Breadth-first reference distance, straight from the definition.
fn reference_distance(src: &Image, grid: Grid2, edge: EdgeMode) -> Vec<Vec<u32>> {
  let (w, h) = (src.width(), src.height());
  let dims = crate::grid::Dims::new(w, h, 1);
  let mut dist = vec![vec![0u32; w as usize]; h as usize];
  let mut frontier = Vec::new();
  for y in 0..h {
    for x in 0..w {
      if src.get(x, y) == 0 {
        continue;
      }
      let p = Pos::new2(x as i32, y as i32);
      let mut border = false;
      for q in grid.raw_neighbors(p) {
        if !dims.contains(q) {
          border |= edge == EdgeMode::Empty;
        } else {
          border |= src.get(q.x as u32, q.y as u32) == 0;
        }
      }
      if border {
        dist[y as usize][x as usize] = 1;
        frontier.push(p);
      }
    }
  }
  let mut level = 1;
  while !frontier.is_empty() {
    let mut next = Vec::new();
    for p in frontier {
      for q in grid.neighbors_in(p, dims) {
        let (qx, qy) = (q.x as usize, q.y as usize);
        if src.get(q.x as u32, q.y as u32) != 0 && dist[qy][qx] == 0 {
          dist[qy][qx] = level + 1;
          next.push(q);
        }
      }
    }
    frontier = next;
    level += 1;
  }
  dist
}

#[test]
fn test_hexagonal_block_distances() {
  // 3x3 block: the center is the only pixel at distance 2 under the
  // hexagonal grid.
  let mut set = Vec::new();
  for y in 1..4 {
    for x in 2..5 {
      set.push((x, y));
    }
  }
  let src = bit_image(64, 6, &set);
  let mut dest = Image::new(64, 6, Depth::Wide).unwrap();
  distance_transform(&src, &mut dest, Grid2::Hexagonal, EdgeMode::Empty).unwrap();

  assert_eq!(dest.get(3, 2), 2);
  for &(x, y) in &set {
    if (x, y) != (3, 2) {
      assert_eq!(dest.get(x, y), 1, "border pixel ({x},{y})");
    }
  }
  for y in 0..6 {
    for x in 0..64 {
      if !set.contains(&(x, y)) {
        assert_eq!(dest.get(x, y), 0, "outside pixel ({x},{y})");
      }
    }
  }
}

#[test]
fn test_matches_reference_on_random_sets() {
  let mut state = 77u32;
  let mut next = move || {
    state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    state >> 16
  };
  let mut src = Image::new(64, 6, Depth::Bit).unwrap();
  for y in 0..6 {
    for x in 0..64 {
      src.put(x, y, next() & 1);
    }
  }
  for grid in [Grid2::Square, Grid2::Hexagonal] {
    for edge in [EdgeMode::Empty, EdgeMode::Filled] {
      let mut dest = Image::new(64, 6, Depth::Wide).unwrap();
      distance_transform(&src, &mut dest, grid, edge).unwrap();
      let expected = reference_distance(&src, grid, edge);
      for y in 0..6 {
        for x in 0..64 {
          assert_eq!(
            dest.get(x, y),
            expected[y as usize][x as usize],
            "({x},{y}) {grid:?} {edge:?}"
          );
        }
      }
    }
  }
}

#[test]
fn test_edge_mode_governs_image_border() {
  let mut src = Image::new(64, 4, Depth::Bit).unwrap();
  src.fill(1);

  // Empty edge: the outside world is background, distances grow inward.
  let mut dest = Image::new(64, 4, Depth::Wide).unwrap();
  distance_transform(&src, &mut dest, Grid2::Square, EdgeMode::Empty).unwrap();
  assert_eq!(dest.get(0, 0), 1);
  assert_eq!(dest.get(10, 1), 2);
  assert_eq!(dest.get(10, 2), 2);

  // Filled edge on an all-set image: no border seed exists, everything
  // stays at zero.
  let mut dest = Image::new(64, 4, Depth::Wide).unwrap();
  distance_transform(&src, &mut dest, Grid2::Square, EdgeMode::Filled).unwrap();
  for y in 0..4 {
    for x in 0..64 {
      assert_eq!(dest.get(x, y), 0);
    }
  }
}

#[test]
fn test_distance_3d_block() {
  let mut src = Image3d::new(64, 6, 5, Depth::Bit).unwrap();
  for z in 1..4 {
    for y in 1..4 {
      for x in 1..4 {
        src.put(x, y, z, 1);
      }
    }
  }
  let mut dest = Image3d::new(64, 6, 5, Depth::Wide).unwrap();
  distance_transform_3d(&src, &mut dest, Grid3::Cubic, EdgeMode::Empty).unwrap();

  assert_eq!(dest.get(2, 2, 2), 2);
  for z in 1..4 {
    for y in 1..4 {
      for x in 1..4 {
        if (x, y, z) != (2, 2, 2) {
          assert_eq!(dest.get(x, y, z), 1, "({x},{y},{z})");
        }
      }
    }
  }
  assert_eq!(dest.get(10, 4, 4), 0);
}

#[test]
fn test_distance_validates_inputs() {
  let src = Image::new(64, 4, Depth::Bit).unwrap();
  let mut dest = Image::new(64, 6, Depth::Wide).unwrap();
  assert_eq!(
    distance_transform(&src, &mut dest, Grid2::Square, EdgeMode::Empty),
    Err(MorphError::BadSize)
  );
  let mut dest = Image::new(64, 4, Depth::Grey).unwrap();
  assert_eq!(
    distance_transform(&src, &mut dest, Grid2::Square, EdgeMode::Empty),
    Err(MorphError::BadDepth)
  );
  let grey = Image::new(64, 4, Depth::Grey).unwrap();
  let mut dest = Image::new(64, 4, Depth::Wide).unwrap();
  assert_eq!(
    distance_transform(&grey, &mut dest, Grid2::Square, EdgeMode::Empty),
    Err(MorphError::BadDepth)
  );
}
