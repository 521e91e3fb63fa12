//! Binary distance transform by breadth-first propagation.
//!
//! The set border seeds a single FIFO at distance 1; each wave of pops
//! hands `distance + 1` to untouched set pixels. The geodesic distance of a
//! set pixel is therefore the number of propagation steps to the nearest
//! pixel outside the set, or to the image edge when the edge reads empty.

use crate::arena::{BucketList, TokenArena};
use crate::error::{MorphError, MorphResult};
use crate::grid::{Dims, EdgeMode, Grid2, Grid3, Neighborhood};
use crate::image::{Image, Image3d};
use crate::volume::{self, BitVolumeRef, VolumeMut};

fn flood_distance<N: Neighborhood>(
  src: &BitVolumeRef<'_>,
  dest: &mut VolumeMut<'_, u32>,
  dims: Dims,
  grid: N,
  edge: EdgeMode,
) {
  let n = dims.len();
  let mut arena = TokenArena::new(n as usize);
  let mut fifo = BucketList::EMPTY;

  // Border scan: a set pixel with an out-of-set neighbor starts at 1.
  // Out-of-bounds neighbors count as out of the set under an empty edge.
  for i in 0..n {
    let p = dims.pos_of(i);
    if !src.at(p) {
      dest.set(p, 0);
      continue;
    }
    let mut border = false;
    for q in grid.raw_neighbors(p) {
      if !dims.contains(q) {
        if edge == EdgeMode::Empty {
          border = true;
          break;
        }
      } else if !src.at(q) {
        border = true;
        break;
      }
    }
    if border {
      dest.set(p, 1);
      fifo.insert_tail(&mut arena, i);
    } else {
      dest.set(p, 0);
    }
  }

  #[cfg(feature = "tracing")]
  let _span = tracing::info_span!("distance_flood").entered();

  while let Some(i) = fifo.pop_head(&arena) {
    let p = dims.pos_of(i);
    let d = dest.at(p);
    for q in grid.neighbors_in(p, dims) {
      if src.at(q) && dest.at(q) == 0 {
        dest.set(q, d + 1);
        fifo.insert_tail(&mut arena, dims.index(q));
      }
    }
  }
}

/// Distance transform of the binary `src` into the 32-bit `dest`.
///
/// `dest` receives 0 outside the set and the geodesic distance (in grid
/// steps) to the nearest non-set pixel inside it; with [`EdgeMode::Empty`]
/// the image edge also counts as non-set.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "morpho::distance_transform")
)]
pub fn distance_transform(
  src: &Image,
  dest: &mut Image,
  grid: Grid2,
  edge: EdgeMode,
) -> MorphResult<()> {
  if !src.same_size(dest) {
    return Err(MorphError::BadSize);
  }
  let dims = Dims::new(src.width(), src.height(), 1);
  let s = volume::bit_ref(src).ok_or(MorphError::BadDepth)?;
  let mut d = volume::wide_mut(dest).ok_or(MorphError::BadDepth)?;
  flood_distance(&s, &mut d, dims, grid, edge);
  Ok(())
}

/// 3D [`distance_transform`] over a cubic or face-centered-cubic grid.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "morpho::distance_transform_3d")
)]
pub fn distance_transform_3d(
  src: &Image3d,
  dest: &mut Image3d,
  grid: Grid3,
  edge: EdgeMode,
) -> MorphResult<()> {
  if !src.same_size(dest) {
    return Err(MorphError::BadSize);
  }
  let dims = Dims::new(src.width(), src.height(), src.length());
  let s = volume::bit_ref_3d(src).ok_or(MorphError::BadDepth)?;
  let mut d = volume::wide_mut_3d(dest).ok_or(MorphError::BadDepth)?;
  flood_distance(&s, &mut d, dims, grid, edge);
  Ok(())
}

#[cfg(test)]
#[path = "distance_test.rs"]
mod distance_test;
