//! Geodesic reconstruction by hierarchical flooding.
//!
//! `build` grows the seed image under the mask: the flood walks pixel
//! values from the highest down, and a popped pixel hands each untouched
//! neighbor `min(popped value, mask at neighbor)`. The result is the limit
//! of iterated grid dilation clamped by the mask. `dual_build` is the exact
//! dual: the flood walks upward and hands out `max`, the mask constrains
//! from below.
//!
//! Every pixel is queued twice at most: once by the seeding pass (which
//! queues the whole image at its starting value) and once by the flood when
//! a neighbor first reaches it. The two phases address disjoint halves of a
//! doubled token arena, so both entries can coexist; a status plane
//! (candidate / queued / final) makes the second pop of a pixel a no-op.

use crate::arena::TokenArena;
use crate::error::{MorphError, MorphResult};
use crate::flood::{queue_for, FloodValue};
use crate::grid::{Dims, Grid2, Grid3, Neighborhood};
use crate::image::{Image, Image3d};
use crate::volume::{self, VolumeMut, VolumeRef};

const ST_CANDIDATE: u8 = 0;
const ST_QUEUED: u8 = 1;
const ST_FINAL: u8 = 0xFF;

/// Flooding polarity.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
  /// Reconstruction by dilation: descending walk, `min` updates.
  Dilate,
  /// Reconstruction by erosion: ascending walk, `max` updates.
  Erode,
}

impl Mode {
  /// Queue key for a pixel value; dilation complements so the ascending
  /// bucket walk visits high values first.
  #[inline]
  fn key<P: FloodValue>(self, v: P) -> u32 {
    match self {
      Mode::Dilate => P::MAX_KEY - v.key(),
      Mode::Erode => v.key(),
    }
  }

  #[inline]
  fn combine<P: Ord>(self, a: P, b: P) -> P {
    match self {
      Mode::Dilate => a.min(b),
      Mode::Erode => a.max(b),
    }
  }
}

/// Hierarchical flood shared by `build` and `dual_build`, any depth, any
/// grid.
fn flood_reconstruct<P: FloodValue, N: Neighborhood>(
  mask: &VolumeRef<'_, P>,
  seed: &mut VolumeMut<'_, P>,
  dims: Dims,
  grid: N,
  mode: Mode,
) {
  let n = dims.len();
  // Lower half: seeding-pass tokens. Upper half: flood-pass tokens.
  let mut arena = TokenArena::new(2 * n as usize);
  let mut queue = queue_for::<P>();
  let mut status = vec![ST_CANDIDATE; n as usize];

  for i in 0..n {
    let v = seed.at(dims.pos_of(i));
    queue.seed(&mut arena, i, mode.key(v));
  }

  #[cfg(feature = "tracing")]
  let _span = tracing::info_span!("reconstruct_flood").entered();

  while let Some(token) = queue.pop(&mut arena, |token| {
    mode.key(seed.at(dims.pos_of(token % n)))
  }) {
    let i = token % n;
    if status[i as usize] == ST_FINAL {
      continue;
    }
    status[i as usize] = ST_FINAL;
    let p = dims.pos_of(i);
    let v = seed.at(p);
    // The pixel's own value meets the mask only now: its unclamped value
    // still propagates to the neighbors below.
    seed.set(p, mode.combine(v, mask.at(p)));
    for q in grid.neighbors_in(p, dims) {
      let qi = dims.index(q);
      if status[qi as usize] != ST_CANDIDATE {
        continue;
      }
      let nv = mode.combine(v, mask.at(q));
      seed.set(q, nv);
      status[qi as usize] = ST_QUEUED;
      queue.insert(&mut arena, n + qi, mode.key(nv));
    }
  }
}

fn check_pair(mask: &Image, seed: &Image) -> MorphResult<()> {
  if !mask.same_size(seed) {
    return Err(MorphError::BadSize);
  }
  Ok(())
}

fn reconstruct_2d(mask: &Image, seed: &mut Image, grid: Grid2, mode: Mode) -> MorphResult<()> {
  check_pair(mask, seed)?;
  let dims = Dims::new(mask.width(), mask.height(), 1);
  match (volume::grey_ref(mask), volume::grey_mut(seed)) {
    (Some(m), Some(mut s)) => {
      flood_reconstruct(&m, &mut s, dims, grid, mode);
      return Ok(());
    }
    (None, None) => {}
    _ => return Err(MorphError::BadDepth),
  }
  match (volume::wide_ref(mask), volume::wide_mut(seed)) {
    (Some(m), Some(mut s)) => {
      flood_reconstruct(&m, &mut s, dims, grid, mode);
      Ok(())
    }
    _ => Err(MorphError::BadDepth),
  }
}

fn reconstruct_3d(mask: &Image3d, seed: &mut Image3d, grid: Grid3, mode: Mode) -> MorphResult<()> {
  if !mask.same_size(seed) {
    return Err(MorphError::BadSize);
  }
  let dims = Dims::new(mask.width(), mask.height(), mask.length());
  match (volume::grey_ref_3d(mask), volume::grey_mut_3d(seed)) {
    (Some(m), Some(mut s)) => {
      flood_reconstruct(&m, &mut s, dims, grid, mode);
      return Ok(());
    }
    (None, None) => {}
    _ => return Err(MorphError::BadDepth),
  }
  match (volume::wide_ref_3d(mask), volume::wide_mut_3d(seed)) {
    (Some(m), Some(mut s)) => {
      flood_reconstruct(&m, &mut s, dims, grid, mode);
      Ok(())
    }
    _ => Err(MorphError::BadDepth),
  }
}

/// Rebuilds `seed` in place under `mask` (reconstruction by dilation).
///
/// Both images must share size and depth (8-bit with 8-bit, 32-bit with
/// 32-bit). Wherever the flood reaches, the result is pointwise at most the
/// mask; pixels no seed value reaches keep their (mask-clamped) value.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "morpho::build")
)]
pub fn build(mask: &Image, seed: &mut Image, grid: Grid2) -> MorphResult<()> {
  reconstruct_2d(mask, seed, grid, Mode::Dilate)
}

/// Rebuilds `seed` in place over `mask` (reconstruction by erosion, the
/// dual of [`build`]).
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "morpho::dual_build")
)]
pub fn dual_build(mask: &Image, seed: &mut Image, grid: Grid2) -> MorphResult<()> {
  reconstruct_2d(mask, seed, grid, Mode::Erode)
}

/// 3D [`build`] over a cubic or face-centered-cubic grid.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "morpho::build_3d")
)]
pub fn build_3d(mask: &Image3d, seed: &mut Image3d, grid: Grid3) -> MorphResult<()> {
  reconstruct_3d(mask, seed, grid, Mode::Dilate)
}

/// 3D [`dual_build`] over a cubic or face-centered-cubic grid.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "morpho::dual_build_3d")
)]
pub fn dual_build_3d(mask: &Image3d, seed: &mut Image3d, grid: Grid3) -> MorphResult<()> {
  reconstruct_3d(mask, seed, grid, Mode::Erode)
}

#[cfg(test)]
#[path = "reconstruct_test.rs"]
mod reconstruct_test;
