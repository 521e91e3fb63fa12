//! Watershed segmentation and catchment-basin labeling by flooding.
//!
//! The marker image drives everything: nonzero pixels seed the flood with
//! their label, and the high byte of every marker pixel runs the status
//! machine (candidate, queued, labeled, watershed). Water rises through the
//! source values; when a popped pixel sees two different labels among its
//! processed neighbors it joins the watershed line instead of a basin.
//!
//! Tie-breaking is the delicate part. A popped pixel must not hand its
//! label to untouched neighbors before its own fate is decided, so
//! candidates are parked on a reinsert list while the neighbor scan runs,
//! and the list is either drained into the hierarchical queue (pixel joined
//! a basin) or dropped (pixel joined the line; the parked neighbors stay
//! candidates for some other basin to claim). The scan never stops early on
//! a label conflict: the remaining neighbors still have to be visited so
//! the reinsert list is complete.
//!
//! The basins variant skips all of that and admits candidates eagerly with
//! the popped pixel's label; no line is built.

use crate::arena::{BucketList, TokenArena};
use crate::error::{MorphError, MorphResult};
use crate::flood::{
  has_status, label_of, queue_for, with_status, FloodValue, CANDIDATE, LABELED, QUEUED, WATERSHED,
};
use crate::grid::{Dims, Grid2, Grid3, Neighborhood};
use crate::image::{Depth, Image, Image3d};
use crate::volume::{self, VolumeMut, VolumeRef};

/// Marker byte flagging a pixel on the watershed line.
pub const WATERSHED_LINE: u32 = WATERSHED;

/// Label carried by a watershed/basins output pixel.
#[inline]
pub fn basin_label(pixel: u32) -> u32 {
  label_of(pixel)
}

/// True when a watershed output pixel lies on the dividing line.
#[inline]
pub fn is_watershed_line(pixel: u32) -> bool {
  has_status(pixel, WATERSHED)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Output {
  /// Labels plus the dividing line.
  WithLine,
  /// Labels only, eager admission.
  BasinsOnly,
}

/// Shared watershed/basins flood. `max_level` of 0 floods every level.
fn flood_watershed<P: FloodValue, N: Neighborhood>(
  src: &VolumeRef<'_, P>,
  marker: &mut VolumeMut<'_, u32>,
  dims: Dims,
  grid: N,
  max_level: u32,
  output: Output,
) {
  let n = dims.len();
  let mut arena = TokenArena::new(n as usize);
  let mut queue = queue_for::<P>();

  // Seeding: marked pixels enter at the bottom level with their label, the
  // rest become candidates (stray high bytes are dropped either way).
  for i in 0..n {
    let p = dims.pos_of(i);
    let m = marker.at(p);
    if label_of(m) != 0 {
      marker.set(p, with_status(m, QUEUED));
      queue.insert(&mut arena, i, 0);
    } else {
      marker.set(p, CANDIDATE);
    }
  }
  if max_level != 0 {
    queue.set_limit(u64::from(max_level));
  }

  #[cfg(feature = "tracing")]
  let _span = tracing::info_span!("watershed_flood").entered();

  // Parked candidates of the pixel being processed; shares the arena with
  // the hierarchical queue (a candidate is never queued).
  let mut reinsert = BucketList::EMPTY;

  while let Some(i) = queue.pop(&mut arena, |i| src.at(dims.pos_of(i)).key()) {
    let p = dims.pos_of(i);
    match output {
      Output::WithLine => {
        // Tentatively a basin pixel; the neighbor scan may overrule.
        marker.set(p, with_status(marker.at(p), LABELED));
        reinsert.clear();
        for q in grid.neighbors_in(p, dims) {
          let qm = marker.at(q);
          if has_status(qm, CANDIDATE) {
            reinsert.insert_tail(&mut arena, dims.index(q));
          } else if has_status(qm, LABELED) {
            let own = label_of(marker.at(p));
            if own == 0 {
              // First processed neighbor met: adopt its basin.
              marker.set(p, with_status(qm, LABELED));
            } else if own != label_of(qm) {
              // Two basins meet here.
              marker.set(p, with_status(marker.at(p), WATERSHED));
            }
          }
          // Queued or watershed neighbors carry no information for `p`.
        }
        if !has_status(marker.at(p), WATERSHED) {
          while let Some(qi) = reinsert.pop_head(&arena) {
            let q = dims.pos_of(qi);
            marker.set(q, with_status(marker.at(q), QUEUED));
            queue.insert(&mut arena, qi, src.at(q).key());
          }
        }
        // A watershed pixel abandons its parked candidates: they stay
        // candidates until a basin pixel reaches them.
      }
      Output::BasinsOnly => {
        let own = label_of(marker.at(p));
        marker.set(p, own);
        for q in grid.neighbors_in(p, dims) {
          if marker.at(q) == CANDIDATE {
            marker.set(q, QUEUED | own);
            queue.insert(&mut arena, dims.index(q), src.at(q).key());
          }
        }
      }
    }
  }

  // With every level flooded, a surviving candidate is fully enclosed by
  // the line and joins it.
  let flooded_all = max_level == 0 || u64::from(max_level) > u64::from(P::MAX_KEY);
  if output == Output::WithLine && flooded_all {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("watershed_control_pass").entered();
    for i in 0..n {
      let p = dims.pos_of(i);
      let m = marker.at(p);
      if has_status(m, CANDIDATE) {
        marker.set(p, with_status(m, WATERSHED));
      }
    }
  }
}

/// `max_level` must fit the source depth: at most one past the largest
/// pixel value.
fn check_max_level(depth: Depth, max_level: u32) -> MorphResult<()> {
  if depth == Depth::Grey && max_level > 256 {
    return Err(MorphError::BadValue);
  }
  Ok(())
}

fn watershed_2d(
  src: &Image,
  marker: &mut Image,
  max_level: u32,
  grid: Grid2,
  output: Output,
) -> MorphResult<()> {
  if !src.same_size(marker) {
    return Err(MorphError::BadSize);
  }
  check_max_level(src.depth(), max_level)?;
  let dims = Dims::new(src.width(), src.height(), 1);
  let mut m = volume::wide_mut(marker).ok_or(MorphError::BadDepth)?;
  if let Some(s) = volume::grey_ref(src) {
    flood_watershed(&s, &mut m, dims, grid, max_level, output);
    return Ok(());
  }
  if let Some(s) = volume::wide_ref(src) {
    flood_watershed(&s, &mut m, dims, grid, max_level, output);
    return Ok(());
  }
  Err(MorphError::BadDepth)
}

fn watershed_3d_impl(
  src: &Image3d,
  marker: &mut Image3d,
  max_level: u32,
  grid: Grid3,
  output: Output,
) -> MorphResult<()> {
  if !src.same_size(marker) {
    return Err(MorphError::BadSize);
  }
  check_max_level(src.depth(), max_level)?;
  let dims = Dims::new(src.width(), src.height(), src.length());
  let mut m = volume::wide_mut_3d(marker).ok_or(MorphError::BadDepth)?;
  if let Some(s) = volume::grey_ref_3d(src) {
    flood_watershed(&s, &mut m, dims, grid, max_level, output);
    return Ok(());
  }
  if let Some(s) = volume::wide_ref_3d(src) {
    flood_watershed(&s, &mut m, dims, grid, max_level, output);
    return Ok(());
  }
  Err(MorphError::BadDepth)
}

/// Watershed segmentation of `src` seeded by the 32-bit `marker`, dividing
/// line included.
///
/// On return each marker pixel packs its basin label in the low 24 bits and
/// 0xFF in the high byte iff the pixel is on the watershed line (see
/// [`basin_label`] and [`is_watershed_line`]). `max_level` bounds the water
/// (0 floods everything); the line-closing control pass only runs on a full
/// flood. The source may be 8- or 32-bit.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "morpho::watershed")
)]
pub fn watershed(src: &Image, marker: &mut Image, max_level: u32, grid: Grid2) -> MorphResult<()> {
  watershed_2d(src, marker, max_level, grid, Output::WithLine)
}

/// Catchment basins of `src` seeded by `marker`: like [`watershed`] with no
/// dividing line, every flooded pixel joins a basin.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "morpho::basins")
)]
pub fn basins(src: &Image, marker: &mut Image, max_level: u32, grid: Grid2) -> MorphResult<()> {
  watershed_2d(src, marker, max_level, grid, Output::BasinsOnly)
}

/// 3D [`watershed`] over a cubic or face-centered-cubic grid.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "morpho::watershed_3d")
)]
pub fn watershed_3d(
  src: &Image3d,
  marker: &mut Image3d,
  max_level: u32,
  grid: Grid3,
) -> MorphResult<()> {
  watershed_3d_impl(src, marker, max_level, grid, Output::WithLine)
}

/// 3D [`basins`] over a cubic or face-centered-cubic grid.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "morpho::basins_3d")
)]
pub fn basins_3d(
  src: &Image3d,
  marker: &mut Image3d,
  max_level: u32,
  grid: Grid3,
) -> MorphResult<()> {
  watershed_3d_impl(src, marker, max_level, grid, Output::BasinsOnly)
}

#[cfg(test)]
#[path = "watershed_test.rs"]
mod watershed_test;
