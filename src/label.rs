//! Connected-component labeling with union-find consolidation.
//!
//! First pass, raster order: every non-background pixel looks at its
//! already-scanned neighbors (same source value required on non-binary
//! images), adopts the root label of the first one it finds and unions the
//! remaining roots into it; with no eligible neighbor it opens a fresh raw
//! label. The second (tidy) pass rewrites every raw label to its
//! consolidated form: consolidated labels are handed out in encounter order
//! and their low byte is kept inside `[lblow, lbhigh)` by skipping the
//! excluded byte values, so callers can reserve low-byte ranges for display
//! palettes.

use crate::error::{MorphError, MorphResult};
use crate::grid::{Dims, Grid2, Grid3, Neighborhood, Pos};
use crate::image::{Depth, Image, Image3d};
use crate::volume::{self, BitVolumeRef, VolumeMut, VolumeRef};

/// Equivalence classes over raw labels plus the consolidation memo.
struct LabelTable {
  /// Parent label per raw label; a root is its own parent.
  eq: Vec<u32>,
  /// Consolidated label chosen for a root, 0 while unassigned.
  ceq: Vec<u32>,
  /// Next unused raw label.
  current: u32,
  /// Next consolidated label candidate.
  ccurrent: u32,
  /// Objects seen by the tidy pass.
  nb_objs: u32,
}

impl LabelTable {
  fn new(capacity: usize) -> LabelTable {
    LabelTable {
      eq: vec![0; capacity],
      ceq: vec![0; capacity],
      current: 1,
      ccurrent: 1,
      nb_objs: 0,
    }
  }

  /// Allocates a fresh raw label rooted at itself.
  fn fresh(&mut self) -> u32 {
    let label = self.current;
    self.eq[label as usize] = label;
    self.current += 1;
    label
  }

  /// Root of a label's class, compressing the path walked.
  fn find_root(&mut self, label: u32) -> u32 {
    let mut root = label;
    while self.eq[root as usize] != root {
      root = self.eq[root as usize];
    }
    let mut walk = label;
    while self.eq[walk as usize] != walk {
      let next = self.eq[walk as usize];
      self.eq[walk as usize] = root;
      walk = next;
    }
    root
  }

  /// Consolidated label for `label`'s class, allocated on first encounter
  /// with its low byte kept inside `[lblow, lbhigh)`.
  fn consolidate(&mut self, label: u32, lblow: u32, lbhigh: u32) -> u32 {
    let root = self.find_root(label);
    if self.ceq[root as usize] == 0 {
      let byte = self.ccurrent & 0xFF;
      if byte < lblow {
        self.ccurrent += lblow - byte;
      } else if byte >= lbhigh {
        self.ccurrent += 0x100 + lblow - byte;
      }
      self.ceq[root as usize] = self.ccurrent;
      self.ccurrent += 1;
      self.nb_objs += 1;
    }
    self.ceq[root as usize]
  }
}

/// Source pixels at any depth, read as plain values.
enum SrcView<'a> {
  Bit(BitVolumeRef<'a>),
  Grey(VolumeRef<'a, u8>),
  Wide(VolumeRef<'a, u32>),
}

impl SrcView<'_> {
  #[inline]
  fn value(&self, p: Pos) -> u32 {
    match self {
      SrcView::Bit(v) => u32::from(v.at(p)),
      SrcView::Grey(v) => u32::from(v.at(p)),
      SrcView::Wide(v) => v.at(p),
    }
  }
}

fn label_volume<N: Neighborhood>(
  src: &SrcView<'_>,
  dest: &mut VolumeMut<'_, u32>,
  dims: Dims,
  grid: N,
  lblow: u32,
  lbhigh: u32,
) -> u32 {
  let n = dims.len();
  let mut table = LabelTable::new(n as usize + 1);

  for i in 0..n {
    let p = dims.pos_of(i);
    let v = src.value(p);
    if v == 0 {
      dest.set(p, 0);
      continue;
    }
    let mut label = 0;
    for q in grid.prev_neighbors(p) {
      if !dims.contains(q) || src.value(q) != v {
        continue;
      }
      let root = table.find_root(dest.at(q));
      if label == 0 {
        label = root;
      } else if root != label {
        table.eq[root as usize] = label;
      }
    }
    if label == 0 {
      label = table.fresh();
    }
    dest.set(p, label);
  }

  for i in 0..n {
    let p = dims.pos_of(i);
    let raw = dest.at(p);
    if raw != 0 {
      dest.set(p, table.consolidate(raw, lblow, lbhigh));
    }
  }
  table.nb_objs
}

fn check_range(lblow: u32, lbhigh: u32) -> MorphResult<()> {
  if lblow >= lbhigh || lbhigh > 256 {
    return Err(MorphError::BadValue);
  }
  Ok(())
}

fn src_view(im: &Image) -> MorphResult<SrcView<'_>> {
  let view = match im.depth() {
    Depth::Bit => SrcView::Bit(volume::bit_ref(im).ok_or(MorphError::BadDepth)?),
    Depth::Grey => SrcView::Grey(volume::grey_ref(im).ok_or(MorphError::BadDepth)?),
    Depth::Wide => SrcView::Wide(volume::wide_ref(im).ok_or(MorphError::BadDepth)?),
  };
  Ok(view)
}

fn src_view_3d(im: &Image3d) -> MorphResult<SrcView<'_>> {
  let view = match im.depth() {
    Depth::Bit => SrcView::Bit(volume::bit_ref_3d(im).ok_or(MorphError::BadDepth)?),
    Depth::Grey => SrcView::Grey(volume::grey_ref_3d(im).ok_or(MorphError::BadDepth)?),
    Depth::Wide => SrcView::Wide(volume::wide_ref_3d(im).ok_or(MorphError::BadDepth)?),
  };
  Ok(view)
}

/// Labels the connected components of `src` into the 32-bit `dest` and
/// returns the component count.
///
/// Background is value 0; on 8- and 32-bit sources two pixels connect only
/// when they hold the same value. Labels are unique per component and their
/// low byte stays in `[lblow, lbhigh)` (`0 <= lblow < lbhigh <= 256`).
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "morpho::label")
)]
pub fn label(
  src: &Image,
  dest: &mut Image,
  lblow: u32,
  lbhigh: u32,
  grid: Grid2,
) -> MorphResult<u32> {
  if !src.same_size(dest) {
    return Err(MorphError::BadSize);
  }
  check_range(lblow, lbhigh)?;
  let dims = Dims::new(src.width(), src.height(), 1);
  let view = src_view(src)?;
  let mut d = volume::wide_mut(dest).ok_or(MorphError::BadDepth)?;
  Ok(label_volume(&view, &mut d, dims, grid, lblow, lbhigh))
}

/// 3D [`label`] over a cubic or face-centered-cubic grid.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "morpho::label_3d")
)]
pub fn label_3d(
  src: &Image3d,
  dest: &mut Image3d,
  lblow: u32,
  lbhigh: u32,
  grid: Grid3,
) -> MorphResult<u32> {
  if !src.same_size(dest) {
    return Err(MorphError::BadSize);
  }
  check_range(lblow, lbhigh)?;
  let dims = Dims::new(src.width(), src.height(), src.length());
  let view = src_view_3d(src)?;
  let mut d = volume::wide_mut_3d(dest).ok_or(MorphError::BadDepth)?;
  Ok(label_volume(&view, &mut d, dims, grid, lblow, lbhigh))
}

#[cfg(test)]
#[path = "label_test.rs"]
mod label_test;
