//! Internal slice-stack views the engines run on.
//!
//! A view flattens a 2D image (one slice) or a 3D stack (one slice per
//! plane) into position-addressed pixel access; the engines never touch the
//! containers directly.

use crate::grid::Pos;
use crate::image::{Image, Image3d};

/// Read-only view over 8- or 32-bit planes.
pub(crate) struct VolumeRef<'a, P> {
  slices: Vec<&'a [P]>,
  w: i32,
}

impl<'a, P: Copy> VolumeRef<'a, P> {
  pub fn new(slices: Vec<&'a [P]>, width: u32) -> Self {
    VolumeRef {
      slices,
      w: width as i32,
    }
  }

  #[inline]
  pub fn at(&self, p: Pos) -> P {
    self.slices[p.z as usize][(p.y * self.w + p.x) as usize]
  }
}

/// Mutable view over 8- or 32-bit planes.
pub(crate) struct VolumeMut<'a, P> {
  slices: Vec<&'a mut [P]>,
  w: i32,
}

impl<'a, P: Copy> VolumeMut<'a, P> {
  pub fn new(slices: Vec<&'a mut [P]>, width: u32) -> Self {
    VolumeMut {
      slices,
      w: width as i32,
    }
  }

  #[inline]
  pub fn at(&self, p: Pos) -> P {
    self.slices[p.z as usize][(p.y * self.w + p.x) as usize]
  }

  #[inline]
  pub fn set(&mut self, p: Pos, v: P) {
    self.slices[p.z as usize][(p.y * self.w + p.x) as usize] = v;
  }
}

/// Read-only view over binary planes (64 pixels per word, LSB first).
pub(crate) struct BitVolumeRef<'a> {
  slices: Vec<&'a [u64]>,
  w: i32,
}

impl<'a> BitVolumeRef<'a> {
  pub fn new(slices: Vec<&'a [u64]>, width: u32) -> Self {
    BitVolumeRef {
      slices,
      w: width as i32,
    }
  }

  #[inline]
  pub fn at(&self, p: Pos) -> bool {
    let i = (p.y * self.w + p.x) as usize;
    (self.slices[p.z as usize][i / 64] >> (i % 64)) & 1 != 0
  }
}

// Constructors from the containers. Depth mismatches yield None; the entry
// points turn that into BadDepth before any engine runs.

pub(crate) fn grey_ref(im: &Image) -> Option<VolumeRef<'_, u8>> {
  Some(VolumeRef::new(vec![im.as_grey()?], im.width()))
}

pub(crate) fn grey_mut(im: &mut Image) -> Option<VolumeMut<'_, u8>> {
  let w = im.width();
  Some(VolumeMut::new(vec![im.as_grey_mut()?], w))
}

pub(crate) fn wide_ref(im: &Image) -> Option<VolumeRef<'_, u32>> {
  Some(VolumeRef::new(vec![im.as_wide()?], im.width()))
}

pub(crate) fn wide_mut(im: &mut Image) -> Option<VolumeMut<'_, u32>> {
  let w = im.width();
  Some(VolumeMut::new(vec![im.as_wide_mut()?], w))
}

pub(crate) fn bit_ref(im: &Image) -> Option<BitVolumeRef<'_>> {
  Some(BitVolumeRef::new(vec![im.as_bits()?], im.width()))
}

pub(crate) fn grey_ref_3d(im: &Image3d) -> Option<VolumeRef<'_, u8>> {
  let slices = im
    .slices()
    .iter()
    .map(Image::as_grey)
    .collect::<Option<Vec<_>>>()?;
  Some(VolumeRef::new(slices, im.width()))
}

pub(crate) fn grey_mut_3d(im: &mut Image3d) -> Option<VolumeMut<'_, u8>> {
  let w = im.width();
  let slices = im
    .slices_mut()
    .iter_mut()
    .map(Image::as_grey_mut)
    .collect::<Option<Vec<_>>>()?;
  Some(VolumeMut::new(slices, w))
}

pub(crate) fn wide_ref_3d(im: &Image3d) -> Option<VolumeRef<'_, u32>> {
  let slices = im
    .slices()
    .iter()
    .map(Image::as_wide)
    .collect::<Option<Vec<_>>>()?;
  Some(VolumeRef::new(slices, im.width()))
}

pub(crate) fn wide_mut_3d(im: &mut Image3d) -> Option<VolumeMut<'_, u32>> {
  let w = im.width();
  let slices = im
    .slices_mut()
    .iter_mut()
    .map(Image::as_wide_mut)
    .collect::<Option<Vec<_>>>()?;
  Some(VolumeMut::new(slices, w))
}

pub(crate) fn bit_ref_3d(im: &Image3d) -> Option<BitVolumeRef<'_>> {
  let slices = im
    .slices()
    .iter()
    .map(Image::as_bits)
    .collect::<Option<Vec<_>>>()?;
  Some(BitVolumeRef::new(slices, im.width()))
}
