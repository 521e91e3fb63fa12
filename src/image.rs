//! Pixel containers: 2D images and 3D slice stacks.
//!
//! An [`Image`] is a dense rectangular grid at one of three depths:
//!
//! - 1-bit set membership, packed 64 pixels per `u64` word, LSB first;
//! - 8-bit greyscale;
//! - 32-bit values (labels, markers, distances, accumulators).
//!
//! Requested dimensions are normalized at construction: the width is rounded
//! up to a multiple of 64 so binary rows are whole words, the height to a
//! multiple of 2 so hexagonal row parity is well defined on interior rows.
//! An [`Image3d`] is an ordered stack of identically shaped slices.

use crate::error::{MorphError, MorphResult};

/// Widths are rounded up to this multiple (binary rows stay whole words).
pub const WIDTH_ROUND: u32 = 64;

/// Heights are rounded up to this multiple (keeps hexagonal parity usable).
pub const HEIGHT_ROUND: u32 = 2;

/// Largest accepted pixel count per 2D image.
pub const MAX_PIXELS: u64 = 1 << 28;

/// Pixel depth of an image, in bits per pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Depth {
  /// 1-bit set membership.
  Bit,
  /// 8-bit greyscale.
  Grey,
  /// 32-bit wide pixels.
  Wide,
}

impl Depth {
  /// Bits per pixel.
  pub fn bits(self) -> u32 {
    match self {
      Depth::Bit => 1,
      Depth::Grey => 8,
      Depth::Wide => 32,
    }
  }

  /// Largest representable pixel value at this depth.
  pub fn max_value(self) -> u32 {
    match self {
      Depth::Bit => 1,
      Depth::Grey => 0xFF,
      Depth::Wide => 0xFFFF_FFFF,
    }
  }
}

/// Backing storage, one variant per depth.
#[derive(Clone, Debug)]
pub(crate) enum Buffer {
  Bit(Vec<u64>),
  Grey(Vec<u8>),
  Wide(Vec<u32>),
}

/// A 2D pixel grid of fixed width, height and depth.
#[derive(Clone, Debug)]
pub struct Image {
  width: u32,
  height: u32,
  pub(crate) buf: Buffer,
}

impl Image {
  /// Allocates a zero-filled image.
  ///
  /// The stored width and height are the requested values rounded up to
  /// [`WIDTH_ROUND`] and [`HEIGHT_ROUND`]. Zero dimensions or a rounded
  /// pixel count above [`MAX_PIXELS`] are rejected.
  pub fn new(width: u32, height: u32, depth: Depth) -> MorphResult<Image> {
    if width == 0 || height == 0 {
      return Err(MorphError::BadImageDimensions);
    }
    let rounded_w = u64::from(width).div_ceil(u64::from(WIDTH_ROUND)) * u64::from(WIDTH_ROUND);
    let rounded_h = u64::from(height).div_ceil(u64::from(HEIGHT_ROUND)) * u64::from(HEIGHT_ROUND);
    let count = rounded_w * rounded_h;
    if count > MAX_PIXELS {
      return Err(MorphError::BadImageDimensions);
    }
    let (width, height) = (rounded_w as u32, rounded_h as u32);
    let count = count as usize;
    let buf = match depth {
      Depth::Bit => Buffer::Bit(vec![0u64; count / 64]),
      Depth::Grey => Buffer::Grey(vec![0u8; count]),
      Depth::Wide => Buffer::Wide(vec![0u32; count]),
    };
    Ok(Image { width, height, buf })
  }

  /// Rounded width in pixels.
  pub fn width(&self) -> u32 {
    self.width
  }

  /// Rounded height in pixels.
  pub fn height(&self) -> u32 {
    self.height
  }

  /// Depth of the stored pixels.
  pub fn depth(&self) -> Depth {
    match self.buf {
      Buffer::Bit(_) => Depth::Bit,
      Buffer::Grey(_) => Depth::Grey,
      Buffer::Wide(_) => Depth::Wide,
    }
  }

  /// Total pixel count.
  pub fn pixel_count(&self) -> u32 {
    self.width * self.height
  }

  /// True when `other` has the same width and height.
  pub fn same_size(&self, other: &Image) -> bool {
    self.width == other.width && self.height == other.height
  }

  /// Reads the pixel at `(x, y)`. Binary pixels read as 0 or 1.
  ///
  /// # Panics
  ///
  /// Panics when `(x, y)` is outside the image.
  pub fn get(&self, x: u32, y: u32) -> u32 {
    assert!(x < self.width && y < self.height, "pixel ({x},{y}) out of bounds");
    let i = (y * self.width + x) as usize;
    match &self.buf {
      Buffer::Bit(words) => ((words[i / 64] >> (i % 64)) & 1) as u32,
      Buffer::Grey(bytes) => u32::from(bytes[i]),
      Buffer::Wide(words) => words[i],
    }
  }

  /// Writes the pixel at `(x, y)`. Values are truncated to the depth;
  /// any nonzero value sets a binary pixel.
  ///
  /// # Panics
  ///
  /// Panics when `(x, y)` is outside the image.
  pub fn put(&mut self, x: u32, y: u32, value: u32) {
    assert!(x < self.width && y < self.height, "pixel ({x},{y}) out of bounds");
    let i = (y * self.width + x) as usize;
    match &mut self.buf {
      Buffer::Bit(words) => {
        let mask = 1u64 << (i % 64);
        if value != 0 {
          words[i / 64] |= mask;
        } else {
          words[i / 64] &= !mask;
        }
      }
      Buffer::Grey(bytes) => bytes[i] = value as u8,
      Buffer::Wide(words) => words[i] = value,
    }
  }

  /// Sets every pixel to `value` (truncated to the depth).
  pub fn fill(&mut self, value: u32) {
    match &mut self.buf {
      Buffer::Bit(words) => {
        let v = if value != 0 { u64::MAX } else { 0 };
        words.fill(v);
      }
      Buffer::Grey(bytes) => bytes.fill(value as u8),
      Buffer::Wide(words) => words.fill(value),
    }
  }

  /// Loads raw pixel data from a byte blob of exactly the image's byte size.
  ///
  /// 8-bit images take one byte per pixel, 32-bit images four bytes per
  /// pixel little-endian, binary images pack 8 pixels per byte LSB first.
  pub fn load(&mut self, data: &[u8]) -> MorphResult<()> {
    let expected = (self.pixel_count() as usize * self.depth().bits() as usize) / 8;
    if data.len() != expected {
      return Err(MorphError::LoadData);
    }
    match &mut self.buf {
      Buffer::Bit(words) => {
        for (w, chunk) in words.iter_mut().zip(data.chunks_exact(8)) {
          let mut bytes = [0u8; 8];
          bytes.copy_from_slice(chunk);
          *w = u64::from_le_bytes(bytes);
        }
      }
      Buffer::Grey(bytes) => bytes.copy_from_slice(data),
      Buffer::Wide(words) => {
        for (w, chunk) in words.iter_mut().zip(data.chunks_exact(4)) {
          let mut bytes = [0u8; 4];
          bytes.copy_from_slice(chunk);
          *w = u32::from_le_bytes(bytes);
        }
      }
    }
    Ok(())
  }

  /// Extracts the pixel data as a byte blob, inverse of [`Image::load`].
  pub fn extract(&self) -> Vec<u8> {
    match &self.buf {
      Buffer::Bit(words) => words.iter().flat_map(|w| w.to_le_bytes()).collect(),
      Buffer::Grey(bytes) => bytes.clone(),
      Buffer::Wide(words) => words.iter().flat_map(|w| w.to_le_bytes()).collect(),
    }
  }

  pub(crate) fn as_grey(&self) -> Option<&[u8]> {
    match &self.buf {
      Buffer::Grey(bytes) => Some(bytes),
      _ => None,
    }
  }

  pub(crate) fn as_grey_mut(&mut self) -> Option<&mut [u8]> {
    match &mut self.buf {
      Buffer::Grey(bytes) => Some(bytes),
      _ => None,
    }
  }

  pub(crate) fn as_wide(&self) -> Option<&[u32]> {
    match &self.buf {
      Buffer::Wide(words) => Some(words),
      _ => None,
    }
  }

  pub(crate) fn as_wide_mut(&mut self) -> Option<&mut [u32]> {
    match &mut self.buf {
      Buffer::Wide(words) => Some(words),
      _ => None,
    }
  }

  pub(crate) fn as_bits(&self) -> Option<&[u64]> {
    match &self.buf {
      Buffer::Bit(words) => Some(words),
      _ => None,
    }
  }

  pub(crate) fn as_bits_mut(&mut self) -> Option<&mut [u64]> {
    match &mut self.buf {
      Buffer::Bit(words) => Some(words),
      _ => None,
    }
  }
}

/// A 3D image: an ordered stack of identically shaped 2D slices.
#[derive(Clone, Debug)]
pub struct Image3d {
  slices: Vec<Image>,
}

impl Image3d {
  /// Allocates a zero-filled stack of `length` slices.
  pub fn new(width: u32, height: u32, length: u32, depth: Depth) -> MorphResult<Image3d> {
    if length == 0 {
      return Err(MorphError::BadImageDimensions);
    }
    let mut slices = Vec::with_capacity(length as usize);
    for _ in 0..length {
      slices.push(Image::new(width, height, depth)?);
    }
    Ok(Image3d { slices })
  }

  /// Builds a stack from existing slices; all must share width, height and
  /// depth.
  pub fn from_slices(slices: Vec<Image>) -> MorphResult<Image3d> {
    let first = slices.first().ok_or(MorphError::BadImageDimensions)?;
    if !slices.iter().all(|s| s.same_size(first)) {
      return Err(MorphError::BadSize);
    }
    if !slices.iter().all(|s| s.depth() == first.depth()) {
      return Err(MorphError::BadDepth);
    }
    Ok(Image3d { slices })
  }

  pub fn width(&self) -> u32 {
    self.slices[0].width()
  }

  pub fn height(&self) -> u32 {
    self.slices[0].height()
  }

  /// Number of slices.
  pub fn length(&self) -> u32 {
    self.slices.len() as u32
  }

  pub fn depth(&self) -> Depth {
    self.slices[0].depth()
  }

  /// True when `other` has the same width, height and length.
  pub fn same_size(&self, other: &Image3d) -> bool {
    self.width() == other.width()
      && self.height() == other.height()
      && self.length() == other.length()
  }

  pub fn slices(&self) -> &[Image] {
    &self.slices
  }

  pub(crate) fn slices_mut(&mut self) -> &mut [Image] {
    &mut self.slices
  }

  pub fn slice(&self, z: u32) -> &Image {
    &self.slices[z as usize]
  }

  pub fn slice_mut(&mut self, z: u32) -> &mut Image {
    &mut self.slices[z as usize]
  }

  /// Reads the pixel at `(x, y, z)` through the z-th slice.
  pub fn get(&self, x: u32, y: u32, z: u32) -> u32 {
    self.slices[z as usize].get(x, y)
  }

  /// Writes the pixel at `(x, y, z)` through the z-th slice.
  pub fn put(&mut self, x: u32, y: u32, z: u32, value: u32) {
    self.slices[z as usize].put(x, y, value)
  }

  /// Sets every pixel of every slice to `value`.
  pub fn fill(&mut self, value: u32) {
    for s in &mut self.slices {
      s.fill(value);
    }
  }
}

#[cfg(test)]
#[path = "image_test.rs"]
mod image_test;
