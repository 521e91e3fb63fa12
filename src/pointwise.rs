//! Pointwise convenience operators.
//!
//! Whole-image helpers around the engine: copies, pointwise min/max,
//! complement, thresholding to binary, comparison, volume, and byte-plane
//! transfer for unpacking watershed output. All validate like the engine
//! entry points and never partially write a destination.

use crate::error::{MorphError, MorphResult};
use crate::image::{Buffer, Depth, Image};

fn check_same(a: &Image, b: &Image) -> MorphResult<()> {
  if !a.same_size(b) {
    return Err(MorphError::BadSize);
  }
  Ok(())
}

/// Copies `src` into `dest` (same size, same depth).
pub fn copy(src: &Image, dest: &mut Image) -> MorphResult<()> {
  check_same(src, dest)?;
  match (&src.buf, &mut dest.buf) {
    (Buffer::Bit(s), Buffer::Bit(d)) => d.copy_from_slice(s),
    (Buffer::Grey(s), Buffer::Grey(d)) => d.copy_from_slice(s),
    (Buffer::Wide(s), Buffer::Wide(d)) => d.copy_from_slice(s),
    _ => return Err(MorphError::BadDepth),
  }
  Ok(())
}

/// Pointwise minimum of `a` and `b` into `dest` (all same size and depth;
/// binary images intersect).
pub fn inf(a: &Image, b: &Image, dest: &mut Image) -> MorphResult<()> {
  check_same(a, dest)?;
  check_same(b, dest)?;
  match (&a.buf, &b.buf, &mut dest.buf) {
    (Buffer::Bit(a), Buffer::Bit(b), Buffer::Bit(d)) => {
      for ((x, y), o) in a.iter().zip(b).zip(d) {
        *o = x & y;
      }
    }
    (Buffer::Grey(a), Buffer::Grey(b), Buffer::Grey(d)) => {
      for ((x, y), o) in a.iter().zip(b).zip(d) {
        *o = (*x).min(*y);
      }
    }
    (Buffer::Wide(a), Buffer::Wide(b), Buffer::Wide(d)) => {
      for ((x, y), o) in a.iter().zip(b).zip(d) {
        *o = (*x).min(*y);
      }
    }
    _ => return Err(MorphError::BadDepth),
  }
  Ok(())
}

/// Pointwise maximum of `a` and `b` into `dest` (all same size and depth;
/// binary images unite).
pub fn sup(a: &Image, b: &Image, dest: &mut Image) -> MorphResult<()> {
  check_same(a, dest)?;
  check_same(b, dest)?;
  match (&a.buf, &b.buf, &mut dest.buf) {
    (Buffer::Bit(a), Buffer::Bit(b), Buffer::Bit(d)) => {
      for ((x, y), o) in a.iter().zip(b).zip(d) {
        *o = x | y;
      }
    }
    (Buffer::Grey(a), Buffer::Grey(b), Buffer::Grey(d)) => {
      for ((x, y), o) in a.iter().zip(b).zip(d) {
        *o = (*x).max(*y);
      }
    }
    (Buffer::Wide(a), Buffer::Wide(b), Buffer::Wide(d)) => {
      for ((x, y), o) in a.iter().zip(b).zip(d) {
        *o = (*x).max(*y);
      }
    }
    _ => return Err(MorphError::BadDepth),
  }
  Ok(())
}

/// Complement of `src` into `dest` (same size, same depth): binary sets
/// flip, greyscale inverts to `255 - v`, 32-bit to `!v`.
pub fn invert(src: &Image, dest: &mut Image) -> MorphResult<()> {
  check_same(src, dest)?;
  match (&src.buf, &mut dest.buf) {
    (Buffer::Bit(s), Buffer::Bit(d)) => {
      for (x, o) in s.iter().zip(d) {
        *o = !x;
      }
    }
    (Buffer::Grey(s), Buffer::Grey(d)) => {
      for (x, o) in s.iter().zip(d) {
        *o = !x;
      }
    }
    (Buffer::Wide(s), Buffer::Wide(d)) => {
      for (x, o) in s.iter().zip(d) {
        *o = !x;
      }
    }
    _ => return Err(MorphError::BadDepth),
  }
  Ok(())
}

/// Thresholds the 8- or 32-bit `src` into the binary `dest`: a pixel is set
/// iff `low <= value <= high`.
pub fn threshold(src: &Image, dest: &mut Image, low: u32, high: u32) -> MorphResult<()> {
  check_same(src, dest)?;
  if low > high {
    return Err(MorphError::BadValue);
  }
  if dest.depth() != Depth::Bit {
    return Err(MorphError::BadDepth);
  }
  if src.depth() == Depth::Bit {
    return Err(MorphError::BadDepth);
  }
  for y in 0..src.height() {
    for x in 0..src.width() {
      let v = src.get(x, y);
      dest.put(x, y, u32::from(v >= low && v <= high));
    }
  }
  Ok(())
}

/// First position where `a` and `b` differ, or `None` when equal (same
/// size, same depth).
pub fn compare(a: &Image, b: &Image) -> MorphResult<Option<(u32, u32)>> {
  check_same(a, b)?;
  if a.depth() != b.depth() {
    return Err(MorphError::BadDepth);
  }
  for y in 0..a.height() {
    for x in 0..a.width() {
      if a.get(x, y) != b.get(x, y) {
        return Ok(Some((x, y)));
      }
    }
  }
  Ok(None)
}

/// Sum of all pixel values (set-pixel count for binary images).
pub fn volume(src: &Image) -> u64 {
  match &src.buf {
    Buffer::Bit(words) => words.iter().map(|w| u64::from(w.count_ones())).sum(),
    Buffer::Grey(bytes) => bytes.iter().map(|&v| u64::from(v)).sum(),
    Buffer::Wide(words) => words.iter().map(|&v| u64::from(v)).sum(),
  }
}

/// Extracts byte plane `plane` (0 = least significant) of the 32-bit `src`
/// into the 8-bit `dest`.
///
/// Plane 3 of a watershed output is the line mask, planes 0..3 the label.
pub fn copy_byte_plane(src: &Image, dest: &mut Image, plane: u32) -> MorphResult<()> {
  check_same(src, dest)?;
  if plane > 3 {
    return Err(MorphError::BadParameter);
  }
  let shift = plane * 8;
  match (&src.buf, &mut dest.buf) {
    (Buffer::Wide(s), Buffer::Grey(d)) => {
      for (x, o) in s.iter().zip(d) {
        *o = (x >> shift) as u8;
      }
    }
    _ => return Err(MorphError::BadDepth),
  }
  Ok(())
}

/// Inserts the 8-bit `src` as byte plane `plane` of the 32-bit `dest`,
/// leaving the other planes untouched.
pub fn insert_byte_plane(src: &Image, dest: &mut Image, plane: u32) -> MorphResult<()> {
  check_same(src, dest)?;
  if plane > 3 {
    return Err(MorphError::BadParameter);
  }
  let shift = plane * 8;
  match (&src.buf, &mut dest.buf) {
    (Buffer::Grey(s), Buffer::Wide(d)) => {
      for (x, o) in s.iter().zip(d) {
        *o = (*o & !(0xFFu32 << shift)) | (u32::from(*x) << shift);
      }
    }
    _ => return Err(MorphError::BadDepth),
  }
  Ok(())
}

#[cfg(test)]
#[path = "pointwise_test.rs"]
mod pointwise_test;
