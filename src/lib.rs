//! morpho - mathematical morphology over dense pixel grids
//!
//! This crate implements the flooding operators of mathematical morphology
//! on 1-, 8- and 32-bit images, in 2D (square and hexagonal grids) and 3D
//! (cubic and face-centered-cubic grids):
//!
//! - **Watershed segmentation** ([`watershed`], [`basins`]) - marker-driven
//!   flooding that partitions an image into catchment basins, optionally
//!   with the dividing line.
//! - **Geodesic reconstruction** ([`build`], [`dual_build`]) - rebuilds a
//!   seed image under or over a mask by hierarchical flooding.
//! - **Distance transform** ([`distance_transform`]) - geodesic distance of
//!   every set pixel to the set border.
//! - **Connected-component labeling** ([`label()`]) - two-pass raster
//!   labeling with union-find consolidation.
//!
//! All of them run on one propagation core: a token arena of next-position
//! links, FIFO bucket lists, and a hierarchical queue bucketed by pixel
//! value (256 buckets for 8-bit priorities; for 32-bit priorities a 16-bit
//! window of 65536 buckets plus overflow lists per upper range).
//!
//! # Example
//!
//! ```
//! use morpho::{Depth, Grid2, Image};
//!
//! // Segment a 64x64 relief (a ridge along the center) from two markers.
//! let mut src = Image::new(64, 64, Depth::Grey)?;
//! let mut marker = Image::new(64, 64, Depth::Wide)?;
//! for y in 0..64 {
//!   for x in 0..64 {
//!     src.put(x, y, x.min(63 - x));
//!   }
//! }
//! marker.put(8, 32, 1);
//! marker.put(56, 32, 2);
//!
//! morpho::watershed(&src, &mut marker, 0, Grid2::Square)?;
//!
//! assert_eq!(morpho::basin_label(marker.get(8, 8)), 1);
//! assert_eq!(morpho::basin_label(marker.get(56, 8)), 2);
//! // The two basins meet on the ridge crest.
//! assert!((31..=32).any(|x| morpho::is_watershed_line(marker.get(x, 32))));
//! # Ok::<(), morpho::MorphError>(())
//! ```
//!
//! Operators are synchronous and single-threaded; working memory lives for
//! the duration of one call. Inputs are read-only except the documented
//! in-place images (the watershed marker, the reconstruction seed).

pub mod error;
pub mod grid;
pub mod image;
pub mod label;
pub mod pointwise;

mod arena;
mod hq;
mod volume;

pub mod flood;

// Re-export the common surface.
pub use error::{MorphError, MorphResult};
pub use flood::distance::{distance_transform, distance_transform_3d};
pub use flood::reconstruct::{build, build_3d, dual_build, dual_build_3d};
pub use flood::watershed::{
  basin_label, basins, basins_3d, is_watershed_line, watershed, watershed_3d, WATERSHED_LINE,
};
pub use grid::{EdgeMode, Grid2, Grid3, Pos};
pub use image::{Depth, Image, Image3d};
pub use label::{label, label_3d};
