//! Error taxonomy shared by every operator.

use thiserror::Error;

/// Result alias used across the crate.
pub type MorphResult<T> = Result<T, MorphError>;

/// Closed set of failures an operator can report.
///
/// Operators validate their inputs before touching any destination pixel,
/// so on error the destination is unchanged (or still zero-initialized when
/// the operator zero-fills at entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MorphError {
  /// Two images participating in the operation have incompatible sizes.
  #[error("incompatible image sizes")]
  BadSize,

  /// Depth combination not supported by the operator.
  #[error("incorrect image depth")]
  BadDepth,

  /// Structural input violation (mismatched slice stack, unusable grid).
  #[error("bad parameter")]
  BadParameter,

  /// Numeric parameter out of range.
  #[error("bad value")]
  BadValue,

  /// Direction index outside the valid range for the grid.
  #[error("incorrect direction for given grid")]
  BadDirection,

  /// Working memory could not be acquired.
  #[error("memory allocation impossible")]
  AllocationFailure,

  /// Requested container width/height/depth outside the supported ranges.
  #[error("incorrect image dimensions")]
  BadImageDimensions,

  /// Byte blob passed to a bulk load has the wrong length for the image.
  #[error("incorrect load data (size or type)")]
  LoadData,
}
