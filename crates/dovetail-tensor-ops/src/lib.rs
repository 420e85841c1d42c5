#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Element-wise and axis-wise activation functions.
///
/// Element-wise functions accept a tensor of any rank on a floating point type.
/// Axis functions reduce or rescale along one axis and report [`TensorOpsError::DimOutOfBounds`]
/// for an axis the tensor does not have.
pub mod activation;

/// Error types for tensor operations.
///
/// Defines [`TensorOpsError`] for handling failures during tensor computations.
pub mod error;

/// Constant padding of the trailing axes.
pub mod padding;

/// Pixel shuffle and unshuffle between channel and spatial blocks.
pub mod vision;

pub use error::TensorOpsError;
pub use padding::{pad, pad_zeros, Padding};
pub use vision::{pixel_shuffle, pixel_unshuffle};
