use dovetail_tensor::TensorError;
use thiserror::Error;

/// An error type for tensor operations.
#[derive(Error, Debug, PartialEq)]
pub enum TensorOpsError {
    /// The input rank does not match the rank the operation requires.
    #[error("{op} expects {expected}D input, but got input with sizes {shape:?}")]
    DimensionError {
        /// The operation that rejected the input.
        op: &'static str,
        /// The required rank.
        expected: usize,
        /// The shape of the input.
        shape: Vec<usize>,
    },

    /// The scale factor of a pixel rescaling operation is zero or its square overflows.
    #[error("Scale factor must be positive and its square representable, got {0}")]
    InvalidScaleFactor(usize),

    /// The channel count is not a multiple of the squared upscale factor.
    #[error(
        "pixel_shuffle expects input channel to be divisible by square of upscale_factor, \
         but got input with sizes {shape:?}, upscale_factor={upscale_factor}, \
         and self.size(1)={channels} is not divisible by {factor_squared}"
    )]
    ChannelsNotDivisible {
        /// The shape of the input.
        shape: Vec<usize>,
        /// The requested upscale factor.
        upscale_factor: usize,
        /// The channel count of the input.
        channels: usize,
        /// The square of the upscale factor.
        factor_squared: usize,
    },

    /// The height or the width is not a multiple of the downscale factor.
    #[error(
        "pixel_unshuffle expects input height and width to be divisible by downscale_factor, \
         but got input with sizes {shape:?}, downscale_factor={downscale_factor}, \
         and either self.size(2)={height} or self.size(3)={width} is not divisible by {downscale_factor}"
    )]
    SpatialNotDivisible {
        /// The shape of the input.
        shape: Vec<usize>,
        /// The requested downscale factor.
        downscale_factor: usize,
        /// The height of the input.
        height: usize,
        /// The width of the input.
        width: usize,
    },

    /// The padding specification has an odd number of values.
    #[error("Padding length must be divisible by 2, got {len} values {0:?}", len = .0.len())]
    InvalidPaddingLength(Vec<usize>),

    /// The padding specification has more than four values.
    #[error("Padding length too large, got {len} values {0:?} (at most 4)", len = .0.len())]
    PaddingTooLarge(Vec<usize>),

    /// The padding specification is empty.
    #[error("Padding must contain 2 or 4 values, got none")]
    EmptyPadding,

    /// A padded size does not fit in `usize`.
    #[error("Padding {padding:?} overflows the sizes {shape:?}")]
    PaddingOverflow {
        /// The padding values.
        padding: Vec<usize>,
        /// The shape of the input.
        shape: Vec<usize>,
    },

    /// The input rank is not supported by the padding operation.
    #[error("pad expects 2D, 3D or 4D input, but got {rank}D input with sizes {shape:?}")]
    RankError {
        /// The rank of the input.
        rank: usize,
        /// The shape of the input.
        shape: Vec<usize>,
    },

    /// The axis to perform the operation over is not an axis of the tensor.
    #[error("Dimension out of bounds. The dimension {0} is out of bounds for a tensor of rank {1}.")]
    DimOutOfBounds(usize, usize),

    /// An axis that must be split in two halves has an odd length.
    #[error("Axis {axis} of size {size} cannot be split in two halves")]
    OddSplitAxis {
        /// The axis to split.
        axis: usize,
        /// The size of the axis.
        size: usize,
    },

    /// Shape mismatch
    #[error("Shape mismatch: {0:?} != {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Tensor error
    #[error("Error with the tensor: {0}")]
    TensorError(#[from] TensorError),
}
