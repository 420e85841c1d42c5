use std::ops::Range;

use dovetail_tensor::{Tensor, TensorAllocator};

use crate::error::TensorOpsError;

/// A constant padding specification over the trailing axes of a tensor.
///
/// The values follow the framework convention of listing the last axis first:
/// `[left, right]` pads the last axis, `[left, right, top, bottom]` pads the last
/// two axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// Pad only the last axis.
    ///
    /// Example: `[a b c]` with `left = 1, right = 2` gives `[v a b c v v]`.
    LastDim {
        /// Number of values prepended to the last axis.
        left: usize,
        /// Number of values appended to the last axis.
        right: usize,
    },

    /// Pad the last two axes.
    LastTwoDims {
        /// Number of values prepended to the last axis.
        left: usize,
        /// Number of values appended to the last axis.
        right: usize,
        /// Number of values prepended to the second-to-last axis.
        top: usize,
        /// Number of values appended to the second-to-last axis.
        bottom: usize,
    },
}

impl Padding {
    /// Parse a flat padding specification of 2 or 4 values.
    ///
    /// # Errors
    ///
    /// * [`TensorOpsError::InvalidPaddingLength`] if the number of values is odd.
    /// * [`TensorOpsError::PaddingTooLarge`] if there are more than 4 values.
    /// * [`TensorOpsError::EmptyPadding`] if there are no values.
    ///
    /// # Example
    ///
    /// ```
    /// use dovetail_tensor_ops::Padding;
    ///
    /// let p = Padding::from_slice(&[1, 2]).unwrap();
    /// assert_eq!(p, Padding::LastDim { left: 1, right: 2 });
    /// assert!(Padding::from_slice(&[1, 2, 3]).is_err());
    /// ```
    pub fn from_slice(padding: &[usize]) -> Result<Self, TensorOpsError> {
        match *padding {
            [left, right] => Ok(Self::LastDim { left, right }),
            [left, right, top, bottom] => Ok(Self::LastTwoDims {
                left,
                right,
                top,
                bottom,
            }),
            [] => Err(TensorOpsError::EmptyPadding),
            _ if padding.len() % 2 != 0 => {
                Err(TensorOpsError::InvalidPaddingLength(padding.to_vec()))
            }
            _ => Err(TensorOpsError::PaddingTooLarge(padding.to_vec())),
        }
    }

    /// The `(before, after)` amounts of each padded axis, last axis first.
    fn amounts(&self) -> ([(usize, usize); 2], usize) {
        match *self {
            Self::LastDim { left, right } => ([(left, right), (0, 0)], 1),
            Self::LastTwoDims {
                left,
                right,
                top,
                bottom,
            } => ([(left, right), (top, bottom)], 2),
        }
    }

    /// Returns the flat `[left, right]` or `[left, right, top, bottom]` values.
    pub fn to_vec(&self) -> Vec<usize> {
        let (amounts, count) = self.amounts();
        amounts[..count]
            .iter()
            .flat_map(|&(before, after)| [before, after])
            .collect()
    }

    /// Returns the shape of `shape` once padded.
    ///
    /// # Errors
    ///
    /// * [`TensorOpsError::RankError`] if `shape` has fewer axes than the padding touches.
    /// * [`TensorOpsError::PaddingOverflow`] if a padded size does not fit in `usize`.
    ///
    /// # Example
    ///
    /// ```
    /// use dovetail_tensor_ops::Padding;
    ///
    /// let p = Padding::from_slice(&[1, 2, 3, 4]).unwrap();
    /// assert_eq!(p.output_shape([1, 1, 4, 5]).unwrap(), [1, 1, 11, 8]);
    /// assert!(p.output_shape([5]).is_err());
    /// ```
    pub fn output_shape<const N: usize>(
        &self,
        shape: [usize; N],
    ) -> Result<[usize; N], TensorOpsError> {
        let (amounts, count) = self.amounts();
        if count > N {
            return Err(TensorOpsError::RankError {
                rank: N,
                shape: shape.to_vec(),
            });
        }

        let mut out = shape;
        for (i, &(before, after)) in amounts[..count].iter().enumerate() {
            let axis = N - 1 - i;
            out[axis] = shape[axis]
                .checked_add(before)
                .and_then(|size| size.checked_add(after))
                .ok_or_else(|| TensorOpsError::PaddingOverflow {
                    padding: self.to_vec(),
                    shape: shape.to_vec(),
                })?;
        }
        Ok(out)
    }

    /// Returns the region of the padded output that receives the unpadded input.
    ///
    /// `shape` must already have passed [`Padding::output_shape`], which bounds every end.
    fn interior<const N: usize>(&self, shape: [usize; N]) -> [Range<usize>; N] {
        let (amounts, count) = self.amounts();
        let mut ranges: [Range<usize>; N] = std::array::from_fn(|axis| 0..shape[axis]);
        for (i, &(before, _)) in amounts[..count].iter().enumerate() {
            let axis = N - 1 - i;
            ranges[axis] = before..before + shape[axis];
        }
        ranges
    }
}

impl TryFrom<&[usize]> for Padding {
    type Error = TensorOpsError;

    fn try_from(padding: &[usize]) -> Result<Self, Self::Error> {
        Self::from_slice(padding)
    }
}

/// Pad the trailing axes of a tensor with a constant value.
///
/// A 2-value padding `[left, right]` pads the last axis only, whatever the rank.
/// A 4-value padding `[left, right, top, bottom]` pads the last two axes. The
/// leading batch and channel axes are never padded.
///
/// # Arguments
///
/// * `input` - The input tensor of rank 2, 3 or 4.
/// * `padding` - The flat padding specification, 2 or 4 values.
/// * `value` - The fill value of the padded border.
///
/// # Returns
///
/// A new tensor holding the input surrounded by `value`.
///
/// # Errors
///
/// * [`TensorOpsError::RankError`] if the input rank is not 2, 3 or 4.
/// * The errors of [`Padding::from_slice`] for a malformed specification.
/// * [`TensorOpsError::PaddingOverflow`] if a padded size does not fit in `usize`.
///
/// # Example
///
/// ```
/// use dovetail_tensor::{Tensor, CpuAllocator};
/// use dovetail_tensor_ops::pad;
///
/// let x = Tensor::<f32, 2>::from_shape_val([2, 3], 1.0, CpuAllocator).unwrap();
/// let y = pad(&x, &[1, 1], 0.0).unwrap();
/// assert_eq!(y.shape, [2, 5]);
/// assert_eq!(y.as_slice(), &[0., 1., 1., 1., 0., 0., 1., 1., 1., 0.]);
/// ```
pub fn pad<T, const N: usize, A>(
    input: &Tensor<T, N, A>,
    padding: &[usize],
    value: T,
) -> Result<Tensor<T, N, A>, TensorOpsError>
where
    T: Clone,
    A: TensorAllocator,
{
    if !(2..=4).contains(&N) {
        return Err(TensorOpsError::RankError {
            rank: N,
            shape: input.shape.to_vec(),
        });
    }
    let spec = Padding::from_slice(padding)?;

    let out_shape = spec.output_shape(input.shape)?;

    let mut output = Tensor::from_shape_val(
        out_shape,
        value,
        input.storage.alloc().clone(),
    )?;
    let interior = spec.interior(input.shape);

    if N == 2 {
        output.slice_assign(interior, &input.view())?;
    } else {
        // one leading-index slice at a time
        for i in 0..input.shape[0] {
            let mut dst = interior.clone();
            dst[0] = i..i + 1;
            let mut src: [Range<usize>; N] = std::array::from_fn(|axis| 0..input.shape[axis]);
            src[0] = i..i + 1;
            output.slice_assign(dst, &input.slice(src)?)?;
        }
    }

    log::debug!("pad: {:?} -> {:?} ({:?})", input.shape, output.shape, spec);

    Ok(output)
}

/// Pad the trailing axes of a tensor with zeros.
///
/// See [`pad`].
pub fn pad_zeros<T, const N: usize, A>(
    input: &Tensor<T, N, A>,
    padding: &[usize],
) -> Result<Tensor<T, N, A>, TensorOpsError>
where
    T: Clone + num_traits::Zero,
    A: TensorAllocator,
{
    pad(input, padding, T::zero())
}
