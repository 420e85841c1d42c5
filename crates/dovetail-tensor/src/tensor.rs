use std::{alloc::Layout, ops::Range};

use thiserror::Error;

use crate::{
    allocator::{CpuAllocator, TensorAllocator, TensorAllocatorError},
    storage::TensorStorage,
    view::TensorView,
};

/// An error type for tensor operations.
#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
    /// The number of elements in the data does not match the shape of the tensor.
    #[error("The number of elements in the data does not match the shape of the tensor: {0} != {1}")]
    InvalidShape(usize, usize),

    /// The element count of the target shape differs from the source shape.
    #[error("Cannot reshape {from:?} ({from_numel} elements) into {to:?} ({to_numel} elements)")]
    ReshapeMismatch {
        /// The shape of the source tensor.
        from: Vec<usize>,
        /// The number of elements of the source tensor.
        from_numel: usize,
        /// The requested shape.
        to: Vec<usize>,
        /// The number of elements of the requested shape.
        to_numel: usize,
    },

    /// The axes passed to a permutation are not a permutation of `0..rank`.
    #[error("Invalid axes permutation {axes:?} for a tensor of rank {rank}")]
    InvalidAxes {
        /// The requested axes order.
        axes: Vec<usize>,
        /// The rank of the tensor.
        rank: usize,
    },

    /// A slice range does not fit inside its axis.
    #[error("Slice {start}..{end} is out of bounds for axis {axis} of size {size}")]
    SliceOutOfBounds {
        /// The offending axis.
        axis: usize,
        /// The range start.
        start: usize,
        /// The range end (exclusive).
        end: usize,
        /// The size of the axis.
        size: usize,
    },

    /// Two shapes that must be equal differ.
    #[error("Shape mismatch: {0:?} != {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// The element count of a shape does not fit in `usize`.
    #[error("The element count of shape {0:?} overflows usize")]
    ShapeOverflow(Vec<usize>),

    /// The operation needs a tensor laid out in standard row-major order.
    #[error("The operation requires a tensor with standard (row-major) layout")]
    NonContiguous,

    /// Error with the tensor storage.
    #[error("Error with the tensor storage: {0}")]
    StorageError(#[from] TensorAllocatorError),
}

/// Compute the strides of a row-major (C-contiguous) tensor from its shape.
///
/// # Example
///
/// ```
/// use dovetail_tensor::tensor::get_strides_from_shape;
///
/// assert_eq!(get_strides_from_shape([2, 3, 4]), [12, 4, 1]);
/// ```
pub fn get_strides_from_shape<const N: usize>(shape: [usize; N]) -> [usize; N] {
    let mut strides: [usize; N] = [0; N];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

/// Check that `axes` is a permutation of `0..N`.
pub(crate) fn validate_axes<const N: usize>(axes: &[usize; N]) -> Result<(), TensorError> {
    let mut seen = [false; N];
    for &axis in axes.iter() {
        if axis >= N || seen[axis] {
            return Err(TensorError::InvalidAxes {
                axes: axes.to_vec(),
                rank: N,
            });
        }
        seen[axis] = true;
    }
    Ok(())
}

/// Check per-axis ranges against a shape and return the shape of the selected region.
pub(crate) fn validate_ranges<const N: usize>(
    shape: &[usize; N],
    ranges: &[Range<usize>; N],
) -> Result<[usize; N], TensorError> {
    let mut region = [0; N];
    for (axis, (range, &size)) in ranges.iter().zip(shape.iter()).enumerate() {
        if range.start > range.end || range.end > size {
            return Err(TensorError::SliceOutOfBounds {
                axis,
                start: range.start,
                end: range.end,
                size,
            });
        }
        region[axis] = range.end - range.start;
    }
    Ok(region)
}

/// Advance a row-major multi-index by one element.
pub(crate) fn increment_index<const N: usize>(index: &mut [usize; N], shape: &[usize; N]) {
    for dim in (0..N).rev() {
        index[dim] += 1;
        if index[dim] < shape[dim] {
            return;
        }
        index[dim] = 0;
    }
}

/// A data structure to represent a multi-dimensional tensor.
///
/// NOTE: the tensor owns its data, which is always stored in standard row-major layout.
///
/// # Attributes
///
/// * `storage` - The storage of the tensor.
/// * `shape` - The shape of the tensor.
/// * `strides` - The strides of the tensor data in memory.
///
/// # Example
///
/// ```
/// use dovetail_tensor::{Tensor, CpuAllocator};
///
/// let data: Vec<u8> = vec![1, 2, 3, 4];
/// let t = Tensor::<u8, 2>::from_shape_vec([2, 2], data, CpuAllocator).unwrap();
/// assert_eq!(t.shape, [2, 2]);
/// ```
pub struct Tensor<T, const N: usize, A: TensorAllocator = CpuAllocator> {
    /// The storage of the tensor.
    pub storage: TensorStorage<T, A>,
    /// The shape of the tensor.
    pub shape: [usize; N],
    /// The strides of the tensor data in memory.
    pub strides: [usize; N],
}

impl<T, const N: usize, A: TensorAllocator> Tensor<T, N, A> {
    /// Get the data of the tensor as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Get the data of the tensor as a mutable slice.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }

    /// Get the data of the tensor as a pointer.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Creates a new `Tensor` with the given shape and data.
    ///
    /// # Arguments
    ///
    /// * `shape` - An array containing the shape of the tensor.
    /// * `data` - A vector containing the data of the tensor.
    /// * `alloc` - The allocator to use.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape of the tensor, an error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use dovetail_tensor::{Tensor, CpuAllocator};
    ///
    /// let t = Tensor::<u8, 2>::from_shape_vec([2, 3], vec![1, 2, 3, 4, 5, 6], CpuAllocator).unwrap();
    /// assert_eq!(t.strides, [3, 1]);
    /// ```
    pub fn from_shape_vec(shape: [usize; N], data: Vec<T>, alloc: A) -> Result<Self, TensorError> {
        let numel = shape.iter().product::<usize>();
        if numel != data.len() {
            return Err(TensorError::InvalidShape(numel, data.len()));
        }
        let storage = TensorStorage::from_vec(data, alloc)?;
        let strides = get_strides_from_shape(shape);
        Ok(Self {
            storage,
            shape,
            strides,
        })
    }

    /// Creates a new `Tensor` with the given shape and a slice of data.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape of the tensor, an error is returned.
    pub fn from_shape_slice(shape: [usize; N], data: &[T], alloc: A) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        Self::from_shape_vec(shape, data.to_vec(), alloc)
    }

    /// Creates a new `Tensor` with the given shape where every element is `value`.
    ///
    /// # Example
    ///
    /// ```
    /// use dovetail_tensor::{Tensor, CpuAllocator};
    ///
    /// let t = Tensor::<f32, 3>::from_shape_val([2, 1, 3], 7.0, CpuAllocator).unwrap();
    /// assert_eq!(t.as_slice(), &[7.0; 6]);
    /// ```
    pub fn from_shape_val(shape: [usize; N], value: T, alloc: A) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        let numel = shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| TensorError::ShapeOverflow(shape.to_vec()))?;
        // reject sizes the allocator cannot serve before `vec!` tries to
        Layout::array::<T>(numel).map_err(TensorAllocatorError::LayoutError)?;
        Self::from_shape_vec(shape, vec![value; numel], alloc)
    }

    /// Creates a new `Tensor` with the given shape, generating each element from its index.
    ///
    /// # Example
    ///
    /// ```
    /// use dovetail_tensor::{Tensor, CpuAllocator};
    ///
    /// let t = Tensor::<usize, 2>::from_shape_fn([2, 2], CpuAllocator, |[i, j]| i * 2 + j).unwrap();
    /// assert_eq!(t.as_slice(), &[0, 1, 2, 3]);
    /// ```
    pub fn from_shape_fn<F>(shape: [usize; N], alloc: A, f: F) -> Result<Self, TensorError>
    where
        F: Fn([usize; N]) -> T,
    {
        let numel = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(numel);
        let mut index = [0; N];
        for _ in 0..numel {
            data.push(f(index));
            increment_index(&mut index, &shape);
        }
        Self::from_shape_vec(shape, data, alloc)
    }

    /// Creates a new `Tensor` filled with zeros.
    pub fn zeros(shape: [usize; N], alloc: A) -> Result<Self, TensorError>
    where
        T: Clone + num_traits::Zero,
    {
        Self::from_shape_val(shape, T::zero(), alloc)
    }

    /// Returns the number of elements in the tensor.
    #[inline]
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Returns the rank (number of axes) of the tensor.
    #[inline]
    pub fn rank(&self) -> usize {
        N
    }

    /// Get the offset of the element at the given index, or `None` if out of bounds.
    pub fn get_iter_offset(&self, index: [usize; N]) -> Option<usize> {
        let mut offset = 0;
        for ((&idx, dim_size), stride) in index.iter().zip(self.shape).zip(self.strides) {
            if idx >= dim_size {
                return None;
            }
            offset += idx * stride;
        }
        Some(offset)
    }

    /// Get the element at the given index.
    ///
    /// # Panics
    ///
    /// Panics if the computed offset falls outside the storage.
    pub fn get_unchecked(&self, index: [usize; N]) -> &T {
        let offset = index
            .iter()
            .zip(self.strides.iter())
            .fold(0, |acc, (i, s)| acc + i * s);
        &self.as_slice()[offset]
    }

    /// Get the element at the given index, checking the index against the shape.
    ///
    /// # Example
    ///
    /// ```
    /// use dovetail_tensor::{Tensor, CpuAllocator};
    ///
    /// let t = Tensor::<u8, 2>::from_shape_vec([2, 2], vec![1, 2, 3, 4], CpuAllocator).unwrap();
    /// assert_eq!(t.get([1, 0]), Some(&3));
    /// assert!(t.get([2, 0]).is_none());
    /// ```
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        self.get_iter_offset(index)
            .and_then(|i| self.as_slice().get(i))
    }

    /// Returns whether the strides describe a standard row-major layout.
    pub fn is_standard_layout(&self) -> bool {
        self.strides == get_strides_from_shape(self.shape)
    }

    /// Return a view of the whole tensor.
    pub fn view(&self) -> TensorView<'_, T, N, A> {
        TensorView {
            storage: &self.storage,
            shape: self.shape,
            strides: self.strides,
            offset: 0,
        }
    }

    /// Reshape the tensor to a new shape without copying.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::ReshapeMismatch`] if the element counts differ and
    /// [`TensorError::NonContiguous`] if the tensor is not in standard layout.
    ///
    /// # Example
    ///
    /// ```
    /// use dovetail_tensor::{Tensor, CpuAllocator};
    ///
    /// let t = Tensor::<u8, 1>::from_shape_vec([4], vec![1, 2, 3, 4], CpuAllocator).unwrap();
    /// let view = t.reshape([2, 2]).unwrap();
    /// assert_eq!(view.shape, [2, 2]);
    /// assert_eq!(view.strides, [2, 1]);
    /// ```
    pub fn reshape<const M: usize>(
        &self,
        shape: [usize; M],
    ) -> Result<TensorView<'_, T, M, A>, TensorError> {
        self.view().reshape(shape)
    }

    /// Reshape the tensor to a new shape, consuming it.
    ///
    /// # Errors
    ///
    /// Same as [`Tensor::reshape`].
    pub fn into_shape<const M: usize>(self, shape: [usize; M]) -> Result<Tensor<T, M, A>, TensorError> {
        let numel = shape.iter().product::<usize>();
        if numel != self.numel() {
            return Err(TensorError::ReshapeMismatch {
                from: self.shape.to_vec(),
                from_numel: self.numel(),
                to: shape.to_vec(),
                to_numel: numel,
            });
        }
        if !self.is_standard_layout() {
            return Err(TensorError::NonContiguous);
        }
        Ok(Tensor {
            storage: self.storage,
            shape,
            strides: get_strides_from_shape(shape),
        })
    }

    /// Permute the axes of the tensor, returning a strided view.
    ///
    /// `axes[i]` names the source axis that becomes axis `i` of the view.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidAxes`] if `axes` is not a permutation of `0..N`.
    ///
    /// # Example
    ///
    /// ```
    /// use dovetail_tensor::{Tensor, CpuAllocator};
    ///
    /// let t = Tensor::<u8, 2>::from_shape_vec([2, 3], vec![1, 2, 3, 4, 5, 6], CpuAllocator).unwrap();
    /// let transposed = t.permute_axes([1, 0]).unwrap().as_contiguous().unwrap();
    /// assert_eq!(transposed.shape, [3, 2]);
    /// assert_eq!(transposed.as_slice(), &[1, 4, 2, 5, 3, 6]);
    /// ```
    pub fn permute_axes(&self, axes: [usize; N]) -> Result<TensorView<'_, T, N, A>, TensorError> {
        self.view().permute_axes(axes)
    }

    /// Select a rectangular region of the tensor given one range per axis.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::SliceOutOfBounds`] if a range does not fit its axis.
    pub fn slice(&self, ranges: [Range<usize>; N]) -> Result<TensorView<'_, T, N, A>, TensorError> {
        let shape = validate_ranges(&self.shape, &ranges)?;
        let offset = ranges
            .iter()
            .zip(self.strides.iter())
            .map(|(r, &s)| r.start * s)
            .sum();
        Ok(TensorView {
            storage: &self.storage,
            shape,
            strides: self.strides,
            offset,
        })
    }

    /// Overwrite a rectangular region of the tensor with the elements of `src`.
    ///
    /// # Arguments
    ///
    /// * `ranges` - One range per axis selecting the destination region.
    /// * `src` - The values to copy; its shape must equal the range lengths.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::SliceOutOfBounds`] if a range does not fit its axis and
    /// [`TensorError::ShapeMismatch`] if `src` does not have the shape of the region.
    ///
    /// # Example
    ///
    /// ```
    /// use dovetail_tensor::{Tensor, CpuAllocator};
    ///
    /// let mut dst = Tensor::<u8, 2>::zeros([3, 3], CpuAllocator).unwrap();
    /// let src = Tensor::<u8, 2>::from_shape_val([1, 3], 1, CpuAllocator).unwrap();
    /// dst.slice_assign([1..2, 0..3], &src.view()).unwrap();
    /// assert_eq!(dst.as_slice(), &[0, 0, 0, 1, 1, 1, 0, 0, 0]);
    /// ```
    pub fn slice_assign<A2: TensorAllocator>(
        &mut self,
        ranges: [Range<usize>; N],
        src: &TensorView<'_, T, N, A2>,
    ) -> Result<(), TensorError>
    where
        T: Clone,
    {
        let region = validate_ranges(&self.shape, &ranges)?;
        if region != src.shape {
            return Err(TensorError::ShapeMismatch(
                region.to_vec(),
                src.shape.to_vec(),
            ));
        }

        let numel = region.iter().product::<usize>();
        let strides = self.strides;
        let base = ranges
            .iter()
            .zip(strides.iter())
            .map(|(r, &s)| r.start * s)
            .sum::<usize>();
        let dst = self.storage.as_mut_slice();

        let mut index = [0; N];
        for _ in 0..numel {
            let offset = index
                .iter()
                .zip(strides.iter())
                .fold(base, |acc, (i, s)| acc + i * s);
            dst[offset] = src.get_unchecked(index).clone();
            increment_index(&mut index, &region);
        }

        Ok(())
    }

    /// Apply a function to each element of the tensor.
    ///
    /// # Example
    ///
    /// ```
    /// use dovetail_tensor::{Tensor, CpuAllocator};
    ///
    /// let t = Tensor::<u8, 1>::from_shape_vec([4], vec![1, 2, 3, 4], CpuAllocator).unwrap();
    /// let t2 = t.map(|x| *x + 1).unwrap();
    /// assert_eq!(t2.as_slice(), &[2, 3, 4, 5]);
    /// ```
    pub fn map<U, F>(&self, f: F) -> Result<Tensor<U, N, A>, TensorError>
    where
        F: Fn(&T) -> U,
    {
        let data: Vec<U> = self.as_slice().iter().map(f).collect();
        let storage = TensorStorage::from_vec(data, self.storage.alloc().clone())?;
        Ok(Tensor {
            storage,
            shape: self.shape,
            strides: self.strides,
        })
    }
}

impl<T: Clone, const N: usize, A: TensorAllocator> Clone for Tensor<T, N, A> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            shape: self.shape,
            strides: self.strides,
        }
    }
}

impl<T: std::fmt::Debug, const N: usize, A: TensorAllocator> std::fmt::Debug for Tensor<T, N, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("data", &self.as_slice())
            .finish()
    }
}
