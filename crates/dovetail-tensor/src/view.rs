use crate::{
    allocator::TensorAllocator,
    storage::TensorStorage,
    tensor::{get_strides_from_shape, increment_index, validate_axes, Tensor, TensorError},
};

/// A non-owning, strided view into the storage of a tensor.
///
/// Views are produced by [`Tensor::reshape`], [`Tensor::permute_axes`] and [`Tensor::slice`].
/// They never copy; call [`TensorView::as_contiguous`] to materialize one.
///
/// # Example
///
/// ```
/// use dovetail_tensor::{Tensor, CpuAllocator};
///
/// let t = Tensor::<i32, 2>::from_shape_vec([2, 2], vec![1, 2, 3, 4], CpuAllocator).unwrap();
/// let view = t.permute_axes([1, 0]).unwrap();
/// assert_eq!(view.as_contiguous().unwrap().as_slice(), &[1, 3, 2, 4]);
/// ```
pub struct TensorView<'a, T, const N: usize, A: TensorAllocator> {
    /// Reference to the storage held by another tensor.
    pub storage: &'a TensorStorage<T, A>,

    /// The shape of the view.
    pub shape: [usize; N],

    /// The strides of the view, in elements.
    pub strides: [usize; N],

    /// The element offset of the first element of the view in the storage.
    pub offset: usize,
}

impl<'a, T, const N: usize, A: TensorAllocator> TensorView<'a, T, N, A> {
    /// Returns the number of elements addressed by the view.
    #[inline]
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Get the element at the given index without checking it against the shape.
    ///
    /// # Panics
    ///
    /// Panics if the computed offset falls outside the storage.
    pub fn get_unchecked(&self, index: [usize; N]) -> &'a T {
        let offset = index
            .iter()
            .zip(self.strides.iter())
            .fold(self.offset, |acc, (i, s)| acc + i * s);
        &self.storage.as_slice()[offset]
    }

    /// Get the element at the given index, or `None` if the index is outside the view.
    pub fn get(&self, index: [usize; N]) -> Option<&'a T> {
        if index.iter().zip(self.shape.iter()).any(|(i, s)| i >= s) {
            return None;
        }
        Some(self.get_unchecked(index))
    }

    /// Returns whether the view addresses its elements in standard row-major order.
    pub fn is_standard_layout(&self) -> bool {
        self.strides == get_strides_from_shape(self.shape)
    }

    /// Reinterpret the view with a new shape.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::ReshapeMismatch`] if the element counts differ and
    /// [`TensorError::NonContiguous`] if the view is not in standard layout.
    pub fn reshape<const M: usize>(
        &self,
        shape: [usize; M],
    ) -> Result<TensorView<'a, T, M, A>, TensorError> {
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

        Ok(TensorView {
            storage: self.storage,
            shape,
            strides: get_strides_from_shape(shape),
            offset: self.offset,
        })
    }

    /// Permute the axes of the view.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidAxes`] if `axes` is not a permutation of `0..N`.
    pub fn permute_axes(&self, axes: [usize; N]) -> Result<TensorView<'a, T, N, A>, TensorError> {
        validate_axes(&axes)?;

        let mut shape = [0; N];
        let mut strides = [0; N];
        for (i, &axis) in axes.iter().enumerate() {
            shape[i] = self.shape[axis];
            strides[i] = self.strides[axis];
        }

        Ok(TensorView {
            storage: self.storage,
            shape,
            strides,
            offset: self.offset,
        })
    }

    /// Copy the elements of the view, in logical order, into a new standard-layout tensor.
    ///
    /// The new tensor is allocated with the allocator of the viewed storage.
    pub fn as_contiguous(&self) -> Result<Tensor<T, N, A>, TensorError>
    where
        T: Clone,
    {
        let numel = self.numel();
        let mut data = Vec::with_capacity(numel);
        let mut index = [0; N];
        for _ in 0..numel {
            data.push(self.get_unchecked(index).clone());
            increment_index(&mut index, &self.shape);
        }

        Tensor::from_shape_vec(self.shape, data, self.storage.alloc().clone())
    }
}
