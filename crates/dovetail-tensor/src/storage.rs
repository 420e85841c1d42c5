use std::{alloc::Layout, ptr::NonNull};

use crate::allocator::{TensorAllocator, TensorAllocatorError};

/// An owned, contiguous buffer of elements allocated through a [`TensorAllocator`].
///
/// Zero-length buffers (e.g. a tensor with an empty batch) never reach the allocator;
/// they hold a dangling, well-aligned pointer instead.
///
/// # Fields
///
/// * `ptr` - Pointer to the first element.
/// * `len` - The number of initialized elements.
/// * `layout` - The layout used for the allocation.
/// * `alloc` - The allocator that owns the memory.
pub struct TensorStorage<T, A: TensorAllocator> {
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
    alloc: A,
}

impl<T, A: TensorAllocator> TensorStorage<T, A> {
    fn allocate(len: usize, alloc: &A) -> Result<(NonNull<T>, Layout), TensorAllocatorError> {
        let layout = Layout::array::<T>(len).map_err(TensorAllocatorError::LayoutError)?;
        if layout.size() == 0 {
            return Ok((NonNull::dangling(), layout));
        }
        let ptr = alloc.alloc(layout)?.cast::<T>();
        Ok((ptr, layout))
    }

    /// Creates a new tensor storage by moving the elements of a vector into memory
    /// owned by `alloc`.
    ///
    /// # Arguments
    ///
    /// * `vec` - The elements to store.
    /// * `alloc` - The allocator used to allocate the tensor storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocator fails or the layout overflows.
    pub fn from_vec(mut vec: Vec<T>, alloc: A) -> Result<Self, TensorAllocatorError> {
        let len = vec.len();
        let (ptr, layout) = Self::allocate(len, &alloc)?;

        // SAFETY: `ptr` is valid for `len` writes and does not overlap the vector buffer.
        // Setting the vector length to zero hands ownership of the elements to the storage.
        unsafe {
            std::ptr::copy_nonoverlapping(vec.as_ptr(), ptr.as_ptr(), len);
            vec.set_len(0);
        }

        Ok(Self {
            ptr,
            len,
            layout,
            alloc,
        })
    }

    /// Returns the allocator used to allocate the tensor storage.
    #[inline]
    pub fn alloc(&self) -> &A {
        &self.alloc
    }

    /// Returns the number of elements in the storage.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the storage holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the data pointer.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns the storage data as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `ptr` points to `len` initialized elements (or is dangling with `len == 0`).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the storage data as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, and `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T, A: TensorAllocator> Drop for TensorStorage<T, A> {
    fn drop(&mut self) {
        // SAFETY: the elements are initialized and owned by this storage.
        unsafe {
            std::ptr::drop_in_place(std::ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr(),
                self.len,
            ));
        }
        if self.layout.size() != 0 {
            self.alloc.dealloc(self.ptr.cast::<u8>(), self.layout);
        }
    }
}

impl<T: Clone, A: TensorAllocator> Clone for TensorStorage<T, A> {
    fn clone(&self) -> Self {
        Self::from_vec(self.as_slice().to_vec(), self.alloc.clone())
            .unwrap_or_else(|_| std::alloc::handle_alloc_error(self.layout))
    }
}

// SAFETY: the storage uniquely owns its elements, like `Vec<T>`.
unsafe impl<T: Send, A: TensorAllocator + Send> Send for TensorStorage<T, A> {}
unsafe impl<T: Sync, A: TensorAllocator + Sync> Sync for TensorStorage<T, A> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::CpuAllocator;
    use std::rc::Rc;

    #[test]
    fn test_tensor_storage_from_vec() -> Result<(), TensorAllocatorError> {
        let storage = TensorStorage::from_vec(vec![0u8, 1, 2, 3, 4, 5], CpuAllocator)?;
        assert_eq!(storage.len(), 6);
        assert!(!storage.is_empty());
        assert_eq!(storage.as_slice(), &[0, 1, 2, 3, 4, 5]);
        Ok(())
    }

    #[test]
    fn test_tensor_storage_empty() -> Result<(), TensorAllocatorError> {
        let storage = TensorStorage::<f32, _>::from_vec(Vec::new(), CpuAllocator)?;
        assert!(storage.is_empty());
        assert_eq!(storage.as_slice(), &[] as &[f32]);
        Ok(())
    }

    #[test]
    fn test_tensor_storage_mut_slice() -> Result<(), TensorAllocatorError> {
        let mut storage = TensorStorage::from_vec(vec![1i32, 2, 3], CpuAllocator)?;
        storage.as_mut_slice()[1] = 20;
        assert_eq!(storage.as_slice(), &[1, 20, 3]);
        Ok(())
    }

    #[test]
    fn test_tensor_storage_drops_elements_once() -> Result<(), TensorAllocatorError> {
        let marker = Rc::new(());
        let storage = TensorStorage::from_vec(vec![marker.clone(), marker.clone()], CpuAllocator)?;
        assert_eq!(Rc::strong_count(&marker), 3);
        let cloned = storage.clone();
        assert_eq!(Rc::strong_count(&marker), 5);
        drop(storage);
        drop(cloned);
        assert_eq!(Rc::strong_count(&marker), 1);
        Ok(())
    }
}
