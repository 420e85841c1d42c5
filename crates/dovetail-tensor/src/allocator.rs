use std::alloc::Layout;
use std::ptr::NonNull;

use thiserror::Error;

/// Failure to obtain the memory of a tensor.
#[derive(Debug, Error, PartialEq)]
pub enum TensorAllocatorError {
    /// The requested element count does not form a valid memory layout.
    #[error("Invalid tensor layout {0}")]
    LayoutError(core::alloc::LayoutError),

    /// The allocator could not serve the request.
    #[error("Allocation of {size} bytes (align {align}) failed")]
    NullPointer {
        /// The requested size in bytes.
        size: usize,
        /// The requested alignment.
        align: usize,
    },
}

/// Source of the memory behind a [`crate::storage::TensorStorage`].
///
/// Storages hand every pointer back to `dealloc` with the layout it was allocated for,
/// exactly once. Storages of zero-sized layouts never reach the allocator.
pub trait TensorAllocator: Clone {
    /// Allocates a block of memory fitting `layout`.
    fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, TensorAllocatorError>;

    /// Releases a block returned by [`TensorAllocator::alloc`] for the same `layout`.
    fn dealloc(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The system allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuAllocator;

impl TensorAllocator for CpuAllocator {
    fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, TensorAllocatorError> {
        let failed = TensorAllocatorError::NullPointer {
            size: layout.size(),
            align: layout.align(),
        };
        if layout.size() == 0 {
            // an aligned, never dereferenced address
            return NonNull::new(layout.align() as *mut u8).ok_or(failed);
        }
        // SAFETY: the layout has a non-zero size.
        let raw = unsafe { std::alloc::alloc(layout) };
        NonNull::new(raw).ok_or(failed)
    }

    fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        // SAFETY: `ptr` came from `alloc` with this non-zero-sized `layout`.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_allocator_round_trip() -> Result<(), TensorAllocatorError> {
        let layout = Layout::array::<f64>(64).map_err(TensorAllocatorError::LayoutError)?;
        let ptr = CpuAllocator.alloc(layout)?;
        assert_eq!(ptr.as_ptr() as usize % layout.align(), 0);
        CpuAllocator.dealloc(ptr, layout);
        Ok(())
    }

    #[test]
    fn test_cpu_allocator_zero_size() -> Result<(), TensorAllocatorError> {
        let layout = Layout::array::<u32>(0).map_err(TensorAllocatorError::LayoutError)?;
        let ptr = CpuAllocator.alloc(layout)?;
        assert_eq!(ptr.as_ptr() as usize, layout.align());
        CpuAllocator.dealloc(ptr, layout);
        Ok(())
    }

    #[test]
    fn test_layout_overflow() {
        let err = Layout::array::<u32>(usize::MAX).map_err(TensorAllocatorError::LayoutError);
        assert!(err.is_err_and(|e| e.to_string().starts_with("Invalid tensor layout")));
    }
}
