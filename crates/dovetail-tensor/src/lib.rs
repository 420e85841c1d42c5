#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! The engine covers exactly the primitives the shape transformations in
//! `dovetail-tensor-ops` are written against: shape introspection, reshape,
//! axis permutation, constant-fill construction and per-axis slice read/write.
//!
//! ```rust
//! use dovetail_tensor::{Tensor, CpuAllocator};
//!
//! let t = Tensor::<f32, 2>::from_shape_vec([2, 3], vec![1., 2., 3., 4., 5., 6.], CpuAllocator).unwrap();
//! let transposed = t.permute_axes([1, 0]).unwrap().as_contiguous().unwrap();
//! assert_eq!(transposed.shape, [3, 2]);
//!
//! let mut canvas = Tensor::<f32, 2>::from_shape_val([4, 5], 0.0, CpuAllocator).unwrap();
//! canvas.slice_assign([1..3, 1..4], &t.view()).unwrap();
//! assert_eq!(canvas.get([2, 3]), Some(&6.0));
//! ```

/// allocator module containing the memory management utilities.
pub mod allocator;

/// serde module containing the serialization and deserialization utilities.
#[cfg(feature = "serde")]
pub mod serde;

/// storage module containing the owned element buffer.
pub mod storage;

/// tensor module containing the tensor implementation and error types.
pub mod tensor;

/// view module containing the strided, non-owning views.
pub mod view;

pub use crate::allocator::{CpuAllocator, TensorAllocator};
pub use crate::tensor::{Tensor, TensorError};
pub use crate::view::TensorView;

/// Type alias for a 1-dimensional tensor.
pub type Tensor1<T, A = CpuAllocator> = Tensor<T, 1, A>;

/// Type alias for a 2-dimensional tensor.
pub type Tensor2<T, A = CpuAllocator> = Tensor<T, 2, A>;

/// Type alias for a 3-dimensional tensor.
pub type Tensor3<T, A = CpuAllocator> = Tensor<T, 3, A>;

/// Type alias for a 4-dimensional tensor.
pub type Tensor4<T, A = CpuAllocator> = Tensor<T, 4, A>;
