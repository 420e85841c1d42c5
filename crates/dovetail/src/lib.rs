#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use dovetail_tensor as tensor;

#[doc(inline)]
pub use dovetail_tensor_ops as tensor_ops;
