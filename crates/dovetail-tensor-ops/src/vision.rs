use dovetail_tensor::{Tensor, TensorAllocator};

use crate::error::TensorOpsError;

/// Read the `(batch, channels, height, width)` sizes of a rank-4 input.
fn batched_image_dims<T, const N: usize, A: TensorAllocator>(
    op: &'static str,
    input: &Tensor<T, N, A>,
) -> Result<[usize; 4], TensorOpsError> {
    match input.shape.as_slice() {
        [b, c, h, w] => Ok([*b, *c, *h, *w]),
        _ => Err(TensorOpsError::DimensionError {
            op,
            expected: 4,
            shape: input.shape.to_vec(),
        }),
    }
}

/// Rearrange channel blocks into spatial blocks.
///
/// Maps an input of shape `(b, c, h, w)` to `(b, c / r², h * r, w * r)` where
/// `r` is the upscale factor. Every `r × r` output block is filled with the values
/// of `r²` consecutive input channels at the same spatial position:
///
/// `out[n, k, y * r + i, x * r + j] == input[n, k * r² + i * r + j, y, x]`
///
/// # Arguments
///
/// * `input` - The input tensor. Must be of rank 4.
/// * `upscale_factor` - The spatial upscale factor `r`.
///
/// # Returns
///
/// A new tensor of rank 4 allocated with the allocator of the input.
///
/// # Errors
///
/// * [`TensorOpsError::DimensionError`] if the input is not of rank 4.
/// * [`TensorOpsError::InvalidScaleFactor`] if `upscale_factor` is zero.
/// * [`TensorOpsError::ChannelsNotDivisible`] if `c` is not a multiple of `r²`.
///
/// # Example
///
/// ```
/// use dovetail_tensor::{Tensor, CpuAllocator};
/// use dovetail_tensor_ops::pixel_shuffle;
///
/// let x = Tensor::<f32, 4>::zeros([1, 8, 3, 3], CpuAllocator).unwrap();
/// let y = pixel_shuffle(&x, 2).unwrap();
/// assert_eq!(y.shape, [1, 2, 6, 6]);
/// ```
pub fn pixel_shuffle<T, const N: usize, A>(
    input: &Tensor<T, N, A>,
    upscale_factor: usize,
) -> Result<Tensor<T, 4, A>, TensorOpsError>
where
    T: Clone,
    A: TensorAllocator,
{
    let [b, c, h, w] = batched_image_dims("pixel_shuffle", input)?;
    let r = upscale_factor;
    if r == 0 {
        return Err(TensorOpsError::InvalidScaleFactor(r));
    }
    let factor_squared = r
        .checked_mul(r)
        .ok_or(TensorOpsError::InvalidScaleFactor(r))?;

    if c % factor_squared != 0 {
        return Err(TensorOpsError::ChannelsNotDivisible {
            shape: input.shape.to_vec(),
            upscale_factor: r,
            channels: c,
            factor_squared,
        });
    }
    let oc = c / factor_squared;

    // (b, oc, r, r, h, w) -> (b, oc, h, r, w, r)
    let output = input
        .reshape([b, oc, r, r, h, w])?
        .permute_axes([0, 1, 4, 2, 5, 3])?
        .as_contiguous()?
        .into_shape([b, oc, h * r, w * r])?;

    log::debug!(
        "pixel_shuffle: {:?} -> {:?} (upscale_factor={})",
        input.shape,
        output.shape,
        r
    );

    Ok(output)
}

/// Rearrange spatial blocks into channel blocks, the inverse of [`pixel_shuffle`].
///
/// Maps an input of shape `(b, c, h, w)` to `(b, c * r², h / r, w / r)` where
/// `r` is the downscale factor:
///
/// `out[n, k * r² + i * r + j, y, x] == input[n, k, y * r + i, x * r + j]`
///
/// # Arguments
///
/// * `input` - The input tensor. Must be of rank 4.
/// * `downscale_factor` - The spatial downscale factor `r`.
///
/// # Errors
///
/// * [`TensorOpsError::DimensionError`] if the input is not of rank 4.
/// * [`TensorOpsError::InvalidScaleFactor`] if `downscale_factor` is zero.
/// * [`TensorOpsError::SpatialNotDivisible`] if `h` or `w` is not a multiple of `r`.
///
/// # Example
///
/// ```
/// use dovetail_tensor::{Tensor, CpuAllocator};
/// use dovetail_tensor_ops::{pixel_shuffle, pixel_unshuffle};
///
/// let x = Tensor::<u8, 4>::from_shape_fn([1, 1, 4, 4], CpuAllocator, |[_, _, y, x]| (y * 4 + x) as u8).unwrap();
/// let y = pixel_unshuffle(&x, 2).unwrap();
/// assert_eq!(y.shape, [1, 4, 2, 2]);
/// assert_eq!(pixel_shuffle(&y, 2).unwrap().as_slice(), x.as_slice());
/// ```
pub fn pixel_unshuffle<T, const N: usize, A>(
    input: &Tensor<T, N, A>,
    downscale_factor: usize,
) -> Result<Tensor<T, 4, A>, TensorOpsError>
where
    T: Clone,
    A: TensorAllocator,
{
    let [b, c, h, w] = batched_image_dims("pixel_unshuffle", input)?;
    let r = downscale_factor;
    if r == 0 {
        return Err(TensorOpsError::InvalidScaleFactor(r));
    }
    let factor_squared = r
        .checked_mul(r)
        .ok_or(TensorOpsError::InvalidScaleFactor(r))?;

    if h % r != 0 || w % r != 0 {
        return Err(TensorOpsError::SpatialNotDivisible {
            shape: input.shape.to_vec(),
            downscale_factor: r,
            height: h,
            width: w,
        });
    }
    let (oh, ow) = (h / r, w / r);

    // (b, c, oh, r, ow, r) -> (b, c, r, r, oh, ow)
    let output = input
        .reshape([b, c, oh, r, ow, r])?
        .permute_axes([0, 1, 3, 5, 2, 4])?
        .as_contiguous()?
        .into_shape([b, c * factor_squared, oh, ow])?;

    log::debug!(
        "pixel_unshuffle: {:?} -> {:?} (downscale_factor={})",
        input.shape,
        output.shape,
        r
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dovetail_tensor::CpuAllocator;

    fn arange4(shape: [usize; 4]) -> Result<Tensor<i32, 4>, TensorOpsError> {
        let numel = shape.iter().product::<usize>() as i32;
        Ok(Tensor::from_shape_vec(
            shape,
            (0..numel).collect(),
            CpuAllocator,
        )?)
    }

    #[test]
    fn test_pixel_shuffle_values() -> Result<(), TensorOpsError> {
        let x = arange4([1, 4, 2, 2])?;
        let y = pixel_shuffle(&x, 2)?;
        assert_eq!(y.shape, [1, 1, 4, 4]);
        assert_eq!(
            y.as_slice(),
            &[0, 4, 1, 5, 8, 12, 9, 13, 2, 6, 3, 7, 10, 14, 11, 15]
        );
        Ok(())
    }

    #[test]
    fn test_pixel_shuffle_index_law() -> Result<(), TensorOpsError> {
        let r = 3;
        let x = arange4([2, 18, 2, 3])?;
        let y = pixel_shuffle(&x, r)?;
        assert_eq!(y.shape, [2, 2, 6, 9]);
        for n in 0..2 {
            for k in 0..2 {
                for yy in 0..2 {
                    for xx in 0..3 {
                        for i in 0..r {
                            for j in 0..r {
                                assert_eq!(
                                    y.get([n, k, yy * r + i, xx * r + j]),
                                    x.get([n, k * r * r + i * r + j, yy, xx])
                                );
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_pixel_unshuffle_values() -> Result<(), TensorOpsError> {
        let x = Tensor::<i32, 4>::from_shape_vec(
            [1, 1, 4, 4],
            vec![0, 4, 1, 5, 8, 12, 9, 13, 2, 6, 3, 7, 10, 14, 11, 15],
            CpuAllocator,
        )?;
        let y = pixel_unshuffle(&x, 2)?;
        assert_eq!(y.shape, [1, 4, 2, 2]);
        assert_eq!(y.as_slice(), arange4([1, 4, 2, 2])?.as_slice());
        Ok(())
    }

    #[test]
    fn test_pixel_shuffle_unit_factor() -> Result<(), TensorOpsError> {
        let x = arange4([2, 3, 2, 5])?;
        assert_eq!(pixel_shuffle(&x, 1)?.as_slice(), x.as_slice());
        assert_eq!(pixel_unshuffle(&x, 1)?.as_slice(), x.as_slice());
        Ok(())
    }

    #[test]
    fn test_pixel_shuffle_channels_not_divisible() -> Result<(), TensorOpsError> {
        let x = arange4([1, 5, 2, 2])?;
        let err = pixel_shuffle(&x, 2).map(|y| y.shape);
        assert_eq!(
            err,
            Err(TensorOpsError::ChannelsNotDivisible {
                shape: vec![1, 5, 2, 2],
                upscale_factor: 2,
                channels: 5,
                factor_squared: 4,
            })
        );
        let msg = err.unwrap_err().to_string();
        assert!(msg.contains("[1, 5, 2, 2]"));
        assert!(msg.contains("upscale_factor=2"));
        Ok(())
    }

    #[test]
    fn test_pixel_unshuffle_spatial_not_divisible() -> Result<(), TensorOpsError> {
        let x = arange4([1, 1, 3, 4])?;
        assert!(pixel_unshuffle(&x, 2).is_err_and(|e| e
            == TensorOpsError::SpatialNotDivisible {
                shape: vec![1, 1, 3, 4],
                downscale_factor: 2,
                height: 3,
                width: 4,
            }));
        Ok(())
    }

    #[test]
    fn test_pixel_shuffle_wrong_rank() -> Result<(), TensorOpsError> {
        let x = Tensor::<f32, 3>::zeros([4, 2, 2], CpuAllocator)?;
        assert!(pixel_shuffle(&x, 2).is_err_and(|e| e
            == TensorOpsError::DimensionError {
                op: "pixel_shuffle",
                expected: 4,
                shape: vec![4, 2, 2],
            }));

        let x = Tensor::<f32, 5>::zeros([1, 4, 2, 2, 1], CpuAllocator)?;
        assert!(pixel_unshuffle(&x, 2)
            .is_err_and(|e| matches!(e, TensorOpsError::DimensionError { expected: 4, .. })));
        Ok(())
    }

    #[test]
    fn test_pixel_rescale_zero_factor() -> Result<(), TensorOpsError> {
        let x = arange4([1, 4, 2, 2])?;
        assert!(pixel_shuffle(&x, 0).is_err_and(|e| e == TensorOpsError::InvalidScaleFactor(0)));
        assert!(pixel_unshuffle(&x, 0).is_err_and(|e| e == TensorOpsError::InvalidScaleFactor(0)));
        Ok(())
    }

    #[test]
    fn test_pixel_rescale_empty_batch() -> Result<(), TensorOpsError> {
        let x = Tensor::<f32, 4>::zeros([0, 8, 3, 3], CpuAllocator)?;
        let y = pixel_shuffle(&x, 2)?;
        assert_eq!(y.shape, [0, 2, 6, 6]);
        assert_eq!(y.numel(), 0);

        let z = pixel_unshuffle(&y, 2)?;
        assert_eq!(z.shape, [0, 8, 3, 3]);
        Ok(())
    }

    #[test]
    fn test_pixel_unshuffle_then_shuffle_empty_batch() -> Result<(), TensorOpsError> {
        let x = Tensor::<f32, 4>::zeros([0, 2, 4, 6], CpuAllocator)?;
        let y = pixel_unshuffle(&x, 2)?;
        assert_eq!(y.shape, [0, 8, 2, 3]);
        assert_eq!(y.numel(), 0);

        let z = pixel_shuffle(&y, 2)?;
        assert_eq!(z.shape, [0, 2, 4, 6]);
        assert!(z.as_slice().is_empty());
        Ok(())
    }
}
