use dovetail_tensor::{Tensor, TensorAllocator, TensorError};
use num_traits::{Float, One, Zero};

use crate::error::TensorOpsError;

#[inline]
fn constant<T: Float>(value: f64) -> T {
    // every `Float` implementor can represent an f64 literal, possibly rounded
    T::from(value).unwrap_or_else(T::nan)
}

/// Error function, Abramowitz and Stegun formula 7.1.26 (|error| < 1.5e-7).
fn erf<T: Float>(x: T) -> T {
    let a1 = constant::<T>(0.254829592);
    let a2 = constant::<T>(-0.284496736);
    let a3 = constant::<T>(1.421413741);
    let a4 = constant::<T>(-1.453152027);
    let a5 = constant::<T>(1.061405429);
    let p = constant::<T>(0.3275911);

    let sign = if x < T::zero() { -T::one() } else { T::one() };
    let x = x.abs();
    let t = T::one() / (T::one() + p * x);
    let y = T::one() - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();
    sign * y
}

#[inline]
fn sigmoid_scalar<T: Float>(x: T) -> T {
    T::one() / (T::one() + (-x).exp())
}

#[inline]
fn softplus_scalar<T: Float>(x: T) -> T {
    x.max(T::zero()) + (-x.abs()).exp().ln_1p()
}

#[inline]
fn relu6_scalar<T: Float>(x: T) -> T {
    x.max(T::zero()).min(constant(6.0))
}

#[inline]
fn hard_sigmoid_scalar<T: Float>(x: T) -> T {
    relu6_scalar(x + constant(3.0)) / constant(6.0)
}

fn unary<T, const N: usize, A, F>(x: &Tensor<T, N, A>, f: F) -> Result<Tensor<T, N, A>, TensorOpsError>
where
    T: Float,
    A: TensorAllocator,
    F: Fn(T) -> T,
{
    Ok(x.map(|&v| f(v))?)
}

/// Rectified linear unit, `max(x, 0)`.
///
/// # Example
///
/// ```
/// use dovetail_tensor::{Tensor, CpuAllocator};
/// use dovetail_tensor_ops::activation::relu;
///
/// let x = Tensor::<f32, 1>::from_shape_vec([3], vec![-1.0, 0.0, 2.0], CpuAllocator).unwrap();
/// assert_eq!(relu(&x).unwrap().as_slice(), &[0.0, 0.0, 2.0]);
/// ```
pub fn relu<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    unary(x, |v| v.max(T::zero()))
}

/// Rectified linear unit capped at 6, `min(max(x, 0), 6)`.
pub fn relu6<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    unary(x, relu6_scalar)
}

/// Soft-sign, `x / (|x| + 1)`.
pub fn soft_sign<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    unary(x, |v| v / (v.abs() + T::one()))
}

/// Logistic sigmoid, `1 / (1 + exp(-x))`.
pub fn sigmoid<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    unary(x, sigmoid_scalar)
}

/// Sigmoid linear unit, `x * sigmoid(x)`.
pub fn silu<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    unary(x, |v| v * sigmoid_scalar(v))
}

/// Alias of [`silu`].
pub fn swish<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    silu(x)
}

/// Leaky rectified linear unit: `x` where `x >= 0`, `negative_slope * x` elsewhere.
pub fn leaky_relu<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
    negative_slope: T,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    unary(x, |v| if v >= T::zero() { v } else { negative_slope * v })
}

/// Gaussian error linear unit.
///
/// With `approximate` the tanh form
/// `0.5 * x * (1 + tanh(sqrt(2 / pi) * (x + 0.044715 * x^3)))` is used,
/// otherwise the erf form `0.5 * x * (1 + erf(x / sqrt(2)))`.
pub fn gelu<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
    approximate: bool,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    let half = constant::<T>(0.5);
    if approximate {
        let k = constant::<T>((2.0 / std::f64::consts::PI).sqrt());
        let c = constant::<T>(0.044715);
        unary(x, |v| half * v * (T::one() + (k * (v + c * v * v * v)).tanh()))
    } else {
        let inv_sqrt2 = constant::<T>(std::f64::consts::FRAC_1_SQRT_2);
        unary(x, |v| half * v * (T::one() + erf(v * inv_sqrt2)))
    }
}

/// Softplus, `log(1 + exp(x))`, evaluated without overflow for large `x`.
pub fn softplus<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    unary(x, softplus_scalar)
}

/// Log-sigmoid, `-softplus(-x)`.
pub fn log_sigmoid<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    unary(x, |v| -softplus_scalar(-v))
}

/// Clamp to `[-1, 1]`.
pub fn hard_tanh<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    unary(x, |v| v.max(-T::one()).min(T::one()))
}

/// Continuously differentiable exponential linear unit,
/// `max(0, x) + min(0, alpha * (exp(x / alpha) - 1))`.
pub fn celu<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
    alpha: T,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    unary(x, |v| {
        v.max(T::zero()) + (alpha * (v / alpha).exp_m1()).min(T::zero())
    })
}

/// Exponential linear unit: `x` where `x > 0`, `alpha * (exp(x) - 1)` elsewhere.
pub fn elu<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
    alpha: T,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    unary(x, |v| if v > T::zero() { v } else { alpha * v.exp_m1() })
}

/// Hard sigmoid, `relu6(x + 3) / 6`.
pub fn hard_sigmoid<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    unary(x, hard_sigmoid_scalar)
}

/// Hard sigmoid linear unit, `x * hard_sigmoid(x)`.
pub fn hard_silu<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    unary(x, |v| v * hard_sigmoid_scalar(v))
}

/// Alias of [`hard_silu`].
pub fn hard_swish<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    hard_silu(x)
}

/// Sizes of the axes before, along and after `axis` of a standard-layout tensor.
///
/// Element `(o, k, i)` of the lane decomposition lives at `(o * len + k) * inner + i`.
fn lanes<T, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
    axis: usize,
) -> Result<(usize, usize, usize), TensorOpsError> {
    if axis >= N {
        return Err(TensorOpsError::DimOutOfBounds(axis, N));
    }
    if !x.is_standard_layout() {
        return Err(TensorError::NonContiguous.into());
    }
    let outer = x.shape[..axis].iter().product();
    let inner = x.shape[axis + 1..].iter().product();
    Ok((outer, x.shape[axis], inner))
}

/// Maximum of a lane, replaced by zero when not finite.
fn lane_shift<T: Float>(data: &[T], base: usize, len: usize, inner: usize) -> T {
    let max = (0..len)
        .map(|k| data[base + k * inner])
        .fold(T::neg_infinity(), T::max);
    if max.is_finite() {
        max
    } else {
        T::zero()
    }
}

fn keepdims<const N: usize>(shape: [usize; N], axis: usize) -> [usize; N] {
    let mut out = shape;
    out[axis] = 1;
    out
}

/// Softmax along `axis`, `exp(x - max) / sum(exp(x - max))`.
///
/// # Errors
///
/// Returns [`TensorOpsError::DimOutOfBounds`] if `axis` is not an axis of `x`.
///
/// # Example
///
/// ```
/// use dovetail_tensor::{Tensor, CpuAllocator};
/// use dovetail_tensor_ops::activation::softmax;
///
/// let x = Tensor::<f32, 2>::from_shape_vec([2, 2], vec![1.0, 1.0, 0.0, 0.0], CpuAllocator).unwrap();
/// assert_eq!(softmax(&x, 1).unwrap().as_slice(), &[0.5, 0.5, 0.5, 0.5]);
/// ```
pub fn softmax<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
    axis: usize,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    let (outer, len, inner) = lanes(x, axis)?;
    let src = x.as_slice();
    let mut out = vec![T::zero(); src.len()];

    for o in 0..outer {
        for i in 0..inner {
            let base = o * len * inner + i;
            let shift = lane_shift(src, base, len, inner);
            let mut sum = T::zero();
            for k in 0..len {
                let idx = base + k * inner;
                out[idx] = (src[idx] - shift).exp();
                sum = sum + out[idx];
            }
            for k in 0..len {
                let idx = base + k * inner;
                out[idx] = out[idx] / sum;
            }
        }
    }

    Ok(Tensor::from_shape_vec(
        x.shape,
        out,
        x.storage.alloc().clone(),
    )?)
}

/// Log-softmax along `axis`, `x - max - log(sum(exp(x - max)))`.
pub fn log_softmax<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
    axis: usize,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    let (outer, len, inner) = lanes(x, axis)?;
    let src = x.as_slice();
    let mut out = vec![T::zero(); src.len()];

    for o in 0..outer {
        for i in 0..inner {
            let base = o * len * inner + i;
            let shift = lane_shift(src, base, len, inner);
            let log_sum = (0..len)
                .map(|k| (src[base + k * inner] - shift).exp())
                .fold(T::zero(), |acc, e| acc + e)
                .ln();
            for k in 0..len {
                let idx = base + k * inner;
                out[idx] = src[idx] - shift - log_sum;
            }
        }
    }

    Ok(Tensor::from_shape_vec(
        x.shape,
        out,
        x.storage.alloc().clone(),
    )?)
}

/// `log(sum(exp(x)))` along `axis`, keeping the reduced axis with size 1.
pub fn logsumexp<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
    axis: usize,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    let (outer, len, inner) = lanes(x, axis)?;
    let src = x.as_slice();
    let mut out = Vec::with_capacity(outer * inner);

    for o in 0..outer {
        for i in 0..inner {
            let base = o * len * inner + i;
            let shift = lane_shift(src, base, len, inner);
            let sum = (0..len)
                .map(|k| (src[base + k * inner] - shift).exp())
                .fold(T::zero(), |acc, e| acc + e);
            out.push(shift + sum.ln());
        }
    }

    Ok(Tensor::from_shape_vec(
        keepdims(x.shape, axis),
        out,
        x.storage.alloc().clone(),
    )?)
}

/// Gated linear unit along `axis`.
///
/// The axis is split in two halves `a` and `b`; the result is `a * sigmoid(b)`
/// with the axis halved.
///
/// # Errors
///
/// * [`TensorOpsError::DimOutOfBounds`] if `axis` is not an axis of `x`.
/// * [`TensorOpsError::OddSplitAxis`] if the axis has odd length.
pub fn glu<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
    axis: usize,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    let (outer, len, inner) = lanes(x, axis)?;
    if len % 2 != 0 {
        return Err(TensorOpsError::OddSplitAxis { axis, size: len });
    }
    let half = len / 2;
    let src = x.as_slice();
    let mut out = vec![T::zero(); outer * half * inner];

    for o in 0..outer {
        for k in 0..half {
            for i in 0..inner {
                let a = src[(o * len + k) * inner + i];
                let b = src[(o * len + k + half) * inner + i];
                out[(o * half + k) * inner + i] = a * sigmoid_scalar(b);
            }
        }
    }

    let mut shape = x.shape;
    shape[axis] = half;
    Ok(Tensor::from_shape_vec(
        shape,
        out,
        x.storage.alloc().clone(),
    )?)
}

/// Precomputed statistic of [`normalize`], either full-shaped or reduced over the axis.
struct Statistic<'a, T> {
    data: &'a [T],
    reduced: bool,
}

impl<'a, T: Copy> Statistic<'a, T> {
    fn new<const N: usize, A: TensorAllocator>(
        t: &'a Tensor<T, N, A>,
        shape: [usize; N],
        axis: usize,
    ) -> Result<Self, TensorOpsError> {
        let reduced = if t.shape == shape {
            false
        } else if t.shape == keepdims(shape, axis) {
            true
        } else {
            return Err(TensorOpsError::ShapeMismatch(
                t.shape.to_vec(),
                shape.to_vec(),
            ));
        };
        if !t.is_standard_layout() {
            return Err(TensorError::NonContiguous.into());
        }
        Ok(Self {
            data: t.as_slice(),
            reduced,
        })
    }

    fn at(&self, o: usize, k: usize, i: usize, len: usize, inner: usize) -> T {
        if self.reduced {
            self.data[o * inner + i]
        } else {
            self.data[(o * len + k) * inner + i]
        }
    }
}

/// Normalize `x` along `axis`, `(x - mean) / sqrt(variance + epsilon)`.
///
/// Missing statistics are computed along `axis`: the mean as the lane average and
/// the variance as `mean(x^2) - mean^2`. Supplied statistics must have the shape of
/// `x`, or the shape of `x` with `axis` reduced to size 1.
///
/// # Errors
///
/// * [`TensorOpsError::DimOutOfBounds`] if `axis` is not an axis of `x`.
/// * [`TensorOpsError::ShapeMismatch`] if a supplied statistic has another shape.
pub fn normalize<T: Float, const N: usize, A: TensorAllocator>(
    x: &Tensor<T, N, A>,
    axis: usize,
    mean: Option<&Tensor<T, N, A>>,
    variance: Option<&Tensor<T, N, A>>,
    epsilon: T,
) -> Result<Tensor<T, N, A>, TensorOpsError> {
    let (outer, len, inner) = lanes(x, axis)?;
    let mean = mean
        .map(|t| Statistic::new(t, x.shape, axis))
        .transpose()?;
    let variance = variance
        .map(|t| Statistic::new(t, x.shape, axis))
        .transpose()?;

    let src = x.as_slice();
    let count = constant::<T>(len as f64);
    let mut out = vec![T::zero(); src.len()];

    for o in 0..outer {
        for i in 0..inner {
            let base = o * len * inner + i;
            let lane = || (0..len).map(|k| src[base + k * inner]);
            let lane_mean = lane().fold(T::zero(), |acc, v| acc + v) / count;
            let lane_mean_sq = lane().fold(T::zero(), |acc, v| acc + v * v) / count;

            for k in 0..len {
                let m = mean
                    .as_ref()
                    .map_or(lane_mean, |s| s.at(o, k, i, len, inner));
                let var = variance
                    .as_ref()
                    .map_or(lane_mean_sq - m * m, |s| s.at(o, k, i, len, inner));
                let idx = base + k * inner;
                out[idx] = (src[idx] - m) / (var + epsilon).sqrt();
            }
        }
    }

    Ok(Tensor::from_shape_vec(
        x.shape,
        out,
        x.storage.alloc().clone(),
    )?)
}

/// One-hot encode class indices into a `(n, num_classes)` tensor.
///
/// Indices outside `0..num_classes` produce an all-zero row.
///
/// # Example
///
/// ```
/// use dovetail_tensor::{Tensor, CpuAllocator};
/// use dovetail_tensor_ops::activation::one_hot;
///
/// let idx = Tensor::<usize, 1>::from_shape_vec([2], vec![1, 0], CpuAllocator).unwrap();
/// let y = one_hot::<f32, _>(&idx, 2).unwrap();
/// assert_eq!(y.as_slice(), &[0.0, 1.0, 1.0, 0.0]);
/// ```
pub fn one_hot<T, A>(
    indices: &Tensor<usize, 1, A>,
    num_classes: usize,
) -> Result<Tensor<T, 2, A>, TensorOpsError>
where
    T: Clone + Zero + One,
    A: TensorAllocator,
{
    let n = indices.shape[0];
    let mut data = vec![T::zero(); n * num_classes];
    for (row, &class) in indices.as_slice().iter().enumerate() {
        if class < num_classes {
            data[row * num_classes + class] = T::one();
        }
    }
    Ok(Tensor::from_shape_vec(
        [n, num_classes],
        data,
        indices.storage.alloc().clone(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dovetail_tensor::CpuAllocator;

    fn vec1(data: &[f32]) -> Result<Tensor<f32, 1>, TensorError> {
        Tensor::from_shape_slice([data.len()], data, CpuAllocator)
    }

    fn assert_all_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_rectifiers() -> Result<(), TensorOpsError> {
        let x = vec1(&[-2.0, -0.5, 0.0, 3.0, 7.0])?;
        assert_eq!(relu(&x)?.as_slice(), &[0.0, 0.0, 0.0, 3.0, 7.0]);
        assert_eq!(relu6(&x)?.as_slice(), &[0.0, 0.0, 0.0, 3.0, 6.0]);
        assert_eq!(hard_tanh(&x)?.as_slice(), &[-1.0, -0.5, 0.0, 1.0, 1.0]);
        assert_all_close(
            leaky_relu(&x, 0.1)?.as_slice(),
            &[-0.2, -0.05, 0.0, 3.0, 7.0],
        );
        Ok(())
    }

    #[test]
    fn test_sigmoid_family() -> Result<(), TensorOpsError> {
        let x = vec1(&[0.0, 1.0])?;
        assert_all_close(sigmoid(&x)?.as_slice(), &[0.5, 0.7310586]);
        assert_all_close(silu(&x)?.as_slice(), &[0.0, 0.7310586]);
        assert_eq!(swish(&x)?.as_slice(), silu(&x)?.as_slice());
        assert_all_close(soft_sign(&vec1(&[1.0, -3.0])?)?.as_slice(), &[0.5, -0.75]);
        Ok(())
    }

    #[test]
    fn test_softplus_stable() -> Result<(), TensorOpsError> {
        let x = vec1(&[0.0, 100.0, -100.0])?;
        let y = softplus(&x)?;
        assert_relative_eq!(y.as_slice()[0], std::f32::consts::LN_2, epsilon = 1e-6);
        assert_relative_eq!(y.as_slice()[1], 100.0);
        assert!(y.as_slice()[2] >= 0.0 && y.as_slice()[2] < 1e-30);

        let ls = log_sigmoid(&x)?;
        assert_relative_eq!(ls.as_slice()[0], -std::f32::consts::LN_2, epsilon = 1e-6);
        assert_relative_eq!(ls.as_slice()[2], -100.0);
        Ok(())
    }

    #[test]
    fn test_gelu() -> Result<(), TensorOpsError> {
        let x = vec1(&[-1.0, 0.0, 1.0])?;
        assert_all_close(gelu(&x, false)?.as_slice(), &[-0.1586553, 0.0, 0.8413447]);
        assert_all_close(gelu(&x, true)?.as_slice(), &[-0.1588080, 0.0, 0.8411920]);
        Ok(())
    }

    #[test]
    fn test_exponential_units() -> Result<(), TensorOpsError> {
        let x = vec1(&[-1.0, 2.0])?;
        assert_all_close(elu(&x, 1.0)?.as_slice(), &[-0.6321206, 2.0]);
        assert_all_close(celu(&x, 2.0)?.as_slice(), &[-0.7869387, 2.0]);
        Ok(())
    }

    #[test]
    fn test_hard_sigmoid_family() -> Result<(), TensorOpsError> {
        let x = vec1(&[-4.0, 0.0, 1.0, 4.0])?;
        assert_all_close(hard_sigmoid(&x)?.as_slice(), &[0.0, 0.5, 0.6666667, 1.0]);
        assert_all_close(hard_silu(&x)?.as_slice(), &[0.0, 0.0, 0.6666667, 4.0]);
        assert_eq!(hard_swish(&x)?.as_slice(), hard_silu(&x)?.as_slice());
        Ok(())
    }

    #[test]
    fn test_softmax_axes() -> Result<(), TensorOpsError> {
        let x = Tensor::<f32, 2>::from_shape_vec(
            [2, 3],
            vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0],
            CpuAllocator,
        )?;
        let y = softmax(&x, 1)?;
        assert_all_close(
            y.as_slice(),
            &[
                0.09003057, 0.24472847, 0.66524096, 0.09003057, 0.24472847, 0.66524096,
            ],
        );

        let y0 = softmax(&x, 0)?;
        assert_all_close(y0.as_slice(), &[0.5; 6]);

        let ly = log_softmax(&x, 1)?;
        assert_all_close(
            &ly.as_slice()[..3],
            &[-2.4076059, -1.4076059, -0.4076059],
        );
        Ok(())
    }

    #[test]
    fn test_logsumexp_keepdims() -> Result<(), TensorOpsError> {
        let x = Tensor::<f32, 2>::from_shape_vec(
            [2, 3],
            vec![1.0, 2.0, 3.0, f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY],
            CpuAllocator,
        )?;
        let y = logsumexp(&x, 1)?;
        assert_eq!(y.shape, [2, 1]);
        assert_relative_eq!(y.as_slice()[0], 3.4076059, epsilon = 1e-5);
        assert_eq!(y.as_slice()[1], f32::NEG_INFINITY);
        Ok(())
    }

    #[test]
    fn test_glu() -> Result<(), TensorOpsError> {
        let x = vec1(&[1.0, 2.0, 0.0, 0.0])?;
        assert_all_close(glu(&x, 0)?.as_slice(), &[0.5, 1.0]);

        let odd = vec1(&[1.0, 2.0, 3.0])?;
        assert!(glu(&odd, 0).is_err_and(|e| e == TensorOpsError::OddSplitAxis { axis: 0, size: 3 }));
        Ok(())
    }

    #[test]
    fn test_normalize() -> Result<(), TensorOpsError> {
        let x = Tensor::<f32, 2>::from_shape_vec([1, 3], vec![1.0, 2.0, 3.0], CpuAllocator)?;
        let y = normalize(&x, 1, None, None, 0.0)?;
        assert_all_close(y.as_slice(), &[-1.2247449, 0.0, 1.2247449]);

        let mean = Tensor::<f32, 2>::from_shape_vec([1, 1], vec![1.0], CpuAllocator)?;
        let var = Tensor::<f32, 2>::from_shape_vec([1, 1], vec![4.0], CpuAllocator)?;
        let y = normalize(&x, 1, Some(&mean), Some(&var), 0.0)?;
        assert_all_close(y.as_slice(), &[0.0, 0.5, 1.0]);

        let wrong = Tensor::<f32, 2>::zeros([2, 3], CpuAllocator)?;
        assert!(normalize(&x, 1, Some(&wrong), None, 1e-5)
            .is_err_and(|e| e == TensorOpsError::ShapeMismatch(vec![2, 3], vec![1, 3])));
        Ok(())
    }

    #[test]
    fn test_axis_out_of_bounds() -> Result<(), TensorOpsError> {
        let x = vec1(&[1.0, 2.0])?;
        assert!(softmax(&x, 1).is_err_and(|e| e == TensorOpsError::DimOutOfBounds(1, 1)));
        assert!(logsumexp(&x, 3).is_err_and(|e| e == TensorOpsError::DimOutOfBounds(3, 1)));
        Ok(())
    }

    #[test]
    fn test_one_hot() -> Result<(), TensorOpsError> {
        let idx = Tensor::<usize, 1>::from_shape_vec([3], vec![0, 2, 5], CpuAllocator)?;
        let y = one_hot::<u8, _>(&idx, 3)?;
        assert_eq!(y.shape, [3, 3]);
        assert_eq!(y.as_slice(), &[1, 0, 0, 0, 0, 1, 0, 0, 0]);
        Ok(())
    }
}
