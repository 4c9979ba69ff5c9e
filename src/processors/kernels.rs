//! Fixed depthwise convolution filters.
//!
//! Both builders return a [`DepthwiseConv2d`] whose weight holds one identical
//! `kernel_size x kernel_size` kernel per channel (`groups == channels`, no bias).
//! The weights are constants: they are never updated and report
//! `requires_grad() == false`.

use ndarray::{Array2, Array4, ArrayView2, ArrayView4, Axis, s};
use rayon::prelude::*;
use tracing::debug;

use crate::core::config::ParallelPolicy;
use crate::core::errors::SrError;

/// Default edge of the Gaussian blur kernel.
pub const DEFAULT_GAUSSIAN_KERNEL_SIZE: usize = 5;
/// Default standard deviation of the Gaussian blur kernel.
pub const DEFAULT_GAUSSIAN_SIGMA: f32 = 1.0;
/// Default edge of the averaging kernel.
pub const DEFAULT_AVERAGE_KERNEL_SIZE: usize = 16;
/// Default number of channels the filters are replicated over.
pub const DEFAULT_CHANNELS: usize = 3;

/// A depthwise 2D convolution with constant weights.
///
/// Convolution is unpadded ("valid"): an `H x W` plane produces
/// `(H - k) / stride + 1` by `(W - k) / stride + 1` outputs.
#[derive(Debug, Clone)]
pub struct DepthwiseConv2d {
    weight: Array4<f32>,
    stride: usize,
    policy: ParallelPolicy,
}

impl DepthwiseConv2d {
    /// Replicates `kernel` over `channels` channels.
    pub fn from_kernel(
        kernel: ArrayView2<f32>,
        channels: usize,
        stride: usize,
    ) -> Result<Self, SrError> {
        let (kh, kw) = kernel.dim();
        if kh == 0 || kh != kw {
            return Err(SrError::config_error_detailed(
                "depthwise kernel",
                format!("kernel must be square and non-empty, got {kh}x{kw}"),
            ));
        }
        if channels == 0 {
            return Err(SrError::config_error_detailed(
                "depthwise kernel",
                "channels must be greater than 0",
            ));
        }
        if stride == 0 {
            return Err(SrError::config_error_detailed(
                "depthwise kernel",
                "stride must be greater than 0",
            ));
        }
        let weight = kernel
            .insert_axis(Axis(0))
            .insert_axis(Axis(0))
            .broadcast((channels, 1, kh, kw))
            .map(|view| view.to_owned())
            .ok_or_else(|| {
                SrError::tensor_shape_mismatch(
                    "broadcast kernel",
                    &[channels, 1, kh, kw],
                    &[1, 1, kh, kw],
                )
            })?;
        Ok(Self {
            weight,
            stride,
            policy: ParallelPolicy::default(),
        })
    }

    /// Replaces the parallelism policy used by [`DepthwiseConv2d::forward`].
    pub fn with_policy(mut self, policy: ParallelPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Weight tensor of shape `(channels, 1, k, k)`.
    pub fn weight(&self) -> &Array4<f32> {
        &self.weight
    }

    /// Number of input (and output) channels.
    pub fn channels(&self) -> usize {
        self.weight.dim().0
    }

    /// Number of convolution groups; always equal to the channel count.
    pub fn groups(&self) -> usize {
        self.channels()
    }

    /// Kernel edge length.
    pub fn kernel_size(&self) -> usize {
        self.weight.dim().2
    }

    /// Step between neighbouring outputs.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Fixed filters never take part in gradient updates.
    pub fn requires_grad(&self) -> bool {
        false
    }

    /// Filters an NCHW batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel count differs from the filter's or if a
    /// plane is smaller than the kernel.
    pub fn forward(&self, input: ArrayView4<f32>) -> Result<Array4<f32>, SrError> {
        let (batch, channels, height, width) = input.dim();
        let k = self.kernel_size();
        if channels != self.channels() {
            return Err(SrError::tensor_shape_mismatch(
                "depthwise conv2d",
                &[batch, self.channels(), height, width],
                input.shape(),
            ));
        }
        if height < k || width < k {
            return Err(SrError::invalid_input(format!(
                "input plane {height}x{width} is smaller than the {k}x{k} kernel"
            )));
        }

        let out_h = (height - k) / self.stride + 1;
        let out_w = (width - k) / self.stride + 1;

        let planes: Vec<(usize, usize)> = (0..batch)
            .flat_map(|b| (0..channels).map(move |c| (b, c)))
            .collect();
        let convolve = |&(b, c): &(usize, usize)| {
            convolve_plane(
                input.slice(s![b, c, .., ..]),
                self.weight.slice(s![c, 0, .., ..]),
                self.stride,
                (out_h, out_w),
            )
        };
        let results: Vec<Array2<f32>> = if self.policy.use_parallel(planes.len()) {
            planes.par_iter().map(convolve).collect()
        } else {
            planes.iter().map(convolve).collect()
        };

        let mut output = Array4::<f32>::zeros((batch, channels, out_h, out_w));
        for (&(b, c), plane) in planes.iter().zip(results) {
            output.slice_mut(s![b, c, .., ..]).assign(&plane);
        }
        Ok(output)
    }
}

fn convolve_plane(
    plane: ArrayView2<f32>,
    kernel: ArrayView2<f32>,
    stride: usize,
    (out_h, out_w): (usize, usize),
) -> Array2<f32> {
    let (kh, kw) = kernel.dim();
    Array2::from_shape_fn((out_h, out_w), |(i, j)| {
        let window = plane.slice(s![i * stride..i * stride + kh, j * stride..j * stride + kw]);
        window
            .iter()
            .zip(kernel.iter())
            .map(|(x, w)| x * w)
            .sum()
    })
}

/// Builds a fixed Gaussian blur filter.
///
/// The kernel value at `(x, y)` is proportional to
/// `exp(-((x - m)^2 + (y - m)^2) / (2 sigma^2))` with `m = (kernel_size - 1) / 2`,
/// normalised to sum to one.
pub fn gaussian_kernel(
    kernel_size: usize,
    sigma: f32,
    channels: usize,
) -> Result<DepthwiseConv2d, SrError> {
    if kernel_size == 0 {
        return Err(SrError::config_error_detailed(
            "gaussian kernel",
            "kernel size must be greater than 0",
        ));
    }
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(SrError::config_error_detailed(
            "gaussian kernel",
            format!("sigma must be a positive finite number, got {sigma}"),
        ));
    }

    let mean = (kernel_size as f32 - 1.0) / 2.0;
    let variance = sigma * sigma;
    let mut kernel = Array2::from_shape_fn((kernel_size, kernel_size), |(y, x)| {
        let dx = x as f32 - mean;
        let dy = y as f32 - mean;
        (-(dx * dx + dy * dy) / (2.0 * variance)).exp()
    });
    let total = kernel.sum();
    kernel.mapv_inplace(|v| v / total);

    debug!(kernel_size, sigma, channels, "built gaussian blur filter");
    DepthwiseConv2d::from_kernel(kernel.view(), channels, 1)
}

/// Builds a fixed averaging filter; every weight equals `1 / kernel_size^2`.
pub fn average_kernel(
    kernel_size: usize,
    stride: usize,
    channels: usize,
) -> Result<DepthwiseConv2d, SrError> {
    if kernel_size == 0 {
        return Err(SrError::config_error_detailed(
            "average kernel",
            "kernel size must be greater than 0",
        ));
    }
    let kernel = Array2::from_elem(
        (kernel_size, kernel_size),
        1.0 / (kernel_size * kernel_size) as f32,
    );

    debug!(kernel_size, stride, channels, "built average filter");
    DepthwiseConv2d::from_kernel(kernel.view(), channels, stride)
}
