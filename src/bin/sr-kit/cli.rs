//! Command handlers.

use std::path::Path;

use ndarray::{Array3, Array4, Axis};
use sr_kit::core::{ParallelPolicy, SrError, TrainingConfig, dump_yaml};
use sr_kit::processors::{
    PsnrConfig, calc_psnr_with, gaussian_importance_map, gaussian_kernel, load_patch_grid,
};
use sr_kit::utils::{Timer, array_to_image, load_normalized};
use tracing::info;

fn to_nchw(image: Array3<f32>) -> Array4<f32> {
    image.permuted_axes([2, 0, 1]).insert_axis(Axis(0))
}

fn to_hwc(batch: &Array4<f32>) -> Array3<f32> {
    batch
        .index_axis(Axis(0), 0)
        .permuted_axes([1, 2, 0])
        .to_owned()
}

/// Load the run configuration, or the defaults when no file is given
fn run_config(path: Option<&Path>) -> Result<TrainingConfig, SrError> {
    match path {
        Some(path) => TrainingConfig::from_file(path),
        None => Ok(TrainingConfig::default()),
    }
}

/// Filter parallelism from the configuration, with the thread count overridden
/// from the command line
fn parallel_policy(config: &TrainingConfig, threads: Option<usize>) -> ParallelPolicy {
    match threads {
        Some(threads) => config.parallel.clone().with_max_threads(Some(threads)),
        None => config.parallel.clone(),
    }
}

/// Print a YAML configuration file
pub fn show_config(path: &Path) -> Result<(), SrError> {
    dump_yaml(path)?;
    Ok(())
}

/// Print the patch grid of an image
pub fn show_patches(
    path: &Path,
    config: Option<&Path>,
    patch_size: Option<usize>,
    stride: Option<usize>,
) -> Result<(), SrError> {
    let config = run_config(config)?;
    let patch_size = patch_size.unwrap_or(config.patch_size);
    let stride = stride.unwrap_or(config.stride);
    let grid = load_patch_grid(path, patch_size, stride)?;
    let (height, width, channels) = grid.image.dim();
    info!(
        "{}: {}x{}x{}, {} patches",
        grid.name,
        height,
        width,
        channels,
        grid.boxes.len()
    );
    for (i, b) in grid.boxes.iter().enumerate() {
        println!(
            "{i:>4}: x {:>5}..{:<5} y {:>5}..{:<5}",
            b.x_left, b.x_right, b.y_up, b.y_down
        );
    }
    Ok(())
}

/// Print statistics of a Gaussian importance map
pub fn show_gaussian(size: &[usize], sigma_scale: f64) -> Result<(), SrError> {
    let map = gaussian_importance_map(size, sigma_scale)?;
    let min = map.iter().copied().fold(f32::INFINITY, f32::min);
    let max = map.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mean = map.mean().unwrap_or(0.0);
    println!("shape {size:?}: min {min:.6e}, max {max:.6}, mean {mean:.6}");
    Ok(())
}

/// Compute and print the PSNR between two images
pub fn show_psnr(sr: &Path, hr: &Path, scale: usize, luminance: bool) -> Result<(), SrError> {
    let sr = to_nchw(load_normalized(sr)?);
    let hr = to_nchw(load_normalized(hr)?);
    let config = PsnrConfig {
        luminance,
        ..PsnrConfig::default()
    };
    let psnr = calc_psnr_with(sr.view(), hr.view(), scale, config)?;
    println!("PSNR: {psnr:.4} dB");
    Ok(())
}

/// Blur an image with the fixed Gaussian filter and save it
pub fn blur_image(
    input: &Path,
    output: &Path,
    kernel_size: usize,
    sigma: f32,
    config: Option<&Path>,
    threads: Option<usize>,
) -> Result<(), SrError> {
    let config = run_config(config)?;
    let policy = parallel_policy(&config, threads);
    let installed = policy
        .install_global_thread_pool()
        .map_err(|e| SrError::config_error_detailed("parallel.max_threads", e.to_string()))?;
    if installed {
        info!("Using {:?} filter threads", policy.max_threads);
    }

    let mut timer = Timer::new();
    let image = load_normalized(input)?;
    let channels = image.dim().2;
    let filter = gaussian_kernel(kernel_size, sigma, channels)?.with_policy(policy);

    timer.tic();
    let blurred = filter.forward(to_nchw(image).view())?;
    timer.hold();

    array_to_image(&to_hwc(&blurred), 1.0)?.save(output)?;
    info!(
        "Blurred {} -> {} in {:.2}ms",
        input.display(),
        output.display(),
        timer.release().as_secs_f64() * 1000.0
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_run_config_defaults_without_file() {
        let config = run_config(None).unwrap();
        assert_eq!(config, TrainingConfig::default());
    }

    #[test]
    fn test_run_config_reads_parallel_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "patch_size: 32\nstride: 16\nparallel:\n  max_threads: 2\n  plane_threshold: 0"
        )
        .unwrap();

        let config = run_config(Some(file.path())).unwrap();
        assert_eq!(config.patch_size, 32);
        assert_eq!(config.stride, 16);

        let policy = parallel_policy(&config, None);
        assert_eq!(policy.max_threads, Some(2));
        assert!(policy.use_parallel(1));
    }

    #[test]
    fn test_thread_flag_overrides_config() {
        let config = TrainingConfig::default();
        let policy = parallel_policy(&config, Some(3));
        assert_eq!(policy.max_threads, Some(3));
        assert_eq!(policy.plane_threshold, config.parallel.plane_threshold);
    }

    #[test]
    fn test_invalid_config_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "patch_size: 0").unwrap();
        assert!(matches!(
            run_config(Some(file.path())),
            Err(SrError::ConfigError { .. })
        ));
    }
}
