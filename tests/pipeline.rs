//! End-to-end checks of the helpers as a tiled inference and training loop uses them.

use std::fs;
use std::time::Duration;

use approx::assert_abs_diff_eq;
use image::{Rgb, RgbImage};
use ndarray::{Array4, Axis};
use sr_kit::core::TrainingConfig;
use sr_kit::processors::{
    Normalize, PatchStitcher, QuantizeMode, average_kernel, calc_psnr, gaussian_kernel,
    load_patch_grid, quantize,
};
use sr_kit::utils::{LOG_FILE_NAME, Timer, TrainingLog};

fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    })
}

#[test]
fn tiled_identity_model_reconstructs_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.png");
    gradient_image(75, 50).save(&path).unwrap();

    let grid = load_patch_grid(&path, 24, 16).unwrap();
    let (height, width, channels) = grid.image.dim();
    let mut stitcher = PatchStitcher::new(height, width, channels, 24).unwrap();
    for b in &grid.boxes {
        stitcher.add(b, b.slice(&grid.image).unwrap()).unwrap();
    }
    let restored = stitcher.finish();

    let sr = restored.permuted_axes([2, 0, 1]).insert_axis(Axis(0));
    let hr = grid.image.clone().permuted_axes([2, 0, 1]).insert_axis(Axis(0));
    let quantized = quantize(sr.view(), 1.0, QuantizeMode::Hard).unwrap();
    let psnr = calc_psnr(quantized.view(), hr.view(), 2, 1.0).unwrap();
    // Source pixels are on the 8-bit grid, so quantizing removes stitching noise.
    assert!(psnr.is_infinite());
}

#[test]
fn downsampling_with_average_filter_keeps_mean() {
    let input = Array4::from_shape_fn((1, 3, 16, 16), |(_, c, h, w)| {
        ((c * 31 + h * 7 + w * 3) % 17) as f32 / 17.0
    });
    let filter = average_kernel(4, 4, 3).unwrap();
    let out = filter.forward(input.view()).unwrap();
    assert_eq!(out.dim(), (1, 3, 4, 4));
    for c in 0..3 {
        let a = input.index_axis(Axis(1), c).mean().unwrap();
        let b = out.index_axis(Axis(1), c).mean().unwrap();
        assert_abs_diff_eq!(a, b, epsilon = 1e-5);
    }
}

#[test]
fn blur_then_normalize_stays_in_range() {
    let input = Array4::from_shape_fn((2, 3, 12, 12), |(b, c, h, w)| {
        if (b + c + h + w) % 2 == 0 { 1.0 } else { -1.0 }
    });
    let blurred = gaussian_kernel(5, 1.0, 3)
        .unwrap()
        .forward(input.view())
        .unwrap();
    let unit = Normalize::default().forward(&blurred);
    assert!(unit.iter().all(|&v| (0.0..=1.0).contains(&v)));
}

#[test]
fn training_log_records_epochs_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yml");
    fs::write(
        &config_path,
        format!(
            "experiment_dir: {}\nname: endosr_x4\nscale: 4\n",
            dir.path().display()
        ),
    )
    .unwrap();
    let config = TrainingConfig::from_file(&config_path).unwrap();

    let log = TrainingLog::create(&config.experiment_dir, &config.name).unwrap();
    let mut timer = Timer::new();
    for epoch in 1..=3 {
        timer.tic();
        timer.hold();
        log.write(&format!("[Epoch {epoch}] x{}", config.scale))
            .unwrap();
    }
    assert!(timer.release() < Duration::from_secs(1));

    let contents = fs::read_to_string(config.run_dir().join(LOG_FILE_NAME)).unwrap();
    assert_eq!(contents.lines().count(), 3);
    assert_eq!(contents.lines().last(), Some("[Epoch 3] x4"));
}

#[cfg(feature = "visualization")]
#[test]
fn plots_are_written_next_to_the_log() {
    use sr_kit::utils::{LOSS_GRAPH_NAME, PSNR_GRAPH_NAME, plot_loss_down, plot_psnr};

    let dir = tempfile::tempdir().unwrap();
    let epochs: Vec<f32> = (1..=10).map(|e| 1.0 / e as f32).collect();
    plot_loss_down(dir.path(), &epochs, &epochs, &epochs).unwrap();
    plot_psnr(dir.path(), &[24.0, 25.5, 26.1]).unwrap();
    assert!(dir.path().join(LOSS_GRAPH_NAME).is_file());
    assert!(dir.path().join(PSNR_GRAPH_NAME).is_file());
}
