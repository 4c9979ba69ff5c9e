//! Training curve plots.
//!
//! Curves are drawn with plotters into an in-memory SVG document, which is then
//! converted to a vector PDF. Each call draws one figure, writes it and drops the
//! drawing area.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use plotters::prelude::*;
use svg2pdf::usvg;
use tracing::debug;

use crate::core::errors::SrError;
use crate::core::validation::validate_same_length;

/// File name of the discriminator/generator loss plot.
pub const LOSS_GRAPH_NAME: &str = "down_loss_graph.pdf";
/// File name of the PSNR plot.
pub const PSNR_GRAPH_NAME: &str = "sr_psnr_graph.pdf";

const FIGURE_SIZE: (u32, u32) = (640, 480);

/// Plots the three downsampler losses against the epoch index.
///
/// Series are drawn in blue, orange and green in that order. Returns the path of
/// the written file.
pub fn plot_loss_down(
    save_dir: impl AsRef<Path>,
    loss_d: &[f32],
    loss_g: &[f32],
    loss_dl: &[f32],
) -> Result<PathBuf, SrError> {
    validate_same_length(loss_d, loss_g, "loss_d", "loss_g")?;
    validate_same_length(loss_d, loss_dl, "loss_d", "loss_dl")?;

    let path = save_dir.as_ref().join(LOSS_GRAPH_NAME);
    render_series(
        &path,
        "loss_d(blue), loss_g(orange), loss_dl(green)",
        &[
            (loss_d, RGBColor(31, 119, 180)),
            (loss_g, RGBColor(255, 127, 14)),
            (loss_dl, RGBColor(44, 160, 44)),
        ],
    )?;
    Ok(path)
}

/// Plots the validation PSNR against the epoch index.
pub fn plot_psnr(save_dir: impl AsRef<Path>, psnrs: &[f32]) -> Result<PathBuf, SrError> {
    let path = save_dir.as_ref().join(PSNR_GRAPH_NAME);
    render_series(&path, "PSNR", &[(psnrs, RGBColor(31, 119, 180))])?;
    Ok(path)
}

fn render_series(path: &Path, y_desc: &str, series: &[(&[f32], RGBColor)]) -> Result<(), SrError> {
    let epochs = series.first().map(|(values, _)| values.len()).unwrap_or(0);
    let (y_min, y_max) = value_range(series.iter().flat_map(|(values, _)| values.iter().copied()));
    let x_max = epochs.max(2) as f32;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, FIGURE_SIZE).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| SrError::plotting_error("fill background", e))?;

        {
            let mut chart = ChartBuilder::on(&root)
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(1f32..x_max, y_min..y_max)
                .map_err(|e| SrError::plotting_error("build chart", e))?;

            chart
                .configure_mesh()
                .x_desc("epoch")
                .y_desc(y_desc)
                .draw()
                .map_err(|e| SrError::plotting_error("draw mesh", e))?;

            for (values, color) in series {
                chart
                    .draw_series(LineSeries::new(
                        values.iter().enumerate().map(|(i, &v)| ((i + 1) as f32, v)),
                        color,
                    ))
                    .map_err(|e| SrError::plotting_error("draw series", e))?;
            }
        }

        root.present()
            .map_err(|e| SrError::plotting_error("render figure", e))?;
    }

    fs::write(path, svg_to_pdf(&svg)?)?;
    debug!(path = %path.display(), epochs, "saved plot");
    Ok(())
}

/// Converts a rendered SVG document into a single-page PDF.
fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, SrError> {
    let mut options = usvg::Options::default();
    Arc::make_mut(&mut options.fontdb).load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| SrError::plotting_error("parse rendered svg", e))?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|e| {
        SrError::plotting_error("convert figure to pdf", std::io::Error::other(format!("{e:?}")))
    })
}

/// Finite value range of the data, padded so flat series still get an axis.
fn value_range(values: impl Iterator<Item = f32>) -> (f32, f32) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(1e-3);
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_loss_down_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = plot_loss_down(
            dir.path(),
            &[0.9, 0.7, 0.6],
            &[1.2, 1.0, 0.8],
            &[0.3, 0.25, 0.2],
        )
        .unwrap();
        assert_eq!(path, dir.path().join("down_loss_graph.pdf"));
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_plot_loss_down_rejects_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let result = plot_loss_down(dir.path(), &[0.9, 0.7], &[1.2], &[0.3, 0.2]);
        assert!(matches!(result, Err(SrError::InvalidInput { .. })));
        assert!(!dir.path().join(LOSS_GRAPH_NAME).exists());
    }

    #[test]
    fn test_plot_psnr_single_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let path = plot_psnr(dir.path(), &[28.4]).unwrap();
        assert!(path.ends_with("sr_psnr_graph.pdf"));
        assert!(fs::read(&path).unwrap().starts_with(b"%PDF-"));
    }

    #[test]
    fn test_value_range_pads_flat_series() {
        let (lo, hi) = value_range([2.0f32, 2.0].into_iter());
        assert!(lo < 2.0 && hi > 2.0);
        assert_eq!(value_range(std::iter::empty()), (0.0, 1.0));
    }
}
