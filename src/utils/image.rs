//! Image loading and conversion helpers.

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};
use ndarray::Array3;

use crate::core::errors::SrError;

/// Loads an image from disk.
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage, SrError> {
    let img = image::open(path.as_ref())?;
    Ok(img)
}

/// Converts an image into an HWC `f32` array with values in `[0, 1]`.
///
/// Single-channel sources (with or without alpha) produce one channel, every
/// other colour type is converted to RGB.
pub fn to_normalized_array(img: &DynamicImage) -> Array3<f32> {
    if img.color().has_color() {
        rgb_to_array(&img.to_rgb8())
    } else {
        gray_to_array(&img.to_luma8())
    }
}

/// Loads an image and converts it with [`to_normalized_array`].
pub fn load_normalized(path: impl AsRef<Path>) -> Result<Array3<f32>, SrError> {
    let img = load_image(path)?;
    Ok(to_normalized_array(&img))
}

fn rgb_to_array(img: &RgbImage) -> Array3<f32> {
    let (width, height) = img.dimensions();
    Array3::from_shape_fn((height as usize, width as usize, 3), |(y, x, c)| {
        img.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    })
}

fn gray_to_array(img: &GrayImage) -> Array3<f32> {
    let (width, height) = img.dimensions();
    Array3::from_shape_fn((height as usize, width as usize, 1), |(y, x, _)| {
        img.get_pixel(x as u32, y as u32)[0] as f32 / 255.0
    })
}

/// Converts an HWC array in `[0, rgb_range]` back to an 8-bit image.
///
/// One-channel arrays become grayscale images, three-channel arrays RGB images.
pub fn array_to_image(array: &Array3<f32>, rgb_range: f32) -> Result<DynamicImage, SrError> {
    let (height, width, channels) = array.dim();
    let to_u8 = |v: f32| (v * 255.0 / rgb_range).clamp(0.0, 255.0).round() as u8;
    match channels {
        1 => Ok(DynamicImage::ImageLuma8(GrayImage::from_fn(
            width as u32,
            height as u32,
            |x, y| image::Luma([to_u8(array[[y as usize, x as usize, 0]])]),
        ))),
        3 => Ok(DynamicImage::ImageRgb8(RgbImage::from_fn(
            width as u32,
            height as u32,
            |x, y| {
                let (y, x) = (y as usize, x as usize);
                image::Rgb([
                    to_u8(array[[y, x, 0]]),
                    to_u8(array[[y, x, 1]]),
                    to_u8(array[[y, x, 2]]),
                ])
            },
        ))),
        other => Err(SrError::invalid_input(format!(
            "expected 1 or 3 channels, got {other}"
        ))),
    }
}
