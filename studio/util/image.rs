//! Uploaded-image → network-input pipeline.
//!
//! The engine only accepts 784-length vectors in [0, 1] that look like the
//! training distribution: light strokes on a dark background, glyph roughly
//! centered. This module bridges arbitrary uploaded images (photos, canvas
//! exports, screenshots) to that contract.

use graphite_nn::INPUT_SIZE;

const SIZE: usize = 28;

/// Threshold above which a pixel counts as part of the glyph when computing
/// its bounding box.
const INK_THRESHOLD: f64 = 0.1;

/// Decodes image bytes (PNG/JPEG/BMP/GIF), resizes to 28×28 grayscale,
/// normalizes to [0, 1], flips dark-on-light images, and centers the glyph.
pub fn digit_image_to_input(bytes: &[u8]) -> Result<Vec<f64>, String> {
    let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let resized = img.resize_exact(SIZE as u32, SIZE as u32, image::imageops::FilterType::Lanczos3);
    let gray = resized.to_luma8();
    let mut pixels: Vec<f64> = gray.pixels().map(|p| p.0[0] as f64 / 255.0).collect();

    // Drawings and photos are usually dark ink on a light background; the
    // training data is the opposite. Flip when the image is mostly bright.
    let mean = pixels.iter().sum::<f64>() / INPUT_SIZE as f64;
    if mean > 0.5 {
        for p in pixels.iter_mut() {
            *p = 1.0 - *p;
        }
    }

    // Stretch so the brightest stroke hits 1.0.
    let max = pixels.iter().cloned().fold(0.0, f64::max);
    if max > 0.0 {
        for p in pixels.iter_mut() {
            *p /= max;
        }
    }

    Ok(center_glyph(&pixels))
}

/// Bounding box of above-threshold pixels as (top, bottom, left, right),
/// or `None` for a blank image.
fn bounding_box(pixels: &[f64]) -> Option<(usize, usize, usize, usize)> {
    let mut top = SIZE;
    let mut bottom = 0;
    let mut left = SIZE;
    let mut right = 0;
    let mut found = false;

    for y in 0..SIZE {
        for x in 0..SIZE {
            if pixels[y * SIZE + x] > INK_THRESHOLD {
                top = top.min(y);
                bottom = bottom.max(y);
                left = left.min(x);
                right = right.max(x);
                found = true;
            }
        }
    }
    if found { Some((top, bottom, left, right)) } else { None }
}

/// Translates the glyph so its bounding box is centered in the frame.
fn center_glyph(pixels: &[f64]) -> Vec<f64> {
    let (top, bottom, left, right) = match bounding_box(pixels) {
        Some(bb) => bb,
        None => return pixels.to_vec(),
    };

    let height = bottom - top + 1;
    let width = right - left + 1;
    let target_top = (SIZE - height) / 2;
    let target_left = (SIZE - width) / 2;

    let mut centered = vec![0.0; INPUT_SIZE];
    for y in 0..height {
        for x in 0..width {
            centered[(target_top + y) * SIZE + (target_left + x)] =
                pixels[(top + y) * SIZE + (left + x)];
        }
    }
    centered
}
