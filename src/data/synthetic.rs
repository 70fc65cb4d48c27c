//! Procedural 28×28 digit images for demos and tests.
//!
//! Each digit is drawn as a set of seven-segment-style strokes with
//! per-sample jitter (position, lean, stroke thickness), which keeps the
//! classes clearly distinguishable while still varying between samples.

use rand::Rng;

use crate::network::params::INPUT_SIZE;

const SIZE: usize = 28;

// Segment grid: left/right columns and top/middle/bottom rows.
const LEFT: f64 = 8.0;
const RIGHT: f64 = 19.0;
const TOP: f64 = 5.0;
const MID: f64 = 14.0;
const BOTTOM: f64 = 23.0;

/// Segment endpoints, seven-segment layout:
/// A top, B top-right, C bottom-right, D bottom, E bottom-left,
/// F top-left, G middle.
const SEGMENTS: [((f64, f64), (f64, f64)); 7] = [
    ((LEFT, TOP), (RIGHT, TOP)),       // A
    ((RIGHT, TOP), (RIGHT, MID)),      // B
    ((RIGHT, MID), (RIGHT, BOTTOM)),   // C
    ((LEFT, BOTTOM), (RIGHT, BOTTOM)), // D
    ((LEFT, MID), (LEFT, BOTTOM)),     // E
    ((LEFT, TOP), (LEFT, MID)),        // F
    ((LEFT, MID), (RIGHT, MID)),       // G
];

/// Which segments each digit lights up.
const DIGIT_SEGMENTS: [&[usize]; 10] = [
    &[0, 1, 2, 3, 4, 5],    // 0
    &[1, 2],                // 1
    &[0, 1, 6, 4, 3],       // 2
    &[0, 1, 6, 2, 3],       // 3
    &[5, 6, 1, 2],          // 4
    &[0, 5, 6, 2, 3],       // 5
    &[0, 5, 4, 3, 2, 6],    // 6
    &[0, 1, 2],             // 7
    &[0, 1, 2, 3, 4, 5, 6], // 8
    &[0, 1, 5, 6, 2, 3],    // 9
];

/// Stamps a soft disc of the given radius, keeping the maximum intensity
/// where strokes overlap.
fn draw_point(image: &mut [f64], x: f64, y: f64, thickness: f64) {
    let reach = thickness.ceil() as i32;
    let cx = x.round() as i32;
    let cy = y.round() as i32;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let dist = ((dx * dx + dy * dy) as f64).sqrt();
            if dist > thickness {
                continue;
            }
            let px = cx + dx;
            let py = cy + dy;
            if px < 0 || py < 0 || px >= SIZE as i32 || py >= SIZE as i32 {
                continue;
            }
            let idx = py as usize * SIZE + px as usize;
            let intensity = (-dist / thickness).exp();
            image[idx] = image[idx].max(intensity);
        }
    }
}

fn draw_line(image: &mut [f64], x1: f64, y1: f64, x2: f64, y2: f64, thickness: f64) {
    let length = ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
    let steps = (length * 3.0).ceil().max(1.0) as usize;
    for step in 0..=steps {
        let t = step as f64 / steps as f64;
        draw_point(image, x1 + (x2 - x1) * t, y1 + (y2 - y1) * t, thickness);
    }
}

/// Generates one jittered image of `digit`. Pixel values lie in [0, 1].
pub fn synthetic_digit<R: Rng>(digit: usize, rng: &mut R) -> Vec<f64> {
    assert!(digit <= 9, "digit must be 0-9, got {}", digit);

    let mut image = vec![0.0; INPUT_SIZE];
    let offset_x = rng.gen_range(-2.0..2.0);
    let offset_y = rng.gen_range(-1.5..1.5);
    let lean = rng.gen_range(-0.15..0.15);
    let thickness = rng.gen_range(1.2..2.2);

    for &seg in DIGIT_SEGMENTS[digit] {
        let ((x1, y1), (x2, y2)) = SEGMENTS[seg];
        // Endpoint jitter plus a shared slant around the vertical center.
        let jitter = |rng: &mut R| rng.gen_range(-0.8..0.8);
        let sx1 = x1 + offset_x + (y1 - MID) * lean + jitter(rng);
        let sy1 = y1 + offset_y + jitter(rng);
        let sx2 = x2 + offset_x + (y2 - MID) * lean + jitter(rng);
        let sy2 = y2 + offset_y + jitter(rng);
        draw_line(&mut image, sx1, sy1, sx2, sy2, thickness);
    }
    image
}

/// Generates `per_class` samples of every digit, index-aligned with their
/// labels, ordered by class.
pub fn synthetic_dataset<R: Rng>(per_class: usize, rng: &mut R) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut images = Vec::with_capacity(per_class * 10);
    let mut labels = Vec::with_capacity(per_class * 10);
    for digit in 0..10 {
        for _ in 0..per_class {
            images.push(synthetic_digit(digit, rng));
            labels.push(digit);
        }
    }
    (images, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn digits_have_valid_pixel_ranges() {
        let mut rng = StdRng::seed_from_u64(13);
        for digit in 0..10 {
            let image = synthetic_digit(digit, &mut rng);
            assert_eq!(image.len(), INPUT_SIZE);
            assert!(image.iter().all(|&p| (0.0..=1.0).contains(&p)));
            assert!(image.iter().any(|&p| p > 0.5), "digit {} came out blank", digit);
        }
    }

    #[test]
    fn one_and_eight_have_clearly_different_ink_coverage() {
        let mut rng = StdRng::seed_from_u64(13);
        let one: f64 = synthetic_digit(1, &mut rng).iter().sum();
        let eight: f64 = synthetic_digit(8, &mut rng).iter().sum();
        assert!(eight > one * 2.0);
    }

    #[test]
    fn dataset_is_index_aligned_and_ordered_by_class() {
        let mut rng = StdRng::seed_from_u64(13);
        let (images, labels) = synthetic_dataset(4, &mut rng);
        assert_eq!(images.len(), 40);
        assert_eq!(labels.len(), 40);
        assert_eq!(labels[0], 0);
        assert_eq!(labels[39], 9);
        assert_eq!(labels.iter().filter(|&&l| l == 3).count(), 4);
    }
}
