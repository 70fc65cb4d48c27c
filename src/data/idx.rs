/// MNIST IDX parsing.
///
/// # IDX3 image file layout
/// ```text
/// bytes  0-1:   0x00 0x00   (reserved, must be zero)
/// byte   2:     0x08        (dtype = uint8)
/// byte   3:     0x03        (number of dimensions = 3)
/// bytes  4-7:   N           (number of images, big-endian u32)
/// bytes  8-11:  rows        (image height, big-endian u32)
/// bytes 12-15:  cols        (image width, big-endian u32)
/// bytes 16..:   N * rows * cols bytes, row-major, uint8
/// ```
///
/// # IDX1 label file layout
/// ```text
/// bytes  0-1:   0x00 0x00   (reserved, must be zero)
/// byte   2:     0x08        (dtype = uint8)
/// byte   3:     0x01        (number of dimensions = 1)
/// bytes  4-7:   N           (number of labels, big-endian u32)
/// bytes  8..:   N bytes, each a digit in [0, 9]
/// ```
///
/// Images must be 28×28; pixels are scaled from [0, 255] to [0.0, 1.0].
/// Labels come back as plain digit indices.

use crate::network::params::INPUT_SIZE;

const IMAGE_HEADER_LEN: usize = 16;
const LABEL_HEADER_LEN: usize = 8;

fn read_be_u32(bytes: &[u8], offset: usize) -> usize {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]) as usize
}

/// Parses an IDX3 image file into 784-length [0, 1] vectors.
pub fn parse_idx_images(bytes: &[u8]) -> Result<Vec<Vec<f64>>, String> {
    if bytes.len() < IMAGE_HEADER_LEN {
        return Err(format!(
            "IDX image file too short: expected at least {} header bytes, got {}",
            IMAGE_HEADER_LEN,
            bytes.len()
        ));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 || bytes[2] != 0x08 || bytes[3] != 0x03 {
        return Err(format!(
            "not an IDX3 image file: header starts {:02X} {:02X} {:02X} {:02X}, \
             expected 00 00 08 03",
            bytes[0], bytes[1], bytes[2], bytes[3]
        ));
    }

    let n_images = read_be_u32(bytes, 4);
    let rows = read_be_u32(bytes, 8);
    let cols = read_be_u32(bytes, 12);
    if rows * cols != INPUT_SIZE {
        return Err(format!(
            "expected 28x28 images, file declares {}x{}",
            rows, cols
        ));
    }

    let required = IMAGE_HEADER_LEN + n_images * INPUT_SIZE;
    if bytes.len() < required {
        return Err(format!(
            "IDX image file truncated: header declares {} images ({} bytes), file has {}",
            n_images,
            required,
            bytes.len()
        ));
    }

    Ok(bytes[IMAGE_HEADER_LEN..required]
        .chunks_exact(INPUT_SIZE)
        .map(|chunk| chunk.iter().map(|&px| px as f64 / 255.0).collect())
        .collect())
}

/// Parses an IDX1 label file into digit indices, rejecting anything outside
/// [0, 9].
pub fn parse_idx_labels(bytes: &[u8]) -> Result<Vec<usize>, String> {
    if bytes.len() < LABEL_HEADER_LEN {
        return Err(format!(
            "IDX label file too short: expected at least {} header bytes, got {}",
            LABEL_HEADER_LEN,
            bytes.len()
        ));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 || bytes[2] != 0x08 || bytes[3] != 0x01 {
        return Err(format!(
            "not an IDX1 label file: header starts {:02X} {:02X} {:02X} {:02X}, \
             expected 00 00 08 01",
            bytes[0], bytes[1], bytes[2], bytes[3]
        ));
    }

    let n_labels = read_be_u32(bytes, 4);
    let required = LABEL_HEADER_LEN + n_labels;
    if bytes.len() < required {
        return Err(format!(
            "IDX label file truncated: header declares {} labels, file has {} data bytes",
            n_labels,
            bytes.len() - LABEL_HEADER_LEN
        ));
    }

    bytes[LABEL_HEADER_LEN..required]
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            if b > 9 {
                Err(format!("label at index {} is {}, expected a digit 0-9", i, b))
            } else {
                Ok(b as usize)
            }
        })
        .collect()
}

/// Reads and parses an image/label file pair, checking the counts agree.
pub fn load_idx_pair(
    image_path: &str,
    label_path: &str,
) -> Result<(Vec<Vec<f64>>, Vec<usize>), String> {
    let image_bytes = std::fs::read(image_path)
        .map_err(|e| format!("cannot read image file '{}': {}", image_path, e))?;
    let label_bytes = std::fs::read(label_path)
        .map_err(|e| format!("cannot read label file '{}': {}", label_path, e))?;

    let images = parse_idx_images(&image_bytes)?;
    let labels = parse_idx_labels(&label_bytes)?;
    if images.len() != labels.len() {
        return Err(format!(
            "IDX pair mismatch: {} images but {} labels",
            images.len(),
            labels.len()
        ));
    }
    Ok((images, labels))
}
