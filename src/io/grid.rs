//! Sample image grids

use crate::{Error, Result, Tensor};
use image::{Rgb, RgbImage};
use std::path::Path;

/// Tile `rows * cols` images from a `[N, C, S, S]` tensor in `[-1, 1]` into
/// one RGB picture, filled row by row
///
/// Pixels are mapped back with `(x + 1) / 2`. Single-channel images are
/// drawn in grey.
pub fn image_grid(images: &Tensor, rows: usize, cols: usize) -> Result<RgbImage> {
    let [n, channels, height, width] = match images.shape() {
        &[n, c, h, w] => [n, c, h, w],
        other => {
            return Err(Error::InvalidParameter(format!(
                "image grid needs [N, C, H, W] images, got {other:?}"
            )))
        }
    };
    if channels != 1 && channels != 3 {
        return Err(Error::InvalidParameter(format!("cannot draw images with {channels} channels")));
    }
    if n < rows * cols {
        return Err(Error::InvalidParameter(format!(
            "a {rows}x{cols} grid needs {} images, got {n}",
            rows * cols
        )));
    }

    let plane = height * width;
    let data = images.as_slice();
    let to_byte = |v: f32| (((v + 1.0) / 2.0).clamp(0.0, 1.0) * 255.0).round() as u8;

    let mut grid = RgbImage::new((cols * width) as u32, (rows * height) as u32);
    for index in 0..rows * cols {
        let image = &data[index * channels * plane..(index + 1) * channels * plane];
        let (top, left) = ((index / cols) * height, (index % cols) * width);
        for y in 0..height {
            for x in 0..width {
                let offset = y * width + x;
                let pixel = if channels == 3 {
                    [image[offset], image[plane + offset], image[2 * plane + offset]].map(to_byte)
                } else {
                    [to_byte(image[offset]); 3]
                };
                grid.put_pixel((left + x) as u32, (top + y) as u32, Rgb(pixel));
            }
        }
    }

    Ok(grid)
}

/// Save a grid built by [`image_grid`] as PNG
pub fn save_image_grid(images: &Tensor, rows: usize, cols: usize, path: impl AsRef<Path>) -> Result<()> {
    image_grid(images, rows, cols)?.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_grid_layout_and_pixel_mapping() {
        // Two 1x1 RGB images: black and white
        let images = Tensor::from_shape(vec![-1.0, -1.0, -1.0, 1.0, 1.0, 1.0], &[2, 3, 1, 1], false);

        let grid = image_grid(&images, 1, 2).expect("grid should build");
        assert_eq!(grid.dimensions(), (2, 1));
        assert_eq!(grid.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(grid.get_pixel(1, 0), &Rgb([255, 255, 255]));

        let column = image_grid(&images, 2, 1).expect("grid should build");
        assert_eq!(column.dimensions(), (1, 2));
        assert_eq!(column.get_pixel(0, 1), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_channels_are_planar() {
        // One 1x2 image: red pixel then blue pixel
        let images = Tensor::from_shape(vec![1.0, -1.0, -1.0, -1.0, -1.0, 1.0], &[1, 3, 1, 2], false);
        let grid = image_grid(&images, 1, 1).expect("grid should build");
        assert_eq!(grid.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(grid.get_pixel(1, 0), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_too_few_images() {
        let images = Tensor::zeros(&[3, 3, 2, 2], false);
        assert!(matches!(image_grid(&images, 2, 2), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_save_png() {
        let dir = TempDir::new().expect("temp dir creation should succeed");
        let path = dir.path().join("grid.png");
        save_image_grid(&Tensor::zeros(&[6, 3, 4, 4], false), 2, 3, &path).expect("save should succeed");

        let loaded = image::open(&path).expect("png should decode").to_rgb8();
        assert_eq!(loaded.dimensions(), (12, 8));
        assert_eq!(loaded.get_pixel(0, 0), &Rgb([128, 128, 128]));
    }
}
