//! Reads `<root>/<split>/<class_dir>/*` image folders

use super::Dataset;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Image folder laid out as `<root>/<split>/<class_dir>/<file>`
///
/// The position of a class directory in `class_dirs` is its label.
#[derive(Debug, Clone)]
pub struct ImageFolder {
    root: PathBuf,
    class_dirs: Vec<String>,
    image_size: usize,
}

impl ImageFolder {
    pub fn new(root: impl Into<PathBuf>, class_dirs: Vec<String>, image_size: usize) -> Self {
        Self { root: root.into(), class_dirs, image_size }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every image of one split
    ///
    /// Missing or empty class directories contribute nothing; a split with no
    /// images at all is an error.
    pub fn load_split(&self, split: &str) -> Result<Dataset> {
        let mut images = Vec::new();
        let mut labels = Vec::new();

        for (label, class_dir) in self.class_dirs.iter().enumerate() {
            let dir = self.root.join(split).join(class_dir);
            if !dir.is_dir() {
                tracing::warn!(dir = %dir.display(), "class directory not found");
                continue;
            }
            let files = image_files(&dir)?;
            tracing::debug!(split, class = %class_dir, count = files.len(), "reading images");
            for file in files {
                images.extend(load_image(&file, self.image_size)?);
                labels.push(label);
            }
        }

        if labels.is_empty() {
            return Err(Error::Data(format!(
                "no images found in {}",
                self.root.join(split).display()
            )));
        }
        Dataset::new(images, labels, 3, self.image_size)
    }
}

/// Sorted regular files of `dir`, hidden files skipped
fn image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Decode one image as RGB, scaled to `[-1, 1]`, channel-first
pub fn load_image(path: &Path, image_size: usize) -> Result<Vec<f32>> {
    let rgb = image::open(path)
        .map_err(|e| Error::Data(format!("cannot decode {}: {e}", path.display())))?
        .to_rgb8();

    let (width, height) = rgb.dimensions();
    if width as usize != image_size || height as usize != image_size {
        return Err(Error::Data(format!(
            "{} is {width}x{height}, expected {image_size}x{image_size}",
            path.display()
        )));
    }

    let plane = image_size * image_size;
    let mut data = vec![0.0; 3 * plane];
    for (i, pixel) in rgb.pixels().enumerate() {
        for (c, &value) in pixel.0.iter().enumerate() {
            data[c * plane + i] = (f32::from(value) - 127.5) / 127.5;
        }
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_png(path: &Path, size: u32, color: [u8; 3]) {
        std::fs::create_dir_all(path.parent().expect("has parent")).expect("mkdir should succeed");
        RgbImage::from_pixel(size, size, Rgb(color)).save(path).expect("png write should succeed");
    }

    fn folder(root: &Path, size: usize) -> ImageFolder {
        ImageFolder::new(root, vec!["outros".to_string(), "melanoma".to_string()], size)
    }

    #[test]
    fn test_load_split_labels_by_class_dir() {
        let dir = TempDir::new().expect("temp dir creation should succeed");
        write_png(&dir.path().join("train/outros/b.png"), 2, [0, 0, 0]);
        write_png(&dir.path().join("train/outros/a.png"), 2, [255, 255, 255]);
        write_png(&dir.path().join("train/melanoma/c.png"), 2, [255, 0, 0]);
        std::fs::write(dir.path().join("train/melanoma/.DS_Store"), b"junk").expect("write should succeed");

        let data = folder(dir.path(), 2).load_split("train").expect("split should load");
        assert_eq!(data.len(), 3);
        assert_eq!(data.labels(), &[0, 0, 1]);

        // Sorted order: a.png (white) before b.png (black)
        let images = data.images();
        assert_eq!(images.shape(), &[3, 3, 2, 2]);
        assert_eq!(images.as_slice()[0], 1.0);
        assert_eq!(images.as_slice()[12], -1.0);
        // Red image: R plane 1, G plane -1
        assert_eq!(images.as_slice()[24], 1.0);
        assert_eq!(images.as_slice()[28], -1.0);
    }

    #[test]
    fn test_missing_class_dir_is_allowed() {
        let dir = TempDir::new().expect("temp dir creation should succeed");
        write_png(&dir.path().join("validation/melanoma/x.png"), 2, [10, 20, 30]);

        let data = folder(dir.path(), 2).load_split("validation").expect("split should load");
        assert_eq!(data.labels(), &[1]);
    }

    #[test]
    fn test_empty_split_is_error() {
        let dir = TempDir::new().expect("temp dir creation should succeed");
        std::fs::create_dir_all(dir.path().join("train/outros")).expect("mkdir should succeed");
        let result = folder(dir.path(), 2).load_split("train");
        assert!(matches!(result, Err(Error::Data(_))));
    }

    #[test]
    fn test_wrong_size_names_file() {
        let dir = TempDir::new().expect("temp dir creation should succeed");
        write_png(&dir.path().join("train/outros/big.png"), 4, [0, 0, 0]);

        let err = folder(dir.path(), 2).load_split("train").expect_err("size must be checked");
        assert!(err.to_string().contains("big.png"));
    }

    #[test]
    fn test_undecodable_file_names_file() {
        let dir = TempDir::new().expect("temp dir creation should succeed");
        std::fs::create_dir_all(dir.path().join("train/outros")).expect("mkdir should succeed");
        std::fs::write(dir.path().join("train/outros/notes.txt"), b"hello").expect("write should succeed");

        let err = folder(dir.path(), 2).load_split("train").expect_err("decode must fail");
        assert!(err.to_string().contains("notes.txt"));
    }
}
