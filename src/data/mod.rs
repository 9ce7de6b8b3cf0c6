//! Labelled skin-lesion images
//!
//! [`ImageFolder`] reads `<root>/<split>/<class_dir>/*` into a [`Dataset`]
//! of channel-first images scaled to `[-1, 1]`.

mod dataset;
mod loader;

pub use dataset::Dataset;
pub use loader::{load_image, ImageFolder};

use rand::Rng;

/// Train and validation sets of one image folder
pub struct SplitData {
    pub train: Dataset,
    pub test: Dataset,
}

/// Load both splits, shuffling each jointly when `shuffle` is set
pub fn load_splits<R: Rng>(
    folder: &ImageFolder,
    train_split: &str,
    test_split: &str,
    shuffle: bool,
    rng: &mut R,
) -> crate::Result<SplitData> {
    let mut train = folder.load_split(train_split)?;
    let mut test = folder.load_split(test_split)?;
    if shuffle {
        train.shuffle(rng);
        test.shuffle(rng);
    }
    tracing::info!(train = train.len(), test = test.len(), root = %folder.root().display(), "loaded images");
    Ok(SplitData { train, test })
}
