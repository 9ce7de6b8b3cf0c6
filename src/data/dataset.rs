//! In-memory labelled image set

use crate::{Error, Result, Tensor};
use rand::seq::SliceRandom;
use rand::Rng;

/// Images stored channel-first (`[N, C, S, S]`, values in `[-1, 1]`) with one
/// class label per image
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    images: Vec<f32>,
    labels: Vec<usize>,
    channels: usize,
    image_size: usize,
}

impl Dataset {
    /// Build a dataset from flat channel-first pixel data
    pub fn new(images: Vec<f32>, labels: Vec<usize>, channels: usize, image_size: usize) -> Result<Self> {
        let per_image = channels * image_size * image_size;
        if images.len() != labels.len() * per_image {
            return Err(Error::ShapeMismatch {
                name: "dataset images".to_string(),
                expected: vec![labels.len(), channels, image_size, image_size],
                got: vec![images.len()],
            });
        }
        Ok(Self { images, labels, channels, image_size })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn image_size(&self) -> usize {
        self.image_size
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    fn image_len(&self) -> usize {
        self.channels * self.image_size * self.image_size
    }

    /// Images `start..end` as a `[end - start, C, S, S]` tensor
    pub fn images_range(&self, start: usize, end: usize) -> Tensor {
        let len = self.image_len();
        Tensor::from_shape(
            self.images[start * len..end * len].to_vec(),
            &[end - start, self.channels, self.image_size, self.image_size],
            false,
        )
    }

    /// Every image as one tensor
    pub fn images(&self) -> Tensor {
        self.images_range(0, self.len())
    }

    /// Number of full batches; a trailing partial batch is dropped
    pub fn num_batches(&self, batch_size: usize) -> usize {
        if batch_size == 0 {
            0
        } else {
            self.len() / batch_size
        }
    }

    /// The `index`-th contiguous batch of images and labels
    ///
    /// # Panics
    ///
    /// Panics if the batch reaches past the end of the dataset.
    pub fn batch(&self, index: usize, batch_size: usize) -> (Tensor, &[usize]) {
        let (start, end) = (index * batch_size, (index + 1) * batch_size);
        assert!(end <= self.len(), "batch {index} of size {batch_size} is out of range for {} images", self.len());
        (self.images_range(start, end), &self.labels[start..end])
    }

    /// Permute images and labels with the same permutation
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);

        let len = self.image_len();
        let mut images = Vec::with_capacity(self.images.len());
        for &i in &order {
            images.extend_from_slice(&self.images[i * len..(i + 1) * len]);
        }
        self.labels = order.iter().map(|&i| self.labels[i]).collect();
        self.images = images;
    }

    /// Number of images per class
    pub fn class_counts(&self, num_classes: usize) -> Vec<usize> {
        let mut counts = vec![0; num_classes];
        for &label in &self.labels {
            if let Some(count) = counts.get_mut(label) {
                *count += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Five 1x1 single-channel images whose pixel equals ten times the label
    fn tagged() -> Dataset {
        let labels = vec![0, 1, 2, 3, 4];
        let images = labels.iter().map(|&l| l as f32 * 10.0).collect();
        Dataset::new(images, labels, 1, 1).expect("consistent sizes")
    }

    #[test]
    fn test_new_rejects_inconsistent_sizes() {
        let result = Dataset::new(vec![0.0; 5], vec![0, 1], 1, 2);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_batches_drop_remainder() {
        let data = tagged();
        assert_eq!(data.num_batches(2), 2);
        assert_eq!(data.num_batches(6), 0);
        assert_eq!(data.num_batches(0), 0);

        let (images, labels) = data.batch(1, 2);
        assert_eq!(images.shape(), &[2, 1, 1, 1]);
        assert_eq!(images.as_slice(), &[20.0, 30.0]);
        assert_eq!(labels, &[2, 3]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_batch_past_end_panics() {
        let _ = tagged().batch(2, 2);
    }

    #[test]
    fn test_shuffle_keeps_pairs_together() {
        let mut data = tagged();
        data.shuffle(&mut StdRng::seed_from_u64(11));

        let images = data.images();
        for (pixel, &label) in images.as_slice().iter().zip(data.labels()) {
            assert_eq!(*pixel, label as f32 * 10.0);
        }
        let mut labels = data.labels().to_vec();
        labels.sort_unstable();
        assert_eq!(labels, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_class_counts() {
        let data = Dataset::new(vec![0.0; 4], vec![1, 0, 1, 1], 1, 1).expect("consistent sizes");
        assert_eq!(data.class_counts(2), vec![1, 3]);
    }
}
