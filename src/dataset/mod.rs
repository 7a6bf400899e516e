//! Dataset views used to feed a semi-supervised training run.
//!
//! Everything here is built once at construction time and read-only afterwards:
//! the unlabeled tile corpus indexes files on disk, the image folder indexes a
//! class-per-directory labeled set, and the split builder carves a labeled
//! subset plus its unlabeled complement out of any [`LabeledDataset`].

use std::sync::Arc;

pub mod corpus;
mod decode;
mod error;
pub mod image_folder;
pub mod manifest;
pub mod memory;
pub mod split;
pub mod subset;
pub mod transform;

pub use corpus::{CorpusOptions, Magnification, UnlabeledCorpus};
pub use error::DatasetError;
pub use image_folder::ImageFolder;
pub use memory::InMemoryDataset;
pub use split::{SplitOptions, StratifiedSplit, build_split};
pub use subset::{SampleTransform, Subset, SubsetDataset};
pub use transform::{ImageTransform, to_tensor};

/// Integer class id attached to every sample.
pub type Label = i64;

/// Label reported for every sample of an unlabeled corpus.
pub const UNLABELED: Label = 0;

/// Random-access source of `(sample, label)` pairs.
pub trait Dataset {
    /// Sample type produced by [`Dataset::get`].
    type Sample;

    /// Number of addressable items.
    fn len(&self) -> usize;

    /// Whether the dataset has no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch the item at `index`.
    fn get(&self, index: usize) -> Result<(Self::Sample, Label), DatasetError>;
}

/// Dataset whose labels can be read without fetching samples.
pub trait LabeledDataset: Dataset {
    /// One label per item, in index order.
    fn labels(&self) -> &[Label];
}

impl<D: Dataset + ?Sized> Dataset for Arc<D> {
    type Sample = D::Sample;

    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Result<(Self::Sample, Label), DatasetError> {
        (**self).get(index)
    }
}

impl<D: LabeledDataset + ?Sized> LabeledDataset for Arc<D> {
    fn labels(&self) -> &[Label] {
        (**self).labels()
    }
}
