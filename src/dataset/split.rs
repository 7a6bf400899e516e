//! Stratified labeled/unlabeled split for semi-supervised training.
//!
//! A fixed number of items is drawn per class to form the labeled subset; the
//! remaining indices of the dataset form the unlabeled subset.

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use rand::seq::index;
use tracing::{debug, info};

use super::subset::{Subset, SubsetDataset};
use super::{Dataset, DatasetError, Label, LabeledDataset};

/// Dataset size the split was originally tuned for (a 9-class, 100k tile set).
pub const LEGACY_TOTAL_SIZE: usize = 100_000;

/// Knobs for [`build_split`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitOptions {
    /// Items drawn per class for the labeled subset.
    pub images_per_class: usize,
    /// Classes `0..num_classes` are sampled.
    pub num_classes: usize,
    /// Size of the index range the unlabeled complement is taken from.
    ///
    /// Defaults to the dataset length. Must not exceed it.
    pub total_size: Option<usize>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            images_per_class: 5,
            num_classes: 9,
            total_size: None,
        }
    }
}

/// Result of [`build_split`].
pub struct StratifiedSplit<D: Dataset> {
    /// Labels of the labeled subset, in subset order.
    pub labeled_targets: Vec<Label>,
    pub labeled: SubsetDataset<D>,
    pub unlabeled: SubsetDataset<D>,
}

impl<D: Dataset> StratifiedSplit<D> {
    /// Indices into the backing dataset that carry labels.
    pub fn labeled_indices(&self) -> &[usize] {
        self.labeled.indices()
    }

    pub fn unlabeled_indices(&self) -> &[usize] {
        self.unlabeled.indices()
    }

    pub fn into_parts(self) -> (Vec<Label>, SubsetDataset<D>, SubsetDataset<D>) {
        (self.labeled_targets, self.labeled, self.unlabeled)
    }
}

/// Split `dataset` into a stratified labeled subset and its unlabeled complement.
///
/// Each class is sampled uniformly without replacement from `rng`; a class with
/// fewer than `images_per_class` items is an error rather than a short sample.
pub fn build_split<D, R>(
    dataset: Arc<D>,
    options: &SplitOptions,
    rng: &mut R,
) -> Result<StratifiedSplit<D>, DatasetError>
where
    D: LabeledDataset,
    R: Rng + ?Sized,
{
    let labels = dataset.labels();
    let total_size = resolve_total_size(options, dataset.len())?;

    let mut labeled_indices = Vec::with_capacity(options.images_per_class * options.num_classes);
    for class in 0..options.num_classes as Label {
        let candidates: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label == class)
            .map(|(idx, _)| idx)
            .collect();
        if candidates.len() < options.images_per_class {
            return Err(DatasetError::Sampling {
                class,
                requested: options.images_per_class,
                available: candidates.len(),
            });
        }
        let picked = index::sample(&mut *rng, candidates.len(), options.images_per_class);
        debug!(class, available = candidates.len(), "Sampled labeled items");
        labeled_indices.extend(picked.iter().map(|pos| candidates[pos]));
    }

    let labeled_targets: Vec<Label> = labeled_indices.iter().map(|&idx| labels[idx]).collect();
    let taken: HashSet<usize> = labeled_indices.iter().copied().collect();
    let unlabeled_indices: Vec<usize> = (0..total_size).filter(|idx| !taken.contains(idx)).collect();

    info!(
        labeled = labeled_indices.len(),
        unlabeled = unlabeled_indices.len(),
        total_size,
        "Built stratified split"
    );
    Ok(StratifiedSplit {
        labeled_targets,
        labeled: SubsetDataset::new(Subset::new(dataset.clone(), labeled_indices), None),
        unlabeled: SubsetDataset::new(Subset::new(dataset, unlabeled_indices), None),
    })
}

fn resolve_total_size(options: &SplitOptions, len: usize) -> Result<usize, DatasetError> {
    match options.total_size {
        None => Ok(len),
        Some(total) if total <= len => Ok(total),
        Some(total) => Err(DatasetError::Configuration(format!(
            "total_size {total} exceeds dataset length {len}"
        ))),
    }
}
