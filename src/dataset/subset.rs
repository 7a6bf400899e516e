//! Index-restricted views over a shared backing dataset.

use std::sync::Arc;

use super::{Dataset, DatasetError, Label};

/// Per-sample function applied at fetch time.
pub type SampleTransform<S> = Box<dyn Fn(S) -> S + Send + Sync>;

/// Fixed, ordered selection of indices into a backing dataset.
pub struct Subset<D> {
    dataset: Arc<D>,
    indices: Vec<usize>,
}

impl<D: Dataset> Subset<D> {
    /// Restrict `dataset` to `indices`, in the given order.
    pub fn new(dataset: Arc<D>, indices: Vec<usize>) -> Self {
        Self { dataset, indices }
    }

    /// Backing indices in view order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Shared handle to the backing dataset.
    pub fn dataset(&self) -> &Arc<D> {
        &self.dataset
    }
}

impl<D: Dataset> Dataset for Subset<D> {
    type Sample = D::Sample;

    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> Result<(D::Sample, Label), DatasetError> {
        let &backing = self
            .indices
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.indices.len(),
            })?;
        self.dataset.get(backing)
    }
}

/// A [`Subset`] with an optional transform applied lazily on every fetch.
pub struct SubsetDataset<D: Dataset> {
    subset: Subset<D>,
    transform: Option<SampleTransform<D::Sample>>,
}

impl<D: Dataset> SubsetDataset<D> {
    /// Wrap `subset`; `None` leaves samples untouched.
    pub fn new(subset: Subset<D>, transform: Option<SampleTransform<D::Sample>>) -> Self {
        Self { subset, transform }
    }

    /// Backing indices in view order.
    pub fn indices(&self) -> &[usize] {
        self.subset.indices()
    }

    pub fn subset(&self) -> &Subset<D> {
        &self.subset
    }

    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }
}

impl<D: Dataset> Dataset for SubsetDataset<D> {
    type Sample = D::Sample;

    fn len(&self) -> usize {
        self.subset.len()
    }

    fn get(&self, index: usize) -> Result<(D::Sample, Label), DatasetError> {
        let (sample, label) = self.subset.get(index)?;
        match &self.transform {
            Some(transform) => Ok((transform(sample), label)),
            None => Ok((sample, label)),
        }
    }
}
