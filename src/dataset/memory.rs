use super::{Dataset, DatasetError, Label, LabeledDataset};

/// Labeled dataset held fully in memory.
#[derive(Debug, Clone)]
pub struct InMemoryDataset<S> {
    samples: Vec<S>,
    targets: Vec<Label>,
}

impl<S: Clone> InMemoryDataset<S> {
    /// Pair `samples` with `targets`; both must have the same length.
    pub fn new(samples: Vec<S>, targets: Vec<Label>) -> Result<Self, DatasetError> {
        if samples.len() != targets.len() {
            return Err(DatasetError::Configuration(format!(
                "{} samples but {} targets",
                samples.len(),
                targets.len()
            )));
        }
        Ok(Self { samples, targets })
    }
}

impl InMemoryDataset<usize> {
    /// Build a dataset whose samples are their own indices.
    pub fn from_targets(targets: Vec<Label>) -> Self {
        Self {
            samples: (0..targets.len()).collect(),
            targets,
        }
    }
}

impl<S: Clone> Dataset for InMemoryDataset<S> {
    type Sample = S;

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn get(&self, index: usize) -> Result<(S, Label), DatasetError> {
        match (self.samples.get(index), self.targets.get(index)) {
            (Some(sample), Some(&label)) => Ok((sample.clone(), label)),
            _ => Err(DatasetError::IndexOutOfRange {
                index,
                len: self.samples.len(),
            }),
        }
    }
}

impl<S: Clone> LabeledDataset for InMemoryDataset<S> {
    fn labels(&self) -> &[Label] {
        &self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_length_mismatch() {
        let err = InMemoryDataset::new(vec!['a', 'b'], vec![0]).unwrap_err();
        assert!(matches!(err, DatasetError::Configuration(_)));
    }

    #[test]
    fn from_targets_uses_index_samples() {
        let data = InMemoryDataset::from_targets(vec![3, 1, 4]);
        assert_eq!(data.len(), 3);
        assert_eq!(data.get(2).unwrap(), (2, 4));
        assert_eq!(data.labels(), &[3, 1, 4]);
    }
}
