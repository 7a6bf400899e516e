//! JSON record of a labeled/unlabeled split so a run can be reproduced.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::split::{SplitOptions, StratifiedSplit};
use super::{Dataset, DatasetError, Label};

/// Current manifest layout version.
pub const MANIFEST_FORMAT_VERSION: i64 = 1;

/// Serialized description of a [`StratifiedSplit`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitManifest {
    pub format_version: i64,
    /// Seed used for sampling, when one was given.
    pub seed: Option<u64>,
    pub images_per_class: usize,
    pub num_classes: usize,
    /// Index range the unlabeled complement was drawn from.
    pub total_size: usize,
    pub labeled_indices: Vec<usize>,
    pub labeled_targets: Vec<Label>,
    pub unlabeled_count: usize,
}

impl SplitManifest {
    pub fn from_split<D: Dataset>(
        split: &StratifiedSplit<D>,
        options: &SplitOptions,
        seed: Option<u64>,
    ) -> Self {
        Self {
            format_version: MANIFEST_FORMAT_VERSION,
            seed,
            images_per_class: options.images_per_class,
            num_classes: options.num_classes,
            total_size: options
                .total_size
                .unwrap_or_else(|| split.labeled.subset().dataset().len()),
            labeled_indices: split.labeled_indices().to_vec(),
            labeled_targets: split.labeled_targets.clone(),
            unlabeled_count: split.unlabeled.len(),
        }
    }
}

/// Write `manifest` as pretty-printed JSON.
pub fn write_manifest(path: &Path, manifest: &SplitManifest) -> Result<(), DatasetError> {
    let bytes = serde_json::to_vec_pretty(manifest)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| DatasetError::io(parent, source))?;
    }
    fs::write(path, bytes).map_err(|source| DatasetError::io(path, source))
}

/// Read a manifest written by [`write_manifest`].
pub fn read_manifest(path: &Path) -> Result<SplitManifest, DatasetError> {
    let bytes = fs::read(path).map_err(|source| DatasetError::io(path, source))?;
    let manifest: SplitManifest = serde_json::from_slice(&bytes)?;
    if manifest.format_version != MANIFEST_FORMAT_VERSION
        || manifest.labeled_indices.len() != manifest.labeled_targets.len()
    {
        return Err(DatasetError::Configuration(format!(
            "unsupported split manifest at {}",
            path.display()
        )));
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{InMemoryDataset, build_split};
    use rand::{SeedableRng, rngs::StdRng};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn manifest_describes_split() {
        let targets: Vec<Label> = (0..9).flat_map(|c| [c; 4]).collect();
        let data = Arc::new(InMemoryDataset::from_targets(targets));
        let options = SplitOptions {
            images_per_class: 3,
            ..SplitOptions::default()
        };
        let split = build_split(data, &options, &mut StdRng::seed_from_u64(42)).unwrap();
        let manifest = SplitManifest::from_split(&split, &options, Some(42));

        assert_eq!(manifest.total_size, 36);
        assert_eq!(manifest.labeled_indices.len(), 27);
        assert_eq!(manifest.unlabeled_count, 9);

        let dir = tempdir().unwrap();
        let path = dir.path().join("out/split.json");
        write_manifest(&path, &manifest).unwrap();
        assert_eq!(read_manifest(&path).unwrap(), manifest);
    }

    #[test]
    fn rejects_unknown_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("split.json");
        fs::write(
            &path,
            r#"{"format_version":9,"seed":null,"images_per_class":1,"num_classes":1,"total_size":1,"labeled_indices":[0],"labeled_targets":[0],"unlabeled_count":0}"#,
        )
        .unwrap();
        assert!(matches!(
            read_manifest(&path),
            Err(DatasetError::Configuration(_))
        ));
    }

    #[test]
    fn malformed_json_is_manifest_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("split.json");
        fs::write(&path, "{").unwrap();
        assert!(matches!(read_manifest(&path), Err(DatasetError::Manifest(_))));
    }
}
