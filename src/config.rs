//! TOML run configuration for the `semisplit` tool.
//!
//! Every field is optional so a file can hold just the parts a job needs;
//! command-line flags are layered on top by the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::{CorpusOptions, Magnification, SplitOptions};

/// Errors that may occur while loading a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a config or exclusion list file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        /// TOML file path.
        path: PathBuf,
        /// TOML parse error.
        source: toml::de::Error,
    },
    /// A value parsed but is not usable.
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Contents of a run configuration file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub corpus: CorpusSection,
    pub split: SplitSection,
}

/// `[corpus]` table: unlabeled tile indexing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorpusSection {
    pub root: Option<PathBuf>,
    pub magnification: Option<Magnification>,
    /// Text file with one excluded slide name per line.
    pub exclude_list: Option<PathBuf>,
    pub limit: Option<usize>,
}

/// `[split]` table: stratified labeled/unlabeled split.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitSection {
    /// Class-per-folder image dataset to split.
    pub root: Option<PathBuf>,
    pub images_per_class: Option<usize>,
    pub num_classes: Option<usize>,
    pub total_size: Option<usize>,
    pub seed: Option<u64>,
    pub manifest_out: Option<PathBuf>,
}

impl RunConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RunConfig = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.split.num_classes == Some(0) {
            return Err(ConfigError::Invalid {
                field: "split.num_classes",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.corpus.limit == Some(0) {
            return Err(ConfigError::Invalid {
                field: "corpus.limit",
                reason: "must be at least 1; omit it to scan everything".to_string(),
            });
        }
        Ok(())
    }
}

impl CorpusSection {
    /// Resolve into indexer options, reading the exclusion list if one is set.
    pub fn to_options(&self) -> Result<CorpusOptions, ConfigError> {
        let root = self.root.clone().ok_or_else(|| ConfigError::Invalid {
            field: "corpus.root",
            reason: "a corpus root is required".to_string(),
        })?;
        let exclude = match &self.exclude_list {
            Some(path) => read_exclude_list(path)?,
            None => Vec::new(),
        };
        Ok(CorpusOptions {
            root,
            exclude,
            magnification: self.magnification.unwrap_or_default(),
            limit: self.limit,
        })
    }
}

impl SplitSection {
    pub fn to_options(&self) -> SplitOptions {
        let defaults = SplitOptions::default();
        SplitOptions {
            images_per_class: self.images_per_class.unwrap_or(defaults.images_per_class),
            num_classes: self.num_classes.unwrap_or(defaults.num_classes),
            total_size: self.total_size,
        }
    }
}

/// Read excluded slide names, one per line; blank lines and `#` comments are skipped.
pub fn read_exclude_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_full_config() {
        let dir = tempdir().unwrap();
        let exclude = dir.path().join("exclude.txt");
        std::fs::write(&exclude, "# held out\nTCGA-AA-3512-01Z.svs\n\n").unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            format!(
                r#"
[corpus]
root = "/data/coad"
magnification = "10.0"
exclude_list = "{}"
limit = 50

[split]
root = "/data/nct"
images_per_class = 10
seed = 7
"#,
                exclude.display()
            ),
        )
        .unwrap();

        let config = RunConfig::load(&path).unwrap();
        let corpus = config.corpus.to_options().unwrap();
        assert_eq!(corpus.magnification, Magnification::X10);
        assert_eq!(corpus.exclude, vec!["TCGA-AA-3512-01Z.svs".to_string()]);
        assert_eq!(corpus.limit, Some(50));

        let split = config.split.to_options();
        assert_eq!(split.images_per_class, 10);
        assert_eq!(split.num_classes, 9);
        assert_eq!(config.split.seed, Some(7));
    }

    #[test]
    fn bad_magnification_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "[corpus]\nmagnification = \"15.0\"\n").unwrap();
        assert!(matches!(
            RunConfig::load(&path),
            Err(ConfigError::ParseToml { .. })
        ));
    }

    #[test]
    fn zero_classes_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "[split]\nnum_classes = 0\n").unwrap();
        assert!(matches!(
            RunConfig::load(&path),
            Err(ConfigError::Invalid {
                field: "split.num_classes",
                ..
            })
        ));
    }

    #[test]
    fn corpus_root_required() {
        let err = CorpusSection::default().to_options().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "corpus.root", .. }));
    }
}
