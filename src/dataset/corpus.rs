//! Index of unlabeled tiles laid out as `<root>/<case>-files/<magnification>/<tile>`.

use std::{
    collections::HashSet,
    fmt,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use image::DynamicImage;
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::decode::open_image;
use super::transform::{ImageTransform, to_tensor};
use super::{Dataset, DatasetError, Label, UNLABELED};

/// Suffix marking a per-case tile folder.
pub const CASE_FOLDER_SUFFIX: &str = "files";

/// Resolution tier, named after the magnification subfolder it selects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Magnification {
    X40,
    #[default]
    X20,
    X10,
    X5,
}

impl Magnification {
    pub const ALL: [Magnification; 4] = [Self::X40, Self::X20, Self::X10, Self::X5];

    /// Subfolder name for this tier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X40 => "40.0",
            Self::X20 => "20.0",
            Self::X10 => "10.0",
            Self::X5 => "5.0",
        }
    }
}

impl fmt::Display for Magnification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Magnification {
    type Err = DatasetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == value)
            .ok_or_else(|| {
                DatasetError::Configuration(format!(
                    "magnification must be one of 40.0, 20.0, 10.0, 5.0 (got {value:?})"
                ))
            })
    }
}

impl TryFrom<String> for Magnification {
    type Error = DatasetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Magnification> for String {
    fn from(value: Magnification) -> Self {
        value.as_str().to_string()
    }
}

/// Options controlling which tiles end up in an [`UnlabeledCorpus`].
#[derive(Clone, Debug, Default)]
pub struct CorpusOptions {
    /// Directory holding the per-case folders.
    pub root: PathBuf,
    /// File names whose case identifiers are left out of the corpus.
    pub exclude: Vec<String>,
    /// Magnification subfolder to index.
    pub magnification: Magnification,
    /// Scan cap on root entries; `None` scans everything.
    ///
    /// Entries are counted from 1 and only those with a position strictly below
    /// the limit are considered, so `Some(n)` looks at no more than `n - 1`
    /// entries regardless of how many of them match.
    pub limit: Option<usize>,
}

impl CorpusOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

/// One indexed tile: folder relative to the corpus root, plus file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileEntry {
    /// `<case folder>/<magnification>`.
    pub folder: String,
    /// File name inside `folder`.
    pub file_name: String,
}

/// Third `-`-delimited field of a file or folder name.
pub fn case_id(name: &str) -> Option<&str> {
    name.split('-').nth(2)
}

/// Case identifiers to leave out, parsed from exclusion file names.
pub fn exclusion_set(names: &[String]) -> Result<HashSet<String>, DatasetError> {
    names
        .iter()
        .map(|name| {
            case_id(name).map(str::to_string).ok_or_else(|| {
                DatasetError::Configuration(format!(
                    "exclusion name needs at least three '-' separated fields: {name:?}"
                ))
            })
        })
        .collect()
}

/// Disk-backed unlabeled dataset; every sample is labeled [`UNLABELED`].
pub struct UnlabeledCorpus<T = Array3<f32>> {
    root: PathBuf,
    magnification: Magnification,
    entries: Vec<TileEntry>,
    transform: ImageTransform<T>,
}

impl UnlabeledCorpus<Array3<f32>> {
    /// Index `options.root`, converting tiles with [`to_tensor`] on fetch.
    pub fn open(options: CorpusOptions) -> Result<Self, DatasetError> {
        Self::with_transform(options, to_tensor)
    }
}

impl<T> UnlabeledCorpus<T> {
    /// Index `options.root`, converting tiles with `transform` on fetch.
    pub fn with_transform<F>(options: CorpusOptions, transform: F) -> Result<Self, DatasetError>
    where
        F: Fn(DynamicImage) -> T + Send + Sync + 'static,
    {
        let excluded = exclusion_set(&options.exclude)?;
        let entries = index_tiles(&options, &excluded)?;
        info!(
            root = %options.root.display(),
            magnification = %options.magnification,
            tiles = entries.len(),
            excluded_cases = excluded.len(),
            "Indexed unlabeled corpus"
        );
        Ok(Self {
            root: options.root,
            magnification: options.magnification,
            entries,
            transform: Box::new(transform),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn magnification(&self) -> Magnification {
        self.magnification
    }

    /// Indexed tiles in scan order.
    pub fn entries(&self) -> &[TileEntry] {
        &self.entries
    }

    /// Absolute path of the tile at `index`.
    pub fn tile_path(&self, index: usize) -> Option<PathBuf> {
        self.entries
            .get(index)
            .map(|entry| self.root.join(&entry.folder).join(&entry.file_name))
    }

    /// Number of distinct case folders contributing tiles.
    pub fn case_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.folder.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

impl<T> Dataset for UnlabeledCorpus<T> {
    type Sample = T;

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn get(&self, index: usize) -> Result<(T, Label), DatasetError> {
        let path = self.tile_path(index).ok_or(DatasetError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })?;
        let image = open_image(&path)?;
        Ok(((self.transform)(image), UNLABELED))
    }
}

fn index_tiles(
    options: &CorpusOptions,
    excluded: &HashSet<String>,
) -> Result<Vec<TileEntry>, DatasetError> {
    let magnification = options.magnification.as_str();
    let mut entries = Vec::new();
    for (position, name) in (1usize..).zip(sorted_names(&options.root)?) {
        if options.limit.is_some_and(|limit| position >= limit) {
            debug!(position, "Corpus scan limit reached");
            break;
        }
        if !name.ends_with(CASE_FOLDER_SUFFIX) {
            continue;
        }
        let folder = format!("{name}/{magnification}");
        let tile_dir = options.root.join(&name).join(magnification);
        if !tile_dir.is_dir() {
            continue;
        }
        if case_id(&name).is_none() {
            return Err(DatasetError::MalformedName(name));
        }
        if let Some(case) = excluded_case(&name, excluded) {
            debug!(case, folder = %folder, "Skipping excluded case");
            continue;
        }
        for file_name in sorted_names(&tile_dir)? {
            if !tile_dir.join(&file_name).is_file() {
                continue;
            }
            entries.push(TileEntry {
                folder: folder.clone(),
                file_name,
            });
        }
    }
    Ok(entries)
}

/// Excluded identifier carried by a case folder name, if any.
///
/// Folder names repeat the slide name they were tiled from, so any
/// `-`-delimited field of the folder may carry the identifier.
fn excluded_case<'a>(folder_name: &'a str, excluded: &HashSet<String>) -> Option<&'a str> {
    folder_name
        .split('-')
        .find(|field| excluded.contains(*field))
}

fn sorted_names(dir: &Path) -> Result<Vec<String>, DatasetError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|source| DatasetError::io(dir, source))? {
        let entry = entry.map_err(|source| DatasetError::io(dir, source))?;
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!(
                dir = %dir.display(),
                name = ?raw,
                "Skipping entry with non UTF-8 name"
            ),
        }
    }
    names.sort();
    Ok(names)
}
