//! Labeled dataset read from `<root>/<class>/<image>` folders.

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::DynamicImage;
use ndarray::Array3;
use tracing::info;

use super::decode::open_image;
use super::transform::{ImageTransform, to_tensor};
use super::{Dataset, DatasetError, Label, LabeledDataset};

/// Class-per-folder image dataset with labels assigned in sorted folder order.
pub struct ImageFolder<T = Array3<f32>> {
    root: PathBuf,
    classes: Vec<String>,
    paths: Vec<PathBuf>,
    targets: Vec<Label>,
    transform: ImageTransform<T>,
}

impl ImageFolder<Array3<f32>> {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        Self::with_transform(root, to_tensor)
    }
}

impl<T> ImageFolder<T> {
    /// Index `root`, converting images with `transform` on fetch.
    pub fn with_transform<F>(root: impl Into<PathBuf>, transform: F) -> Result<Self, DatasetError>
    where
        F: Fn(DynamicImage) -> T + Send + Sync + 'static,
    {
        let root = root.into();
        let mut classes = Vec::new();
        for entry in fs::read_dir(&root).map_err(|source| DatasetError::io(&root, source))? {
            let entry = entry.map_err(|source| DatasetError::io(&root, source))?;
            if !entry.path().is_dir() {
                continue;
            }
            classes.push(entry.file_name().to_string_lossy().into_owned());
        }
        classes.sort();

        let mut paths = Vec::new();
        let mut targets = Vec::new();
        for (class_idx, class) in classes.iter().enumerate() {
            let mut files = Vec::new();
            collect_files_recursive(&root.join(class), &mut files)?;
            files.sort();
            targets.extend(std::iter::repeat_n(class_idx as Label, files.len()));
            paths.extend(files);
        }
        info!(
            root = %root.display(),
            classes = classes.len(),
            images = paths.len(),
            "Indexed image folder"
        );
        Ok(Self {
            root,
            classes,
            paths,
            targets,
            transform: Box::new(transform),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Class folder names; position is the class id.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn path(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }
}

impl<T> Dataset for ImageFolder<T> {
    type Sample = T;

    fn len(&self) -> usize {
        self.paths.len()
    }

    fn get(&self, index: usize) -> Result<(T, Label), DatasetError> {
        let (Some(path), Some(&label)) = (self.paths.get(index), self.targets.get(index)) else {
            return Err(DatasetError::IndexOutOfRange {
                index,
                len: self.paths.len(),
            });
        };
        let image = open_image(path)?;
        Ok(((self.transform)(image), label))
    }
}

impl<T> LabeledDataset for ImageFolder<T> {
    fn labels(&self) -> &[Label] {
        &self.targets
    }
}

fn collect_files_recursive(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), DatasetError> {
    for entry in fs::read_dir(dir).map_err(|source| DatasetError::io(dir, source))? {
        let entry = entry.map_err(|source| DatasetError::io(dir, source))?;
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, out)?;
        } else if path.is_file() {
            out.push(path);
        }
    }
    Ok(())
}
