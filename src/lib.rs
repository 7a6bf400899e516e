//! Dataset indexing and labeled/unlabeled splitting for semi-supervised
//! image classification.
/// Application directory resolution.
pub mod app_dirs;
/// Run configuration files.
pub mod config;
/// Dataset views, corpus indexing and split building.
pub mod dataset;
/// Tracing subscriber setup.
pub mod logging;
