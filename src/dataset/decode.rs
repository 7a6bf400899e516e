use std::path::Path;

use image::{DynamicImage, ImageReader};

use super::DatasetError;

/// Open and decode an image.
///
/// Failing to open the file is an IO error; anything the decoder rejects,
/// truncated data included, is a decode error.
pub(super) fn open_image(path: &Path) -> Result<DynamicImage, DatasetError> {
    let reader = ImageReader::open(path)
        .map_err(|source| DatasetError::io(path, source))?
        .with_guessed_format()
        .map_err(|source| DatasetError::io(path, source))?;
    reader.decode().map_err(|source| DatasetError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = open_image(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn garbage_bytes_are_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"this is not an image").unwrap();
        let err = open_image(&path).unwrap_err();
        assert!(matches!(err, DatasetError::Decode { .. }), "{err}");
    }

    #[test]
    fn decodes_written_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tile.png");
        image::RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();
        let decoded = open_image(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }
}
