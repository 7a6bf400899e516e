use std::path::Path;

/// Write a small solid-color PNG tile, creating parent folders.
pub fn write_tile(path: &Path, rgb: [u8; 3]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create tile parent dirs");
    }
    image::RgbImage::from_pixel(4, 4, image::Rgb(rgb))
        .save(path)
        .expect("write tile png");
}
