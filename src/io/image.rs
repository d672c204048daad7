use crate::error::ViewerError;
use image::RgbaImage;
use log::info;
use std::path::{Path, PathBuf};

/// Saves a tightly packed RGBA8 buffer to an image file (format from the extension).
pub fn save_rgba(buffer: &[u8], width: usize, height: usize, path: &Path) -> Result<(), ViewerError> {
    let img = RgbaImage::from_raw(width as u32, height as u32, buffer.to_vec()).ok_or_else(|| {
        ViewerError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!(
                "buffer of {} bytes does not match {}x{} RGBA",
                buffer.len(),
                width,
                height
            ),
        ))
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    img.save(path)?;
    info!("Saved {}x{} image to '{}'", width, height, path.display());
    Ok(())
}

/// Timestamped screenshot path inside `dir`.
pub fn screenshot_path(dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("screenshot_{}.png", stamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        let path = std::env::temp_dir().join("model_viewer_bad.png");
        assert!(save_rgba(&[0u8; 7], 2, 1, &path).is_err());
    }

    #[test]
    fn screenshot_name_is_png_in_dir() {
        let path = screenshot_path(Path::new("shots"));
        assert_eq!(path.parent(), Some(Path::new("shots")));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("screenshot_") && name.ends_with(".png"));
    }
}
