use image::{ImageFormat, RgbaImage};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ImageIoError {
    #[error("failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write image {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// An image the user picked, kept both as the raw file bytes (what gets uploaded) and with its
/// decoded dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedImage {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Guesses the MIME type from the file extension, falling back to octet-stream.
pub fn mime_type_for_path(filepath: &Path) -> String {
    ImageFormat::from_path(filepath)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

pub fn load_selected_image(filepath: &Path) -> Result<SelectedImage, ImageIoError> {
    let bytes = fs::read(filepath).map_err(|source| ImageIoError::Read {
        path: filepath.to_path_buf(),
        source,
    })?;
    let decoded = image::load_from_memory(&bytes).map_err(|source| ImageIoError::Decode {
        path: filepath.to_path_buf(),
        source,
    })?;
    let file_name = filepath
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(SelectedImage {
        path: filepath.to_path_buf(),
        file_name,
        mime_type: mime_type_for_path(filepath),
        width: decoded.width(),
        height: decoded.height(),
        bytes,
    })
}

pub fn read_image_as_rgba8(filepath: &Path) -> Result<RgbaImage, ImageIoError> {
    image::open(filepath)
        .map(|img| img.into_rgba8())
        .map_err(|source| ImageIoError::Decode {
            path: filepath.to_path_buf(),
            source,
        })
}

pub fn decode_selected_image(selected: &SelectedImage) -> Result<RgbaImage, ImageIoError> {
    image::load_from_memory(&selected.bytes)
        .map(|img| img.into_rgba8())
        .map_err(|source| ImageIoError::Decode {
            path: selected.path.clone(),
            source,
        })
}

pub fn write_rgba8(image: &RgbaImage, filepath: &Path) -> Result<(), ImageIoError> {
    image.save(filepath).map_err(|source| ImageIoError::Write {
        path: filepath.to_path_buf(),
        source,
    })
}
