use crate::annotations::detection::Detection;
use crate::image_utils::image_io::SelectedImage;

/// Everything the detection service needs about an image.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl From<&SelectedImage> for ImageUpload {
    fn from(selected: &SelectedImage) -> Self {
        ImageUpload {
            file_name: selected.file_name.clone(),
            mime_type: selected.mime_type.clone(),
            bytes: selected.bytes.clone(),
        }
    }
}

/// The single failure kind the view distinguishes: the detection request did not produce
/// detections.
#[derive(thiserror::Error, Debug)]
pub enum DetectionError {
    #[error("detection request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("detection service answered with status {status}")]
    UnexpectedStatus { status: u16 },
    #[error("detection service sent a malformed response: {0}")]
    MalformedResponse(String),
}

/// Anything that can turn an image into detections.
///
/// The annotation view only talks to the service through this trait, so a canned endpoint can
/// stand in for the HTTP client.
pub trait DetectionEndpoint {
    fn detect(&self, upload: &ImageUpload) -> Result<Vec<Detection>, DetectionError>;
}
