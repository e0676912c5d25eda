use crate::config::ConfigError;
use crate::detection_client::detection_endpoint::DetectionError;
use crate::evaluation::report::EvaluationError;
use crate::image_utils::color::ColorParseError;
use crate::image_utils::image_io::ImageIoError;

/// Everything the command-line front end can fail with.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Detection(#[from] DetectionError),
    #[error(transparent)]
    Image(#[from] ImageIoError),
    #[error(transparent)]
    Color(#[from] ColorParseError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("failed to serialise output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("detection failed: {0}")]
    DetectionFailed(String),
    #[error("either --input or --image-dir is required")]
    NoImagesGiven,
}
