pub mod annotation_view;
pub mod annotations;
pub mod config;
pub mod detection_client;
pub mod error;
pub mod evaluation;
pub mod image_utils;
pub mod logging;
