use crate::annotations::detection::Detection;
use crate::detection_client::detection_endpoint::{DetectionEndpoint, DetectionError, ImageUpload};
use crate::detection_client::response::parse_detections;
use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use std::time::Duration;

/// The multipart field the service reads the image from.
pub const FILE_FIELD: &str = "file";

pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:8001/detect/";

/// Posts images to a remote detection service over HTTP.
pub struct HttpDetectionClient {
    client: Client,
    endpoint_url: String,
}

impl HttpDetectionClient {
    pub fn new(endpoint_url: &str, timeout: Duration) -> Result<Self, DetectionError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpDetectionClient {
            client,
            endpoint_url: endpoint_url.to_string(),
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

impl DetectionEndpoint for HttpDetectionClient {
    fn detect(&self, upload: &ImageUpload) -> Result<Vec<Detection>, DetectionError> {
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type)?;
        let form = Form::new().part(FILE_FIELD, part);
        debug!(
            "POST {} ({} bytes, {})",
            self.endpoint_url,
            upload.bytes.len(),
            upload.mime_type
        );
        let response = self.client.post(&self.endpoint_url).multipart(form).send()?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(DetectionError::UnexpectedStatus { status: status.as_u16() });
        }
        let body = response.text()?;
        let detections = parse_detections(&body)?;
        debug!("{} answered with {} detections", self.endpoint_url, detections.len());
        Ok(detections)
    }
}
