pub mod detection_endpoint;
pub mod http_client;
pub mod response;
