pub mod bounding_box;
pub mod center_box;
pub mod detection;
pub mod render_box;
pub mod yolo_label;
