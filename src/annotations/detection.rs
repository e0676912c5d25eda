use crate::annotations::center_box::CenterBox;
use crate::annotations::render_box::RenderBox;
use serde::Serialize;

/// A detection is one entry of the detection service's response.
///
/// The service reports `[label, confidence, [x_center, y_center, width, height]]`. Only the box
/// drives drawing; the label and confidence are carried along for reporting.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detection {
    pub label: String,
    pub confidence: Option<f64>,
    pub center_box: CenterBox,
}

impl Detection {
    pub fn render_box(&self) -> RenderBox {
        RenderBox::from_center_box(&self.center_box)
    }
}

/// Maps detections to drawable boxes, keeping the service's order.
pub fn render_boxes(detections: &[Detection]) -> Vec<RenderBox> {
    detections.iter().map(Detection::render_box).collect()
}
