use crate::annotations::bounding_box::{BoundingBoxGeometry, BoxError, validate_extent};
use crate::annotations::center_box::CenterBox;
use serde::{Deserialize, Serialize};

/// A box ready to be drawn: top-left corner plus size, in image pixels.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct RenderBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RenderBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, BoxError> {
        validate_extent(x, y, width, height)?;
        Ok(RenderBox { x, y, width, height })
    }

    /// Moves the origin from the center to the top-left corner. Size is kept as is.
    pub fn from_center_box(center_box: &CenterBox) -> Self {
        RenderBox {
            x: center_box.x_center() - center_box.width() / 2.0,
            y: center_box.y_center() - center_box.height() / 2.0,
            width: center_box.width(),
            height: center_box.height(),
        }
    }

    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.width, self.height)
    }
}

impl From<CenterBox> for RenderBox {
    fn from(center_box: CenterBox) -> Self {
        RenderBox::from_center_box(&center_box)
    }
}

impl BoundingBoxGeometry for RenderBox {
    fn left(&self) -> f64 {
        self.x
    }

    fn top(&self) -> f64 {
        self.y
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }
}
