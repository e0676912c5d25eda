use crate::annotations::bounding_box::{BoundingBoxGeometry, BoxError, validate_extent};
use serde::{Deserialize, Serialize};

/// A box described by its center point and its size.
///
/// This is the layout detection models (and YOLO label files) report boxes in. Drawing code
/// wants the top-left corner instead, see [`RenderBox::from_center_box`].
///
/// [`RenderBox::from_center_box`]: crate::annotations::render_box::RenderBox::from_center_box
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct CenterBox {
    x_center: f64,
    y_center: f64,
    width: f64,
    height: f64,
}

impl CenterBox {
    /// Checks the box has finite coordinates and a non-negative size before constructing.
    pub fn new(x_center: f64, y_center: f64, width: f64, height: f64) -> Result<Self, BoxError> {
        validate_extent(x_center, y_center, width, height)?;
        Ok(CenterBox { x_center, y_center, width, height })
    }

    pub fn x_center(&self) -> f64 {
        self.x_center
    }

    pub fn y_center(&self) -> f64 {
        self.y_center
    }

    /// Multiplies every component by the image size.
    ///
    /// YOLO labels store boxes normalised to 0..1 by the image width and height.
    pub fn scaled(&self, image_width: f64, image_height: f64) -> Result<Self, BoxError> {
        CenterBox::new(
            self.x_center * image_width,
            self.y_center * image_height,
            self.width * image_width,
            self.height * image_height,
        )
    }
}

impl BoundingBoxGeometry for CenterBox {
    fn left(&self) -> f64 {
        self.x_center - self.width / 2.0
    }

    fn top(&self) -> f64 {
        self.y_center - self.height / 2.0
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }
}
