/// Reasons a box cannot be constructed.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BoxError {
    #[error("box coordinates must be finite, got ({0}, {1}, {2}, {3})")]
    NonFinite(f64, f64, f64, f64),
    #[error("box width must be non-negative, got {0}")]
    NegativeWidth(f64),
    #[error("box height must be non-negative, got {0}")]
    NegativeHeight(f64),
}

/// Checks the four values every box representation is built from.
pub(crate) fn validate_extent(a: f64, b: f64, width: f64, height: f64) -> Result<(), BoxError> {
    if !(a.is_finite() && b.is_finite() && width.is_finite() && height.is_finite()) {
        return Err(BoxError::NonFinite(a, b, width, height));
    }
    if width < 0.0 {
        return Err(BoxError::NegativeWidth(width));
    }
    if height < 0.0 {
        return Err(BoxError::NegativeHeight(height));
    }
    Ok(())
}

/// Shared geometry for the box representations in this crate.
///
/// This project uses the standard convention of the left side of the image being x=0 and the top
/// of the image being y=0.
pub trait BoundingBoxGeometry {
    fn left(&self) -> f64;
    fn top(&self) -> f64;
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    fn right(&self) -> f64 {
        self.left() + self.width()
    }

    fn bottom(&self) -> f64 {
        self.top() + self.height()
    }

    fn as_xyxy(&self) -> (f64, f64, f64, f64) {
        (self.left(), self.top(), self.right(), self.bottom())
    }
}
