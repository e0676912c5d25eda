use crate::annotation_view::state::AnnotationState;
use crate::annotations::bounding_box::BoundingBoxGeometry;
use crate::image_utils::color::BoxColor;
use imageproc::drawing::{Blend, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use image::RgbaImage;

/// Pixel bounds of a box after rounding and clamping, inclusive on both ends.
///
/// Returns None when the box lies entirely outside the image.
fn clamp_to_image<B: BoundingBoxGeometry>(
    bbox: &B,
    image_width: u32,
    image_height: u32,
) -> Option<(i32, i32, i32, i32)> {
    if image_width == 0 || image_height == 0 {
        return None;
    }
    let max_x = (image_width - 1) as f64;
    let max_y = (image_height - 1) as f64;
    let (left, top, right, bottom) = bbox.as_xyxy();
    let (left, top, right, bottom) = (left.round(), top.round(), right.round(), bottom.round());
    if right < 0.0 || bottom < 0.0 || left > max_x || top > max_y {
        return None;
    }
    Some((
        left.clamp(0.0, max_x) as i32,
        top.clamp(0.0, max_y) as i32,
        right.clamp(0.0, max_x) as i32,
        bottom.clamp(0.0, max_y) as i32,
    ))
}

/// Strokes every box onto the image, blending by the color's alpha.
///
/// Thickness grows inwards so a box never spills past its own bounds.
pub fn draw_boxes<B: BoundingBoxGeometry>(
    image: RgbaImage,
    boxes: &[B],
    color: BoxColor,
    line_thickness: u32,
) -> RgbaImage {
    let (width, height) = image.dimensions();
    let thickness = i32::try_from(line_thickness.max(1)).unwrap_or(i32::MAX);
    let mut canvas = Blend(image);
    for bbox in boxes {
        let Some((x0, y0, x1, y1)) = clamp_to_image(bbox, width, height) else {
            continue;
        };
        for inset in 0..thickness {
            let (rx0, ry0, rx1, ry1) = (x0 + inset, y0 + inset, x1 - inset, y1 - inset);
            if rx0 > rx1 || ry0 > ry1 {
                break;
            }
            let rect = Rect::at(rx0, ry0).of_size((rx1 - rx0 + 1) as u32, (ry1 - ry0 + 1) as u32);
            draw_hollow_rect_mut(&mut canvas, rect, color.to_rgba());
        }
    }
    canvas.0
}

/// Draws whatever the view currently displays, in the view's current style.
pub fn render_annotations(image: RgbaImage, state: &AnnotationState) -> RgbaImage {
    let style = state.style();
    draw_boxes(image, state.displayed_boxes(), style.normal, style.line_thickness)
}
