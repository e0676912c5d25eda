use crate::annotations::bounding_box::BoundingBoxGeometry;
use crate::annotations::center_box::CenterBox;
use ndarray::{Array2, s};

/// Paints every normalised box into a boolean mask of `height` rows by `width` columns.
///
/// Box edges are scaled to pixels and truncated toward zero, then clipped to the image.
pub fn rasterise_boxes(boxes: &[CenterBox], width: u32, height: u32) -> Array2<bool> {
    let mut mask = Array2::from_elem((height as usize, width as usize), false);
    let to_pixel = |value: f64, scale: u32| -> usize {
        ((value * scale as f64) as i64).clamp(0, scale as i64) as usize
    };
    for bbox in boxes {
        let (left, top, right, bottom) = bbox.as_xyxy();
        let (x0, x1) = (to_pixel(left, width), to_pixel(right, width));
        let (y0, y1) = (to_pixel(top, height), to_pixel(bottom, height));
        if x0 >= x1 || y0 >= y1 {
            continue;
        }
        mask.slice_mut(s![y0..y1, x0..x1]).fill(true);
    }
    mask
}

/// Pixels covered by both box sets divided by pixels covered by either.
///
/// Both sets are normalised YOLO boxes for an image of `width` x `height` pixels. Two empty sets
/// agree perfectly and score 1.0.
pub fn mask_overlap_score(
    width: u32,
    height: u32,
    ground_truth: &[CenterBox],
    predicted: &[CenterBox],
) -> f64 {
    let gt_mask = rasterise_boxes(ground_truth, width, height);
    let pred_mask = rasterise_boxes(predicted, width, height);
    let (intersection, union) = gt_mask
        .iter()
        .zip(pred_mask.iter())
        .fold((0_usize, 0_usize), |(inter, uni), (&gt, &pred)| {
            (inter + (gt && pred) as usize, uni + (gt || pred) as usize)
        });
    if union == 0 {
        return 1.0;
    }
    intersection as f64 / union as f64
}
