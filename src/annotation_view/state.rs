use crate::annotation_view::submission::{SubmissionId, SubmissionTicket};
use crate::annotations::detection::{Detection, render_boxes};
use crate::annotations::render_box::RenderBox;
use crate::detection_client::detection_endpoint::{DetectionError, ImageUpload};
use crate::image_utils::color::{BoxColor, BoxStyle};
use crate::image_utils::image_io::SelectedImage;
use log::{debug, error, info, warn};

/// Where the view is in its cycle. Selecting a new image always goes back to `ImageSelected`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewPhase {
    NoImage,
    ImageSelected,
    AwaitingResponse,
    BoxesAvailable,
}

/// Everything the image annotation view shows.
///
/// Handlers take the state by value and hand back the next state. The displayed boxes are always
/// either empty or exactly the full set from the last successful detection.
#[derive(Clone, Debug)]
pub struct AnnotationState {
    image: Option<SelectedImage>,
    all_boxes: Vec<RenderBox>,
    displayed_boxes: Vec<RenderBox>,
    boxes_visible: bool,
    style: BoxStyle,
    phase: ViewPhase,
    detected: bool,
    pending: Option<SubmissionId>,
    next_submission: SubmissionId,
    last_error: Option<String>,
}

impl Default for AnnotationState {
    fn default() -> Self {
        AnnotationState::new(BoxStyle::default())
    }
}

impl AnnotationState {
    pub fn new(style: BoxStyle) -> Self {
        AnnotationState {
            image: None,
            all_boxes: Vec::new(),
            displayed_boxes: Vec::new(),
            boxes_visible: true,
            style,
            phase: ViewPhase::NoImage,
            detected: false,
            pending: None,
            next_submission: SubmissionId::first(),
            last_error: None,
        }
    }

    /// Replaces the image. Passing `None` (the user cancelled the file dialog) changes nothing.
    ///
    /// Any submission still in flight is forgotten, so its response can't paint boxes over the
    /// new image.
    pub fn select_image(self, image: Option<SelectedImage>) -> Self {
        let Some(image) = image else {
            debug!("no file selected, keeping current image");
            return self;
        };
        if let Some(pending) = self.pending {
            debug!("submission {pending} superseded by a new image");
        }
        info!("selected {} ({}x{})", image.file_name, image.width, image.height);
        AnnotationState {
            image: Some(image),
            all_boxes: Vec::new(),
            displayed_boxes: Vec::new(),
            phase: ViewPhase::ImageSelected,
            detected: false,
            pending: None,
            last_error: None,
            ..self
        }
    }

    /// Marks the view as waiting on a detection request and returns what to send.
    ///
    /// Returns no ticket when there is no image. Submitting again while a request is in flight is
    /// allowed; only the newest submission's response will be applied.
    pub fn begin_submission(self) -> (Self, Option<SubmissionTicket>) {
        let Some(image) = self.image.as_ref() else {
            warn!("nothing to submit, no image selected");
            return (self, None);
        };
        let id = self.next_submission;
        let ticket = SubmissionTicket { id, upload: ImageUpload::from(image) };
        info!("submitting {} for detection ({id})", image.file_name);
        let next = AnnotationState {
            phase: ViewPhase::AwaitingResponse,
            pending: Some(id),
            next_submission: id.successor(),
            last_error: None,
            ..self
        };
        (next, Some(ticket))
    }

    /// Applies the outcome of submission `id`.
    ///
    /// Responses for anything but the submission currently awaited are dropped. A failure is
    /// logged and leaves the boxes as they were; the loading flag is cleared either way.
    pub fn complete_submission(
        self,
        id: SubmissionId,
        outcome: Result<Vec<Detection>, DetectionError>,
    ) -> Self {
        if self.pending != Some(id) {
            debug!("discarding response for stale submission {id}");
            return self;
        }
        match outcome {
            Ok(detections) => {
                let boxes = render_boxes(&detections);
                info!("submission {id} returned {} boxes", boxes.len());
                AnnotationState {
                    displayed_boxes: boxes.clone(),
                    all_boxes: boxes,
                    boxes_visible: true,
                    phase: ViewPhase::BoxesAvailable,
                    detected: true,
                    pending: None,
                    last_error: None,
                    ..self
                }
            }
            Err(err) => {
                error!("submission {id} failed: {err}");
                let phase = if self.detected {
                    ViewPhase::BoxesAvailable
                } else {
                    ViewPhase::ImageSelected
                };
                AnnotationState {
                    phase,
                    pending: None,
                    last_error: Some(err.to_string()),
                    ..self
                }
            }
        }
    }

    /// Shows all boxes or none. The full set is never touched.
    pub fn toggle_display(self, visible: bool) -> Self {
        let displayed_boxes = if visible { self.all_boxes.clone() } else { Vec::new() };
        debug!("boxes {}", if visible { "shown" } else { "hidden" });
        AnnotationState {
            displayed_boxes,
            boxes_visible: visible,
            ..self
        }
    }

    /// Draws every box in `color` from now on.
    pub fn pick_color(self, color: BoxColor) -> Self {
        debug!("box color set to {color}");
        AnnotationState {
            style: self.style.with_color(color),
            ..self
        }
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn all_boxes(&self) -> &[RenderBox] {
        &self.all_boxes
    }

    pub fn displayed_boxes(&self) -> &[RenderBox] {
        &self.displayed_boxes
    }

    /// The count shown next to the image: every box from the last successful detection,
    /// visible or not.
    pub fn box_count(&self) -> usize {
        self.all_boxes.len()
    }

    pub fn boxes_visible(&self) -> bool {
        self.boxes_visible
    }

    pub fn style(&self) -> BoxStyle {
        self.style
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// The visibility toggle only does something once the current image has been detected.
    pub fn toggle_enabled(&self) -> bool {
        self.detected
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
