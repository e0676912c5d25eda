use crate::annotation_view::state::AnnotationState;
use crate::detection_client::detection_endpoint::DetectionEndpoint;
use crate::image_utils::color::{BoxColor, BoxStyle};
use crate::image_utils::image_io::{ImageIoError, load_selected_image};
use std::mem;
use std::path::Path;

/// Wires an [`AnnotationState`] to a detection endpoint.
///
/// Each method is one user event and runs to completion before the next.
pub struct AnnotationView<E: DetectionEndpoint> {
    endpoint: E,
    state: AnnotationState,
}

impl<E: DetectionEndpoint> AnnotationView<E> {
    pub fn new(endpoint: E, style: BoxStyle) -> Self {
        AnnotationView {
            endpoint,
            state: AnnotationState::new(style),
        }
    }

    fn apply(&mut self, handler: impl FnOnce(AnnotationState) -> AnnotationState) {
        let state = mem::take(&mut self.state);
        self.state = handler(state);
    }

    /// Loads and selects the file at `path`. `None` leaves the view as it is.
    ///
    /// A file that can't be read or decoded is reported and nothing changes.
    pub fn select_image(&mut self, path: Option<&Path>) -> Result<(), ImageIoError> {
        let image = path.map(load_selected_image).transpose()?;
        self.apply(|state| state.select_image(image));
        Ok(())
    }

    /// Sends the current image to the endpoint and applies the answer.
    ///
    /// Failures end up in the log and in [`AnnotationState::last_error`]; they are not returned.
    pub fn submit_for_detection(&mut self) {
        let (state, ticket) = mem::take(&mut self.state).begin_submission();
        self.state = state;
        let Some(ticket) = ticket else {
            return;
        };
        let outcome = self.endpoint.detect(&ticket.upload);
        self.apply(|state| state.complete_submission(ticket.id, outcome));
    }

    pub fn toggle_display(&mut self, visible: bool) {
        self.apply(|state| state.toggle_display(visible));
    }

    pub fn pick_color(&mut self, color: BoxColor) {
        self.apply(|state| state.pick_color(color));
    }

    pub fn state(&self) -> &AnnotationState {
        &self.state
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation_view::state::ViewPhase;
    use crate::annotations::center_box::CenterBox;
    use crate::annotations::detection::Detection;
    use crate::detection_client::detection_endpoint::{DetectionError, ImageUpload};
    use image::RgbImage;
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Answers with canned outcomes, in order, and records what it was sent.
    struct CannedEndpoint {
        outcomes: RefCell<Vec<Result<Vec<Detection>, DetectionError>>>,
        uploads: RefCell<Vec<ImageUpload>>,
    }

    impl CannedEndpoint {
        fn new(mut outcomes: Vec<Result<Vec<Detection>, DetectionError>>) -> Self {
            outcomes.reverse();
            CannedEndpoint {
                outcomes: RefCell::new(outcomes),
                uploads: RefCell::new(Vec::new()),
            }
        }
    }

    impl DetectionEndpoint for CannedEndpoint {
        fn detect(&self, upload: &ImageUpload) -> Result<Vec<Detection>, DetectionError> {
            self.uploads.borrow_mut().push(upload.clone());
            self.outcomes
                .borrow_mut()
                .pop()
                .unwrap_or(Err(DetectionError::UnexpectedStatus { status: 503 }))
        }
    }

    fn write_image(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbImage::new(40, 30).save(&path).unwrap();
        path
    }

    fn vertebra(xc: f64, yc: f64) -> Detection {
        Detection {
            label: "vertebra".to_string(),
            confidence: Some(0.8),
            center_box: CenterBox::new(xc, yc, 10.0, 6.0).unwrap(),
        }
    }

    #[test]
    fn full_cycle_with_toggle_and_color() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "spine.png");
        let endpoint = CannedEndpoint::new(vec![Ok(vec![vertebra(20.0, 15.0), vertebra(30.0, 20.0)])]);
        let mut view = AnnotationView::new(endpoint, BoxStyle::default());

        view.select_image(Some(&path)).unwrap();
        assert_eq!(view.state().phase(), ViewPhase::ImageSelected);
        view.submit_for_detection();
        assert_eq!(view.state().box_count(), 2);
        assert_eq!(view.state().all_boxes()[0].as_tuple(), (15.0, 12.0, 10.0, 6.0));

        view.toggle_display(false);
        assert!(view.state().displayed_boxes().is_empty());
        view.toggle_display(true);
        assert_eq!(view.state().displayed_boxes().len(), 2);

        let red = BoxColor::rgb(255, 0, 0);
        view.pick_color(red);
        assert_eq!(view.state().style().normal, red);

        let uploads = view.endpoint().uploads.borrow();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].file_name, "spine.png");
        assert_eq!(uploads[0].mime_type, "image/png");
    }

    #[test]
    fn failed_submission_can_be_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "spine.png");
        let endpoint = CannedEndpoint::new(vec![
            Err(DetectionError::UnexpectedStatus { status: 500 }),
            Ok(vec![vertebra(20.0, 15.0)]),
        ]);
        let mut view = AnnotationView::new(endpoint, BoxStyle::default());
        view.select_image(Some(&path)).unwrap();

        view.submit_for_detection();
        assert!(!view.state().is_loading());
        assert_eq!(view.state().phase(), ViewPhase::ImageSelected);
        assert!(view.state().last_error().is_some());

        view.submit_for_detection();
        assert_eq!(view.state().box_count(), 1);
        assert!(view.state().last_error().is_none());
    }

    #[test]
    fn unreadable_file_leaves_state_alone() {
        let endpoint = CannedEndpoint::new(vec![]);
        let mut view = AnnotationView::new(endpoint, BoxStyle::default());
        assert!(view.select_image(Some(Path::new("/no/such/file.png"))).is_err());
        assert_eq!(view.state().phase(), ViewPhase::NoImage);
        view.select_image(None).unwrap();
        assert_eq!(view.state().phase(), ViewPhase::NoImage);
    }

    #[test]
    fn submitting_without_image_never_calls_endpoint() {
        let endpoint = CannedEndpoint::new(vec![]);
        let mut view = AnnotationView::new(endpoint, BoxStyle::default());
        view.submit_for_detection();
        assert!(view.endpoint().uploads.borrow().is_empty());
    }
}
