use crate::annotations::bounding_box::BoxError;
use crate::annotations::center_box::CenterBox;
use crate::annotations::yolo_label::{LabelError, YoloLabel, label_path_for_image, read_yolo_labels};
use crate::evaluation::mask_overlap::mask_overlap_score;
use crate::image_utils::color::BoxColor;
use crate::image_utils::image_io::{ImageIoError, read_image_as_rgba8, write_rgba8};
use crate::image_utils::overlay::draw_boxes;
use image::ImageFormat;
use itertools::Itertools;
use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(thiserror::Error, Debug)]
pub enum EvaluationError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read dimensions of {path}: {source}")]
    Dimensions {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error(transparent)]
    Image(#[from] ImageIoError),
    #[error(transparent)]
    InvalidBox(#[from] BoxError),
}

/// Where labels live and how comparison overlays are drawn.
#[derive(Clone, Debug)]
pub struct EvaluationOptions {
    /// Ground-truth label directory, relative to each image's directory.
    pub ground_truth_dir: PathBuf,
    /// Predicted label directory, relative to each image's directory.
    pub prediction_dir: PathBuf,
    /// When set, a comparison overlay for every image is written here.
    pub overlay_dir: Option<PathBuf>,
    pub ground_truth_color: BoxColor,
    pub prediction_color: BoxColor,
    pub line_thickness: u32,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        EvaluationOptions {
            ground_truth_dir: PathBuf::from("../labels"),
            prediction_dir: PathBuf::from("../predictions"),
            overlay_dir: None,
            ground_truth_color: BoxColor::rgb(255, 0, 0),
            prediction_color: BoxColor::rgb(0, 255, 0),
            line_thickness: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageScore {
    pub image_path: PathBuf,
    pub ground_truth_count: usize,
    pub prediction_count: usize,
    pub score: f64,
}

/// Reads a file with one image path per line. Blank lines are skipped.
pub fn read_image_list(filepath: &Path) -> Result<Vec<PathBuf>, EvaluationError> {
    let text = fs::read_to_string(filepath).map_err(|source| EvaluationError::Read {
        path: filepath.to_path_buf(),
        source,
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Every file under `dir` whose extension is a known image format, sorted by path.
pub fn collect_images_in_dir(dir: &Path) -> Result<Vec<PathBuf>, EvaluationError> {
    let mut images = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|source| EvaluationError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && ImageFormat::from_path(entry.path()).is_ok() {
            images.push(entry.into_path());
        }
    }
    images.sort();
    Ok(images)
}

fn normalized_boxes(labels: &[YoloLabel]) -> Vec<CenterBox> {
    labels.iter().map(|label| label.normalized).collect()
}

fn pixel_boxes(labels: &[YoloLabel], width: u32, height: u32) -> Result<Vec<CenterBox>, BoxError> {
    labels
        .iter()
        .map(|label| label.to_pixel_center_box(width, height))
        .collect()
}

fn write_comparison_overlay(
    image_path: &Path,
    ground_truth: &[YoloLabel],
    predicted: &[YoloLabel],
    overlay_dir: &Path,
    options: &EvaluationOptions,
) -> Result<(), EvaluationError> {
    let image = read_image_as_rgba8(image_path)?;
    let (width, height) = image.dimensions();
    let image = draw_boxes(
        image,
        &pixel_boxes(ground_truth, width, height)?,
        options.ground_truth_color,
        options.line_thickness,
    );
    let image = draw_boxes(
        image,
        &pixel_boxes(predicted, width, height)?,
        options.prediction_color,
        options.line_thickness,
    );
    fs::create_dir_all(overlay_dir).map_err(|source| EvaluationError::Write {
        path: overlay_dir.to_path_buf(),
        source,
    })?;
    let stem = image_path.file_stem().unwrap_or_default().to_string_lossy();
    let overlay_path = overlay_dir.join(format!("{stem}_overlay.png"));
    debug!("writing overlay {}", overlay_path.display());
    write_rgba8(&image, &overlay_path)?;
    Ok(())
}

/// Scores one image's predicted labels against its ground-truth labels.
pub fn evaluate_image(
    image_path: &Path,
    options: &EvaluationOptions,
) -> Result<ImageScore, EvaluationError> {
    let (width, height) =
        image::image_dimensions(image_path).map_err(|source| EvaluationError::Dimensions {
            path: image_path.to_path_buf(),
            source,
        })?;
    let ground_truth = read_yolo_labels(&label_path_for_image(image_path, &options.ground_truth_dir))?;
    let predicted = read_yolo_labels(&label_path_for_image(image_path, &options.prediction_dir))?;
    let score = mask_overlap_score(
        width,
        height,
        &normalized_boxes(&ground_truth),
        &normalized_boxes(&predicted),
    );
    if let Some(overlay_dir) = &options.overlay_dir {
        write_comparison_overlay(image_path, &ground_truth, &predicted, overlay_dir, options)?;
    }
    Ok(ImageScore {
        image_path: image_path.to_path_buf(),
        ground_truth_count: ground_truth.len(),
        prediction_count: predicted.len(),
        score,
    })
}

pub fn evaluate_images(
    images: &[PathBuf],
    options: &EvaluationOptions,
) -> Result<Vec<ImageScore>, EvaluationError> {
    info!("N images = {}", images.len());
    images
        .iter()
        .map(|image_path| {
            let score = evaluate_image(image_path, options)?;
            debug!("{} -> {:.4}", image_path.display(), score.score);
            Ok(score)
        })
        .collect()
}

/// `path,score` per line, in input order.
pub fn format_scores_csv(scores: &[ImageScore]) -> String {
    scores
        .iter()
        .map(|s| format!("{},{:?}\n", s.image_path.display(), s.score))
        .join("")
}

pub fn write_scores_csv(scores: &[ImageScore], output_path: &Path) -> Result<(), EvaluationError> {
    fs::write(output_path, format_scores_csv(scores)).map_err(|source| EvaluationError::Write {
        path: output_path.to_path_buf(),
        source,
    })
}

pub fn mean_score(scores: &[ImageScore]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().map(|s| s.score).sum::<f64>() / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    /// Lays out `images/<name>.png`, `labels/<name>.txt` and `predictions/<name>.txt`.
    fn dataset(root: &Path, name: &str, gt: &str, pred: &str) -> PathBuf {
        for dir in ["images", "labels", "predictions"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        let image_path = root.join("images").join(format!("{name}.png"));
        RgbImage::new(10, 10).save(&image_path).unwrap();
        fs::write(root.join("labels").join(format!("{name}.txt")), gt).unwrap();
        fs::write(root.join("predictions").join(format!("{name}.txt")), pred).unwrap();
        image_path
    }

    #[test]
    fn evaluates_against_sibling_label_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let image = dataset(dir.path(), "a", "0 0.25 0.5 0.5 1.0\n", "0 0.5 0.5 0.5 1.0\n");
        let score = evaluate_image(&image, &EvaluationOptions::default()).unwrap();
        assert_eq!(score.ground_truth_count, 1);
        assert_eq!(score.prediction_count, 1);
        approx::assert_relative_eq!(score.score, 3.0 / 7.0);
    }

    #[test]
    fn missing_prediction_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let image = dataset(dir.path(), "a", "0 0.5 0.5 0.5 0.5\n", "");
        fs::remove_file(dir.path().join("predictions/a.txt")).unwrap();
        assert!(matches!(
            evaluate_image(&image, &EvaluationOptions::default()),
            Err(EvaluationError::Label(LabelError::Read { .. }))
        ));
    }

    #[test]
    fn writes_csv_and_overlays() {
        let dir = tempfile::tempdir().unwrap();
        let a = dataset(dir.path(), "a", "0 0.5 0.5 0.4 0.4\n", "0 0.5 0.5 0.4 0.4\n");
        let b = dataset(dir.path(), "b", "0 0.2 0.2 0.2 0.2\n", "0 0.8 0.8 0.2 0.2\n");
        let list = dir.path().join("images.txt");
        fs::write(&list, format!("{}\n\n{}\n", a.display(), b.display())).unwrap();

        let overlay_dir = dir.path().join("overlays");
        let options = EvaluationOptions {
            overlay_dir: Some(overlay_dir.clone()),
            ..EvaluationOptions::default()
        };
        let images = read_image_list(&list).unwrap();
        assert_eq!(images, vec![a.clone(), b.clone()]);
        let scores = evaluate_images(&images, &options).unwrap();
        assert_eq!(mean_score(&scores), Some(0.5));

        let csv_path = dir.path().join("out.csv");
        write_scores_csv(&scores, &csv_path).unwrap();
        let csv = fs::read_to_string(&csv_path).unwrap();
        assert_eq!(csv, format!("{},1.0\n{},0.0\n", a.display(), b.display()));
        assert!(overlay_dir.join("a_overlay.png").exists());
        assert!(overlay_dir.join("b_overlay.png").exists());
    }

    #[test]
    fn collects_only_image_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dataset(dir.path(), "a", "", "");
        let b = dataset(dir.path(), "b", "", "");
        let images = collect_images_in_dir(&dir.path().join("images")).unwrap();
        assert_eq!(images, vec![a, b]);
        let all = collect_images_in_dir(dir.path()).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean_score(&[]), None);
    }
}
