use crate::annotations::bounding_box::BoxError;
use crate::annotations::center_box::CenterBox;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum LabelError {
    #[error("failed to read label file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}:{line}: expected 5 fields `class xc yc w h`, found {found}")]
    FieldCount { path: PathBuf, line: usize, found: usize },
    #[error("{path}:{line}: `{value}` is not a number")]
    NotANumber { path: PathBuf, line: usize, value: String },
    #[error("{path}:{line}: {source}")]
    InvalidBox {
        path: PathBuf,
        line: usize,
        #[source]
        source: BoxError,
    },
}

/// One line of a YOLO label file.
///
/// Box coordinates are relative to the top-left of the image and normalised by the image width
/// and height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YoloLabel {
    pub class_id: f64,
    pub normalized: CenterBox,
}

impl YoloLabel {
    pub fn to_pixel_center_box(&self, image_width: u32, image_height: u32) -> Result<CenterBox, BoxError> {
        self.normalized.scaled(image_width as f64, image_height as f64)
    }
}

/// Reads every label in a YOLO `.txt` file. Blank lines are skipped.
pub fn read_yolo_labels(filepath: &Path) -> Result<Vec<YoloLabel>, LabelError> {
    let text = fs::read_to_string(filepath).map_err(|source| LabelError::Read {
        path: filepath.to_path_buf(),
        source,
    })?;
    parse_yolo_labels(&text, filepath)
}

pub fn parse_yolo_labels(text: &str, origin: &Path) -> Result<Vec<YoloLabel>, LabelError> {
    let mut labels = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 5 {
            return Err(LabelError::FieldCount {
                path: origin.to_path_buf(),
                line: line_number,
                found: fields.len(),
            });
        }
        let mut values = [0_f64; 5];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = field.parse().map_err(|_| LabelError::NotANumber {
                path: origin.to_path_buf(),
                line: line_number,
                value: field.to_string(),
            })?;
        }
        let normalized = CenterBox::new(values[1], values[2], values[3], values[4]).map_err(
            |source| LabelError::InvalidBox {
                path: origin.to_path_buf(),
                line: line_number,
                source,
            },
        )?;
        labels.push(YoloLabel { class_id: values[0], normalized });
    }
    Ok(labels)
}

/// Where the label file for `image_path` lives: `<image dir>/<relative_dir>/<stem>.txt`.
pub fn label_path_for_image(image_path: &Path, relative_dir: &Path) -> PathBuf {
    let image_dir = image_path.parent().unwrap_or(Path::new("."));
    let mut file_name = image_path.file_stem().unwrap_or_default().to_os_string();
    file_name.push(".txt");
    image_dir.join(relative_dir).join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_labels_and_skips_blank_lines() {
        let labels = parse_yolo_labels("0 0.5 0.5 0.2 0.1\n\n1 0.25 0.75 0.1 0.1\n", Path::new("x.txt"))
            .unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[1].class_id, 1.0);
        let pixel = labels[0].to_pixel_center_box(100, 200).unwrap();
        assert_eq!(pixel, CenterBox::new(50.0, 100.0, 20.0, 20.0).unwrap());
    }

    #[test]
    fn wrong_field_count_reports_line() {
        let err = parse_yolo_labels("0 0.5 0.5 0.2 0.1\n0 0.5 0.5\n", Path::new("x.txt")).unwrap_err();
        assert!(matches!(err, LabelError::FieldCount { line: 2, found: 3, .. }));
    }

    #[test]
    fn non_numeric_field_is_an_error() {
        let err = parse_yolo_labels("0 0.5 abc 0.2 0.1\n", Path::new("x.txt")).unwrap_err();
        assert!(matches!(err, LabelError::NotANumber { line: 1, .. }));
    }

    #[test]
    fn reads_labels_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0 0.1 0.2 0.3 0.4").unwrap();
        let labels = read_yolo_labels(file.path()).unwrap();
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = read_yolo_labels(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, LabelError::Read { .. }));
    }

    #[test]
    fn label_path_uses_relative_dir_and_stem() {
        let path = label_path_for_image(Path::new("/data/images/spine_01.png"), Path::new("../labels"));
        assert_eq!(path, PathBuf::from("/data/images/../labels/spine_01.txt"));
        let dotted = label_path_for_image(Path::new("scan.v2.jpg"), Path::new("preds"));
        assert_eq!(dotted, PathBuf::from("preds/scan.v2.txt"));
    }
}
