use crate::annotations::center_box::CenterBox;
use crate::annotations::detection::Detection;
use crate::detection_client::detection_endpoint::DetectionError;
use itertools::Itertools;
use serde_json::Value;

fn malformed(index: usize, reason: &str) -> DetectionError {
    DetectionError::MalformedResponse(format!("detection {index}: {reason}"))
}

fn label_from(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_detection(index: usize, item: &Value) -> Result<Detection, DetectionError> {
    let Some(fields) = item.as_array().filter(|fields| fields.len() == 3) else {
        return Err(malformed(index, "expected a 3-element array"));
    };
    let (label, confidence, bbox) = (&fields[0], &fields[1], &fields[2]);
    let (x_center, y_center, width, height) = bbox
        .as_array()
        .ok_or_else(|| malformed(index, "box is not an array"))?
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| malformed(index, "box values must be numbers"))?
        .into_iter()
        .collect_tuple()
        .ok_or_else(|| malformed(index, "box must have exactly 4 values"))?;
    let center_box = CenterBox::new(x_center, y_center, width, height)
        .map_err(|e| malformed(index, &e.to_string()))?;
    Ok(Detection {
        label: label_from(label),
        confidence: confidence.as_f64(),
        center_box,
    })
}

/// Parses the detection service's JSON body.
///
/// The body is an array of `[label, confidence, [x_center, y_center, width, height]]`. One bad
/// entry rejects the whole response.
pub fn parse_detections(body: &str) -> Result<Vec<Detection>, DetectionError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| DetectionError::MalformedResponse(e.to_string()))?;
    let items = value
        .as_array()
        .ok_or_else(|| DetectionError::MalformedResponse("expected a JSON array".to_string()))?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_detection(index, item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_triples() {
        let dets = parse_detections(r#"[["vertebra", 0.97, [100, 50, 20, 10]], [3, null, [1.5, 2.5, 1, 1]]]"#)
            .unwrap();
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].label, "vertebra");
        assert_eq!(dets[0].confidence, Some(0.97));
        assert_eq!(dets[0].render_box().as_tuple(), (90.0, 45.0, 20.0, 10.0));
        assert_eq!(dets[1].label, "3");
        assert_eq!(dets[1].confidence, None);
    }

    #[test]
    fn empty_array_is_no_detections() {
        assert!(parse_detections("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_array_body() {
        assert!(matches!(
            parse_detections(r#"{"detections": []}"#),
            Err(DetectionError::MalformedResponse(_))
        ));
        assert!(matches!(parse_detections("not json"), Err(DetectionError::MalformedResponse(_))));
    }

    #[test]
    fn rejects_short_entries_and_bad_boxes() {
        for body in [
            r#"[["a", 0.5]]"#,
            r#"[["a", 0.5, [1, 2, 3]]]"#,
            r#"[["a", 0.5, [1, 2, 3, 4, 5]]]"#,
            r#"[["a", 0.5, [1, 2, "3", 4]]]"#,
            r#"[["a", 0.5, [1, 2, -3, 4]]]"#,
            r#"[["a", 0.5, {"x": 1}]]"#,
        ] {
            assert!(
                matches!(parse_detections(body), Err(DetectionError::MalformedResponse(_))),
                "{body} should be rejected"
            );
        }
    }
}
