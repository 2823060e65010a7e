use crate::{
    error::Error,
    frame::Frame,
    pose::{KeypointSet, Point},
};

/// Collect one keypoint per class name, in class order.
///
/// Every shape whose label matches a class contributes its first point, and
/// a class with no matching shape is filled with [`Point::INVALID`]. The fill
/// decision compares a running count against the class position, so a label
/// that appears twice pushes the count ahead for good and the final length
/// check fails.
pub(crate) fn extract_keypoints<S>(frame: &Frame, class_names: &[S]) -> Result<KeypointSet, Error>
where
    S: AsRef<str>,
{
    let mut keypoints = Vec::with_capacity(class_names.len());
    let mut class_count = 0;

    for (i, class_name) in class_names.iter().enumerate() {
        for shape in frame
            .shapes
            .iter()
            .filter(|shape| shape.label == class_name.as_ref())
        {
            keypoints.push(shape.first_point()?);
            class_count += 1;
        }
        if class_count != i + 1 {
            keypoints.push(Point::INVALID);
            class_count += 1;
        }
    }

    if class_count != class_names.len() {
        return Err(Error::KeypointCountMismatch {
            expected: class_names.len(),
            got: class_count,
        });
    }
    Ok(keypoints)
}

#[cfg(test)]
mod tests {
    use super::extract_keypoints;
    use crate::{error::Error, frame::Frame, pose::Point};

    const CLASSES: [&str; 3] = ["nose", "left_eye", "right_eye"];

    fn frame(json: &str) -> Frame {
        json.parse().unwrap()
    }

    #[test]
    fn aligns_to_class_order() {
        let frame = frame(
            r#"{"shapes": [
                {"label": "right_eye", "points": [[30, 3]]},
                {"label": "person", "points": [[0, 0], [100, 100]]},
                {"label": "nose", "points": [[10, 1], [99, 99]]},
                {"label": "left_eye", "points": [[20, 2]]}
            ]}"#,
        );
        let keypoints = extract_keypoints(&frame, &CLASSES).unwrap();
        assert_eq!(
            keypoints,
            vec![
                Point::new(10.0, 1.0).unwrap(),
                Point::new(20.0, 2.0).unwrap(),
                Point::new(30.0, 3.0).unwrap(),
            ]
        );
    }

    #[test]
    fn missing_labels_are_zero_filled() {
        let frame = frame(r#"{"shapes": [{"label": "left_eye", "points": [[20, 2]]}]}"#);
        let keypoints = extract_keypoints(&frame, &CLASSES).unwrap();
        assert_eq!(
            keypoints,
            vec![Point::INVALID, Point::new(20.0, 2.0).unwrap(), Point::INVALID]
        );
    }

    #[test]
    fn duplicate_label_desynchronizes_count() {
        let frame = frame(
            r#"{"shapes": [
                {"label": "nose", "points": [[10, 1]]},
                {"label": "nose", "points": [[11, 1]]},
                {"label": "right_eye", "points": [[30, 3]]}
            ]}"#,
        );
        // once ahead, every later class also gets a zero fill
        let err = extract_keypoints(&frame, &CLASSES).unwrap_err();
        assert!(matches!(
            err,
            Error::KeypointCountMismatch {
                expected: 3,
                got: 6
            }
        ));
    }

    #[test]
    fn empty_frame() {
        let keypoints = extract_keypoints(&Frame::default(), &CLASSES).unwrap();
        assert_eq!(keypoints, vec![Point::INVALID; 3]);
    }
}
