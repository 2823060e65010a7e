use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("annotation frame is not marked critical")]
    NotCriticalFrame,

    #[error(
        "expected at most one person per frame, got {annotation} in annotation and {detection} in detection"
    )]
    MultiPersonFrame { annotation: usize, detection: usize },

    #[error("keypoint count mismatch: expected {expected}, got {got}")]
    KeypointCountMismatch { expected: usize, got: usize },

    #[error("no variance table for {0} keypoints, expected 16 or 17")]
    UnsupportedKeypointCount(usize),

    #[error("cannot take the sign of {0}")]
    InvalidSignInput(f64),

    #[error("failed to construct NotNan from f64: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f64),

    #[error("failed to convert usize value to keypoint kind: {0}")]
    ConvertUSizeToKeypointKind(usize),

    #[error("cannot bound an empty keypoint set")]
    EmptyKeypointSet,

    #[error("square box around keypoints has no usable side length: {0:?}")]
    DegenerateSquareBox(crate::normalize::BoundingBox<f64>),

    #[error("shape {0:?} has no points")]
    EmptyShapePoints(String),

    #[error("no distance recorded for checked joint {0:?}")]
    MissingDistance(String),

    #[error("failed to open class names file: {1:?}")]
    OpenClassNames(#[source] std::io::Error, PathBuf),

    #[error("failed to read class names file: {1:?}")]
    ReadClassNames(#[source] std::io::Error, PathBuf),

    #[error("class names list is empty")]
    EmptyClassNames,

    #[error("duplicate class name: {0:?}")]
    DuplicateClassName(String),

    #[error("failed to open frame file: {1:?}")]
    OpenFrame(#[source] std::io::Error, PathBuf),

    #[error("failed to parse frame json")]
    ParseFrame(#[source] serde_json::Error),

    #[error("normalize shape must be formatted as <height>x<width>, got {0:?}")]
    ParseNormalizeShape(String),

    #[error("failed to parse normalize shape dimension {1:?}")]
    ParseNormalizeDim(#[source] std::num::ParseIntError, String),

    #[error("normalize shape dimensions must be positive, got {0}x{1}")]
    ZeroNormalizeDim(u32, u32),
}
