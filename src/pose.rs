use crate::error::Error;
use ordered_float::NotNan;
use std::{cmp::Ordering, ops::Sub};

/// The MSCOCO person keypoints, in dataset order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, num_derive::FromPrimitive)]
pub(crate) enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

pub(crate) const NUM_KEYPOINTS: usize = 17;

impl KeypointKind {
    /// Label used for this joint in class lists and annotation shapes.
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }

    /// Per-keypoint OKS sigma from the MSCOCO evaluation.
    pub(crate) fn sigma(self) -> f64 {
        match self {
            Self::Nose => 0.026,
            Self::LeftEye | Self::RightEye => 0.025,
            Self::LeftEar | Self::RightEar => 0.035,
            Self::LeftShoulder | Self::RightShoulder => 0.079,
            Self::LeftElbow | Self::RightElbow => 0.072,
            Self::LeftWrist | Self::RightWrist => 0.062,
            Self::LeftHip | Self::RightHip => 0.107,
            Self::LeftKnee | Self::RightKnee => 0.087,
            Self::LeftAnkle | Self::RightAnkle => 0.089,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// The placeholder for a missing or rejected keypoint.
    pub(crate) const INVALID: Self = Self { x: 0.0, y: 0.0 };

    pub(crate) fn new(x: f64, y: f64) -> Result<Self, Error> {
        Ok(Self {
            x: NotNan::new(x)
                .map_err(|e| Error::ConstructNotNan(e, x))?
                .into_inner(),
            y: NotNan::new(y)
                .map_err(|e| Error::ConstructNotNan(e, y))?
                .into_inner(),
        })
    }

    /// A keypoint counts as present only when both coordinates are strictly positive.
    #[inline]
    pub(crate) fn is_valid(self) -> bool {
        self.x > 0.0 && self.y > 0.0
    }

    #[inline]
    pub(crate) fn x(self) -> f64 {
        self.x
    }

    #[inline]
    pub(crate) fn y(self) -> f64 {
        self.y
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Keypoints aligned to a class name list: index `i` belongs to class `i`.
pub(crate) type KeypointSet = Vec<Point>;

/// Sign of `value`, with zero counted as positive.
pub(crate) fn sign(value: f64) -> Result<f64, Error> {
    match value.partial_cmp(&0.0) {
        Some(Ordering::Greater) | Some(Ordering::Equal) => Ok(1.0),
        Some(Ordering::Less) => Ok(-1.0),
        None => Err(Error::InvalidSignInput(value)),
    }
}
