use crate::{
    compare::Thresholds,
    error::Error,
    frame::Frame,
    pose::{self, KeypointKind},
    similarity::DistanceMap,
};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BodyRegion {
    Arm,
    Hand,
    Leg,
    Foot,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Direction {
    Up,
    Down,
}

/// Joints checked for action feedback, in reporting order.
pub(crate) const CHECKED_JOINTS: [(KeypointKind, Side, BodyRegion); 8] = [
    (KeypointKind::LeftElbow, Side::Left, BodyRegion::Arm),
    (KeypointKind::RightElbow, Side::Right, BodyRegion::Arm),
    (KeypointKind::LeftWrist, Side::Left, BodyRegion::Hand),
    (KeypointKind::RightWrist, Side::Right, BodyRegion::Hand),
    (KeypointKind::LeftKnee, Side::Left, BodyRegion::Leg),
    (KeypointKind::RightKnee, Side::Right, BodyRegion::Leg),
    (KeypointKind::LeftAnkle, Side::Left, BodyRegion::Foot),
    (KeypointKind::RightAnkle, Side::Right, BodyRegion::Foot),
];

/// One body part that moved too far from the annotated pose.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Deviation {
    pub(crate) side: Side,
    pub(crate) region: BodyRegion,
    pub(crate) direction: Direction,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

impl fmt::Display for BodyRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Arm => "arm",
            Self::Hand => "hand",
            Self::Leg => "leg",
            Self::Foot => "foot",
        })
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
        })
    }
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}!", self.side, self.region, self.direction)
    }
}

impl Serialize for Deviation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Report every checked joint whose signed distance exceeds the threshold.
///
/// Only critical annotation frames produce feedback, and only joints whose
/// annotation shape carries `check: true` are looked at.
pub(crate) fn person_action_check(
    distances: &DistanceMap,
    annotation: &Frame,
    thresholds: &Thresholds,
) -> Result<Vec<Deviation>, Error> {
    if !annotation.is_critical() {
        return Ok(Vec::new());
    }

    let mut deviations = Vec::new();
    for &(kind, side, region) in CHECKED_JOINTS.iter() {
        let joint = kind.name();
        if !annotation.needs_check(joint) {
            continue;
        }
        let distance = distances
            .get(joint)
            .ok_or_else(|| Error::MissingDistance(joint.to_owned()))?;
        if distance.abs() <= thresholds.keypoint_distance {
            continue;
        }

        let direction = if pose::sign(distance)? > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        };
        debug!(message = "joint deviation", joint, distance, %direction);
        deviations.push(Deviation {
            side,
            region,
            direction,
        });
    }
    Ok(deviations)
}
