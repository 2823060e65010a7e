//! OKS-style keypoint similarity with a signed per-joint distance.

use crate::{
    error::Error,
    normalize::NormalizeShape,
    pose::{self, KeypointKind, Point},
};
use num_traits::cast::FromPrimitive;
use serde::{Serialize, Serializer};
use std::iter::FromIterator;

/// Keeps the area term away from zero.
const AREA_EPSILON: f64 = 2.22e-16;

/// MPII annotations carry no per-joint sigma, so every joint uses this one.
const MPII_SIGMA: f64 = 0.0625;
const MPII_NUM_KEYPOINTS: usize = 16;

/// Per-joint variance `(2 * sigma)^2`, chosen by the number of keypoints.
pub(crate) fn variances(num_keypoints: usize) -> Result<Vec<f64>, Error> {
    let sigmas = match num_keypoints {
        MPII_NUM_KEYPOINTS => vec![MPII_SIGMA; MPII_NUM_KEYPOINTS],
        pose::NUM_KEYPOINTS => (0..pose::NUM_KEYPOINTS)
            .map(|i| {
                KeypointKind::from_usize(i)
                    .map(KeypointKind::sigma)
                    .ok_or(Error::ConvertUSizeToKeypointKind(i))
            })
            .collect::<Result<Vec<_>, _>>()?,
        n => return Err(Error::UnsupportedKeypointCount(n)),
    };
    Ok(sigmas
        .into_iter()
        .map(|sigma| (sigma * 2.0).powi(2))
        .collect())
}

/// Signed normalized distance per joint, in class order.
///
/// The magnitude is the OKS exponent for that joint; the sign is the sign of
/// the vertical offset (prediction minus ground truth), zero counted as positive.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DistanceMap(Vec<(String, f64)>);

impl DistanceMap {
    pub(crate) fn get(&self, joint: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == joint)
            .map(|&(_, distance)| distance)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, distance)| (name.as_str(), *distance))
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, f64)> for DistanceMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Serialize)]
struct JointDistance<'a> {
    joint: &'a str,
    distance: f64,
}

impl Serialize for DistanceMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(
            self.iter()
                .map(|(joint, distance)| JointDistance { joint, distance }),
        )
    }
}

/// Compare normalized predicted keypoints against normalized ground truth.
///
/// Returns the mean of `exp(-distance)` over ground-truth joints that are
/// present (zero when none are), along with the signed distance of every
/// joint. Joints missing from the ground truth still get a distance.
pub(crate) fn keypoints_similarity<S>(
    pred_keypoints: &[Point],
    gt_keypoints: &[Point],
    shape: NormalizeShape,
    class_names: &[S],
) -> Result<(f64, DistanceMap), Error>
where
    S: AsRef<str>,
{
    if pred_keypoints.len() != gt_keypoints.len() {
        return Err(Error::KeypointCountMismatch {
            expected: gt_keypoints.len(),
            got: pred_keypoints.len(),
        });
    }
    if class_names.len() != gt_keypoints.len() {
        return Err(Error::KeypointCountMismatch {
            expected: class_names.len(),
            got: gt_keypoints.len(),
        });
    }

    let variance = variances(gt_keypoints.len())?;
    let area = shape.area();

    let mut similarity = 0.0;
    let mut valid_count = 0_usize;
    let mut distances = Vec::with_capacity(gt_keypoints.len());

    for (((&pred, &gt), variance), class_name) in pred_keypoints
        .iter()
        .zip(gt_keypoints)
        .zip(variance)
        .zip(class_names)
    {
        let delta = pred - gt;
        let distance =
            (delta.x().powi(2) + delta.y().powi(2)) / (variance * (area + AREA_EPSILON) * 2.0);

        distances.push((
            class_name.as_ref().to_owned(),
            distance * pose::sign(delta.y())?,
        ));

        if gt.is_valid() {
            similarity += (-distance).exp();
            valid_count += 1;
        }
    }

    let score = if valid_count == 0 {
        0.0
    } else {
        similarity / valid_count as f64
    };
    Ok((score, DistanceMap(distances)))
}
