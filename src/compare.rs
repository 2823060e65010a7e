use crate::{
    error::Error,
    extract::extract_keypoints,
    feedback::{self, Deviation},
    frame::Frame,
    normalize::{normalize_keypoints, NormalizeShape},
    similarity::{keypoints_similarity, DistanceMap},
};
use serde::Serialize;
use std::fmt;
use tracing::{debug, instrument};

const DEFAULT_SIMILARITY_HIGH: &str = "0.9";
const DEFAULT_SIMILARITY_LOW: &str = "0.75";
const DEFAULT_KEYPOINT_DISTANCE: &str = "0.3";

#[derive(Debug, Clone, Copy, PartialEq, structopt::StructOpt)]
pub(crate) struct Thresholds {
    /// Similarity above which an action counts as perfect.
    #[structopt(long, default_value = DEFAULT_SIMILARITY_HIGH)]
    pub(crate) similarity_high: f64,

    /// Similarity above which per-joint feedback is given; anything lower is a mismatch.
    #[structopt(long, default_value = DEFAULT_SIMILARITY_LOW)]
    pub(crate) similarity_low: f64,

    /// Absolute signed distance above which a checked joint is reported.
    #[structopt(long, default_value = DEFAULT_KEYPOINT_DISTANCE)]
    pub(crate) keypoint_distance: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            similarity_high: DEFAULT_SIMILARITY_HIGH.parse().unwrap(),
            similarity_low: DEFAULT_SIMILARITY_LOW.parse().unwrap(),
            keypoint_distance: DEFAULT_KEYPOINT_DISTANCE.parse().unwrap(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Verdict {
    PerfectAction,
    NeedsReview,
    ActionMismatch,
}

impl Thresholds {
    pub(crate) fn classify(&self, score: f64) -> Verdict {
        if score > self.similarity_high {
            Verdict::PerfectAction
        } else if score > self.similarity_low {
            Verdict::NeedsReview
        } else {
            Verdict::ActionMismatch
        }
    }
}

/// Score a detection against a critical annotation frame.
///
/// Frames are validated before any keypoint is read: the annotation must be
/// critical, and neither frame may hold more than one person.
#[instrument(skip(annotation, detection, class_names))]
pub(crate) fn keypoints_compare<S>(
    annotation: &Frame,
    detection: &Frame,
    class_names: &[S],
    shape: NormalizeShape,
) -> Result<(f64, DistanceMap), Error>
where
    S: AsRef<str>,
{
    if !annotation.is_critical() {
        return Err(Error::NotCriticalFrame);
    }

    let (annotation_persons, detection_persons) =
        (annotation.person_count(), detection.person_count());
    if annotation_persons > 1 || detection_persons > 1 {
        return Err(Error::MultiPersonFrame {
            annotation: annotation_persons,
            detection: detection_persons,
        });
    }

    let gt_keypoints = extract_keypoints(annotation, class_names)?;
    let pred_keypoints = extract_keypoints(detection, class_names)?;

    let gt_keypoints = normalize_keypoints(&gt_keypoints, shape)?;
    let pred_keypoints = normalize_keypoints(&pred_keypoints, shape)?;

    let (score, distances) =
        keypoints_similarity(&pred_keypoints, &gt_keypoints, shape, class_names)?;
    debug!(message = "compared keypoints", score, joints = distances.len());
    Ok((score, distances))
}

/// The outcome of comparing one detection with its annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Report {
    pub(crate) score: f64,
    pub(crate) verdict: Verdict,
    pub(crate) distances: DistanceMap,
    pub(crate) deviations: Vec<Deviation>,
}

/// Compare, classify the score, and collect joint feedback when the score
/// falls between the two similarity thresholds.
pub(crate) fn evaluate<S>(
    annotation: &Frame,
    detection: &Frame,
    class_names: &[S],
    shape: NormalizeShape,
    thresholds: &Thresholds,
) -> Result<Report, Error>
where
    S: AsRef<str>,
{
    let (score, distances) = keypoints_compare(annotation, detection, class_names, shape)?;
    let verdict = thresholds.classify(score);
    let deviations = match verdict {
        Verdict::NeedsReview => feedback::person_action_check(&distances, annotation, thresholds)?,
        Verdict::PerfectAction | Verdict::ActionMismatch => Vec::new(),
    };
    Ok(Report {
        score,
        verdict,
        distances,
        deviations,
    })
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "human pose similarity score: {:?}", self.score)?;

        writeln!(f)?;
        writeln!(f, "Keypoints distance:")?;
        for (joint, distance) in self.distances.iter() {
            writeln!(f, "{}: {:?}", joint, distance)?;
        }

        writeln!(f)?;
        writeln!(f, "Action feedback:")?;
        match self.verdict {
            Verdict::PerfectAction => writeln!(f, "perfect action"),
            Verdict::NeedsReview => self
                .deviations
                .iter()
                .try_for_each(|deviation| writeln!(f, "{}", deviation)),
            Verdict::ActionMismatch => writeln!(f, "action mismatch"),
        }
    }
}
