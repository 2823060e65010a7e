//! Typed records for labelme-style annotation and detection files.

use crate::{error::Error, pose::Point};
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path, str::FromStr};

/// Label of the shape outlining the whole person.
pub(crate) const PERSON_LABEL: &str = "person";

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Frame {
    #[serde(default)]
    pub(crate) flags: Option<FrameFlags>,
    #[serde(default)]
    pub(crate) shapes: Vec<Shape>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct FrameFlags {
    #[serde(default)]
    pub(crate) critical: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Shape {
    pub(crate) label: String,
    #[serde(default)]
    pub(crate) points: Vec<[f64; 2]>,
    #[serde(default)]
    pub(crate) flags: Option<ShapeFlags>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ShapeFlags {
    #[serde(default)]
    pub(crate) check: Option<bool>,
    #[serde(flatten)]
    pub(crate) other: serde_json::Map<String, serde_json::Value>,
}

impl ShapeFlags {
    fn is_empty(&self) -> bool {
        self.check.is_none() && self.other.is_empty()
    }
}

impl Frame {
    pub(crate) fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::OpenFrame(e, path.to_owned()))?;
        serde_json::from_reader(BufReader::new(file)).map_err(Error::ParseFrame)
    }

    /// Only frames the annotator explicitly marked critical are eligible for action checks.
    pub(crate) fn is_critical(&self) -> bool {
        self.flags
            .as_ref()
            .and_then(|flags| flags.critical)
            .unwrap_or(false)
    }

    pub(crate) fn person_count(&self) -> usize {
        self.shapes
            .iter()
            .filter(|shape| shape.label == PERSON_LABEL)
            .count()
    }

    /// Whether the joint labelled `label` is flagged for action checking.
    ///
    /// The first shape with that label and a non-empty flags mapping decides;
    /// a mapping without a `check` key reads as unchecked.
    pub(crate) fn needs_check(&self, label: &str) -> bool {
        self.shapes
            .iter()
            .filter(|shape| shape.label == label)
            .find_map(|shape| shape.flags.as_ref().filter(|flags| !flags.is_empty()))
            .and_then(|flags| flags.check)
            .unwrap_or(false)
    }
}

impl FromStr for Frame {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(Error::ParseFrame)
    }
}

impl Shape {
    /// The first point of the shape, which is the keypoint location for point shapes.
    pub(crate) fn first_point(&self) -> Result<Point, Error> {
        let &[x, y] = self
            .points
            .first()
            .ok_or_else(|| Error::EmptyShapePoints(self.label.clone()))?;
        Point::new(x, y)
    }
}
