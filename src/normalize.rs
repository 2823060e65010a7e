use crate::{
    error::Error,
    pose::{KeypointSet, Point},
};
use ordered_float::NotNan;
use std::{fmt, str::FromStr};
use tracing::trace;

const DEFAULT_NORMALIZE_SIDE: u32 = 256;

/// Size of the canonical frame keypoints are projected into, as `(height, width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NormalizeShape {
    pub(crate) height: u32,
    pub(crate) width: u32,
}

impl NormalizeShape {
    pub(crate) fn new(height: u32, width: u32) -> Result<Self, Error> {
        if height == 0 || width == 0 {
            return Err(Error::ZeroNormalizeDim(height, width));
        }
        Ok(Self { height, width })
    }

    pub(crate) fn area(self) -> f64 {
        f64::from(self.height) * f64::from(self.width)
    }
}

impl Default for NormalizeShape {
    fn default() -> Self {
        Self {
            height: DEFAULT_NORMALIZE_SIDE,
            width: DEFAULT_NORMALIZE_SIDE,
        }
    }
}

impl FromStr for NormalizeShape {
    type Err = Error;

    /// Parse `"<height>x<width>"`, e.g. `"256x192"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (height, width) = s
            .split_once('x')
            .ok_or_else(|| Error::ParseNormalizeShape(s.to_owned()))?;
        let parse_dim = |dim: &str| {
            dim.trim()
                .parse::<u32>()
                .map_err(|e| Error::ParseNormalizeDim(e, dim.to_owned()))
        };
        Self::new(parse_dim(height)?, parse_dim(width)?)
    }
}

impl fmt::Display for NormalizeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BoundingBox<T> {
    pub(crate) xmin: T,
    pub(crate) ymin: T,
    pub(crate) xmax: T,
    pub(crate) ymax: T,
}

impl BoundingBox<f64> {
    pub(crate) fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub(crate) fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

fn not_nan(value: f64) -> Result<NotNan<f64>, Error> {
    NotNan::new(value).map_err(|e| Error::ConstructNotNan(e, value))
}

/// Box around every keypoint, padded by one unit on each side.
///
/// Missing keypoints sit at the origin and are included, which stretches the
/// box toward `(0, 0)` whenever a joint is absent.
pub(crate) fn keypoint_bounding_box(keypoints: &[Point]) -> Result<BoundingBox<f64>, Error> {
    let xs = keypoints
        .iter()
        .map(|point| not_nan(point.x()))
        .collect::<Result<Vec<_>, _>>()?;
    let ys = keypoints
        .iter()
        .map(|point| not_nan(point.y()))
        .collect::<Result<Vec<_>, _>>()?;

    let min = |values: &[NotNan<f64>]| values.iter().min().map(|v| v.into_inner());
    let max = |values: &[NotNan<f64>]| values.iter().max().map(|v| v.into_inner());

    Ok(BoundingBox {
        xmin: min(&xs).ok_or(Error::EmptyKeypointSet)? - 1.0,
        ymin: min(&ys).ok_or(Error::EmptyKeypointSet)? - 1.0,
        xmax: max(&xs).ok_or(Error::EmptyKeypointSet)? + 1.0,
        ymax: max(&ys).ok_or(Error::EmptyKeypointSet)? + 1.0,
    })
}

/// Expand a box to a square around its center.
///
/// Corners are truncated toward zero first, then the center and half side
/// are floored, so both sides come out as the same even length. The math
/// stays in `f64` so arbitrarily large coordinates cannot overflow.
pub(crate) fn square_box(bbox: BoundingBox<f64>) -> BoundingBox<f64> {
    let xmin = bbox.xmin.trunc();
    let ymin = bbox.ymin.trunc();
    let xmax = bbox.xmax.trunc();
    let ymax = bbox.ymax.trunc();

    let center_x = ((xmin + xmax) / 2.0).floor();
    let center_y = ((ymin + ymax) / 2.0).floor();
    let half = ((xmax - xmin).max(ymax - ymin) / 2.0).floor();

    BoundingBox {
        xmin: center_x - half,
        ymin: center_y - half,
        xmax: center_x + half,
        ymax: center_y + half,
    }
}

/// Project keypoints into the canonical `shape` frame.
///
/// Valid keypoints are shifted to the square box origin and rescaled per
/// axis; anything that does not land strictly inside the positive quadrant
/// becomes [`Point::INVALID`].
pub(crate) fn normalize_keypoints(
    keypoints: &[Point],
    shape: NormalizeShape,
) -> Result<KeypointSet, Error> {
    let square = square_box(keypoint_bounding_box(keypoints)?);
    let usable = |side: f64| side.is_finite() && side > 0.0;
    if !usable(square.width()) || !usable(square.height()) {
        return Err(Error::DegenerateSquareBox(square));
    }
    let BoundingBox { xmin, ymin, .. } = square;

    // the target shape need not be square, so the two ratios can differ
    let resize_ratio_x = f64::from(shape.width) / square.width();
    let resize_ratio_y = f64::from(shape.height) / square.height();
    trace!(?square, resize_ratio_x, resize_ratio_y);

    keypoints
        .iter()
        .map(|&point| {
            if !point.is_valid() {
                return Ok(Point::INVALID);
            }
            let normalized = Point::new(
                (point.x() - xmin) * resize_ratio_x,
                (point.y() - ymin) * resize_ratio_y,
            )?;
            Ok(if normalized.is_valid() {
                normalized
            } else {
                Point::INVALID
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(coords: &[(f64, f64)]) -> Vec<Point> {
        coords
            .iter()
            .map(|&(x, y)| Point::new(x, y).unwrap())
            .collect()
    }

    mod normalize_shape_tests {
        use super::NormalizeShape;
        use crate::error::Error;

        #[test]
        fn parses_height_by_width() {
            let shape: NormalizeShape = "256x192".parse().unwrap();
            assert_eq!(
                shape,
                NormalizeShape {
                    height: 256,
                    width: 192
                }
            );
            assert_eq!(shape.to_string(), "256x192");
        }

        #[test]
        fn default_is_256_square() {
            assert_eq!(
                NormalizeShape::default(),
                "256x256".parse::<NormalizeShape>().unwrap()
            );
        }

        #[test]
        fn missing_separator() {
            assert!(matches!(
                "256".parse::<NormalizeShape>(),
                Err(Error::ParseNormalizeShape(_))
            ));
        }

        #[test]
        fn bad_dimension() {
            assert!(matches!(
                "256xabc".parse::<NormalizeShape>(),
                Err(Error::ParseNormalizeDim(..))
            ));
            assert!(matches!(
                "0x256".parse::<NormalizeShape>(),
                Err(Error::ZeroNormalizeDim(0, 256))
            ));
        }
    }

    mod square_box_tests {
        use super::*;
        use proptest::prelude::*;

        #[test]
        fn expands_shorter_side() {
            let bbox = keypoint_bounding_box(&points(&[(10.0, 20.0), (30.0, 60.0)])).unwrap();
            assert_eq!(
                bbox,
                BoundingBox {
                    xmin: 9.0,
                    ymin: 19.0,
                    xmax: 31.0,
                    ymax: 61.0
                }
            );
            assert_eq!(
                square_box(bbox),
                BoundingBox {
                    xmin: -1.0,
                    ymin: 19.0,
                    xmax: 41.0,
                    ymax: 61.0
                }
            );
        }

        #[test]
        fn missing_joint_pulls_box_to_origin() {
            let bbox = keypoint_bounding_box(&points(&[(0.0, 0.0), (10.0, 10.0)])).unwrap();
            assert_eq!(bbox.xmin, -1.0);
            assert_eq!(bbox.ymin, -1.0);
        }

        #[test]
        fn empty_set() {
            assert!(matches!(
                keypoint_bounding_box(&[]),
                Err(Error::EmptyKeypointSet)
            ));
        }

        proptest! {
            #[test]
            fn always_square(coords in prop::collection::vec((0.0f64..5000.0, 0.0f64..5000.0), 1..20)) {
                let square = square_box(keypoint_bounding_box(&points(&coords)).unwrap());
                prop_assert_eq!(square.width(), square.height());
                prop_assert!(square.width() >= 0.0);
            }
        }
    }

    mod normalize_keypoints_tests {
        use super::*;
        use assert_approx_eq::assert_approx_eq;

        #[test]
        fn scales_into_target_frame() {
            let normalized = normalize_keypoints(
                &points(&[(10.0, 20.0), (30.0, 60.0)]),
                NormalizeShape::default(),
            )
            .unwrap();
            let ratio = 256.0 / 42.0;
            assert_approx_eq!(normalized[0].x(), 11.0 * ratio);
            assert_approx_eq!(normalized[0].y(), 1.0 * ratio);
            assert_approx_eq!(normalized[1].x(), 31.0 * ratio);
            assert_approx_eq!(normalized[1].y(), 41.0 * ratio);
        }

        #[test]
        fn anisotropic_target() {
            let normalized = normalize_keypoints(
                &points(&[(10.0, 20.0), (30.0, 60.0)]),
                NormalizeShape::new(256, 128).unwrap(),
            )
            .unwrap();
            assert_approx_eq!(normalized[1].x(), 31.0 * 128.0 / 42.0);
            assert_approx_eq!(normalized[1].y(), 41.0 * 256.0 / 42.0);
        }

        #[test]
        fn invalid_keypoints_stay_invalid() {
            let normalized = normalize_keypoints(
                &points(&[(0.0, 0.0), (10.0, 10.0), (5.0, 0.0)]),
                NormalizeShape::default(),
            )
            .unwrap();
            assert_eq!(normalized[0], Point::INVALID);
            assert_eq!(normalized[2], Point::INVALID);
            assert_approx_eq!(normalized[1].x(), 11.0 * 256.0 / 12.0);
        }

        #[test]
        fn huge_coordinates_do_not_overflow() {
            let normalized = normalize_keypoints(
                &points(&[(100.0, 100.0), (1e19, 200.0)]),
                NormalizeShape::default(),
            )
            .unwrap();
            assert_eq!(normalized.len(), 2);
            assert!((normalized[1].x() - 256.0).abs() < 1.0);
            assert!(normalized[1].is_valid());
        }

        #[test]
        fn infinite_box_is_degenerate() {
            let err = normalize_keypoints(
                &points(&[(-f64::MAX, 1.0), (f64::MAX, 2.0)]),
                NormalizeShape::default(),
            )
            .unwrap_err();
            assert!(matches!(err, Error::DegenerateSquareBox(_)));
        }

        #[test]
        fn degenerate_square() {
            let err = normalize_keypoints(
                &points(&[(0.5, 0.5), (0.25, 0.75)]),
                NormalizeShape::default(),
            )
            .unwrap_err();
            assert!(matches!(err, Error::DegenerateSquareBox(_)));
        }
    }
}
