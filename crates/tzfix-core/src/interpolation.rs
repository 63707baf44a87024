use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::anchors::{Anchor, BatchView};
use crate::asset::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterpolationMethod {
    /// Closest anchor before or after the asset; ties go to the earlier one.
    #[default]
    NearestNeighbor,
    /// Latest anchor strictly before the asset.
    ForwardFill,
}

impl InterpolationMethod {
    pub fn tag(self) -> &'static str {
        match self {
            InterpolationMethod::NearestNeighbor => "NN",
            InterpolationMethod::ForwardFill => "FF",
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown interpolation method {0:?} (expected NN or FF)")]
pub struct ParseMethodError(String);

impl FromStr for InterpolationMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NN" => Ok(InterpolationMethod::NearestNeighbor),
            "FF" => Ok(InterpolationMethod::ForwardFill),
            _ => Err(ParseMethodError(s.to_string())),
        }
    }
}

/// Coordinates inferred for an asset that has none of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolation {
    pub coordinates: Coordinates,
    pub method: InterpolationMethod,
    /// Batch index of the anchor asset the coordinates were taken from.
    pub source_asset: usize,
    pub source_time: DateTime<Utc>,
}

/// Interpolation results keyed by batch index.
#[derive(Debug, Clone, Default)]
pub struct Interpolations {
    by_asset: HashMap<usize, Interpolation>,
}

impl Interpolations {
    pub fn get(&self, asset: usize) -> Option<&Interpolation> {
        self.by_asset.get(&asset)
    }

    pub fn len(&self) -> usize {
        self.by_asset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_asset.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Interpolation)> {
        self.by_asset.iter().map(|(idx, value)| (*idx, value))
    }
}

/// Infers coordinates for every timed asset lacking native ones.
///
/// Assets with native coordinates are never touched. A batch with no anchors
/// yields an empty result.
pub fn interpolate(view: &BatchView, method: InterpolationMethod) -> Interpolations {
    let anchors = view.anchors();
    let mut by_asset = HashMap::new();

    if anchors.is_empty() {
        debug!("no anchors in batch; skipping interpolation");
        return Interpolations { by_asset };
    }

    for entry in view.ordered() {
        if entry.coordinates.is_some() {
            continue;
        }
        if let Some(anchor) = select_anchor(anchors, entry.time, method) {
            by_asset.insert(
                entry.asset,
                Interpolation {
                    coordinates: anchor.coordinates,
                    method,
                    source_asset: anchor.asset,
                    source_time: anchor.time,
                },
            );
        }
    }

    debug!(
        method = %method,
        anchors = anchors.len(),
        inferred = by_asset.len(),
        "interpolation complete"
    );

    Interpolations { by_asset }
}

/// Picks the anchor used for an asset captured at `time`.
///
/// `anchors` must be sorted ascending by time.
pub fn select_anchor(
    anchors: &[Anchor],
    time: DateTime<Utc>,
    method: InterpolationMethod,
) -> Option<&Anchor> {
    // Leftmost index with anchor.time >= time.
    let idx = anchors.partition_point(|anchor| anchor.time < time);
    let before = idx.checked_sub(1).map(|i| &anchors[i]);

    match method {
        InterpolationMethod::ForwardFill => before,
        InterpolationMethod::NearestNeighbor => {
            let after = anchors.get(idx);
            match (before, after) {
                (Some(prev), Some(next)) => {
                    if next.time - time < time - prev.time {
                        Some(next)
                    } else {
                        Some(prev)
                    }
                }
                (prev, next) => prev.or(next),
            }
        }
    }
}
