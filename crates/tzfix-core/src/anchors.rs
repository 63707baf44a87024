use chrono::{DateTime, Utc};

use crate::asset::{Asset, Coordinates};

/// An asset with a parseable capture time and native coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub time: DateTime<Utc>,
    pub coordinates: Coordinates,
    /// Index of the source asset in the batch.
    pub asset: usize,
}

/// An asset with a parseable capture time, in time order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedAsset {
    pub asset: usize,
    pub time: DateTime<Utc>,
    pub coordinates: Option<Coordinates>,
}

/// Time-ordered view of one batch.
///
/// Built once per batch and immutable afterwards. `anchors` is a subsequence
/// of `ordered`, so it is sorted by time with ties kept in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchView {
    ordered: Vec<TimedAsset>,
    anchors: Vec<Anchor>,
    unparseable: Vec<usize>,
}

impl BatchView {
    pub fn build(assets: &[Asset]) -> Self {
        let mut ordered = Vec::with_capacity(assets.len());
        let mut unparseable = Vec::new();

        for (idx, asset) in assets.iter().enumerate() {
            match asset.capture_time() {
                Some(time) => ordered.push(TimedAsset {
                    asset: idx,
                    time: time.with_timezone(&Utc),
                    coordinates: asset.coordinates(),
                }),
                None => unparseable.push(idx),
            }
        }

        // `sort_by_key` is stable: equal timestamps keep their arrival order.
        ordered.sort_by_key(|entry| entry.time);

        let anchors = ordered
            .iter()
            .filter_map(|entry| {
                entry.coordinates.map(|coordinates| Anchor {
                    time: entry.time,
                    coordinates,
                    asset: entry.asset,
                })
            })
            .collect();

        Self {
            ordered,
            anchors,
            unparseable,
        }
    }

    pub fn ordered(&self) -> &[TimedAsset] {
        &self.ordered
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Batch indices of assets whose capture time could not be parsed.
    pub fn unparseable(&self) -> &[usize] {
        &self.unparseable
    }

    pub fn len(&self) -> usize {
        self.ordered.len() + self.unparseable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
