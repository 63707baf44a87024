use std::fmt;

use chrono::{DateTime, SecondsFormat};
use chrono_tz::Tz;
use thiserror::Error;
use uuid::Uuid;

use crate::asset::{Asset, Coordinates};
use crate::catalog::AssetUpdate;
use crate::interpolation::{Interpolation, InterpolationMethod};
use crate::resolver::TimezoneResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoTimestamp,
    NoCoordinates,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoTimestamp => f.write_str("no timestamp"),
            SkipReason::NoCoordinates => f.write_str("no GPS"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecisionError {
    #[error("TZ lookup failed {coordinates}")]
    LookupFailed { coordinates: Coordinates },
    #[error("invalid TZ {0}")]
    UnknownTimeZone(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSource {
    Native,
    Interpolated(InterpolationMethod),
}

impl fmt::Display for CoordinateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateSource::Native => f.write_str("GPS"),
            CoordinateSource::Interpolated(method) => write!(f, "interpolated {method}"),
        }
    }
}

/// A correction waiting to be dispatched to the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    pub asset_id: Uuid,
    pub previous_time_zone: Option<String>,
    pub time_zone: Tz,
    /// The capture instant expressed in `time_zone`.
    pub local_time: DateTime<Tz>,
    pub coordinates: Coordinates,
    pub source: CoordinateSource,
}

impl PendingUpdate {
    pub fn time_zone_name(&self) -> &'static str {
        self.time_zone.name()
    }

    pub fn to_update(&self) -> AssetUpdate {
        AssetUpdate {
            date_time_original: self.local_time.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            time_zone: self.time_zone_name().to_string(),
            latitude: self.coordinates.latitude,
            longitude: self.coordinates.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Skip(SkipReason),
    AlreadyCorrect { time_zone: String },
    Pending(PendingUpdate),
    Fail(DecisionError),
}

/// Decides whether `asset`'s stored timezone needs correcting.
///
/// Native coordinates win over `interpolation`. The stored zone counts as
/// correct only when its identifier string-equals the resolved one; zones
/// that merely share an offset are still rewritten.
pub fn decide(
    asset: &Asset,
    interpolation: Option<&Interpolation>,
    resolver: &dyn TimezoneResolver,
) -> Decision {
    let Some(captured_at) = asset.capture_time() else {
        return Decision::Skip(SkipReason::NoTimestamp);
    };

    let (coordinates, source) = match (asset.coordinates(), interpolation) {
        (Some(native), _) => (native, CoordinateSource::Native),
        (None, Some(inferred)) => (
            inferred.coordinates,
            CoordinateSource::Interpolated(inferred.method),
        ),
        (None, None) => return Decision::Skip(SkipReason::NoCoordinates),
    };

    let Some(target) = resolver.resolve(coordinates.latitude, coordinates.longitude) else {
        return Decision::Fail(DecisionError::LookupFailed { coordinates });
    };

    let time_zone: Tz = match target.parse() {
        Ok(tz) => tz,
        Err(_) => return Decision::Fail(DecisionError::UnknownTimeZone(target)),
    };

    if asset.stored_time_zone() == Some(target.as_str()) {
        return Decision::AlreadyCorrect { time_zone: target };
    }

    Decision::Pending(PendingUpdate {
        asset_id: asset.id,
        previous_time_zone: asset.stored_time_zone().map(str::to_string),
        time_zone,
        local_time: captured_at.with_timezone(&time_zone),
        coordinates,
        source,
    })
}
