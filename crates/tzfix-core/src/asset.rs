use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

const UNKNOWN_FILE_NAME: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// EXIF fields the catalog returns alongside an asset when `withExif` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExifInfo {
    #[serde(default)]
    pub date_time_original: Option<String>,
    #[serde(default, deserialize_with = "loose_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "loose_coordinate")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
}

/// Coordinates sometimes arrive as numeric strings; anything that does not
/// parse to a finite number counts as absent.
fn loose_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<LooseNumber>::deserialize(deserializer)? {
        Some(LooseNumber::Number(n)) => Some(n),
        Some(LooseNumber::Text(text)) => text.trim().parse::<f64>().ok(),
        None => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}

/// Read-only view of a catalog asset. Derived data (anchors, interpolated
/// coordinates, decisions) is kept in side structures keyed by the asset's
/// position in the batch, never on the record itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    #[serde(default = "unknown_file_name")]
    pub original_file_name: String,
    #[serde(default, rename = "exifInfo")]
    pub exif: Option<ExifInfo>,
}

fn unknown_file_name() -> String {
    UNKNOWN_FILE_NAME.to_string()
}

impl Asset {
    pub fn new(id: Uuid, original_file_name: impl Into<String>) -> Self {
        Self {
            id,
            original_file_name: original_file_name.into(),
            exif: None,
        }
    }

    pub fn with_capture_time(mut self, raw: impl Into<String>) -> Self {
        self.exif_mut().date_time_original = Some(raw.into());
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        let exif = self.exif_mut();
        exif.latitude = Some(latitude);
        exif.longitude = Some(longitude);
        self
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.exif_mut().time_zone = Some(time_zone.into());
        self
    }

    fn exif_mut(&mut self) -> &mut ExifInfo {
        self.exif.get_or_insert_with(ExifInfo::default)
    }

    pub fn capture_time_raw(&self) -> Option<&str> {
        self.exif.as_ref()?.date_time_original.as_deref()
    }

    /// Parsed capture instant, or `None` when the timestamp is missing or does
    /// not carry an offset.
    pub fn capture_time(&self) -> Option<DateTime<FixedOffset>> {
        self.capture_time_raw().and_then(parse_capture_time)
    }

    /// Native coordinates; only reported when both halves are present.
    pub fn coordinates(&self) -> Option<Coordinates> {
        let exif = self.exif.as_ref()?;
        match (exif.latitude, exif.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn stored_time_zone(&self) -> Option<&str> {
        self.exif.as_ref()?.time_zone.as_deref()
    }
}

/// Parses a capture timestamp into an absolute instant.
///
/// Accepts RFC 3339 and ISO 8601 with a colon-less numeric offset
/// (`2024-07-01T12:00:00+0200`). Timestamps without any offset are rejected.
pub fn parse_capture_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn deserializes_catalog_json() {
        let json = r#"{
            "id": "0b9c1f53-2f6e-4d0c-a8f4-0f0b7b0e7a10",
            "originalFileName": "IMG_0001.JPG",
            "exifInfo": {
                "dateTimeOriginal": "2024-07-01T08:00:00.000Z",
                "latitude": 48.85,
                "longitude": 2.35,
                "timeZone": "UTC"
            }
        }"#;

        let asset: Asset = serde_json::from_str(json).expect("asset json");
        assert_eq!(asset.original_file_name, "IMG_0001.JPG");
        assert_eq!(asset.coordinates(), Some(Coordinates::new(48.85, 2.35)));
        assert_eq!(asset.stored_time_zone(), Some("UTC"));
        assert_eq!(
            asset.capture_time().map(|dt| dt.with_timezone(&Utc)),
            Some(Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn null_exif_and_missing_name_are_tolerated() {
        let json = r#"{"id": "0b9c1f53-2f6e-4d0c-a8f4-0f0b7b0e7a10", "exifInfo": null}"#;
        let asset: Asset = serde_json::from_str(json).expect("asset json");
        assert_eq!(asset.original_file_name, "Unknown");
        assert!(asset.capture_time().is_none());
        assert!(asset.coordinates().is_none());
    }

    #[test]
    fn numeric_string_coordinates_are_accepted() {
        let json = r#"{
            "id": "0b9c1f53-2f6e-4d0c-a8f4-0f0b7b0e7a10",
            "exifInfo": {"latitude": "48.85", "longitude": " 2.35 "}
        }"#;
        let asset: Asset = serde_json::from_str(json).expect("asset json");
        assert_eq!(asset.coordinates(), Some(Coordinates::new(48.85, 2.35)));

        let json = r#"{
            "id": "0b9c1f53-2f6e-4d0c-a8f4-0f0b7b0e7a10",
            "exifInfo": {"latitude": "north", "longitude": 2.35}
        }"#;
        let asset: Asset = serde_json::from_str(json).expect("asset json");
        assert!(asset.coordinates().is_none());
    }

    #[test]
    fn half_coordinates_count_as_absent() {
        let mut asset = Asset::new(Uuid::new_v4(), "a.jpg").with_coordinates(10.0, 20.0);
        asset.exif.as_mut().unwrap().longitude = None;
        assert!(asset.coordinates().is_none());
    }

    #[test]
    fn capture_time_requires_an_offset() {
        assert!(parse_capture_time("2024-07-01T08:00:00+02:00").is_some());
        assert!(parse_capture_time("2024-07-01T08:00:00.123+0200").is_some());
        assert!(parse_capture_time("2024-07-01T08:00:00").is_none());
        assert!(parse_capture_time("not a date").is_none());
    }
}
