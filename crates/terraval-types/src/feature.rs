//! Feature records - the fixed-shape parcel summary every agent consumes
//!
//! A [`FeatureRecord`] can only be obtained through [`FeatureRecord::new`],
//! which validates every field, or through [`FeatureInput::into_record`],
//! which first applies the domain-neutral fallbacks for missing numeric
//! fields. Once built, a record is immutable.

use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Fallback surface area when the imagery summary carries none
pub const DEFAULT_AREA_SQM: f64 = 200.0;
/// Fallback vegetation index
pub const DEFAULT_NDVI: f64 = 0.5;
/// Fallback cloud coverage percentage
pub const DEFAULT_CLOUD_COVERAGE: f64 = 5.0;
/// Fallback supporting-document count
pub const DEFAULT_DOCUMENT_COUNT: u32 = 0;

/// Errors raised while building a feature record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Invalid JSON input: {message}")]
    InvalidJson { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Field {field} must be finite")]
    NotFinite { field: &'static str },

    #[error("Field {field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Field area_sqm must be positive, got {value}")]
    NonPositiveArea { value: f64 },
}

/// Immutable remote-sensing summary of a parcel at valuation time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRecord {
    latitude: f64,
    longitude: f64,
    area_sqm: f64,
    ndvi: f64,
    cloud_coverage: f64,
    document_count: u32,
}

impl FeatureRecord {
    /// Build a record, validating every field
    pub fn new(
        latitude: f64,
        longitude: f64,
        area_sqm: f64,
        ndvi: f64,
        cloud_coverage: f64,
        document_count: u32,
    ) -> Result<Self, FeatureError> {
        check_range("latitude", latitude, -90.0, 90.0)?;
        check_range("longitude", longitude, -180.0, 180.0)?;
        check_finite("area_sqm", area_sqm)?;
        if area_sqm <= 0.0 {
            return Err(FeatureError::NonPositiveArea { value: area_sqm });
        }
        check_range("ndvi", ndvi, -1.0, 1.0)?;
        check_range("cloud_coverage", cloud_coverage, 0.0, 100.0)?;

        Ok(Self {
            latitude,
            longitude,
            area_sqm,
            ndvi,
            cloud_coverage,
            document_count,
        })
    }

    /// Parse a JSON object (flat or analysis-package shape) into a record
    pub fn from_json(json: &str) -> Result<Self, FeatureError> {
        let input: FeatureInput =
            serde_json::from_str(json).map_err(|e| FeatureError::InvalidJson {
                message: e.to_string(),
            })?;
        input.into_record()
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn area_sqm(&self) -> f64 {
        self.area_sqm
    }

    pub fn ndvi(&self) -> f64 {
        self.ndvi
    }

    pub fn cloud_coverage(&self) -> f64 {
        self.cloud_coverage
    }

    pub fn document_count(&self) -> u32 {
        self.document_count
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), FeatureError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FeatureError::NotFinite { field })
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), FeatureError> {
    check_finite(field, value)?;
    if value < min || value > max {
        return Err(FeatureError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Satellite summary nested inside an analysis package
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SatelliteSummary {
    #[serde(default)]
    pub area_sqm: Option<f64>,
    #[serde(default)]
    pub ndvi: Option<f64>,
    #[serde(default)]
    pub cloud_coverage: Option<f64>,
    #[serde(default)]
    pub resolution_meters: Option<f64>,
}

/// Lenient wire shape a [`FeatureRecord`] is parsed from
///
/// Accepts both the flat record and the analysis package produced by the
/// acquisition pipeline (`satellite_data` + `document_hashes`). Flat
/// fields win over nested ones; unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureInput {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub area_sqm: Option<f64>,
    #[serde(default)]
    pub ndvi: Option<f64>,
    #[serde(default)]
    pub cloud_coverage: Option<f64>,
    #[serde(default, deserialize_with = "whole_count")]
    pub document_count: Option<u32>,
    #[serde(default)]
    pub satellite_data: Option<SatelliteSummary>,
    #[serde(default)]
    pub document_hashes: Option<Vec<String>>,
}

/// Accepts `2` and `2.0`; rejects fractions, negatives and overflow
fn whole_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if raw.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&raw) {
        Ok(Some(raw as u32))
    } else {
        Err(de::Error::custom(format!(
            "document_count must be a non-negative whole number, got {}",
            raw
        )))
    }
}

impl FeatureInput {
    /// Apply fallbacks for missing numeric fields and validate
    pub fn into_record(self) -> Result<FeatureRecord, FeatureError> {
        let satellite = self.satellite_data.unwrap_or_default();

        let latitude = self.latitude.ok_or(FeatureError::MissingField { field: "latitude" })?;
        let longitude = self
            .longitude
            .ok_or(FeatureError::MissingField { field: "longitude" })?;

        let area_sqm = self
            .area_sqm
            .or(satellite.area_sqm)
            .unwrap_or(DEFAULT_AREA_SQM);
        let ndvi = self.ndvi.or(satellite.ndvi).unwrap_or(DEFAULT_NDVI);
        let cloud_coverage = self
            .cloud_coverage
            .or(satellite.cloud_coverage)
            .unwrap_or(DEFAULT_CLOUD_COVERAGE);
        let document_count = self
            .document_count
            .or_else(|| {
                self.document_hashes
                    .as_ref()
                    .map(|hashes| u32::try_from(hashes.len()).unwrap_or(u32::MAX))
            })
            .unwrap_or(DEFAULT_DOCUMENT_COUNT);

        FeatureRecord::new(
            latitude,
            longitude,
            area_sqm,
            ndvi,
            cloud_coverage,
            document_count,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_record_parses() {
        let record = FeatureRecord::from_json(
            r#"{"latitude": 40.7128, "longitude": -74.006, "area_sqm": 750,
                "ndvi": 0.55, "cloud_coverage": 3, "document_count": 2}"#,
        )
        .unwrap();

        assert_eq!(record.area_sqm(), 750.0);
        assert_eq!(record.ndvi(), 0.55);
        assert_eq!(record.cloud_coverage(), 3.0);
        assert_eq!(record.document_count(), 2);
    }

    #[test]
    fn test_analysis_package_parses() {
        let record = FeatureRecord::from_json(
            r#"{
                "request_id": "0x1234",
                "latitude": 40.7128,
                "longitude": -74.006,
                "satellite_data": {"area_sqm": 200, "ndvi": 0.65, "cloud_coverage": 5, "resolution_meters": 10},
                "document_hashes": ["QmTest1", "QmTest2"]
            }"#,
        )
        .unwrap();

        assert_eq!(record.area_sqm(), 200.0);
        assert_eq!(record.ndvi(), 0.65);
        assert_eq!(record.document_count(), 2);
    }

    #[test]
    fn test_missing_numeric_fields_use_fallbacks() {
        let record = FeatureRecord::from_json(r#"{"latitude": 1.0, "longitude": 2.0}"#).unwrap();

        assert_eq!(record.area_sqm(), DEFAULT_AREA_SQM);
        assert_eq!(record.ndvi(), DEFAULT_NDVI);
        assert_eq!(record.cloud_coverage(), DEFAULT_CLOUD_COVERAGE);
        assert_eq!(record.document_count(), DEFAULT_DOCUMENT_COUNT);
    }

    #[test]
    fn test_flat_fields_win_over_satellite_data() {
        let record = FeatureRecord::from_json(
            r#"{"latitude": 1.0, "longitude": 2.0, "ndvi": 0.2,
                "satellite_data": {"ndvi": 0.9}, "document_count": 4,
                "document_hashes": ["a"]}"#,
        )
        .unwrap();

        assert_eq!(record.ndvi(), 0.2);
        assert_eq!(record.document_count(), 4);
    }

    #[test]
    fn test_missing_coordinates_rejected() {
        let result = FeatureRecord::from_json(r#"{"longitude": 2.0}"#);
        assert_eq!(
            result,
            Err(FeatureError::MissingField { field: "latitude" })
        );
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(matches!(
            FeatureRecord::new(91.0, 0.0, 100.0, 0.5, 5.0, 0),
            Err(FeatureError::OutOfRange { field: "latitude", .. })
        ));
        assert!(matches!(
            FeatureRecord::new(0.0, 0.0, 100.0, 1.5, 5.0, 0),
            Err(FeatureError::OutOfRange { field: "ndvi", .. })
        ));
        assert!(matches!(
            FeatureRecord::new(0.0, 0.0, 100.0, 0.5, 101.0, 0),
            Err(FeatureError::OutOfRange { field: "cloud_coverage", .. })
        ));
        assert!(matches!(
            FeatureRecord::new(0.0, 0.0, 0.0, 0.5, 5.0, 0),
            Err(FeatureError::NonPositiveArea { .. })
        ));
        assert!(matches!(
            FeatureRecord::new(0.0, f64::NAN, 100.0, 0.5, 5.0, 0),
            Err(FeatureError::NotFinite { field: "longitude" })
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            FeatureRecord::from_json("{not json"),
            Err(FeatureError::InvalidJson { .. })
        ));
        assert!(matches!(
            FeatureRecord::from_json(r#"{"latitude": 1, "longitude": 2, "document_count": -1}"#),
            Err(FeatureError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_whole_number_float_document_count_accepted() {
        let record =
            FeatureRecord::from_json(r#"{"latitude": 1, "longitude": 2, "document_count": 2.0}"#)
                .unwrap();
        assert_eq!(record.document_count(), 2);

        let record =
            FeatureRecord::from_json(r#"{"latitude": 1, "longitude": 2, "document_count": null}"#)
                .unwrap();
        assert_eq!(record.document_count(), DEFAULT_DOCUMENT_COUNT);

        assert!(matches!(
            FeatureRecord::from_json(r#"{"latitude": 1, "longitude": 2, "document_count": 2.5}"#),
            Err(FeatureError::InvalidJson { .. })
        ));
    }
}
