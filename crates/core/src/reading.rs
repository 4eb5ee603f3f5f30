//! Sea-surface temperature form input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Temperatures the prediction service accepts, in °C.
pub const TEMPERATURE_RANGE: (f64, f64) = (-5.0, 40.0);

/// Fractional digits kept by [`limit_decimals`].
const MAX_DECIMALS: usize = 2;

/// A numeric field of the analysis form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Minimum SST.
    MinSst,
    /// Maximum SST.
    MaxSst,
    /// Hotspot SST.
    HotspotSst,
    /// SST anomaly.
    SstAnomaly,
    /// 90th percentile degree heating weeks.
    Dhw,
}

impl Field {
    /// JSON key sent to the service.
    pub fn key(&self) -> &'static str {
        match self {
            Field::MinSst => "min_sst",
            Field::MaxSst => "max_sst",
            Field::HotspotSst => "hotspot_sst",
            Field::SstAnomaly => "sst_anomaly",
            Field::Dhw => "dhw_90th",
        }
    }

    /// Human readable label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Field::MinSst => "minimum SST",
            Field::MaxSst => "maximum SST",
            Field::HotspotSst => "hotspot SST",
            Field::SstAnomaly => "SST anomaly",
            Field::Dhw => "DHW value",
        }
    }
}

/// Form validation errors, worded as prompts for the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadingError {
    /// A numeric field is blank or not a number.
    #[error("Please enter {}", .0.label())]
    Missing(Field),
    /// A temperature is outside [`TEMPERATURE_RANGE`].
    #[error("Invalid value for {}. Must be between -5°C and 40°C", .0.key())]
    OutOfRange(Field),
    /// The enriched form requires a region.
    #[error("Please select a region")]
    MissingRegion,
    /// The enriched form requires a date.
    #[error("Please select a date")]
    MissingDate,
}

/// Parse one numeric form value.
pub fn parse_field(field: Field, raw: &str) -> Result<f64, ReadingError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ReadingError::Missing(field))
}

/// Limit a typed value to two decimal places.
///
/// Values with at most two fractional digits, and values that do not parse,
/// are returned unchanged.
pub fn limit_decimals(raw: &str) -> String {
    let Some((_, fraction)) = raw.split_once('.') else {
        return raw.to_owned();
    };
    if fraction.len() <= MAX_DECIMALS {
        return raw.to_owned();
    }
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => format!("{value:.2}"),
        _ => raw.to_owned(),
    }
}

/// The four SST readings every prediction needs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct SstReadings {
    /// Minimum SST, °C.
    pub min_sst: f64,
    /// Maximum SST, °C.
    pub max_sst: f64,
    /// Hotspot SST, °C.
    pub hotspot_sst: f64,
    /// SST anomaly, °C.
    pub sst_anomaly: f64,
}

impl SstReadings {
    /// Parse raw form values, in form order.
    pub fn parse(min: &str, max: &str, hotspot: &str, anomaly: &str) -> Result<Self, ReadingError> {
        Ok(Self {
            min_sst: parse_field(Field::MinSst, min)?,
            max_sst: parse_field(Field::MaxSst, max)?,
            hotspot_sst: parse_field(Field::HotspotSst, hotspot)?,
            sst_anomaly: parse_field(Field::SstAnomaly, anomaly)?,
        })
    }

    /// Check every reading lies within [`TEMPERATURE_RANGE`].
    pub fn validate(&self) -> Result<(), ReadingError> {
        let (lo, hi) = TEMPERATURE_RANGE;
        for (field, value) in self.fields() {
            if !(lo..=hi).contains(&value) {
                return Err(ReadingError::OutOfRange(field));
            }
        }
        Ok(())
    }

    /// Readings paired with their fields.
    pub fn fields(&self) -> [(Field, f64); 4] {
        [
            (Field::MinSst, self.min_sst),
            (Field::MaxSst, self.max_sst),
            (Field::HotspotSst, self.hotspot_sst),
            (Field::SstAnomaly, self.sst_anomaly),
        ]
    }
}
