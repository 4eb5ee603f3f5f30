//! Request and response bodies of the prediction service, and the
//! bleaching alert levels it reports.

use crate::reading::{Field, ReadingError, SstReadings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors converting raw risk values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiskError {
    /// The service reported a level outside 0..=4.
    #[error("risk level {0} out of range 0..=4")]
    OutOfRange(u8),
}

/// Bleaching alert area level reported by `/predict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RiskLevel {
    /// No thermal stress.
    Healthy = 0,
    /// Early thermal stress.
    Watch = 1,
    /// Moderate thermal stress.
    Warning = 2,
    /// High thermal stress.
    HighRisk = 3,
    /// Critical thermal stress.
    Critical = 4,
}

impl RiskLevel {
    /// All levels, lowest first.
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::Healthy,
        RiskLevel::Watch,
        RiskLevel::Warning,
        RiskLevel::HighRisk,
        RiskLevel::Critical,
    ];

    /// Numeric level.
    pub fn level(&self) -> u8 {
        *self as u8
    }

    /// Status label the service uses for this level.
    pub fn status(&self) -> &'static str {
        match self {
            RiskLevel::Healthy => "Healthy Conditions",
            RiskLevel::Watch => "Bleaching Watch",
            RiskLevel::Warning => "Bleaching Warning",
            RiskLevel::HighRisk => "High Risk Alert",
            RiskLevel::Critical => "Critical Emergency",
        }
    }

    /// Description the service uses for this level.
    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Healthy => {
                "Coral reef are thriving with optimal water temperatures. Perfect conditions for coral growth and recovery."
            }
            RiskLevel::Watch => {
                "Early thermal stress detected in monitoring data. Sensitive coral species should be monitored closely for initial stress responses."
            }
            RiskLevel::Warning => {
                "Moderate thermal stress is affecting coral health. Bleaching may begin in sensitive species within the next few days."
            }
            RiskLevel::HighRisk => {
                "High thermal stress detected across the reef system. Widespread coral bleaching is expected to occur soon."
            }
            RiskLevel::Critical => {
                "Critical thermal stress levels reached. Severe coral bleaching and potential mortality are imminent without immediate intervention."
            }
        }
    }

    /// Display colour as a CSS hex string.
    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Healthy => "#4CAF50",
            RiskLevel::Watch => "#EAC75E",
            RiskLevel::Warning => "#C66238",
            RiskLevel::HighRisk => "#F44336",
            RiskLevel::Critical => "#8c140a",
        }
    }

    /// Closest terminal colour.
    pub fn ansi_color(&self) -> console::Color {
        match self {
            RiskLevel::Healthy => console::Color::Green,
            RiskLevel::Watch => console::Color::Yellow,
            RiskLevel::Warning => console::Color::Color256(166),
            RiskLevel::HighRisk => console::Color::Red,
            RiskLevel::Critical => console::Color::Color256(88),
        }
    }
}

impl TryFrom<u8> for RiskLevel {
    type Error = RiskError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(level as usize)
            .copied()
            .ok_or(RiskError::OutOfRange(level))
    }
}

impl From<RiskLevel> for u8 {
    fn from(level: RiskLevel) -> Self {
        level.level()
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct PredictRequest {
    /// The required readings.
    #[serde(flatten)]
    pub readings: SstReadings,

    /// 90th percentile degree heating weeks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dhw_90th: Option<f64>,

    /// Reef region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Observation date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Prediction model to use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl PredictRequest {
    /// Create a request with only the required readings.
    pub fn new(readings: SstReadings) -> Self {
        Self {
            readings,
            ..Default::default()
        }
    }

    /// Set the DHW value.
    pub fn dhw(mut self, dhw: f64) -> Self {
        self.dhw_90th = Some(dhw);
        self
    }

    /// Set the region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the observation date.
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Set the prediction model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Whether any of the enriched form's fields is set.
    pub fn is_enriched(&self) -> bool {
        self.dhw_90th.is_some() || self.region.is_some() || self.date.is_some()
    }

    /// Validate the request before it is sent.
    ///
    /// The enriched form needs region, date and DHW together.
    pub fn validate(&self) -> Result<(), ReadingError> {
        if self.is_enriched() {
            if self.region.as_deref().is_none_or(str::is_empty) {
                return Err(ReadingError::MissingRegion);
            }
            if self.date.as_deref().is_none_or(str::is_empty) {
                return Err(ReadingError::MissingDate);
            }
            if !self.dhw_90th.is_some_and(f64::is_finite) {
                return Err(ReadingError::Missing(Field::Dhw));
            }
        }
        self.readings.validate()
    }
}

/// Body returned by `POST /predict`.
///
/// Both deployed variants of the service are accepted: `risk_level` or
/// `baa_level`, and `status` or `risk_status`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PredictResponse {
    /// The predicted level.
    #[serde(alias = "baa_level")]
    pub risk_level: RiskLevel,

    /// Status label.
    #[serde(alias = "risk_status")]
    pub status: String,

    /// Longer description of the level.
    pub description: String,
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
}

impl ChatRequest {
    /// Create a chat request.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of `POST /init-chat`: the readings and the assessment they
/// produced, captured once when the conversation is seeded.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InitContext {
    /// The readings that were analysed.
    #[serde(flatten)]
    pub readings: SstReadings,

    /// The predicted level.
    pub risk_level: RiskLevel,

    /// Status label shown to the user.
    pub risk_status: String,

    /// Description shown to the user.
    pub description: String,
}

impl InitContext {
    /// Capture a context from readings and their assessment.
    pub fn new(readings: SstReadings, assessment: &PredictResponse) -> Self {
        Self {
            readings,
            risk_level: assessment.risk_level,
            risk_status: assessment.status.clone(),
            description: assessment.description.clone(),
        }
    }
}
