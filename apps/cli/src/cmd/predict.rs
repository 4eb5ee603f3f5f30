//! Risk prediction command.

use crate::config::{Config, PredictDefaults};
use anyhow::{Context, Result};
use clap::Args;
use console::style;
use reef::{
    Field, PredictRequest, PredictResponse, ReadingError, SstReadings, limit_decimals, parse_field,
};

/// The prediction form. Values are taken as typed and validated together.
#[derive(Args, Debug, Clone, Default)]
pub struct FormArgs {
    /// Minimum SST (°C).
    #[arg(long = "min", allow_hyphen_values = true)]
    pub min_sst: String,
    /// Maximum SST (°C).
    #[arg(long = "max", allow_hyphen_values = true)]
    pub max_sst: String,
    /// Hotspot SST (°C).
    #[arg(long = "hotspot", allow_hyphen_values = true)]
    pub hotspot_sst: String,
    /// SST anomaly (°C).
    #[arg(long = "anomaly", allow_hyphen_values = true)]
    pub sst_anomaly: String,
    /// 90th percentile degree heating weeks.
    #[arg(long, allow_hyphen_values = true)]
    pub dhw: Option<String>,
    /// Reef region.
    #[arg(long)]
    pub region: Option<String>,
    /// Observation date.
    #[arg(long)]
    pub date: Option<String>,
    /// Model override.
    #[arg(long)]
    pub model: Option<String>,
}

impl FormArgs {
    /// Build and validate the request, trimming values to two decimals.
    pub fn to_request(&self, defaults: &PredictDefaults) -> Result<PredictRequest, ReadingError> {
        let readings = SstReadings::parse(
            &limit_decimals(&self.min_sst),
            &limit_decimals(&self.max_sst),
            &limit_decimals(&self.hotspot_sst),
            &limit_decimals(&self.sst_anomaly),
        )?;

        let mut request = PredictRequest::new(readings);
        if let Some(dhw) = &self.dhw {
            request = request.dhw(parse_field(Field::Dhw, &limit_decimals(dhw))?);
        }
        if let Some(region) = &self.region {
            request = request.region(region.trim());
        }
        if let Some(date) = &self.date {
            request = request.date(date.trim());
        }
        if let Some(model) = self.model.as_ref().or(defaults.model.as_ref()) {
            request = request.model(model.as_str());
        }
        request.validate()?;
        Ok(request)
    }
}

/// Post the form and print the assessment.
pub async fn run(form: &FormArgs, config: &Config) -> Result<()> {
    let request = form.to_request(&config.predict)?;
    let assessment = config
        .client()?
        .predict(&request)
        .await
        .context("prediction failed")?;
    print_assessment(&assessment);
    Ok(())
}

/// Print level and status in the risk colour, then the description.
pub fn print_assessment(assessment: &PredictResponse) {
    let level = assessment.risk_level;
    let heading = format!("Level {}: {}", level.level(), assessment.status);
    println!("{}", style(heading).fg(level.ansi_color()).bold());
    println!("{}", assessment.description);
}
