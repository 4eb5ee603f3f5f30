//! Tests for turning the prediction form into a request.

use reef::{Field, ReadingError};
use reefwatch::{cmd::predict::FormArgs, config::PredictDefaults};

fn form(min: &str, max: &str, hotspot: &str, anomaly: &str) -> FormArgs {
    FormArgs {
        min_sst: min.into(),
        max_sst: max.into(),
        hotspot_sst: hotspot.into(),
        sst_anomaly: anomaly.into(),
        ..FormArgs::default()
    }
}

#[test]
fn basic_form_builds_request() {
    let request = form("26.1", "29.4", "30.2", "1.8")
        .to_request(&PredictDefaults::default())
        .unwrap();
    assert_eq!(request.readings.min_sst, 26.1);
    assert_eq!(request.readings.sst_anomaly, 1.8);
    assert!(!request.is_enriched());
    assert!(request.model.is_none());
}

#[test]
fn values_are_limited_to_two_decimals() {
    let request = form("26.127", "29.4", "30.2", "1.8")
        .to_request(&PredictDefaults::default())
        .unwrap();
    assert_eq!(request.readings.min_sst, 26.13);
}

#[test]
fn empty_reading_is_missing() {
    let err = form("26.1", " ", "30.2", "1.8")
        .to_request(&PredictDefaults::default())
        .unwrap_err();
    assert_eq!(err, ReadingError::Missing(Field::MaxSst));
    assert_eq!(err.to_string(), "Please enter maximum SST");
}

#[test]
fn out_of_range_reading_is_rejected() {
    let err = form("26.1", "29.4", "41", "1.8")
        .to_request(&PredictDefaults::default())
        .unwrap_err();
    assert_eq!(err, ReadingError::OutOfRange(Field::HotspotSst));
}

#[test]
fn enriched_form_needs_region_and_date() {
    let mut args = form("26.1", "29.4", "30.2", "1.8");
    args.dhw = Some("4.2".into());
    assert_eq!(
        args.to_request(&PredictDefaults::default()).unwrap_err(),
        ReadingError::MissingRegion
    );

    args.region = Some("Great Barrier Reef".into());
    assert_eq!(
        args.to_request(&PredictDefaults::default()).unwrap_err(),
        ReadingError::MissingDate
    );

    args.date = Some("2024-03-01".into());
    let request = args.to_request(&PredictDefaults::default()).unwrap();
    assert_eq!(request.dhw_90th, Some(4.2));
    assert_eq!(request.region.as_deref(), Some("Great Barrier Reef"));
}

#[test]
fn non_numeric_dhw_is_missing() {
    let mut args = form("26.1", "29.4", "30.2", "1.8");
    args.dhw = Some("lots".into());
    args.region = Some("Coral Sea".into());
    args.date = Some("2024-03-01".into());
    assert_eq!(
        args.to_request(&PredictDefaults::default()).unwrap_err(),
        ReadingError::Missing(Field::Dhw)
    );
}

#[test]
fn model_defaults_from_config() {
    let defaults = PredictDefaults {
        model: Some("llama3.1".into()),
    };
    let mut args = form("26.1", "29.4", "30.2", "1.8");
    let request = args.to_request(&defaults).unwrap();
    assert_eq!(request.model.as_deref(), Some("llama3.1"));

    args.model = Some("mistral".into());
    let request = args.to_request(&defaults).unwrap();
    assert_eq!(request.model.as_deref(), Some("mistral"));
}
