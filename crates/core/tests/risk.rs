//! Tests for prediction bodies and risk levels.

use reefwatch_core::{
    ChatRequest, Field, InitContext, PredictRequest, PredictResponse, ReadingError, RiskError,
    RiskLevel, SstReadings,
};
use serde_json::json;

fn readings() -> SstReadings {
    SstReadings {
        min_sst: 26.1,
        max_sst: 29.4,
        hotspot_sst: 30.2,
        sst_anomaly: 1.8,
    }
}

#[test]
fn basic_request_omits_optional_fields() {
    let body = serde_json::to_value(PredictRequest::new(readings())).unwrap();
    assert_eq!(
        body,
        json!({
            "min_sst": 26.1,
            "max_sst": 29.4,
            "hotspot_sst": 30.2,
            "sst_anomaly": 1.8,
        })
    );
}

#[test]
fn enriched_request_includes_optional_fields() {
    let request = PredictRequest::new(readings())
        .dhw(4.5)
        .region("Great Barrier Reef")
        .date("2024-02-01")
        .model("cnn");
    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(body["dhw_90th"], json!(4.5));
    assert_eq!(body["region"], json!("Great Barrier Reef"));
    assert_eq!(body["date"], json!("2024-02-01"));
    assert_eq!(body["model"], json!("cnn"));
    assert!(request.validate().is_ok());
}

#[test]
fn enriched_request_requires_region_date_and_dhw() {
    let request = PredictRequest::new(readings()).dhw(1.0);
    assert_eq!(request.validate(), Err(ReadingError::MissingRegion));

    let request = PredictRequest::new(readings()).region("Red Sea");
    assert_eq!(request.validate(), Err(ReadingError::MissingDate));

    let request = PredictRequest::new(readings()).region("Red Sea").date("2024-01-01");
    assert_eq!(request.validate(), Err(ReadingError::Missing(Field::Dhw)));
}

#[test]
fn model_alone_is_not_enriched() {
    let request = PredictRequest::new(readings()).model("llama3.1");
    assert!(!request.is_enriched());
    assert!(request.validate().is_ok());
}

#[test]
fn response_accepts_both_variants() {
    let current: PredictResponse = serde_json::from_value(json!({
        "risk_level": 2,
        "status": "Bleaching Warning",
        "description": "d",
    }))
    .unwrap();
    let legacy: PredictResponse = serde_json::from_value(json!({
        "baa_level": 2,
        "risk_status": "Bleaching Warning",
        "description": "d",
    }))
    .unwrap();
    assert_eq!(current, legacy);
    assert_eq!(current.risk_level, RiskLevel::Warning);
}

#[test]
fn response_rejects_out_of_range_level() {
    let result: Result<PredictResponse, _> = serde_json::from_value(json!({
        "risk_level": 7,
        "status": "?",
        "description": "?",
    }));
    assert!(result.is_err());
    assert_eq!(RiskLevel::try_from(7), Err(RiskError::OutOfRange(7)));
}

#[test]
fn level_tables() {
    assert_eq!(RiskLevel::Healthy.color(), "#4CAF50");
    assert_eq!(RiskLevel::Critical.color(), "#8c140a");
    assert_eq!(RiskLevel::HighRisk.status(), "High Risk Alert");
    for (index, level) in RiskLevel::ALL.iter().enumerate() {
        assert_eq!(level.level() as usize, index);
        assert_eq!(RiskLevel::try_from(index as u8), Ok(*level));
        assert!(!level.description().is_empty());
    }
}

#[test]
fn init_context_captures_assessment() {
    let assessment = PredictResponse {
        risk_level: RiskLevel::HighRisk,
        status: "High Risk Alert".to_owned(),
        description: "hot".to_owned(),
    };
    let context = InitContext::new(readings(), &assessment);
    assert_eq!(
        serde_json::to_value(&context).unwrap(),
        json!({
            "min_sst": 26.1,
            "max_sst": 29.4,
            "hotspot_sst": 30.2,
            "sst_anomaly": 1.8,
            "risk_level": 3,
            "risk_status": "High Risk Alert",
            "description": "hot",
        })
    );
}

#[test]
fn chat_request_body() {
    let body = serde_json::to_value(ChatRequest::new("why?")).unwrap();
    assert_eq!(body, json!({ "message": "why?" }));
}
