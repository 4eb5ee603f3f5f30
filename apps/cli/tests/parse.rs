//! Tests for CLI argument parsing.

use clap::Parser;
use reefwatch::{Cli, Command, cmd::ConfigCommand};

#[test]
fn cli_parse_predict() {
    let cli = Cli::parse_from([
        "reefwatch", "predict", "--min", "26.1", "--max", "29.4", "--hotspot", "30.2",
        "--anomaly", "1.8",
    ]);
    match cli.command {
        Command::Predict(form) => {
            assert_eq!(form.min_sst, "26.1");
            assert_eq!(form.max_sst, "29.4");
            assert_eq!(form.hotspot_sst, "30.2");
            assert_eq!(form.sst_anomaly, "1.8");
            assert!(form.dhw.is_none());
        }
        _ => panic!("expected Predict command"),
    }
}

#[test]
fn cli_parse_negative_anomaly() {
    let cli = Cli::parse_from([
        "reefwatch", "predict", "--min", "-2", "--max", "1", "--hotspot", "2", "--anomaly",
        "-1.5",
    ]);
    match cli.command {
        Command::Predict(form) => {
            assert_eq!(form.min_sst, "-2");
            assert_eq!(form.sst_anomaly, "-1.5");
        }
        _ => panic!("expected Predict command"),
    }
}

#[test]
fn cli_parse_enriched_form() {
    let cli = Cli::parse_from([
        "reefwatch", "predict", "--min", "26", "--max", "29", "--hotspot", "30", "--anomaly",
        "1", "--dhw", "4.2", "--region", "Great Barrier Reef", "--date", "2024-03-01",
        "--model", "llama3.1",
    ]);
    match cli.command {
        Command::Predict(form) => {
            assert_eq!(form.dhw.as_deref(), Some("4.2"));
            assert_eq!(form.region.as_deref(), Some("Great Barrier Reef"));
            assert_eq!(form.date.as_deref(), Some("2024-03-01"));
            assert_eq!(form.model.as_deref(), Some("llama3.1"));
        }
        _ => panic!("expected Predict command"),
    }
}

#[test]
fn cli_parse_missing_reading_fails() {
    let result = Cli::try_parse_from(["reefwatch", "predict", "--min", "26"]);
    assert!(result.is_err());
}

#[test]
fn cli_parse_analyze_with_transcript() {
    let cli = Cli::parse_from([
        "reefwatch", "analyze", "--min", "26", "--max", "29", "--hotspot", "30", "--anomaly",
        "1", "--transcript", "chat.html",
    ]);
    match cli.command {
        Command::Analyze(analyze) => {
            assert_eq!(analyze.form.hotspot_sst, "30");
            assert_eq!(analyze.transcript.unwrap().to_str(), Some("chat.html"));
        }
        _ => panic!("expected Analyze command"),
    }
}

#[test]
fn cli_parse_chat_repl() {
    let cli = Cli::parse_from(["reefwatch", "chat"]);
    match cli.command {
        Command::Chat(chat) => {
            assert!(chat.message.is_none());
            assert!(chat.transcript.is_none());
        }
        _ => panic!("expected Chat command"),
    }
}

#[test]
fn cli_parse_chat_one_shot() {
    let cli = Cli::parse_from(["reefwatch", "chat", "is my reef ok?"]);
    match cli.command {
        Command::Chat(chat) => assert_eq!(chat.message.as_deref(), Some("is my reef ok?")),
        _ => panic!("expected Chat command"),
    }
}

#[test]
fn cli_parse_global_flags() {
    let cli = Cli::parse_from([
        "reefwatch",
        "chat",
        "--base-url",
        "http://reef.example:9000",
        "--config",
        "custom.toml",
    ]);
    assert_eq!(cli.base_url.as_deref(), Some("http://reef.example:9000"));
    assert_eq!(cli.config.unwrap().to_str(), Some("custom.toml"));
}

#[test]
fn cli_parse_config_show() {
    let cli = Cli::parse_from(["reefwatch", "config", "show"]);
    assert!(matches!(
        cli.command,
        Command::Config {
            action: ConfigCommand::Show
        }
    ));
}

#[test]
fn cli_parse_config_set() {
    let cli = Cli::parse_from(["reefwatch", "config", "set", "predict.model", "llama3.1"]);
    match cli.command {
        Command::Config {
            action: ConfigCommand::Set { key, value },
        } => {
            assert_eq!(key, "predict.model");
            assert_eq!(value, "llama3.1");
        }
        _ => panic!("expected Config set command"),
    }
}
