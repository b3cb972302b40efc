//! End-to-end configuration tests

use ema_paper::config::{Config, ConfigError, DataSource, DriverMode};
use ema_paper::execution::PaperEngine;
use ema_paper::signal::CrossoverDetector;
use std::io::Write;

#[test]
fn test_config_example_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    config.validate().unwrap();

    assert_eq!(config.instrument.symbol, "^NSEI");
    assert_eq!(config.strategy.short_span, 10);
    assert_eq!(config.strategy.long_span, 20);
    assert_eq!(config.capital.lot_size, 75);
    assert_eq!(config.driver.mode, DriverMode::Replay);
    assert_eq!(config.data.source, DataSource::Csv);
}

#[test]
fn test_config_load_rejects_invalid_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[strategy]\nshort_span = 20\nlong_span = 10").unwrap();

    let err = Config::load(file.path()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::SpanOrder {
            short: 20,
            long: 10
        })
    );
}

#[test]
fn test_components_build_from_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[capital]\ninitial_balance = 5000.0\nlot_size = 1\nmax_lots = 10\nsynthetic_multiplier = 1.0"
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    let engine = PaperEngine::from_config(&config);
    let detector = CrossoverDetector::from_config(&config.strategy);

    assert_eq!(engine.balance(), 5000.0);
    assert_eq!(engine.instrument(), "NIFTY 50");
    assert_eq!(detector.max_risk_points(), 40.0);
}
