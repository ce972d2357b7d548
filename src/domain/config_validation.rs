//! Configuration validation.
//!
//! Every section is optional; absent keys fall back to the engine defaults.
//! Present keys are range-checked before any input is read.

use crate::domain::error::EsgError;
use crate::ports::config_port::ConfigPort;

pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

pub fn validate_engine_config(config: &dyn ConfigPort) -> Result<(), EsgError> {
    validate_scoring(config)?;
    validate_composition(config)?;
    validate_coverage(config)?;
    validate_esg(config)?;
    validate_log_level(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> EsgError {
    EsgError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses a present key as a float; absent keys take `default`.
fn float_setting(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, EsgError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(section, key, &format!("{:?} is not a number", raw))),
    }
}

fn int_setting(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, EsgError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(section, key, &format!("{:?} is not an integer", raw))),
    }
}

fn validate_scoring(config: &dyn ConfigPort) -> Result<(), EsgError> {
    let mu_purch = float_setting(config, "scoring", "mu_purch", 0.5)?;
    if !mu_purch.is_finite() || mu_purch < 0.0 {
        return Err(invalid("scoring", "mu_purch", "mu_purch must be non-negative"));
    }
    let mu_max = float_setting(config, "scoring", "mu_max", 0.8)?;
    if !(0.0..=1.0).contains(&mu_max) {
        return Err(invalid("scoring", "mu_max", "mu_max must be between 0 and 1"));
    }
    let phi_prod = float_setting(config, "scoring", "phi_prod", 0.005)?;
    if !phi_prod.is_finite() || phi_prod < 0.0 {
        return Err(invalid("scoring", "phi_prod", "phi_prod must be non-negative"));
    }
    Ok(())
}

fn validate_composition(config: &dyn ConfigPort) -> Result<(), EsgError> {
    if int_setting(config, "composition", "max_depth", 64)? < 1 {
        return Err(invalid(
            "composition",
            "max_depth",
            "max_depth must be at least 1",
        ));
    }
    if int_setting(config, "composition", "max_visits", 100_000)? < 1 {
        return Err(invalid(
            "composition",
            "max_visits",
            "max_visits must be at least 1",
        ));
    }
    let tolerance = float_setting(config, "composition", "weight_tolerance", 1e-9)?;
    if !(0.0..1.0).contains(&tolerance) {
        return Err(invalid(
            "composition",
            "weight_tolerance",
            "weight_tolerance must be in [0, 1)",
        ));
    }
    Ok(())
}

fn validate_coverage(config: &dyn ConfigPort) -> Result<(), EsgError> {
    match config.get_string("aggregation", "coverage") {
        None => Ok(()),
        Some(s) => match s.trim().to_lowercase().as_str() {
            "zero" | "renormalize" => Ok(()),
            _ => Err(invalid(
                "aggregation",
                "coverage",
                "coverage must be zero or renormalize",
            )),
        },
    }
}

fn validate_esg(config: &dyn ConfigPort) -> Result<(), EsgError> {
    let combiner = config
        .get_string("esg", "combiner")
        .map(|s| s.trim().to_lowercase());
    match combiner.as_deref() {
        None | Some("mean") => Ok(()),
        Some("weighted") => {
            let mut total = 0.0;
            for key in ["e_weight", "s_weight", "g_weight"] {
                let w = float_setting(config, "esg", key, 1.0)?;
                if !w.is_finite() || w < 0.0 {
                    return Err(invalid("esg", key, "pillar weights must be non-negative"));
                }
                total += w;
            }
            if total <= 0.0 {
                return Err(invalid(
                    "esg",
                    "e_weight",
                    "at least one pillar weight must be positive",
                ));
            }
            Ok(())
        }
        Some(_) => Err(invalid("esg", "combiner", "combiner must be mean or weighted")),
    }
}

fn validate_log_level(config: &dyn ConfigPort) -> Result<(), EsgError> {
    match config.get_string("logging", "level") {
        None => Ok(()),
        Some(s) if LOG_LEVELS.contains(&s.trim().to_lowercase().as_str()) => Ok(()),
        Some(_) => Err(invalid(
            "logging",
            "level",
            "level must be one of trace, debug, info, warn, error, off",
        )),
    }
}
