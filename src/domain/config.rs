//! Typed engine settings read through the configuration port.

use crate::domain::aggregation::CoveragePolicy;
use crate::domain::composition::{
    ResolveLimits, DEFAULT_MAX_DEPTH, DEFAULT_MAX_VISITS, DEFAULT_WEIGHT_TOLERANCE,
};
use crate::domain::config_validation::validate_engine_config;
use crate::domain::error::EsgError;
use crate::domain::esg::{CombinerKind, WeightedCombiner};
use crate::domain::score::{
    ScoreCalculator, ScoringParams, DEFAULT_MU_MAX, DEFAULT_MU_PURCH, DEFAULT_PHI_PROD,
};
use crate::domain::store::EntityStore;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub scoring: ScoringParams,
    pub limits: ResolveLimits,
    pub weight_tolerance: f64,
    pub coverage: CoveragePolicy,
    pub combiner: CombinerKind,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            scoring: ScoringParams::default(),
            limits: ResolveLimits::default(),
            weight_tolerance: DEFAULT_WEIGHT_TOLERANCE,
            coverage: CoveragePolicy::default(),
            combiner: CombinerKind::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl EngineConfig {
    /// Validates and reads every section, falling back to defaults for
    /// absent keys.
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, EsgError> {
        validate_engine_config(config)?;

        let scoring = ScoringParams {
            mu_purch: config.get_double("scoring", "mu_purch", DEFAULT_MU_PURCH),
            mu_max: config.get_double("scoring", "mu_max", DEFAULT_MU_MAX),
            phi_prod: config.get_double("scoring", "phi_prod", DEFAULT_PHI_PROD),
        };

        let limits = ResolveLimits {
            max_depth: config.get_int("composition", "max_depth", DEFAULT_MAX_DEPTH as i64)
                as usize,
            max_visits: config.get_int("composition", "max_visits", DEFAULT_MAX_VISITS as i64)
                as usize,
        };
        let weight_tolerance =
            config.get_double("composition", "weight_tolerance", DEFAULT_WEIGHT_TOLERANCE);

        let coverage = match config
            .get_string("aggregation", "coverage")
            .map(|s| s.trim().to_lowercase())
            .as_deref()
        {
            Some("renormalize") => CoveragePolicy::Renormalize,
            _ => CoveragePolicy::ZeroContribution,
        };

        let combiner = match config
            .get_string("esg", "combiner")
            .map(|s| s.trim().to_lowercase())
            .as_deref()
        {
            Some("weighted") => CombinerKind::Weighted(WeightedCombiner {
                e: config.get_double("esg", "e_weight", 1.0),
                s: config.get_double("esg", "s_weight", 1.0),
                g: config.get_double("esg", "g_weight", 1.0),
            }),
            _ => CombinerKind::Mean,
        };

        let log_level = config
            .get_string("logging", "level")
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(EngineConfig {
            scoring,
            limits,
            weight_tolerance,
            coverage,
            combiner,
            log_level,
        })
    }

    pub fn calculator(&self) -> ScoreCalculator {
        ScoreCalculator::new(self.scoring)
    }

    /// An empty store carrying the configured traversal limits and tolerance.
    pub fn new_store(&self) -> EntityStore {
        EntityStore::with_settings(self.limits, self.weight_tolerance)
    }
}
