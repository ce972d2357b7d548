//! Dated ESG records and pluggable combined-score rules.
//!
//! A combined score is always derived from `(e, s, g)` when asked for and
//! never stored alongside the record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::EsgError;

/// The entity an ESG record is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EsgSubject {
    Company(String),
    Instrument(String),
}

impl fmt::Display for EsgSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EsgSubject::Company(id) => write!(f, "company {}", id),
            EsgSubject::Instrument(id) => write!(f, "instrument {}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EsgScores {
    pub e: f64,
    pub s: f64,
    pub g: f64,
}

impl EsgScores {
    /// Builds a complete triple, or reports every missing component.
    pub fn complete(
        subject: &EsgSubject,
        date: NaiveDate,
        e: Option<f64>,
        s: Option<f64>,
        g: Option<f64>,
    ) -> Result<Self, EsgError> {
        match (e, s, g) {
            (Some(e), Some(s), Some(g)) => Ok(EsgScores { e, s, g }),
            _ => {
                let missing: Vec<&str> = [("e", e), ("s", s), ("g", g)]
                    .iter()
                    .filter(|(_, v)| v.is_none())
                    .map(|(name, _)| *name)
                    .collect();
                Err(EsgError::IncompleteRecord {
                    entity: subject.to_string(),
                    date: date.to_string(),
                    missing: missing.join(", "),
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EsgRecord {
    pub subject: EsgSubject,
    pub date: NaiveDate,
    pub scores: EsgScores,
}

/// Rule deriving one combined score from an `(e, s, g)` triple.
pub trait EsgCombiner {
    fn combine(&self, scores: &EsgScores) -> f64;
}

impl<F> EsgCombiner for F
where
    F: Fn(&EsgScores) -> f64,
{
    fn combine(&self, scores: &EsgScores) -> f64 {
        self(scores)
    }
}

/// Unweighted mean of the three pillars.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanCombiner;

impl EsgCombiner for MeanCombiner {
    fn combine(&self, scores: &EsgScores) -> f64 {
        (scores.e + scores.s + scores.g) / 3.0
    }
}

/// Weighted mean of the three pillars, normalised by the weight total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedCombiner {
    pub e: f64,
    pub s: f64,
    pub g: f64,
}

impl EsgCombiner for WeightedCombiner {
    fn combine(&self, scores: &EsgScores) -> f64 {
        let total = self.e + self.s + self.g;
        (self.e * scores.e + self.s * scores.s + self.g * scores.g) / total
    }
}

/// Combiner selected through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CombinerKind {
    #[default]
    Mean,
    Weighted(WeightedCombiner),
}

impl EsgCombiner for CombinerKind {
    fn combine(&self, scores: &EsgScores) -> f64 {
        match self {
            CombinerKind::Mean => MeanCombiner.combine(scores),
            CombinerKind::Weighted(w) => w.combine(scores),
        }
    }
}
