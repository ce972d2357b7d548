//! Client portfolios and their weighted holdings.

use serde::{Deserialize, Serialize};

use super::composition::{check_weight_sum, validate_weight};
use super::error::EsgError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub instrument: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub id: String,
    pub name: Option<String>,
    pub holdings: Vec<Holding>,
}

impl Portfolio {
    pub fn new(id: &str) -> Self {
        Portfolio {
            id: id.to_string(),
            name: None,
            holdings: Vec::new(),
        }
    }

    /// Adds or replaces the holding of `instrument`. Only the weight range is
    /// checked; the sum-to-one rule applies to the complete holding set.
    pub fn add_holding(&mut self, instrument: &str, weight: f64) -> Result<(), EsgError> {
        validate_weight(&self.id, instrument, weight)?;
        match self.holdings.iter_mut().find(|h| h.instrument == instrument) {
            Some(h) => h.weight = weight,
            None => self.holdings.push(Holding {
                instrument: instrument.to_string(),
                weight,
            }),
        }
        Ok(())
    }

    pub fn get_holding(&self, instrument: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.instrument == instrument)
    }

    pub fn holding_count(&self) -> usize {
        self.holdings.len()
    }

    pub fn weight_sum(&self) -> f64 {
        self.holdings.iter().map(|h| h.weight).sum()
    }

    /// Total weight with `instrument`'s current holding swapped for `weight`.
    pub fn weight_sum_with(&self, instrument: &str, weight: f64) -> f64 {
        self.holdings
            .iter()
            .filter(|h| h.instrument != instrument)
            .map(|h| h.weight)
            .sum::<f64>()
            + weight
    }

    pub fn check_weights(&self, tolerance: f64) -> Result<(), EsgError> {
        check_weight_sum(
            &format!("portfolio {}", self.id),
            self.holdings.iter().map(|h| h.weight),
            tolerance,
        )
    }
}
