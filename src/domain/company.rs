//! Company entity and its raw emissions metrics.

use serde::{Deserialize, Serialize};

use super::error::EsgError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub isin: String,
    /// Total CO2-equivalent emissions, tonnes.
    pub co2_tot: f64,
    /// Carbon credit value offset against gross emissions.
    pub cc: f64,
    pub re_purch: f64,
    pub re_prod: f64,
    /// Total energy use. Zero is storable but cannot be scored.
    pub e_tot: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Company {
    pub fn new(isin: &str, co2_tot: f64, cc: f64, re_purch: f64, re_prod: f64, e_tot: f64) -> Self {
        Company {
            isin: isin.to_string(),
            co2_tot,
            cc,
            re_purch,
            re_prod,
            e_tot,
            name: None,
            description: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn is_scorable(&self) -> bool {
        self.e_tot > 0.0
    }

    /// Field-completeness check applied when a company enters the store.
    pub fn validate(&self) -> Result<(), EsgError> {
        if self.isin.trim().is_empty() {
            return Err(EsgError::InvalidField {
                entity: "company".to_string(),
                field: "isin",
                reason: "ISIN must not be empty".to_string(),
            });
        }

        let metrics = [
            ("co2_tot", self.co2_tot),
            ("cc", self.cc),
            ("re_purch", self.re_purch),
            ("re_prod", self.re_prod),
            ("e_tot", self.e_tot),
        ];
        for (field, value) in metrics {
            if !value.is_finite() || value < 0.0 {
                return Err(EsgError::InvalidField {
                    entity: format!("company {}", self.isin),
                    field,
                    reason: format!("must be a finite non-negative number, got {}", value),
                });
            }
        }
        Ok(())
    }
}
