//! Instruments, their types and asset classes.

use serde::{Deserialize, Serialize};

use super::error::EsgError;

pub const MAX_ISIN_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetClass {
    pub id: String,
    pub name: String,
}

/// All instruments of one type share its asset class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentType {
    pub id: String,
    pub name: String,
    pub asset_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    #[serde(rename = "type")]
    pub instrument_type: String,
    pub isin: String,
    #[serde(default)]
    pub name: String,
    /// Owning company ISIN. At most one company owns an instrument.
    #[serde(default)]
    pub company: Option<String>,
}

impl Instrument {
    pub fn new(id: &str, instrument_type: &str, isin: &str) -> Self {
        Instrument {
            id: id.to_string(),
            instrument_type: instrument_type.to_string(),
            isin: isin.to_string(),
            name: String::new(),
            company: None,
        }
    }

    pub fn owned_by(mut self, company: &str) -> Self {
        self.company = Some(company.to_string());
        self
    }

    pub fn validate(&self) -> Result<(), EsgError> {
        if self.id.trim().is_empty() {
            return Err(EsgError::InvalidField {
                entity: "instrument".to_string(),
                field: "id",
                reason: "identifier must not be empty".to_string(),
            });
        }
        if self.isin.trim().is_empty() || self.isin.len() > MAX_ISIN_LEN {
            return Err(EsgError::InvalidField {
                entity: format!("instrument {}", self.id),
                field: "isin",
                reason: format!("ISIN must be 1 to {} characters", MAX_ISIN_LEN),
            });
        }
        Ok(())
    }
}
