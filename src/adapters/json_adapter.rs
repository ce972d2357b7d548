//! JSON file adapters for company batches and entity universes.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::company::Company;
use crate::domain::error::EsgError;
use crate::domain::esg::EsgSubject;
use crate::domain::instrument::{AssetClass, Instrument, InstrumentType};
use crate::domain::store::EntityStore;
use crate::ports::company_source::CompanySource;
use crate::ports::universe_source::UniverseSource;

/// A numeric field that some data vendors deliver as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn to_f64(&self, isin: &str, field: &'static str) -> Result<f64, EsgError> {
        match self {
            Numeric::Number(n) => Ok(*n),
            Numeric::Text(s) => s.trim().parse().map_err(|_| EsgError::InvalidField {
                entity: format!("company {}", isin),
                field,
                reason: format!("{:?} is not a number", s),
            }),
        }
    }
}

/// A company record as delivered in the vendor's column naming.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyRecord {
    #[serde(rename = "ISIN")]
    isin: String,
    #[serde(rename = "Total CO2 Equivalents Emissions")]
    co2_tot: Numeric,
    #[serde(rename = "Carbon Credit Value")]
    cc: Numeric,
    #[serde(rename = "Renewable Energy Purchased")]
    re_purch: Numeric,
    #[serde(rename = "Renewable Energy Produced")]
    re_prod: Numeric,
    #[serde(rename = "Total Energy Use")]
    e_tot: Numeric,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Description", default)]
    description: Option<String>,
}

impl CompanyRecord {
    pub fn into_company(self) -> Result<Company, EsgError> {
        let isin = self.isin;
        Ok(Company {
            co2_tot: self.co2_tot.to_f64(&isin, "co2_tot")?,
            cc: self.cc.to_f64(&isin, "cc")?,
            re_purch: self.re_purch.to_f64(&isin, "re_purch")?,
            re_prod: self.re_prod.to_f64(&isin, "re_prod")?,
            e_tot: self.e_tot.to_f64(&isin, "e_tot")?,
            name: self.name,
            description: self.description,
            isin,
        })
    }
}

fn read_source(path: &Path) -> Result<String, EsgError> {
    fs::read_to_string(path).map_err(|e| EsgError::Io {
        reason: format!("failed to read {}: {}", path.display(), e),
    })
}

fn parse_error(source_name: &str, err: serde_json::Error) -> EsgError {
    EsgError::InputParse {
        source_name: source_name.to_string(),
        reason: err.to_string(),
    }
}

/// Parses a JSON array of company records, keeping input order.
pub fn parse_companies(content: &str, source_name: &str) -> Result<Vec<Company>, EsgError> {
    let records: Vec<CompanyRecord> =
        serde_json::from_str(content).map_err(|e| parse_error(source_name, e))?;
    records
        .into_iter()
        .map(CompanyRecord::into_company)
        .collect()
}

pub struct JsonCompanyAdapter {
    path: PathBuf,
}

impl JsonCompanyAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CompanySource for JsonCompanyAdapter {
    fn load_companies(&self) -> Result<Vec<Company>, EsgError> {
        let content = read_source(&self.path)?;
        let companies = parse_companies(&content, &self.path.display().to_string())?;
        info!(path = %self.path.display(), count = companies.len(), "loaded companies");
        Ok(companies)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentRow {
    pub compound: String,
    pub component: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HoldingRow {
    pub instrument: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioRow {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub holdings: Vec<HoldingRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EsgRecordRow {
    pub subject: EsgSubject,
    pub date: NaiveDate,
    #[serde(default)]
    pub e: Option<f64>,
    #[serde(default)]
    pub s: Option<f64>,
    #[serde(default)]
    pub g: Option<f64>,
}

/// On-disk layout of an entity universe.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct UniverseFile {
    pub asset_classes: Vec<AssetClass>,
    pub instrument_types: Vec<InstrumentType>,
    pub companies: Vec<CompanyRecord>,
    pub instruments: Vec<Instrument>,
    pub components: Vec<ComponentRow>,
    pub portfolios: Vec<PortfolioRow>,
    pub esg_records: Vec<EsgRecordRow>,
}

impl UniverseFile {
    pub fn parse(content: &str, source_name: &str) -> Result<Self, EsgError> {
        serde_json::from_str(content).map_err(|e| parse_error(source_name, e))
    }

    /// Loads entities in dependency order. Components and holdings are
    /// grouped per owner and written as complete edge sets.
    pub fn apply(self, store: &mut EntityStore) -> Result<(), EsgError> {
        for asset_class in self.asset_classes {
            store.put_asset_class(asset_class)?;
        }
        for instrument_type in self.instrument_types {
            store.put_instrument_type(instrument_type)?;
        }
        for record in self.companies {
            store.put_company(record.into_company()?)?;
        }
        for instrument in self.instruments {
            store.put_instrument(instrument)?;
        }

        let mut compounds: BTreeMap<String, Vec<(String, f64)>> = BTreeMap::new();
        for row in self.components {
            compounds
                .entry(row.compound)
                .or_default()
                .push((row.component, row.weight));
        }
        for (compound, children) in &compounds {
            let edges: Vec<(&str, f64)> = children.iter().map(|(c, w)| (c.as_str(), *w)).collect();
            store.set_components(compound, &edges)?;
            debug!(compound = %compound, components = edges.len(), "loaded composition");
        }

        for portfolio in &self.portfolios {
            store.put_portfolio(&portfolio.id, portfolio.name.as_deref())?;
            if !portfolio.holdings.is_empty() {
                let holdings: Vec<(&str, f64)> = portfolio
                    .holdings
                    .iter()
                    .map(|h| (h.instrument.as_str(), h.weight))
                    .collect();
                store.set_holdings(&portfolio.id, &holdings)?;
            }
        }

        for row in self.esg_records {
            store.put_esg_record(row.subject, row.date, row.e, row.s, row.g)?;
        }
        Ok(())
    }
}

pub struct JsonUniverseAdapter {
    path: PathBuf,
}

impl JsonUniverseAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl UniverseSource for JsonUniverseAdapter {
    fn load_into(&self, store: &mut EntityStore) -> Result<(), EsgError> {
        let content = read_source(&self.path)?;
        let universe = UniverseFile::parse(&content, &self.path.display().to_string())?;
        universe.apply(store)?;
        info!(
            path = %self.path.display(),
            portfolios = store.portfolio_ids().len(),
            esg_records = store.esg_record_count(),
            "loaded universe"
        );
        Ok(())
    }
}
