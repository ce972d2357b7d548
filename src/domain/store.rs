//! In-memory entity registry.
//!
//! The store owns every company, instrument, portfolio, composition edge and
//! ESG record. Writes are validated at this boundary: identifiers must
//! resolve, records must be complete, and edge weights may never push a
//! compound instrument or portfolio past a total of one.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::company::Company;
use super::composition::{
    check_weight_sum, validate_weight, CompositionGraph, Resolution, ResolveLimits,
    DEFAULT_WEIGHT_TOLERANCE,
};
use super::error::EsgError;
use super::esg::{EsgCombiner, EsgRecord, EsgScores, EsgSubject};
use super::instrument::{AssetClass, Instrument, InstrumentType};
use super::portfolio::Portfolio;

#[derive(Debug, Clone)]
pub struct EntityStore {
    asset_classes: HashMap<String, AssetClass>,
    instrument_types: HashMap<String, InstrumentType>,
    companies: HashMap<String, Company>,
    instruments: HashMap<String, Instrument>,
    portfolios: HashMap<String, Portfolio>,
    composition: CompositionGraph,
    esg: BTreeMap<EsgSubject, BTreeMap<NaiveDate, EsgScores>>,
    weight_tolerance: f64,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

fn unresolvable(kind: &'static str, id: &str) -> EsgError {
    EsgError::UnresolvableEntity {
        kind,
        id: id.to_string(),
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self::with_settings(ResolveLimits::default(), DEFAULT_WEIGHT_TOLERANCE)
    }

    pub fn with_settings(limits: ResolveLimits, weight_tolerance: f64) -> Self {
        EntityStore {
            asset_classes: HashMap::new(),
            instrument_types: HashMap::new(),
            companies: HashMap::new(),
            instruments: HashMap::new(),
            portfolios: HashMap::new(),
            composition: CompositionGraph::with_limits(limits),
            esg: BTreeMap::new(),
            weight_tolerance,
        }
    }

    pub fn weight_tolerance(&self) -> f64 {
        self.weight_tolerance
    }

    pub fn composition(&self) -> &CompositionGraph {
        &self.composition
    }

    // ---- entities ----

    pub fn put_asset_class(&mut self, asset_class: AssetClass) -> Result<(), EsgError> {
        if asset_class.id.trim().is_empty() {
            return Err(EsgError::InvalidField {
                entity: "asset class".to_string(),
                field: "id",
                reason: "identifier must not be empty".to_string(),
            });
        }
        self.asset_classes
            .insert(asset_class.id.clone(), asset_class);
        Ok(())
    }

    pub fn put_instrument_type(&mut self, instrument_type: InstrumentType) -> Result<(), EsgError> {
        if instrument_type.id.trim().is_empty() {
            return Err(EsgError::InvalidField {
                entity: "instrument type".to_string(),
                field: "id",
                reason: "identifier must not be empty".to_string(),
            });
        }
        if !self.asset_classes.contains_key(&instrument_type.asset_class) {
            return Err(unresolvable("asset class", &instrument_type.asset_class));
        }
        self.instrument_types
            .insert(instrument_type.id.clone(), instrument_type);
        Ok(())
    }

    pub fn put_company(&mut self, company: Company) -> Result<(), EsgError> {
        company.validate()?;
        debug!(isin = %company.isin, "put company");
        self.companies.insert(company.isin.clone(), company);
        Ok(())
    }

    pub fn put_instrument(&mut self, instrument: Instrument) -> Result<(), EsgError> {
        instrument.validate()?;
        if !self.instrument_types.contains_key(&instrument.instrument_type) {
            return Err(unresolvable("instrument type", &instrument.instrument_type));
        }
        if let Some(owner) = &instrument.company {
            if !self.companies.contains_key(owner) {
                return Err(unresolvable("company", owner));
            }
        }
        debug!(id = %instrument.id, "put instrument");
        self.instruments.insert(instrument.id.clone(), instrument);
        Ok(())
    }

    /// Creates an empty portfolio, or renames an existing one.
    pub fn put_portfolio(&mut self, id: &str, name: Option<&str>) -> Result<(), EsgError> {
        if id.trim().is_empty() {
            return Err(EsgError::InvalidField {
                entity: "portfolio".to_string(),
                field: "id",
                reason: "identifier must not be empty".to_string(),
            });
        }
        let portfolio = self
            .portfolios
            .entry(id.to_string())
            .or_insert_with(|| Portfolio::new(id));
        portfolio.name = name.map(str::to_string);
        Ok(())
    }

    pub fn company(&self, isin: &str) -> Option<&Company> {
        self.companies.get(isin)
    }

    pub fn instrument(&self, id: &str) -> Option<&Instrument> {
        self.instruments.get(id)
    }

    pub fn instrument_type(&self, id: &str) -> Option<&InstrumentType> {
        self.instrument_types.get(id)
    }

    /// The asset class an instrument belongs to through its type.
    pub fn asset_class_of(&self, instrument_id: &str) -> Option<&AssetClass> {
        let instrument = self.instruments.get(instrument_id)?;
        let instrument_type = self.instrument_types.get(&instrument.instrument_type)?;
        self.asset_classes.get(&instrument_type.asset_class)
    }

    pub fn portfolio(&self, id: &str) -> Option<&Portfolio> {
        self.portfolios.get(id)
    }

    pub fn companies(&self) -> impl Iterator<Item = &Company> {
        self.companies.values()
    }

    pub fn portfolio_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.portfolios.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    // ---- weighted edges ----

    pub fn add_holding(
        &mut self,
        portfolio_id: &str,
        instrument_id: &str,
        weight: f64,
    ) -> Result<(), EsgError> {
        if !self.instruments.contains_key(instrument_id) {
            return Err(unresolvable("instrument", instrument_id));
        }
        let tolerance = self.weight_tolerance;
        let portfolio = self
            .portfolios
            .get_mut(portfolio_id)
            .ok_or_else(|| unresolvable("portfolio", portfolio_id))?;
        validate_weight(portfolio_id, instrument_id, weight)?;

        let sum = portfolio.weight_sum_with(instrument_id, weight);
        if sum > 1.0 + tolerance {
            return Err(EsgError::InconsistentWeights {
                owner: format!("portfolio {}", portfolio_id),
                sum,
            });
        }
        portfolio.add_holding(instrument_id, weight)
    }

    /// Replaces the full holding set of a portfolio. Nothing changes unless
    /// every instrument resolves and the weights sum to one.
    pub fn set_holdings(
        &mut self,
        portfolio_id: &str,
        holdings: &[(&str, f64)],
    ) -> Result<(), EsgError> {
        if !self.portfolios.contains_key(portfolio_id) {
            return Err(unresolvable("portfolio", portfolio_id));
        }
        let mut replacement = Portfolio::new(portfolio_id);
        for &(instrument_id, weight) in holdings {
            if !self.instruments.contains_key(instrument_id) {
                return Err(unresolvable("instrument", instrument_id));
            }
            replacement.add_holding(instrument_id, weight)?;
        }
        replacement.check_weights(self.weight_tolerance)?;

        if let Some(portfolio) = self.portfolios.get_mut(portfolio_id) {
            portfolio.holdings = replacement.holdings;
        }
        Ok(())
    }

    fn check_component_write(&self, compound_id: &str, component_id: &str) -> Result<(), EsgError> {
        for id in [compound_id, component_id] {
            if !self.instruments.contains_key(id) {
                return Err(unresolvable("instrument", id));
            }
        }
        if self
            .esg
            .contains_key(&EsgSubject::Instrument(compound_id.to_string()))
        {
            return Err(EsgError::NotAtomic {
                instrument: compound_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn add_component(
        &mut self,
        compound_id: &str,
        component_id: &str,
        weight: f64,
    ) -> Result<(), EsgError> {
        self.check_component_write(compound_id, component_id)?;
        validate_weight(compound_id, component_id, weight)?;

        let sum: f64 = self
            .composition
            .components(compound_id)
            .iter()
            .filter(|(c, _)| *c != component_id)
            .map(|(_, w)| w)
            .sum::<f64>()
            + weight;
        if sum > 1.0 + self.weight_tolerance {
            return Err(EsgError::InconsistentWeights {
                owner: compound_id.to_string(),
                sum,
            });
        }
        self.composition
            .add_component(compound_id, component_id, weight)
    }

    /// Drops every component of `compound_id`, leaving it atomic.
    pub fn clear_components(&mut self, compound_id: &str) {
        self.composition.clear_components(compound_id);
    }

    /// Replaces every component of `compound_id` in one step, after checking
    /// that the new weights sum to one. A repeated component keeps its last
    /// weight, as with [`EntityStore::add_component`].
    pub fn set_components(
        &mut self,
        compound_id: &str,
        components: &[(&str, f64)],
    ) -> Result<(), EsgError> {
        let mut edges: Vec<(&str, f64)> = Vec::with_capacity(components.len());
        for &(component_id, weight) in components {
            self.check_component_write(compound_id, component_id)?;
            validate_weight(compound_id, component_id, weight)?;
            match edges.iter_mut().find(|(c, _)| *c == component_id) {
                Some(edge) => edge.1 = weight,
                None => edges.push((component_id, weight)),
            }
        }
        check_weight_sum(
            compound_id,
            edges.iter().map(|&(_, w)| w),
            self.weight_tolerance,
        )?;

        self.composition.clear_components(compound_id);
        for (component_id, weight) in edges {
            self.composition
                .add_component(compound_id, component_id, weight)?;
        }
        Ok(())
    }

    // ---- ESG records ----

    /// Stores a dated `(e, s, g)` triple. All three are required; on any
    /// failure the store is left untouched.
    pub fn put_esg_record(
        &mut self,
        subject: EsgSubject,
        date: NaiveDate,
        e: Option<f64>,
        s: Option<f64>,
        g: Option<f64>,
    ) -> Result<(), EsgError> {
        let scores = EsgScores::complete(&subject, date, e, s, g)?;
        match &subject {
            EsgSubject::Company(isin) => {
                if !self.companies.contains_key(isin) {
                    return Err(unresolvable("company", isin));
                }
            }
            EsgSubject::Instrument(id) => {
                if !self.instruments.contains_key(id) {
                    return Err(unresolvable("instrument", id));
                }
                if !self.composition.is_atomic(id) {
                    return Err(EsgError::NotAtomic {
                        instrument: id.clone(),
                    });
                }
            }
        }
        self.esg.entry(subject).or_default().insert(date, scores);
        Ok(())
    }

    pub fn esg_record(&self, subject: &EsgSubject, date: NaiveDate) -> Option<&EsgScores> {
        self.esg.get(subject)?.get(&date)
    }

    /// The latest record dated on or before `asof`.
    pub fn esg_as_of(&self, subject: &EsgSubject, asof: NaiveDate) -> Option<EsgRecord> {
        let (date, scores) = self.esg.get(subject)?.range(..=asof).next_back()?;
        Some(EsgRecord {
            subject: subject.clone(),
            date: *date,
            scores: *scores,
        })
    }

    pub fn esg_record_count(&self) -> usize {
        self.esg.values().map(BTreeMap::len).sum()
    }

    pub fn combined_score<C>(
        &self,
        subject: &EsgSubject,
        asof: NaiveDate,
        combiner: &C,
    ) -> Result<f64, EsgError>
    where
        C: EsgCombiner + ?Sized,
    {
        let record = self.esg_as_of(subject, asof).ok_or_else(|| EsgError::UnresolvableEntity {
            kind: "ESG record",
            id: format!("{} as of {}", subject, asof),
        })?;
        Ok(combiner.combine(&record.scores))
    }

    // ---- structure ----

    /// Resolves a stored instrument to its atomic constituents.
    pub fn resolve(&self, instrument_id: &str) -> Result<Resolution, EsgError> {
        if !self.instruments.contains_key(instrument_id) {
            return Err(unresolvable("instrument", instrument_id));
        }
        self.composition
            .resolve_checked(instrument_id, self.weight_tolerance)
    }

    /// Every structural problem in the store: inconsistent compound or
    /// portfolio weights, cyclic compositions and compounds that exceed the
    /// traversal limits.
    pub fn validate(&self) -> Vec<EsgError> {
        let mut problems = Vec::new();

        let mut compounds: Vec<&str> = self.composition.compounds().collect();
        compounds.sort_unstable();
        for compound in compounds {
            if let Err(e) = self.composition.check_weights(compound, self.weight_tolerance) {
                problems.push(e);
            }
            if let Err(e) = self.composition.resolve(compound) {
                if !problems.contains(&e) {
                    problems.push(e);
                }
            }
        }

        for id in self.portfolio_ids() {
            if let Some(portfolio) = self.portfolios.get(id) {
                if let Err(e) = portfolio.check_weights(self.weight_tolerance) {
                    problems.push(e);
                }
            }
        }
        problems
    }
}
