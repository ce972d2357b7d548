//! Portfolio-level aggregation of per-company and per-instrument metrics.
//!
//! Each holding is flattened through the composition graph, scaled by the
//! holding weight and merged, giving a look-through exposure per atomic
//! instrument. The metric is then evaluated once per distinct company (or
//! instrument) and weighted by that exposure.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::company::Company;
use super::composition::Resolution;
use super::error::EsgError;
use super::esg::{EsgCombiner, EsgSubject};
use super::instrument::Instrument;
use super::score::{ScoreCalculator, ScoringParams};
use super::store::EntityStore;

/// How exposure to atomic instruments without an owning company is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoveragePolicy {
    /// Un-owned exposure contributes zero; the aggregate is not rescaled.
    #[default]
    ZeroContribution,
    /// The aggregate is divided by the company-owned (covered) weight.
    Renormalize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    /// Look-through weight of this company or instrument in the portfolio.
    pub weight: f64,
    pub metric: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioMetric {
    pub value: f64,
    pub covered_weight: f64,
    pub uncovered_weight: f64,
    pub contributions: BTreeMap<String, Contribution>,
}

pub struct PortfolioAggregator<'a> {
    store: &'a EntityStore,
    policy: CoveragePolicy,
}

impl<'a> PortfolioAggregator<'a> {
    pub fn new(store: &'a EntityStore) -> Self {
        PortfolioAggregator {
            store,
            policy: CoveragePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CoveragePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Merged look-through weight of every atomic instrument held, directly
    /// or through compound instruments.
    pub fn exposures(&self, portfolio_id: &str) -> Result<Resolution, EsgError> {
        let portfolio = self
            .store
            .portfolio(portfolio_id)
            .ok_or_else(|| EsgError::UnresolvableEntity {
                kind: "portfolio",
                id: portfolio_id.to_string(),
            })?;
        portfolio.check_weights(self.store.weight_tolerance())?;

        let mut merged = Resolution::new();
        for holding in &portfolio.holdings {
            let resolved = self.store.resolve(&holding.instrument)?;
            for (atomic, weight) in resolved {
                *merged.entry(atomic).or_insert(0.0) += weight * holding.weight;
            }
        }
        debug!(
            portfolio = portfolio_id,
            holdings = portfolio.holding_count(),
            atomics = merged.len(),
            "computed look-through exposures"
        );
        Ok(merged)
    }

    /// Per-company aggregation with coverage and contribution detail.
    pub fn breakdown<M>(
        &self,
        portfolio_id: &str,
        metric_fn: M,
        asof_date: NaiveDate,
    ) -> Result<PortfolioMetric, EsgError>
    where
        M: Fn(&Company, NaiveDate) -> Result<f64, EsgError>,
    {
        let exposures = self.exposures(portfolio_id)?;

        let mut company_weights: BTreeMap<String, f64> = BTreeMap::new();
        let mut uncovered_weight = 0.0;
        for (instrument_id, weight) in exposures {
            let instrument = self.lookup_instrument(&instrument_id)?;
            match &instrument.company {
                Some(isin) => *company_weights.entry(isin.clone()).or_insert(0.0) += weight,
                None => uncovered_weight += weight,
            }
        }

        let mut contributions = BTreeMap::new();
        for (isin, weight) in company_weights {
            let company = self
                .store
                .company(&isin)
                .ok_or_else(|| EsgError::UnresolvableEntity {
                    kind: "company",
                    id: isin.clone(),
                })?;
            let metric = metric_fn(company, asof_date)?;
            contributions.insert(isin, Contribution { weight, metric });
        }

        self.finish(portfolio_id, contributions, uncovered_weight)
    }

    /// Aggregates `metric_fn(company)` over the portfolio's look-through
    /// company exposure.
    pub fn compute_metric<M>(
        &self,
        portfolio_id: &str,
        metric_fn: M,
        asof_date: NaiveDate,
    ) -> Result<f64, EsgError>
    where
        M: Fn(&Company, NaiveDate) -> Result<f64, EsgError>,
    {
        Ok(self.breakdown(portfolio_id, metric_fn, asof_date)?.value)
    }

    /// Aggregates a metric defined on atomic instruments themselves. Every
    /// atomic instrument is covered, so the coverage policy has no effect.
    pub fn compute_instrument_metric<M>(
        &self,
        portfolio_id: &str,
        metric_fn: M,
        asof_date: NaiveDate,
    ) -> Result<PortfolioMetric, EsgError>
    where
        M: Fn(&Instrument, NaiveDate) -> Result<f64, EsgError>,
    {
        let exposures = self.exposures(portfolio_id)?;
        let mut contributions = BTreeMap::new();
        for (instrument_id, weight) in exposures {
            let instrument = self.lookup_instrument(&instrument_id)?;
            let metric = metric_fn(instrument, asof_date)?;
            contributions.insert(instrument_id, Contribution { weight, metric });
        }
        self.finish(portfolio_id, contributions, 0.0)
    }

    fn lookup_instrument(&self, id: &str) -> Result<&'a Instrument, EsgError> {
        self.store
            .instrument(id)
            .ok_or_else(|| EsgError::UnresolvableEntity {
                kind: "instrument",
                id: id.to_string(),
            })
    }

    fn finish(
        &self,
        portfolio_id: &str,
        contributions: BTreeMap<String, Contribution>,
        uncovered_weight: f64,
    ) -> Result<PortfolioMetric, EsgError> {
        let covered_weight: f64 = contributions.values().map(|c| c.weight).sum();
        let weighted: f64 = contributions.values().map(|c| c.weight * c.metric).sum();

        let value = match self.policy {
            CoveragePolicy::ZeroContribution => weighted,
            CoveragePolicy::Renormalize => {
                if covered_weight <= 0.0 {
                    return Err(EsgError::NoCoverage {
                        portfolio: portfolio_id.to_string(),
                    });
                }
                weighted / covered_weight
            }
        };

        info!(
            portfolio = portfolio_id,
            value,
            covered_weight,
            uncovered_weight,
            "aggregated portfolio metric"
        );

        Ok(PortfolioMetric {
            value,
            covered_weight,
            uncovered_weight,
            contributions,
        })
    }
}

/// Company metric scoring adjusted total emissions; the date is ignored.
pub fn adjusted_emissions_metric(
    params: ScoringParams,
) -> impl Fn(&Company, NaiveDate) -> Result<f64, EsgError> {
    let calculator = ScoreCalculator::new(params);
    move |company: &Company, _asof: NaiveDate| calculator.adjusted_total_emissions(company)
}

/// Company metric reading the combined ESG score as of the given date.
pub fn esg_metric<'a, C>(
    store: &'a EntityStore,
    combiner: C,
) -> impl Fn(&Company, NaiveDate) -> Result<f64, EsgError> + 'a
where
    C: EsgCombiner + 'a,
{
    move |company: &Company, asof: NaiveDate| {
        store.combined_score(&EsgSubject::Company(company.isin.clone()), asof, &combiner)
    }
}

/// Instrument metric reading the instrument's own combined ESG score.
pub fn instrument_esg_metric<'a, C>(
    store: &'a EntityStore,
    combiner: C,
) -> impl Fn(&Instrument, NaiveDate) -> Result<f64, EsgError> + 'a
where
    C: EsgCombiner + 'a,
{
    move |instrument: &Instrument, asof: NaiveDate| {
        store.combined_score(&EsgSubject::Instrument(instrument.id.clone()), asof, &combiner)
    }
}
