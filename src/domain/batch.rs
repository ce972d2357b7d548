//! Independent scoring of a batch of company records.

use tracing::{info, warn};

use super::company::Company;
use super::error::EsgError;
use super::score::ScoreCalculator;

/// One input company paired with its score or the reason it has none.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCompany {
    pub company: Company,
    pub score: Result<f64, EsgError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub scored: usize,
    pub failed: usize,
}

/// Scores every company in input order. A failing record is reported in
/// its slot and does not stop the rest of the batch.
pub fn score_batch(companies: Vec<Company>, calculator: &ScoreCalculator) -> Vec<ScoredCompany> {
    let results: Vec<ScoredCompany> = companies
        .into_iter()
        .map(|company| {
            let score = calculator.adjusted_total_emissions(&company);
            if let Err(e) = &score {
                warn!(isin = %company.isin, error = %e, "skipping company");
            }
            ScoredCompany { company, score }
        })
        .collect();

    let summary = summarize(&results);
    info!(scored = summary.scored, failed = summary.failed, "scored batch");
    results
}

pub fn summarize(results: &[ScoredCompany]) -> BatchSummary {
    let failed = results.iter().filter(|r| r.score.is_err()).count();
    BatchSummary {
        scored: results.len() - failed,
        failed,
    }
}
