//! CSV score report adapter implementing ReportPort.

use serde::Serialize;
use std::io::Write;

use crate::domain::batch::ScoredCompany;
use crate::domain::error::EsgError;
use crate::ports::report_port::ReportPort;

#[derive(Serialize)]
struct ScoreRow<'a> {
    isin: &'a str,
    co2_tot: f64,
    cc: f64,
    re_purch: f64,
    re_prod: f64,
    e_tot: f64,
    adjusted_total_emissions: Option<f64>,
    error: Option<String>,
}

impl<'a> From<&'a ScoredCompany> for ScoreRow<'a> {
    fn from(result: &'a ScoredCompany) -> Self {
        let c = &result.company;
        ScoreRow {
            isin: &c.isin,
            co2_tot: c.co2_tot,
            cc: c.cc,
            re_purch: c.re_purch,
            re_prod: c.re_prod,
            e_tot: c.e_tot,
            adjusted_total_emissions: result.score.as_ref().ok().copied(),
            error: result.score.as_ref().err().map(ToString::to_string),
        }
    }
}

fn csv_error(err: csv::Error) -> EsgError {
    EsgError::Io {
        reason: format!("CSV write error: {}", err),
    }
}

/// Writes one row per company, in batch order. Failed records carry an
/// empty score and the error text.
pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write(&self, results: &[ScoredCompany], out: &mut dyn Write) -> Result<(), EsgError> {
        let mut writer = csv::Writer::from_writer(out);
        for result in results {
            writer.serialize(ScoreRow::from(result)).map_err(csv_error)?;
        }
        writer.flush()?;
        Ok(())
    }
}
