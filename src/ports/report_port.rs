//! Score report output port.

use std::io::Write;

use crate::domain::batch::ScoredCompany;
use crate::domain::error::EsgError;

/// Port for writing scored company batches.
pub trait ReportPort {
    fn write(&self, results: &[ScoredCompany], out: &mut dyn Write) -> Result<(), EsgError>;
}
