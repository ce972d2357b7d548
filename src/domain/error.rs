//! Domain error types.

/// Top-level error type for esgscore.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EsgError {
    #[error("cannot score company {isin}: total energy use is zero")]
    DivisionByZero { isin: String },

    #[error("cyclic composition: instrument {instrument} is a component of itself")]
    CyclicComposition { instrument: String },

    #[error("inconsistent weights for {owner}: sum is {sum}, expected 1")]
    InconsistentWeights { owner: String, sum: f64 },

    #[error("incomplete ESG record for {entity} on {date}: missing {missing}")]
    IncompleteRecord {
        entity: String,
        date: String,
        missing: String,
    },

    #[error("unresolvable {kind}: {id}")]
    UnresolvableEntity { kind: &'static str, id: String },

    #[error("invalid weight {weight} for {owner} -> {target}: must be in (0, 1]")]
    InvalidWeight {
        owner: String,
        target: String,
        weight: f64,
    },

    #[error("invalid {field} for {entity}: {reason}")]
    InvalidField {
        entity: String,
        field: &'static str,
        reason: String,
    },

    #[error("instrument {instrument} is compound; ESG records belong to atomic instruments")]
    NotAtomic { instrument: String },

    #[error("resolution of {instrument} exceeded {limit} limit of {max}")]
    TraversalLimit {
        instrument: String,
        limit: &'static str,
        max: usize,
    },

    #[error("portfolio {portfolio} has no company-owned exposure to renormalize over")]
    NoCoverage { portfolio: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("input parse error in {source_name}: {reason}")]
    InputParse { source_name: String, reason: String },

    #[error("io error: {reason}")]
    Io { reason: String },
}

impl From<std::io::Error> for EsgError {
    fn from(err: std::io::Error) -> Self {
        EsgError::Io {
            reason: err.to_string(),
        }
    }
}

impl From<&EsgError> for std::process::ExitCode {
    fn from(err: &EsgError) -> Self {
        let code: u8 = match err {
            EsgError::Io { .. } => 1,
            EsgError::ConfigParse { .. }
            | EsgError::ConfigMissing { .. }
            | EsgError::ConfigInvalid { .. } => 2,
            EsgError::InputParse { .. } => 3,
            EsgError::CyclicComposition { .. }
            | EsgError::InconsistentWeights { .. }
            | EsgError::InvalidWeight { .. }
            | EsgError::TraversalLimit { .. } => 4,
            EsgError::UnresolvableEntity { .. }
            | EsgError::IncompleteRecord { .. }
            | EsgError::InvalidField { .. }
            | EsgError::NotAtomic { .. } => 5,
            EsgError::DivisionByZero { .. } | EsgError::NoCoverage { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
