//! Port traits implemented by the adapters.

pub mod config_port;
pub mod company_source;
pub mod universe_source;
pub mod report_port;
