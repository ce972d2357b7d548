//! Core domain types and logic: scoring, composition, aggregation and the
//! entity store.

pub mod error;
pub mod company;
pub mod score;
pub mod batch;
pub mod instrument;
pub mod composition;
pub mod esg;
pub mod portfolio;
pub mod store;
pub mod shared;
pub mod aggregation;
pub mod config;
pub mod config_validation;
