//! stockcast: leakage-free forecasting datasets and indicator-driven
//! trading decisions for multi-asset daily series.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
