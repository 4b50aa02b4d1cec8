//! Core domain types and logic. Nothing in here performs I/O.

pub mod bar;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod pipeline;
pub mod series;
pub mod split;
pub mod strategy;
pub mod transform;
pub mod window;
