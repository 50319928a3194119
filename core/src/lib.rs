//! Compound optimization results: a validated result model, pure
//! presentation aggregates over it, and a seeded demo pipeline that
//! produces illustrative batches.

pub mod aggregate;
pub mod config;
pub mod demo;
pub mod error;
pub mod export;
pub mod model;
pub mod rng;
pub mod run_state;
pub mod store;
pub mod types;
