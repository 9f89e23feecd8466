//! shortener - short-link resolution engine
//!
//! Maps long URLs to 8-character identifiers and back, tracks which links
//! each owner created, and soft-deletes links in batches.
//!
//! # Architecture
//! - `services`: identifier generator and shortening engine
//! - `storage`: `LinkStore` contract with memory, file and SeaORM backends
//! - `deletion`: background aggregator that batches soft-deletes
//! - `config`: layered static configuration
//! - `interfaces`: command-line front end
//! - `system`: logging setup
//! - `utils`: URL validation and presentation helpers

pub mod cli;
pub mod config;
pub mod deletion;
pub mod errors;
pub mod interfaces;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
