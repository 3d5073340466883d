//! gatewatch - airport flight board library
//!
//! This library exposes the credential normalizer, the endpoint family
//! table and the flight query engine, plus the configuration and output
//! layers used by the `gatewatch` binary.

pub mod cli;
pub mod config;
pub mod constants;
pub mod credential;
pub mod endpoints;
pub mod envelope;
pub mod filter;
pub mod logging;
pub mod models;
pub mod output;
pub mod query;
pub mod transport;
