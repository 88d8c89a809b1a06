//! # opr-cli
//!
//! Command-line interface for the Oprand API.
//!
//! - **asn**: public Autonomous System lookups, full records or netblock/address lists
//! - **results**: scan results for the fuzzed variants of your verified domains
//! - **domains**: the verified domains of your account
//! - **config**: credential setup
//!
//! Output is either human-friendly (`pretty`) or machine-friendly (`json`, `csv`).

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
