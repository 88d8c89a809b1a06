//! Core types and data shaping for the Oprand client.
//!
//! This crate provides the foundational pieces used across the `opr` workspace:
//!
//! - **Types**: Strongly-typed representations of the Oprand API payloads
//! - **Errors**: The shared error taxonomy, [`OprError`]
//! - **Expansion**: [`expand`] derives display fields for a [`ScanResult`]
//! - **Shaping**: [`shape`] projects an [`AsnInfo`] into CIDR or address lists
//!
//! Nothing in here performs I/O. Every "now" is read through a [`Clock`].
//!
//! # Example
//!
//! ```rust,ignore
//! use opr_core::{expand, ScanResult, SystemClock};
//!
//! fn show(raw: ScanResult) {
//!     let r = expand(raw, &SystemClock);
//!     let since = r.expansion().whois_registered_at_since;
//!     println!("{} registered {since} ago", r.fuzzed_domain);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/opr-core/0.3.0")]

pub mod clock;
mod error;
pub mod expand;
pub mod shape;
pub mod types;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
pub use error::{OprError, Result};
pub use expand::{expand, humanize};
pub use shape::{ipv4_hosts, shape, AsnProjection, Shaped, ShapedLines};
pub use types::*;
