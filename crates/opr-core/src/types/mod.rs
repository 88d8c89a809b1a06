mod asn;
mod common;
mod domains;
mod results;

pub use asn::*;
pub use common::*;
pub use domains::*;
pub use results::*;
