//! API endpoint modules.

mod asn;
mod domains;
mod results;

pub use asn::AsnApi;
pub use domains::DomainsApi;
pub use results::{ResultsApi, ResultsRequestBuilder};
