//! Client library for the Oprand API.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use opr::{expand, FileCredentials, OprClient, SystemClock};
//!
//! #[tokio::main]
//! async fn main() -> opr::Result<()> {
//!     // Public: no credentials needed
//!     let client = OprClient::public()?;
//!     for item in client.asn().lookup(&["AS3", "1.1.1.1"]).await? {
//!         match item.record() {
//!             Ok(info) => println!("{} {}", info.handle, info.name),
//!             Err(e) => eprintln!("{e}"),
//!         }
//!     }
//!
//!     // Private: every request is signed with the account's key and secret
//!     let client = OprClient::builder()
//!         .credentials(FileCredentials::new("/home/me/.config/opr/credentials.toml"))
//!         .build()?;
//!     let resp = client.results().domain("example.com").query(["web"]).send().await?;
//!     for r in resp.results {
//!         let r = expand(r, &SystemClock);
//!         println!("{} ({} old)", r.fuzzed_domain, r.expansion().whois_registered_at_since);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/opr/0.3.0")]

// Re-export core types
pub use opr_core::*;

// Re-export client
pub use opr_client::{
    api, signing, Credential, CredentialSource, CredentialsFile, FileCredentials, OprClient,
    OprClientBuilder, StaticCredentials, DEFAULT_USER_AGENT,
};

// Re-export runtime for convenience
pub use serde_json;
pub use tokio;
