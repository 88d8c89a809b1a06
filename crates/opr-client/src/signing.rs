//! Request signing for the private Oprand endpoints.
//!
//! The signature is
//! `base64(HMAC-SHA512(secret, path || SHA256(nonce || canonical_query)))`,
//! where `canonical_query` already contains the `nonce` parameter. The server
//! recomputes it from the received request, so the query sent on the wire must
//! be exactly [`encode_query`] of the signed parameters.

use base64::{engine::general_purpose::STANDARD, Engine};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Method;
use ring::{digest, hmac};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use opr_core::{Clock, SystemClock};

use crate::credentials::Credential;

/// Query parameter carrying the nonce
pub const NONCE_PARAM: &str = "nonce";
/// Header carrying the signature
pub const SIGNATURE_HEADER: &str = "API-Sign";
/// Header carrying the API key
pub const API_KEY_HEADER: &str = "API-Key";

/// Bytes left as-is in a query component; space is handled separately.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// An API request before signing
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
}

impl ApiRequest {
    /// A GET request for `path`
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
        }
    }

    /// Set a query parameter, replacing any previous value
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set a header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Canonical query string of the current parameters
    #[must_use]
    pub fn query_string(&self) -> String {
        encode_query(&self.query)
    }
}

/// A request carrying its nonce and signature. Only [`RequestSigner`] builds these.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    request: ApiRequest,
    nonce: String,
    signature: String,
}

impl SignedRequest {
    /// The request as it goes on the wire
    #[must_use]
    pub const fn request(&self) -> &ApiRequest {
        &self.request
    }

    #[must_use]
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// Encode `params` as `k=v&k=v`, keys in byte order, form-style escaping.
#[must_use]
pub fn encode_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode_component(s: &str) -> String {
    s.split(' ')
        .map(|part| utf8_percent_encode(part, QUERY_COMPONENT).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Canonical query string of `params` with `nonce` set.
#[must_use]
pub fn canonicalize(params: &BTreeMap<String, String>, nonce: &str) -> String {
    let mut params = params.clone();
    params.insert(NONCE_PARAM.to_string(), nonce.to_string());
    encode_query(&params)
}

/// Compute the `API-Sign` value for `path` and an already-canonical query.
#[must_use]
pub fn signature(path: &str, canonical_query: &str, nonce: &str, secret: &[u8]) -> String {
    let mut ctx = digest::Context::new(&digest::SHA256);
    ctx.update(nonce.as_bytes());
    ctx.update(canonical_query.as_bytes());
    let query_digest = ctx.finish();

    let key = hmac::Key::new(hmac::HMAC_SHA512, secret);
    let mut mac = hmac::Context::with_key(&key);
    mac.update(path.as_bytes());
    mac.update(query_digest.as_ref());
    STANDARD.encode(mac.sign().as_ref())
}

/// Millisecond nonces that never repeat or go backwards within a process.
pub struct NonceSource {
    clock: Arc<dyn Clock>,
    last: AtomicI64,
}

impl NonceSource {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicI64::new(0),
        }
    }

    /// Current time in milliseconds, bumped past the previous nonce if needed.
    pub fn next_nonce(&self) -> i64 {
        let now = self.clock.now_millis();
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(prev + 1)
    }
}

impl Default for NonceSource {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for NonceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceSource")
            .field("last", &self.last.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Attaches nonce, signature, API key and User-Agent to requests.
#[derive(Debug)]
pub struct RequestSigner {
    nonces: NonceSource,
    user_agent: String,
}

impl RequestSigner {
    #[must_use]
    pub fn new(user_agent: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            nonces: NonceSource::new(clock),
            user_agent: user_agent.into(),
        }
    }

    /// Sign `request` with the next nonce.
    pub fn sign(&self, request: ApiRequest, credential: &Credential) -> SignedRequest {
        let nonce = self.nonces.next_nonce().to_string();
        self.sign_with_nonce(request, credential, nonce)
    }

    /// Sign `request` with an explicit nonce.
    pub fn sign_with_nonce(
        &self,
        mut request: ApiRequest,
        credential: &Credential,
        nonce: String,
    ) -> SignedRequest {
        request
            .query
            .insert(NONCE_PARAM.to_string(), nonce.clone());
        let canonical = encode_query(&request.query);
        let signature = signature(&request.path, &canonical, &nonce, credential.secret());

        request
            .headers
            .insert(SIGNATURE_HEADER.to_string(), signature.clone());
        request
            .headers
            .insert(API_KEY_HEADER.to_string(), credential.api_key().to_string());
        request
            .headers
            .insert("User-Agent".to_string(), self.user_agent.clone());

        SignedRequest {
            request,
            nonce,
            signature,
        }
    }
}
