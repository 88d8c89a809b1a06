use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{lenient_timestamp, null_as_default, Envelope};

/// Keywords accepted by the `query` filter of `GET /v1/results`, with descriptions.
pub const QUERY_KEYWORDS: &[(&str, &str)] = &[
    ("whois6m", "Domain registered less than 6 months ago"),
    ("whois30d", "Domain registered less than 30 days ago"),
    ("whois", "Whois record present"),
    ("web", "HTTP server detected"),
    ("txt", "DNS TXT record present"),
    ("ssl", "HTTPS connection detected"),
    ("spf", "DNS SPF record detected"),
    ("redirect", "Redirect to original domain"),
    ("mx", "DNS MX record present"),
    ("-whois6m", "Domain registered more than 6 months ago"),
    ("-whois30d", "Domain registered more than 30 days ago"),
    ("-whois", "No Whois record present"),
    ("-web", "No HTTP server detected"),
    ("-txt", "No DNS TXT record present"),
    ("-ssl", "No HTTPS connection detected"),
    ("-spf", "No DNS SPF record detected"),
    ("-redirect", "Not redirecting to original domain"),
    ("-mx", "No DNS MX record present"),
];

/// Returns true if `keyword` is a valid results filter.
#[must_use]
pub fn is_query_keyword(keyword: &str) -> bool {
    QUERY_KEYWORDS.iter().any(|(k, _)| *k == keyword)
}

/// Response of `GET /v1/results`
pub type ResultsResponse = Envelope<ScanResult>;

/// One fuzzed domain and what the scanners found about it.
///
/// Optional wire fields stay `None` when absent; an explicit empty string is
/// kept as `Some("")`. The `expanded` block is never read from the wire and is
/// filled in by [`crate::expand`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fuzzer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fuzzed_domain: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fuzzed_domain_unicode: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub scanned_at: Option<DateTime<Utc>>,

    // DNS
    #[serde(default, deserialize_with = "null_as_default")]
    pub dns_a: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dns_aaaa: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dns_txt: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dns_mx: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dns_ns: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dns_cname: Vec<String>,
    #[serde(default)]
    pub dns_spf: Option<String>,
    #[serde(default)]
    pub dns_dmarc: Option<String>,
    #[serde(default)]
    pub dns_dkim: Option<String>,

    // WHOIS
    #[serde(default, rename = "whois_created")]
    pub whois_registered_at: Option<String>,
    #[serde(default, rename = "whois_updated")]
    pub whois_updated_at: Option<String>,
    #[serde(default, rename = "whois_expiring")]
    pub whois_expiring_at: Option<String>,
    #[serde(default)]
    pub whois_abuse_email: Option<String>,
    #[serde(default)]
    pub whois_abuse_phone: Option<String>,
    #[serde(default, rename = "whois_registrar")]
    pub whois_registrar_name: Option<String>,
    #[serde(default)]
    pub whois_registrar_iana_id: Option<String>,
    #[serde(default)]
    pub whois_registrant_name: Option<String>,
    #[serde(default)]
    pub whois_registrant_id: Option<String>,
    #[serde(default)]
    pub whois_registrant_address: Option<String>,
    #[serde(default)]
    pub whois_registrant_email: Option<String>,
    #[serde(default)]
    pub whois_registrant_country: Option<String>,

    // Web
    #[serde(default, deserialize_with = "null_as_default")]
    pub web_has_http_server: bool,
    #[serde(default)]
    pub web_start_url: Option<String>,
    #[serde(default)]
    pub web_end_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub web_redirect_to_domain: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub web_page_contains_domain: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub web_page_contains_brand_name: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub web_has_credential_harvester: bool,
    #[serde(default)]
    pub web_http_status_code: Option<i32>,
    #[serde(default)]
    pub web_html_title: Option<String>,
    #[serde(default, rename = "banner_http")]
    pub web_banner_http: Option<String>,
    #[serde(default)]
    pub web_lang: Option<String>,

    // TLS
    #[serde(default)]
    pub ssl_issuer_org: Option<String>,
    #[serde(default)]
    pub ssl_issuer_country: Option<String>,
    #[serde(default)]
    pub ssl_issuer_addr: Option<String>,
    #[serde(default)]
    pub ssl_issuer_common_name: Option<String>,
    #[serde(default, rename = "ssl_issuer_rfc_2253_name")]
    pub ssl_issuer_rfc2253_name: Option<String>,
    #[serde(default, rename = "ssl_subject_rfc_2253_name")]
    pub ssl_subject_rfc2253_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub ssl_cert_not_before: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub ssl_cert_not_after: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ssl_cert_sig: Option<String>,
    #[serde(default)]
    pub ssl_cert_sig_alg: Option<String>,

    /// Display fields derived by [`crate::expand`]
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub expanded: Option<Expansion>,
}

/// Presentation fields derived from a [`ScanResult`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expansion {
    /// Any registrar detail is present
    pub whois_registrar_any_info: bool,
    /// Any registrant detail is present
    pub whois_registrant_any_info: bool,
    /// Both abuse email and abuse phone are present and non-empty
    pub abuse_info_any: bool,
    /// A certificate signature is present
    pub ssl_any_info: bool,
    /// The certificate's not-after lies in the future
    pub ssl_is_cert_valid: bool,
    /// Time since registration, e.g. `1y5w`
    pub whois_registered_at_since: String,
    /// Time since the last WHOIS update
    pub whois_updated_at_since: String,
    /// Distance to (or past) expiry, unsigned
    pub whois_expiring_at_since: String,
    /// Distance to the scan time, unsigned
    pub scanned_at_since: String,
}

impl ScanResult {
    /// Derived fields, or an all-empty block if not yet expanded
    #[must_use]
    pub fn expansion(&self) -> Expansion {
        self.expanded.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_are_distinct() {
        let json = r#"{
            "fuzzed_domain": "examp1e.com",
            "whois_abuse_email": "",
            "dns_a": null,
            "web_has_http_server": null
        }"#;
        let r: ScanResult = serde_json::from_str(json).unwrap();
        assert_eq!(r.whois_abuse_email.as_deref(), Some(""));
        assert!(r.whois_abuse_phone.is_none());
        assert!(r.dns_a.is_empty());
        assert!(!r.web_has_http_server);
        assert!(r.expanded.is_none());
    }

    #[test]
    fn renamed_wire_fields() {
        let json = r#"{
            "whois_created": "2020-01-01T00:00:00Z",
            "whois_registrar": "NameCheap",
            "banner_http": "nginx",
            "ssl_issuer_rfc_2253_name": "CN=R3",
            "ssl_cert_not_after": "2030-01-01T00:00:00Z",
            "scanned_at": "2024-05-01T10:00:00Z"
        }"#;
        let r: ScanResult = serde_json::from_str(json).unwrap();
        assert_eq!(r.whois_registered_at.as_deref(), Some("2020-01-01T00:00:00Z"));
        assert_eq!(r.whois_registrar_name.as_deref(), Some("NameCheap"));
        assert_eq!(r.web_banner_http.as_deref(), Some("nginx"));
        assert_eq!(r.ssl_issuer_rfc2253_name.as_deref(), Some("CN=R3"));
        assert!(r.ssl_cert_not_after.is_some());
        assert!(r.scanned_at.is_some());
    }

    #[test]
    fn bad_timestamp_only_degrades_its_record() {
        use crate::clock::MockClock;
        use crate::expand;

        let json = r#"{
            "results": [
                {"fuzzed_domain": "examp1e.com", "scanned_at": "2024-05-01T10:00:00Z"},
                {"fuzzed_domain": "exampie.com", "scanned_at": "", "ssl_cert_not_after": "2024-13-45"}
            ],
            "meta": {"total": 2}
        }"#;
        let resp: ResultsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.results.len(), 2);

        let clock = MockClock::from_rfc3339("2024-05-01T12:00:00Z");
        let mut expanded = resp.results.into_iter().map(|r| expand(r, &clock));
        let good = expanded.next().unwrap();
        let bad = expanded.next().unwrap();

        assert_eq!(good.expansion().scanned_at_since, "2h");
        assert_eq!(bad.fuzzed_domain, "exampie.com");
        assert!(bad.scanned_at.is_none());
        assert!(bad.ssl_cert_not_after.is_none());
        assert_eq!(bad.expansion().scanned_at_since, "");
        assert!(!bad.expansion().ssl_is_cert_valid);
    }

    #[test]
    fn expanded_is_never_read_from_wire() {
        let json = r#"{"expanded": {"abuse_info_any": true}}"#;
        let r: ScanResult = serde_json::from_str(json).unwrap();
        assert!(r.expanded.is_none());
    }

    #[test]
    fn keyword_table() {
        assert!(is_query_keyword("whois30d"));
        assert!(is_query_keyword("-ssl"));
        assert!(!is_query_keyword("ftp"));
        assert_eq!(QUERY_KEYWORDS.len(), 18);
    }
}
