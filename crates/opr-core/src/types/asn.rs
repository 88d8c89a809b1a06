use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::common::{lenient_timestamp, null_as_default};
use crate::{OprError, Result};

/// Response of the public ASN endpoint: one item per requested input
pub type AsnResponse = Vec<AsnResponseItem>;

/// Lookup outcome for a single input (AS number, IP, domain, `@domain` or `me`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsnResponseItem {
    /// The input as sent
    #[serde(default, deserialize_with = "null_as_default")]
    pub input: String,

    /// Why the lookup failed, empty on success
    #[serde(default, deserialize_with = "null_as_default")]
    pub error: String,

    /// The AS record, absent when the lookup failed
    #[serde(default)]
    pub output: Option<AsnInfo>,
}

impl AsnResponseItem {
    /// The record, or [`OprError::NoData`] carrying the server's reason.
    pub fn record(&self) -> Result<&AsnInfo> {
        self.output.as_ref().ok_or_else(|| OprError::NoData {
            input: self.input.clone(),
            reason: self.error.clone(),
        })
    }
}

/// Point of contact attached to an AS
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactRole {
    Registrant,
    Admin,
    Abuse,
    Tech,
    /// Network Operation Center
    Noc,
}

impl ContactRole {
    /// All roles, in display order
    pub const ALL: [Self; 5] = [Self::Registrant, Self::Admin, Self::Abuse, Self::Tech, Self::Noc];

    /// Section heading used by the presenter
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Registrant => "REGISTRANT",
            Self::Admin => "ADMIN",
            Self::Abuse => "ABUSE",
            Self::Tech => "TECHNICAL",
            Self::Noc => "NOC",
        }
    }
}

/// One contact block of an [`AsnInfo`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "type")]
    pub kind: String,
    pub handle: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub country: String,
    pub fax: String,
}

/// Summary of another AS sharing a contact handle with the queried one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedAsn {
    #[serde(default, deserialize_with = "null_as_default")]
    pub asn: u32,
    #[serde(default)]
    pub rir_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub handle: String,
    #[serde(default, rename = "allocated_at", deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ipv4_count: Option<u64>,
}

/// Autonomous System record.
///
/// On the wire contacts are flat `<role>_<field>` keys and related systems are
/// `share_<role>_handle` arrays; both are regrouped here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "AsnInfoWire", into = "AsnInfoWire")]
pub struct AsnInfo {
    pub asn: u32,
    pub name: String,
    pub status: Option<String>,
    pub rir_url: Option<String>,
    pub handle: String,
    pub domain: Option<String>,
    pub rir_name: Option<String>,
    pub kind: String,
    pub description: String,
    pub country: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub ipv4_ranges: Option<Vec<String>>,
    pub ipv4_count: Option<u64>,
    pub ipv6_ranges: Option<Vec<String>>,
    pub contacts: BTreeMap<ContactRole, Contact>,
    pub related: BTreeMap<ContactRole, Vec<RelatedAsn>>,
}

impl AsnInfo {
    /// Contact block for `role`, empty if none was sent
    #[must_use]
    pub fn contact(&self, role: ContactRole) -> Contact {
        self.contacts.get(&role).cloned().unwrap_or_default()
    }

    /// Other systems sharing the `role` handle
    #[must_use]
    pub fn related_by(&self, role: ContactRole) -> &[RelatedAsn] {
        self.related.get(&role).map_or(&[], Vec::as_slice)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AsnInfoWire {
    #[serde(default, deserialize_with = "null_as_default")]
    asn: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    rir_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    handle: String,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    rir_name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    country: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    allocated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    last_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    ipv4_ranges: Option<Vec<String>>,
    #[serde(default)]
    ipv4_count: Option<u64>,
    #[serde(default)]
    ipv6_ranges: Option<Vec<String>>,

    #[serde(flatten)]
    contacts: FlatContacts,

    #[serde(default, deserialize_with = "null_as_default")]
    share_registrant_handle: Vec<RelatedAsn>,
    #[serde(default, deserialize_with = "null_as_default")]
    share_admin_handle: Vec<RelatedAsn>,
    #[serde(default, deserialize_with = "null_as_default")]
    share_abuse_handle: Vec<RelatedAsn>,
    #[serde(default, deserialize_with = "null_as_default")]
    share_tech_handle: Vec<RelatedAsn>,
}

/// Flat `<role>_<field>` contact keys.
///
/// Kept as a map so the five roles share one conversion path; unrelated keys
/// that land here through `flatten` are dropped on conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct FlatContacts(BTreeMap<String, serde_json::Value>);

impl FlatContacts {
    fn take(&self, key: &str) -> String {
        self.0
            .get(key)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn contact(&self, role: ContactRole) -> Option<Contact> {
        let p = role_prefix(role);
        let c = Contact {
            kind: self.take(&format!("{p}_type")),
            handle: self.take(&format!("{p}_handle")),
            name: self.take(&format!("{p}_name")),
            email: self.take(&format!("{p}_email")),
            phone: self.take(&format!("{p}_phone")),
            address: self.take(&format!("{p}_address")),
            country: self.take(&format!("{p}_country")),
            fax: self.take(&format!("{p}_fax")),
        };
        (c != Contact::default()).then_some(c)
    }

    fn insert(&mut self, role: ContactRole, c: Contact) {
        let p = role_prefix(role);
        for (field, value) in [
            ("type", c.kind),
            ("handle", c.handle),
            ("name", c.name),
            ("email", c.email),
            ("phone", c.phone),
            ("address", c.address),
            ("country", c.country),
            ("fax", c.fax),
        ] {
            self.0
                .insert(format!("{p}_{field}"), serde_json::Value::String(value));
        }
    }
}

const fn role_prefix(role: ContactRole) -> &'static str {
    match role {
        ContactRole::Registrant => "registrant",
        ContactRole::Admin => "admin",
        ContactRole::Abuse => "abuse",
        ContactRole::Tech => "tech",
        ContactRole::Noc => "noc",
    }
}

impl From<AsnInfoWire> for AsnInfo {
    fn from(w: AsnInfoWire) -> Self {
        let contacts = ContactRole::ALL
            .into_iter()
            .filter_map(|role| w.contacts.contact(role).map(|c| (role, c)))
            .collect();

        let related = [
            (ContactRole::Registrant, w.share_registrant_handle),
            (ContactRole::Admin, w.share_admin_handle),
            (ContactRole::Abuse, w.share_abuse_handle),
            (ContactRole::Tech, w.share_tech_handle),
        ]
        .into_iter()
        .filter(|(_, list)| !list.is_empty())
        .collect();

        Self {
            asn: w.asn,
            name: w.name,
            status: w.status,
            rir_url: w.rir_url,
            handle: w.handle,
            domain: w.domain,
            rir_name: w.rir_name,
            kind: w.kind,
            description: w.description,
            country: w.country,
            created_at: w.allocated_at,
            updated_at: w.last_updated_at,
            ipv4_ranges: w.ipv4_ranges,
            ipv4_count: w.ipv4_count,
            ipv6_ranges: w.ipv6_ranges,
            contacts,
            related,
        }
    }
}

impl From<AsnInfo> for AsnInfoWire {
    fn from(mut a: AsnInfo) -> Self {
        let mut contacts = FlatContacts::default();
        for role in ContactRole::ALL {
            contacts.insert(role, a.contacts.remove(&role).unwrap_or_default());
        }
        let mut related = |role| a.related.remove(&role).unwrap_or_default();

        Self {
            share_registrant_handle: related(ContactRole::Registrant),
            share_admin_handle: related(ContactRole::Admin),
            share_abuse_handle: related(ContactRole::Abuse),
            share_tech_handle: related(ContactRole::Tech),
            asn: a.asn,
            name: a.name,
            status: a.status,
            rir_url: a.rir_url,
            handle: a.handle,
            domain: a.domain,
            rir_name: a.rir_name,
            kind: a.kind,
            description: a.description,
            country: a.country,
            allocated_at: a.created_at,
            last_updated_at: a.updated_at,
            ipv4_ranges: a.ipv4_ranges,
            ipv4_count: a.ipv4_count,
            ipv6_ranges: a.ipv6_ranges,
            contacts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOUDFLARE: &str = r#"[
        {
            "input": "1.1.1.1",
            "error": "",
            "output": {
                "asn": 13335,
                "name": "CLOUDFLARENET",
                "handle": "AS13335",
                "type": "isp",
                "description": "Cloudflare, Inc.",
                "country": "US",
                "allocated_at": "2010-07-14T00:00:00Z",
                "ipv4_ranges": ["1.1.1.0/24"],
                "ipv6_ranges": ["2606:4700::/32"],
                "ipv4_count": 256,
                "abuse_email": "abuse@cloudflare.com",
                "abuse_phone": "+1-650-319-8930",
                "abuse_type": "role",
                "tech_name": "Cloudflare NOC",
                "share_abuse_handle": [
                    {"asn": 209242, "name": "CLOUDFLARESPECTRUM", "handle": "AS209242", "ipv4_count": 512}
                ],
                "share_tech_handle": null
            }
        },
        {"input": "AS0", "error": "reserved AS number", "output": null}
    ]"#;

    #[test]
    fn regroups_flat_contacts() {
        let resp: AsnResponse = serde_json::from_str(CLOUDFLARE).unwrap();
        let info = resp[0].record().unwrap();

        assert_eq!(info.asn, 13335);
        assert_eq!(info.kind, "isp");
        let abuse = info.contact(ContactRole::Abuse);
        assert_eq!(abuse.email, "abuse@cloudflare.com");
        assert_eq!(abuse.kind, "role");
        assert_eq!(info.contact(ContactRole::Tech).name, "Cloudflare NOC");
        assert_eq!(info.contact(ContactRole::Noc), Contact::default());
        assert!(!info.contacts.contains_key(&ContactRole::Registrant));
    }

    #[test]
    fn regroups_related_lists() {
        let resp: AsnResponse = serde_json::from_str(CLOUDFLARE).unwrap();
        let info = resp[0].record().unwrap();

        let related = info.related_by(ContactRole::Abuse);
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].asn, 209_242);
        assert_eq!(related[0].ipv4_count, Some(512));
        assert!(info.related_by(ContactRole::Tech).is_empty());
    }

    #[test]
    fn null_numbers_do_not_sink_the_batch() {
        let json = r#"[
            {"input": "AS1", "error": "", "output": {
                "asn": null, "name": "X", "allocated_at": "",
                "share_admin_handle": [{"asn": null, "handle": "AS9", "allocated_at": "soon"}]
            }},
            {"input": "AS2", "error": "", "output": {"asn": 2, "name": "Y", "ipv4_count": null}}
        ]"#;
        let resp: AsnResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.len(), 2);

        let first = resp[0].record().unwrap();
        assert_eq!(first.asn, 0);
        assert_eq!(first.name, "X");
        assert!(first.created_at.is_none());
        let related = first.related_by(ContactRole::Admin);
        assert_eq!(related[0].asn, 0);
        assert!(related[0].created_at.is_none());

        let second = resp[1].record().unwrap();
        assert_eq!(second.asn, 2);
        assert!(second.ipv4_count.is_none());
    }

    #[test]
    fn failed_item_reports_no_data() {
        let resp: AsnResponse = serde_json::from_str(CLOUDFLARE).unwrap();
        let err = resp[1].record().unwrap_err();
        match err {
            OprError::NoData { input, reason } => {
                assert_eq!(input, "AS0");
                assert_eq!(reason, "reserved AS number");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn serializes_back_to_flat_keys() {
        let resp: AsnResponse = serde_json::from_str(CLOUDFLARE).unwrap();
        let value = serde_json::to_value(&resp).unwrap();
        let out = &value[0]["output"];

        assert_eq!(out["abuse_email"], "abuse@cloudflare.com");
        assert_eq!(out["type"], "isp");
        assert_eq!(out["noc_handle"], "");
        assert_eq!(out["share_abuse_handle"][0]["asn"], 209_242);
        assert_eq!(out["allocated_at"], "2010-07-14T00:00:00Z");
        assert!(value[1]["output"].is_null());
    }
}
