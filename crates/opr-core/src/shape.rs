//! Projection of AS records into netblock or address lists.
//!
//! Address enumeration skips every address whose last octet is `0` or `255`,
//! whatever the prefix length. That matches what the Oprand tooling has always
//! printed, and it is knowingly imprecise: a `/28` keeps its own network and
//! broadcast addresses, and inside a `/16` legitimate hosts such as
//! `10.0.1.0` are dropped.

use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;
use tracing::debug;

use crate::types::{AsnInfo, AsnResponseItem};
use crate::{OprError, Result};

/// Which view of an AS record the caller wants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AsnProjection {
    /// The whole record, related systems included
    #[default]
    Full,
    /// IPv4 then IPv6 netblocks, verbatim
    CidrOnly,
    /// Every IPv4 address in the netblocks
    IpOnly,
    /// Netblocks followed by addresses
    CidrAndIp,
}

impl AsnProjection {
    /// Build from the `--cidr` / `--ip` switches
    #[must_use]
    pub const fn from_flags(cidr: bool, ip: bool) -> Self {
        match (cidr, ip) {
            (false, false) => Self::Full,
            (true, false) => Self::CidrOnly,
            (false, true) => Self::IpOnly,
            (true, true) => Self::CidrAndIp,
        }
    }

    const fn wants_cidr(self) -> bool {
        matches!(self, Self::CidrOnly | Self::CidrAndIp)
    }

    const fn wants_ip(self) -> bool {
        matches!(self, Self::IpOnly | Self::CidrAndIp)
    }
}

/// Outcome of shaping one lookup item
#[derive(Debug)]
pub enum Shaped<'a> {
    /// The item as returned, for full rendering
    Full(&'a AsnResponseItem),
    /// Netblocks and/or addresses, produced on demand
    Lines(ShapedLines<'a>),
    /// The lookup failed; nothing to project
    NoData(OprError),
}

/// Lazily enumerated output of a projection.
///
/// Yields lines in block order, then address order. A netblock that cannot be
/// enumerated yields one `Err` in its place and the walk carries on.
pub struct ShapedLines<'a> {
    inner: Box<dyn Iterator<Item = Result<String>> + 'a>,
}

impl Iterator for ShapedLines<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl std::fmt::Debug for ShapedLines<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapedLines").finish_non_exhaustive()
    }
}

/// Project `item` according to `projection`.
///
/// Failures stay local to the item so a batch can carry on with the next one.
pub fn shape(item: &AsnResponseItem, projection: AsnProjection) -> Shaped<'_> {
    if projection == AsnProjection::Full {
        return Shaped::Full(item);
    }

    let info = match item.record() {
        Ok(info) => info,
        Err(e) => {
            debug!(input = %item.input, reason = %item.error, "no data for input");
            return Shaped::NoData(e);
        }
    };

    let netblocks = projection
        .wants_cidr()
        .then(|| cidrs(info))
        .into_iter()
        .flatten()
        .map(Ok);

    let addresses = projection
        .wants_ip()
        .then(|| info.ipv4_ranges.iter().flatten())
        .into_iter()
        .flatten()
        .flat_map(|cidr| hosts_or_error(cidr));

    Shaped::Lines(ShapedLines {
        inner: Box::new(netblocks.chain(addresses)),
    })
}

fn hosts_or_error(cidr: &str) -> Box<dyn Iterator<Item = Result<String>>> {
    match ipv4_hosts(cidr) {
        Ok(hosts) => Box::new(hosts.map(|a| Ok(a.to_string()))),
        Err(e) => {
            debug!(cidr = %cidr, error = %e, "skipping netblock");
            Box::new(std::iter::once(Err(e)))
        }
    }
}

fn cidrs(info: &AsnInfo) -> impl Iterator<Item = String> + '_ {
    info.ipv4_ranges
        .iter()
        .flatten()
        .chain(info.ipv6_ranges.iter().flatten())
        .cloned()
}

/// Enumerate the addresses of an IPv4 netblock, ascending, skipping `.0` and `.255`.
///
/// Host bits in `cidr` are masked off first, so `10.0.0.7/30` walks `10.0.0.4/30`.
pub fn ipv4_hosts(cidr: &str) -> Result<impl Iterator<Item = Ipv4Addr>> {
    let invalid = |reason: String| OprError::InvalidCidr {
        cidr: cidr.to_string(),
        reason,
    };

    if !cidr.contains('/') {
        return Err(invalid("no '/' in prefix".to_string()));
    }
    let parsed: Ipv4Network = cidr.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    let block = Ipv4Network::new(parsed.network(), parsed.prefix())
        .map_err(|e| invalid(format!("{e}")))?;

    Ok(block.iter().filter(|a| !matches!(a.octets()[3], 0 | 255)))
}
