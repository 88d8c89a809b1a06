//! Display-oriented expansion of scan results.

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use tracing::debug;

use crate::clock::Clock;
use crate::types::{Expansion, ScanResult};

/// Layout of the WHOIS timestamps sent by the API
const WHOIS_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Registrant emails longer than this are dropped
const MAX_REGISTRANT_EMAIL_LEN: usize = 50;

/// Registry-assigned prefix stripped from long registrant ids
const REGISTRANT_ID_PREFIX_LEN: usize = 20;

/// Characters of the certificate signature kept for display
const CERT_SIG_TAIL_LEN: usize = 8;

/// Derive the display fields of `r` relative to `clock`.
///
/// A record that already carries an [`Expansion`] is returned untouched, so
/// the sanitizing steps below are applied at most once.
pub fn expand(mut r: ScanResult, clock: &dyn Clock) -> ScanResult {
    if r.expanded.is_some() {
        debug!(domain = %r.fuzzed_domain, "result already expanded");
        return r;
    }

    let now = clock.now_utc();
    let mut x = Expansion {
        whois_registrar_any_info: r.whois_registrar_name.is_some()
            || r.whois_registrar_iana_id.is_some()
            || r.whois_abuse_email.is_some()
            || r.whois_abuse_phone.is_some(),
        whois_registrant_any_info: r.whois_registrant_name.is_some()
            || r.whois_registrant_id.is_some()
            || r.whois_registrant_address.is_some()
            || r.whois_registrant_country.is_some()
            || r.whois_registrant_email.is_some(),
        abuse_info_any: non_empty(r.whois_abuse_email.as_deref())
            && non_empty(r.whois_abuse_phone.as_deref()),
        ssl_any_info: non_empty(r.ssl_cert_sig.as_deref()),
        ssl_is_cert_valid: r.ssl_cert_not_after.is_some_and(|t| now < t),
        ..Expansion::default()
    };

    if let Some(email) = r.whois_registrant_email.as_mut() {
        if !email.contains('@') || email.chars().count() > MAX_REGISTRANT_EMAIL_LEN {
            email.clear();
        }
    }

    if let Some(id) = r.whois_registrant_id.as_mut() {
        if id.chars().count() > REGISTRANT_ID_PREFIX_LEN {
            *id = id.chars().skip(REGISTRANT_ID_PREFIX_LEN).collect();
        }
    }

    if let Some(addr) = r.whois_registrant_address.as_mut() {
        *addr = collapse_lines(addr);
    }

    if let Some(title) = r.web_html_title.as_mut() {
        *title = title.trim().to_string();
    }

    x.whois_registered_at_since = whois_since(r.whois_registered_at.as_deref(), now, false);
    x.whois_updated_at_since = whois_since(r.whois_updated_at.as_deref(), now, false);
    x.whois_expiring_at_since = whois_since(r.whois_expiring_at.as_deref(), now, true);
    x.scanned_at_since = r
        .scanned_at
        .map(|t| humanize(abs(now - t)))
        .unwrap_or_default();

    if let Some(sig) = r.ssl_cert_sig.as_mut() {
        let len = sig.chars().count();
        if len > CERT_SIG_TAIL_LEN {
            *sig = sig.chars().skip(len - CERT_SIG_TAIL_LEN).collect();
        }
    }

    r.expanded = Some(x);
    r
}

/// Format `d` with its two most significant units and no spaces, e.g. `3w2d`.
///
/// Units are years of 365 days, weeks, days, hours, minutes, seconds,
/// milliseconds and microseconds. Negative durations get a leading `-`.
pub fn humanize(d: TimeDelta) -> String {
    let negative = d < TimeDelta::zero();
    let d = if negative { -d } else { d };

    let secs = d.num_seconds();
    let sub_us = i64::from(d.subsec_nanos()) / 1_000;
    let total_days = secs / 86_400;
    let year_days = total_days % 365;

    let units = [
        (total_days / 365, "y"),
        (year_days / 7, "w"),
        (year_days % 7, "d"),
        (secs / 3_600 % 24, "h"),
        (secs / 60 % 60, "m"),
        (secs % 60, "s"),
        (sub_us / 1_000, "ms"),
        (sub_us % 1_000, "us"),
    ];

    let out: String = units
        .iter()
        .filter(|(v, _)| *v > 0)
        .take(2)
        .map(|(v, u)| format!("{v}{u}"))
        .collect();

    match (out.is_empty(), negative) {
        (true, _) => "0s".to_string(),
        (false, true) => format!("-{out}"),
        (false, false) => out,
    }
}

fn whois_since(raw: Option<&str>, now: DateTime<Utc>, unsigned: bool) -> String {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return String::new();
    };
    match NaiveDateTime::parse_from_str(raw, WHOIS_TIME_FORMAT) {
        Ok(naive) => {
            let elapsed = now - Utc.from_utc_datetime(&naive);
            humanize(if unsigned { abs(elapsed) } else { elapsed })
        }
        Err(e) => {
            debug!(timestamp = raw, error = %e, "unparseable whois timestamp");
            String::new()
        }
    }
}

fn abs(d: TimeDelta) -> TimeDelta {
    if d < TimeDelta::zero() {
        -d
    } else {
        d
    }
}

/// Drop blank lines and glue the rest together.
fn collapse_lines(s: &str) -> String {
    s.lines()
        .filter(|l| !l.trim().is_empty())
        .collect::<String>()
        .trim()
        .to_string()
}

fn non_empty(s: Option<&str>) -> bool {
    s.is_some_and(|s| !s.is_empty())
}
