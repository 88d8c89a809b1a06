//! `opr results` - Scan results for the fuzzed variants of a verified domain.

use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};

use super::Context;
use crate::cli::args::ResultsArgs;
use crate::output::{self, write_block, OutputFormat};
use opr::{expand, Expansion, PayloadFormat, ScanResult, SystemClock};

const DNS_WIDTH: usize = 10;
const WHOIS_WIDTH: usize = 10;
const WEB_WIDTH: usize = 15;
const SSL_WIDTH: usize = 7;

pub async fn execute(ctx: Context, args: ResultsArgs) -> Result<()> {
    let client = ctx.client()?;
    let request = client.results().domain(&args.domain).query(args.query);

    match ctx.output_format {
        OutputFormat::Json | OutputFormat::Csv => {
            let format = if ctx.output_format == OutputFormat::Csv {
                PayloadFormat::Csv
            } else {
                PayloadFormat::Json
            };
            let body = request.format(format).raw().await?;
            output::write_raw(&mut io::stdout().lock(), &body)?;
        }
        OutputFormat::Pretty => {
            let response = request.send().await?;
            let clock = SystemClock;

            let mut out = io::stdout().lock();
            for result in response.results {
                write_result(&mut out, &expand(result, &clock))?;
            }
            write_total(&mut out, response.meta.total)?;
            out.flush()?;
        }
    }

    Ok(())
}

/// Human-friendly rendering of one expanded result.
pub fn write_result(out: &mut impl Write, r: &ScanResult) -> io::Result<()> {
    let ex = r.expansion();

    let name = if r.fuzzed_domain_unicode.is_empty() {
        &r.fuzzed_domain
    } else {
        &r.fuzzed_domain_unicode
    };
    let scanned = r.scanned_at.map_or_else(
        || "-".to_string(),
        |at| format!("{} ({} ago)", at.format("%Y-%m-%d %H:%M"), ex.scanned_at_since),
    );
    writeln!(
        out,
        "{} {}  {}{}  {}{}",
        " ⁃ ".on_truecolor(255, 193, 7),
        name.bold(),
        "fuzzer:".bold(),
        r.fuzzer,
        "scanned:".bold(),
        scanned
    )?;

    write_dns(out, r)?;
    write_whois(out, r, &ex)?;
    write_web(out, r)?;
    write_ssl(out, r, &ex)?;
    writeln!(out)
}

/// `TOTAL: N result(s)` footer, skipped when the server sent no total.
pub fn write_total(out: &mut impl Write, total: Option<i64>) -> io::Result<()> {
    match total {
        Some(n) => {
            let plural = if n > 1 { "s" } else { "" };
            writeln!(out, "\nTOTAL: {n} result{plural}")
        }
        None => Ok(()),
    }
}

fn text(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn write_dns(out: &mut impl Write, r: &ScanResult) -> io::Result<()> {
    writeln!(out, "{}", "DNS".bold())?;

    let lists = [
        ("A", &r.dns_a),
        ("NS", &r.dns_ns),
        ("AAAA", &r.dns_aaaa),
        ("CNAME", &r.dns_cname),
        ("TXT", &r.dns_txt),
        ("MX", &r.dns_mx),
    ];
    for (label, records) in lists {
        if !records.is_empty() {
            write_block(out, DNS_WIDTH, label, &[records.join("  ")])?;
        }
    }

    let singles = [
        ("SPF", r.dns_spf.as_deref()),
        ("DMARC", r.dns_dmarc.as_deref()),
        ("DKIM", r.dns_dkim.as_deref()),
    ];
    for (label, record) in singles {
        if let Some(value) = text(record) {
            write_block(out, DNS_WIDTH, label, &[value])?;
        }
    }
    Ok(())
}

fn write_whois(out: &mut impl Write, r: &ScanResult, ex: &Expansion) -> io::Result<()> {
    writeln!(out, "{}", "WHOIS".bold())?;

    let registered = text(r.whois_registered_at.as_deref());
    if registered.is_none() && !ex.whois_registrar_any_info && !ex.whois_registrant_any_info {
        return writeln!(out, "    {}", "UNKNOWN".italic());
    }

    let mut dates = Vec::new();
    if let Some(at) = registered {
        dates.push(format!("REGISTERED .. {at} ({} ago)", ex.whois_registered_at_since));
    }
    if let Some(at) = text(r.whois_updated_at.as_deref()) {
        dates.push(format!("UPDATED ..... {at} ({} ago)", ex.whois_updated_at_since));
    }
    if let Some(at) = text(r.whois_expiring_at.as_deref()) {
        dates.push(format!("EXPIRING .... {at} (in {})", ex.whois_expiring_at_since));
    }
    write_block(out, WHOIS_WIDTH, "DOMAIN", &dates)?;

    let mut registrar = Vec::new();
    if ex.whois_registrar_any_info {
        registrar.extend(text(r.whois_registrar_name.as_deref()).map(str::to_string));
        if ex.abuse_info_any {
            let contact: Vec<&str> = [r.whois_abuse_email.as_deref(), r.whois_abuse_phone.as_deref()]
                .into_iter()
                .filter_map(text)
                .collect();
            registrar.push(contact.join("  "));
        }
        if let Some(id) = text(r.whois_registrar_iana_id.as_deref()) {
            registrar.push(format!("IANA ID: {id}"));
        }
    }
    write_unknown_if_empty(out, "REGISTRAR", &registrar)?;

    let mut registrant = Vec::new();
    if ex.whois_registrant_any_info {
        let mut first = text(r.whois_registrant_name.as_deref())
            .unwrap_or_default()
            .to_string();
        if let Some(id) = text(r.whois_registrant_id.as_deref()) {
            first = format!("{first}  ID: {id}");
        }
        registrant.push(first.trim().to_string());
        registrant.extend(text(r.whois_registrant_email.as_deref()).map(str::to_string));
        let location: Vec<&str> = [
            r.whois_registrant_address.as_deref(),
            r.whois_registrant_country.as_deref(),
        ]
        .into_iter()
        .filter_map(text)
        .collect();
        if !location.is_empty() {
            registrant.push(location.join(", "));
        }
        registrant.retain(|l| !l.is_empty());
    }
    write_unknown_if_empty(out, "REGISTRANT", &registrant)
}

fn write_unknown_if_empty(out: &mut impl Write, label: &str, lines: &[String]) -> io::Result<()> {
    if lines.is_empty() {
        write_block(out, WHOIS_WIDTH, label, &["UNKNOWN".italic().to_string()])
    } else {
        write_block(out, WHOIS_WIDTH, label, lines)
    }
}

fn write_web(out: &mut impl Write, r: &ScanResult) -> io::Result<()> {
    writeln!(out, "{}", "WEB".bold())?;
    if !r.web_has_http_server {
        return writeln!(out, "    {}", "NOT DETECTED".italic());
    }

    let status = r.web_http_status_code.map(|c| c.to_string());
    let lang = text(r.web_lang.as_deref()).map(str::to_uppercase);
    let optional = [
        ("VALID URL", text(r.web_end_url.as_deref())),
        ("HTTP BANNER", text(r.web_banner_http.as_deref())),
        ("HTTP STATUS", status.as_deref()),
        ("HTML TITLE", text(r.web_html_title.as_deref())),
        ("LANGUAGE", lang.as_deref()),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            write_block(out, WEB_WIDTH, label, &[value])?;
        }
    }

    let flags = [
        ("CRED. HARVESTER", r.web_has_credential_harvester),
        ("MENTION DOMAIN", r.web_page_contains_domain),
        ("MENTION BRAND", r.web_page_contains_brand_name),
        ("REDIRECT", r.web_redirect_to_domain),
    ];
    for (label, flag) in flags {
        write_block(out, WEB_WIDTH, label, &[flag.to_string()])?;
    }
    Ok(())
}

fn write_ssl(out: &mut impl Write, r: &ScanResult, ex: &Expansion) -> io::Result<()> {
    writeln!(out, "{}", "SSL".bold())?;
    if !ex.ssl_any_info {
        return writeln!(out, "    {}", "NOT DETECTED".italic());
    }

    let mut issuer = Vec::new();
    let names: Vec<&str> = [r.ssl_issuer_common_name.as_deref(), r.ssl_issuer_org.as_deref()]
        .into_iter()
        .filter_map(text)
        .collect();
    if !names.is_empty() {
        issuer.push(names.join(", "));
    }
    issuer.extend(text(r.ssl_issuer_addr.as_deref()).map(str::to_string));
    issuer.extend(text(r.ssl_issuer_country.as_deref()).map(str::to_string));
    write_block(out, SSL_WIDTH, "ISSUER", &issuer)?;

    let mut cert = Vec::new();
    if let Some(not_after) = r.ssl_cert_not_after {
        cert.push(format!(
            "VALID ...... {} (expires {})",
            ex.ssl_is_cert_valid,
            not_after.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    if let Some(sig) = text(r.ssl_cert_sig.as_deref()) {
        let alg = text(r.ssl_cert_sig_alg.as_deref()).unwrap_or("-");
        cert.push(format!("SIGNATURE .. {alg} / {sig} (last 8 char)"));
    }
    if let Some(subject) = text(r.ssl_subject_rfc2253_name.as_deref()) {
        cert.push(format!("SUBJECT .... {subject}"));
    }
    if let Some(issuer) = text(r.ssl_issuer_rfc2253_name.as_deref()) {
        cert.push(format!("ISSUER ..... {issuer}"));
    }
    write_block(out, SSL_WIDTH, "CERT", &cert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opr_core::MockClock;
    use serde_json::json;

    fn render(value: serde_json::Value) -> String {
        colored::control::set_override(false);
        let clock = MockClock::from_rfc3339("2024-03-01T00:00:00Z");
        let result: ScanResult = serde_json::from_value(value).unwrap();
        let mut out = Vec::new();
        write_result(&mut out, &expand(result, &clock)).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn renders_full_result() {
        let text = render(json!({
            "domain": "example.com",
            "fuzzer": "homoglyph",
            "fuzzed_domain": "xn--exmple-cua.com",
            "fuzzed_domain_unicode": "exämple.com",
            "scanned_at": "2024-02-29T00:00:00Z",
            "dns_a": ["192.0.2.1", "192.0.2.2"],
            "dns_mx": ["mx.exämple.com"],
            "whois_created": "2024-02-01T00:00:00Z",
            "whois_registrar": "Registrar Inc",
            "whois_abuse_email": "abuse@registrar.test",
            "whois_abuse_phone": "+1.555",
            "whois_registrant_email": "not-an-email",
            "whois_registrant_country": "FR",
            "web_has_http_server": true,
            "web_http_status_code": 200,
            "web_html_title": "  Login  ",
            "web_lang": "fr",
            "ssl_issuer_org": "Let's Encrypt",
            "ssl_cert_not_after": "2024-06-01T00:00:00Z",
            "ssl_cert_sig": "0123456789abcdef",
            "ssl_cert_sig_alg": "SHA256-RSA"
        }));

        assert!(text.contains("exämple.com  fuzzer:homoglyph  scanned:2024-02-29 00:00 (1d ago)"));
        assert!(text.contains("    A          192.0.2.1  192.0.2.2\n"));
        assert!(text.contains("REGISTERED .. 2024-02-01T00:00:00Z (4w1d ago)"));
        assert!(text.contains("    REGISTRAR  Registrar Inc\n               abuse@registrar.test  +1.555\n"));
        assert!(text.contains("    REGISTRANT FR\n"));
        assert!(!text.contains("not-an-email"));
        assert!(text.contains("    HTML TITLE      Login\n"));
        assert!(text.contains("    LANGUAGE        FR\n"));
        assert!(text.contains("    CRED. HARVESTER false\n"));
        assert!(text.contains("VALID ...... true (expires 2024-06-01 00:00:00 UTC)"));
        assert!(text.contains("SIGNATURE .. SHA256-RSA / 89abcdef (last 8 char)"));
    }

    #[test]
    fn renders_empty_sections() {
        let text = render(json!({
            "fuzzer": "addition",
            "fuzzed_domain": "examplea.com"
        }));

        assert!(text.contains("examplea.com  fuzzer:addition  scanned:-"));
        assert!(text.contains("WHOIS\n    UNKNOWN\n"));
        assert!(text.contains("WEB\n    NOT DETECTED\n"));
        assert!(text.contains("SSL\n    NOT DETECTED\n"));
    }

    #[test]
    fn total_footer() {
        let mut out = Vec::new();
        write_total(&mut out, Some(1)).unwrap();
        write_total(&mut out, Some(3)).unwrap();
        write_total(&mut out, None).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nTOTAL: 1 result\n\nTOTAL: 3 results\n"
        );
    }
}
