//! `opr asn` - Autonomous System lookups.

use anyhow::{bail, Result};
use colored::Colorize;
use std::io::{self, BufRead, IsTerminal, Write};
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;

use super::Context;
use crate::cli::args::AsnArgs;
use crate::output::{self, or_dash, write_block, OutputFormat};
use opr::{
    shape, AsnInfo, AsnProjection, AsnResponse, AsnResponseItem, ContactRole, RelatedAsn, Shaped,
};

const FIELD_WIDTH: usize = 11;
const CONTACT_WIDTH: usize = 7;
const SOURCE_URL: &str = "https://oprand.com/asn";

#[derive(Tabled)]
struct RelatedRow {
    #[tabled(rename = "Handle")]
    handle: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IPv4")]
    ipv4_count: String,
}

pub async fn execute(ctx: Context, args: AsnArgs) -> Result<()> {
    if ctx.output_format == OutputFormat::Csv {
        bail!("CSV output is not available for asn; use --output json or --output pretty");
    }

    let inputs = if args.inputs.is_empty() {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            bail!("no input found\n\nUsage: opr asn [--ip] [--cidr] <as-number | ipv4 | @example.com | example.com | me>...");
        }
        read_inputs(stdin.lock())?
    } else {
        split_inputs(args.inputs.iter().map(String::as_str))
    };
    if inputs.is_empty() {
        bail!("no input found");
    }
    debug!(count = inputs.len(), "looking up ASN inputs");

    let projection = AsnProjection::from_flags(args.cidr, args.ip);
    let response = ctx.public_client()?.asn().lookup(&inputs).await?;

    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    write_response(&mut out, &mut err, &response, projection, ctx.output_format)?;
    out.flush()?;
    Ok(())
}

/// Split raw arguments on whitespace and strip surrounding commas.
pub fn split_inputs<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    raw.into_iter()
        .flat_map(str::split_whitespace)
        .map(|token| token.trim_matches(','))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read inputs from piped text, one or more per line.
pub fn read_inputs(reader: impl BufRead) -> io::Result<Vec<String>> {
    let lines = reader.lines().collect::<io::Result<Vec<_>>>()?;
    Ok(split_inputs(lines.iter().map(String::as_str)))
}

/// Render a lookup batch.
///
/// Projected lines go to `out` as they are enumerated, or into one JSON array;
/// items without data and unusable netblocks are reported on `err` and the
/// batch carries on.
pub fn write_response(
    out: &mut impl Write,
    err: &mut impl Write,
    response: &AsnResponse,
    projection: AsnProjection,
    format: OutputFormat,
) -> Result<()> {
    if projection == AsnProjection::Full {
        if format == OutputFormat::Json {
            return output::write_json(out, response);
        }
        for item in response {
            write_item(out, item)?;
        }
        return Ok(());
    }

    let mut collected = Vec::new();
    for item in response {
        match shape(item, projection) {
            Shaped::Full(item) => write_item(out, item)?,
            Shaped::NoData(e) => writeln!(err, "{e}")?,
            Shaped::Lines(lines) => {
                for line in lines {
                    match line {
                        Ok(line) if format == OutputFormat::Json => collected.push(line),
                        Ok(line) => writeln!(out, "{line}")?,
                        Err(e) => writeln!(err, "{e}")?,
                    }
                }
            }
        }
    }

    if format == OutputFormat::Json {
        output::write_json(out, &collected)?;
    }
    Ok(())
}

/// Human-friendly rendering of one lookup item.
pub fn write_item(out: &mut impl Write, item: &AsnResponseItem) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{}{}",
        format!("{:<12}", "INPUT").bold().on_truecolor(255, 193, 7),
        item.input.on_truecolor(255, 193, 7)
    )?;
    if !item.error.is_empty() {
        writeln!(
            out,
            "{}{}",
            format!("{:<12}", "ERROR").bold().on_red(),
            item.error.on_red()
        )?;
    }

    match &item.output {
        Some(info) => write_info(out, info),
        None => writeln!(out, "{}", "No data found".italic()),
    }
}

fn write_info(out: &mut impl Write, info: &AsnInfo) -> io::Result<()> {
    let asn = if info.asn == 0 {
        String::new()
    } else {
        info.asn.to_string()
    };
    let registry = match (info.rir_name.as_deref(), info.rir_url.as_deref()) {
        (name, Some(url)) if !url.is_empty() => format!("{} ({url})", or_dash(name.unwrap_or_default())),
        (name, _) => name.unwrap_or_default().to_string(),
    };

    field(out, "ASN", &asn)?;
    field(out, "HANDLE", &info.handle)?;
    if !info.handle.is_empty() {
        field(out, "SOURCE", &format!("{SOURCE_URL}/{}", info.handle))?;
    }
    field(out, "NAME", &info.name)?;
    field(out, "STATUS", info.status.as_deref().unwrap_or_default())?;
    field(out, "DOMAIN", info.domain.as_deref().unwrap_or_default())?;
    field(out, "REGISTRY", &registry)?;
    field(out, "TYPE", &info.kind)?;
    field(out, "DESC", &info.description)?;
    field(out, "COUNTRY", &info.country)?;
    field(out, "ALLOCATED", &date(info.created_at))?;
    field(out, "UPDATED", &date(info.updated_at))?;

    for role in ContactRole::ALL {
        write_contact(out, info, role)?;
    }

    writeln!(
        out,
        "{}  {}",
        "IP SPACE".bold(),
        "(use --cidr or --ip to get full list)".italic()
    )?;
    let v4_blocks = info.ipv4_ranges.as_ref().map_or(0, Vec::len);
    let v6_blocks = info.ipv6_ranges.as_ref().map_or(0, Vec::len);
    write_block(out, 14, "IPV4 COUNT", &[info.ipv4_count.unwrap_or(0).to_string()])?;
    write_block(out, 14, "IPV4 NETBLOCKS", &[v4_blocks.to_string()])?;
    write_block(out, 14, "IPV6 NETBLOCKS", &[v6_blocks.to_string()])?;

    writeln!(out, "{}", "RELATED".bold())?;
    for role in [ContactRole::Registrant, ContactRole::Admin, ContactRole::Abuse, ContactRole::Tech] {
        write_related(out, role, info.related_by(role))?;
    }
    Ok(())
}

/// Top-level `LABEL      value` row; extra value lines are aligned under the first.
fn field(out: &mut impl Write, label: &str, value: &str) -> io::Result<()> {
    let pad = " ".repeat(FIELD_WIDTH.saturating_sub(label.len()) + 1);
    let mut lines = or_dash(value).lines();
    writeln!(out, "{}{pad}{}", label.bold(), lines.next().unwrap_or("-"))?;
    for line in lines {
        writeln!(out, "{}{line}", " ".repeat(FIELD_WIDTH + 1))?;
    }
    Ok(())
}

fn write_contact(out: &mut impl Write, info: &AsnInfo, role: ContactRole) -> io::Result<()> {
    let contact = info.contact(role);

    if role == ContactRole::Noc {
        writeln!(out, "{} (Network Operation Center)", role.label().bold())?;
    } else {
        writeln!(out, "{}", role.label().bold())?;
    }

    let kind = title(or_dash(&contact.kind));
    let mut rows = vec![
        ("HANDLE", contact.handle.as_str()),
        ("TYPE", kind.as_str()),
        ("NAME", contact.name.as_str()),
        ("COUNTRY", contact.country.as_str()),
        ("EMAIL", contact.email.as_str()),
        ("PHONE", contact.phone.as_str()),
        ("ADDRESS", contact.address.as_str()),
    ];
    if role == ContactRole::Noc {
        rows.push(("FAX", contact.fax.as_str()));
    }

    for (label, value) in rows {
        let lines: Vec<&str> = or_dash(value).lines().collect();
        write_block(out, CONTACT_WIDTH, label, &lines)?;
    }
    Ok(())
}

fn write_related(out: &mut impl Write, role: ContactRole, related: &[RelatedAsn]) -> io::Result<()> {
    let heading = format!("BY {} HANDLE", role.label());
    if related.is_empty() {
        writeln!(out, "    {}", heading.bold())?;
        return writeln!(out, "        {}", "None".italic());
    }

    writeln!(out, "    {} ({})", heading.bold(), related.len())?;
    let rows: Vec<RelatedRow> = related
        .iter()
        .map(|r| RelatedRow {
            handle: r.handle.clone(),
            name: r.name.clone(),
            ipv4_count: r.ipv4_count.map_or_else(|| "-".to_string(), |n| format!("{n} IPs")),
        })
        .collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    for line in table.lines() {
        writeln!(out, "        {line}")?;
    }
    Ok(())
}

fn date(at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// Upper-case the first letter of every word.
fn title(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
