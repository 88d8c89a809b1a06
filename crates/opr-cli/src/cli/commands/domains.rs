//! `opr domains` - Verified domains of the account.

use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::output::{self, OutputFormat};
use opr::{DomainsResponse, PayloadFormat};

#[derive(Tabled)]
struct DomainRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub async fn execute(ctx: Context) -> Result<()> {
    let client = ctx.client()?;

    match ctx.output_format {
        OutputFormat::Json => {
            let body = client.domains().raw(PayloadFormat::Json).await?;
            output::write_raw(&mut io::stdout().lock(), &body)?;
        }
        OutputFormat::Csv => {
            let body = client.domains().raw(PayloadFormat::Csv).await?;
            output::write_raw(&mut io::stdout().lock(), &body)?;
        }
        OutputFormat::Pretty => {
            let response = client.domains().list().await?;
            let mut out = io::stdout().lock();
            write_domains(&mut out, &response)?;
            out.flush()?;
        }
    }

    Ok(())
}

/// Table of verified domains with the monitoring note.
pub fn write_domains(out: &mut impl Write, response: &DomainsResponse) -> io::Result<()> {
    writeln!(out, "{}", "DOMAINS:".bold())?;

    if response.total() > 0 && !response.results.is_empty() {
        let rows: Vec<DomainRow> = response
            .results
            .iter()
            .map(|d| DomainRow {
                domain: d.domain.clone(),
                status: if d.is_active {
                    d.status().green().to_string()
                } else {
                    d.status().dimmed().to_string()
                },
            })
            .collect();
        let table = Table::new(&rows).with(Style::rounded()).to_string();
        writeln!(out, "{table}")?;
    } else {
        writeln!(out, "    No domains under your account.")?;
    }

    writeln!(
        out,
        "\n{} active/inactive indicates whether or not suspicious domains are being checked for this domain.",
        "INFO:".bold()
    )
}
