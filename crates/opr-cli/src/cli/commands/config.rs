//! `opr config` - API credential management.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::{load_credentials, mask_key, save_credentials};
use crate::output::{self, OutputFormat};
use opr::Credential;

#[derive(Debug, Serialize)]
struct CredentialsSummary {
    path: String,
    api_key: Option<String>,
    secret_set: bool,
}

pub fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Setup => setup(&ctx),
        ConfigCommands::Show => show(&ctx),
        ConfigCommands::Path => {
            let mut out = io::stdout().lock();
            writeln!(out, "{}", ctx.credentials_path.display())?;
            Ok(())
        }
    }
}

fn setup(ctx: &Context) -> Result<()> {
    let path = &ctx.credentials_path;
    let existing = load_credentials(path).ok().flatten();

    {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", "Oprand API credentials".bold())?;
        writeln!(out, "Find them in your account at https://oprand.com")?;
        writeln!(out)?;
    }

    let mut key_prompt = Input::<String>::new().with_prompt("API key");
    if let Some(current) = existing.as_ref().filter(|c| !c.apikey.is_empty()) {
        key_prompt = key_prompt.with_initial_text(current.apikey.clone());
    }
    let api_key: String = key_prompt
        .validate_with(|k: &String| {
            if k.trim().is_empty() {
                Err("API key cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let secret = Password::new()
        .with_prompt("API secret (base64)")
        .validate_with(|s: &String| Credential::from_base64("check", s.trim()).map(|_| ()))
        .interact()?;

    save_credentials(path, &api_key, &secret)?;

    writeln!(
        io::stdout().lock(),
        "{} Credentials saved to {}",
        "Success:".green().bold(),
        path.display().to_string().cyan()
    )?;
    Ok(())
}

fn show(ctx: &Context) -> Result<()> {
    let summary = summarize(&ctx.credentials_path)?;
    let mut out = io::stdout().lock();

    if ctx.output_format == OutputFormat::Json {
        return output::write_json(&mut out, &summary);
    }

    writeln!(out, "{}", "Credentials:".bold())?;
    writeln!(out)?;
    writeln!(out, "  {} {}", "file:".bold(), summary.path)?;
    match summary.api_key {
        Some(key) => {
            writeln!(out, "  {} {key}", "api_key:".bold())?;
            let secret = if summary.secret_set {
                "set".to_string()
            } else {
                "(not set)".dimmed().to_string()
            };
            writeln!(out, "  {} {secret}", "api_secret:".bold())?;
        }
        None => {
            writeln!(out, "  {} {}", "api_key:".bold(), "(not set)".dimmed())?;
            writeln!(out)?;
            writeln!(out, "Run {} to store your credentials.", "opr config setup".cyan())?;
        }
    }
    Ok(())
}

fn summarize(path: &Path) -> Result<CredentialsSummary> {
    let stored = load_credentials(path)?;
    Ok(CredentialsSummary {
        path: path.display().to_string(),
        api_key: stored
            .as_ref()
            .filter(|c| !c.apikey.is_empty())
            .map(|c| mask_key(&c.apikey)),
        secret_set: stored.is_some_and(|c| !c.apisecret.is_empty()),
    })
}
