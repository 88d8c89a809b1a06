//! Command-line argument definitions using clap.

use clap::builder::{PossibleValue, PossibleValuesParser};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;
use opr::QUERY_KEYWORDS;

/// Command-line access to Oprand data
///
/// Public commands work anonymously. Private commands need an oprand.com
/// account; run `opr config setup` once to store your API credentials.
#[derive(Parser, Debug)]
#[command(name = "opr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Credentials file (defaults to the per-user config directory)
    #[arg(long, env = "OPR_CREDENTIALS", global = true, value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Private API base URL
    #[arg(long, env = "OPR_API_URL", global = true, hide = true)]
    pub api_url: Option<String>,

    /// ASN lookup base URL
    #[arg(long, env = "OPR_ASN_URL", global = true, hide = true)]
    pub asn_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch your verified domains' scan results (account required)
    #[command(visible_alias = "r")]
    Results(ResultsArgs),

    /// List your verified domains (account required)
    #[command(visible_alias = "d")]
    Domains,

    /// Get Autonomous System information
    ///
    /// Inputs may be an AS number (AS3), any member IPv4 address (1.1.1.1),
    /// any domain (oprand.com), the domain of the email used to register the
    /// AS (@mit.edu), or "me" for your own IP. Reads stdin when no input is
    /// given on the command line.
    #[command(visible_alias = "a")]
    Asn(AsnArgs),

    /// Manage your Oprand API credentials
    #[command(visible_alias = "c")]
    Config(ConfigArgs),
}

/// Arguments for `opr results`
#[derive(Args, Debug)]
pub struct ResultsArgs {
    /// Verified domain whose fuzzed variants to fetch
    pub domain: String,

    /// Filter results, comma separated (e.g. web,whois,-mx)
    #[arg(
        short,
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        value_parser = PossibleValuesParser::new(query_keywords())
    )]
    pub query: Vec<String>,
}

fn query_keywords() -> Vec<PossibleValue> {
    QUERY_KEYWORDS
        .iter()
        .map(|(keyword, help)| PossibleValue::new(*keyword).help(*help))
        .collect()
}

/// Arguments for `opr asn`
#[derive(Args, Debug)]
pub struct AsnArgs {
    /// Output only the assignable IPv4 addresses under the AS
    #[arg(long, visible_alias = "ips")]
    pub ip: bool,

    /// Output only the netblocks (IPv4 then IPv6) under the AS
    #[arg(long, visible_aliases = ["netblocks", "netblock"])]
    pub cidr: bool,

    /// AS numbers, IPv4 addresses, domains, @email-domains or "me"
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<String>,
}

/// Arguments for `opr config`
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Prompt for your API key and secret and store them
    Setup,

    /// Show the stored credentials (key masked)
    Show,

    /// Print the credentials file path
    Path,
}
