//! Where the CLI keeps its credentials.

use anyhow::Result;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use opr::{CredentialsFile, OprError};

/// File name inside the per-user config directory.
pub const CREDENTIALS_FILE: &str = "credentials.toml";

/// Default credentials path, e.g. `~/.config/opr/credentials.toml` on Linux.
pub fn default_credentials_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "oprand", "opr")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    Ok(dirs.config_dir().join(CREDENTIALS_FILE))
}

/// `explicit` if given, the default location otherwise.
pub fn resolve_credentials_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    explicit.map_or_else(default_credentials_path, Ok)
}

/// Load the stored record, `None` when no file exists yet.
pub fn load_credentials(path: &Path) -> Result<Option<CredentialsFile>> {
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(CredentialsFile::read(path)?))
}

/// Store a key and base64 secret after checking the secret decodes.
pub fn save_credentials(path: &Path, api_key: &str, secret_b64: &str) -> Result<()> {
    let record = CredentialsFile {
        apikey: api_key.trim().to_string(),
        apisecret: secret_b64.trim().to_string(),
    };
    record.credential()?;
    record.write(path)?;
    Ok(())
}

/// `abcd...wxyz` for long keys, `****` otherwise.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

/// Setup hint appended to credential errors.
pub fn setup_hint(err: &OprError) -> Option<&'static str> {
    err.is_credential_error().then_some(
        "Store your API key and secret with:\n  \
         opr config setup\n\n\
         Or point to an existing file with --credentials <PATH> / OPR_CREDENTIALS.",
    )
}
