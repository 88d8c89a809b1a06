//! API credentials and where to find them.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use opr_core::{OprError, Result};

/// API key plus the decoded signing secret
#[derive(Clone)]
pub struct Credential {
    api_key: String,
    secret: Vec<u8>,
}

impl Credential {
    #[must_use]
    pub fn new(api_key: impl Into<String>, secret: Vec<u8>) -> Self {
        Self {
            api_key: api_key.into(),
            secret,
        }
    }

    /// Build from the base64 secret shown in the Oprand dashboard.
    pub fn from_base64(api_key: impl Into<String>, secret_b64: &str) -> Result<Self> {
        let secret = STANDARD.decode(secret_b64.trim()).map_err(|e| {
            OprError::CredentialUnavailable(format!("API secret is not valid base64: {e}"))
        })?;
        Ok(Self::new(api_key, secret))
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &self.api_key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Something that can hand out credentials at request time
pub trait CredentialSource: Send + Sync {
    /// Load the credential, or fail with [`OprError::CredentialUnavailable`].
    fn load(&self) -> Result<Credential>;
}

/// Credentials known up front
#[derive(Debug, Clone)]
pub struct StaticCredentials(Credential);

impl StaticCredentials {
    #[must_use]
    pub const fn new(credential: Credential) -> Self {
        Self(credential)
    }
}

impl CredentialSource for StaticCredentials {
    fn load(&self) -> Result<Credential> {
        Ok(self.0.clone())
    }
}

/// On-disk credential record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsFile {
    /// API key
    #[serde(default)]
    pub apikey: String,
    /// Base64-encoded API secret
    #[serde(default)]
    pub apisecret: String,
}

impl CredentialsFile {
    /// Read and parse the TOML file at `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            OprError::CredentialUnavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| {
            OprError::CredentialUnavailable(format!("cannot parse {}: {e}", path.display()))
        })
    }

    /// Write the record to `path`, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OprError::Config(format!("cannot create {}: {e}", parent.display())))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| OprError::Config(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| OprError::Config(format!("cannot write {}: {e}", path.display())))
    }

    /// Decode into a usable credential.
    pub fn credential(&self) -> Result<Credential> {
        if self.apikey.is_empty() {
            return Err(OprError::CredentialUnavailable("API key is empty".into()));
        }
        Credential::from_base64(self.apikey.clone(), &self.apisecret)
    }
}

/// Credentials read from a TOML file on every [`CredentialSource::load`]
#[derive(Debug, Clone)]
pub struct FileCredentials {
    path: PathBuf,
}

impl FileCredentials {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialSource for FileCredentials {
    fn load(&self) -> Result<Credential> {
        debug!(path = %self.path.display(), "loading credentials");
        CredentialsFile::read(&self.path)?.credential()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_from_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");
        std::fs::write(
            &path,
            "apikey = \"key-123\"\napisecret = \"dGVzdC1zZWNyZXQtMDEyMzQ1Njc4OQ==\"\n",
        )
        .unwrap();

        let cred = FileCredentials::new(&path).load().unwrap();
        assert_eq!(cred.api_key(), "key-123");
        assert_eq!(cred.secret(), b"test-secret-0123456789");
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = FileCredentials::new(dir.path().join("nope.toml"))
            .load()
            .unwrap_err();
        assert!(err.is_credential_error());
    }

    #[test]
    fn corrupt_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");
        std::fs::write(&path, "apikey = [").unwrap();
        assert!(FileCredentials::new(&path).load().unwrap_err().is_credential_error());
    }

    #[test]
    fn bad_base64_secret_is_unavailable() {
        let file = CredentialsFile {
            apikey: "k".into(),
            apisecret: "***not base64***".into(),
        };
        assert!(file.credential().unwrap_err().is_credential_error());
    }

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("credentials.toml");
        let file = CredentialsFile {
            apikey: "k".into(),
            apisecret: "c2VjcmV0".into(),
        };
        file.write(&path).unwrap();

        let cred = FileCredentials::new(&path).load().unwrap();
        assert_eq!(cred.secret(), b"secret");
    }

    #[test]
    fn debug_redacts_secret() {
        let cred = Credential::new("k", b"hunter2".to_vec());
        let shown = format!("{cred:?}");
        assert!(shown.contains("REDACTED"));
        assert!(!shown.contains("hunter2"));
    }
}
