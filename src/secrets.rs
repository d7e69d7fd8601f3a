// Credential and token persistence. The API client only sees the
// `SecretStore` trait; `FileSecretStore` is what the binary uses.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SecretKey {
    Username,
    Password,
    Token,
}

impl SecretKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretKey::Username => "username",
            SecretKey::Password => "password",
            SecretKey::Token => "token",
        }
    }
}

/// Opaque get/set of secrets by key.
pub trait SecretStore {
    fn get(&self, key: SecretKey) -> Result<Option<String>>;

    fn set(&mut self, key: SecretKey, value: &str) -> Result<()>;

    fn stored_credentials(&self) -> Result<(Option<String>, Option<String>)> {
        Ok((self.get(SecretKey::Username)?, self.get(SecretKey::Password)?))
    }

    fn store_credentials(&mut self, username: &str, password: &str) -> Result<()> {
        self.set(SecretKey::Username, username)?;
        self.set(SecretKey::Password, password)
    }

    fn stored_token(&self) -> Result<Option<String>> {
        self.get(SecretKey::Token)
    }

    fn store_token(&mut self, token: &str) -> Result<()> {
        self.set(SecretKey::Token, token)
    }
}

/// Secrets kept in a small TOML file, values base64-encoded. This keeps them
/// out of plain sight but is not encryption; the file is created 0600 on
/// Unix.
pub struct FileSecretStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileSecretStore {
    /// Loads the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).map_err(|e| Error::SecretStore {
                reason: format!("{}: {e}", path.display()),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(FileSecretStore { path, entries })
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string(&self.entries).map_err(|e| Error::SecretStore {
            reason: e.to_string(),
        })?;
        write_private(&self.path, text.as_bytes())?;
        debug!(path = %self.path.display(), "secret store saved");
        Ok(())
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: SecretKey) -> Result<Option<String>> {
        let Some(encoded) = self.entries.get(key.as_str()) else {
            return Ok(None);
        };
        let bytes = STANDARD.decode(encoded).map_err(|e| Error::SecretStore {
            reason: format!("corrupt `{}` entry: {e}", key.as_str()),
        })?;
        let value = String::from_utf8(bytes).map_err(|e| Error::SecretStore {
            reason: format!("corrupt `{}` entry: {e}", key.as_str()),
        })?;
        Ok(Some(value))
    }

    fn set(&mut self, key: SecretKey, value: &str) -> Result<()> {
        self.entries
            .insert(key.as_str().to_string(), STANDARD.encode(value));
        self.persist()
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    fs::write(path, contents)
}

/// In-process store.
#[derive(Debug, Default, Clone)]
pub struct MemorySecretStore {
    entries: BTreeMap<SecretKey, String>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(username: &str, password: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(SecretKey::Username, username.to_string());
        store.entries.insert(SecretKey::Password, password.to_string());
        store
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: SecretKey) -> Result<Option<String>> {
        Ok(self.entries.get(&key).cloned())
    }

    fn set(&mut self, key: SecretKey, value: &str) -> Result<()> {
        self.entries.insert(key, value.to_string());
        Ok(())
    }
}
