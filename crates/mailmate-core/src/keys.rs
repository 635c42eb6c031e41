//! Persisted symmetric key for credential encryption.
//!
//! Exactly one key exists per data directory. It is generated on first use
//! and reused on every later run, so credentials saved by one process can be
//! read by the next.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{debug, info};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};
use crate::storage;

/// Length of the AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// A 256-bit key, wiped from memory when dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Generates a fresh key from the system CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the system random source fails.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; KEY_LEN];
        SystemRandom::new()
            .fill(&mut bytes)
            .map_err(|_| Error::Crypto("system random source unavailable"))?;
        Ok(Self(bytes))
    }

    /// Wraps raw key bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub(crate) const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    fn encode(&self) -> String {
        URL_SAFE.encode(self.0)
    }

    fn decode(text: &str) -> Option<Self> {
        let mut decoded = URL_SAFE.decode(text.trim()).ok()?;
        let key = <[u8; KEY_LEN]>::try_from(decoded.as_slice()).ok().map(Self);
        decoded.zeroize();
        key
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Loads or creates the key file.
#[derive(Debug, Clone)]
pub struct KeyManager {
    path: PathBuf,
}

impl KeyManager {
    /// Creates a manager for the key file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the key file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the persisted key, generating and storing one if none exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the file cannot be read or written, or
    /// if it exists but does not hold a valid key. A corrupt key is never
    /// silently replaced, since that would orphan stored credentials.
    pub fn get_or_create_key(&self) -> Result<SecretKey> {
        if let Some(key) = self.load()? {
            return Ok(key);
        }

        let key = SecretKey::generate()?;
        match self.create(&key) {
            Ok(()) => {
                info!("Generated new encryption key at {}", self.path.display());
                Ok(key)
            }
            // Another process created it first; use theirs.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => self
                .load()?
                .ok_or_else(|| Error::storage(&self.path, io::ErrorKind::NotFound.into())),
            Err(e) => Err(Error::storage(&self.path, e)),
        }
    }

    fn load(&self) -> Result<Option<SecretKey>> {
        let Some(mut bytes) = storage::read_optional(&self.path)? else {
            return Ok(None);
        };

        let key = std::str::from_utf8(&bytes).ok().and_then(SecretKey::decode);
        bytes.zeroize();

        match key {
            Some(key) => {
                debug!("Loaded encryption key from {}", self.path.display());
                Ok(Some(key))
            }
            None => Err(Error::storage(
                &self.path,
                io::Error::new(io::ErrorKind::InvalidData, "key file is corrupt"),
            )),
        }
    }

    /// Publishes the key without ever exposing a partial file.
    ///
    /// The key is written and synced to a temp file, then hard-linked into
    /// place. The link fails with `AlreadyExists` if another process got
    /// there first.
    fn create(&self, key: &SecretKey) -> io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let tmp = self.temp_path();
        let result = Self::write_new(&tmp, key).and_then(|()| fs::hard_link(&tmp, &self.path));
        let _ = fs::remove_file(&tmp);
        result
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "key".into(), |n| n.to_string_lossy().into_owned());
        self.path
            .with_file_name(format!(".{name}.{}.tmp", std::process::id()))
    }

    fn write_new(path: &Path, key: &SecretKey) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        let mut encoded = key.encode();
        let result = file.write_all(encoded.as_bytes()).and_then(|()| file.sync_all());
        encoded.zeroize();
        result
    }
}
