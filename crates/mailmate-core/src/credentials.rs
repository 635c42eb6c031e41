//! Encrypted storage for the remembered sender credentials.
//!
//! At most one pair is stored. Each field is sealed independently under the
//! key from [`KeyManager`](crate::KeyManager) and the file is replaced as a
//! whole on every save.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto;
use crate::error::{Error, Result};
use crate::keys::SecretKey;
use crate::storage;

/// A sender identity and its secret (an SMTP app password).
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    identity: String,
    secret: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }

    /// The sender address.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The secret used to authenticate as [`identity`](Self::identity).
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// True when both fields are empty, i.e. nothing was remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identity.is_empty() && self.secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// On-disk shape: two independent ciphertext tokens.
#[derive(Serialize, Deserialize)]
struct SealedPair {
    identity: String,
    secret: String,
}

/// File-backed store for one [`Credentials`] pair.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    key: SecretKey,
}

impl CredentialStore {
    /// Creates a store at `path` that encrypts with `key`.
    pub fn new(path: impl Into<PathBuf>, key: SecretKey) -> Self {
        Self {
            path: path.into(),
            key,
        }
    }

    /// Path of the credential file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encrypts and stores the pair, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails or the file cannot be written.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        let sealed = SealedPair {
            identity: crypto::seal(&self.key, credentials.identity.as_bytes())?,
            secret: crypto::seal(&self.key, credentials.secret.as_bytes())?,
        };
        let json = serde_json::to_vec_pretty(&sealed)
            .map_err(|e| Error::serialization(&self.path, e))?;
        storage::write_atomic(&self.path, &json)?;

        info!("Saved credentials for {}", credentials.identity);
        Ok(())
    }

    /// Loads and decrypts the stored pair.
    ///
    /// Returns an empty pair when nothing has been saved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decryption`] if the file cannot be parsed or any
    /// field fails authentication, and [`Error::Storage`] on I/O failure.
    pub fn load(&self) -> Result<Credentials> {
        let Some(bytes) = storage::read_optional(&self.path)? else {
            debug!("No stored credentials at {}", self.path.display());
            return Ok(Credentials::default());
        };

        let sealed: SealedPair = serde_json::from_slice(&bytes)
            .map_err(|_| Error::Decryption("credential file is not readable"))?;

        let identity = self.open_field(&sealed.identity)?;
        let secret = self.open_field(&sealed.secret)?;
        debug!("Loaded credentials for {identity}");

        Ok(Credentials { identity, secret })
    }

    /// Removes the stored pair. Does nothing if none is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed stored credentials");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(&self.path, e)),
        }
    }

    fn open_field(&self, token: &str) -> Result<String> {
        let plaintext = crypto::open(&self.key, token)?;
        String::from_utf8(plaintext).map_err(|e| {
            let mut bytes = e.into_bytes();
            bytes.zeroize();
            Error::Decryption("credential is not valid UTF-8")
        })
    }
}
