//! JSON-file contact storage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::model::Contact;
use crate::error::{Error, Result};
use crate::storage;

/// Name to address mapping persisted as one JSON object.
///
/// Every mutation rewrites the whole file.
#[derive(Debug, Clone)]
pub struct ContactDirectory {
    path: PathBuf,
}

impl ContactDirectory {
    /// Creates a directory backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the full mapping, empty if nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object
    /// of strings.
    pub fn load(&self) -> Result<BTreeMap<String, String>> {
        match storage::read_optional(&self.path)? {
            Some(bytes) if !bytes.is_empty() => {
                serde_json::from_slice(&bytes).map_err(|e| Error::serialization(&self.path, e))
            }
            _ => Ok(BTreeMap::new()),
        }
    }

    /// Lists contacts ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be loaded.
    pub fn list(&self) -> Result<Vec<Contact>> {
        Ok(self
            .load()?
            .into_iter()
            .map(|(name, address)| Contact { name, address })
            .collect())
    }

    /// Looks up the address stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be loaded.
    pub fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(name))
    }

    /// Inserts a contact or overwrites the address of an existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be loaded or written.
    pub fn upsert(&self, name: &str, address: &str) -> Result<()> {
        let mut contacts = self.load()?;
        contacts.insert(name.to_string(), address.to_string());
        self.store(&contacts)?;
        debug!("Stored contact {name}");
        Ok(())
    }

    /// Removes a contact. Returns whether it was present.
    ///
    /// The file is rewritten either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be loaded or written.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let mut contacts = self.load()?;
        let existed = contacts.remove(name).is_some();
        self.store(&contacts)?;
        Ok(existed)
    }

    fn store(&self, contacts: &BTreeMap<String, String>) -> Result<()> {
        let json =
            serde_json::to_vec_pretty(contacts).map_err(|e| Error::serialization(&self.path, e))?;
        storage::write_atomic(&self.path, &json)
    }
}
