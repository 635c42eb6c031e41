//! Credential store lifecycle across process restarts.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use mailmate_core::{CredentialStore, Credentials, Error, KeyManager, StorePaths};
use proptest::prelude::*;

/// Opens the store the way a fresh process would: load key, then store.
fn open(paths: &StorePaths) -> CredentialStore {
    let key = KeyManager::new(&paths.key).get_or_create_key().unwrap();
    CredentialStore::new(&paths.credentials, key)
}

fn flip_byte_in_field(path: &Path, field: &str, index: usize) {
    let mut json: serde_json::Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
    let token = json[field].as_str().unwrap().to_string();
    let mut raw = URL_SAFE.decode(token).unwrap();
    let index = index % raw.len();
    raw[index] ^= 0x01;
    json[field] = serde_json::Value::String(URL_SAFE.encode(raw));
    fs::write(path, serde_json::to_vec(&json).unwrap()).unwrap();
}

#[test]
fn survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::new(dir.path());

    open(&paths)
        .save(&Credentials::new("a@example.com", "pw123"))
        .unwrap();

    let loaded = open(&paths).load().unwrap();
    assert_eq!(loaded.identity(), "a@example.com");
    assert_eq!(loaded.secret(), "pw123");
}

#[test]
fn corrupted_ciphertext_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::new(dir.path());
    open(&paths)
        .save(&Credentials::new("a@example.com", "pw123"))
        .unwrap();

    flip_byte_in_field(&paths.credentials, "secret", 20);

    let err = open(&paths).load().unwrap_err();
    assert!(matches!(err, Error::Decryption(_)));
}

#[test]
fn new_key_cannot_read_old_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::new(dir.path());
    open(&paths)
        .save(&Credentials::new("a@example.com", "pw123"))
        .unwrap();

    fs::remove_file(&paths.key).unwrap();

    let err = open(&paths).load().unwrap_err();
    assert!(matches!(err, Error::Decryption(_)));
}

#[test]
fn nothing_saved_loads_empty_pair() {
    let dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::new(dir.path());

    let loaded = open(&paths).load().unwrap();
    assert!(loaded.is_empty());
    assert!(paths.key.exists());
    assert!(!paths.credentials.exists());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn round_trip(identity in "\\PC{0,40}", secret in "\\PC{0,40}") {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorePaths::new(dir.path());

        open(&paths).save(&Credentials::new(identity.clone(), secret.clone())).unwrap();
        let loaded = open(&paths).load().unwrap();

        prop_assert_eq!(loaded.identity(), identity.as_str());
        prop_assert_eq!(loaded.secret(), secret.as_str());
    }

    #[test]
    fn any_flipped_byte_fails(index in 0usize..64, field in prop::sample::select(vec!["identity", "secret"])) {
        let dir = tempfile::tempdir().unwrap();
        let paths = StorePaths::new(dir.path());
        open(&paths).save(&Credentials::new("a@example.com", "pw123")).unwrap();

        flip_byte_in_field(&paths.credentials, field, index);

        prop_assert!(matches!(open(&paths).load(), Err(Error::Decryption(_))));
    }
}
