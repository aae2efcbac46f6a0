//! Machine-bound encryption for the on-disk session record.

use aes_gcm_siv::aead::{Aead, KeyInit};
use aes_gcm_siv::{Aes256GcmSiv, Nonce};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use rand::RngCore;
use scrypt::{scrypt, Params as ScryptParams};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::SessionError;
use super::types::Session;

pub(crate) const SESSION_RECORD_VERSION: u32 = 1;
pub(crate) const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
const MACHINE_KEY_CONTEXT: &str = "bookvault-session-kek-v1";
const SCRYPT_LOG_N: u8 = 15;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// Encrypted session file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct EncryptedSessionRecord {
    #[serde(default)]
    pub(crate) version: u32,
    pub(crate) encryption: EncryptionParams,
    pub(crate) ciphertext: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct EncryptionParams {
    pub(crate) salt: String,
    pub(crate) nonce: String,
}

/// Key derived for one salt. Reused across requests so the scrypt cost is
/// paid once per process.
#[derive(Clone)]
pub(crate) struct DerivedKey {
    pub(crate) salt: [u8; SALT_LEN],
    key: [u8; KEY_LEN],
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey").finish_non_exhaustive()
    }
}

pub(crate) fn looks_encrypted(value: &serde_json::Value) -> bool {
    value
        .get("encryption")
        .and_then(|inner| inner.as_object())
        .is_some()
}

pub(crate) fn fresh_key() -> Result<DerivedKey, SessionError> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    derive_key(salt)
}

pub(crate) fn derive_key(salt: [u8; SALT_LEN]) -> Result<DerivedKey, SessionError> {
    let mut hasher = Sha256::new();
    hasher.update(MACHINE_KEY_CONTEXT.as_bytes());
    hasher.update(machine_secret_material());
    hasher.update(salt);
    let seed = hasher.finalize();

    let params = ScryptParams::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|err| SessionError::Invalid(format!("invalid scrypt parameters: {err}")))?;
    let mut key = [0u8; KEY_LEN];
    scrypt(&seed, &salt, &params, &mut key)
        .map_err(|err| SessionError::Invalid(format!("failed to derive session key: {err}")))?;
    Ok(DerivedKey { salt, key })
}

pub(crate) fn salt_of(record: &EncryptedSessionRecord) -> Result<[u8; SALT_LEN], SessionError> {
    decode_fixed::<SALT_LEN>(&record.encryption.salt, "salt")
}

pub(crate) fn encrypt_session(
    key: &DerivedKey,
    session: &Session,
) -> Result<EncryptedSessionRecord, SessionError> {
    let payload = serde_json::to_vec(session)
        .map_err(|err| SessionError::Invalid(format!("failed to serialize session: {err}")))?;
    let cipher = Aes256GcmSiv::new_from_slice(&key.key)
        .map_err(|_| SessionError::Invalid("invalid session key length".to_string()))?;
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), payload.as_slice())
        .map_err(|_| SessionError::Invalid("failed to encrypt session".to_string()))?;
    Ok(EncryptedSessionRecord {
        version: SESSION_RECORD_VERSION,
        encryption: EncryptionParams {
            salt: B64.encode(key.salt),
            nonce: B64.encode(nonce),
        },
        ciphertext: B64.encode(ciphertext),
    })
}

pub(crate) fn decrypt_session(
    key: &DerivedKey,
    record: &EncryptedSessionRecord,
) -> Result<Session, SessionError> {
    let nonce = decode_fixed::<NONCE_LEN>(&record.encryption.nonce, "nonce")?;
    let ciphertext = B64.decode(&record.ciphertext).map_err(|err| {
        SessionError::Invalid(format!("failed to decode session ciphertext: {err}"))
    })?;
    let cipher = Aes256GcmSiv::new_from_slice(&key.key)
        .map_err(|_| SessionError::Invalid("invalid session key length".to_string()))?;
    let payload = cipher
        .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
        .map_err(|_| {
            SessionError::Invalid(
                "failed to decrypt session (machine identity may have changed)".to_string(),
            )
        })?;
    serde_json::from_slice(&payload)
        .map_err(|err| SessionError::Invalid(format!("failed to decode session: {err}")))
}

fn machine_secret_material() -> Vec<u8> {
    let host = hostname::get()
        .map(|value| value.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown-host".to_string());
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown-user".to_string());
    let home = dirs::home_dir()
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    let machine_id = ["/etc/machine-id", "/var/lib/dbus/machine-id"]
        .iter()
        .find_map(|path| {
            std::fs::read_to_string(path)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
        .unwrap_or_default();
    format!(
        "os={}|host={host}|user={user}|home={home}|machine_id={machine_id}",
        std::env::consts::OS
    )
    .into_bytes()
}

fn decode_fixed<const N: usize>(value: &str, field: &str) -> Result<[u8; N], SessionError> {
    let bytes = B64.decode(value).map_err(|err| {
        SessionError::Invalid(format!("failed to decode session field `{field}`: {err}"))
    })?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        SessionError::Invalid(format!(
            "invalid session field `{field}` length: expected {N}, got {}",
            bytes.len()
        ))
    })
}
