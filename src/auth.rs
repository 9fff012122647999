//! Credentials and the login session.
//!
//! Passwords are stored as `hex(sha256(password + salt)):salt`, where the
//! salt is 16 random bytes, hex-encoded, drawn fresh for every hash.

use crate::models::{User, timestamp};
use crate::storage::Users;
use crate::{Error, Result};
use chrono::NaiveDateTime;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Number of random salt bytes per hash.
const SALT_LEN: usize = 16;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let salt_hex = to_hex(&salt);
    format!("{}:{}", digest(password, &salt_hex), salt_hex)
}

/// Check a password against a stored `hash:salt` value.
///
/// A stored value without a `:` separator never verifies.
pub fn verify_password(stored: &str, password: &str) -> bool {
    match stored.split_once(':') {
        Some((hash, salt)) => digest(password, salt) == hash,
        None => {
            tracing::warn!("password check against a malformed hash (no salt)");
            false
        }
    }
}

fn digest(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Look up `username` and verify `password`.
///
/// Unknown users and wrong passwords produce the same error; only the log
/// tells them apart.
pub fn authenticate(users: &Users, username: &str, password: &str) -> Result<User> {
    let Some(user) = users.get(username) else {
        tracing::warn!(username, "login attempt for unknown user");
        return Err(Error::InvalidCredentials);
    };

    if !verify_password(&user.password_hash, password) {
        tracing::warn!(username, "login attempt with wrong password");
        return Err(Error::InvalidCredentials);
    }

    tracing::info!(username, "user logged in");
    Ok(user.clone())
}

/// The persisted login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    #[serde(with = "timestamp")]
    pub logged_in_at: NaiveDateTime,
}

impl Session {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            logged_in_at: crate::models::now(),
        }
    }

    /// Read the session file. A missing or unreadable session means nobody
    /// is logged in.
    pub fn load(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt session file");
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Remove the session file. Returns whether a session existed.
    pub fn clear(path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve the session against the current users, so level changes and
    /// removed accounts take effect immediately.
    pub fn current_user(path: &Path, users: &Users) -> Result<User> {
        let session = Self::load(path).ok_or(Error::NotLoggedIn)?;
        match users.get(&session.username) {
            Some(user) => Ok(user.clone()),
            None => {
                tracing::warn!(username = %session.username, "session names a user that no longer exists");
                Err(Error::NotLoggedIn)
            }
        }
    }
}
