//! File-backed user accounts with argon2 password hashes.
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionContext;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    /// Always lower case.
    pub username: String,
    /// PHC string produced by argon2.
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SignupRequest {
    pub name: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingFields,
    PasswordMismatch,
    UsernameTaken(String),
    Hashing(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingFields => write!(f, "Please fill out all fields."),
            AuthError::PasswordMismatch => write!(f, "Passwords do not match!"),
            AuthError::UsernameTaken(name) => {
                write!(f, "Username '{}' already exists. Try another.", name)
            }
            AuthError::Hashing(msg) => write!(f, "Failed to hash password: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Success(UserRecord),
    Failure(String),
    /// No password was given and no live session exists; ask for it directly.
    NeedsManualFallback,
}

const BAD_CREDENTIALS: &str = "Username/password incorrect";

/// Users keyed by lower-cased username, stored as one JSON document.
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
    users: BTreeMap<String, UserRecord>,
}

impl UserStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let users = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read user store: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse user store: {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(UserStore { path, users })
    }

    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.users)?;
        crate::util::write_bytes_to_file(&self.path, json.as_bytes())
            .with_context(|| format!("Failed to write user store: {}", self.path.display()))
    }

    pub fn get(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(&username.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Validate and add a new account. The store is not written to disk.
    pub fn register(
        &mut self,
        request: &SignupRequest,
        now: DateTime<Utc>,
    ) -> std::result::Result<&UserRecord, AuthError> {
        let name = request.name.trim();
        let username = request.username.trim().to_lowercase();
        if name.is_empty()
            || username.is_empty()
            || request.password.is_empty()
            || request.confirm_password.is_empty()
        {
            return Err(AuthError::MissingFields);
        }
        if request.password != request.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if self.users.contains_key(&username) {
            return Err(AuthError::UsernameTaken(username));
        }

        let record = UserRecord {
            name: name.to_string(),
            username: username.clone(),
            hashed_password: hash_password(&request.password)?,
            created_at: now,
        };
        log::debug!("[DiaCare::Auth] Registered user '{}'", username);
        Ok(self.users.entry(username).or_insert(record))
    }
}

pub fn hash_password(password: &str) -> std::result::Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// False for a wrong password and for a malformed stored hash.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match PasswordHash::new(hashed_password) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("[DiaCare::Auth] Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Authenticate `username` with a password, or with a live session when no
/// password is given.
pub fn login(
    store: &UserStore,
    session: Option<&SessionContext>,
    username: &str,
    password: Option<&str>,
    now: DateTime<Utc>,
    expiry: Duration,
) -> LoginOutcome {
    if store.is_empty() {
        return LoginOutcome::Failure("No users found. Please sign up first!".to_string());
    }
    let Some(user) = store.get(username) else {
        return LoginOutcome::Failure(BAD_CREDENTIALS.to_string());
    };

    match password {
        Some(password) if verify_password(password, &user.hashed_password) => {
            LoginOutcome::Success(user.clone())
        }
        Some(_) => LoginOutcome::Failure(BAD_CREDENTIALS.to_string()),
        None => match session {
            Some(s) if s.username == user.username && !s.is_expired(now, expiry) => {
                LoginOutcome::Success(user.clone())
            }
            _ => LoginOutcome::NeedsManualFallback,
        },
    }
}
