//! Per-user session persisted between CLI invocations.
//!
//! Replaces the browser cookie: login writes the file, logout removes it, and
//! a session older than the configured expiry is treated as absent.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use diacare_classifiers::data_handling::FeatureVector;
use diacare_classifiers::diagnosis::{map_label, Diagnosis};

use crate::auth::UserRecord;

/// The most recent prediction made in this session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastPrediction {
    pub features: FeatureVector,
    pub class_code: i64,
    /// Raw in-sample accuracy, before display calibration.
    pub score: f64,
    pub predicted_at: DateTime<Utc>,
}

impl LastPrediction {
    pub fn diagnosis(&self) -> Diagnosis {
        map_label(self.class_code, self.features.pregnancies())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub username: String,
    pub name: String,
    pub logged_in_at: DateTime<Utc>,
    pub last_prediction: Option<LastPrediction>,
}

impl SessionContext {
    pub fn new(user: &UserRecord, now: DateTime<Utc>) -> Self {
        SessionContext {
            username: user.username.clone(),
            name: user.name.clone(),
            logged_in_at: now,
            last_prediction: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, expiry: Duration) -> bool {
        now - self.logged_in_at > expiry
    }

    pub fn record_prediction(&mut self, prediction: LastPrediction) {
        self.last_prediction = Some(prediction);
    }

    /// Load the session file; a missing file means nobody is logged in.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session: {}", path.display()))?;
        let session = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session: {}", path.display()))?;
        Ok(Some(session))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        crate::util::write_bytes_to_file(path, json.as_bytes())
            .with_context(|| format!("Failed to write session: {}", path.display()))
    }

    /// Remove the session file. Returns whether a session existed.
    pub fn clear<P: AsRef<Path>>(path: P) -> Result<bool> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove session: {}", path.display()))?;
        Ok(true)
    }
}

/// The unexpired session at `path`, or an error telling the user to log in.
pub fn require_session<P: AsRef<Path>>(
    path: P,
    now: DateTime<Utc>,
    expiry: Duration,
) -> Result<SessionContext> {
    match SessionContext::load(path)? {
        Some(session) if !session.is_expired(now, expiry) => Ok(session),
        Some(session) => anyhow::bail!(
            "Session for '{}' has expired. Please log in again.",
            session.username
        ),
        None => anyhow::bail!("Not logged in. Run `diacare user login` first."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserRecord {
        UserRecord {
            name: "Ada Lovelace".to_string(),
            username: "ada".to_string(),
            hashed_password: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn expiry_is_measured_from_login() {
        let now = Utc::now();
        let session = SessionContext::new(&user(), now);
        assert!(!session.is_expired(now + Duration::days(29), Duration::days(30)));
        assert!(session.is_expired(now + Duration::days(31), Duration::days(30)));
    }
}
