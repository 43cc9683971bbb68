//! Account commands: sign up, log in, log out, and show the current user.
use std::io::BufRead;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::auth::{login, LoginOutcome, SignupRequest, UserRecord, UserStore};
use crate::config::AppConfig;
use crate::session::SessionContext;
use crate::util::read_line;

pub fn run_signup(
    config: &AppConfig,
    request: &SignupRequest,
    now: DateTime<Utc>,
) -> Result<UserRecord> {
    let mut store = UserStore::load(&config.user_store_path)?;
    let user = store.register(request, now)?.clone();
    store.save()?;
    log::info!("[DiaCare::User] Account '{}' created", user.username);
    Ok(user)
}

/// Log in and start a session. When neither a password nor a live session is
/// available, the password is read as one line from `stdin`.
pub fn run_login<R: BufRead>(
    config: &AppConfig,
    username: &str,
    password: Option<&str>,
    stdin: &mut R,
    now: DateTime<Utc>,
) -> Result<SessionContext> {
    let store = UserStore::load(&config.user_store_path)?;
    let existing = SessionContext::load(&config.session_path)?;
    let expiry = config.session_expiry()?;

    let mut outcome = login(&store, existing.as_ref(), username, password, now, expiry);
    if outcome == LoginOutcome::NeedsManualFallback {
        eprintln!("Password:");
        let typed = read_line(stdin)?;
        outcome = login(&store, None, username, Some(&typed), now, expiry);
    }

    match outcome {
        LoginOutcome::Success(user) => {
            let session = match existing {
                Some(s) if s.username == user.username && !s.is_expired(now, expiry) => s,
                _ => SessionContext::new(&user, now),
            };
            session.save(&config.session_path)?;
            log::info!("[DiaCare::User] Logged in as '{}'", user.username);
            Ok(session)
        }
        LoginOutcome::Failure(reason) => anyhow::bail!(reason),
        LoginOutcome::NeedsManualFallback => anyhow::bail!("Password required"),
    }
}

/// Returns the username that was logged out, if any.
pub fn run_logout(config: &AppConfig) -> Result<Option<String>> {
    let username = SessionContext::load(&config.session_path)?.map(|s| s.username);
    SessionContext::clear(&config.session_path)?;
    Ok(username)
}

pub fn run_whoami(config: &AppConfig, now: DateTime<Utc>) -> Result<Option<SessionContext>> {
    let expiry = config.session_expiry()?;
    Ok(SessionContext::load(&config.session_path)?.filter(|s| !s.is_expired(now, expiry)))
}
