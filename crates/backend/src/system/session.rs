use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};

use contracts::system::auth::EmployeeInfo;

/// Fixed session lifetime, measured from creation. After it elapses the
/// employee just logs in again (upstream login is cheap).
const SESSION_TTL_HOURS: i64 = 8;

/// One logged-in employee session. Holds the upstream bearer token that
/// every insights call forwards.
#[derive(Debug, Clone)]
pub struct Session {
    pub upstream_token: String,
    pub employee: EmployeeInfo,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self) -> bool {
        Utc::now() - self.created_at > Duration::hours(SESSION_TTL_HOURS)
    }
}

/// In-memory session store. A restart logs everyone out, which matches
/// how disposable the original deployment's session backend was.
static SESSIONS: Lazy<RwLock<HashMap<String, Session>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Create a session, returning the opaque token handed to the client.
pub fn create(upstream_token: String, employee: EmployeeInfo) -> String {
    let session_token = generate_token();
    let session = Session {
        upstream_token,
        employee,
        created_at: Utc::now(),
    };
    SESSIONS
        .write()
        .expect("session store poisoned")
        .insert(hash_token(&session_token), session);
    session_token
}

/// Look up a session by client token; expired sessions are evicted.
pub fn get(session_token: &str) -> Option<Session> {
    let key = hash_token(session_token);

    let session = SESSIONS
        .read()
        .expect("session store poisoned")
        .get(&key)
        .cloned();

    match session {
        Some(session) if session.is_expired() => {
            SESSIONS
                .write()
                .expect("session store poisoned")
                .remove(&key);
            None
        }
        other => other,
    }
}

pub fn revoke(session_token: &str) {
    SESSIONS
        .write()
        .expect("session store poisoned")
        .remove(&hash_token(session_token));
}

/// Opaque session token handed to the client
fn generate_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Tokens are stored hashed so a leaked store dump is useless.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
