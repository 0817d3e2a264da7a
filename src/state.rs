//! Session state
//!
//! The explicit session object handed to the API client. It carries the
//! tokens and the few ids the back office keeps between screens, and knows
//! how to persist itself through a `SessionStore`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::models::auth::{JwtClaims, LoginResponse};
use crate::utils::errors::AppResult;

/// Persisted client-side state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_id: Option<i64>,
    pub role_id: Option<i64>,
    /// Id of the load being created by the wizard before it is reloaded
    pub load_id: Option<i64>,
}

impl Session {
    pub fn from_login(response: &LoginResponse) -> Self {
        Self {
            access_token: Some(response.access.clone()),
            refresh_token: response.refresh.clone(),
            user_id: response.user_id,
            role_id: response.role,
            load_id: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Expiry of the access token when it is a JWT carrying `exp`
    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        let token = self.access_token.as_deref()?;
        token_claims(token).and_then(|claims| Utc.timestamp_opt(claims.exp, 0).single())
    }

    /// True only when the token is a JWT whose `exp` is in the past
    pub fn is_expired(&self) -> bool {
        self.token_expiry()
            .map(|expiry| Utc::now() >= expiry)
            .unwrap_or(false)
    }
}

/// Read the claims of a token without checking its signature.
///
/// The backend owns the signing key; the client only needs `exp`.
pub fn token_claims(token: &str) -> Option<JwtClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<JwtClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}

/// Where the session lives between runs
pub trait SessionStore: Send + Sync {
    fn load(&self) -> AppResult<Session>;
    fn save(&self, session: &Session) -> AppResult<()>;
    fn clear(&self) -> AppResult<()>;
}

/// JSON file store used by the CLI
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> AppResult<Session> {
        if !self.path.exists() {
            debug!("No session file at {}", self.path.display());
            return Ok(Session::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(session),
            Err(e) => {
                warn!("⚠️ Ignoring unreadable session file {}: {}", self.path.display(), e);
                Ok(Session::default())
            }
        }
    }

    fn save(&self, session: &Session) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and embedding
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Session>,
}

impl MemorySessionStore {
    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> AppResult<Session> {
        Ok(self.inner.lock().map(|s| s.clone()).unwrap_or_default())
    }

    fn save(&self, session: &Session) -> AppResult<()> {
        if let Ok(mut inner) = self.inner.lock() {
            *inner = session.clone();
        }
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        if let Ok(mut inner) = self.inner.lock() {
            *inner = Session::default();
        }
        Ok(())
    }
}

/// Shared handle: the live session plus the store it is written through
#[derive(Clone)]
pub struct SessionHandle {
    session: Arc<RwLock<Session>>,
    store: Arc<dyn SessionStore>,
}

impl SessionHandle {
    /// Open a handle, loading whatever the store holds
    pub fn open(store: Arc<dyn SessionStore>) -> AppResult<Self> {
        let session = store.load()?;
        Ok(Self {
            session: Arc::new(RwLock::new(session)),
            store,
        })
    }

    /// Handle over a memory store seeded with `session`
    pub fn in_memory(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session.clone())),
            store: Arc::new(MemorySessionStore::with_session(session)),
        }
    }

    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.session.read().await.access_token.clone()
    }

    pub async fn role_id(&self) -> Option<i64> {
        self.session.read().await.role_id
    }

    pub async fn load_id(&self) -> Option<i64> {
        self.session.read().await.load_id
    }

    /// Replace the session and persist it
    pub async fn replace(&self, session: Session) -> AppResult<()> {
        let mut guard = self.session.write().await;
        *guard = session;
        self.store.save(&guard)
    }

    pub async fn set_load_id(&self, load_id: Option<i64>) -> AppResult<()> {
        let mut guard = self.session.write().await;
        guard.load_id = load_id;
        self.store.save(&guard)
    }

    /// Forget everything, in memory and in the store
    pub async fn clear(&self) -> AppResult<()> {
        let mut guard = self.session.write().await;
        *guard = Session::default();
        info!("🔒 Session cleared");
        self.store.clear()
    }
}
