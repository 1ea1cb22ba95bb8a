//! Admin session context.
//!
//! [`SessionContext`] is the single owner of the admin authentication state.
//! It is created once at startup, initialised from the credential file,
//! and handed by reference to the router and the admin screens.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use motbook_sdk::client::{AdminClient, ClientError};
use motbook_sdk::objects::{AdminProfile, LoginResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Shown when the backend refuses a login without saying why.
pub const LOGIN_FAILED: &str = "Login failed. Please try again.";
/// Shown when the login request itself fails.
pub const LOGIN_ERROR: &str = "An error occurred during login.";

/// Errors that can occur while managing the admin session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Credential file could not be read or written.
    #[error("credential store error: {0}")]
    Store(#[from] std::io::Error),

    /// Credential file exists but is not valid.
    #[error("credential file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Login refused; carries the user-facing message.
    #[error("{0}")]
    LoginFailed(String),

    /// The operation needs an authenticated session.
    #[error("not logged in")]
    NotAuthenticated,
}

/// Authentication endpoints of the backend.
#[async_trait]
pub trait AdminAuth: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError>;

    async fn verify(&self, access_token: Option<&str>) -> Result<AdminProfile, ClientError>;

    async fn logout(&self, access_token: Option<&str>) -> Result<(), ClientError>;
}

#[async_trait]
impl AdminAuth for AdminClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        AdminClient::login(self, email, password).await
    }

    async fn verify(&self, access_token: Option<&str>) -> Result<AdminProfile, ClientError> {
        let mut client = self.clone();
        client.set_access_token(access_token.map(str::to_string));
        client.verify_session().await
    }

    async fn logout(&self, access_token: Option<&str>) -> Result<(), ClientError> {
        let mut client = self.clone();
        client.set_access_token(access_token.map(str::to_string));
        client.logout().await
    }
}

/// What is persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
    pub email: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// JSON file holding the [`StoredCredentials`] of the last login.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored credentials; `None` when nothing is stored.
    pub async fn load(&self) -> Result<Option<StoredCredentials>, SessionError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, credentials: &StoredCredentials) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(credentials)?;
        tokio::fs::write(&self.path, body).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, perms).await?;
        }
        Ok(())
    }

    /// Delete the stored credentials. Deleting nothing is not an error.
    pub async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Authentication state of the admin shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated {
        profile: AdminProfile,
        access_token: Option<String>,
    },
}

/// Owner of the admin authentication state.
pub struct SessionContext {
    auth: Arc<dyn AdminAuth>,
    store: CredentialStore,
    state: AuthState,
}

impl SessionContext {
    /// Create an unauthenticated context. Call [`init()`](Self::init) next.
    pub fn new(auth: Arc<dyn AdminAuth>, store: CredentialStore) -> Self {
        Self {
            auth,
            store,
            state: AuthState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated { .. })
    }

    pub fn profile(&self) -> Option<&AdminProfile> {
        match &self.state {
            AuthState::Authenticated { profile, .. } => Some(profile),
            AuthState::Unauthenticated => None,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        match &self.state {
            AuthState::Authenticated { access_token, .. } => access_token.as_deref(),
            AuthState::Unauthenticated => None,
        }
    }

    /// Restore the session from stored credentials.
    ///
    /// Stored credentials the backend refuses are discarded. When the backend
    /// cannot be reached they are kept and the session stays
    /// unauthenticated for this run.
    /// Returns whether the session is authenticated afterwards.
    pub async fn init(&mut self) -> Result<bool, SessionError> {
        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(SessionError::Corrupt(e)) => {
                warn!(
                    path = %self.store.path().display(),
                    error = %e,
                    "Discarding corrupt credential file"
                );
                self.store.clear().await?;
                None
            }
            Err(e) => return Err(e),
        };

        let Some(stored) = stored else {
            debug!("No stored admin credentials");
            self.state = AuthState::Unauthenticated;
            return Ok(false);
        };

        match self.auth.verify(stored.access_token.as_deref()).await {
            Ok(profile) => {
                info!(email = %profile.email, "Restored admin session");
                self.state = AuthState::Authenticated {
                    profile,
                    access_token: stored.access_token,
                };
                Ok(true)
            }
            Err(e) if e.is_rejection() => {
                info!(email = %stored.email, error = %e, "Stored admin session rejected");
                self.store.clear().await?;
                self.state = AuthState::Unauthenticated;
                Ok(false)
            }
            Err(e) => {
                // Credentials stay on disk for the next run.
                warn!(email = %stored.email, error = %e, "Could not verify stored admin session");
                self.state = AuthState::Unauthenticated;
                Ok(false)
            }
        }
    }

    /// Log in and persist the credentials.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<&AdminProfile, SessionError> {
        let response = match self.auth.login(email, password).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%email, error = %e, "Admin login failed");
                let message = match &e {
                    ClientError::Rejected { .. } | ClientError::Api { .. } => {
                        e.backend_message().unwrap_or(LOGIN_FAILED)
                    }
                    _ => LOGIN_ERROR,
                };
                return Err(SessionError::LoginFailed(message.to_string()));
            }
        };

        let profile = response.admin.unwrap_or_else(|| AdminProfile {
            id: None,
            email: email.to_string(),
            name: None,
        });
        self.store
            .save(&StoredCredentials {
                email: profile.email.clone(),
                access_token: response.access_token.clone(),
            })
            .await?;

        info!(email = %profile.email, "Admin logged in");
        self.state = AuthState::Authenticated {
            profile,
            access_token: response.access_token,
        };
        self.profile().ok_or(SessionError::NotAuthenticated)
    }

    /// Tear the session down.
    ///
    /// The backend logout is best-effort; stored credentials are always
    /// deleted and the context always ends unauthenticated.
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        let previous = std::mem::replace(&mut self.state, AuthState::Unauthenticated);
        if let AuthState::Authenticated {
            profile,
            access_token,
        } = previous
        {
            match self.auth.logout(access_token.as_deref()).await {
                Ok(()) => info!(email = %profile.email, "Admin logged out"),
                Err(e) => warn!(email = %profile.email, error = %e, "Backend logout failed"),
            }
        }
        self.store.clear().await
    }
}
