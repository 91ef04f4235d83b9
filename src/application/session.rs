use crate::application::api_client::send_with_refresh;
use crate::domain::models::{Credentials, NewUser, Session, SessionState, TokenPair, User};
use crate::infrastructure::endpoints::Endpoints;
use crate::infrastructure::error::{ApiFailure, ClientError};
use crate::infrastructure::http_transport::{
    decode_data, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
};
use crate::infrastructure::session_storage::SessionStorage;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Default)]
struct SessionInner {
    session: Session,
    /// Refreshes currently waiting on the backend.
    refreshing: u32,
}

fn lock_inner(inner: &Mutex<SessionInner>) -> MutexGuard<'_, SessionInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Counts one in-flight refresh for as long as it lives.
struct RefreshInFlight<'a> {
    inner: &'a Mutex<SessionInner>,
}

impl<'a> RefreshInFlight<'a> {
    fn enter(inner: &'a Mutex<SessionInner>) -> Self {
        lock_inner(inner).refreshing += 1;
        Self { inner }
    }
}

impl Drop for RefreshInFlight<'_> {
    fn drop(&mut self) {
        let mut inner = lock_inner(self.inner);
        inner.refreshing = inner.refreshing.saturating_sub(1);
    }
}

/// Owns the one session of a running client.
///
/// Every change replaces the whole [`Session`] under the lock, storage first
/// and memory second, so readers see either the previous or the next session,
/// never a mix. The lock is never held across an `.await`.
pub struct SessionStore<S, T>
where
    S: SessionStorage,
    T: HttpTransport,
{
    endpoints: Endpoints,
    storage: Arc<S>,
    transport: Arc<T>,
    inner: Mutex<SessionInner>,
}

impl<S, T> SessionStore<S, T>
where
    S: SessionStorage,
    T: HttpTransport,
{
    /// Hydrates the session from `storage`.
    pub fn new(endpoints: Endpoints, storage: Arc<S>, transport: Arc<T>) -> Result<Self, ClientError> {
        let session = storage.load()?;
        Ok(Self {
            endpoints,
            storage,
            transport,
            inner: Mutex::new(SessionInner {
                session,
                refreshing: 0,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        lock_inner(&self.inner)
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub(crate) fn transport(&self) -> Arc<T> {
        Arc::clone(&self.transport)
    }

    pub fn session(&self) -> Session {
        self.lock().session.clone()
    }

    pub fn state(&self) -> SessionState {
        let inner = self.lock();
        if inner.refreshing > 0 {
            SessionState::Refreshing
        } else if inner.session.access_token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn user(&self) -> Option<User> {
        self.lock().session.user.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.lock().session.access_token.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        let inner = self.lock();
        inner.session.user.is_some() && inner.session.access_token.is_some()
    }

    /// Reloads a persisted user at startup. A failed reload leaves the store
    /// anonymous.
    pub async fn start(&self) -> SessionState {
        if self.user().is_some() {
            self.reload_user().await;
        }
        self.state()
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, ClientError> {
        let body = serde_json::to_value(credentials)?;
        let response = self
            .send_public(HttpMethod::Post, self.endpoints.login(), Some(body))
            .await?;
        if !response.is_success() {
            warn!(status = response.status, "login rejected");
            return Err(ClientError::LoginFailed {
                status: response.status,
            });
        }

        let tokens: TokenPair = decode_data(&response.body)?;
        self.commit(Session::default().with_tokens(tokens))?;
        let user = self.reload_profile().await?;
        info!(user_id = user.id, "logged in");
        Ok(user)
    }

    /// Creates the account and signs in. Does nothing when a user is already
    /// present.
    pub async fn register(&self, new_user: &NewUser) -> Result<Option<User>, ClientError> {
        if self.user().is_some() {
            debug!("register skipped, a user is already signed in");
            return Ok(None);
        }

        let body = serde_json::to_value(new_user)?;
        let response = self
            .send_public(HttpMethod::Post, self.endpoints.register(), Some(body))
            .await?;
        if !response.is_success() {
            warn!(status = response.status, "registration rejected");
            return Err(ClientError::RegistrationFailed {
                status: response.status,
            });
        }

        let tokens: TokenPair = decode_data(&response.body)?;
        self.commit(Session::default().with_tokens(tokens))?;
        let user = self.reload_profile().await?;
        info!(user_id = user.id, "registered");
        Ok(Some(user))
    }

    /// Notifies the backend when possible, then always clears the local session.
    pub async fn logout(&self) {
        if let Some(token) = self.access_token() {
            let request = HttpRequest {
                method: HttpMethod::Post,
                url: self.endpoints.logout(),
                body: None,
                bearer_token: Some(token),
            };
            match self.transport.send(request).await {
                Ok(response) if response.is_success() => debug!("server session closed"),
                Ok(response) => warn!(status = response.status, "logout rejected by server"),
                Err(error) => warn!(%error, "logout notification failed"),
            }
        }
        self.local_logout();
        info!("logged out");
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// Returns `false` after clearing the session when there is no refresh
    /// token or the backend refuses it. Tokens that arrive after the session
    /// moved on to another refresh token are discarded and also give `false`.
    pub async fn refresh_session(&self) -> bool {
        let Some(refresh_token) = self.session().refresh_token else {
            debug!("no refresh token, dropping session");
            self.local_logout();
            return false;
        };

        let in_flight = RefreshInFlight::enter(&self.inner);
        let outcome = self
            .send_public(
                HttpMethod::Post,
                self.endpoints.refresh(),
                Some(serde_json::json!({ "refresh_token": refresh_token })),
            )
            .await
            .and_then(|response| {
                if !response.is_success() {
                    return Err(ApiFailure::Http {
                        status: response.status,
                    });
                }
                decode_data::<TokenPair>(&response.body)
                    .map_err(|error| ApiFailure::InvalidPayload(error.to_string()))
            });
        drop(in_flight);

        let tokens = match outcome {
            Ok(tokens) => tokens,
            Err(failure) => {
                warn!(%failure, "session refresh failed");
                self.local_logout();
                return false;
            }
        };

        match self.commit_refreshed(&refresh_token, tokens) {
            Ok(true) => {
                debug!("session refreshed");
                true
            }
            Ok(false) => {
                debug!("session changed during refresh, tokens discarded");
                false
            }
            Err(error) => {
                warn!(%error, "refreshed session could not be persisted");
                self.local_logout();
                false
            }
        }
    }

    /// Fetches the authoritative profile; on failure the session is cleared.
    pub async fn reload_user(&self) -> Option<User> {
        self.reload_profile().await.ok()
    }

    /// Clears the session without contacting the backend.
    pub fn local_logout(&self) {
        let mut inner = self.lock();
        inner.session = Session::default();
        if let Err(error) = self.storage.clear() {
            warn!(%error, "persisted session could not be cleared");
        }
    }

    async fn reload_profile(&self) -> Result<User, ClientError> {
        let fetched = send_with_refresh(self, HttpMethod::Get, self.endpoints.account(), None)
            .await
            .and_then(|response| {
                decode_data::<User>(&response.body)
                    .map_err(|error| ApiFailure::InvalidPayload(error.to_string()))
            })
            .map_err(ClientError::from)
            .and_then(|user| {
                self.commit_user(user.clone())?;
                Ok(user)
            });

        if let Err(error) = &fetched {
            warn!(%error, "user reload failed, signing out locally");
            self.local_logout();
        }
        fetched
    }

    /// Persists `session`, then makes it current. A failed save leaves the
    /// current session untouched.
    fn commit(&self, session: Session) -> Result<(), ClientError> {
        let mut inner = self.lock();
        self.storage.save(&session)?;
        inner.session = session;
        Ok(())
    }

    fn commit_user(&self, user: User) -> Result<(), ClientError> {
        let mut inner = self.lock();
        let next = inner.session.with_user(user);
        self.storage.save(&next)?;
        inner.session = next;
        Ok(())
    }

    /// Applies refreshed tokens only while the session still holds the refresh
    /// token they were issued for.
    fn commit_refreshed(&self, sent_refresh_token: &str, tokens: TokenPair) -> Result<bool, ClientError> {
        let mut inner = self.lock();
        if inner.session.refresh_token.as_deref() != Some(sent_refresh_token) {
            return Ok(false);
        }
        let next = inner.session.with_tokens(tokens);
        self.storage.save(&next)?;
        inner.session = next;
        Ok(true)
    }

    async fn send_public(
        &self,
        method: HttpMethod,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse, ApiFailure> {
        self.transport
            .send(HttpRequest {
                method,
                url,
                body,
                bearer_token: None,
            })
            .await
            .map_err(|error| ApiFailure::Network(error.to_string()))
    }
}
