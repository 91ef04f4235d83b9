use crate::application::session::SessionStore;
use crate::infrastructure::error::ApiFailure;
use crate::infrastructure::http_transport::{
    decode_data, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
};
use crate::infrastructure::session_storage::SessionStorage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const UNAUTHORIZED: u16 = 401;

/// Sends a bearer-authenticated request. A 401 triggers one session refresh
/// and one retry with the new token; nothing beyond that.
pub(crate) async fn send_with_refresh<S, T>(
    session: &SessionStore<S, T>,
    method: HttpMethod,
    url: Url,
    body: Option<serde_json::Value>,
) -> Result<HttpResponse, ApiFailure>
where
    S: SessionStorage,
    T: HttpTransport,
{
    let transport = session.transport();
    let request = HttpRequest {
        method,
        url,
        body,
        bearer_token: session.access_token(),
    };

    let response = send(transport.as_ref(), request.clone()).await?;
    if response.is_success() {
        return Ok(response);
    }
    if response.status != UNAUTHORIZED {
        return Err(ApiFailure::Http {
            status: response.status,
        });
    }

    debug!(path = request.url.path(), "unauthorized, refreshing session");
    if !session.refresh_session().await {
        return Err(ApiFailure::Unauthorized);
    }

    let retry = HttpRequest {
        bearer_token: session.access_token(),
        ..request
    };
    let response = send(transport.as_ref(), retry).await?;
    match response.status {
        status if (200..300).contains(&status) => Ok(response),
        UNAUTHORIZED => Err(ApiFailure::Unauthorized),
        status => Err(ApiFailure::Http { status }),
    }
}

async fn send<T: HttpTransport>(
    transport: &T,
    request: HttpRequest,
) -> Result<HttpResponse, ApiFailure> {
    let path = request.url.path().to_string();
    transport.send(request).await.map_err(|error| {
        warn!(%path, %error, "request failed before any response");
        ApiFailure::Network(error.to_string())
    })
}

/// HTTP access to the backend on behalf of the current session.
pub struct AuthenticatedClient<S, T>
where
    S: SessionStorage,
    T: HttpTransport,
{
    session: Arc<SessionStore<S, T>>,
}

impl<S, T> Clone for AuthenticatedClient<S, T>
where
    S: SessionStorage,
    T: HttpTransport,
{
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}

impl<S, T> AuthenticatedClient<S, T>
where
    S: SessionStorage,
    T: HttpTransport,
{
    pub fn new(session: Arc<SessionStore<S, T>>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionStore<S, T> {
        &self.session
    }

    /// Performs one call and decodes the `data` envelope.
    ///
    /// Public routes go out without credentials and are never retried. DELETE
    /// responses are not decoded.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: Url,
        body: Option<serde_json::Value>,
        public_route: bool,
    ) -> Result<R, ApiFailure> {
        let response = if public_route {
            let transport = self.session.transport();
            let response = send(
                transport.as_ref(),
                HttpRequest {
                    method,
                    url,
                    body,
                    bearer_token: None,
                },
            )
            .await?;
            if !response.is_success() {
                return Err(ApiFailure::Http {
                    status: response.status,
                });
            }
            response
        } else {
            send_with_refresh(&self.session, method, url, body).await?
        };

        let decoded = if method == HttpMethod::Delete || response.body.trim().is_empty() {
            serde_json::from_value(serde_json::Value::Null)
        } else {
            decode_data(&response.body)
        };
        decoded.map_err(|error| ApiFailure::InvalidPayload(error.to_string()))
    }

    pub async fn get<R: DeserializeOwned>(&self, url: Url) -> Result<R, ApiFailure> {
        self.request(HttpMethod::Get, url, None, false).await
    }

    pub async fn post<B, R>(&self, url: Url, body: Option<&B>) -> Result<R, ApiFailure>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = body.map(to_json).transpose()?;
        self.request(HttpMethod::Post, url, body, false).await
    }

    pub async fn put<B, R>(&self, url: Url, body: &B) -> Result<R, ApiFailure>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = to_json(body)?;
        self.request(HttpMethod::Put, url, Some(body), false).await
    }

    pub async fn delete(&self, url: Url) -> Result<(), ApiFailure> {
        self.request(HttpMethod::Delete, url, None, false).await
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiFailure> {
    serde_json::to_value(body).map_err(|error| ApiFailure::InvalidPayload(error.to_string()))
}
