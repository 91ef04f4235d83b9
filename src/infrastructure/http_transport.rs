use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub body: Option<serde_json::Value>,
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a status (DNS, connection, body read).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(token) = request.bearer_token.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|error| {
            TransportError(format!("request to {} failed: {error}", request.url.path()))
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|error| TransportError(format!("failed reading response body: {error}")))?;

        Ok(HttpResponse { status, body })
    }
}

/// Extracts the payload of a `{ "data": T }` envelope. Only a body without a
/// `data` member is decoded as the payload itself; `"data": null` is `null`.
pub fn decode_data<T: DeserializeOwned>(body: &str) -> Result<T, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let payload = match value {
        serde_json::Value::Object(mut object) if object.contains_key("data") => {
            object.remove("data").unwrap_or_default()
        }
        other => other,
    };
    serde_json::from_value(payload)
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    type Route = (HttpMethod, String);

    #[derive(Debug)]
    struct Scripted {
        delay: Option<Duration>,
        outcome: Result<HttpResponse, TransportError>,
    }

    /// Answers requests from per-route queues and records everything it sees.
    /// Unscripted routes answer 404.
    #[derive(Debug, Default)]
    pub struct ScriptedTransport {
        routes: Mutex<HashMap<Route, VecDeque<Scripted>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub fn respond(&self, method: HttpMethod, path: &str, status: u16, body: serde_json::Value) {
            self.push(method, path, None, Ok(response(status, body)));
        }

        /// Like `respond`, but the answer only arrives after `delay`.
        pub fn respond_after(
            &self,
            method: HttpMethod,
            path: &str,
            delay: Duration,
            status: u16,
            body: serde_json::Value,
        ) {
            self.push(method, path, Some(delay), Ok(response(status, body)));
        }

        pub fn fail(&self, method: HttpMethod, path: &str, message: &str) {
            self.push(method, path, None, Err(TransportError(message.to_string())));
        }

        fn push(
            &self,
            method: HttpMethod,
            path: &str,
            delay: Option<Duration>,
            outcome: Result<HttpResponse, TransportError>,
        ) {
            self.routes
                .lock()
                .expect("routes mutex poisoned")
                .entry((method, path.to_string()))
                .or_default()
                .push_back(Scripted { delay, outcome });
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().expect("requests mutex poisoned").clone()
        }

        pub fn calls(&self, method: HttpMethod, path: &str) -> usize {
            self.requests()
                .iter()
                .filter(|request| request.method == method && request.url.path() == path)
                .count()
        }
    }

    fn response(status: u16, body: serde_json::Value) -> HttpResponse {
        let body = if body.is_null() { String::new() } else { body.to_string() };
        HttpResponse { status, body }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let route = (request.method, request.url.path().to_string());
            self.requests
                .lock()
                .expect("requests mutex poisoned")
                .push(request);
            let scripted = self
                .routes
                .lock()
                .expect("routes mutex poisoned")
                .get_mut(&route)
                .and_then(VecDeque::pop_front);
            let Some(Scripted { delay, outcome }) = scripted else {
                return Ok(response(404, serde_json::Value::Null));
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            outcome
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        id: i64,
    }

    #[test]
    fn decode_data_unwraps_envelope() {
        let decoded: Payload = decode_data(r#"{"data":{"id":3}}"#).expect("decode");
        assert_eq!(decoded, Payload { id: 3 });
    }

    #[test]
    fn decode_data_falls_back_to_whole_body() {
        let decoded: Payload = decode_data(r#"{"id":5}"#).expect("decode");
        assert_eq!(decoded, Payload { id: 5 });
    }

    #[test]
    fn decode_data_keeps_null_payload() {
        let decoded: Option<Payload> = decode_data(r#"{"data":null}"#).expect("decode");
        assert_eq!(decoded, None);
    }

    #[test]
    fn decode_data_reports_malformed_payload() {
        assert!(decode_data::<Payload>(r#"{"data":{"id":"x"}}"#).is_err());
        assert!(decode_data::<Payload>("<html>").is_err());
    }

    #[test]
    fn success_range_is_2xx() {
        let ok = HttpResponse {
            status: 204,
            body: String::new(),
        };
        let redirect = HttpResponse {
            status: 302,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }
}
