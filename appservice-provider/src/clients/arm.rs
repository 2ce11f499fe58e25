//! Resource manager REST client

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::auth::TokenCredential;
use super::lro::{LongRunningOperation, OperationStatus, PendingOperation, PollStrategy, retry_after};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unexpected status {status} with error: {code}: {message}")]
    Status {
        status: u16,
        code: String,
        message: String,
    },

    #[error("long running operation {status}: {message}")]
    OperationFailed { status: String, message: String },

    #[error("authenticating: {0}")]
    Auth(String),

    #[error("sending request: {0}")]
    Http(#[from] reqwest::Error),

    #[error("building request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("decoding response: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Status {
            status: 404,
            code: "NotFound".to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Default, serde::Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

fn status_error(status: StatusCode, body: &str) -> ApiError {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let message = if envelope.error.message.is_empty() {
        body.to_string()
    } else {
        envelope.error.message
    };
    ApiError::Status {
        status: status.as_u16(),
        code: envelope.error.code,
        message,
    }
}

fn parse_body(text: &str) -> Result<serde_json::Value, ApiError> {
    if text.trim().is_empty() {
        Ok(serde_json::Value::Null)
    } else {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Clone)]
pub struct ArmClient {
    http: reqwest::Client,
    base_url: Url,
    credential: Arc<TokenCredential>,
}

impl ArmClient {
    pub fn new(base_url: Url, credential: TokenCredential) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            credential: Arc::new(credential),
        }
    }

    /// Resource manager URL for `path` with `api-version` and extra query pairs
    pub fn url(&self, path: &str, api_version: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.base_url.join(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("api-version", api_version);
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        log::debug!("{} {}", method, url);
        let token = self.credential.token().await?;
        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        Ok(request.send().await?)
    }

    /// Send a request and decode a successful response body
    async fn call(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ApiError> {
        let response = self.send(method, url, body).await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }
        parse_body(&text)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, api_version: &str) -> Result<T, ApiError> {
        let url = self.url(path, api_version, &[])?;
        let body = self.call(Method::GET, url, None).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn put<B, T>(&self, path: &str, api_version: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, api_version, &[])?;
        let body = self
            .call(Method::PUT, url, Some(serde_json::to_value(body)?))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn post<B, T>(&self, path: &str, api_version: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, api_version, &[])?;
        let body = body.map(serde_json::to_value).transpose()?;
        let body = self.call(Method::POST, url, body).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn delete(&self, path: &str, api_version: &str, query: &[(&str, &str)]) -> Result<(), ApiError> {
        let url = self.url(path, api_version, query)?;
        self.call(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// Start a long-running operation. With `refetch`, the resource is re-read once it succeeds.
    pub async fn begin(
        &self,
        method: Method,
        path: &str,
        api_version: &str,
        body: Option<serde_json::Value>,
        refetch: bool,
    ) -> Result<LongRunningOperation, ApiError> {
        let url = self.url(path, api_version, &[])?;
        let resource_url = refetch.then(|| url.clone());
        let response = self.send(method, url, body).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }
        Ok(LongRunningOperation::from_response(
            status,
            &headers,
            parse_body(&text)?,
            resource_url,
        ))
    }

    /// Block until the operation completes, returning its final body
    pub async fn poll_until_done(&self, operation: LongRunningOperation) -> Result<serde_json::Value, ApiError> {
        match operation {
            LongRunningOperation::Done(body) => Ok(body),
            LongRunningOperation::Pending(pending) => self.poll(pending).await,
        }
    }

    async fn poll(&self, pending: PendingOperation) -> Result<serde_json::Value, ApiError> {
        let mut wait = pending.retry_after;
        loop {
            tokio::time::sleep(wait).await;
            log::debug!("polling long running operation {}", pending.poll_url);

            let response = self.send(Method::GET, pending.poll_url.clone(), None).await?;
            let status = response.status();
            wait = retry_after(response.headers());
            let text = response.text().await?;
            if !status.is_success() {
                return Err(status_error(status, &text));
            }
            let body = parse_body(&text)?;

            match pending.strategy {
                PollStrategy::Location => {
                    if status != StatusCode::ACCEPTED {
                        return Ok(body);
                    }
                }
                PollStrategy::AsyncOperation => match OperationStatus::from_body(&body)? {
                    OperationStatus::InProgress => {}
                    OperationStatus::Succeeded => {
                        return match &pending.resource_url {
                            Some(url) => self.call(Method::GET, url.clone(), None).await,
                            None => Ok(body),
                        };
                    }
                    OperationStatus::Failed(message) => {
                        return Err(ApiError::OperationFailed {
                            status: "Failed".to_string(),
                            message,
                        });
                    }
                    OperationStatus::Canceled => {
                        return Err(ApiError::OperationFailed {
                            status: "Canceled".to_string(),
                            message: "the operation was canceled".to_string(),
                        });
                    }
                },
            }
        }
    }
}
