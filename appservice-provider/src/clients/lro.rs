//! Long-running operations
//!
//! A 201/202 response carrying `Azure-AsyncOperation` or `Location` hands back a
//! handle that is polled until the operation finishes. `Azure-AsyncOperation`
//! points at a status document; `Location` is polled until it stops answering 202.
//! When both are sent, the result of a finished operation is read from `Location`.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use url::Url;

const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub enum LongRunningOperation {
    /// Finished synchronously with this body (`Null` when empty)
    Done(serde_json::Value),
    Pending(PendingOperation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStrategy {
    AsyncOperation,
    Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    pub strategy: PollStrategy,
    pub poll_url: Url,
    /// Read once a status document reports success
    pub resource_url: Option<Url>,
    pub retry_after: Duration,
}

impl LongRunningOperation {
    pub fn from_response(
        status: StatusCode,
        headers: &HeaderMap,
        body: serde_json::Value,
        resource_url: Option<Url>,
    ) -> Self {
        if status != StatusCode::CREATED && status != StatusCode::ACCEPTED {
            return Self::Done(body);
        }

        let header_url = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| Url::parse(v).ok())
        };
        let (strategy, poll_url, resource_url) = match (
            header_url("azure-asyncoperation"),
            header_url("location"),
        ) {
            (Some(url), location) => (PollStrategy::AsyncOperation, url, resource_url.or(location)),
            (None, Some(url)) => (PollStrategy::Location, url, resource_url),
            (None, None) => return Self::Done(body),
        };

        Self::Pending(PendingOperation {
            strategy,
            poll_url,
            resource_url,
            retry_after: retry_after(headers),
        })
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// `Retry-After` in seconds, or the default poll interval
pub fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    InProgress,
    Succeeded,
    Failed(String),
    Canceled,
}

#[derive(Debug, Deserialize)]
struct StatusDocument {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<StatusError>,
}

#[derive(Debug, Deserialize)]
struct StatusError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl OperationStatus {
    /// Interpret an `Azure-AsyncOperation` status document
    pub fn from_body(body: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let doc: StatusDocument = serde_json::from_value(body.clone())?;
        Ok(match doc.status.to_ascii_lowercase().as_str() {
            "succeeded" => Self::Succeeded,
            "canceled" | "cancelled" => Self::Canceled,
            "failed" => {
                let message = doc
                    .error
                    .map(|e| format!("{}: {}", e.code, e.message))
                    .unwrap_or_else(|| "no error details".to_string());
                Self::Failed(message)
            }
            _ => Self::InProgress,
        })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;
    use serde_json::json;

    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_str(v).unwrap());
        }
        map
    }

    #[test]
    fn ok_response_is_done() {
        let op = LongRunningOperation::from_response(
            StatusCode::OK,
            &headers(&[("location", "https://example.com/op")]),
            json!({"name": "app1"}),
            None,
        );
        assert_eq!(op, LongRunningOperation::Done(json!({"name": "app1"})));
    }

    #[test]
    fn async_operation_header_wins_over_location() {
        let op = LongRunningOperation::from_response(
            StatusCode::CREATED,
            &headers(&[
                ("azure-asyncoperation", "https://example.com/status"),
                ("location", "https://example.com/location"),
                ("retry-after", "3"),
            ]),
            serde_json::Value::Null,
            None,
        );
        let LongRunningOperation::Pending(pending) = op else {
            panic!("expected pending");
        };
        assert_eq!(pending.strategy, PollStrategy::AsyncOperation);
        assert_eq!(pending.poll_url.as_str(), "https://example.com/status");
        assert_eq!(pending.retry_after, Duration::from_secs(3));
    }

    #[test]
    fn accepted_without_headers_is_done() {
        let op = LongRunningOperation::from_response(
            StatusCode::ACCEPTED,
            &HeaderMap::new(),
            serde_json::Value::Null,
            None,
        );
        assert!(op.is_done());
    }

    #[test]
    fn retry_after_defaults_to_ten_seconds() {
        assert_eq!(retry_after(&HeaderMap::new()), Duration::from_secs(10));
        assert_eq!(
            retry_after(&headers(&[("retry-after", "soon")])),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn status_documents() {
        let status = |body: serde_json::Value| OperationStatus::from_body(&body).unwrap();
        assert_eq!(status(json!({"status": "InProgress"})), OperationStatus::InProgress);
        assert_eq!(status(json!({"status": "Succeeded"})), OperationStatus::Succeeded);
        assert_eq!(status(json!({"status": "Canceled"})), OperationStatus::Canceled);
        assert_eq!(
            status(json!({
                "status": "Failed",
                "error": {"code": "Conflict", "message": "plan is busy"}
            })),
            OperationStatus::Failed("Conflict: plan is busy".to_string())
        );
    }

    #[test]
    fn undecodable_status_document_is_an_error() {
        assert!(OperationStatus::from_body(&serde_json::Value::Null).is_err());
        assert!(OperationStatus::from_body(&json!({"status": 3})).is_err());
        assert!(OperationStatus::from_body(&json!(["Succeeded"])).is_err());
    }

    #[test]
    fn result_of_a_post_is_read_from_location() {
        let op = LongRunningOperation::from_response(
            StatusCode::ACCEPTED,
            &headers(&[
                ("azure-asyncoperation", "https://example.com/status"),
                ("location", "https://example.com/result"),
            ]),
            serde_json::Value::Null,
            None,
        );
        let LongRunningOperation::Pending(pending) = op else {
            panic!("expected pending");
        };
        assert_eq!(pending.strategy, PollStrategy::AsyncOperation);
        assert_eq!(
            pending.resource_url.as_ref().map(Url::as_str),
            Some("https://example.com/result")
        );
    }

    #[test]
    fn refetched_resource_wins_over_location() {
        let resource = Url::parse("https://example.com/sites/app1").unwrap();
        let op = LongRunningOperation::from_response(
            StatusCode::CREATED,
            &headers(&[
                ("azure-asyncoperation", "https://example.com/status"),
                ("location", "https://example.com/result"),
            ]),
            serde_json::Value::Null,
            Some(resource.clone()),
        );
        let LongRunningOperation::Pending(pending) = op else {
            panic!("expected pending");
        };
        assert_eq!(pending.resource_url, Some(resource));
    }
}
