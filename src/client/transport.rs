use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, StatusCode};

use crate::auth::{Credential, Scheme};
use crate::error::ClientError;
use crate::output::RequestSpinner;

/// Response header carrying a refreshed credential to persist.
pub const AUTH_HEADER: &str = "x-clusterfuzz-authorization";
/// Response header carrying the caller's identity.
pub const IDENTITY_HEADER: &str = "x-clusterfuzz-identity";

/// Result of a single HTTP attempt.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub status: StatusCode,
    pub body: String,
    pub headers: HeaderMap,
}

impl RequestOutcome {
    pub fn identity(&self) -> Option<&str> {
        self.headers
            .get(IDENTITY_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
    }

    /// The bearer credential handed back by the server, if any.
    pub fn refreshed_credential(&self) -> Option<Credential> {
        let value = self.headers.get(AUTH_HEADER)?.to_str().ok()?;
        Credential::parse(value)
            .ok()
            .filter(|credential| credential.scheme() == Scheme::Bearer)
    }
}

/// Sends one POST and reports what came back, whatever the status.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn post(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &str,
    ) -> Result<RequestOutcome, ClientError>;
}

pub struct HttpTransport {
    client: Client,
    progress: bool,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            progress: false,
        })
    }

    /// Shows a spinner on stderr while each request is in flight.
    pub fn with_progress(mut self) -> Self {
        self.progress = true;
        self
    }
}

impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &str,
    ) -> Result<RequestOutcome, ClientError> {
        let spinner = self.progress.then(|| RequestSpinner::start(url));
        let response = self
            .client
            .post(url)
            .headers(headers)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_owned())
            .send()
            .await;
        if let Some(spinner) = spinner {
            spinner.finish();
        }
        let response = response?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());

        Ok(RequestOutcome {
            status,
            body,
            headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::request_headers;
    use crate::test_support::outcome;

    #[test]
    fn test_identity_header() {
        let response = outcome(200, "", &[(IDENTITY_HEADER, "identity@something")]);
        assert_eq!(response.identity(), Some("identity@something"));

        let response = outcome(200, "", &[(IDENTITY_HEADER, "")]);
        assert_eq!(response.identity(), None);
    }

    #[test]
    fn test_refreshed_credential_only_accepts_bearer() {
        let response = outcome(200, "", &[(AUTH_HEADER, "Bearer 12345")]);
        assert_eq!(
            response.refreshed_credential(),
            Some(Credential::bearer("12345"))
        );

        let response = outcome(200, "", &[(AUTH_HEADER, "VerificationCode 12345")]);
        assert_eq!(response.refreshed_credential(), None);

        let response = outcome(200, "", &[]);
        assert_eq!(response.refreshed_credential(), None);
    }

    #[tokio::test]
    async fn test_http_transport_reports_any_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/endpoint")
            .match_header("authorization", "Bearer 12345")
            .match_header("user-agent", "clusterfuzz-tools")
            .match_body("payload")
            .with_status(503)
            .with_header(IDENTITY_HEADER, "identity@something")
            .with_body("unavailable")
            .expect(1)
            .create_async()
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let headers = request_headers(&Credential::bearer("12345")).unwrap();
        let response = transport
            .post(&format!("{}/endpoint", server.url()), headers, "payload")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.body, "unavailable");
        assert_eq!(response.identity(), Some("identity@something"));
    }

    #[tokio::test]
    async fn test_http_transport_with_progress() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/endpoint")
            .with_status(200)
            .with_header(AUTH_HEADER, "Bearer fresh")
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5))
            .unwrap()
            .with_progress();
        let headers = request_headers(&Credential::bearer("12345")).unwrap();
        let response = transport
            .post(&format!("{}/endpoint", server.url()), headers, "{}")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.refreshed_credential(), Some(Credential::bearer("fresh")));
    }
}
