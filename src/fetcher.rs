use log::{info, warn};
use serde::Serialize;
use url::Url;

use crate::client::{AuthenticatedClient, Transport};
use crate::error::{ClientError, FetchError};
use crate::testcase::Testcase;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TestcaseRequest<'a> {
    testcase_id: &'a str,
}

/// Retrieves test cases through an [`AuthenticatedClient`].
pub struct TestcaseFetcher<T: Transport> {
    client: AuthenticatedClient<T>,
    endpoint: Url,
}

impl<T: Transport> TestcaseFetcher<T> {
    pub fn new(client: AuthenticatedClient<T>, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Fetches a test case along with the identity the server saw.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidTestcaseId`] when the server answers 404
    /// - [`FetchError::Unauthorized`] when every credential was rejected
    /// - [`FetchError::RequestFailed`] for any other failing status
    /// - [`FetchError::Json`] when the body is not a test case
    pub async fn fetch_by_identity(
        &mut self,
        testcase_id: &str,
    ) -> Result<(Testcase, String), FetchError> {
        info!("Fetching testcase {testcase_id}");

        let payload = serde_json::to_string(&TestcaseRequest { testcase_id })?;
        let outcome = self
            .client
            .send(self.endpoint.as_str(), &payload)
            .await
            .map_err(|err| translate(testcase_id, err))?;

        let testcase = Testcase::from_json(&outcome.body)?;
        let identity = outcome.identity().unwrap_or_default().to_string();
        if identity.is_empty() {
            warn!("The server did not report an identity for testcase {testcase_id}");
        }

        Ok((testcase, identity))
    }
}

fn translate(testcase_id: &str, err: ClientError) -> FetchError {
    let testcase_id = testcase_id.to_string();
    match err {
        ClientError::RequestFailed { status: 404, .. } => FetchError::InvalidTestcaseId { testcase_id },
        ClientError::Unauthorized { identity, .. } => FetchError::Unauthorized {
            testcase_id,
            identity,
        },
        ClientError::RequestFailed {
            status,
            body,
            identity,
        } => FetchError::RequestFailed {
            testcase_id,
            status,
            body,
            identity,
        },
        other => FetchError::Client(other),
    }
}
