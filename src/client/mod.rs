//! Authenticated requests to the ClusterFuzz API.
//!
//! [`AuthenticatedClient::send`] drives a two-phase state machine (see
//! [`Phase`]): requests start with the stored bearer credential when one
//! exists, retry transient server errors with the same credential, and fall
//! back to a single interactive verification when the server rejects it.

mod phase;
mod transport;


use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::StatusCode;

use crate::auth::{request_headers, verification_credential, Credential, CredentialStore, Verifier};
use crate::error::ClientError;

pub use phase::{AttemptBudget, Phase, Transition};
pub use transport::{HttpTransport, RequestOutcome, Transport, AUTH_HEADER, IDENTITY_HEADER};

pub const RETRY_COUNT: u32 = 3;
pub const RETRY_DELAY_SECONDS: u64 = 3;

/// How many attempts one call may make and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: RETRY_COUNT,
            delay: Duration::from_secs(RETRY_DELAY_SECONDS),
        }
    }
}

pub struct AuthenticatedClient<T: Transport> {
    transport: T,
    store: Arc<dyn CredentialStore>,
    verifier: Arc<dyn Verifier>,
    policy: RetryPolicy,
    stored: Option<Credential>,
}

impl<T: Transport> AuthenticatedClient<T> {
    /// Creates a client, loading the stored credential once.
    pub fn new(
        transport: T,
        store: Arc<dyn CredentialStore>,
        verifier: Arc<dyn Verifier>,
        policy: RetryPolicy,
    ) -> Result<Self, ClientError> {
        let stored = store.load()?;

        Ok(Self {
            transport,
            store,
            verifier,
            policy,
            stored,
        })
    }

    /// Sends `payload` to `url`, handling retries and re-authentication.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Unauthorized`] when the last response was a 401
    /// - [`ClientError::RequestFailed`] for any other non-200 final response,
    ///   including server errors that outlast the retry budget
    /// - transport, store or verifier failures as they occur
    pub async fn send(&mut self, url: &str, payload: &str) -> Result<RequestOutcome, ClientError> {
        let mut phase = match &self.stored {
            Some(credential) => Phase::StoredCredential(credential.clone()),
            None => Phase::VerifiedCredential(self.verify()?),
        };
        let mut budget = AttemptBudget::new(self.policy.attempts);

        loop {
            budget.record_attempt();
            debug!(
                "Sending request to {url} with {} credential (attempt {}/{})",
                phase.credential().scheme(),
                budget.used(),
                budget.limit()
            );

            let headers = request_headers(phase.credential())?;
            let outcome = self.transport.post(url, headers, payload).await?;

            match phase.next(outcome.status, &budget) {
                Transition::Done => {
                    self.persist(&outcome)?;
                    return Ok(outcome);
                }
                Transition::Retry if outcome.status.is_server_error() => {
                    warn!(
                        "Server error (status {}). Waiting {}s before retry {}/{}...",
                        outcome.status,
                        self.policy.delay.as_secs(),
                        budget.used() + 1,
                        budget.limit()
                    );
                    tokio::time::sleep(self.policy.delay).await;
                }
                Transition::Retry => {
                    warn!(
                        "Verification code was rejected, retrying ({}/{})",
                        budget.used() + 1,
                        budget.limit()
                    );
                }
                Transition::Reverify => {
                    info!("Stored credential was rejected, a new verification code is needed");
                    self.stored = None;
                    phase = Phase::VerifiedCredential(self.verify()?);
                }
                Transition::Stop => return Err(failure(outcome)),
            }
        }
    }

    fn verify(&self) -> Result<Credential, ClientError> {
        Ok(verification_credential(self.verifier.as_ref())?)
    }

    fn persist(&mut self, outcome: &RequestOutcome) -> Result<(), ClientError> {
        match outcome.refreshed_credential() {
            Some(credential) => {
                self.store.save(&credential)?;
                self.stored = Some(credential);
            }
            None if outcome.headers.contains_key(AUTH_HEADER) => {
                warn!("Ignoring unusable credential returned in {AUTH_HEADER}");
            }
            None => debug!("Response carried no refreshed credential"),
        }
        Ok(())
    }
}

fn failure(outcome: RequestOutcome) -> ClientError {
    let identity = outcome.identity().map(str::to_owned);
    let status = outcome.status.as_u16();

    if outcome.status == StatusCode::UNAUTHORIZED {
        ClientError::Unauthorized {
            status,
            body: outcome.body,
            identity,
        }
    } else {
        ClientError::RequestFailed {
            status,
            body: outcome.body,
            identity,
        }
    }
}
