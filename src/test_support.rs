//! In-memory doubles for the credential store, verifier and transport.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;

use crate::auth::{Credential, CredentialStore, Verifier};
use crate::client::{RequestOutcome, Transport};
use crate::error::{AuthResult, ClientError};

pub fn outcome(status: u16, body: &str, headers: &[(&str, &str)]) -> RequestOutcome {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }

    RequestOutcome {
        status: StatusCode::from_u16(status).unwrap(),
        body: body.to_string(),
        headers: map,
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    stored: Mutex<Option<Credential>>,
    saves: Mutex<Vec<Credential>>,
    loads: AtomicUsize,
}

impl MemoryCredentialStore {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with(credential: Credential) -> Arc<Self> {
        let store = Self::default();
        *store.stored.lock().unwrap() = Some(credential);
        Arc::new(store)
    }

    pub fn saves(&self) -> Vec<Credential> {
        self.saves.lock().unwrap().clone()
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> AuthResult<Option<Credential>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.stored.lock().unwrap().clone())
    }

    fn save(&self, credential: &Credential) -> AuthResult<()> {
        *self.stored.lock().unwrap() = Some(credential.clone());
        self.saves.lock().unwrap().push(credential.clone());
        Ok(())
    }
}

pub struct ScriptedVerifier {
    code: String,
    calls: AtomicUsize,
}

impl ScriptedVerifier {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Verifier for ScriptedVerifier {
    fn obtain_credential(&self) -> AuthResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.code.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub authorization: String,
    pub user_agent: String,
    pub body: String,
}

/// Replays queued responses in order; the last one repeats once the queue
/// is down to it.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<RequestOutcome>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<RequestOutcome>) -> Arc<Self> {
        assert!(!responses.is_empty(), "script needs at least one response");
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn authorizations(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.authorization)
            .collect()
    }
}

impl Transport for Arc<ScriptedTransport> {
    async fn post(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &str,
    ) -> Result<RequestOutcome, ClientError> {
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };

        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            authorization: header(AUTHORIZATION),
            user_agent: header(USER_AGENT),
            body: body.to_string(),
        });

        let mut responses = self.responses.lock().unwrap();
        let response = if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses.front().cloned().unwrap()
        };
        Ok(response)
    }
}
