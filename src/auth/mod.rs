//! Credentials for the ClusterFuzz API.
//!
//! A request is authorized either with a cached bearer token (persisted by a
//! [`CredentialStore`]) or with a one-time verification code obtained from a
//! [`Verifier`].

mod credential;
mod store;
mod verifier;

pub use credential::{request_headers, Credential, Scheme};
pub use store::{CredentialStore, FileCredentialStore};
pub use verifier::{verification_credential, ConsoleVerifier, Verifier};
