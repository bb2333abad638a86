use reqwest::StatusCode;

use crate::auth::Credential;

/// Caps the number of requests sent for one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptBudget {
    limit: u32,
    used: u32,
}

impl AttemptBudget {
    /// A budget always allows at least one attempt.
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            used: 0,
        }
    }

    pub fn record_attempt(&mut self) {
        self.used = (self.used + 1).min(self.limit);
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn remaining(&self) -> u32 {
        self.limit - self.used
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

/// Which credential the next request is sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// The cached bearer credential loaded at startup.
    StoredCredential(Credential),
    /// A verification code obtained during this run.
    VerifiedCredential(Credential),
}

/// What to do after a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Success; return the response.
    Done,
    /// Send again with the same credential.
    Retry,
    /// Drop the stored credential and obtain a verification code.
    Reverify,
    /// Give up and surface the last response as an error.
    Stop,
}

impl Phase {
    pub fn credential(&self) -> &Credential {
        match self {
            Self::StoredCredential(credential) | Self::VerifiedCredential(credential) => credential,
        }
    }

    /// Decides the next step from the status of the attempt just made.
    ///
    /// `budget` must already account for that attempt.
    pub fn next(&self, status: StatusCode, budget: &AttemptBudget) -> Transition {
        if status == StatusCode::OK {
            return Transition::Done;
        }

        if budget.is_exhausted() {
            return Transition::Stop;
        }

        if status.is_server_error() {
            return Transition::Retry;
        }

        match (self, status) {
            (Self::StoredCredential(_), StatusCode::UNAUTHORIZED) => Transition::Reverify,
            // A mistyped code is retried as is; the user is not prompted again.
            (Self::VerifiedCredential(_), StatusCode::UNAUTHORIZED) => Transition::Retry,
            _ => Transition::Stop,
        }
    }
}
