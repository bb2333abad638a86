use thiserror::Error;

/// Failures of the credential store and the interactive verifier.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Malformed authorization header: {0}")]
    InvalidHeader(String),

    #[error("No verification code was entered")]
    EmptyVerificationCode,

    #[error("Unable to locate the home directory for the credential file")]
    NoHomeDirectory,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Failures surfaced by the authenticated request client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Unauthorized (status {status}){}: {body}", identity_suffix(.identity))]
    Unauthorized {
        status: u16,
        body: String,
        identity: Option<String>,
    },

    #[error("Request failed with status {status}{}: {body}", identity_suffix(.identity))]
    RequestFailed {
        status: u16,
        body: String,
        identity: Option<String>,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ClientError {
    /// HTTP status of the last response, when the failure came from one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures while building the job catalog or resolving a job type.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Job type {job_type} (testcase {testcase_id}) is not supported with build mode '{mode}'")]
    JobTypeNotSupported {
        job_type: String,
        testcase_id: String,
        mode: String,
    },

    #[error("Bad definition for job type {job_type}: {reason}")]
    BadJobTypeDefinition { job_type: String, reason: String },

    #[error("Invalid job catalog: {0}")]
    InvalidCatalog(#[from] serde_yaml::Error),

    #[error("Unknown build mode '{0}' (expected download, chromium or standalone)")]
    UnknownBuildMode(String),
}

/// Domain failures of fetching a test case.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("The testcase ID {testcase_id} is invalid. Please check the ID and try again.")]
    InvalidTestcaseId { testcase_id: String },

    #[error("You{} are not authorized to access testcase {testcase_id}.", identity_in_parens(.identity))]
    Unauthorized {
        testcase_id: String,
        identity: Option<String>,
    },

    #[error("Fetching testcase {testcase_id} failed with status {status}{}: {body}", identity_suffix(.identity))]
    RequestFailed {
        testcase_id: String,
        status: u16,
        body: String,
        identity: Option<String>,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl FetchError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::InvalidTestcaseId { .. } => Some(404),
            Self::Unauthorized { .. } => Some(401),
            Self::RequestFailed { status, .. } => Some(*status),
            Self::Client(err) => err.status_code(),
            Self::Json(_) => None,
        }
    }
}

/// Errors surfaced by a whole reproduction run.
#[derive(Error, Debug)]
pub enum ClusterfuzzError {
    #[error("Testcase {testcase_id} does not name a job type")]
    MissingJobType { testcase_id: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Job(#[from] JobError),
}

impl ClusterfuzzError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Fetch(err) => err.status_code(),
            Self::MissingJobType { .. } | Self::Job(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClusterfuzzError>;

fn identity_in_parens(identity: &Option<String>) -> String {
    match identity.as_deref() {
        Some(identity) if !identity.is_empty() => format!(" ({identity})"),
        _ => String::new(),
    }
}

fn identity_suffix(identity: &Option<String>) -> String {
    match identity.as_deref() {
        Some(identity) if !identity.is_empty() => format!(" for {identity}"),
        _ => String::new(),
    }
}
