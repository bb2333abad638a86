use std::fmt;
use std::str::FromStr;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};

use crate::error::{AuthError, AuthResult};

pub const CLIENT_USER_AGENT: &str = "clusterfuzz-tools";

/// Authorization scheme sent in front of the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Bearer,
    VerificationCode,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bearer => "Bearer",
            Self::VerificationCode => "VerificationCode",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bearer" => Ok(Self::Bearer),
            "VerificationCode" => Ok(Self::VerificationCode),
            other => Err(AuthError::InvalidHeader(format!("unknown scheme '{other}'"))),
        }
    }
}

/// An opaque token paired with the scheme it must be presented with.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    scheme: Scheme,
    token: String,
}

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            scheme: Scheme::Bearer,
            token: token.into(),
        }
    }

    pub fn verification_code(token: impl Into<String>) -> Self {
        Self {
            scheme: Scheme::VerificationCode,
            token: token.into(),
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Renders the value of the `Authorization` header, e.g. `Bearer abc`.
    pub fn header_value(&self) -> String {
        format!("{} {}", self.scheme, self.token)
    }

    /// Parses a header value of the form `<scheme> <token>`.
    pub fn parse(header: &str) -> AuthResult<Self> {
        let (scheme, token) = header
            .trim()
            .split_once(' ')
            .ok_or_else(|| AuthError::InvalidHeader("expected '<scheme> <token>'".into()))?;

        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidHeader("empty token".into()));
        }

        Ok(Self {
            scheme: scheme.parse()?,
            token: token.to_string(),
        })
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("scheme", &self.scheme)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Headers attached to every request made with `credential`.
pub fn request_headers(credential: &Credential) -> AuthResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    let authorization = HeaderValue::from_str(&credential.header_value())
        .map_err(|e| AuthError::InvalidHeader(e.to_string()))?;

    headers.insert(AUTHORIZATION, authorization);
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
    Ok(headers)
}
