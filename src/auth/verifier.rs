use std::io;
use std::sync::Arc;

use console::Term;
use log::{info, warn};
use url::Url;

use crate::error::{AuthError, AuthResult};
use crate::output::{bright_yellow, cyan};

use super::credential::Credential;

/// Obtains a one-time verification code out of band.
pub trait Verifier {
    fn obtain_credential(&self) -> AuthResult<String>;
}

/// Opens the authorization page for the user.
pub trait Browser {
    fn open(&self, url: &Url) -> io::Result<()>;
}

/// Reads the code the user copied from the authorization page.
pub trait CodePrompt {
    fn read_code(&self, url: &Url) -> AuthResult<String>;
}

/// The desktop's default browser.
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&self, url: &Url) -> io::Result<()> {
        webbrowser::open(url.as_str())
    }
}

/// Prompts on stderr and reads the code from the terminal.
pub struct TermPrompt {
    term: Term,
}

impl Default for TermPrompt {
    fn default() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl CodePrompt for TermPrompt {
    fn read_code(&self, url: &Url) -> AuthResult<String> {
        self.term.write_line(&format!(
            "{}\n  {}",
            bright_yellow("Sign in to ClusterFuzz at the following URL and copy the verification code:"),
            cyan(url)
        ))?;
        self.term.write_str("Verification code: ")?;

        Ok(self.term.read_line()?)
    }
}

/// Asks the user to authorize in a browser and paste back the code.
pub struct ConsoleVerifier {
    authorization_url: Url,
    browser: Arc<dyn Browser>,
    prompt: Arc<dyn CodePrompt>,
}

impl ConsoleVerifier {
    pub fn new(authorization_url: Url) -> Self {
        Self::with_parts(
            authorization_url,
            Arc::new(SystemBrowser),
            Arc::new(TermPrompt::default()),
        )
    }

    pub fn with_parts(
        authorization_url: Url,
        browser: Arc<dyn Browser>,
        prompt: Arc<dyn CodePrompt>,
    ) -> Self {
        Self {
            authorization_url,
            browser,
            prompt,
        }
    }
}

impl Verifier for ConsoleVerifier {
    fn obtain_credential(&self) -> AuthResult<String> {
        info!("Requesting a verification code");

        if let Err(e) = self.browser.open(&self.authorization_url) {
            warn!("Could not open a browser ({e}); open the URL below manually");
        }

        let code = self.prompt.read_code(&self.authorization_url)?;
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthError::EmptyVerificationCode);
        }

        Ok(code.to_string())
    }
}

/// Runs the verifier and wraps its token with the `VerificationCode` scheme.
pub fn verification_credential(verifier: &dyn Verifier) -> AuthResult<Credential> {
    verifier
        .obtain_credential()
        .map(Credential::verification_code)
}
