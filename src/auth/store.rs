use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{AuthError, AuthResult};

use super::credential::{Credential, Scheme};

/// Persists the bearer credential between invocations.
pub trait CredentialStore {
    /// Returns the cached credential, or `None` when nothing usable is stored.
    fn load(&self) -> AuthResult<Option<Credential>>;

    fn save(&self, credential: &Credential) -> AuthResult<()>;
}

/// Credential cache kept in a single file holding the header value.
///
/// Defaults to `~/.clusterfuzz/auth_header`.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> AuthResult<Self> {
        let home = dirs::home_dir().ok_or(AuthError::NoHomeDirectory)?;
        Ok(Self::new(home.join(".clusterfuzz").join("auth_header")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> AuthResult<Option<Credential>> {
        if !self.path.exists() {
            debug!("No stored credential at {}", self.path.display());
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }

        match Credential::parse(&contents) {
            Ok(credential) if credential.scheme() == Scheme::Bearer => {
                debug!("Loaded stored credential from {}", self.path.display());
                Ok(Some(credential))
            }
            Ok(credential) => {
                warn!(
                    "Ignoring stored {} credential in {}; only bearer tokens are reused",
                    credential.scheme(),
                    self.path.display()
                );
                Ok(None)
            }
            Err(e) => {
                warn!(
                    "Ignoring unreadable credential in {}: {e}",
                    self.path.display()
                );
                Ok(None)
            }
        }
    }

    fn save(&self, credential: &Credential) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, credential.header_value())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        debug!("Stored credential at {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("auth_header"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("auth_header");
        let store = FileCredentialStore::new(&path);

        store.save(&Credential::bearer("12345")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Bearer 12345");
        assert_eq!(store.load().unwrap(), Some(Credential::bearer("12345")));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("auth_header"));
        store.save(&Credential::bearer("12345")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_empty_or_garbage_file_is_ignored() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("auth_header");
        let store = FileCredentialStore::new(&path);

        fs::write(&path, "  \n").unwrap();
        assert!(store.load().unwrap().is_none());

        fs::write(&path, "not-a-header").unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_stored_verification_code_is_not_reused() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("auth_header");
        let store = FileCredentialStore::new(&path);

        fs::write(&path, "VerificationCode 12345").unwrap();

        assert!(store.load().unwrap().is_none());
    }
}
