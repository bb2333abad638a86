use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::auth::FileCredentialStore;
use crate::client::{RetryPolicy, RETRY_COUNT, RETRY_DELAY_SECONDS};
use crate::jobs::JobCatalogConfig;

/// Configuration file structure for the clusterfuzz tools.
///
/// Every section is optional; missing values fall back to the public
/// ClusterFuzz deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Endpoint returning test case details
    #[serde(default = "default_testcase_info_url")]
    pub testcase_info_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuthConfig {
    /// Page the user opens to obtain a verification code
    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,

    /// Where the bearer credential is cached (default: ~/.clusterfuzz/auth_header)
    pub credential_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Total requests per call, across re-authentication
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Wait between retries of server errors
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JobsConfig {
    /// YAML file replacing the bundled job type catalog
    pub catalog_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            testcase_info_url: default_testcase_info_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            oauth_url: default_oauth_url(),
            credential_file: None,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_seconds: default_delay_seconds(),
        }
    }
}

fn default_testcase_info_url() -> String {
    "https://clusterfuzz.com/v2/testcase-detail/refresh".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_oauth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth?scope=email+profile\
     &client_id=981641712411-sj50drhontt4m3gjc3hordjmpc7bn50f.apps.googleusercontent.com\
     &response_type=code&redirect_uri=urn:ietf:wg:oauth:2.0:oob"
        .to_string()
}

fn default_attempts() -> u32 {
    RETRY_COUNT
}

fn default_delay_seconds() -> u64 {
    RETRY_DELAY_SECONDS
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./clusterfuzz.toml
    /// 3. ./clusterfuzz.json
    /// 4. ./clusterfuzz.yaml
    /// 5. ./clusterfuzz.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "clusterfuzz.toml",
            "clusterfuzz.json",
            "clusterfuzz.yaml",
            "clusterfuzz.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
        }
    }

    pub fn testcase_info_url(&self) -> Result<Url> {
        Url::parse(&self.server.testcase_info_url).with_context(|| {
            format!(
                "Invalid testcase info URL: {}",
                self.server.testcase_info_url
            )
        })
    }

    pub fn oauth_url(&self) -> Result<Url> {
        Url::parse(&self.auth.oauth_url)
            .with_context(|| format!("Invalid OAuth URL: {}", self.auth.oauth_url))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_seconds)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry.attempts,
            delay: Duration::from_secs(self.retry.delay_seconds),
        }
    }

    pub fn credential_store(&self) -> Result<FileCredentialStore> {
        match &self.auth.credential_file {
            Some(path) => Ok(FileCredentialStore::new(path)),
            None => FileCredentialStore::default_location()
                .context("Failed to locate the credential file"),
        }
    }

    /// The configured job catalog, or the bundled one.
    pub fn job_catalog(&self) -> Result<JobCatalogConfig> {
        match &self.jobs.catalog_file {
            Some(path) => {
                let contents = std::fs::read_to_string(path).with_context(|| {
                    format!("Failed to read job catalog: {}", path.display())
                })?;
                JobCatalogConfig::from_yaml(&contents)
                    .with_context(|| format!("Failed to parse job catalog: {}", path.display()))
            }
            None => JobCatalogConfig::bundled().context("Failed to parse bundled job catalog"),
        }
    }
}
