use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::ConsoleVerifier;
use crate::client::{AuthenticatedClient, HttpTransport};
use crate::config::Config;
use crate::fetcher::TestcaseFetcher;
use crate::jobs::{build_catalog, BuildMode, JobDefinitionResolver};
use crate::output;
use crate::reproduce::plan_reproduction;

#[derive(Parser)]
#[command(name = "clusterfuzz")]
#[command(author, version, about = "ClusterFuzz test case reproduction tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ./clusterfuzz.{toml,json,yaml,yml})
    #[arg(short, long, global = true, env = "CLUSTERFUZZ_CONFIG")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a test case and resolve how to reproduce it
    Reproduce {
        testcase_id: String,

        /// Where the binary comes from (default: search chromium, then standalone)
        #[arg(short, long, value_enum)]
        build: Option<BuildMode>,
    },

    /// List the job types that can be reproduced
    SupportedJobTypes {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

impl Cli {
    fn resolver(config: &Config) -> Result<JobDefinitionResolver> {
        let catalog = build_catalog(&config.job_catalog()?).context("Failed to build job catalog")?;
        info!("Loaded {} supported job types", catalog.len());
        Ok(JobDefinitionResolver::new(catalog))
    }

    async fn execute_reproduce(
        &self,
        config: &Config,
        testcase_id: &str,
        mode: BuildMode,
    ) -> Result<()> {
        info!("Reproducing testcase {testcase_id}");

        let resolver = Self::resolver(config)?;

        let store = config.credential_store()?;
        info!("Using credential file {}", store.path().display());

        let client = AuthenticatedClient::new(
            HttpTransport::new(config.request_timeout())?.with_progress(),
            Arc::new(store),
            Arc::new(ConsoleVerifier::new(config.oauth_url()?)),
            config.retry_policy(),
        )?;
        let mut fetcher = TestcaseFetcher::new(client, config.testcase_info_url()?);

        let plan = match plan_reproduction(&mut fetcher, &resolver, testcase_id, mode).await {
            Ok(plan) => plan,
            Err(err) => {
                if let Some(status) = err.status_code() {
                    warn!("ClusterFuzz answered with HTTP status {status}");
                }
                return Err(err.into());
            }
        };
        output::print_plan_summary(&plan);

        self.write_json(&plan)
    }

    fn execute_supported_job_types(&self, config: &Config, json: bool) -> Result<()> {
        let resolver = Self::resolver(config)?;

        if json {
            let definitions: Vec<_> = resolver.catalog().iter().collect();
            self.write_json(&definitions)
        } else {
            output::print_job_types(resolver.catalog());
            Ok(())
        }
    }

    fn write_json(&self, value: &impl serde::Serialize) -> Result<()> {
        let json_output = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, json_output)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            info!("Output written to: {}", output_path.display());
        } else {
            println!("{}", json_output);
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Reproduce { testcase_id, build } => {
                self.execute_reproduce(&config, testcase_id, build.unwrap_or_default())
                    .await
            }
            Commands::SupportedJobTypes { json } => {
                self.execute_supported_job_types(&config, *json)
            }
        }
    }
}
