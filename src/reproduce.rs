use std::path::PathBuf;

use log::{info, warn};
use serde::Serialize;

use crate::client::Transport;
use crate::error::{ClusterfuzzError, Result};
use crate::fetcher::TestcaseFetcher;
use crate::jobs::{binary_source, BinarySource, BuildDefinition, BuildMode, JobDefinitionResolver};
use crate::testcase::{unreproducible_warnings, Testcase};

/// Everything the build and reproduction tools need for one test case.
#[derive(Debug, Serialize)]
pub struct ReproductionPlan {
    pub testcase: Testcase,
    pub identity: String,
    pub build_mode: BuildMode,
    pub definition: BuildDefinition,
    pub binary_source: BinarySource,
    /// Local checkout to build from; only set for local builds.
    pub source_dir: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// Fetches the test case and resolves how to build and run it.
pub async fn plan_reproduction<T: Transport>(
    fetcher: &mut TestcaseFetcher<T>,
    resolver: &JobDefinitionResolver,
    testcase_id: &str,
    mode: BuildMode,
) -> Result<ReproductionPlan> {
    let (testcase, identity) = fetcher.fetch_by_identity(testcase_id).await?;

    info!(
        "Fetched testcase {} (identity: {}, job type: {}, platform: {}, reproducible: {})",
        testcase.id,
        identity,
        testcase.job_type,
        testcase.platform.as_deref().unwrap_or("unknown"),
        testcase.reproducible
    );

    if testcase.job_type.is_empty() {
        return Err(ClusterfuzzError::MissingJobType {
            testcase_id: testcase_id.to_string(),
        });
    }

    let definition = resolver
        .resolve(&testcase.job_type, testcase_id, mode)?
        .clone();
    let binary_source = binary_source(mode, &definition);

    let source_dir = match binary_source {
        BinarySource::Downloaded(_) => None,
        BinarySource::LocalBuild(_) => {
            let dir = std::env::var_os(&definition.source_var).map(PathBuf::from);
            if dir.is_none() {
                warn!(
                    "{} is not set; point it at your checkout to build {} locally",
                    definition.source_var, definition.binary
                );
            }
            dir
        }
    };

    let warnings = unreproducible_warnings(&testcase);
    for warning in &warnings {
        warn!("{warning}");
    }

    Ok(ReproductionPlan {
        testcase,
        identity,
        build_mode: mode,
        definition,
        binary_source,
        source_dir,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use url::Url;

    use super::*;
    use crate::auth::Credential;
    use crate::client::{AuthenticatedClient, RetryPolicy, IDENTITY_HEADER};
    use crate::error::{FetchError, JobError};
    use crate::jobs::{build_catalog, Category, JobCatalogConfig};
    use crate::test_support::{outcome, MemoryCredentialStore, ScriptedTransport, ScriptedVerifier};

    fn fetcher(transport: &Arc<ScriptedTransport>) -> TestcaseFetcher<Arc<ScriptedTransport>> {
        let client = AuthenticatedClient::new(
            transport.clone(),
            MemoryCredentialStore::with(Credential::bearer("12345")),
            Arc::new(ScriptedVerifier::new("unused")),
            RetryPolicy {
                attempts: 3,
                delay: Duration::ZERO,
            },
        )
        .unwrap();
        TestcaseFetcher::new(
            client,
            Url::parse("https://clusterfuzz.example/v2/testcase-detail/refresh").unwrap(),
        )
    }

    fn resolver() -> JobDefinitionResolver {
        JobDefinitionResolver::new(build_catalog(&JobCatalogConfig::bundled().unwrap()).unwrap())
    }

    fn testcase_body(job_type: &str, one_time_crasher: bool) -> String {
        serde_json::json!({
            "id": "1234",
            "crash_type": "Heap-buffer-overflow",
            "crash_state": ["Halted"],
            "testcase": {
                "job_type": job_type,
                "platform": "linux",
                "one_time_crasher_flag": one_time_crasher,
                "gestures": ["gestures"]
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_plan_with_download() {
        let transport = ScriptedTransport::new(vec![outcome(
            200,
            &testcase_body("linux_asan_d8", false),
            &[(IDENTITY_HEADER, "identity@something")],
        )]);

        let plan = plan_reproduction(&mut fetcher(&transport), &resolver(), "1234", BuildMode::Download)
            .await
            .unwrap();

        assert_eq!(plan.identity, "identity@something");
        assert_eq!(plan.testcase.job_type, "linux_asan_d8");
        assert_eq!(plan.definition.category, Category::Standalone);
        assert_eq!(plan.definition.binary, "d8");
        assert!(matches!(plan.binary_source, BinarySource::Downloaded(_)));
        assert!(plan.source_dir.is_none());
        assert!(plan.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_plan_standalone_builds_locally() {
        let transport = ScriptedTransport::new(vec![outcome(
            200,
            &testcase_body("linux_asan_d8", true),
            &[(IDENTITY_HEADER, "identity@something")],
        )]);

        let plan = plan_reproduction(&mut fetcher(&transport), &resolver(), "1234", BuildMode::Standalone)
            .await
            .unwrap();

        assert!(matches!(plan.binary_source, BinarySource::LocalBuild(_)));
        assert_eq!(plan.warnings.len(), 2);

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["build_mode"], "standalone");
        assert_eq!(json["binary_source"]["kind"], "local_build");
        assert_eq!(json["definition"]["sanitizer"], "ASAN");
    }

    #[tokio::test]
    async fn test_plan_with_unsupported_job_type() {
        let transport = ScriptedTransport::new(vec![outcome(
            200,
            &testcase_body("linux_asan_d8", false),
            &[],
        )]);

        let err = plan_reproduction(&mut fetcher(&transport), &resolver(), "1234", BuildMode::Chromium)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClusterfuzzError::Job(JobError::JobTypeNotSupported { .. })
        ));
    }

    #[tokio::test]
    async fn test_plan_with_invalid_testcase() {
        let transport = ScriptedTransport::new(vec![outcome(404, "", &[])]);

        let err = plan_reproduction(&mut fetcher(&transport), &resolver(), "999", BuildMode::Download)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClusterfuzzError::Fetch(FetchError::InvalidTestcaseId { .. })
        ));
        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn test_plan_without_job_type() {
        let transport = ScriptedTransport::new(vec![outcome(
            200,
            r#"{"id": "1234", "crash_type": "x", "crash_state": []}"#,
            &[],
        )]);

        let err = plan_reproduction(&mut fetcher(&transport), &resolver(), "1234", BuildMode::Download)
            .await
            .unwrap_err();

        assert!(matches!(err, ClusterfuzzError::MissingJobType { .. }));
        assert!(err.to_string().contains("job type"));
    }
}
