use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::Serialize;

use crate::error::JobError;

use super::catalog::JobCatalog;
use super::definition::{BuildDefinition, Builder, Category};

/// Where the user wants the binary to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// No preference; behaves like `download` when resolving.
    #[default]
    #[value(skip)]
    Unspecified,
    /// Download the prebuilt binary ClusterFuzz used.
    Download,
    /// Build from a Chromium checkout.
    Chromium,
    /// Build from a standalone project checkout.
    Standalone,
}

impl BuildMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "",
            Self::Download => "download",
            Self::Chromium => "chromium",
            Self::Standalone => "standalone",
        }
    }

    /// Categories searched for a job type, in order.
    fn search_order(self) -> &'static [Category] {
        match self {
            Self::Unspecified | Self::Download => &[Category::Chromium, Category::Standalone],
            Self::Chromium => &[Category::Chromium],
            Self::Standalone => &[Category::Standalone],
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Self::Unspecified),
            "download" => Ok(Self::Download),
            "chromium" => Ok(Self::Chromium),
            "standalone" => Ok(Self::Standalone),
            other => Err(JobError::UnknownBuildMode(other.to_string())),
        }
    }
}

/// Whether the binary is fetched prebuilt or compiled locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "builder", rename_all = "snake_case")]
pub enum BinarySource {
    Downloaded(Builder),
    LocalBuild(Builder),
}

impl fmt::Display for BinarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downloaded(builder) => write!(f, "DownloadedBinary{builder}Builder"),
            Self::LocalBuild(builder) => write!(f, "{builder}Builder"),
        }
    }
}

/// Picks the binary source for a resolved definition.
pub fn binary_source(mode: BuildMode, definition: &BuildDefinition) -> BinarySource {
    match mode {
        BuildMode::Download => BinarySource::Downloaded(definition.builder),
        _ => BinarySource::LocalBuild(definition.builder),
    }
}

pub struct JobDefinitionResolver {
    catalog: JobCatalog,
}

impl JobDefinitionResolver {
    pub fn new(catalog: JobCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &JobCatalog {
        &self.catalog
    }

    /// Finds the definition for `job_type` within the categories `mode` allows.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::JobTypeNotSupported`] if no allowed category has it.
    pub fn resolve(
        &self,
        job_type: &str,
        testcase_id: &str,
        mode: BuildMode,
    ) -> Result<&BuildDefinition, JobError> {
        mode.search_order()
            .iter()
            .find_map(|&category| self.catalog.get(category, job_type))
            .inspect(|definition| {
                debug!(
                    "Resolved job type {job_type} to the {} definition",
                    definition.category
                )
            })
            .ok_or_else(|| JobError::JobTypeNotSupported {
                job_type: job_type.to_string(),
                testcase_id: testcase_id.to_string(),
                mode: mode.to_string(),
            })
    }
}
