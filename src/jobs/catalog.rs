use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use crate::error::JobError;

use super::definition::{build_definition, BuildDefinition, Category};

const BUNDLED_JOB_TYPES: &str = include_str!("supported_job_types.yml");

/// Raw catalog configuration: category to job type to entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobCatalogConfig {
    #[serde(default)]
    pub chromium: IndexMap<String, serde_yaml::Value>,
    #[serde(default)]
    pub standalone: IndexMap<String, serde_yaml::Value>,
}

impl JobCatalogConfig {
    pub fn from_yaml(contents: &str) -> Result<Self, JobError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// The job types shipped with the tool.
    pub fn bundled() -> Result<Self, JobError> {
        Self::from_yaml(BUNDLED_JOB_TYPES)
    }
}

/// Read-only lookup of build definitions per category.
#[derive(Debug, Clone, Default)]
pub struct JobCatalog {
    chromium: IndexMap<String, BuildDefinition>,
    standalone: IndexMap<String, BuildDefinition>,
}

impl JobCatalog {
    pub fn get(&self, category: Category, job_type: &str) -> Option<&BuildDefinition> {
        self.category(category).get(job_type)
    }

    pub fn category(&self, category: Category) -> &IndexMap<String, BuildDefinition> {
        match category {
            Category::Chromium => &self.chromium,
            Category::Standalone => &self.standalone,
        }
    }

    /// All definitions, chromium first, in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &BuildDefinition> {
        self.chromium.values().chain(self.standalone.values())
    }

    pub fn len(&self) -> usize {
        self.chromium.len() + self.standalone.len()
    }
}

/// Builds the catalog, failing on the first malformed entry.
pub fn build_catalog(config: &JobCatalogConfig) -> Result<JobCatalog, JobError> {
    let build = |category: Category, entries: &IndexMap<String, serde_yaml::Value>| {
        entries
            .iter()
            .map(|(job_type, entry)| {
                build_definition(job_type, category, entry.clone())
                    .map(|definition| (job_type.clone(), definition))
            })
            .collect::<Result<IndexMap<_, _>, _>>()
    };

    let catalog = JobCatalog {
        chromium: build(Category::Chromium, &config.chromium)?,
        standalone: build(Category::Standalone, &config.standalone)?,
    };

    debug!(
        "Built job catalog with {} chromium and {} standalone job types",
        catalog.chromium.len(),
        catalog.standalone.len()
    );
    Ok(catalog)
}
