use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// Coarse grouping of job types by the source tree they build from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Chromium,
    Standalone,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Standalone => "standalone",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy used to produce the binary for a job type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Builder {
    Chromium,
    #[serde(rename = "Chromium_32")]
    Chromium32,
    #[serde(rename = "CfiChromium")]
    ChromiumCfi,
    #[serde(rename = "MsanChromium")]
    ChromiumMsan,
    LibfuzzerAndAfl,
    LibfuzzerMsan,
    Pdfium,
    V8,
    #[serde(rename = "V8_32")]
    V8Ia32,
    #[serde(rename = "MsanV8")]
    V8Msan,
}

impl fmt::Display for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Chromium => "Chromium",
            Self::Chromium32 => "Chromium_32",
            Self::ChromiumCfi => "CfiChromium",
            Self::ChromiumMsan => "MsanChromium",
            Self::LibfuzzerAndAfl => "LibfuzzerAndAfl",
            Self::LibfuzzerMsan => "LibfuzzerMsan",
            Self::Pdfium => "Pdfium",
            Self::V8 => "V8",
            Self::V8Ia32 => "V8_32",
            Self::V8Msan => "MsanV8",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sanitizer {
    Asan,
    Msan,
    Ubsan,
    Tsan,
    Cfi,
    Lsan,
}

impl fmt::Display for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Asan => "ASAN",
            Self::Msan => "MSAN",
            Self::Ubsan => "UBSAN",
            Self::Tsan => "TSAN",
            Self::Cfi => "CFI",
            Self::Lsan => "LSAN",
        };
        f.write_str(name)
    }
}

/// How the built binary is run against the test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReproducerKind {
    Base,
    LinuxChromeJob,
    LibfuzzerJob,
}

impl fmt::Display for ReproducerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Everything needed to build and run one job type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildDefinition {
    pub job_type: String,
    pub category: Category,
    pub builder: Builder,
    pub binary: String,
    pub sanitizer: Sanitizer,
    /// Environment variable naming the local source checkout.
    pub source_var: String,
    pub reproducer: ReproducerKind,
    /// Build target, when it differs from the binary name.
    pub target: Option<String>,
    pub require_user_data_dir: bool,
}

/// One catalog entry as written in the configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDefinition {
    builder: Option<Builder>,
    binary: Option<String>,
    sanitizer: Option<Sanitizer>,
    source: Option<String>,
    reproducer: Option<ReproducerKind>,
    target: Option<String>,
    #[serde(default)]
    require_user_data_dir: bool,
}

/// Builds one definition from its raw configuration entry.
///
/// Any problem with the entry, including a missing key, is reported as
/// [`JobError::BadJobTypeDefinition`] naming the job type.
pub fn build_definition(
    job_type: &str,
    category: Category,
    entry: serde_yaml::Value,
) -> Result<BuildDefinition, JobError> {
    let bad = |reason: String| JobError::BadJobTypeDefinition {
        job_type: job_type.to_string(),
        reason,
    };

    let raw: RawDefinition = serde_yaml::from_value(entry).map_err(|e| bad(e.to_string()))?;

    fn require<T>(value: Option<T>, key: &str) -> Result<T, String> {
        value.ok_or_else(|| format!("missing required key '{key}'"))
    }

    Ok(BuildDefinition {
        job_type: job_type.to_string(),
        category,
        builder: require(raw.builder, "builder").map_err(bad)?,
        binary: require(raw.binary, "binary").map_err(bad)?,
        sanitizer: require(raw.sanitizer, "sanitizer").map_err(bad)?,
        source_var: require(raw.source, "source").map_err(bad)?,
        reproducer: require(raw.reproducer, "reproducer").map_err(bad)?,
        target: raw.target,
        require_user_data_dir: raw.require_user_data_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(yaml: &str) -> serde_yaml::Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_build_definition() {
        let definition = build_definition(
            "linux_asan_d8",
            Category::Standalone,
            entry("builder: V8\nbinary: d8\nsanitizer: ASAN\nsource: V8_SRC\nreproducer: Base\n"),
        )
        .unwrap();

        assert_eq!(definition.job_type, "linux_asan_d8");
        assert_eq!(definition.category, Category::Standalone);
        assert_eq!(definition.builder, Builder::V8);
        assert_eq!(definition.binary, "d8");
        assert_eq!(definition.sanitizer, Sanitizer::Asan);
        assert_eq!(definition.source_var, "V8_SRC");
        assert_eq!(definition.reproducer, ReproducerKind::Base);
        assert_eq!(definition.target, None);
        assert!(!definition.require_user_data_dir);
    }

    #[test]
    fn test_renamed_builders() {
        let definition = build_definition(
            "linux_msan_chrome",
            Category::Chromium,
            entry(
                "builder: MsanChromium\nbinary: chrome\nsanitizer: MSAN\n\
                 source: CHROMIUM_SRC\nreproducer: LinuxChromeJob\nrequire_user_data_dir: true\n",
            ),
        )
        .unwrap();

        assert_eq!(definition.builder, Builder::ChromiumMsan);
        assert_eq!(definition.builder.to_string(), "MsanChromium");
        assert!(definition.require_user_data_dir);
    }

    #[test]
    fn test_missing_key_is_bad_definition() {
        let err = build_definition(
            "linux_asan_d8",
            Category::Standalone,
            entry("builder: V8\nsanitizer: ASAN\nsource: V8_SRC\nreproducer: Base\n"),
        )
        .unwrap_err();

        match err {
            JobError::BadJobTypeDefinition { job_type, reason } => {
                assert_eq!(job_type, "linux_asan_d8");
                assert!(reason.contains("binary"));
            }
            other => panic!("expected BadJobTypeDefinition, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_values_are_bad_definitions() {
        let err = build_definition(
            "linux_asan_d8",
            Category::Standalone,
            entry("builder: Gcc\nbinary: d8\nsanitizer: ASAN\nsource: V8_SRC\nreproducer: Base\n"),
        )
        .unwrap_err();
        assert!(matches!(err, JobError::BadJobTypeDefinition { .. }));

        let err = build_definition("linux_asan_d8", Category::Standalone, entry("[1, 2]"))
            .unwrap_err();
        assert!(matches!(err, JobError::BadJobTypeDefinition { .. }));
    }
}
