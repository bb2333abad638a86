use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const ENVIRONMENT_PREFIX: &str = "[Environment] ";
const COMMAND_PREFIX: &str = "Running command: ";

/// A crash test case as returned by the testcase-info endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Testcase {
    pub id: String,
    pub crash_type: String,
    pub crash_state: Vec<String>,
    pub job_type: String,
    pub platform: Option<String>,
    pub reproducible: bool,
    pub gestures: Vec<String>,
    pub build_url: Option<String>,
    pub revision: Option<u64>,
    pub reproduction_args: String,
    pub stacktrace_lines: Vec<String>,
    /// Variables recorded by `[Environment] NAME = value` stacktrace lines.
    pub environment: IndexMap<String, String>,
    /// The command line the crash was observed with, if logged.
    pub command_line: Option<String>,
}

impl Testcase {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<TestcaseResponse>(body).map(Self::from)
    }
}

/// Warnings to show before reproducing a test case that is known to be flaky.
pub fn unreproducible_warnings(testcase: &Testcase) -> Vec<String> {
    if testcase.reproducible {
        return Vec::new();
    }

    let mut warnings = vec![format!(
        "Testcase {} is marked unreproducible by ClusterFuzz; the crash may not reproduce locally.",
        testcase.id
    )];
    if !testcase.gestures.is_empty() {
        warnings.push(format!(
            "The crash relies on UI gestures ({}); reproduction may need an interactive display.",
            testcase.gestures.join(", ")
        ));
    }
    warnings
}

#[derive(Deserialize)]
struct TestcaseResponse {
    id: TestcaseId,
    crash_type: String,
    crash_state: Lines,
    #[serde(default)]
    crash_stacktrace: Stacktrace,
    #[serde(default)]
    testcase: TestcaseDetails,
    #[serde(default)]
    metadata: TestcaseMetadata,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TestcaseId {
    Text(String),
    Number(u64),
}

/// A value the server sends either as one newline-separated string or as a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lines {
    Text(String),
    List(Vec<String>),
}

impl Default for Lines {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Lines {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::Text(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
            Self::List(lines) => lines,
        }
    }
}

#[derive(Deserialize, Default)]
struct Stacktrace {
    #[serde(default)]
    lines: Vec<StacktraceLine>,
}

#[derive(Deserialize)]
struct StacktraceLine {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize, Default)]
struct TestcaseDetails {
    #[serde(default)]
    job_type: String,
    platform: Option<String>,
    #[serde(default)]
    one_time_crasher_flag: bool,
    #[serde(default)]
    gestures: Option<Lines>,
    crash_revision: Option<u64>,
    #[serde(default)]
    minimized_arguments: Option<String>,
}

#[derive(Deserialize, Default)]
struct TestcaseMetadata {
    build_url: Option<String>,
}

impl From<TestcaseResponse> for Testcase {
    fn from(response: TestcaseResponse) -> Self {
        let stacktrace_lines: Vec<String> = response
            .crash_stacktrace
            .lines
            .into_iter()
            .map(|line| line.content)
            .collect();

        let mut environment = IndexMap::new();
        let mut command_line = None;
        for line in &stacktrace_lines {
            if let Some(assignment) = line.strip_prefix(ENVIRONMENT_PREFIX) {
                if let Some((name, value)) = assignment.split_once('=') {
                    environment.insert(name.trim().to_string(), value.trim().to_string());
                }
            } else if let Some(command) = line.strip_prefix(COMMAND_PREFIX) {
                command_line = Some(command.trim().to_string());
            }
        }

        let details = response.testcase;
        Self {
            id: match response.id {
                TestcaseId::Text(id) => id,
                TestcaseId::Number(id) => id.to_string(),
            },
            crash_type: response.crash_type,
            crash_state: response.crash_state.into_vec(),
            job_type: details.job_type,
            platform: details.platform,
            reproducible: !details.one_time_crasher_flag,
            gestures: details.gestures.map(Lines::into_vec).unwrap_or_default(),
            build_url: response.metadata.build_url,
            revision: details.crash_revision,
            reproduction_args: details.minimized_arguments.unwrap_or_default(),
            stacktrace_lines,
            environment,
            command_line,
        }
    }
}
