use std::path::Path;

use serde::Deserialize;

use crate::error::ReportError;

/// Subset of newman's `json-summary` reporter output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultSummary {
    #[serde(rename = "Run", alias = "run", default)]
    pub run: RunSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunSection {
    #[serde(rename = "Stats", alias = "stats", default)]
    pub stats: Stats,

    #[serde(rename = "Failures", alias = "failures", default)]
    pub failures: Vec<Failure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Stats {
    #[serde(rename = "Requests", alias = "requests", default)]
    pub requests: Stat,

    #[serde(rename = "Assertions", alias = "assertions", default)]
    pub assertions: Stat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Stat {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub failed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Failure {
    #[serde(default)]
    pub error: Option<FailureError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FailureError {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub test: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ResultSummary {
    pub fn failed_assertions(&self) -> u64 {
        self.run.stats.assertions.failed
    }

    pub fn failed_requests(&self) -> u64 {
        self.run.stats.requests.failed
    }

    /// One line per reported failure, e.g. `Status code is 200: expected 500 to equal 200`.
    pub fn failure_messages(&self) -> Vec<String> {
        self.run
            .failures
            .iter()
            .filter_map(|f| f.error.as_ref())
            .filter_map(|e| {
                let msg = e.message.as_deref()?;
                Some(match e.test.as_deref() {
                    Some(test) if !test.is_empty() => format!("{test}: {msg}"),
                    _ => msg.to_string(),
                })
            })
            .collect()
    }
}

pub fn read_summary(path: &Path) -> Result<ResultSummary, ReportError> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReportError::Missing(path.to_path_buf()))
        }
        Err(source) => {
            return Err(ReportError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes).map_err(|source| ReportError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}
