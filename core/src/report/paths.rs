use std::path::{Path, PathBuf};

/// Per-run report locations, namespaced by the run token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub summary: PathBuf,
    pub html: PathBuf,
}

impl ReportPaths {
    pub fn new(dir: &Path, token: &str) -> Self {
        Self {
            summary: dir.join(format!("newman-result-summary_{token}.json")),
            html: dir.join(format!("newman-result_{token}.html")),
        }
    }
}
