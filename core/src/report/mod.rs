//! Newman report files: locations, summary parsing and artifact encoding.

mod artifacts;
mod paths;
mod summary;

pub use artifacts::{
    collect_artifacts, CollectedArtifacts, HTML_ARTIFACT_LABEL,
    SUMMARY_ARTIFACT_LABEL,
};
pub use paths::ReportPaths;
pub use summary::{read_summary, Failure, FailureError, ResultSummary, RunSection, Stat, Stats};
