use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::ReportPaths;
use crate::action::Artifact;
use crate::error::ReportError;

pub const SUMMARY_ARTIFACT_LABEL: &str = "$(experimentKey)_$(executionId)_postman.json";
pub const HTML_ARTIFACT_LABEL: &str = "$(experimentKey)_$(executionId)_postman.html";

/// Artifacts that could be read, plus errors for files that exist but could not be.
#[derive(Debug, Default)]
pub struct CollectedArtifacts {
    pub artifacts: Vec<Artifact>,
    pub errors: Vec<ReportError>,
}

pub fn collect_artifacts(paths: &ReportPaths) -> CollectedArtifacts {
    let mut out = CollectedArtifacts::default();
    for (path, label) in [
        (&paths.summary, SUMMARY_ARTIFACT_LABEL),
        (&paths.html, HTML_ARTIFACT_LABEL),
    ] {
        match encode_file(path) {
            Ok(Some(data)) => out.artifacts.push(Artifact {
                label: label.to_string(),
                data,
            }),
            Ok(None) => tracing::debug!(path = %path.display(), "report file not present"),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read report file");
                out.errors.push(e);
            }
        }
    }
    out
}

fn encode_file(path: &Path) -> Result<Option<String>, ReportError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(STANDARD.encode(bytes))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ReportError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
