use crate::action::{ExtensionError, Message};
use crate::error::ReportError;
use crate::process::ExitState;
use crate::report::ResultSummary;

/// Error for a non-zero newman exit, plus failure details from the summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub error: Option<ExtensionError>,
    pub messages: Vec<Message>,
}

pub fn failure_title(code: i32, summary: Option<&ResultSummary>) -> String {
    match summary {
        Some(s) if s.failed_assertions() > 0 => {
            format!("{} assertions failed", s.failed_assertions())
        }
        Some(s) if s.failed_requests() > 0 => format!("{} requests failed", s.failed_requests()),
        _ => format!("newman exited with code {code}"),
    }
}

/// `summary` is whatever reading the summary report produced; a missing or
/// broken report falls back to the generic exit-code title.
pub fn classify_exit(
    exit: ExitState,
    summary: Result<ResultSummary, ReportError>,
) -> Classification {
    if exit.success() {
        return Classification::default();
    }

    let summary = match summary {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::debug!(error = %e, "no usable summary report");
            None
        }
    };

    let title = failure_title(exit.code, summary.as_ref());
    let error = ExtensionError::new(title).with_detail(format!("exit code {}", exit.code));
    let messages = summary
        .map(|s| s.failure_messages().into_iter().map(Message::error).collect())
        .unwrap_or_default();

    Classification {
        error: Some(error),
        messages,
    }
}
