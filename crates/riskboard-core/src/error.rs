//! Error taxonomy shared by snapshot validation and the data-shaping layer.

use thiserror::Error;

/// Category of a single snapshot validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValidationIssueKind {
    InvalidInput,
    InconsistentRecord,
}

impl ValidationIssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::InconsistentRecord => "inconsistent_record",
        }
    }
}

/// One problem found while validating a snapshot, addressed by field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub kind: ValidationIssueKind,
    pub path: String,
    pub message: String,
}

/// Every issue found while validating one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "snapshot validation failed with {count} issue(s): {summary}",
    count = .issues.len(),
    summary = render_validation_issues(.issues)
)]
pub struct SnapshotValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl SnapshotValidationError {
    /// A rejection carrying one `InvalidInput` issue.
    pub fn invalid_input(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![ValidationIssue {
                kind: ValidationIssueKind::InvalidInput,
                path: path.into(),
                message: message.into(),
            }],
        }
    }

    pub fn has_kind(&self, kind: ValidationIssueKind) -> bool {
        self.issues.iter().any(|issue| issue.kind == kind)
    }

    pub fn issue_for_path(&self, path: &str) -> Option<&ValidationIssue> {
        self.issues.iter().find(|issue| issue.path == path)
    }
}

fn render_validation_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("[{}] {}: {}", issue.kind.as_str(), issue.path, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by the dashboard core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("inconsistent record at {path}: {message}")]
    InconsistentRecord { path: String, message: String },
    #[error(transparent)]
    Snapshot(#[from] SnapshotValidationError),
}

impl DashboardError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        match self {
            Self::InvalidInput { .. } => true,
            Self::InconsistentRecord { .. } => false,
            Self::Snapshot(error) => error.has_kind(ValidationIssueKind::InvalidInput),
        }
    }

    pub fn is_inconsistent_record(&self) -> bool {
        match self {
            Self::InvalidInput { .. } => false,
            Self::InconsistentRecord { .. } => true,
            Self::Snapshot(error) => error.has_kind(ValidationIssueKind::InconsistentRecord),
        }
    }
}

/// Accumulates validation issues so a snapshot reports all of them at once.
#[derive(Debug, Default)]
pub(crate) struct IssueCollector {
    issues: Vec<ValidationIssue>,
}

impl IssueCollector {
    pub(crate) fn invalid(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            kind: ValidationIssueKind::InvalidInput,
            path: path.into(),
            message: message.into(),
        });
    }

    pub(crate) fn inconsistent(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            kind: ValidationIssueKind::InconsistentRecord,
            path: path.into(),
            message: message.into(),
        });
    }

    pub(crate) fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub(crate) fn finish(self) -> Result<(), SnapshotValidationError> {
        if self.issues.is_empty() {
            return Ok(());
        }
        Err(SnapshotValidationError {
            issues: self.issues,
        })
    }

    /// Collapses the collected issues into a single error for direct constructors.
    pub(crate) fn into_dashboard_error(mut self) -> Result<(), DashboardError> {
        if self.issues.len() > 1 {
            return Err(DashboardError::Snapshot(SnapshotValidationError {
                issues: self.issues,
            }));
        }
        let Some(issue) = self.issues.pop() else {
            return Ok(());
        };
        Err(match issue.kind {
            ValidationIssueKind::InvalidInput => DashboardError::InvalidInput {
                message: format!("{}: {}", issue.path, issue.message),
            },
            ValidationIssueKind::InconsistentRecord => DashboardError::InconsistentRecord {
                path: issue.path,
                message: issue.message,
            },
        })
    }
}
