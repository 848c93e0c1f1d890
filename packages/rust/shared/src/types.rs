//! Core domain types for prospect briefs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Catalog records
// ---------------------------------------------------------------------------

/// One row of the account roster. Extra CSV columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Display name; the roster's identity key.
    pub company_name: String,
}

/// A past campaign usable as proof for a prospect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStudyRecord {
    pub client_name: String,
    pub industry: String,
    pub target_audience: String,
    pub key_metrics: String,
}

// ---------------------------------------------------------------------------
// RunResult
// ---------------------------------------------------------------------------

/// Outcome of one company's pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Failed(String),
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failed(reason) => f.write_str(reason),
        }
    }
}

/// Per-company record produced by the batch runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub company_name: String,
    /// Reported artifact path; `None` when the run failed.
    pub output_path: Option<PathBuf>,
    pub status: RunStatus,
}

impl RunResult {
    pub fn success(company_name: impl Into<String>, output_path: PathBuf) -> Self {
        Self {
            company_name: company_name.into(),
            output_path: Some(output_path),
            status: RunStatus::Success,
        }
    }

    pub fn failed(company_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            output_path: None,
            status: RunStatus::Failed(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Success)
    }
}
