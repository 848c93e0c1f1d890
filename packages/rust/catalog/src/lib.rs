//! CSV-backed account roster and case study catalog.
//!
//! The roster supplies the ordered list of companies a batch runs over; the
//! case catalog supplies matching input for the case-match stage and is
//! re-read every time it is requested.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use prospectbrief_shared::{AccountRecord, BriefError, CaseStudyRecord, Result};

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Load the account roster, keeping the first row for each company name.
///
/// Names are compared as literal strings; differently cased or padded
/// names are treated as distinct companies.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_roster(path: &Path) -> Result<Vec<AccountRecord>> {
    let rows: Vec<AccountRecord> = read_csv(path)?;
    let total = rows.len();

    let mut seen = HashSet::new();
    let accounts: Vec<AccountRecord> = rows
        .into_iter()
        .filter(|row| seen.insert(row.company_name.clone()))
        .collect();

    debug!(rows = total, unique = accounts.len(), "roster loaded");
    Ok(accounts)
}

// ---------------------------------------------------------------------------
// Case catalog
// ---------------------------------------------------------------------------

/// Source of case study records for the case-match stage.
pub trait CaseSource: Send + Sync {
    /// Load the full catalog. Called once per case-match invocation.
    fn load_cases(&self) -> Result<Vec<CaseStudyRecord>>;
}

/// Case catalog read from a CSV file on every call.
#[derive(Debug, Clone)]
pub struct CsvCaseCatalog {
    path: PathBuf,
}

impl CsvCaseCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CaseSource for CsvCaseCatalog {
    fn load_cases(&self) -> Result<Vec<CaseStudyRecord>> {
        let cases: Vec<CaseStudyRecord> = read_csv(&self.path)?;
        debug!(path = %self.path.display(), cases = cases.len(), "case catalog loaded");
        Ok(cases)
    }
}

/// In-memory catalog.
impl CaseSource for Vec<CaseStudyRecord> {
    fn load_cases(&self) -> Result<Vec<CaseStudyRecord>> {
        Ok(self.clone())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| BriefError::Catalog(format!("failed to open {}: {e}", path.display())))?;

    reader
        .deserialize()
        .map(|row| {
            row.map_err(|e| BriefError::Catalog(format!("{}: {e}", path.display())))
        })
        .collect()
}
