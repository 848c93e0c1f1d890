//! Brief artifact rendering.
//!
//! Every brief is written as a Markdown document first. A formatted PDF is
//! then attempted from the same text; if that renderer is unavailable or
//! fails, the failure is logged and the Markdown artifact stands on its own.

mod layout;
mod lines;
#[cfg(feature = "pdf")]
mod pdf;

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use prospectbrief_shared::{BriefError, Result};

pub use layout::{Page, SUBTITLE, TextRun, layout_brief, wrap};
pub use lines::{BriefLine, classify_line, parse_brief, sanitize, strip_bold};

// ---------------------------------------------------------------------------
// File naming
// ---------------------------------------------------------------------------

/// Derive the file stem for a company: spaces and `/` become `_`, commas
/// are dropped. Distinct names may collide; the later write wins.
pub fn artifact_stem(company_name: &str) -> String {
    let safe: String = company_name
        .chars()
        .filter(|c| *c != ',')
        .map(|c| if c == ' ' || c == '/' { '_' } else { c })
        .collect();
    format!("{safe}_brief")
}

// ---------------------------------------------------------------------------
// Renderer capability
// ---------------------------------------------------------------------------

/// Something that turns a finished brief into a file.
pub trait ArtifactRenderer: Send + Sync {
    /// Short label for logs and progress output.
    fn name(&self) -> &'static str;

    /// Whether the renderer can run in this build/environment.
    fn is_available(&self) -> bool {
        true
    }

    /// Write the artifact into `output_dir` and return its path.
    fn render(&self, company_name: &str, brief: &str, output_dir: &Path) -> Result<PathBuf>;
}

/// Markdown document: title heading, blank line, brief text verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl PlainTextRenderer {
    pub fn document(company_name: &str, brief: &str) -> String {
        format!("# {company_name} - {SUBTITLE}\n\n{brief}")
    }
}

impl ArtifactRenderer for PlainTextRenderer {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn render(&self, company_name: &str, brief: &str, output_dir: &Path) -> Result<PathBuf> {
        let path = output_dir.join(format!("{}.md", artifact_stem(company_name)));
        std::fs::write(&path, Self::document(company_name, brief))
            .map_err(|e| BriefError::io(&path, e))?;
        Ok(path)
    }
}

/// Paginated PDF document. Available only when built with the `pdf` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

impl ArtifactRenderer for PdfRenderer {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "pdf")
    }

    #[cfg(feature = "pdf")]
    fn render(&self, company_name: &str, brief: &str, output_dir: &Path) -> Result<PathBuf> {
        let path = output_dir.join(format!("{}.pdf", artifact_stem(company_name)));
        let pages = layout_brief(company_name, brief);
        tracing::debug!(pages = pages.len(), "brief laid out");
        pdf::write_pdf(company_name, &pages, &path)?;
        Ok(path)
    }

    #[cfg(not(feature = "pdf"))]
    fn render(&self, _company_name: &str, _brief: &str, _output_dir: &Path) -> Result<PathBuf> {
        Err(BriefError::Rendering(
            "PDF support not built (enable the `pdf` feature)".into(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Output renderer
// ---------------------------------------------------------------------------

/// Paths produced for one brief.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Markdown artifact; always present.
    pub primary: PathBuf,
    /// Formatted artifact, when it was produced.
    pub secondary: Option<PathBuf>,
    /// Why the formatted artifact is missing, if one was attempted or configured.
    pub degraded: Option<String>,
}

impl RenderOutcome {
    /// The path reported for the run: the formatted artifact when written,
    /// otherwise the Markdown one.
    pub fn output_path(&self) -> &Path {
        self.secondary.as_deref().unwrap_or(&self.primary)
    }
}

/// Writes the primary artifact and makes a best-effort secondary attempt.
pub struct BriefRenderer {
    output_dir: PathBuf,
    primary: PlainTextRenderer,
    secondary: Option<Box<dyn ArtifactRenderer>>,
}

impl BriefRenderer {
    /// Markdown-only renderer writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            primary: PlainTextRenderer,
            secondary: None,
        }
    }

    pub fn with_secondary(mut self, renderer: Box<dyn ArtifactRenderer>) -> Self {
        self.secondary = Some(renderer);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory. Safe to call repeatedly.
    pub fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| BriefError::io(&self.output_dir, e))
    }

    /// Render a brief. Only a primary failure is an error.
    #[instrument(skip(self, brief), fields(brief_len = brief.len()))]
    pub fn render(&self, company_name: &str, brief: &str) -> Result<RenderOutcome> {
        let primary = self.primary.render(company_name, brief, &self.output_dir)?;
        info!(path = %primary.display(), "brief saved");

        let mut outcome = RenderOutcome {
            primary,
            secondary: None,
            degraded: None,
        };

        let Some(renderer) = &self.secondary else {
            return Ok(outcome);
        };

        if !renderer.is_available() {
            let reason = format!("{} renderer unavailable", renderer.name());
            info!(renderer = renderer.name(), "secondary artifact skipped");
            outcome.degraded = Some(reason);
            return Ok(outcome);
        }

        match renderer.render(company_name, brief, &self.output_dir) {
            Ok(path) => {
                info!(renderer = renderer.name(), path = %path.display(), "secondary artifact saved");
                outcome.secondary = Some(path);
            }
            Err(e) => {
                warn!(renderer = renderer.name(), error = %e, "secondary artifact failed");
                outcome.degraded = Some(format!("{} generation failed: {e}", renderer.name()));
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unavailable;

    impl ArtifactRenderer for Unavailable {
        fn name(&self) -> &'static str {
            "stub"
        }
        fn is_available(&self) -> bool {
            false
        }
        fn render(&self, _: &str, _: &str, _: &Path) -> Result<PathBuf> {
            panic!("unavailable renderer must not be invoked")
        }
    }

    struct Failing;

    impl ArtifactRenderer for Failing {
        fn name(&self) -> &'static str {
            "stub"
        }
        fn render(&self, _: &str, _: &str, _: &Path) -> Result<PathBuf> {
            Err(BriefError::Rendering("font table corrupt".into()))
        }
    }

    #[test]
    fn stem_sanitizes_separators() {
        assert_eq!(artifact_stem("Acme, Inc/Labs"), "Acme_Inc_Labs_brief");
        assert_eq!(artifact_stem("Acme Corp"), "Acme_Corp_brief");
        assert_eq!(artifact_stem("Globex"), "Globex_brief");
    }

    #[test]
    fn plain_document_has_heading_then_brief() {
        assert_eq!(
            PlainTextRenderer::document("Acme Corp", "## Opportunity\nBody"),
            "# Acme Corp - TLDR Prospect Brief\n\n## Opportunity\nBody"
        );
    }

    #[test]
    fn primary_only_reports_markdown_path() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = BriefRenderer::new(dir.path());
        let outcome = renderer.render("Acme Corp", "brief body").unwrap();

        assert_eq!(outcome.primary, dir.path().join("Acme_Corp_brief.md"));
        assert_eq!(outcome.output_path(), outcome.primary.as_path());
        assert!(outcome.degraded.is_none());
        let written = std::fs::read_to_string(&outcome.primary).unwrap();
        assert_eq!(written, "# Acme Corp - TLDR Prospect Brief\n\nbrief body");
    }

    #[test]
    fn unavailable_secondary_degrades_silently() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = BriefRenderer::new(dir.path()).with_secondary(Box::new(Unavailable));
        let outcome = renderer.render("Acme", "brief").unwrap();

        assert!(outcome.primary.exists());
        assert!(outcome.secondary.is_none());
        assert_eq!(outcome.output_path(), outcome.primary.as_path());
        assert!(outcome.degraded.unwrap().contains("unavailable"));
    }

    #[test]
    fn failing_secondary_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = BriefRenderer::new(dir.path()).with_secondary(Box::new(Failing));
        let outcome = renderer.render("Acme", "brief").unwrap();

        assert!(outcome.primary.exists());
        assert_eq!(outcome.output_path(), outcome.primary.as_path());
        assert!(outcome.degraded.unwrap().contains("font table corrupt"));
    }

    #[test]
    fn primary_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = BriefRenderer::new(dir.path().join("missing"));
        let err = renderer.render("Acme", "brief").unwrap_err();
        assert!(matches!(err, BriefError::Io { .. }));
    }

    #[test]
    fn prepare_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = BriefRenderer::new(dir.path().join("output"));
        renderer.prepare().unwrap();
        renderer.prepare().unwrap();
        assert!(renderer.output_dir().is_dir());
    }

    #[test]
    fn same_stem_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = BriefRenderer::new(dir.path());
        let first = renderer.render("Acme Inc", "first").unwrap();
        let second = renderer.render("Acme, Inc", "second").unwrap();

        assert_eq!(first.primary, second.primary);
        let written = std::fs::read_to_string(&second.primary).unwrap();
        assert!(written.ends_with("second"));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_secondary_is_reported_path() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = BriefRenderer::new(dir.path()).with_secondary(Box::new(PdfRenderer));
        let brief = "**Company:** Acme | **Priority:** High\n\n## Opportunity\n- “Quoted” — proof 🚀";
        let outcome = renderer.render("Acme, Inc/Labs", brief).unwrap();

        let pdf = outcome.secondary.clone().expect("pdf written");
        assert_eq!(pdf, dir.path().join("Acme_Inc_Labs_brief.pdf"));
        assert_eq!(outcome.output_path(), pdf.as_path());
        let bytes = std::fs::read(&pdf).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(outcome.primary.exists());
    }
}
