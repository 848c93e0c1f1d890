//! Single-company pipeline: research → match → synthesize → render.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use prospectbrief_catalog::CaseSource;
use prospectbrief_generation::GenerationService;
use prospectbrief_render::{BriefRenderer, RenderOutcome};
use prospectbrief_shared::{BriefError, Result};

use crate::batch::BatchSummary;
use crate::rate_limit::RateLimiter;
use crate::stages;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Where a company's run currently is. States advance strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Researching,
    Matching,
    Synthesizing,
    Rendering,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Researching => "researching",
            Self::Matching => "matching",
            Self::Synthesizing => "synthesizing",
            Self::Rendering => "rendering",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

/// Per-company working state. Each text is recorded once, in stage order,
/// and the context is dropped when the run ends.
#[derive(Debug)]
pub struct PipelineContext {
    company_name: String,
    state: PipelineState,
    research_text: String,
    case_match_text: String,
    brief_text: String,
}

impl PipelineContext {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            state: PipelineState::Researching,
            research_text: String::new(),
            case_match_text: String::new(),
            brief_text: String::new(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn research_text(&self) -> &str {
        &self.research_text
    }

    pub fn case_match_text(&self) -> &str {
        &self.case_match_text
    }

    pub fn brief_text(&self) -> &str {
        &self.brief_text
    }

    fn advance(&mut self, expected: PipelineState, next: PipelineState) -> Result<()> {
        if self.state != expected {
            return Err(BriefError::validation(format!(
                "{}: cannot move to {next} while {}",
                self.company_name, self.state
            )));
        }
        self.state = next;
        Ok(())
    }

    pub fn record_research(&mut self, text: String) -> Result<()> {
        self.advance(PipelineState::Researching, PipelineState::Matching)?;
        self.research_text = text;
        Ok(())
    }

    pub fn record_case_matches(&mut self, text: String) -> Result<()> {
        self.advance(PipelineState::Matching, PipelineState::Synthesizing)?;
        self.case_match_text = text;
        Ok(())
    }

    pub fn record_brief(&mut self, text: String) -> Result<()> {
        self.advance(PipelineState::Synthesizing, PipelineState::Rendering)?;
        self.brief_text = text;
        Ok(())
    }

    pub fn finish(&mut self) -> Result<()> {
        self.advance(PipelineState::Rendering, PipelineState::Done)
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called before the first stage of a company.
    fn company_started(&self, company_name: &str);
    /// Called when entering a state.
    fn stage(&self, company_name: &str, state: PipelineState);
    /// Called before each rate-limit pause.
    fn pause(&self, delay: Duration);
    /// Called once the artifacts are written.
    fn artifact(&self, outcome: &RenderOutcome);
    /// Called by the batch runner when a company's run fails.
    fn company_failed(&self, company_name: &str, error: &BriefError);
    /// Called before a batch starts.
    fn batch_started(&self, total: usize);
    /// Called after every company in a batch has been attempted.
    fn batch_done(&self, summary: &BatchSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn company_started(&self, _company_name: &str) {}
    fn stage(&self, _company_name: &str, _state: PipelineState) {}
    fn pause(&self, _delay: Duration) {}
    fn artifact(&self, _outcome: &RenderOutcome) {}
    fn company_failed(&self, _company_name: &str, _error: &BriefError) {}
    fn batch_started(&self, _total: usize) {}
    fn batch_done(&self, _summary: &BatchSummary) {}
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Runs the three stages and rendering for one company at a time.
///
/// Stage errors are returned untouched. Nothing is written unless all three
/// stages succeed.
pub struct BriefPipeline<G, L> {
    service: G,
    limiter: L,
    cases: Box<dyn CaseSource>,
    renderer: BriefRenderer,
}

impl<G: GenerationService, L: RateLimiter> BriefPipeline<G, L> {
    pub fn new(service: G, limiter: L, cases: Box<dyn CaseSource>, renderer: BriefRenderer) -> Self {
        Self {
            service,
            limiter,
            cases,
            renderer,
        }
    }

    /// Create the output directory. Call once before the first run.
    pub fn prepare(&self) -> Result<()> {
        self.renderer.prepare()
    }

    async fn pause(&self, progress: &dyn ProgressReporter) {
        progress.pause(self.limiter.delay());
        self.limiter.pause().await;
    }

    /// Produce a brief for one company and write its artifacts.
    #[instrument(skip_all, fields(company = %company_name))]
    pub async fn run(
        &self,
        company_name: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<RenderOutcome> {
        let start = Instant::now();
        let mut ctx = PipelineContext::new(company_name);
        progress.company_started(company_name);

        progress.stage(company_name, ctx.state());
        let research = stages::research(&self.service, company_name).await?;
        ctx.record_research(research)?;
        self.pause(progress).await;

        progress.stage(company_name, ctx.state());
        let cases = self.cases.load_cases()?;
        let matches =
            stages::match_cases(&self.service, company_name, ctx.research_text(), &cases).await?;
        ctx.record_case_matches(matches)?;
        self.pause(progress).await;

        progress.stage(company_name, ctx.state());
        let brief = stages::synthesize_brief(
            &self.service,
            company_name,
            ctx.research_text(),
            ctx.case_match_text(),
        )
        .await?;
        ctx.record_brief(brief)?;
        self.pause(progress).await;

        progress.stage(company_name, ctx.state());
        if ctx.brief_text().trim().is_empty() {
            return Err(BriefError::contract("render", "brief text is empty"));
        }
        let outcome = self.renderer.render(company_name, ctx.brief_text())?;
        ctx.finish()?;
        progress.artifact(&outcome);

        info!(
            path = %outcome.output_path().display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "pipeline complete"
        );
        Ok(outcome)
    }
}
