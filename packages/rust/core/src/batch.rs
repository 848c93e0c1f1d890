//! Batch runner: the only place that sees more than one company.
//!
//! Each company's run is folded into a [`RunResult`] value. A failure is
//! recorded and the loop moves on, so the batch itself cannot fail.

use std::time::Instant;

use tracing::{info, instrument, warn};

use prospectbrief_generation::GenerationService;
use prospectbrief_shared::{AccountRecord, RunResult};

use crate::pipeline::{BriefPipeline, ProgressReporter};
use crate::rate_limit::RateLimiter;

/// Ordered results of a batch, one per attempted company.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub results: Vec<RunResult>,
}

impl BatchSummary {
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RunResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    /// `Processed: {succeeded}/{attempted} companies`
    pub fn rollup(&self) -> String {
        format!(
            "Processed: {}/{} companies",
            self.success_count(),
            self.total()
        )
    }
}

impl<G: GenerationService, L: RateLimiter> BriefPipeline<G, L> {
    /// Run one company and capture the outcome as a value.
    pub async fn run_one(&self, company_name: &str, progress: &dyn ProgressReporter) -> RunResult {
        match self.run(company_name, progress).await {
            Ok(outcome) => RunResult::success(company_name, outcome.output_path().to_path_buf()),
            Err(e) => {
                warn!(company = company_name, error = %e, "company failed");
                progress.company_failed(company_name, &e);
                RunResult::failed(company_name, e.to_string())
            }
        }
    }

    /// Run every company in roster order.
    #[instrument(skip_all, fields(companies = accounts.len()))]
    pub async fn run_all(
        &self,
        accounts: &[AccountRecord],
        progress: &dyn ProgressReporter,
    ) -> BatchSummary {
        let start = Instant::now();
        progress.batch_started(accounts.len());

        let mut summary = BatchSummary::default();
        for account in accounts {
            let result = self.run_one(&account.company_name, progress).await;
            summary.results.push(result);
        }

        info!(
            succeeded = summary.success_count(),
            total = summary.total(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "batch complete"
        );
        progress.batch_done(&summary);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentProgress;
    use crate::rate_limit::NoDelay;
    use crate::testing::{ScriptedService, case};
    use prospectbrief_render::BriefRenderer;
    use prospectbrief_shared::{BriefError, RunStatus};

    fn accounts(names: &[&str]) -> Vec<AccountRecord> {
        names
            .iter()
            .map(|n| AccountRecord {
                company_name: n.to_string(),
            })
            .collect()
    }

    fn ok(text: &str) -> prospectbrief_shared::Result<String> {
        Ok(text.to_string())
    }

    #[tokio::test]
    async fn single_company_batch_reports_one_of_one() {
        let dir = tempfile::tempdir().unwrap();
        let service = ScriptedService::new(vec![ok("research"), ok("matches"), ok("Fixed brief.")]);
        let pipeline = BriefPipeline::new(
            service,
            NoDelay,
            Box::new(vec![case("DevToolCo")]),
            BriefRenderer::new(dir.path()),
        );

        let summary = pipeline
            .run_all(&accounts(&["Acme Corp"]), &SilentProgress)
            .await;

        assert_eq!(summary.rollup(), "Processed: 1/1 companies");
        let path = summary.results[0].output_path.clone().unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, "# Acme Corp - TLDR Prospect Brief\n\nFixed brief.");
    }

    #[tokio::test]
    async fn failure_is_isolated_and_order_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let service = ScriptedService::new(vec![
            // Acme
            ok("r1"),
            ok("m1"),
            ok("b1"),
            // Globex fails at case matching
            ok("r2"),
            Err(BriefError::Generation("rate limited (HTTP 429): slow down".into())),
            // Initech
            ok("r3"),
            ok("m3"),
            ok("b3"),
        ]);
        let pipeline = BriefPipeline::new(
            service,
            NoDelay,
            Box::new(vec![case("DevToolCo")]),
            BriefRenderer::new(dir.path()),
        );

        let summary = pipeline
            .run_all(&accounts(&["Acme", "Globex", "Initech"]), &SilentProgress)
            .await;

        let names: Vec<_> = summary
            .results
            .iter()
            .map(|r| r.company_name.as_str())
            .collect();
        assert_eq!(names, vec!["Acme", "Globex", "Initech"]);
        assert_eq!(summary.rollup(), "Processed: 2/3 companies");

        let failed = &summary.results[1];
        assert!(failed.output_path.is_none());
        assert!(matches!(&failed.status, RunStatus::Failed(reason) if reason.contains("HTTP 429")));
        assert!(!dir.path().join("Globex_brief.md").exists());

        assert!(summary.results[0].is_success());
        assert!(summary.results[2].is_success());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Initech_brief.md")).unwrap(),
            "# Initech - TLDR Prospect Brief\n\nb3"
        );
    }

    #[tokio::test]
    async fn every_company_yields_a_result() {
        let dir = tempfile::tempdir().unwrap();
        // Every call fails
        let service = ScriptedService::new(Vec::new());
        let pipeline = BriefPipeline::new(
            service,
            NoDelay,
            Box::new(Vec::new()),
            BriefRenderer::new(dir.path()),
        );

        let summary = pipeline
            .run_all(&accounts(&["A", "B", "C", "D"]), &SilentProgress)
            .await;

        assert_eq!(summary.total(), 4);
        assert_eq!(summary.success_count(), 0);
        assert_eq!(summary.failures().count(), 4);
        assert_eq!(summary.rollup(), "Processed: 0/4 companies");
    }

    #[tokio::test]
    async fn empty_roster_is_zero_of_zero() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = BriefPipeline::new(
            ScriptedService::new(Vec::new()),
            NoDelay,
            Box::new(Vec::new()),
            BriefRenderer::new(dir.path()),
        );

        let summary = pipeline.run_all(&[], &SilentProgress).await;
        assert_eq!(summary.rollup(), "Processed: 0/0 companies");
    }
}
