//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use prospectbrief_catalog::{CsvCaseCatalog, load_roster};
use prospectbrief_core::{
    BatchSummary, BriefPipeline, FixedDelay, PipelineState, ProgressReporter,
};
use prospectbrief_generation::AnthropicClient;
use prospectbrief_render::{BriefRenderer, PdfRenderer, RenderOutcome};
use prospectbrief_shared::{
    AppConfig, BriefError, init_config, load_config, load_config_from, validate_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Prospect brief generator: research, case matching, one-page briefs.
#[derive(Parser)]
#[command(
    name = "prospectbrief",
    version,
    about = "Research prospects and write one-page sales briefs backed by case studies.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.prospectbrief/prospectbrief.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Research a single company and write its brief.
    Run {
        /// Company name, used verbatim.
        company: String,

        #[command(flatten)]
        opts: RunOptions,
    },

    /// Process every company in the accounts roster.
    All {
        /// Accounts roster CSV.
        #[arg(long)]
        accounts: Option<PathBuf>,

        #[command(flatten)]
        opts: RunOptions,
    },

    /// List the companies in the accounts roster.
    List {
        /// Accounts roster CSV.
        #[arg(long)]
        accounts: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags shared by the commands that generate briefs.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct RunOptions {
    /// Directory briefs are written to.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Seconds to pause after each generation stage.
    #[arg(long)]
    pub delay: Option<u64>,

    /// Skip the PDF artifact.
    #[arg(long)]
    pub no_pdf: bool,

    /// Case study catalog CSV.
    #[arg(long)]
    pub cases: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "prospectbrief=warn",
        1 => "prospectbrief=info",
        2 => "prospectbrief=debug",
        _ => "prospectbrief=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Run { company, opts } => {
            cmd_run(&company, &opts, config_path.as_deref()).await
        }
        Command::All { accounts, opts } => {
            cmd_all(accounts.as_deref(), &opts, config_path.as_deref()).await
        }
        Command::List { accounts } => cmd_list(accounts.as_deref(), config_path.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path.as_deref()),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

fn roster_path(config: &AppConfig, flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.defaults.accounts_file))
}

/// Wire the pipeline from config plus flag overrides.
fn build_pipeline(
    config: &AppConfig,
    opts: &RunOptions,
) -> Result<BriefPipeline<AnthropicClient, FixedDelay>> {
    validate_api_key(config)?;
    let settings = config.anthropic.resolve()?;
    let client = AnthropicClient::new(&settings)?;

    let delay = opts.delay.unwrap_or(config.defaults.rate_limit_secs);
    let output_dir = opts
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir));
    let cases = CsvCaseCatalog::new(
        opts.cases
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.defaults.cases_file)),
    );

    let mut renderer = BriefRenderer::new(output_dir);
    if config.render.pdf && !opts.no_pdf {
        renderer = renderer.with_secondary(Box::new(PdfRenderer));
    }

    info!(
        model = client.model(),
        delay_secs = delay,
        output_dir = %renderer.output_dir().display(),
        cases = %cases.path().display(),
        "pipeline configured"
    );

    let pipeline = BriefPipeline::new(
        client,
        FixedDelay::from_secs(delay),
        Box::new(cases),
        renderer,
    );
    pipeline.prepare()?;
    Ok(pipeline)
}

async fn cmd_run(company: &str, opts: &RunOptions, config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let pipeline = build_pipeline(&config, opts)?;

    let progress = CliProgress::new();
    let result = pipeline.run(company, &progress).await;
    progress.finish();

    result?;
    Ok(())
}

async fn cmd_all(
    accounts: Option<&Path>,
    opts: &RunOptions,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let roster = load_roster(&roster_path(&config, accounts))?;
    let pipeline = build_pipeline(&config, opts)?;

    let progress = CliProgress::new();
    pipeline.run_all(&roster, &progress).await;
    progress.finish();

    Ok(())
}

fn cmd_list(accounts: Option<&Path>, config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let roster = load_roster(&roster_path(&config, accounts))?;

    println!(
        "\nAccounts in book of business ({} companies):\n",
        roster.len()
    );
    for (i, account) in roster.iter().enumerate() {
        println!("  {:3}. {}", i + 1, account.company_name);
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

const RULE_WIDTH: usize = 60;

/// CLI progress reporter. Durable lines go to stdout; the spinner only
/// carries the step in flight and stays hidden when stderr is not a TTY.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn emit<I: IntoIterator<Item = String>>(&self, lines: I) {
        self.spinner.suspend(|| {
            for line in lines {
                println!("{line}");
            }
        });
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Console lines
// ---------------------------------------------------------------------------

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn stage_message(company_name: &str, state: PipelineState) -> Option<String> {
    match state {
        PipelineState::Researching => Some(format!("Researching {company_name}...")),
        PipelineState::Matching => Some("Matching case studies...".into()),
        PipelineState::Synthesizing => Some("Generating brief...".into()),
        PipelineState::Rendering => Some("Saving brief...".into()),
        PipelineState::Done => None,
    }
}

fn banner_lines(company_name: &str) -> Vec<String> {
    vec![
        String::new(),
        rule(),
        format!("Processing: {company_name}"),
        rule(),
    ]
}

/// `None` for a zero delay.
fn pause_message(delay: Duration) -> Option<String> {
    (!delay.is_zero()).then(|| format!("Rate limit pause ({}s)...", delay.as_secs()))
}

fn artifact_lines(outcome: &RenderOutcome) -> Vec<String> {
    let mut lines = vec![format!("  ✓ Brief saved: {}", outcome.primary.display())];
    if let Some(path) = &outcome.secondary {
        lines.push(format!("  ✓ PDF saved: {}", path.display()));
    }
    if let Some(reason) = &outcome.degraded {
        lines.push(format!("  ! {reason}"));
    }
    lines.push(String::new());
    lines.push(format!("✓ Complete: {}", outcome.output_path().display()));
    lines
}

fn failure_line(error: &BriefError) -> String {
    format!("  ✗ Error: {error}")
}

fn batch_start_lines(total: usize) -> Vec<String> {
    vec![String::new(), format!("Processing all {total} companies...")]
}

fn summary_lines(summary: &BatchSummary) -> Vec<String> {
    vec![
        String::new(),
        rule(),
        "SUMMARY".to_string(),
        rule(),
        summary.rollup(),
    ]
}

impl ProgressReporter for CliProgress {
    fn company_started(&self, company_name: &str) {
        self.emit(banner_lines(company_name));
    }

    fn stage(&self, company_name: &str, state: PipelineState) {
        if let Some(message) = stage_message(company_name, state) {
            self.emit([format!("  → {message}")]);
            self.spinner.set_message(message);
        }
    }

    fn pause(&self, delay: Duration) {
        if let Some(message) = pause_message(delay) {
            self.emit([format!("  ⏳ {message}")]);
            self.spinner.set_message(message);
        }
    }

    fn artifact(&self, outcome: &RenderOutcome) {
        self.emit(artifact_lines(outcome));
    }

    fn company_failed(&self, _company_name: &str, error: &BriefError) {
        self.emit([failure_line(error)]);
    }

    fn batch_started(&self, total: usize) {
        self.emit(batch_start_lines(total));
    }

    fn batch_done(&self, summary: &BatchSummary) {
        self.emit(summary_lines(summary));
    }
}
