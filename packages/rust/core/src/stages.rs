//! The three generation stages: research, case matching, brief synthesis.
//!
//! Each stage fixes its system instruction, output ceiling, and how much
//! upstream text it forwards. Truncation is a hard cutoff on characters,
//! applied independently per stage so request size never grows with
//! upstream output.

use tracing::{debug, instrument};

use prospectbrief_generation::{GenerationRequest, GenerationService, Tool};
use prospectbrief_shared::{BriefError, CaseStudyRecord, Result};

pub const RESEARCH_MAX_TOKENS: u32 = 1000;
pub const CASE_MATCH_MAX_TOKENS: u32 = 800;
pub const BRIEF_MAX_TOKENS: u32 = 1200;

/// Web searches allowed per research call.
pub const RESEARCH_SEARCH_USES: u32 = 3;

/// Research characters forwarded to case matching.
pub const CASE_MATCH_RESEARCH_CHARS: usize = 1500;
/// Research characters forwarded to brief synthesis.
pub const BRIEF_RESEARCH_CHARS: usize = 1500;
/// Case match characters forwarded to brief synthesis.
pub const BRIEF_CASE_MATCH_CHARS: usize = 1000;

const RESEARCH_SYSTEM: &str = "\
You are a sales research assistant for TLDR, a tech newsletter company selling ad placements.

Research the target company concisely. Focus on:
1. What they do and who they sell to
2. Whether they target developers/technical buyers
3. Recent news (funding, launches, hiring)
4. Which TLDR newsletters would fit them

Be concise - bullet points preferred.";

const CASE_MATCH_SYSTEM: &str = "\
Match 2-3 relevant case studies for the prospect. For each match, explain why it's relevant and the key proof point.";

const BRIEF_SYSTEM: &str = "\
Create a concise prospect brief with these sections:
1. **Header**: Company, Industry, Priority (High/Med/Low)
2. **Opportunity** (2 sentences): Why they're a fit for TLDR
3. **Recommended Approach**: Which newsletters, campaign type, key angle
4. **Proof Points**: 2-3 bullets from matched case studies
5. **Draft Outreach**: 3-sentence cold email
6. **Key Notes**: Important signals or questions

Keep it tight - this is a one-pager.";

/// Pipeline stage that calls the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Research,
    CaseMatch,
    Brief,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::CaseMatch => "case_match",
            Self::Brief => "brief",
        }
    }
}

// ---------------------------------------------------------------------------
// Request builders
// ---------------------------------------------------------------------------

/// First `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// One line per case: `- {client} ({industry}): {audience} | {metrics}`.
pub fn format_case_catalog(cases: &[CaseStudyRecord]) -> String {
    let mut out = String::from("Case studies:\n");
    for case in cases {
        out.push_str(&format!(
            "- {} ({}): {} | {}\n",
            case.client_name, case.industry, case.target_audience, case.key_metrics
        ));
    }
    out
}

fn require_text(stage: Stage, label: &str, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(BriefError::contract(
            stage.as_str(),
            format!("{label} is empty"),
        ));
    }
    Ok(())
}

pub fn research_request(company_name: &str) -> Result<GenerationRequest> {
    require_text(Stage::Research, "company name", company_name)?;
    Ok(GenerationRequest::new(
        RESEARCH_SYSTEM,
        format!("Research {company_name} for TLDR newsletter advertising. Be concise."),
        RESEARCH_MAX_TOKENS,
    )
    .with_tool(Tool::WebSearch {
        max_uses: RESEARCH_SEARCH_USES,
    }))
}

pub fn case_match_request(
    company_name: &str,
    research: &str,
    cases: &[CaseStudyRecord],
) -> Result<GenerationRequest> {
    require_text(Stage::CaseMatch, "research text", research)?;
    let system = format!("{CASE_MATCH_SYSTEM}\n\n{}", format_case_catalog(cases));
    let content = format!(
        "Match cases for {company_name}:\n{}",
        truncate_chars(research, CASE_MATCH_RESEARCH_CHARS)
    );
    Ok(GenerationRequest::new(system, content, CASE_MATCH_MAX_TOKENS))
}

pub fn brief_request(
    company_name: &str,
    research: &str,
    case_matches: &str,
) -> Result<GenerationRequest> {
    require_text(Stage::Brief, "research text", research)?;
    require_text(Stage::Brief, "case match text", case_matches)?;
    let content = format!(
        "Brief for {company_name}:\n\nResearch:\n{}\n\nCase matches:\n{}",
        truncate_chars(research, BRIEF_RESEARCH_CHARS),
        truncate_chars(case_matches, BRIEF_CASE_MATCH_CHARS),
    );
    Ok(GenerationRequest::new(BRIEF_SYSTEM, content, BRIEF_MAX_TOKENS))
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Stage 1: web-search-backed company research.
#[instrument(skip(service))]
pub async fn research<G: GenerationService>(service: &G, company_name: &str) -> Result<String> {
    let request = research_request(company_name)?;
    let text = service.generate(&request).await?;
    debug!(chars = text.chars().count(), "research complete");
    Ok(text)
}

/// Stage 2: pick relevant case studies for the researched company.
#[instrument(skip(service, research, cases), fields(cases = cases.len()))]
pub async fn match_cases<G: GenerationService>(
    service: &G,
    company_name: &str,
    research: &str,
    cases: &[CaseStudyRecord],
) -> Result<String> {
    let request = case_match_request(company_name, research, cases)?;
    let text = service.generate(&request).await?;
    debug!(chars = text.chars().count(), "case matching complete");
    Ok(text)
}

/// Stage 3: synthesize the one-page brief.
#[instrument(skip(service, research, case_matches))]
pub async fn synthesize_brief<G: GenerationService>(
    service: &G,
    company_name: &str,
    research: &str,
    case_matches: &str,
) -> Result<String> {
    let request = brief_request(company_name, research, case_matches)?;
    let text = service.generate(&request).await?;
    debug!(chars = text.chars().count(), "brief complete");
    Ok(text)
}
