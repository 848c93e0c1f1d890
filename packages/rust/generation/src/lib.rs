//! Generation service client.
//!
//! Every pipeline stage talks to the text-generation service through the
//! [`GenerationService`] trait: one request in, the concatenated text of the
//! response out. [`AnthropicClient`] is the production implementation; tests
//! substitute scripted services.

mod anthropic;

use std::future::Future;

use prospectbrief_shared::{BriefError, Result};

pub use anthropic::AnthropicClient;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Server-side capabilities the service may invoke while answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Web search, capped at `max_uses` searches per call.
    WebSearch { max_uses: u32 },
}

/// A single generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// System instruction fixing the stage's role.
    pub system: String,
    /// User turn content.
    pub content: String,
    /// Upper bound on response length.
    pub max_tokens: u32,
    pub tools: Vec<Tool>,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, content: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system: system.into(),
            content: content.into(),
            max_tokens,
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Reject requests the service would bill for but cannot answer usefully.
    pub fn validate(&self) -> Result<()> {
        if self.system.trim().is_empty() {
            return Err(BriefError::contract("generate", "system instruction is empty"));
        }
        if self.content.trim().is_empty() {
            return Err(BriefError::contract("generate", "user content is empty"));
        }
        if self.max_tokens == 0 {
            return Err(BriefError::contract("generate", "max_tokens must be positive"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Service trait
// ---------------------------------------------------------------------------

/// A text-generation backend.
///
/// Implementations perform exactly one external call per invocation and
/// never retry. Any transport, quota, or decoding problem is reported as
/// [`BriefError::Generation`].
pub trait GenerationService: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> impl Future<Output = Result<String>> + Send;
}
