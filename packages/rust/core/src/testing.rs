//! Scripted generation service for pipeline tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use prospectbrief_generation::{GenerationRequest, GenerationService};
use prospectbrief_shared::{BriefError, CaseStudyRecord, Result};

/// Replays canned responses in order and records every request.
/// Once the script runs out, every call fails.
pub(crate) struct ScriptedService {
    responses: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedService {
    pub(crate) fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl GenerationService for ScriptedService {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BriefError::Generation("script exhausted".into())))
    }
}

pub(crate) fn case(client_name: &str) -> CaseStudyRecord {
    CaseStudyRecord {
        client_name: client_name.into(),
        industry: "Developer Tools".into(),
        target_audience: "Backend engineers".into(),
        key_metrics: "3% CTR".into(),
    }
}
