//! Planning client: goal plans, subtask and priority suggestions

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::PlanError;
use super::plan::{Plan, parse_steps, plan_schema, steps_schema};
use crate::domain::Priority;
use crate::llm::{GenerateRequest, LlmClient};
use crate::prompts::{PromptContext, PromptLoader};

/// Shapes requests to the model and parses its structured replies
///
/// Returns plain data only; identifiers are assigned by the task store.
/// Each call makes at most one request, with no retries.
pub struct PlanningClient {
    llm: Option<Arc<dyn LlmClient>>,
    prompts: PromptLoader,
}

impl PlanningClient {
    /// `llm` is `None` when no credential is configured
    pub fn new(llm: Option<Arc<dyn LlmClient>>, prompts: PromptLoader) -> Self {
        Self { llm, prompts }
    }

    /// Whether a model is configured at all
    pub fn is_available(&self) -> bool {
        self.llm.is_some()
    }

    /// Expand a free-text goal into a multi-task plan
    pub async fn plan_goal(&self, goal: &str) -> Result<Plan, PlanError> {
        debug!(%goal, "plan_goal: called");
        let llm = self.llm.as_ref().ok_or(PlanError::EmptyCredential)?;

        let prompt = self
            .prompts
            .render("plan-goal", &PromptContext::goal(goal))
            .map_err(|e| PlanError::Prompt(e.to_string()))?;

        let response = llm.generate(GenerateRequest::json(prompt, plan_schema())).await?;
        let text = response.non_empty_text().ok_or_else(|| {
            debug!(finish_reason = ?response.finish_reason, "plan_goal: empty response");
            PlanError::GenerationFailure
        })?;

        let plan = Plan::parse(text).map_err(|e| {
            debug!(error = %e, "plan_goal: unparseable response");
            PlanError::MalformedResponse(e)
        })?;

        info!(task_count = plan.tasks.len(), "Generated plan");
        Ok(plan)
    }

    /// Suggest substeps for a task title
    ///
    /// Best effort: any failure is logged and yields an empty list.
    pub async fn plan_subtasks(&self, title: &str) -> Vec<String> {
        debug!(%title, "plan_subtasks: called");
        let Some(llm) = self.llm.as_ref() else {
            debug!("plan_subtasks: no credential configured");
            return Vec::new();
        };

        let prompt = match self.prompts.render("suggest-subtasks", &PromptContext::title(title)) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "plan_subtasks: failed to render prompt");
                return Vec::new();
            }
        };

        let response = match llm.generate(GenerateRequest::json(prompt, steps_schema())).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, %title, "plan_subtasks: request failed");
                return Vec::new();
            }
        };

        let Some(text) = response.non_empty_text() else {
            debug!("plan_subtasks: empty response");
            return Vec::new();
        };

        match parse_steps(text) {
            Ok(steps) => {
                debug!(count = steps.len(), "plan_subtasks: parsed steps");
                steps
            }
            Err(e) => {
                warn!(error = %e, %title, "plan_subtasks: unparseable response");
                Vec::new()
            }
        }
    }

    /// Classify a task title as Low, Medium or High priority
    ///
    /// Falls back to `Priority::Medium` on any failure or unexpected answer.
    pub async fn suggest_priority(&self, title: &str) -> Priority {
        debug!(%title, "suggest_priority: called");
        let Some(llm) = self.llm.as_ref() else {
            return Priority::Medium;
        };

        let prompt = match self.prompts.render("suggest-priority", &PromptContext::title(title)) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "suggest_priority: failed to render prompt");
                return Priority::Medium;
            }
        };

        match llm.generate(GenerateRequest::text(prompt)).await {
            Ok(response) => match response.text.as_deref().map(|t| t.trim().to_lowercase()).as_deref() {
                Some("high") => Priority::High,
                Some("low") => Priority::Low,
                _ => Priority::Medium,
            },
            Err(e) => {
                warn!(error = %e, "suggest_priority: request failed");
                Priority::Medium
            }
        }
    }
}
