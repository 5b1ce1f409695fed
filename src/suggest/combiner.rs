use super::{GoalDirection, Suggestion};
use crate::error::{EngineError, Result, ServiceKind};
use crate::judge::{Verdict, VerdictDetails};
use crate::persona::PersonaRegistry;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// One judge's feedback as sent to the summarization service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEntry {
    pub persona_name: String,
    pub content: String,
    pub details: Option<VerdictDetails>,
}

impl FeedbackEntry {
    /// Pair each verdict with its judge's display name.
    pub fn from_verdicts(verdicts: &[Verdict], registry: &PersonaRegistry) -> Vec<Self> {
        verdicts
            .iter()
            .map(|verdict| Self {
                persona_name: registry
                    .get(&verdict.persona_id)
                    .map_or_else(|| "Unknown".to_string(), |p| p.name.clone()),
                content: verdict.verdict_text.clone(),
                details: verdict.details.clone(),
            })
            .collect()
    }
}

/// Backing summarization service.
pub trait CombineService: Send + Sync {
    fn name(&self) -> &str;

    fn combine<'a>(
        &'a self,
        feedback: &'a [FeedbackEntry],
        goal: GoalDirection,
    ) -> Pin<Box<dyn Future<Output = Result<Suggestion>> + Send + 'a>>;
}

/// Turns a round's verdicts into a single directive with one service call.
#[derive(Clone)]
pub struct SuggestionCombiner {
    service: Arc<dyn CombineService>,
    call_timeout: Duration,
}

impl SuggestionCombiner {
    pub fn new(service: Arc<dyn CombineService>, call_timeout: Duration) -> Self {
        Self {
            service,
            call_timeout,
        }
    }

    pub async fn combine(
        &self,
        feedback: &[FeedbackEntry],
        goal: GoalDirection,
    ) -> Result<Suggestion> {
        if feedback.is_empty() {
            return Err(EngineError::Precondition(
                "cannot combine a round without verdicts".into(),
            ));
        }

        let suggestion = tokio::time::timeout(self.call_timeout, self.service.combine(feedback, goal))
            .await
            .map_err(|_| {
                EngineError::transport(
                    ServiceKind::Combiner,
                    format!("timed out after {}s", self.call_timeout.as_secs_f32()),
                )
            })??;

        let directive = suggestion.directive.trim();
        if directive.is_empty() {
            return Err(EngineError::service(
                ServiceKind::Combiner,
                "response has no directive",
            ));
        }

        tracing::info!(
            entries = feedback.len(),
            %goal,
            service = self.service.name(),
            has_analysis = suggestion.analysis.is_some(),
            "feedback combined"
        );
        Ok(Suggestion::new(suggestion.analysis, directive))
    }
}
