use super::service::JudgeService;
use super::verdict::Verdict;
use crate::error::{EngineError, Result, ServiceKind};
use crate::media::ImageData;
use crate::persona::Persona;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Fans one image out to every persona's judge call and joins them all.
///
/// A failing call (transport error, unusable answer, timeout, even a panic in
/// the service) only drops that persona from the result. The batch itself
/// never fails once it has started, so an all-failed batch is an empty list.
#[derive(Clone)]
pub struct EvaluationOrchestrator {
    judge: Arc<dyn JudgeService>,
    call_timeout: Duration,
    max_concurrency: usize,
    infer_swipe_from_text: bool,
}

impl EvaluationOrchestrator {
    pub fn new(judge: Arc<dyn JudgeService>, call_timeout: Duration) -> Self {
        Self {
            judge,
            call_timeout,
            max_concurrency: 8,
            infer_swipe_from_text: false,
        }
    }

    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    #[must_use]
    pub fn with_text_inference(mut self, enabled: bool) -> Self {
        self.infer_swipe_from_text = enabled;
        self
    }

    /// Verdicts of every persona whose call succeeded, in completion order.
    pub async fn evaluate(
        &self,
        image: Option<&ImageData>,
        personas: &[Persona],
    ) -> Result<Vec<Verdict>> {
        let image = image
            .ok_or_else(|| EngineError::Precondition("no image to evaluate".into()))?;
        if personas.is_empty() {
            return Err(EngineError::Precondition("no judges selected".into()));
        }

        let mut seen = HashSet::with_capacity(personas.len());
        let unique: Vec<&Persona> = personas
            .iter()
            .filter(|p| seen.insert(p.id.as_str()))
            .collect();

        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = JoinSet::new();

        for persona in &unique {
            let judge = Arc::clone(&self.judge);
            let semaphore = Arc::clone(&semaphore);
            let image = image.clone();
            let persona = (*persona).clone();
            let call_timeout = self.call_timeout;
            join_set.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        match tokio::time::timeout(call_timeout, judge.evaluate(&image, &persona))
                            .await
                        {
                            Ok(result) => result,
                            Err(_) => Err(EngineError::transport(
                                ServiceKind::Judge,
                                format!("timed out after {}s", call_timeout.as_secs_f32()),
                            )),
                        }
                    }
                    Err(e) => Err(EngineError::Other(e.into())),
                };
                (persona.id, outcome)
            });
        }

        let mut verdicts = Vec::with_capacity(unique.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((persona_id, Ok(reply))) => {
                    let verdict = Verdict::from_reply(persona_id, reply, self.infer_swipe_from_text);
                    tracing::debug!(
                        persona_id = %verdict.persona_id,
                        swipe_right = verdict.swipe_right,
                        "judge verdict received"
                    );
                    verdicts.push(verdict);
                }
                Ok((persona_id, Err(e))) => {
                    tracing::warn!(
                        %persona_id,
                        kind = e.kind(),
                        error = %e,
                        "judge call failed; persona excluded from round"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "judge task aborted; persona excluded from round");
                }
            }
        }

        tracing::info!(
            judges = unique.len(),
            verdicts = verdicts.len(),
            service = self.judge.name(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "evaluation finished"
        );
        Ok(verdicts)
    }
}
