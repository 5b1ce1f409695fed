use crate::config::{Config, SessionConfig};
use crate::error::{EngineError, Result};
use crate::generate::{
    CandidateImage, GenerateService, GenerationRequester, OpenRouterGenerator,
};
use crate::judge::{
    EvaluationOrchestrator, JudgeService, OpenRouterJudge, SwipeStats,
};
use crate::llm::{OpenRouterClient, build_service_client};
use crate::media::ImageData;
use crate::persona::{Gender, Persona, PersonaRegistry};
use crate::round::{
    ArchivedRound, Delivery, Operation, Round, RoundLedger, RoundPhase, RoundStateMachine,
};
use crate::suggest::{
    CombineService, FeedbackEntry, GoalDirection, OpenRouterCombiner, Suggestion,
    SuggestionCombiner,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The three backing services a session talks to.
#[derive(Clone)]
pub struct Services {
    pub judge: Arc<dyn JudgeService>,
    pub combiner: Arc<dyn CombineService>,
    pub generator: Arc<dyn GenerateService>,
}

impl Services {
    /// OpenRouter-backed services sharing one HTTP client.
    pub fn openrouter(config: &Config) -> Self {
        let client = Arc::new(OpenRouterClient::with_client(
            config.api_key.as_deref(),
            &config.base_url,
            build_service_client(config.longest_timeout()),
        ));
        if !client.has_api_key() {
            tracing::warn!("no OpenRouter API key configured; service calls will fail");
        }
        Self {
            judge: Arc::new(OpenRouterJudge::new(Arc::clone(&client), &config.judge)),
            combiner: Arc::new(OpenRouterCombiner::new(
                Arc::clone(&client),
                &config.combiner,
                config.session.shuffle_feedback,
            )),
            generator: Arc::new(OpenRouterGenerator::new(client, &config.generator)),
        }
    }
}

/// One operator's working session: judge catalog, round ledger and the
/// components that move a round forward.
///
/// Shared state sits behind short-lived locks that are never held across a
/// backing call, so a `Session` can be shared between tasks.
pub struct Session {
    settings: SessionConfig,
    registry: Mutex<PersonaRegistry>,
    rounds: Mutex<RoundStateMachine>,
    orchestrator: EvaluationOrchestrator,
    combiner: SuggestionCombiner,
    requester: GenerationRequester,
    http: reqwest::Client,
}

impl Session {
    /// Session wired to OpenRouter with the built-in judge catalog.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config, Services::openrouter(config), PersonaRegistry::with_defaults()?)
    }

    pub fn new(config: &Config, services: Services, registry: PersonaRegistry) -> Result<Self> {
        config.validate()?;
        let settings = config.session.clone();
        Ok(Self {
            orchestrator: EvaluationOrchestrator::new(services.judge, config.judge.timeout())
                .with_max_concurrency(settings.max_evaluation_concurrency)
                .with_text_inference(settings.infer_swipe_from_text),
            combiner: SuggestionCombiner::new(services.combiner, config.combiner.timeout()),
            requester: GenerationRequester::new(services.generator, config.generator.timeout()),
            http: build_service_client(config.longest_timeout()),
            registry: Mutex::new(registry),
            rounds: Mutex::new(RoundStateMachine::new()),
            settings,
        })
    }

    fn registry(&self) -> MutexGuard<'_, PersonaRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rounds(&self) -> MutexGuard<'_, RoundStateMachine> {
        self.rounds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Judges ──────────────────────────────────────────────────────────

    pub fn personas(&self) -> Vec<Persona> {
        self.registry().all().to_vec()
    }

    pub fn selected_judges(&self) -> Vec<Persona> {
        self.registry().selected().into_iter().cloned().collect()
    }

    /// Add a custom judge and select it right away.
    pub fn add_judge(&self, name: &str, bio: &str, gender: Gender) -> Result<Persona> {
        let mut registry = self.registry();
        let persona = registry.add_custom(name, bio, gender)?;
        registry.select(&persona.id);
        Ok(persona)
    }

    pub fn select_judge(&self, id: &str) -> Result<()> {
        let mut registry = self.registry();
        if registry.get(id).is_none() {
            return Err(EngineError::Validation(format!("unknown judge: {id}")));
        }
        registry.select(id);
        Ok(())
    }

    pub fn deselect_judge(&self, id: &str) {
        self.registry().deselect(id);
    }

    // ── Round commands ──────────────────────────────────────────────────

    pub fn upload_image(&self, image: ImageData) {
        tracing::debug!(media_type = image.media_type(), bytes = image.len(), "image uploaded");
        self.rounds().set_image(image);
    }

    /// Ask every selected judge about the current image.
    ///
    /// Judges whose call fails are left out; an all-failed panel still
    /// records an empty evaluation.
    pub async fn evaluate(&self) -> Result<Delivery<SwipeStats>> {
        let (ticket, image) = {
            let mut rounds = self.rounds();
            let ticket = rounds.begin(Operation::Evaluate)?;
            (ticket, rounds.current().source_image().cloned())
        };
        let personas = self.selected_judges();

        let outcome = self.orchestrator.evaluate(image.as_ref(), &personas).await;
        self.rounds()
            .settle(Operation::Evaluate, ticket, |rounds| rounds.record_verdicts(outcome?))
    }

    /// Consolidate the current verdicts into one directive.
    pub async fn combine(&self, goal: Option<GoalDirection>) -> Result<Delivery<Suggestion>> {
        let goal = goal.unwrap_or(self.settings.goal);
        let (ticket, verdicts) = {
            let mut rounds = self.rounds();
            let ticket = rounds.begin(Operation::Combine)?;
            (ticket, rounds.current().verdicts().to_vec())
        };
        let feedback = FeedbackEntry::from_verdicts(&verdicts, &self.registry());

        let outcome = self.combiner.combine(&feedback, goal).await;
        self.rounds().settle(Operation::Combine, ticket, |rounds| {
            let suggestion = outcome?;
            rounds.record_suggestion(suggestion.clone())?;
            Ok(suggestion)
        })
    }

    /// Request `count` candidates (configured default when `None`).
    pub async fn generate(&self, count: Option<u8>) -> Result<Delivery<Vec<CandidateImage>>> {
        let count = count.unwrap_or(self.settings.default_generate_count);
        let (ticket, directive, reference) = {
            let mut rounds = self.rounds();
            let ticket = rounds.begin(Operation::Generate)?;
            let current = rounds.current();
            let directive = current
                .suggestion()
                .map(|s| s.directive.clone())
                .unwrap_or_default();
            (ticket, directive, current.source_image().cloned())
        };

        let outcome = self
            .requester
            .generate(&directive, reference.as_ref(), count)
            .await;
        self.rounds().settle(Operation::Generate, ticket, |rounds| {
            let candidates = outcome?;
            rounds.record_candidates(candidates.clone())?;
            Ok(candidates)
        })
    }

    /// Pick candidate `index` of the current round as the next round's image.
    /// Returns the new round number.
    pub async fn select_candidate(&self, index: usize) -> Result<Delivery<u32>> {
        let (ticket, candidate) = {
            let rounds = self.rounds();
            let candidates = rounds.current().candidates();
            if candidates.is_empty() {
                return Err(EngineError::Precondition(
                    "current round has no candidates".into(),
                ));
            }
            let candidate = candidates.get(index).cloned().ok_or_else(|| {
                EngineError::Validation(format!(
                    "candidate index {index} out of range (0..{})",
                    candidates.len()
                ))
            })?;
            (rounds.ticket(), candidate)
        };

        let image = candidate.resolve(&self.http).await?;
        let mut rounds = self.rounds();
        if !rounds.is_current(ticket) {
            tracing::debug!(index, "round changed while resolving candidate; selection dropped");
            return Ok(Delivery::Stale);
        }
        let next = rounds.select_candidate(image)?.number();
        Ok(Delivery::Applied(next))
    }

    /// Start the next round on an arbitrary image. Returns the new round number.
    pub fn select_image(&self, image: ImageData) -> Result<u32> {
        Ok(self.rounds().select_candidate(image)?.number())
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn phase(&self) -> RoundPhase {
        self.rounds().phase()
    }

    pub fn current_round(&self) -> Round {
        self.rounds().current().clone()
    }

    pub fn history(&self) -> Vec<ArchivedRound> {
        self.rounds().ledger().history().to_vec()
    }

    pub fn swipe_stats(&self) -> SwipeStats {
        self.rounds().current().swipe_stats()
    }

    pub fn is_busy(&self, operation: Operation) -> bool {
        self.rounds().is_in_flight(operation)
    }

    /// Copy of the whole ledger.
    pub fn snapshot(&self) -> RoundLedger {
        self.rounds().ledger().clone()
    }
}
