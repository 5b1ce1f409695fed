use super::combiner::{CombineService, FeedbackEntry};
use super::{GoalDirection, Suggestion};
use crate::config::ServiceConfig;
use crate::error::{Result, ServiceKind};
use crate::llm::{ChatRequest, OpenRouterClient, extract_json_object};
use rand::seq::SliceRandom;
use serde_json::Value;
use std::fmt::Write as _;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Summarizer that asks a chat model for `{thinking, prompt}`.
pub struct OpenRouterCombiner {
    client: Arc<OpenRouterClient>,
    model: String,
    temperature: f64,
    shuffle: bool,
}

impl OpenRouterCombiner {
    pub fn new(client: Arc<OpenRouterClient>, config: &ServiceConfig, shuffle: bool) -> Self {
        Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            shuffle,
        }
    }

    pub(crate) fn build_system_prompt(goal: GoalDirection) -> String {
        let word = goal.swipe_word();
        let stance = match goal {
            GoalDirection::Maximize => "Apply the suggestions to get more RIGHT swipes.",
            GoalDirection::Minimize => {
                "Do the opposite of the suggestions to get more LEFT swipes."
            }
        };
        [
            "You are an image generation expert and dating coach.".to_string(),
            "From the feedback about a photo, produce two things:".into(),
            "1. thinking: what to keep, what to change, what to double down on, what to avoid, and the overall strategy.".into(),
            format!("   When deciding on changes, start with \"To get more {word} swipes,\"."),
            "2. prompt: a detailed image generation prompt (pose, lighting, background, expression, styling) that applies the most impactful changes.".into(),
            "All feedback comes from dating-app users who were asked how the photo could earn more right swipes.".into(),
            format!("The owner of the photo wants more {} swipes. {stance}", word.to_uppercase()),
            "Respond with a JSON object only:".into(),
            r#"{"thinking":"your analysis","prompt":"the image generation prompt"}"#.into(),
        ]
        .join("\n")
    }

    pub(crate) fn build_user_message(feedback: &[&FeedbackEntry]) -> String {
        let mut block = String::new();
        for entry in feedback {
            let _ = writeln!(block, "Character: {}", entry.persona_name);
            let _ = writeln!(block, "Feedback: {}", entry.content);
            if let Some(details) = &entry.details {
                let _ = writeln!(block, "Like: {}", details.likes);
                let _ = writeln!(block, "Dislike: {}", details.dislikes);
                let _ = writeln!(block, "Keep: {}", details.keep);
                let _ = writeln!(block, "Change: {}", details.change);
            }
            block.push_str("---\n");
        }
        format!(
            "Here is feedback from different people about a dating profile picture:\n```\n{block}```"
        )
    }

    /// `{thinking, prompt}` when the model complied, the whole text otherwise.
    pub(crate) fn parse_suggestion(content: &str) -> Suggestion {
        let parsed = serde_json::from_str::<Value>(content).ok().or_else(|| {
            extract_json_object(content).and_then(|obj| serde_json::from_str(obj).ok())
        });
        let Some(Value::Object(fields)) = parsed else {
            tracing::warn!("combiner answer is not JSON; using it as a plain directive");
            return Suggestion::plain(content.trim());
        };

        let field = |keys: [&str; 2]| {
            keys.iter()
                .find_map(|key| fields.get(*key).and_then(Value::as_str))
                .map(|s| s.trim().to_string())
        };
        Suggestion::new(
            field(["thinking", "analysis"]),
            field(["prompt", "directive"]).unwrap_or_default(),
        )
    }
}

impl CombineService for OpenRouterCombiner {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn combine<'a>(
        &'a self,
        feedback: &'a [FeedbackEntry],
        goal: GoalDirection,
    ) -> Pin<Box<dyn Future<Output = Result<Suggestion>> + Send + 'a>> {
        Box::pin(async move {
            let mut ordered: Vec<&FeedbackEntry> = feedback.iter().collect();
            if self.shuffle {
                ordered.shuffle(&mut rand::rng());
            }

            let system_prompt = Self::build_system_prompt(goal);
            let user_message = Self::build_user_message(&ordered);
            tracing::debug!(prompt = %system_prompt, feedback = %user_message, "combine prompt");

            let request = ChatRequest::new(&self.model, self.temperature)
                .system(system_prompt)
                .user_text(user_message)
                .json_object();
            let content = self
                .client
                .complete_text(&request)
                .await
                .map_err(|e| e.into_engine(ServiceKind::Combiner))?;
            Ok(Self::parse_suggestion(&content))
        })
    }
}
