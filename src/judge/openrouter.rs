use super::service::JudgeService;
use super::verdict::{JudgeReply, Swipe, VerdictDetails};
use crate::config::ServiceConfig;
use crate::error::{EngineError, Result, ServiceKind};
use crate::llm::{ChatRequest, OpenRouterClient, extract_json_object, scrub_secret_patterns};
use crate::media::ImageData;
use crate::persona::Persona;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Judge backed by a vision chat model that role-plays the persona.
pub struct OpenRouterJudge {
    client: Arc<OpenRouterClient>,
    model: String,
    temperature: f64,
}

impl OpenRouterJudge {
    pub fn new(client: Arc<OpenRouterClient>, config: &ServiceConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    pub(crate) fn build_system_prompt(persona: &Persona) -> String {
        [
            format!(
                "You act as `{}` with this personality: {}",
                persona.name, persona.bio
            ),
            "Answer as a real person with that personality would, and stay in character.".into(),
            "Look at this person's dating profile picture and honestly decide whether your character would swipe RIGHT or LEFT.".into(),
            "Explain the decision, say what to KEEP and what to CHANGE to earn more right swipes.".into(),
            "Respond with a JSON object only, in this shape:".into(),
            r#"{"swipe":"right|left","reason":"why","likes":"what works","dislikes":"what does not","keep":"what to keep","change":"what to change"}"#.into(),
        ]
        .join("\n")
    }

    /// Read the model's JSON answer. Prose around the object is tolerated.
    pub(crate) fn parse_judgement(content: &str) -> std::result::Result<JudgeReply, String> {
        let value = serde_json::from_str::<Value>(content)
            .ok()
            .or_else(|| {
                extract_json_object(content).and_then(|obj| serde_json::from_str(obj).ok())
            })
            .ok_or_else(|| "judge answer is not JSON".to_string())?;
        let Value::Object(fields) = value else {
            return Err("judge answer is not a JSON object".into());
        };

        let swipe = match fields.get("swipe") {
            Some(Value::String(raw)) => Swipe::parse(raw),
            Some(Value::Bool(right)) => Some(if *right { Swipe::Right } else { Swipe::Left }),
            _ => fields
                .get("swipe_right")
                .and_then(Value::as_bool)
                .map(|right| if right { Swipe::Right } else { Swipe::Left }),
        };

        let text = |key: &str| -> String {
            match fields.get(key) {
                Some(Value::String(s)) => s.trim().to_string(),
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => String::new(),
            }
        };
        let mut reasoning = text("reason");
        if reasoning.is_empty() {
            reasoning = text("reasoning");
        }
        let details = VerdictDetails {
            reasoning,
            likes: text("likes"),
            dislikes: text("dislikes"),
            keep: text("keep"),
            change: text("change"),
        };

        let summary = details.summary();
        Ok(JudgeReply {
            swipe,
            content: if summary.is_empty() {
                "No reason provided".into()
            } else {
                summary
            },
            details: Some(details),
        })
    }
}

impl JudgeService for OpenRouterJudge {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn evaluate<'a>(
        &'a self,
        image: &'a ImageData,
        persona: &'a Persona,
    ) -> Pin<Box<dyn Future<Output = Result<JudgeReply>> + Send + 'a>> {
        Box::pin(async move {
            let system_prompt = Self::build_system_prompt(persona);
            tracing::debug!(persona_id = %persona.id, prompt = %system_prompt, "judge prompt");

            let request = ChatRequest::new(&self.model, self.temperature)
                .system(system_prompt)
                .user_image(None, image.to_data_url())
                .json_object();
            let content = self
                .client
                .complete_text(&request)
                .await
                .map_err(|e| e.into_engine(ServiceKind::Judge))?;

            Self::parse_judgement(&content).map_err(|reason| {
                tracing::debug!(
                    persona_id = %persona.id,
                    content = %scrub_secret_patterns(&content),
                    "unparseable judge answer"
                );
                EngineError::service(ServiceKind::Judge, reason)
            })
        })
    }
}
