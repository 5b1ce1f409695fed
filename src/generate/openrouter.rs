use super::CandidateImage;
use super::requester::GenerateService;
use crate::config::ServiceConfig;
use crate::error::{EngineError, Result, ServiceKind};
use crate::llm::{ChatRequest, OpenRouterClient};
use crate::media::ImageData;
use futures_util::future::try_join_all;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Image-output chat model; one completion per requested candidate.
pub struct OpenRouterGenerator {
    client: Arc<OpenRouterClient>,
    model: String,
    temperature: f64,
}

impl OpenRouterGenerator {
    pub fn new(client: Arc<OpenRouterClient>, config: &ServiceConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    pub(crate) fn build_request(&self, directive: &str, reference: Option<&ImageData>) -> ChatRequest {
        let system_prompt = format!(
            "Generate an enhanced version of a dating profile picture based on this advice:\n```\n{directive}\n```"
        );
        let request = ChatRequest::new(&self.model, self.temperature)
            .system(system_prompt)
            .image_output();
        match reference {
            Some(image) => request.user_image(None, image.to_data_url()),
            None => request.user_text("Create the picture from the advice alone."),
        }
    }

    async fn generate_one(&self, request: &ChatRequest, index: usize) -> Result<Vec<CandidateImage>> {
        let response = self
            .client
            .complete(request)
            .await
            .map_err(|e| e.into_engine(ServiceKind::Generator))?;
        let images: Vec<CandidateImage> = response
            .first_message()
            .map(|message| {
                message
                    .images
                    .iter()
                    .map(|image| CandidateImage::new(image.image_url.url.clone()))
                    .collect()
            })
            .unwrap_or_default();
        tracing::debug!(index, images = images.len(), "generation call finished");
        if images.is_empty() {
            return Err(EngineError::service(
                ServiceKind::Generator,
                format!("generation call {} returned no images", index + 1),
            ));
        }
        Ok(images)
    }
}

impl GenerateService for OpenRouterGenerator {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn generate<'a>(
        &'a self,
        directive: &'a str,
        reference: Option<&'a ImageData>,
        count: u8,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CandidateImage>>> + Send + 'a>> {
        Box::pin(async move {
            let request = self.build_request(directive, reference);
            tracing::debug!(model = %self.model, count, directive, "generation request");

            let batches = try_join_all(
                (0..usize::from(count)).map(|index| self.generate_one(&request, index)),
            )
            .await?;
            Ok(batches.into_iter().flatten().collect())
        })
    }
}
