use super::CandidateImage;
use crate::config::{MAX_GENERATE_COUNT, MIN_GENERATE_COUNT};
use crate::error::{EngineError, Result, ServiceKind};
use crate::media::ImageData;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Backing image-generation service. One batch per call.
pub trait GenerateService: Send + Sync {
    fn name(&self) -> &str;

    fn generate<'a>(
        &'a self,
        directive: &'a str,
        reference: Option<&'a ImageData>,
        count: u8,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CandidateImage>>> + Send + 'a>>;
}

/// Requests exactly `count` candidates, or fails as a whole.
#[derive(Clone)]
pub struct GenerationRequester {
    service: Arc<dyn GenerateService>,
    call_timeout: Duration,
}

impl GenerationRequester {
    pub fn new(service: Arc<dyn GenerateService>, call_timeout: Duration) -> Self {
        Self {
            service,
            call_timeout,
        }
    }

    pub async fn generate(
        &self,
        directive: &str,
        reference: Option<&ImageData>,
        count: u8,
    ) -> Result<Vec<CandidateImage>> {
        if !(MIN_GENERATE_COUNT..=MAX_GENERATE_COUNT).contains(&count) {
            return Err(EngineError::Precondition(format!(
                "candidate count must be within {MIN_GENERATE_COUNT}..={MAX_GENERATE_COUNT}, got {count}"
            )));
        }
        let directive = directive.trim();
        if directive.is_empty() {
            return Err(EngineError::Precondition(
                "cannot generate without a directive".into(),
            ));
        }

        let mut candidates = tokio::time::timeout(
            self.call_timeout,
            self.service.generate(directive, reference, count),
        )
        .await
        .map_err(|_| {
            EngineError::transport(
                ServiceKind::Generator,
                format!("timed out after {}s", self.call_timeout.as_secs_f32()),
            )
        })??;

        let wanted = usize::from(count);
        if candidates.len() < wanted {
            return Err(EngineError::service(
                ServiceKind::Generator,
                format!("expected {wanted} images, got {}", candidates.len()),
            ));
        }
        if candidates.len() > wanted {
            tracing::debug!(
                extra = candidates.len() - wanted,
                "generator returned more images than requested; truncating"
            );
            candidates.truncate(wanted);
        }

        tracing::info!(
            count = wanted,
            service = self.service.name(),
            with_reference = reference.is_some(),
            "candidates generated"
        );
        Ok(candidates)
    }
}
