use super::verdict::JudgeReply;
use crate::error::Result;
use crate::media::ImageData;
use crate::persona::Persona;
use std::future::Future;
use std::pin::Pin;

/// Backing judge service: one call per (image, persona) pair.
pub trait JudgeService: Send + Sync {
    fn name(&self) -> &str;

    fn evaluate<'a>(
        &'a self,
        image: &'a ImageData,
        persona: &'a Persona,
    ) -> Pin<Box<dyn Future<Output = Result<JudgeReply>> + Send + 'a>>;
}
