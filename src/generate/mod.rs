pub mod openrouter;
pub mod requester;

pub use openrouter::OpenRouterGenerator;
pub use requester::{GenerateService, GenerationRequester};

use crate::error::Result;
use crate::media::{ImageData, resolve_reference};
use serde::{Deserialize, Serialize};

/// Reference to one generated image: an http(s) URL or a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateImage {
    pub url: String,
}

impl CandidateImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Fetch or decode the image so it can seed the next round.
    pub async fn resolve(&self, client: &reqwest::Client) -> Result<ImageData> {
        resolve_reference(client, &self.url).await
    }
}

impl From<&ImageData> for CandidateImage {
    fn from(image: &ImageData) -> Self {
        Self::new(image.to_data_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::image::fixtures::png_bytes;

    #[tokio::test]
    async fn data_url_candidate_resolves_locally() {
        let image = ImageData::from_bytes(png_bytes(9)).unwrap();
        let candidate = CandidateImage::from(&image);
        let resolved = candidate.resolve(&reqwest::Client::new()).await.unwrap();
        assert_eq!(resolved, image);
    }
}
