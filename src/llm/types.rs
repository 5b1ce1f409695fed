use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modalities: Option<Vec<&'static str>>,
}

impl ChatRequest {
    pub fn new(model: &str, temperature: f64) -> Self {
        Self {
            model: model.to_string(),
            messages: Vec::with_capacity(2),
            temperature,
            response_format: None,
            modalities: None,
        }
    }

    pub fn system(mut self, prompt: impl Into<String>) -> Self {
        self.messages.push(Message {
            role: "system",
            content: MessageContent::Text(prompt.into()),
        });
        self
    }

    pub fn user_text(mut self, text: impl Into<String>) -> Self {
        self.messages.push(Message {
            role: "user",
            content: MessageContent::Text(text.into()),
        });
        self
    }

    /// User turn carrying one image (plus optional text) as content parts.
    pub fn user_image(mut self, text: Option<String>, image_url: String) -> Self {
        let mut parts = Vec::with_capacity(2);
        if let Some(text) = text {
            parts.push(ContentPart::Text { text });
        }
        parts.push(ContentPart::ImageUrl {
            image_url: ImageUrlContent { url: image_url },
        });
        self.messages.push(Message {
            role: "user",
            content: MessageContent::Parts(parts),
        });
        self
    }

    pub fn json_object(mut self) -> Self {
        self.response_format = Some(ResponseFormat {
            r#type: "json_object",
        });
        self
    }

    pub fn image_output(mut self) -> Self {
        self.modalities = Some(vec!["image", "text"]);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    pub r#type: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrlContent },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageUrlContent {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
    pub model: Option<String>,
}

impl ChatResponse {
    pub fn first_message(&self) -> Option<&ResponseMessage> {
        self.choices.first().map(|choice| &choice.message)
    }
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
    #[serde(default)]
    pub images: Vec<ResponseImage>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseImage {
    pub image_url: ImageUrlContent,
}
