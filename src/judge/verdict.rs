use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Swipe {
    Right,
    Left,
}

impl Swipe {
    /// Lenient parse of a judge's swipe field. Unknown words yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "right" | "swipe right" => Some(Self::Right),
            "left" | "swipe left" => Some(Self::Left),
            _ => None,
        }
    }
}

/// Optional structured breakdown a judge may return alongside its text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictDetails {
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub likes: String,
    #[serde(default)]
    pub dislikes: String,
    #[serde(default)]
    pub keep: String,
    #[serde(default)]
    pub change: String,
}

impl VerdictDetails {
    pub fn is_empty(&self) -> bool {
        [
            &self.reasoning,
            &self.likes,
            &self.dislikes,
            &self.keep,
            &self.change,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }

    /// `Reason:` / `Likes:` / ... lines in a fixed order, empty fields skipped.
    pub fn summary(&self) -> String {
        [
            ("Reason", &self.reasoning),
            ("Likes", &self.likes),
            ("Dislikes", &self.dislikes),
            ("Keep", &self.keep),
            ("Change", &self.change),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(label, value)| format!("{label}: {}", value.trim()))
        .collect::<Vec<_>>()
        .join("\n")
    }
}

/// What a judge service sends back for one (image, persona) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeReply {
    pub swipe: Option<Swipe>,
    pub content: String,
    pub details: Option<VerdictDetails>,
}

/// One judge's decision on one image. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub persona_id: String,
    pub verdict_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<VerdictDetails>,
    pub swipe_right: bool,
}

impl Verdict {
    /// Build a verdict from a service reply.
    ///
    /// The explicit swipe field is authoritative. Without it the verdict is a
    /// left swipe, unless `infer_from_text` enables the legacy rule of
    /// treating content that mentions "yes" or "swipe right" as a right swipe.
    pub fn from_reply(persona_id: impl Into<String>, reply: JudgeReply, infer_from_text: bool) -> Self {
        let swipe_right = match reply.swipe {
            Some(swipe) => swipe == Swipe::Right,
            None if infer_from_text => {
                let lower = reply.content.to_lowercase();
                lower.contains("yes") || lower.contains("swipe right")
            }
            None => false,
        };
        Self {
            persona_id: persona_id.into(),
            verdict_text: reply.content,
            details: reply.details.filter(|d| !d.is_empty()),
            swipe_right,
        }
    }
}
