pub mod combiner;
pub mod openrouter;

pub use combiner::{CombineService, FeedbackEntry, SuggestionCombiner};
pub use openrouter::OpenRouterCombiner;

use serde::{Deserialize, Serialize};

/// What the photo owner wants more of.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GoalDirection {
    /// Seek approval (right swipes).
    #[default]
    Maximize,
    /// Seek rejection (left swipes).
    Minimize,
}

impl GoalDirection {
    pub fn swipe_word(self) -> &'static str {
        match self {
            Self::Maximize => "right",
            Self::Minimize => "left",
        }
    }
}

/// Consolidated improvement directive for one round.
///
/// Plain-text answers are the degenerate case with no analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    pub directive: String,
}

impl Suggestion {
    pub fn new(analysis: Option<String>, directive: impl Into<String>) -> Self {
        Self {
            analysis: analysis.filter(|a| !a.trim().is_empty()),
            directive: directive.into(),
        }
    }

    pub fn plain(directive: impl Into<String>) -> Self {
        Self::new(None, directive)
    }
}
