use crate::generate::CandidateImage;
use crate::judge::{SwipeStats, Verdict, aggregate};
use crate::media::ImageData;
use crate::suggest::Suggestion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a round is in its lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoundPhase {
    Empty,
    ImageSet,
    Evaluated,
    Suggested,
    Generated,
    Closed,
}

/// One evaluate → combine → generate cycle on a single source image.
///
/// Only [`crate::round::RoundStateMachine`] can change a round; everything
/// else sees it read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub(super) number: u32,
    pub(super) source_image: Option<ImageData>,
    pub(super) verdicts: Vec<Verdict>,
    pub(super) suggestion: Option<Suggestion>,
    pub(super) candidates: Vec<CandidateImage>,
    pub(super) phase: RoundPhase,
    pub(super) created_at: DateTime<Utc>,
}

impl Round {
    pub(super) fn open(number: u32, source_image: Option<ImageData>) -> Self {
        let phase = if source_image.is_some() {
            RoundPhase::ImageSet
        } else {
            RoundPhase::Empty
        };
        Self {
            number,
            source_image,
            verdicts: Vec::new(),
            suggestion: None,
            candidates: Vec::new(),
            phase,
            created_at: Utc::now(),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn source_image(&self) -> Option<&ImageData> {
        self.source_image.as_ref()
    }

    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    pub fn verdict_for(&self, persona_id: &str) -> Option<&Verdict> {
        self.verdicts.iter().find(|v| v.persona_id == persona_id)
    }

    pub fn swipe_stats(&self) -> SwipeStats {
        aggregate(&self.verdicts)
    }

    pub fn suggestion(&self) -> Option<&Suggestion> {
        self.suggestion.as_ref()
    }

    pub fn candidates(&self) -> &[CandidateImage] {
        &self.candidates
    }

    /// Working phase. Archived rounds keep the phase they had when closed;
    /// ask the ledger for their lifecycle phase.
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Serializable view of a round for reports.
#[derive(Debug, Clone, Serialize)]
pub struct RoundSummary {
    pub round: u32,
    pub phase: RoundPhase,
    pub source_media_type: Option<String>,
    pub stats: SwipeStats,
    pub approval_percent: Option<u8>,
    pub verdicts: Vec<Verdict>,
    pub suggestion: Option<Suggestion>,
    pub candidates: Vec<CandidateImage>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl RoundSummary {
    pub fn new(round: &Round, phase: RoundPhase, archived_at: Option<DateTime<Utc>>) -> Self {
        let stats = round.swipe_stats();
        Self {
            round: round.number,
            phase,
            source_media_type: round.source_image.as_ref().map(|i| i.media_type().to_string()),
            stats,
            approval_percent: stats.approval_percent(),
            verdicts: round.verdicts.clone(),
            suggestion: round.suggestion.clone(),
            candidates: round.candidates.clone(),
            created_at: round.created_at,
            archived_at,
        }
    }
}
