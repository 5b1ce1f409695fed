use super::types::{Round, RoundPhase, RoundSummary};
use chrono::{DateTime, Utc};

/// A closed round and when it was closed.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivedRound {
    round: Round,
    archived_at: DateTime<Utc>,
}

impl ArchivedRound {
    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn archived_at(&self) -> DateTime<Utc> {
        self.archived_at
    }
}

/// Append-only history of closed rounds plus the single open one.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundLedger {
    history: Vec<ArchivedRound>,
    current: Round,
}

impl Default for RoundLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundLedger {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            current: Round::open(1, None),
        }
    }

    pub fn current(&self) -> &Round {
        &self.current
    }

    pub(super) fn current_mut(&mut self) -> &mut Round {
        &mut self.current
    }

    pub fn history(&self) -> &[ArchivedRound] {
        &self.history
    }

    /// Every round, oldest first, ending with the current one.
    pub fn rounds(&self) -> impl Iterator<Item = &Round> {
        self.history
            .iter()
            .map(|archived| &archived.round)
            .chain(std::iter::once(&self.current))
    }

    pub fn get(&self, number: u32) -> Option<&Round> {
        self.rounds().find(|round| round.number == number)
    }

    /// Lifecycle phase of a round: `Closed` once archived.
    pub fn phase_of(&self, number: u32) -> Option<RoundPhase> {
        if self.current.number == number {
            Some(self.current.phase)
        } else {
            self.history
                .iter()
                .any(|archived| archived.round.number == number)
                .then_some(RoundPhase::Closed)
        }
    }

    pub fn summaries(&self) -> Vec<RoundSummary> {
        self.history
            .iter()
            .map(|a| RoundSummary::new(&a.round, RoundPhase::Closed, Some(a.archived_at)))
            .chain(std::iter::once(RoundSummary::new(
                &self.current,
                self.current.phase,
                None,
            )))
            .collect()
    }

    /// Freeze the current round into history and open `next` in its place.
    pub(super) fn archive_and_open(&mut self, next: Round) {
        let closed = std::mem::replace(&mut self.current, next);
        self.history.push(ArchivedRound {
            round: closed,
            archived_at: Utc::now(),
        });
    }
}
