use super::ledger::RoundLedger;
use super::ticket::{Delivery, Operation, RoundTicket};
use super::types::{Round, RoundPhase};
use crate::config::{MAX_GENERATE_COUNT, MIN_GENERATE_COUNT};
use crate::error::{EngineError, Result};
use crate::generate::CandidateImage;
use crate::judge::{SwipeStats, Verdict};
use crate::media::ImageData;
use crate::suggest::Suggestion;
use std::collections::{HashMap, HashSet};

/// Sole owner of the round ledger.
///
/// Every transition validates first and mutates second, so a rejected call
/// leaves the ledger exactly as it was.
#[derive(Debug, Default)]
pub struct RoundStateMachine {
    ledger: RoundLedger,
    epoch: u64,
    in_flight: HashMap<Operation, RoundTicket>,
}

impl RoundStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &RoundLedger {
        &self.ledger
    }

    pub fn current(&self) -> &Round {
        self.ledger.current()
    }

    pub fn phase(&self) -> RoundPhase {
        self.ledger.current().phase
    }

    fn ensure_phase(&self, allowed: &[RoundPhase], action: &'static str) -> Result<()> {
        let phase = self.phase();
        if allowed.contains(&phase) {
            Ok(())
        } else {
            Err(EngineError::State { phase, action })
        }
    }

    // ── Transitions ─────────────────────────────────────────────────────

    /// Replace the current round's image, discarding everything derived
    /// from the previous one. History is untouched.
    pub fn set_image(&mut self, image: ImageData) {
        self.epoch += 1;
        let round = self.ledger.current_mut();
        round.source_image = Some(image);
        round.verdicts.clear();
        round.suggestion = None;
        round.candidates.clear();
        round.phase = RoundPhase::ImageSet;
        tracing::info!(round = round.number, epoch = self.epoch, "source image set");
    }

    /// Store a fresh evaluation, replacing any earlier one for this round.
    pub fn record_verdicts(&mut self, verdicts: Vec<Verdict>) -> Result<SwipeStats> {
        self.ensure_phase(
            &[RoundPhase::ImageSet, RoundPhase::Evaluated],
            "record verdicts",
        )?;
        let mut seen = HashSet::with_capacity(verdicts.len());
        if let Some(dup) = verdicts.iter().find(|v| !seen.insert(v.persona_id.as_str())) {
            return Err(EngineError::Validation(format!(
                "duplicate verdict for persona {}",
                dup.persona_id
            )));
        }

        self.epoch += 1;
        let round = self.ledger.current_mut();
        round.verdicts = verdicts;
        round.phase = RoundPhase::Evaluated;
        let stats = round.swipe_stats();
        tracing::info!(
            round = round.number,
            yes = stats.yes_count,
            total = stats.total_count,
            "verdicts recorded"
        );
        Ok(stats)
    }

    pub fn record_suggestion(&mut self, suggestion: Suggestion) -> Result<()> {
        self.ensure_phase(
            &[RoundPhase::Evaluated, RoundPhase::Suggested],
            "record a suggestion",
        )?;
        if self.current().verdicts.is_empty() {
            return Err(EngineError::Precondition(
                "a suggestion needs at least one verdict".into(),
            ));
        }
        if suggestion.directive.trim().is_empty() {
            return Err(EngineError::Validation("suggestion directive is empty".into()));
        }

        self.epoch += 1;
        let round = self.ledger.current_mut();
        round.suggestion = Some(suggestion);
        round.phase = RoundPhase::Suggested;
        tracing::info!(round = round.number, "suggestion recorded");
        Ok(())
    }

    pub fn record_candidates(&mut self, candidates: Vec<CandidateImage>) -> Result<()> {
        self.ensure_phase(
            &[RoundPhase::Suggested, RoundPhase::Generated],
            "record candidates",
        )?;
        if self.current().suggestion.is_none() {
            return Err(EngineError::Precondition(
                "candidates need a suggestion".into(),
            ));
        }
        let range = usize::from(MIN_GENERATE_COUNT)..=usize::from(MAX_GENERATE_COUNT);
        if !range.contains(&candidates.len()) {
            return Err(EngineError::Validation(format!(
                "expected {MIN_GENERATE_COUNT}..={MAX_GENERATE_COUNT} candidates, got {}",
                candidates.len()
            )));
        }

        self.epoch += 1;
        let round = self.ledger.current_mut();
        round.candidates = candidates;
        round.phase = RoundPhase::Generated;
        tracing::info!(round = round.number, count = round.candidates.len(), "candidates recorded");
        Ok(())
    }

    /// Close the current round as-is and open the next one on `image`.
    /// Any round that has a source image can be closed.
    pub fn select_candidate(&mut self, image: ImageData) -> Result<&Round> {
        self.ensure_phase(
            &[
                RoundPhase::ImageSet,
                RoundPhase::Evaluated,
                RoundPhase::Suggested,
                RoundPhase::Generated,
            ],
            "select a candidate",
        )?;

        let closed = self.current().number;
        let next = closed + 1;
        self.ledger.archive_and_open(Round::open(next, Some(image)));
        self.in_flight.clear();
        tracing::info!(closed, round = next, "round closed; next round opened");
        Ok(self.ledger.current())
    }

    // ── In-flight tracking ──────────────────────────────────────────────

    /// Ticket for the round state as it is right now.
    pub fn ticket(&self) -> RoundTicket {
        RoundTicket {
            round: self.current().number,
            epoch: self.epoch,
        }
    }

    pub fn is_current(&self, ticket: RoundTicket) -> bool {
        ticket == self.ticket()
    }

    pub fn is_in_flight(&self, operation: Operation) -> bool {
        self.in_flight
            .get(&operation)
            .is_some_and(|ticket| self.is_current(*ticket))
    }

    /// Whether the current phase lets `operation` record its result.
    pub fn check_ready(&self, operation: Operation) -> Result<()> {
        if self.phase() == RoundPhase::Empty {
            return Err(EngineError::Precondition("no source image yet".into()));
        }
        match operation {
            Operation::Evaluate => {
                self.ensure_phase(&[RoundPhase::ImageSet, RoundPhase::Evaluated], "evaluate")
            }
            Operation::Combine => {
                self.ensure_phase(&[RoundPhase::Evaluated, RoundPhase::Suggested], "combine")?;
                if self.current().verdicts.is_empty() {
                    return Err(EngineError::Precondition(
                        "cannot combine a round without verdicts".into(),
                    ));
                }
                Ok(())
            }
            Operation::Generate => {
                self.ensure_phase(&[RoundPhase::Suggested, RoundPhase::Generated], "generate")
            }
        }
    }

    /// Mark `operation` as running against the current round.
    ///
    /// Rejects a second call of the same kind while the first one still
    /// targets the current round. A call whose ticket went stale does not
    /// block a new one.
    pub fn begin(&mut self, operation: Operation) -> Result<RoundTicket> {
        self.check_ready(operation)?;
        if self.is_in_flight(operation) {
            return Err(EngineError::State {
                phase: self.phase(),
                action: operation.busy_action(),
            });
        }
        let ticket = self.ticket();
        self.in_flight.insert(operation, ticket);
        tracing::debug!(%operation, round = ticket.round, epoch = ticket.epoch, "operation started");
        Ok(ticket)
    }

    /// Hand a finished call back. `apply` runs only if the round is still in
    /// the state the call was started against; otherwise the result is
    /// dropped and `Delivery::Stale` is returned.
    pub fn settle<T>(
        &mut self,
        operation: Operation,
        ticket: RoundTicket,
        apply: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Delivery<T>> {
        if self.in_flight.get(&operation) == Some(&ticket) {
            self.in_flight.remove(&operation);
        }
        if !self.is_current(ticket) {
            tracing::debug!(
                %operation,
                round = ticket.round,
                epoch = ticket.epoch,
                "discarding stale result"
            );
            return Ok(Delivery::Stale);
        }
        apply(self).map(Delivery::Applied)
    }
}
