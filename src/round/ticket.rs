use serde::Serialize;

/// Identifies the round state a slow backing call was started against.
///
/// `epoch` advances on every change to the current round (new image, new
/// verdicts, suggestion or candidates), so a ticket goes stale as soon as the
/// inputs its call was computed from are replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RoundTicket {
    pub round: u32,
    pub epoch: u64,
}

/// Backing calls that may be in flight against the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Evaluate,
    Combine,
    Generate,
}

impl Operation {
    pub(super) fn busy_action(self) -> &'static str {
        match self {
            Self::Evaluate => "start a second concurrent evaluation",
            Self::Combine => "start a second concurrent combine",
            Self::Generate => "start a second concurrent generation",
        }
    }
}

/// Outcome of handing a finished call's result back to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Delivery<T> {
    /// The result was recorded on the round it was computed for.
    Applied(T),
    /// The round moved on while the call was running; the result was dropped.
    Stale,
}

impl<T> Delivery<T> {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Stale => None,
        }
    }
}
