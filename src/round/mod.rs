pub mod ledger;
pub mod machine;
pub mod ticket;
pub mod types;

pub use ledger::{ArchivedRound, RoundLedger};
pub use machine::RoundStateMachine;
pub use ticket::{Delivery, Operation, RoundTicket};
pub use types::{Round, RoundPhase, RoundSummary};
