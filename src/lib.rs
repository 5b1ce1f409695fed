#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod config;
pub mod error;
pub mod generate;
pub mod judge;
pub mod llm;
pub mod media;
pub mod persona;
pub mod round;
pub mod session;
pub mod suggest;

pub use config::Config;
pub use error::{EngineError, Result, ServiceKind};
pub use generate::CandidateImage;
pub use judge::{SwipeStats, Verdict};
pub use media::ImageData;
pub use persona::{Gender, Persona, PersonaRegistry};
pub use round::{Delivery, Round, RoundLedger, RoundPhase, RoundStateMachine};
pub use session::{Services, Session};
pub use suggest::{GoalDirection, Suggestion};
