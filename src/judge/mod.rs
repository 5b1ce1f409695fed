pub mod aggregate;
pub mod openrouter;
pub mod orchestrator;
pub mod service;
pub mod verdict;

pub use aggregate::{SwipeStats, aggregate};
pub use openrouter::OpenRouterJudge;
pub use orchestrator::EvaluationOrchestrator;
pub use service::JudgeService;
pub use verdict::{JudgeReply, Swipe, Verdict, VerdictDetails};
