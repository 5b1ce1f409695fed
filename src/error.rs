use thiserror::Error;

use crate::round::RoundPhase;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error taxonomy for `judgeloop`.
///
/// Component boundaries (registry, orchestrator, combiner, requester, state
/// machine) return these so callers can decide how to surface a failure.
/// The `llm` client reports [`crate::llm::LlmError`], which adapters map into
/// `Service` / `Transport` at the boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    // ── Bad user input ──────────────────────────────────────────────────
    #[error("validation failed: {0}")]
    Validation(String),

    // ── Missing prior artifact ──────────────────────────────────────────
    #[error("precondition not met: {0}")]
    Precondition(String),

    // ── Illegal round transition ────────────────────────────────────────
    #[error("cannot {action} while round is {phase}")]
    State {
        phase: RoundPhase,
        action: &'static str,
    },

    // ── Backing service answered with unusable content ──────────────────
    #[error("{service} service returned unusable content: {message}")]
    Service {
        service: ServiceKind,
        message: String,
    },

    // ── Network / timeout on a backing call ─────────────────────────────
    #[error("{service} service unreachable: {message}")]
    Transport {
        service: ServiceKind,
        message: String,
    },

    // ── Config ──────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Which backing service an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ServiceKind {
    Judge,
    Combiner,
    Generator,
}

impl EngineError {
    pub fn service(service: ServiceKind, message: impl Into<String>) -> Self {
        Self::Service {
            service,
            message: message.into(),
        }
    }

    pub fn transport(service: ServiceKind, message: impl Into<String>) -> Self {
        Self::Transport {
            service,
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_service(&self) -> bool {
        matches!(self, Self::Service { .. })
    }

    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Short label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Precondition(_) => "precondition",
            Self::State { .. } => "state",
            Self::Service { .. } => "service",
            Self::Transport { .. } => "transport",
            Self::Config(_) => "config",
            Self::Other(_) => "other",
        }
    }
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
