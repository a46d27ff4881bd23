//! Domain-level error type used across the state machine and the registry.
//!
//! This error type is transport-agnostic. The collaborator that owns the
//! wire protocol maps `DomainError::code()` onto its own status scheme.

use thiserror::Error;

use super::error_code::ErrorCode;

/// Why a move or a card token was rejected.
///
/// Rejections never mutate match state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ValidationKind {
    PhaseMismatch,
    NotAMember,
    NotAttacker,
    NotDefender,
    CardNotInHand,
    TableNotEmpty,
    TableEmpty,
    AttackNotFound,
    AlreadyDefended,
    CannotBeat,
    ThrowInNotAllowed,
    RankNotOnTable,
    DefenderCapacity,
    UndefendedCards,
    ParseCard,
    Other(String),
}

/// Registry conflicts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ConflictKind {
    AlreadyInMatch,
    MatchFull,
    MatchStarted,
    MatchIdExhausted,
}

/// Missing resource in registry terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NotFoundKind {
    Player,
    Match,
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Move precondition or input validation failure
    #[error("validation error {0:?}: {1}")]
    Validation(ValidationKind, String),
    /// Registry conflict
    #[error("conflict {0:?}: {1}")]
    Conflict(ConflictKind, String),
    /// Missing player or match
    #[error("not found {0:?}: {1}")]
    NotFound(NotFoundKind, String),
}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn validation_other(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::Validation(ValidationKind::Other(detail.clone()), detail)
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }

    /// Stable failure kind for the transport layer.
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation(kind, _) => match kind {
                ValidationKind::PhaseMismatch => ErrorCode::PhaseMismatch,
                ValidationKind::NotAMember => ErrorCode::NotAMember,
                ValidationKind::NotAttacker => ErrorCode::NotAttacker,
                ValidationKind::NotDefender => ErrorCode::NotDefender,
                ValidationKind::CardNotInHand => ErrorCode::CardNotInHand,
                ValidationKind::TableNotEmpty => ErrorCode::TableNotEmpty,
                ValidationKind::TableEmpty => ErrorCode::TableEmpty,
                ValidationKind::AttackNotFound => ErrorCode::AttackNotFound,
                ValidationKind::AlreadyDefended => ErrorCode::AlreadyDefended,
                ValidationKind::CannotBeat => ErrorCode::CannotBeat,
                ValidationKind::ThrowInNotAllowed => ErrorCode::ThrowInNotAllowed,
                ValidationKind::RankNotOnTable => ErrorCode::RankNotOnTable,
                ValidationKind::DefenderCapacity => ErrorCode::DefenderCapacity,
                ValidationKind::UndefendedCards => ErrorCode::UndefendedCards,
                ValidationKind::ParseCard => ErrorCode::ParseCard,
                ValidationKind::Other(_) => ErrorCode::ValidationError,
            },
            DomainError::Conflict(kind, _) => match kind {
                ConflictKind::AlreadyInMatch => ErrorCode::AlreadyInMatch,
                ConflictKind::MatchFull => ErrorCode::MatchFull,
                ConflictKind::MatchStarted => ErrorCode::MatchStarted,
                ConflictKind::MatchIdExhausted => ErrorCode::MatchIdExhausted,
            },
            DomainError::NotFound(kind, _) => match kind {
                NotFoundKind::Player => ErrorCode::PlayerNotFound,
                NotFoundKind::Match => ErrorCode::MatchNotFound,
            },
        }
    }

    /// True for move rejections (as opposed to registry failures).
    pub fn is_rejection(&self) -> bool {
        matches!(self, DomainError::Validation(..))
    }
}
