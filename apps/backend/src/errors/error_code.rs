//! Error codes for the durak engine.
//!
//! This module defines every failure kind the core reports.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE. The transport layer decides how
//! they map onto its own protocol.

use core::fmt;

use serde::{Serialize, Serializer};

/// Centralized error codes for the durak engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Move rejections
    /// Match is not in the phase this move needs
    PhaseMismatch,
    /// Player does not belong to the match
    NotAMember,
    /// Only the attacker may do this
    NotAttacker,
    /// Only the defender may do this
    NotDefender,
    /// Card not in hand
    CardNotInHand,
    /// Opening attack needs an empty table
    TableNotEmpty,
    /// Nothing on the table
    TableEmpty,
    /// No undefended pair with that attack card
    AttackNotFound,
    /// Pair already covered
    AlreadyDefended,
    /// Defense card does not beat the attack card
    CannotBeat,
    /// Throw-in window closed
    ThrowInNotAllowed,
    /// Thrown card's rank is not on the table
    RankNotOnTable,
    /// Defender holds too few cards for another throw-in
    DefenderCapacity,
    /// Some table pairs are still undefended
    UndefendedCards,
    /// Parse card error
    ParseCard,
    /// General validation error
    ValidationError,

    // Resource Not Found
    /// Player is not registered in any match
    PlayerNotFound,
    /// Match not found
    MatchNotFound,

    // Registry Conflicts
    /// Player already belongs to a match
    AlreadyInMatch,
    /// Match already has two players
    MatchFull,
    /// Match is no longer accepting players
    MatchStarted,
    /// No free match id could be allocated
    MatchIdExhausted,

    // System Errors
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Every code, in declaration order.
    pub const ALL: [ErrorCode; 23] = [
        Self::PhaseMismatch,
        Self::NotAMember,
        Self::NotAttacker,
        Self::NotDefender,
        Self::CardNotInHand,
        Self::TableNotEmpty,
        Self::TableEmpty,
        Self::AttackNotFound,
        Self::AlreadyDefended,
        Self::CannotBeat,
        Self::ThrowInNotAllowed,
        Self::RankNotOnTable,
        Self::DefenderCapacity,
        Self::UndefendedCards,
        Self::ParseCard,
        Self::ValidationError,
        Self::PlayerNotFound,
        Self::MatchNotFound,
        Self::AlreadyInMatch,
        Self::MatchFull,
        Self::MatchStarted,
        Self::MatchIdExhausted,
        Self::ConfigError,
    ];

    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Move rejections
            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::NotAMember => "NOT_A_MEMBER",
            Self::NotAttacker => "NOT_ATTACKER",
            Self::NotDefender => "NOT_DEFENDER",
            Self::CardNotInHand => "CARD_NOT_IN_HAND",
            Self::TableNotEmpty => "TABLE_NOT_EMPTY",
            Self::TableEmpty => "TABLE_EMPTY",
            Self::AttackNotFound => "ATTACK_NOT_FOUND",
            Self::AlreadyDefended => "ALREADY_DEFENDED",
            Self::CannotBeat => "CANNOT_BEAT",
            Self::ThrowInNotAllowed => "THROW_IN_NOT_ALLOWED",
            Self::RankNotOnTable => "RANK_NOT_ON_TABLE",
            Self::DefenderCapacity => "DEFENDER_CAPACITY",
            Self::UndefendedCards => "UNDEFENDED_CARDS",
            Self::ParseCard => "PARSE_CARD",
            Self::ValidationError => "VALIDATION_ERROR",

            // Resource Not Found
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::MatchNotFound => "MATCH_NOT_FOUND",

            // Registry Conflicts
            Self::AlreadyInMatch => "ALREADY_IN_MATCH",
            Self::MatchFull => "MATCH_FULL",
            Self::MatchStarted => "MATCH_STARTED",
            Self::MatchIdExhausted => "MATCH_ID_EXHAUSTED",

            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
