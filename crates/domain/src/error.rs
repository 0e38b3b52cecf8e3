//! Unified error types for the domain layer
//!
//! Covers the precondition failures of the narrative rules. Recoverable
//! generator failures live in the engine, not here.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No choice pattern is registered for the (type, value) pair
    #[error("Unknown choice pattern: {choice_type}.{choice_value}")]
    UnknownChoicePattern {
        choice_type: String,
        choice_value: String,
    },

    /// Discovery level is not one of surface, medium or deep
    #[error("Invalid discovery level: {0}")]
    InvalidDiscoveryLevel(String),

    /// The character has no resolved background to pick a contact template for
    #[error("No message template for background: {0}")]
    UnknownBackgroundTemplate(String),

    /// Stage transition not permitted by the stage chain
    #[error("Invalid stage transition: {from} -> {to}")]
    InvalidStageTransition { from: String, to: String },

    /// Parse error (for closed enumerations)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Create an unknown choice pattern error
    pub fn unknown_choice_pattern(
        choice_type: impl Into<String>,
        choice_value: impl Into<String>,
    ) -> Self {
        Self::UnknownChoicePattern {
            choice_type: choice_type.into(),
            choice_value: choice_value.into(),
        }
    }

    /// Create an invalid discovery level error
    pub fn invalid_discovery_level(level: impl Into<String>) -> Self {
        Self::InvalidDiscoveryLevel(level.into())
    }

    /// Create an unknown background template error
    pub fn unknown_background_template(background: impl Into<String>) -> Self {
        Self::UnknownBackgroundTemplate(background.into())
    }

    /// Create an invalid stage transition error
    pub fn invalid_stage_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidStageTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Use this in `FromStr` implementations when the input string
    /// doesn't match any known variant.
    ///
    /// # Example
    /// ```ignore
    /// impl FromStr for Region {
    ///     type Err = DomainError;
    ///     fn from_str(s: &str) -> Result<Self, Self::Err> {
    ///         match s {
    ///             "Valoria" => Ok(Self::Valoria),
    ///             _ => Err(DomainError::parse(format!("Unknown region: {}", s))),
    ///         }
    ///     }
    /// }
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
