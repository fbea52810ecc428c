// error.rs
// Typed error surface. Every failure carries a machine-matchable kind plus the
// user-visible text rendered from the message catalog at construction time.

use thiserror::Error;

use crate::messages;

/// The distinct failure kinds the engine and codec can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EmptySecret,
    InvalidSecretLength,
    InvalidSecretCharacters,
    InvalidCodeFormat,
    UnsupportedAlgorithm,
    InvalidDigits,
    InvalidPeriod,
    DiscrepancyOutOfRange,
    InvalidBase32Character,
    SecretGenerationFailed,
}

impl ErrorKind {
    /// Message catalog key holding this kind's default text.
    pub(crate) fn message_key(self) -> &'static str {
        match self {
            Self::EmptySecret => "validation.secret_empty",
            Self::InvalidSecretLength => "validation.secret_length",
            Self::InvalidSecretCharacters => "validation.secret_characters",
            Self::InvalidCodeFormat => "validation.code_format",
            Self::UnsupportedAlgorithm => "configuration.unsupported_algorithm",
            Self::InvalidDigits => "configuration.invalid_digits",
            Self::InvalidPeriod => "configuration.invalid_period",
            Self::DiscrepancyOutOfRange => "configuration.invalid_discrepancy",
            Self::InvalidBase32Character => "encoding.invalid_base32_char",
            Self::SecretGenerationFailed => "security.secret_generation_failed",
        }
    }
}

/// Error returned by all fallible codec and engine operations.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TotpError {
    kind: ErrorKind,
    message: String,
}

impl TotpError {
    /// Builds an error whose text has no placeholders.
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: messages::get(kind.message_key(), &[]),
        }
    }

    /// Builds an error with pre-rendered message text.
    pub(crate) fn with_args(kind: ErrorKind, message: String) -> Self {
        Self { kind, message }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}
