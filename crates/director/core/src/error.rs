//! Common error infrastructure for director-core.
//!
//! Domain-specific errors (`ConfigError`, `TransitionError`,
//! `CandidateTableError`) live alongside the types they validate. They only
//! surface while a director is being constructed; once running, every
//! degraded condition resolves to a safe default and is logged instead.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each construction step has its own error type
//! - **Severity Classification**: Errors are categorized for recovery strategies
//! - **No runtime failures**: The control loop never returns an error

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition, retrying on a later tick may succeed.
    ///
    /// Examples: telemetry unavailable, collaborator not yet registered
    Recoverable,

    /// Invalid input that should be fixed before retrying.
    ///
    /// Examples: smoothing factor above 1, empty transition row
    Validation,

    /// Unexpected internal inconsistency that indicates a bug.
    Internal,

    /// The director cannot be constructed at all.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common interface for director errors.
pub trait DirectorError: core::fmt::Debug + core::fmt::Display {
    fn severity(&self) -> ErrorSeverity;

    /// Stable machine-readable code, suitable for log aggregation.
    fn error_code(&self) -> &'static str;

    fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_classification() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_recoverable());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert_eq!(ErrorSeverity::Internal.as_str(), "internal");
    }
}
