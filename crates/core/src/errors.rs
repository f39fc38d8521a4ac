use thiserror::Error;

use crate::domain::quote::QuoteStatus;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid quote transition from {from:?} to {to:?}")]
    InvalidQuoteTransition { from: QuoteStatus, to: QuoteStatus },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Message safe to surface to the back office; the full error stays in
    /// the logs. Quote saves either succeed or fail as a whole.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "The quote could not be processed. Check inputs and try again.",
            Self::Persistence(_) | Self::Integration(_) => {
                "Saving failed. Please retry in a moment."
            }
            Self::Configuration(_) => "An unexpected internal error occurred.",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError};

    #[test]
    fn domain_error_has_user_safe_message() {
        let error = ApplicationError::from(DomainError::InvariantViolation(
            "line item total mismatch".to_owned(),
        ));

        assert_eq!(
            error.user_message(),
            "The quote could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn persistence_error_suggests_retry() {
        let error = ApplicationError::Persistence("database lock timeout".to_owned());
        assert_eq!(error.user_message(), "Saving failed. Please retry in a moment.");
    }
}
