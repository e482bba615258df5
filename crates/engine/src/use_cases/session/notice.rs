//! User-facing notices.
//!
//! Every failed session operation ends up as a notice; none of them ends
//! the session.

use std::fmt;

use crate::infrastructure::ports::DataError;
use crate::use_cases::known_spells::LedgerError;

use super::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warn"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

impl From<&DataError> for Notice {
    fn from(error: &DataError) -> Self {
        if error.is_not_found() {
            Notice::warning(error.to_string())
        } else {
            Notice::error(error.to_string())
        }
    }
}

impl From<&SessionError> for Notice {
    fn from(error: &SessionError) -> Self {
        match error {
            SessionError::Data(e) | SessionError::Ledger(LedgerError::Data(e)) => Notice::from(e),
            other => Notice::warning(other.to_string()),
        }
    }
}

impl From<SessionError> for Notice {
    fn from(error: SessionError) -> Self {
        Notice::from(&error)
    }
}
