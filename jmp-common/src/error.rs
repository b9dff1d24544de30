//! Error handling for the JMP macro processor
//! 
//! Every error is fatal: the processor stops at the first one and the
//! driver turns it into an [`ExitStatus`].

use crate::status::ExitStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JmpError>;

/// Main error type covering the command line and all processing stages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JmpError {
    #[error("Invalid parameters: {message}")]
    Params { message: String },

    #[error("Input error: {message}")]
    Input { message: String },

    #[error("Output error: {message}")]
    Output { message: String },

    /// Malformed token shape: bad character after `@`, stray `}` or `$`,
    /// unterminated block, malformed argument list.
    #[error("Syntax error: {message}")]
    Syntax { message: String },

    /// Lookup and consistency failures: unknown macro, input ending inside
    /// a construct, duplicate argument, invalid `@set` payload.
    #[error("Semantic error: {message}")]
    Semantics { message: String },

    /// Rebinding a protected macro, or any rebinding while redefinition
    /// is forbidden.
    #[error("Redefinition error: {message}")]
    Redefinition { message: String },
}

impl JmpError {
    pub fn params(message: impl Into<String>) -> Self {
        JmpError::Params { message: message.into() }
    }

    pub fn input(message: impl Into<String>) -> Self {
        JmpError::Input { message: message.into() }
    }

    pub fn output(message: impl Into<String>) -> Self {
        JmpError::Output { message: message.into() }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        JmpError::Syntax { message: message.into() }
    }

    pub fn semantics(message: impl Into<String>) -> Self {
        JmpError::Semantics { message: message.into() }
    }

    pub fn redefinition(message: impl Into<String>) -> Self {
        JmpError::Redefinition { message: message.into() }
    }

    /// Status code the driver exits with for this error
    pub fn status(&self) -> ExitStatus {
        match self {
            JmpError::Params { .. } => ExitStatus::Params,
            JmpError::Input { .. } => ExitStatus::InputOpen,
            JmpError::Output { .. } => ExitStatus::OutputOpen,
            JmpError::Syntax { .. } => ExitStatus::Syntax,
            JmpError::Semantics { .. } => ExitStatus::Semantics,
            JmpError::Redefinition { .. } => ExitStatus::Redefinition,
        }
    }
}
