//! Domain errors raised by plugins and the registration API.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. Registration errors name the
//! offending parameter and the requesting plugin.

use std::fmt;

use thiserror::Error;

/// Parameter of a registration call that failed validation.
///
/// Only the string parameters can be malformed at runtime. The assessment
/// and handler arguments are trait objects, so a missing or non-callable
/// one is a compile error rather than a [`RegistrationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    /// The assessment or handler name.
    Name,
    /// The name of the requesting plugin.
    PluginName,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::PluginName => "pluginName",
        })
    }
}

/// Registration call that was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationAction {
    /// `register_assessment`.
    RegisterAssessment,
    /// `register_message_handler`.
    RegisterMessageHandler,
    /// `refresh_assessment`.
    RefreshAssessment,
}

impl fmt::Display for RegistrationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RegisterAssessment => "register assessment",
            Self::RegisterMessageHandler => "register handler",
            Self::RefreshAssessment => "refresh assessment",
        })
    }
}

/// Errors arising from misuse of the plugin-facing registration API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// An argument did not have the expected shape.
    #[error(
        "failed to {action} for plugin '{plugin}': expected parameter `{parameter}` to be a non-empty string"
    )]
    InvalidArgument {
        /// The rejected call.
        action: RegistrationAction,
        /// The offending parameter.
        parameter: Parameter,
        /// The plugin that made the call, as supplied.
        plugin: String,
    },
}

impl RegistrationError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(
        action: RegistrationAction,
        parameter: Parameter,
        plugin: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            action,
            parameter,
            plugin: plugin.into(),
        }
    }

    /// Returns the parameter that failed validation.
    #[must_use]
    pub fn parameter(&self) -> Parameter {
        match self {
            Self::InvalidArgument { parameter, .. } => *parameter,
        }
    }
}

/// Errors raised by a scoring rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssessmentError {
    /// The rule could not rate the document.
    #[error("assessment failed: {message}")]
    Failed {
        /// Human-readable failure description.
        message: String,
    },
}

impl AssessmentError {
    /// Creates a failure with the given description.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Errors raised by a custom message handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The handler rejected the message data.
    #[error("message handler failed: {message}")]
    Failed {
        /// Human-readable failure description.
        message: String,
    },
}

impl HandlerError {
    /// Creates a failure with the given description.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Errors raised while running a research unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResearchError {
    /// No research name was supplied.
    #[error("a research name is required")]
    MissingName,

    /// No research is registered under the name.
    #[error("research '{name}' is not registered")]
    Unknown {
        /// Requested research name.
        name: String,
    },

    /// The research ran and failed.
    #[error("research '{name}' failed: {message}")]
    Failed {
        /// Research name.
        name: String,
        /// Human-readable failure description.
        message: String,
    },
}

impl ResearchError {
    /// Creates a failure for the named research.
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests;
