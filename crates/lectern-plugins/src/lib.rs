//! Plugin-facing types for the lectern analysis host.
//!
//! The `lectern-plugins` crate defines the two narrow interfaces through which
//! the host consumes scoring code it does not own: the [`Paper`] document
//! model and the rule traits ([`Assessment`], [`Research`],
//! [`MessageHandler`]). It also provides the [`PluginRegistry`], the table of
//! rules and handlers that external plugins contribute at runtime.
//!
//! # Architecture
//!
//! The registry is a plain owned value. The host's dispatcher holds exactly
//! one and consults it whenever a scoring pipeline is built or a custom
//! message is routed, so independent hosts in the same process never share
//! registrations.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use lectern_plugins::{AssessmentError, AssessmentResult, Paper, PluginRegistry};
//!
//! let mut registry = PluginRegistry::new();
//! let has_title = |paper: &Paper| {
//!     let score = if paper.title().is_empty() { 3 } else { 9 };
//!     Ok::<_, AssessmentError>(AssessmentResult::new(score, "title check"))
//! };
//! registry
//!     .register_assessment("title", Arc::new(has_title), "basics")
//!     .expect("registration succeeds");
//! assert_eq!(registry.assessment_count(), 1);
//! ```

pub mod assessment;
pub mod document;
pub mod error;
pub mod registry;

#[cfg(test)]
mod tests;

pub use self::assessment::{
    Assessment, AssessmentResult, MAX_RATING, MessageHandler, Research,
};
pub use self::document::{DEFAULT_LOCALE, Paper};
pub use self::error::{
    AssessmentError, HandlerError, Parameter, RegistrationAction, RegistrationError,
    ResearchError,
};
pub use self::registry::{PluginRegistry, registration_key};
