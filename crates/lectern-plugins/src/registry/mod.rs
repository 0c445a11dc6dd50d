//! Plugin registry for externally supplied assessments and message handlers.
//!
//! The [`PluginRegistry`] stores registrations under the key
//! `"<pluginName>-<name>"`, so two plugins can use the same short name without
//! colliding. Registering the same key twice replaces the earlier entry while
//! keeping its position, which keeps pipeline rule order stable.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::assessment::{Assessment, MessageHandler};
use crate::error::{Parameter, RegistrationAction, RegistrationError};

/// Tracing target for registry operations.
const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Builds the registry key for a plugin-scoped name.
///
/// # Example
///
/// ```
/// assert_eq!(lectern_plugins::registration_key("seo-pack", "links"), "seo-pack-links");
/// ```
#[must_use]
pub fn registration_key(plugin_name: &str, name: &str) -> String {
    format!("{plugin_name}-{name}")
}

/// Registry of plugin assessments and message handlers.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use lectern_plugins::{AssessmentError, AssessmentResult, Paper, PluginRegistry};
///
/// let mut registry = PluginRegistry::new();
/// let rule = |_: &Paper| Ok::<_, AssessmentError>(AssessmentResult::new(9, "great"));
/// let key = registry
///     .register_assessment("links", Arc::new(rule), "seo-pack")
///     .expect("registration succeeds");
/// assert_eq!(key, "seo-pack-links");
/// assert!(registry.assessment("seo-pack-links").is_some());
/// ```
#[derive(Clone, Default)]
pub struct PluginRegistry {
    assessments: Vec<(String, Arc<dyn Assessment>)>,
    handlers: HashMap<String, Arc<dyn MessageHandler>>,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        handlers.sort_unstable();
        f.debug_struct("PluginRegistry")
            .field(
                "assessments",
                &self
                    .assessments
                    .iter()
                    .map(|(key, _)| key.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("handlers", &handlers)
            .finish()
    }
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an assessment and returns its registry key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidArgument`] if `name` or
    /// `plugin_name` is blank.
    pub fn register_assessment(
        &mut self,
        name: &str,
        assessment: Arc<dyn Assessment>,
        plugin_name: &str,
    ) -> Result<String, RegistrationError> {
        validate(RegistrationAction::RegisterAssessment, name, plugin_name)?;
        let key = registration_key(plugin_name, name);
        match self
            .assessments
            .iter_mut()
            .find(|(existing, _)| *existing == key)
        {
            Some(entry) => entry.1 = assessment,
            None => self.assessments.push((key.clone(), assessment)),
        }
        debug!(target: REGISTRY_TARGET, key = key.as_str(), "assessment registered");
        Ok(key)
    }

    /// Registers a custom message handler and returns its registry key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidArgument`] if `name` or
    /// `plugin_name` is blank.
    pub fn register_message_handler(
        &mut self,
        name: &str,
        handler: Arc<dyn MessageHandler>,
        plugin_name: &str,
    ) -> Result<String, RegistrationError> {
        validate(RegistrationAction::RegisterMessageHandler, name, plugin_name)?;
        let key = registration_key(plugin_name, name);
        self.handlers.insert(key.clone(), handler);
        debug!(target: REGISTRY_TARGET, key = key.as_str(), "message handler registered");
        Ok(key)
    }

    /// Validates a refresh request and returns the key it refers to.
    ///
    /// The registry itself holds no cached state; callers use the returned
    /// key to invalidate whatever they derived from the assessment.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidArgument`] if `name` or
    /// `plugin_name` is blank.
    pub fn check_refresh(name: &str, plugin_name: &str) -> Result<String, RegistrationError> {
        validate(RegistrationAction::RefreshAssessment, name, plugin_name)?;
        Ok(registration_key(plugin_name, name))
    }

    /// Iterates registered assessments in registration order.
    pub fn assessments(&self) -> impl Iterator<Item = (&str, &Arc<dyn Assessment>)> {
        self.assessments
            .iter()
            .map(|(key, assessment)| (key.as_str(), assessment))
    }

    /// Looks up an assessment by registry key.
    #[must_use]
    pub fn assessment(&self, key: &str) -> Option<&Arc<dyn Assessment>> {
        self.assessments
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, assessment)| assessment)
    }

    /// Looks up a message handler by registry key.
    #[must_use]
    pub fn message_handler(&self, key: &str) -> Option<&Arc<dyn MessageHandler>> {
        self.handlers.get(key)
    }

    /// Returns the number of registered assessments.
    #[must_use]
    pub fn assessment_count(&self) -> usize {
        self.assessments.len()
    }

    /// Returns the number of registered message handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assessments.is_empty() && self.handlers.is_empty()
    }
}

fn validate(
    action: RegistrationAction,
    name: &str,
    plugin_name: &str,
) -> Result<(), RegistrationError> {
    if name.trim().is_empty() {
        return Err(RegistrationError::invalid_argument(
            action,
            Parameter::Name,
            plugin_name,
        ));
    }
    if plugin_name.trim().is_empty() {
        return Err(RegistrationError::invalid_argument(
            action,
            Parameter::PluginName,
            plugin_name,
        ));
    }
    Ok(())
}
