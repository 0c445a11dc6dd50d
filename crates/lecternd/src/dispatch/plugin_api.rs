//! Plugin-facing registration API.
//!
//! A [`PluginApi`] borrows the host state a plugin may touch. Every call
//! validates its arguments synchronously and reports misuse as a
//! [`RegistrationError`]; argument errors are never sent over the transport.

use std::sync::Arc;

use lectern_plugins::{Assessment, MessageHandler, Paper, PluginRegistry, RegistrationError};
use tracing::info;

use crate::cache::ResultCache;
use crate::pipeline::Pipelines;

use super::DISPATCH_TARGET;

/// Registration handle lent to plugins and script bundles.
pub struct PluginApi<'a> {
    registry: &'a mut PluginRegistry,
    pipelines: &'a mut Pipelines,
    cache: &'a mut ResultCache,
    document: &'a mut Option<Paper>,
}

impl<'a> PluginApi<'a> {
    pub(crate) fn new(
        registry: &'a mut PluginRegistry,
        pipelines: &'a mut Pipelines,
        cache: &'a mut ResultCache,
        document: &'a mut Option<Paper>,
    ) -> Self {
        Self {
            registry,
            pipelines,
            cache,
            document,
        }
    }

    /// Registers an assessment under `"<plugin_name>-<name>"`.
    ///
    /// Built SEO pipelines that lack the rule receive it immediately, and all
    /// cached results are invalidated so the rule runs on the next analysis
    /// even if the document is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidArgument`] naming the blank
    /// parameter and the plugin.
    pub fn register_assessment(
        &mut self,
        name: &str,
        assessment: Arc<dyn Assessment>,
        plugin_name: &str,
    ) -> Result<bool, RegistrationError> {
        let key = self
            .registry
            .register_assessment(name, Arc::clone(&assessment), plugin_name)?;
        let changed = self.pipelines.add_registered(&key, &assessment);
        info!(target: DISPATCH_TARGET, key = key.as_str(), pipelines = changed, "assessment registered");
        self.refresh();
        Ok(true)
    }

    /// Registers a custom message handler under `"<plugin_name>-<name>"`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidArgument`] naming the blank
    /// parameter and the plugin.
    pub fn register_message_handler(
        &mut self,
        name: &str,
        handler: Arc<dyn MessageHandler>,
        plugin_name: &str,
    ) -> Result<bool, RegistrationError> {
        let key = self
            .registry
            .register_message_handler(name, handler, plugin_name)?;
        info!(target: DISPATCH_TARGET, key = key.as_str(), "message handler registered");
        Ok(true)
    }

    /// Forces full recomputation on the next analysis.
    ///
    /// Used when a plugin's external state changed in a way the document
    /// does not reflect.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidArgument`] naming the blank
    /// parameter and the plugin.
    pub fn refresh_assessment(
        &mut self,
        name: &str,
        plugin_name: &str,
    ) -> Result<bool, RegistrationError> {
        let key = PluginRegistry::check_refresh(name, plugin_name)?;
        info!(target: DISPATCH_TARGET, key = key.as_str(), "assessment refresh requested");
        self.refresh();
        Ok(true)
    }

    fn refresh(&mut self) {
        *self.document = None;
        self.cache.invalidate();
    }
}
