//! Script loading for `loadScript` requests.
//!
//! The host cannot evaluate foreign code, so a "script" is a registration
//! bundle compiled into the binary and addressed by URL. Loading a bundle
//! hands it the [`PluginApi`], exactly as an imported script would receive
//! the registration functions.

use std::collections::BTreeMap;
use std::fmt;

use lectern_plugins::RegistrationError;
use thiserror::Error;

use crate::dispatch::PluginApi;

/// Errors raised while loading a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// No bundle is known under the URL.
    #[error("no script bundle is available at '{url}'")]
    NotFound {
        /// Requested URL.
        url: String,
    },

    /// The bundle called the registration API incorrectly.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// The bundle reported its own failure.
    #[error("script '{url}' failed: {message}")]
    Failed {
        /// Requested URL.
        url: String,
        /// Failure description.
        message: String,
    },
}

/// Resolves and runs scripts.
pub trait ScriptLoader: Send {
    /// Loads the script at `url`, letting it register through `api`.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError`] when the script is unknown or fails.
    fn load(&mut self, url: &str, api: &mut PluginApi<'_>) -> Result<(), ScriptError>;
}

/// Registration function run when a bundle is loaded.
pub type Bundle = Box<dyn Fn(&mut PluginApi<'_>) -> Result<(), ScriptError> + Send>;

/// Loader backed by a table of compiled-in bundles.
#[derive(Default)]
pub struct BundleLoader {
    bundles: BTreeMap<String, Bundle>,
}

impl fmt::Debug for BundleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleLoader")
            .field("urls", &self.bundles.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl BundleLoader {
    /// Creates a loader with no bundles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `bundle` loadable at `url`.
    #[must_use]
    pub fn with_bundle<F>(mut self, url: &str, bundle: F) -> Self
    where
        F: Fn(&mut PluginApi<'_>) -> Result<(), ScriptError> + Send + 'static,
    {
        self.bundles.insert(url.to_owned(), Box::new(bundle));
        self
    }
}

impl ScriptLoader for BundleLoader {
    fn load(&mut self, url: &str, api: &mut PluginApi<'_>) -> Result<(), ScriptError> {
        let bundle = self.bundles.get(url).ok_or_else(|| ScriptError::NotFound {
            url: url.to_owned(),
        })?;
        bundle(api)
    }
}
