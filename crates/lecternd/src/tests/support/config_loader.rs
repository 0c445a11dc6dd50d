//! Configuration loaders for bootstrap scenarios.

use lectern_config::{HostConfig, HostConfigError};

use crate::bootstrap::ConfigLoader;

/// Loader that parses a fixed argument list, so scenarios can feed it bad
/// flags.
pub(crate) struct ArgumentsLoader {
    args: Vec<String>,
}

impl ArgumentsLoader {
    pub(crate) fn new(args: &[&str]) -> Self {
        let mut all = vec!["lecternd".to_owned()];
        all.extend(args.iter().map(|arg| (*arg).to_owned()));
        Self { args: all }
    }
}

impl ConfigLoader for ArgumentsLoader {
    fn load(&self) -> Result<HostConfig, HostConfigError> {
        HostConfig::load_from_iter(self.args.clone())
    }
}
