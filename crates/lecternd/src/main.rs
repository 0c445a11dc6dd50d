use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use lectern_config::HostConfig;
use lecternd::{StaticConfigLoader, StructuredHealthReporter, bootstrap_with};

fn main() -> ExitCode {
    let config = match HostConfig::load() {
        Ok(config) => config,
        Err(error) => {
            let parser = error.parser_error();
            // Help and version requests arrive as errors too.
            let _ = parser.print();
            return if parser.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let reporter = Arc::new(StructuredHealthReporter::new());
    let host = match bootstrap_with(&StaticConfigLoader::new(config), reporter) {
        Ok(host) => host,
        Err(error) => {
            let _ = writeln!(io::stderr(), "lecternd: {error}");
            return ExitCode::FAILURE;
        }
    };

    match host.serve_stdio() {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr(), "lecternd: {error}");
            ExitCode::FAILURE
        }
    }
}
