//! The lectern analysis host.
//!
//! `lecternd` runs scoring pipelines on behalf of a controlling process that
//! talks to it over stdio. Requests and replies are JSON envelopes, one per
//! line, correlated by a caller-assigned id. The host is built from small
//! parts, leaves first:
//!
//! - [`codec`] decodes and encodes envelopes;
//! - [`scheduler`] runs one job at a time in FIFO order, coalescing bursts
//!   of analysis requests;
//! - [`isolation`] turns job errors and panics into structured failures;
//! - [`cache`] keeps per-dimension results keyed by document fingerprints;
//! - [`pipeline`], [`research`] and [`scripts`] hold the scoring rules and
//!   other units plugins contribute to;
//! - [`dispatch`] ties these together behind the [`Dispatcher`] façade.
//!
//! Every request that becomes a job receives exactly one reply, either
//! `"<type>:done"` or `"<type>:failed"`. Lines that do not decode, or that
//! name an unknown type, are protocol errors: they are logged and dropped
//! without a reply.

mod bootstrap;
pub mod cache;
pub mod codec;
pub mod dispatch;
mod health;
pub mod isolation;
pub mod pipeline;
pub mod research;
pub mod scheduler;
pub mod scripts;
pub mod telemetry;
pub mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Host, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use dispatch::{DispatchError, Dispatcher, EnvelopeWriter, JobError, PluginApi, ReplySink};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{SessionSummary, TransportError, serve};

#[cfg(test)]
mod tests;
