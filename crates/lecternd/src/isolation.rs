//! Error isolation around job execution.
//!
//! [`isolate`] runs a job body and converts both returned errors and panics
//! into a [`JobFailure`], so a faulty job (or a faulty plugin rule it calls)
//! can never unwind through the scheduler loop.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde_json::{Value, json};

use crate::codec::RequestId;

/// Structured description of a failed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    /// Request the failure belongs to.
    pub id: RequestId,
    /// Cause reported by the job or the panic payload.
    pub error: String,
    /// Caller-supplied diagnostic label.
    pub label: String,
}

impl JobFailure {
    /// Creates a failure record.
    pub fn new(id: RequestId, error: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id,
            error: error.into(),
            label: label.into(),
        }
    }

    /// Human-readable message combining the label and the cause.
    #[must_use]
    pub fn message(&self) -> String {
        if self.label.is_empty() {
            self.error.clone()
        } else {
            format!("{} {}", self.label, self.error)
        }
    }

    /// Reply payload sent with the `"<type>:failed"` envelope.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        json!({ "error": self.message() })
    }
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Runs `execute`, returning its value or a [`JobFailure`] labelled `label`.
///
/// Never panics: a panic inside `execute` is caught and its message becomes
/// the failure cause.
pub fn isolate<T, E, F>(id: &RequestId, label: &str, execute: F) -> Result<T, JobFailure>
where
    E: fmt::Display,
    F: FnOnce() -> Result<T, E>,
{
    match panic::catch_unwind(AssertUnwindSafe(execute)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(JobFailure::new(id.clone(), error.to_string(), label)),
        Err(payload) => Err(JobFailure::new(
            id.clone(),
            panic_message(payload.as_ref()),
            label,
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "job panicked".to_owned())
}
