//! Error types for dispatch and job execution.
//!
//! [`DispatchError`] covers protocol-level problems: the request never became
//! a job and no request id is blamed. [`JobError`] covers failures while a
//! job runs; the scheduler turns it into a `"<type>:failed"` reply.

use std::io;

use lectern_plugins::{AssessmentError, HandlerError, ResearchError};
use thiserror::Error;

use crate::codec::CodecError;
use crate::scheduler::JobKind;

/// Errors surfaced before a request is scheduled, or while writing replies.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The line could not be decoded as an envelope.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The envelope named a type that is not a job.
    #[error("unknown request type: {kind}")]
    UnknownType {
        /// The unrecognised type.
        kind: String,
    },

    /// Writing a reply failed.
    #[error("failed to write reply: {0}")]
    Io(#[from] io::Error),
}

impl DispatchError {
    /// Creates an unknown type error.
    pub fn unknown_type(kind: impl Into<String>) -> Self {
        Self::UnknownType { kind: kind.into() }
    }
}

/// Errors raised while a job runs.
#[derive(Debug, Error)]
pub enum JobError {
    /// The request payload did not match the job's expected shape.
    #[error("invalid {kind} payload: {source}", kind = kind.as_str())]
    Payload {
        /// Job the payload was meant for.
        kind: JobKind,
        /// Decoding failure.
        #[source]
        source: CodecError,
    },

    /// A scoring rule failed.
    #[error(transparent)]
    Assessment(#[from] AssessmentError),

    /// A research failed or was not found.
    #[error(transparent)]
    Research(#[from] ResearchError),

    /// `runResearch` without a paper before any document was analysed.
    #[error("no document has been analysed yet and none was supplied")]
    NoDocument,

    /// No handler is registered for a custom message.
    #[error("no message handler registered for messages with name: {name}")]
    NoHandler {
        /// Requested handler key.
        name: String,
    },

    /// A message handler rejected its data.
    #[error("message handler '{name}' failed: {source}")]
    Handler {
        /// Handler key.
        name: String,
        /// Handler error.
        #[source]
        source: HandlerError,
    },

    /// A reply payload could not be encoded.
    #[error(transparent)]
    Encode(CodecError),
}

impl JobError {
    /// Creates a payload error.
    pub fn payload(kind: JobKind, source: CodecError) -> Self {
        Self::Payload { kind, source }
    }

    /// Creates a missing handler error.
    pub fn no_handler(name: impl Into<String>) -> Self {
        Self::NoHandler { name: name.into() }
    }
}
