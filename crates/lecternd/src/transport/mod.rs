//! Stdio transport.
//!
//! Requests arrive as JSON lines on an input stream; replies leave through
//! the dispatcher's [`ReplySink`]. A reader thread feeds complete lines into a
//! channel so the execution loop never blocks on input while work is queued.
//! Before every step the loop drains all lines already received, which lets
//! a burst of analysis requests coalesce before any of them runs.

mod reader;

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codec::CodecError;
use crate::dispatch::{DispatchError, Dispatcher, ReplySink};

use self::reader::{Inbound, LineReader};

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// Errors that end a transport session.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading the input stream failed.
    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),

    /// A reply could not be written.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The reader thread could not be started.
    #[error("failed to start input reader: {0}")]
    Spawn(#[source] io::Error),

    /// The reader thread panicked.
    #[error("input reader thread panicked")]
    ReaderPanicked,
}

/// Counters describing a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Lines accepted as requests.
    pub accepted: usize,
    /// Lines rejected as protocol errors.
    pub rejected: usize,
    /// Scheduler steps taken.
    pub steps: usize,
}

type Frame = io::Result<Inbound>;

/// Serves requests from `input` until it closes, then drains the queue.
///
/// # Errors
///
/// Returns [`TransportError`] if input cannot be read or a reply cannot be
/// written. Every request accepted before a read failure is still answered.
pub fn serve<R, S>(
    input: R,
    dispatcher: &mut Dispatcher<S>,
    max_envelope_bytes: usize,
) -> Result<SessionSummary, TransportError>
where
    R: BufRead + Send + 'static,
    S: ReplySink,
{
    let (sender, receiver) = mpsc::channel::<Frame>();
    let reader = thread::Builder::new()
        .name("lecternd-reader".to_owned())
        .spawn(move || {
            let mut lines = LineReader::new(input, max_envelope_bytes);
            loop {
                let frame = lines.next_line().transpose();
                let Some(frame) = frame else { break };
                let failed = frame.is_err();
                if sender.send(frame).is_err() || failed {
                    break;
                }
            }
        })
        .map_err(TransportError::Spawn)?;

    let mut session = Session {
        summary: SessionSummary::default(),
        read_error: None,
        max_envelope_bytes,
    };
    session.pump(&receiver, dispatcher)?;
    session.summary.steps += dispatcher.finish()?;

    reader.join().map_err(|_| TransportError::ReaderPanicked)?;
    info!(
        target: TRANSPORT_TARGET,
        accepted = session.summary.accepted,
        rejected = session.summary.rejected,
        steps = session.summary.steps,
        "input closed"
    );
    match session.read_error {
        Some(error) => Err(TransportError::Read(error)),
        None => Ok(session.summary),
    }
}

struct Session {
    summary: SessionSummary,
    read_error: Option<io::Error>,
    max_envelope_bytes: usize,
}

impl Session {
    fn pump<S: ReplySink>(
        &mut self,
        receiver: &Receiver<Frame>,
        dispatcher: &mut Dispatcher<S>,
    ) -> Result<(), DispatchError> {
        loop {
            let open = self.drain(receiver, dispatcher);
            if dispatcher.step()? {
                self.summary.steps += 1;
                continue;
            }
            if !open {
                return Ok(());
            }
            // Idle: block until the next line arrives or input closes.
            match receiver.recv() {
                Ok(frame) => self.accept(frame, dispatcher),
                Err(_) => return Ok(()),
            }
        }
    }

    /// Accepts every frame already received. Returns `false` once input has
    /// closed.
    fn drain<S: ReplySink>(
        &mut self,
        receiver: &Receiver<Frame>,
        dispatcher: &mut Dispatcher<S>,
    ) -> bool {
        loop {
            match receiver.try_recv() {
                Ok(frame) => self.accept(frame, dispatcher),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn accept<S: ReplySink>(&mut self, frame: Frame, dispatcher: &mut Dispatcher<S>) {
        match frame {
            Ok(Inbound::Line(line)) if line.trim_ascii().is_empty() => {
                debug!(target: TRANSPORT_TARGET, "skipping blank line");
            }
            Ok(Inbound::Line(line)) => match dispatcher.handle_message(&line) {
                Ok(()) => self.summary.accepted += 1,
                Err(_) => self.summary.rejected += 1,
            },
            Ok(Inbound::Oversize { size }) => {
                let error = CodecError::too_large(size, self.max_envelope_bytes);
                warn!(target: TRANSPORT_TARGET, size, %error, "discarded oversize line");
                self.summary.rejected += 1;
            }
            Err(error) => {
                warn!(target: TRANSPORT_TARGET, %error, "input read failed; treating as end of input");
                if self.read_error.is_none() {
                    self.read_error = Some(error);
                }
            }
        }
    }
}
