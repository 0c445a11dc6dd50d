//! Reply delivery.
//!
//! Replies leave the dispatcher through a [`ReplySink`]. The host writes them
//! to stdout as JSONL with [`EnvelopeWriter`]; tests collect them in a
//! `Vec<Envelope>`.

use std::io::Write;

use crate::codec::{Envelope, encode_envelope};

use super::errors::DispatchError;

/// Destination for reply envelopes.
pub trait ReplySink {
    /// Delivers one reply.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the reply cannot be encoded or written.
    fn send(&mut self, envelope: &Envelope) -> Result<(), DispatchError>;
}

impl ReplySink for Vec<Envelope> {
    fn send(&mut self, envelope: &Envelope) -> Result<(), DispatchError> {
        self.push(envelope.clone());
        Ok(())
    }
}

/// Writes envelopes as JSONL, flushing after every line.
///
/// Flushing per reply matters: the controlling process waits on each id.
#[derive(Debug)]
pub struct EnvelopeWriter<W> {
    writer: W,
}

impl<W: Write> EnvelopeWriter<W> {
    /// Wraps an output stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Borrows the wrapped stream.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReplySink for EnvelopeWriter<W> {
    fn send(&mut self, envelope: &Envelope) -> Result<(), DispatchError> {
        let line = encode_envelope(envelope)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::RequestId;

    #[test]
    fn writes_one_line_per_envelope() {
        let mut writer = EnvelopeWriter::new(Vec::new());
        writer
            .send(&Envelope::done("analyze", RequestId::from(1), json!({"seo": {}})))
            .expect("write reply");
        writer
            .send(&Envelope::failed("runResearch", RequestId::from(2), json!({"error": "x"})))
            .expect("write reply");

        let output = String::from_utf8(writer.into_inner()).expect("valid utf8");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(output.ends_with('\n'));
        assert_eq!(
            lines.first().copied(),
            Some(r#"{"type":"analyze:done","id":1,"payload":{"seo":{}}}"#)
        );
    }

    #[test]
    fn vec_sink_collects_envelopes() {
        let mut sink: Vec<Envelope> = Vec::new();
        let reply = Envelope::done("initialize", RequestId::from("a"), serde_json::Value::Null);
        sink.send(&reply).expect("collect");
        assert_eq!(sink, vec![reply]);
    }
}
