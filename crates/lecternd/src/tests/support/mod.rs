//! Test harness utilities shared by the host suites.

mod config_loader;
mod factory;
mod reporter;
mod world;

use mockall::mock;
use serde_json::{Value, json};

use crate::codec::Envelope;
use crate::dispatch::{DispatchError, ReplySink};

pub(crate) use config_loader::ArgumentsLoader;
pub(crate) use factory::RecordingFactory;
pub(crate) use reporter::{HealthEvent, RecordingHealthReporter};
pub(crate) use world::{HostWorld, world};

mock! {
    pub Sink {}
    impl ReplySink for Sink {
        fn send(&mut self, envelope: &Envelope) -> Result<(), DispatchError>;
    }
}

/// Encodes a request line.
pub(crate) fn request(kind: &str, id: u64, payload: Value) -> Vec<u8> {
    json!({"type": kind, "id": id, "payload": payload})
        .to_string()
        .into_bytes()
}

/// Payload for an analysis of `text` with the given related keywords.
pub(crate) fn analysis(text: &str, keyword: &str, related: &[(&str, &str, &str)]) -> Value {
    let related: serde_json::Map<String, Value> = related
        .iter()
        .map(|(key, word, synonyms)| {
            ((*key).to_owned(), json!({"keyword": word, "synonyms": synonyms}))
        })
        .collect();
    json!({
        "paper": {"text": text, "keyword": keyword},
        "relatedKeywords": related,
    })
}

/// Replies addressed to `id`.
pub(crate) fn replies_for(replies: &[Envelope], id: u64) -> Vec<&Envelope> {
    let id = crate::codec::RequestId::from(id);
    replies.iter().filter(|reply| reply.id == id).collect()
}
