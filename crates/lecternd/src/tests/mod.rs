//! Crate-level integration and BDD tests.

use std::io::Cursor;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::bootstrap::bootstrap_with;
use crate::dispatch::{Dispatcher, EnvelopeWriter};
use crate::transport::serve;

use self::support::{ArgumentsLoader, HealthEvent, RecordingHealthReporter};

pub(crate) mod support;

fn lines(output: &[u8]) -> Vec<Value> {
    String::from_utf8(output.to_vec())
        .expect("utf8 output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("reply is json"))
        .collect()
}

#[test]
fn stdio_session_writes_one_json_line_per_reply() {
    let input = [
        json!({"type": "initialize", "id": 1, "payload": {"keywordAnalysisActive": false}}),
        json!({"type": "analyze", "id": 2, "payload": {"paper": {"text": "Short. Clear."}}}),
        json!({"type": "customMessage", "id": 3, "payload": {"name": "nobody-ping"}}),
    ]
    .iter()
    .map(Value::to_string)
    .collect::<Vec<_>>()
    .join("\n");

    let mut dispatcher = Dispatcher::new(EnvelopeWriter::new(Vec::new()));
    serve(Cursor::new(input.into_bytes()), &mut dispatcher, 4096).expect("session");
    let replies = lines(dispatcher.sink().get_ref());

    let types: Vec<&str> = replies
        .iter()
        .filter_map(|reply| reply.get("type").and_then(Value::as_str))
        .collect();
    assert_eq!(
        types,
        vec!["initialize:done", "analyze:done", "customMessage:failed"]
    );
    assert_eq!(
        replies.get(1).and_then(|reply| reply.pointer("/payload/readability/score")),
        Some(&json!(100))
    );
    assert_eq!(
        replies.get(2).and_then(|reply| reply.get("id")),
        Some(&json!(3))
    );
}

#[test]
fn host_applies_configured_envelope_limit() {
    let reporter = Arc::new(RecordingHealthReporter::default());
    let loader = ArgumentsLoader::new(&["--max-envelope-bytes", "1024", "--log-filter", "warn"]);
    let host = bootstrap_with(&loader, reporter.clone()).expect("bootstrap");

    let oversize = json!({"type": "analyze", "id": 1, "payload": {"paper": {"text": "x".repeat(2048)}}});
    let input = format!("{oversize}\n{}\n", json!({"type": "initialize", "id": 2}));
    let mut dispatcher = host.dispatcher(Vec::new());
    let summary = host
        .serve(Cursor::new(input.into_bytes()), &mut dispatcher)
        .expect("session");

    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.accepted, 1);
    assert_eq!(dispatcher.sink().len(), 1);
    assert!(
        reporter
            .events()
            .contains(&HealthEvent::SessionFinished(summary))
    );
}
