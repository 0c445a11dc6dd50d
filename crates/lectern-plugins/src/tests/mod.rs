//! Crate-level integration and BDD tests.

use std::sync::Arc;

use mockall::mock;
use serde_json::{Value, json};

use crate::assessment::MessageHandler;
use crate::error::HandlerError;
use crate::registry::PluginRegistry;

mod behaviour;

mock! {
    Handler {}
    impl MessageHandler for Handler {
        fn handle(&self, data: Value) -> Result<Value, HandlerError>;
    }
}

#[test]
fn registered_handler_receives_caller_data() {
    let mut handler = MockHandler::new();
    handler
        .expect_handle()
        .withf(|data: &Value| data == &json!({"word": "lectern"}))
        .once()
        .returning(|_| Ok(json!({"length": 7})));

    let mut registry = PluginRegistry::new();
    let key = registry
        .register_message_handler("measure", Arc::new(handler), "words")
        .expect("register");

    let reply = registry
        .message_handler(&key)
        .expect("handler present")
        .handle(json!({"word": "lectern"}))
        .expect("handle");
    assert_eq!(reply, json!({"length": 7}));
}

#[test]
fn handler_errors_are_returned_to_the_caller() {
    let mut handler = MockHandler::new();
    handler
        .expect_handle()
        .once()
        .returning(|_| Err(HandlerError::failed("unsupported")));

    let mut registry = PluginRegistry::new();
    let key = registry
        .register_message_handler("measure", Arc::new(handler), "words")
        .expect("register");

    let err = registry
        .message_handler(&key)
        .expect("handler present")
        .handle(Value::Null)
        .expect_err("handler should fail");
    assert!(err.to_string().contains("unsupported"));
}
