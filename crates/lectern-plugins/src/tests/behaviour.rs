//! Behaviour-driven tests for plugin registration.

use std::sync::Arc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;

use crate::assessment::AssessmentResult;
use crate::document::Paper;
use crate::error::{AssessmentError, HandlerError, Parameter, RegistrationError};
use crate::registry::PluginRegistry;

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RegistrationWorld {
    registry: PluginRegistry,
    last_error: Option<RegistrationError>,
}

#[fixture]
fn world() -> RegistrationWorld {
    RegistrationWorld::default()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn unquote(value: &str) -> &str {
    value.trim_matches('"')
}

fn record(world: &mut RegistrationWorld, result: Result<String, RegistrationError>) {
    if let Err(error) = result {
        world.last_error = Some(error);
    }
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("an empty plugin registry")]
fn given_empty_registry(world: &mut RegistrationWorld) {
    world.registry = PluginRegistry::new();
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("plugin {plugin} registers an assessment named {name}")]
fn when_register_assessment(world: &mut RegistrationWorld, plugin: String, name: String) {
    let rule = |_: &Paper| Ok::<_, AssessmentError>(AssessmentResult::new(9, "stub"));
    let result = world
        .registry
        .register_assessment(unquote(&name), Arc::new(rule), unquote(&plugin));
    record(world, result);
}

#[when("plugin {plugin} registers a message handler named {name}")]
fn when_register_handler(world: &mut RegistrationWorld, plugin: String, name: String) {
    let handler = |data: Value| Ok::<_, HandlerError>(data);
    let result = world.registry.register_message_handler(
        unquote(&name),
        Arc::new(handler),
        unquote(&plugin),
    );
    record(world, result);
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("{count} assessment(s) are registered")]
fn then_assessment_count(world: &mut RegistrationWorld, count: usize) {
    assert_eq!(world.registry.assessment_count(), count);
}

#[then("the handler {key} is registered")]
fn then_handler_registered(world: &mut RegistrationWorld, key: String) {
    let key = unquote(&key);
    assert!(
        world.registry.message_handler(key).is_some(),
        "expected handler '{key}' in {:?}",
        world.registry
    );
}

#[then("registration fails naming parameter {parameter}")]
fn then_registration_fails(world: &mut RegistrationWorld, parameter: String) {
    let error = world
        .last_error
        .as_ref()
        .expect("expected a registration error");
    let expected = match unquote(&parameter) {
        "name" => Parameter::Name,
        "pluginName" => Parameter::PluginName,
        other => panic!("unsupported parameter: '{other}' (supported: name, pluginName)"),
    };
    assert_eq!(error.parameter(), expected);
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/plugin_registration.feature")]
fn plugin_registration_behaviour(world: RegistrationWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/registration_validation.feature")]
fn registration_validation_behaviour(world: RegistrationWorld) {
    let _ = world;
}
