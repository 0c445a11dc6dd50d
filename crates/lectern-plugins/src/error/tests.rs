//! Unit tests for plugin error types.

use rstest::rstest;

use super::*;

#[rstest]
#[case::name(Parameter::Name, "`name`")]
#[case::plugin_name(Parameter::PluginName, "`pluginName`")]
fn invalid_argument_names_parameter(#[case] parameter: Parameter, #[case] expected: &str) {
    let error = RegistrationError::invalid_argument(
        RegistrationAction::RegisterAssessment,
        parameter,
        "pluginX",
    );
    let message = error.to_string();
    assert!(
        message.contains(expected),
        "expected {expected} in message: {message}"
    );
    assert!(
        message.contains("pluginX"),
        "expected plugin in message: {message}"
    );
    assert_eq!(error.parameter(), parameter);
}

#[rstest]
#[case::assessment(RegistrationAction::RegisterAssessment, "register assessment")]
#[case::handler(RegistrationAction::RegisterMessageHandler, "register handler")]
#[case::refresh(RegistrationAction::RefreshAssessment, "refresh assessment")]
fn invalid_argument_names_action(#[case] action: RegistrationAction, #[case] expected: &str) {
    let error = RegistrationError::invalid_argument(action, Parameter::Name, "p");
    assert!(error.to_string().contains(expected));
}

#[test]
fn research_failure_includes_name_and_detail() {
    let error = ResearchError::failed("wordCount", "no words");
    let message = error.to_string();
    assert!(message.contains("wordCount"), "message: {message}");
    assert!(message.contains("no words"), "message: {message}");
}

#[test]
fn unknown_research_includes_name() {
    let error = ResearchError::Unknown {
        name: "sentences".into(),
    };
    assert!(error.to_string().contains("sentences"));
}

#[test]
fn assessment_and_handler_failures_carry_message() {
    assert!(
        AssessmentError::failed("boom")
            .to_string()
            .contains("boom")
    );
    assert!(HandlerError::failed("nope").to_string().contains("nope"));
}
