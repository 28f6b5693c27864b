//! Integration Tests for Form Validation
//!
//! Exercises the controller against the built-in portal forms with a paused
//! clock for the debounce window.

use std::time::Duration;

use portal_cache::validation::{
    signup_form, FieldIssue, FormController, FormSchema, FormValues, Rule, ValidationOptions,
    DEFAULT_DEBOUNCE,
};

fn email_schema() -> FormSchema {
    FormSchema::new().field(
        "email",
        [
            Rule::required("Email is required"),
            Rule::email("Invalid email format"),
        ],
    )
}

fn initial(pairs: &[(&str, &str)]) -> FormValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn past_debounce() {
    tokio::time::sleep(DEFAULT_DEBOUNCE + Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn test_email_scenario() {
    let form = FormController::new(email_schema(), FormValues::new(), ValidationOptions::default());

    form.set_value("email", "bad");
    past_debounce().await;

    let state = form.state();
    assert_eq!(state.error("email"), Some("Invalid email format"));
    assert!(!state.is_valid);

    form.set_value("email", "a@b.com");
    past_debounce().await;

    let state = form.state();
    assert_eq!(state.error("email"), None);
    assert!(state.is_valid);
}

#[tokio::test(start_paused = true)]
async fn test_blur_preempts_pending_debounce() {
    let form = FormController::new(email_schema(), FormValues::new(), ValidationOptions::default());

    form.set_value("email", "bad");
    form.set_field_touched("email", true);

    assert_eq!(form.state().visible_error("email"), Some("Invalid email format"));
    assert!(!form.is_validation_pending("email"));
}

#[tokio::test(start_paused = true)]
async fn test_validate_field_updates_only_that_field() {
    let form = FormController::new(signup_form(), FormValues::new(), ValidationOptions::default());

    assert!(!form.validate_field("name"));

    let state = form.state();
    assert_eq!(state.error("name"), Some("Name is required"));
    assert_eq!(state.errors.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cross_field_rule_via_field_validation() {
    let form = FormController::new(signup_form(), FormValues::new(), ValidationOptions::default());

    form.set_value("password", "correct horse");
    form.set_value("confirm_password", "correct hose");
    past_debounce().await;

    assert_eq!(
        form.state().error("confirm_password"),
        Some("Passwords do not match")
    );
    assert_eq!(form.state().error("password"), None);
}

#[test]
fn test_validate_form_populates_and_clears_errors() {
    let form = FormController::new(
        signup_form(),
        FormValues::new(),
        ValidationOptions {
            validate_on_change: false,
            ..ValidationOptions::default()
        },
    );

    assert!(!form.validate_form());
    let state = form.state();
    assert!(!state.is_valid);
    assert!(state.errors.contains_key("name"));
    assert!(state.errors.contains_key("email"));
    assert!(state.errors.contains_key("role"));

    for (field, value) in [
        ("name", "Grace"),
        ("email", "grace@navy.mil"),
        ("password", "compilers!"),
        ("confirm_password", "compilers!"),
        ("role", "mentor"),
    ] {
        form.set_value(field, value);
    }

    assert!(form.validate_form());
    let state = form.state();
    assert!(state.is_valid);
    assert!(state.errors.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reset_form_restores_initial_values() {
    let form = FormController::new(
        email_schema(),
        initial(&[("email", "start@uni.edu")]),
        ValidationOptions::default(),
    );

    form.set_value("email", "bad");
    form.set_field_touched("email", true);
    form.reset_form();

    let state = form.state();
    assert_eq!(state.value("email"), Some("start@uni.edu"));
    assert!(!state.is_dirty);
    assert!(!state.is_touched("email"));
    assert!(state.errors.is_empty());
    assert!(!state.is_valid);
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_pending_validation() {
    let form = FormController::new(email_schema(), FormValues::new(), ValidationOptions::default());

    form.set_value("email", "bad");
    form.reset_validation();
    past_debounce().await;

    let state = form.state();
    assert!(state.errors.is_empty());
    assert_eq!(state.value("email"), Some("bad"));
    assert!(state.is_dirty);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_controller_cancels_debounce() {
    let form = FormController::new(email_schema(), FormValues::new(), ValidationOptions::default());
    let rx = form.subscribe();

    form.set_value("email", "bad");
    drop(form);
    past_debounce().await;

    let last = rx.borrow();
    assert_eq!(last.value("email"), Some("bad"));
    assert!(last.errors.is_empty());
}

#[test]
fn test_custom_schema_closure() {
    let schema = |values: &FormValues| match values.get("session_date") {
        Some(date) if date.len() == 10 => Ok(()),
        _ => Err(vec![FieldIssue::new("session_date", "Pick a date")]),
    };
    let form = FormController::new(
        schema,
        FormValues::new(),
        ValidationOptions {
            validate_on_change: false,
            ..ValidationOptions::default()
        },
    );

    assert!(!form.validate_form());
    form.set_value("session_date", "2026-10-18");
    assert!(form.validate_form());
}
