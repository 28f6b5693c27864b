//! Form Validation Module
//!
//! Schema-driven form validation with touched/dirty tracking and debounced
//! on-change checks.

mod form;
mod forms;
mod schema;
mod timer;

pub use form::{FormController, FormState, ValidationOptions, DEFAULT_DEBOUNCE};
pub use forms::{application_form, builtin_form, feedback_form, signup_form, BUILTIN_FORMS};
pub use schema::{is_valid_email, FieldIssue, FormSchema, FormValues, Predicate, Rule, Schema};
pub use timer::ScheduledTask;
