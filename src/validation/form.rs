//! Form state tracking with debounced, schema-driven validation.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use crate::config::Config;
use crate::validation::{FormValues, Schema, ScheduledTask};

/// Default debounce window for on-change validation.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// When validation runs automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Validate a field after its value changes, once `debounce` has passed quietly
    pub validate_on_change: bool,
    /// Validate a field as soon as it is marked touched
    pub validate_on_blur: bool,
    pub debounce: Duration,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            validate_on_change: true,
            validate_on_blur: true,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl From<&Config> for ValidationOptions {
    fn from(config: &Config) -> Self {
        Self {
            debounce: config.validation_debounce(),
            ..Self::default()
        }
    }
}

/// Observable state of a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub values: FormValues,
    /// Field path to message, for fields currently failing
    pub errors: BTreeMap<String, String>,
    /// Fields the user has interacted with
    pub touched: BTreeSet<String>,
    /// A value has been set since the last reset
    pub is_dirty: bool,
    /// The last validation pass found no errors; false until one has run
    pub is_valid: bool,
}

impl FormState {
    fn initial(values: FormValues) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    /// The field's error, only once the field has been touched.
    pub fn visible_error(&self, field: &str) -> Option<&str> {
        if self.is_touched(field) {
            self.error(field)
        } else {
            None
        }
    }
}

// == Form Controller ==
/// Tracks one form's values and validation state against a schema.
///
/// Debounce timers hold only a weak reference to the form; dropping the
/// controller cancels any pending validation.
pub struct FormController<S> {
    inner: Arc<FormInner<S>>,
}

struct FormInner<S> {
    schema: S,
    options: ValidationOptions,
    initial: FormValues,
    state: watch::Sender<FormState>,
    timers: Mutex<HashMap<String, ScheduledTask>>,
}

impl<S: Schema> FormController<S> {
    pub fn new(schema: S, initial: FormValues, options: ValidationOptions) -> Self {
        let (state, _) = watch::channel(FormState::initial(initial.clone()));
        Self {
            inner: Arc::new(FormInner {
                schema,
                options,
                initial,
                state,
                timers: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn state(&self) -> FormState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.inner.state.subscribe()
    }

    // == Set Value ==
    /// Updates a field and marks the form dirty.
    ///
    /// With on-change validation enabled, (re)starts the field's debounce
    /// window; the field is validated once no further change arrives within
    /// it. Must be called within a tokio runtime in that case.
    pub fn set_value(&self, field: &str, value: impl Into<String>) {
        let value = value.into();
        self.inner.state.send_modify(|state| {
            state.values.insert(field.to_string(), value);
            state.is_dirty = true;
        });

        if self.inner.options.validate_on_change {
            self.inner.schedule_validation(field);
        }
    }

    // == Set Field Touched ==
    /// Marks a field as interacted with.
    ///
    /// Touched is one-way: passing `false` leaves an already touched field
    /// touched until the form is reset. With on-blur validation enabled,
    /// marking a field touched validates it immediately and drops any
    /// pending debounced validation for it.
    pub fn set_field_touched(&self, field: &str, touched: bool) {
        if !touched {
            return;
        }

        self.inner.state.send_if_modified(|state| state.touched.insert(field.to_string()));

        if self.inner.options.validate_on_blur {
            self.inner.cancel_timer(field);
            self.inner.validate_field(field);
        }
    }

    /// Validates a single field. Returns true if it has no error.
    pub fn validate_field(&self, field: &str) -> bool {
        self.inner.validate_field(field)
    }

    // == Validate Form ==
    /// Validates every field, replacing the whole error map.
    ///
    /// Returns true if the form is valid.
    pub fn validate_form(&self) -> bool {
        self.inner.cancel_all_timers();

        let values = self.inner.state.borrow().values.clone();
        let result = self.inner.schema.validate(&values);

        self.inner.state.send_modify(|state| match result {
            Ok(()) => {
                state.errors.clear();
                state.is_valid = true;
            }
            Err(issues) => {
                state.errors = BTreeMap::new();
                for issue in issues {
                    state.errors.entry(issue.path).or_insert(issue.message);
                }
                state.is_valid = false;
            }
        });

        self.inner.state.borrow().is_valid
    }

    /// Restores initial values and clears every other piece of state.
    pub fn reset_form(&self) {
        self.inner.cancel_all_timers();
        self.inner
            .state
            .send_replace(FormState::initial(self.inner.initial.clone()));
    }

    /// Clears errors and validity, keeping values, touched fields and dirtiness.
    pub fn reset_validation(&self) {
        self.inner.cancel_all_timers();
        self.inner.state.send_modify(|state| {
            state.errors.clear();
            state.is_valid = false;
        });
    }

    /// True while a debounced validation is waiting to run for `field`.
    pub fn is_validation_pending(&self, field: &str) -> bool {
        self.inner
            .lock_timers()
            .get(field)
            .is_some_and(ScheduledTask::is_pending)
    }
}

impl<S: Schema> FormInner<S> {
    fn validate_field(&self, field: &str) -> bool {
        let values = self.state.borrow().values.clone();
        let message = match self.schema.validate(&values) {
            Ok(()) => None,
            Err(issues) => issues
                .into_iter()
                .find(|issue| issue.path == field)
                .map(|issue| issue.message),
        };

        let field_valid = message.is_none();
        self.state.send_modify(|state| {
            match message {
                Some(message) => {
                    state.errors.insert(field.to_string(), message);
                }
                None => {
                    state.errors.remove(field);
                }
            }
            state.is_valid = state.errors.is_empty();
        });

        debug!(field, valid = field_valid, "Field validated");
        field_valid
    }

    fn schedule_validation(self: &Arc<Self>, field: &str) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let target = field.to_string();
        let task = ScheduledTask::schedule(self.options.debounce, async move {
            if let Some(inner) = weak.upgrade() {
                inner.validate_field(&target);
            }
        });

        // Replacing the entry drops, and so cancels, the previous timer.
        self.lock_timers().insert(field.to_string(), task);
    }

    fn cancel_timer(&self, field: &str) {
        if let Some(task) = self.lock_timers().remove(field) {
            task.cancel();
        }
    }

    fn cancel_all_timers(&self) {
        self.lock_timers().clear();
    }

    fn lock_timers(&self) -> std::sync::MutexGuard<'_, HashMap<String, ScheduledTask>> {
        self.timers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FormSchema, Rule};

    fn email_form(options: ValidationOptions) -> FormController<FormSchema> {
        let schema = FormSchema::new().field(
            "email",
            [Rule::required("Email is required"), Rule::email("Invalid email format")],
        );
        FormController::new(schema, FormValues::new(), options)
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_value_marks_dirty_without_immediate_validation() {
        let form = email_form(ValidationOptions::default());

        form.set_value("email", "bad");

        let state = form.state();
        assert!(state.is_dirty);
        assert_eq!(state.value("email"), Some("bad"));
        assert!(state.errors.is_empty());
        assert!(form.is_validation_pending("email"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_restarts_on_each_change() {
        let form = email_form(ValidationOptions::default());

        form.set_value("email", "b");
        tokio::time::sleep(Duration::from_millis(200)).await;
        form.set_value("email", "ba");
        tokio::time::sleep(Duration::from_millis(200)).await;

        // 400ms since the first change but only 200ms since the last one.
        assert!(form.state().errors.is_empty());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(form.state().error("email"), Some("Invalid email format"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_change_disabled_never_schedules() {
        let form = email_form(ValidationOptions {
            validate_on_change: false,
            ..ValidationOptions::default()
        });

        form.set_value("email", "bad");
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(!form.is_validation_pending("email"));
        assert!(form.state().errors.is_empty());
    }

    #[tokio::test]
    async fn test_touch_validates_immediately() {
        let form = email_form(ValidationOptions::default());

        form.set_field_touched("email", true);

        let state = form.state();
        assert!(state.is_touched("email"));
        assert_eq!(state.visible_error("email"), Some("Email is required"));
    }

    #[tokio::test]
    async fn test_touched_is_one_way() {
        let form = email_form(ValidationOptions::default());

        form.set_field_touched("email", true);
        form.set_field_touched("email", false);

        assert!(form.state().is_touched("email"));
    }

    #[test]
    fn test_blur_validation_disabled() {
        let form = email_form(ValidationOptions {
            validate_on_blur: false,
            ..ValidationOptions::default()
        });

        form.set_field_touched("email", true);

        assert!(form.state().is_touched("email"));
        assert!(form.state().errors.is_empty());
    }
}
