//! Schemas for the portal's own forms.

use crate::validation::{FormSchema, Rule};

/// Names accepted by [`builtin_form`].
pub const BUILTIN_FORMS: [&str; 3] = ["signup", "application", "feedback"];

const ROLES: [&str; 3] = ["student", "mentor", "company"];

/// Looks up a built-in form schema by name.
pub fn builtin_form(name: &str) -> Option<FormSchema> {
    match name {
        "signup" => Some(signup_form()),
        "application" => Some(application_form()),
        "feedback" => Some(feedback_form()),
        _ => None,
    }
}

/// Account creation for students, mentors and companies.
pub fn signup_form() -> FormSchema {
    FormSchema::new()
        .field(
            "name",
            [
                Rule::required("Name is required"),
                Rule::max_length(100, "Name must be at most 100 characters"),
            ],
        )
        .field(
            "email",
            [
                Rule::required("Email is required"),
                Rule::email("Please enter a valid email address"),
            ],
        )
        .field(
            "password",
            [
                Rule::required("Password is required"),
                Rule::min_length(8, "Password must be at least 8 characters"),
            ],
        )
        .field(
            "confirm_password",
            [Rule::matches("password", "Passwords do not match")],
        )
        .field(
            "role",
            [Rule::custom(
                |v| ROLES.contains(&v),
                "Role must be student, mentor or company",
            )],
        )
}

/// A student's application to an internship posting.
pub fn application_form() -> FormSchema {
    FormSchema::new()
        .field(
            "email",
            [
                Rule::required("Email is required"),
                Rule::email("Please enter a valid email address"),
            ],
        )
        .field("position", [Rule::required("Position is required")])
        .field(
            "cover_letter",
            [
                Rule::min_length(50, "Cover letter must be at least 50 characters"),
                Rule::max_length(2000, "Cover letter must be at most 2000 characters"),
            ],
        )
        .optional(
            "resume_url",
            [Rule::custom(
                |v| v.starts_with("https://") || v.starts_with("http://"),
                "Resume link must be a web address",
            )],
        )
}

/// Feedback left after a mentorship session.
pub fn feedback_form() -> FormSchema {
    FormSchema::new()
        .field(
            "rating",
            [Rule::custom(
                |v| matches!(v.trim().parse::<u8>(), Ok(1..=5)),
                "Rating must be between 1 and 5",
            )],
        )
        .field(
            "comments",
            [Rule::min_length(10, "Comments must be at least 10 characters")],
        )
}
