use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ProjectError, ProjectResult};

pub const MAX_SLUG_LENGTH: usize = 30;
pub const MAX_PROJECT_NAME_LENGTH: usize = 255;
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("Invalid regex pattern for slugs"));
static COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid regex pattern for color codes")
});
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex pattern for emails")
});

/// Input validation for project and user fields
pub struct ValidationService;

impl ValidationService {
    /// Validate the public URL name of a project. Taken verbatim: surrounding
    /// whitespace is rejected, not stripped.
    pub fn validate_slug(slug: &str) -> ProjectResult<String> {
        if slug.is_empty() {
            return Err(invalid_slug(slug, "cannot be empty"));
        }

        if slug.len() > MAX_SLUG_LENGTH {
            return Err(invalid_slug(
                slug,
                &format!("too long (max {} characters)", MAX_SLUG_LENGTH),
            ));
        }

        if !SLUG_RE.is_match(slug) {
            return Err(invalid_slug(
                slug,
                "only lowercase letters, numbers and hyphens are allowed",
            ));
        }

        Ok(slug.to_string())
    }

    pub fn validate_project_name(name: &str) -> ProjectResult<String> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(ProjectError::validation("name", "cannot be empty"));
        }

        if trimmed.chars().count() > MAX_PROJECT_NAME_LENGTH {
            return Err(ProjectError::validation(
                "name",
                format!("too long (max {} characters)", MAX_PROJECT_NAME_LENGTH),
            ));
        }

        Ok(trimmed.to_string())
    }

    /// Empty descriptions are stored as `None`.
    pub fn validate_description(description: &str) -> ProjectResult<Option<String>> {
        let trimmed = description.trim();

        if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(ProjectError::validation(
                "description",
                format!("too long (max {} characters)", MAX_DESCRIPTION_LENGTH),
            ));
        }

        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }

    /// Validate a `#RRGGBB` color code
    pub fn validate_color_code(color: &str) -> ProjectResult<String> {
        let trimmed = color.trim();
        if !COLOR_RE.is_match(trimmed) {
            return Err(ProjectError::validation(
                "main_color",
                "must be a color code like #007FFF",
            ));
        }
        Ok(trimmed.to_uppercase())
    }

    /// Emails are compared case-insensitively, so they are stored lowercased.
    pub fn validate_email(email: &str) -> ProjectResult<String> {
        let normalized = email.trim().to_lowercase();
        if !EMAIL_RE.is_match(&normalized) {
            return Err(ProjectError::validation("email", "not a valid email address"));
        }
        Ok(normalized)
    }
}

fn invalid_slug(slug: &str, reason: &str) -> ProjectError {
    ProjectError::InvalidSlug {
        slug: slug.to_string(),
        reason: reason.to_string(),
    }
}
