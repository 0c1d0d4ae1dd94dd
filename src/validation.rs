use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use thiserror::Error;

use crate::model::issue::{Assignee, IssueUpdate, NewIssue};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 2000;
pub const LABEL_MAX: usize = 30;

/// Word characters are ASCII only.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$")
        .expect("email pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Issue title is required")]
    TitleRequired,
    #[error("Issue title cannot be empty")]
    TitleEmpty,
    #[error("Issue title must be at least 3 characters long")]
    TitleTooShort,
    #[error("Issue title cannot exceed 200 characters")]
    TitleTooLong,
    #[error("Project ID is required")]
    ProjectRequired,
    #[error("Description cannot exceed 2000 characters")]
    DescriptionTooLong,
    #[error("Please enter a valid email for assignee")]
    InvalidAssigneeEmail,
    #[error("Due date must be in the future")]
    DueDateNotInFuture,
    #[error("Label cannot exceed 30 characters")]
    LabelTooLong,
}

pub fn validate_new(issue: &NewIssue, now: DateTime<Utc>) -> Result<(), ValidationError> {
    if issue.title.trim().is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    check_title_length(&issue.title)?;
    if issue.project_id.trim().is_empty() {
        return Err(ValidationError::ProjectRequired);
    }
    check_optional_fields(
        issue.description.as_deref(),
        issue.assignee.as_ref(),
        issue.due_date,
        issue.labels.as_deref(),
        now,
    )
}

/// Same rules as [`validate_new`], applied only to the fields present.
pub fn validate_update(update: &IssueUpdate, now: DateTime<Utc>) -> Result<(), ValidationError> {
    if let Some(title) = &update.title {
        if title.trim().is_empty() {
            return Err(ValidationError::TitleEmpty);
        }
        check_title_length(title)?;
    }
    check_optional_fields(
        update.description.as_deref(),
        update.assignee.as_ref(),
        update.due_date,
        update.labels.as_deref(),
        now,
    )
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

fn check_title_length(title: &str) -> Result<(), ValidationError> {
    let len = title.trim().chars().count();
    if len < TITLE_MIN {
        return Err(ValidationError::TitleTooShort);
    }
    if len > TITLE_MAX {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(())
}

fn check_optional_fields(
    description: Option<&str>,
    assignee: Option<&Assignee>,
    due_date: Option<DateTime<Utc>>,
    labels: Option<&[String]>,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if description.is_some_and(|d| d.chars().count() > DESCRIPTION_MAX) {
        return Err(ValidationError::DescriptionTooLong);
    }
    // An empty email is treated as "no email".
    if let Some(email) = assignee.and_then(|a| a.email.as_deref()) {
        if !email.is_empty() && !is_valid_email(email) {
            return Err(ValidationError::InvalidAssigneeEmail);
        }
    }
    if due_date.is_some_and(|due| due <= now) {
        return Err(ValidationError::DueDateNotInFuture);
    }
    if labels
        .unwrap_or_default()
        .iter()
        .any(|label| label.chars().count() > LABEL_MAX)
    {
        return Err(ValidationError::LabelTooLong);
    }
    Ok(())
}
