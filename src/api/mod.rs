pub mod rest;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::model::issue::{Issue, IssueUpdate, NewIssue};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (timeout, connection failure).
    #[error("Network error: {0}")]
    Transport(String),
    /// The backend answered with `success: false` or a non-2xx status.
    #[error("{message}")]
    Rejected { status: Option<u16>, message: String },
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message shown to the user. Only backend rejections carry their own text.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Transport(_) | ApiError::Decode(_) => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Backend call kinds, each with its own fallback failure text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn fallback(self) -> &'static str {
        match self {
            Operation::List => "Failed to fetch issues",
            Operation::Get => "Failed to fetch issue",
            Operation::Create => "Failed to create issue",
            Operation::Update => "Failed to update issue",
            Operation::Delete => "Failed to delete issue",
        }
    }

    /// Only create and update answer with per-field validation errors.
    fn reports_field_errors(self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

/// Fetch-by-project result.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuePage {
    pub issues: Vec<Issue>,
    pub count: usize,
}

/// Backend operations on issues.
#[async_trait]
pub trait IssueApi: Send + Sync {
    async fn list_issues(&self, project_id: &str) -> Result<IssuePage, ApiError>;
    async fn get_issue(&self, id: &str) -> Result<Issue, ApiError>;
    async fn create_issue(&self, issue: &NewIssue) -> Result<Issue, ApiError>;
    /// Returns the updated issue when the backend sends it back.
    async fn update_issue(
        &self,
        id: &str,
        update: &IssueUpdate,
    ) -> Result<Option<Issue>, ApiError>;
    /// Returns the backend's confirmation message, if any.
    async fn delete_issue(&self, id: &str) -> Result<Option<String>, ApiError>;
}

/// Response body shared by every endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub count: Option<usize>,
    #[serde(default)]
    pub errors: Vec<String>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Text for a 2xx body carrying `success: false`: `message`, then the fallback.
    pub fn refusal_message(&self, op: Operation) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| op.fallback().to_string())
    }

    /// Text for a non-2xx answer: field errors (create and update only), then `message`,
    /// then `error`, then the fallback.
    pub fn error_message(&self, op: Operation) -> String {
        if op.reports_field_errors() && !self.errors.is_empty() {
            return self.errors.join(", ");
        }
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| op.fallback().to_string())
    }
}
