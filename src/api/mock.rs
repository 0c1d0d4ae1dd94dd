use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;

use super::{ApiError, IssueApi, IssuePage};
use crate::model::fixtures::epoch;
use crate::model::issue::{Issue, IssuePatch, IssueUpdate, NewIssue};

/// In-memory backend that records every call and can be told to fail.
pub struct MockApi {
    issues: Mutex<Vec<Issue>>,
    pub calls: Arc<Mutex<Vec<String>>>,
    failure: Mutex<Option<ApiError>>,
    bare_updates: bool,
}

impl MockApi {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            issues: Mutex::new(issues),
            calls: Arc::new(Mutex::new(Vec::new())),
            failure: Mutex::new(None),
            bare_updates: false,
        }
    }

    /// Answer updates with a bare confirmation and no issue body.
    pub fn without_update_data(mut self) -> Self {
        self.bare_updates = true;
        self
    }

    pub fn fail_next(&self, err: ApiError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn server_issue(&self, id: &str) -> Option<Issue> {
        self.issues.lock().unwrap().iter().find(|i| i.id == id).cloned()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found() -> ApiError {
        ApiError::Rejected {
            status: Some(404),
            message: "Issue not found".into(),
        }
    }
}

#[async_trait]
impl IssueApi for MockApi {
    async fn list_issues(&self, project_id: &str) -> Result<IssuePage, ApiError> {
        self.record(format!("list {project_id}"))?;
        let issues: Vec<Issue> = self
            .issues
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.project_id == project_id)
            .cloned()
            .collect();
        let count = issues.len();
        Ok(IssuePage { issues, count })
    }

    async fn get_issue(&self, id: &str) -> Result<Issue, ApiError> {
        self.record(format!("get {id}"))?;
        self.server_issue(id).ok_or_else(Self::not_found)
    }

    async fn create_issue(&self, new: &NewIssue) -> Result<Issue, ApiError> {
        self.record(format!("create {}", new.title))?;
        let mut issues = self.issues.lock().unwrap();
        let created_at = epoch() + Duration::hours(1);
        let issue = Issue {
            id: format!("srv-{}", issues.len() + 1),
            title: new.title.trim().to_string(),
            description: new.description.clone().unwrap_or_default(),
            status: new.status.unwrap_or_default(),
            priority: new.priority.unwrap_or_default(),
            assignee: new.assignee.clone(),
            project_id: new.project_id.clone(),
            due_date: new.due_date,
            labels: new.labels.clone().unwrap_or_default(),
            created_at,
            updated_at: created_at,
        };
        issues.push(issue.clone());
        Ok(issue)
    }

    async fn update_issue(
        &self,
        id: &str,
        update: &IssueUpdate,
    ) -> Result<Option<Issue>, ApiError> {
        self.record(format!("update {id}"))?;
        let mut issues = self.issues.lock().unwrap();
        let issue = issues
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(Self::not_found)?;
        issue.apply(&IssuePatch::from(update.clone()));
        issue.updated_at = epoch() + Duration::days(1);
        Ok((!self.bare_updates).then(|| issue.clone()))
    }

    async fn delete_issue(&self, id: &str) -> Result<Option<String>, ApiError> {
        self.record(format!("delete {id}"))?;
        let mut issues = self.issues.lock().unwrap();
        let before = issues.len();
        issues.retain(|i| i.id != id);
        if issues.len() == before {
            return Err(Self::not_found());
        }
        Ok(Some("Issue deleted successfully".into()))
    }
}
