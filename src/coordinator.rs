use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiError, IssueApi, Operation};
use crate::model::issue::{Issue, IssuePatch, IssueUpdate, NewIssue};
use crate::model::status::{resolve_drop, DropRequest, Status};
use crate::store::IssueStore;
use crate::validation::{validate_new, validate_update, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Issue {0} is still being saved")]
    InFlight(String),
    #[error("Issue {0} is not loaded")]
    UnknownIssue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Info(String),
    Error(String),
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::Info(msg) | Notification::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }
}

/// A status change already applied to the store and awaiting backend confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransition {
    pub issue_id: String,
    pub previous: Status,
    pub target: Status,
}

/// Send the status change of `pending` to the backend.
pub async fn confirm_transition(
    api: &dyn IssueApi,
    pending: &PendingTransition,
) -> Result<Option<Issue>, ApiError> {
    api.update_issue(&pending.issue_id, &IssueUpdate::status(pending.target))
        .await
}

/// Sole writer of the issue store.
///
/// Status changes are optimistic: the store moves first and is put back if the backend
/// refuses. Every other mutation waits for the backend and leaves the store alone on failure.
/// Only one status change per issue may be awaiting confirmation at a time.
pub struct Coordinator {
    store: IssueStore,
    api: Arc<dyn IssueApi>,
    in_flight: HashSet<String>,
    notifications: Vec<Notification>,
    loading: bool,
    last_error: Option<String>,
}

impl Coordinator {
    pub fn new(api: Arc<dyn IssueApi>) -> Self {
        Self {
            store: IssueStore::new(),
            api,
            in_flight: HashSet::new(),
            notifications: Vec::new(),
            loading: false,
            last_error: None,
        }
    }

    pub fn store(&self) -> &IssueStore {
        &self.store
    }

    pub fn api(&self) -> Arc<dyn IssueApi> {
        Arc::clone(&self.api)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn clear_current(&mut self) {
        self.store.clear_current();
    }

    pub fn begin_drop(
        &mut self,
        drop: &DropRequest,
    ) -> Result<Option<PendingTransition>, CoordinatorError> {
        match resolve_drop(drop.source, drop.target) {
            Some(target) => self.begin_transition(&drop.issue_id, target),
            None => Ok(None),
        }
    }

    /// Apply a status change to the store right away.
    ///
    /// Returns `Ok(None)` when the issue already has `target`; nothing is changed or sent.
    pub fn begin_transition(
        &mut self,
        id: &str,
        target: Status,
    ) -> Result<Option<PendingTransition>, CoordinatorError> {
        self.ensure_idle(id)?;
        let Some(previous) = self.store.get(id).map(|i| i.status) else {
            let err = CoordinatorError::UnknownIssue(id.to_string());
            self.notify_error(err.to_string());
            return Err(err);
        };
        if previous == target {
            return Ok(None);
        }

        self.store.set_status(id, target);
        self.in_flight.insert(id.to_string());
        info!(issue = id, from = %previous, to = %target, "status change applied");
        Ok(Some(PendingTransition {
            issue_id: id.to_string(),
            previous,
            target,
        }))
    }

    /// Settle a status change with the backend's answer, reverting it on failure.
    ///
    /// On success the target status is applied again, since a reload may have landed
    /// while the change was pending.
    pub fn finish_transition(
        &mut self,
        pending: PendingTransition,
        result: Result<Option<Issue>, ApiError>,
    ) -> Result<(), CoordinatorError> {
        self.in_flight.remove(&pending.issue_id);
        match result {
            Ok(server) => {
                self.store.set_status(&pending.issue_id, pending.target);
                if let Some(server) = server {
                    self.store
                        .patch(&pending.issue_id, &IssuePatch::touched(server.updated_at));
                }
                debug!(issue = %pending.issue_id, to = %pending.target, "status change confirmed");
                Ok(())
            }
            Err(err) => {
                self.store.set_status(&pending.issue_id, pending.previous);
                warn!(
                    issue = %pending.issue_id,
                    back_to = %pending.previous,
                    error = %err,
                    "status change reverted"
                );
                let message = err.user_message(Operation::Update.fallback());
                self.last_error = Some(message.clone());
                self.notify_error(message);
                Err(err.into())
            }
        }
    }

    /// Begin, confirm and settle a status change in one call.
    pub async fn transition(&mut self, id: &str, target: Status) -> Result<(), CoordinatorError> {
        let Some(pending) = self.begin_transition(id, target)? else {
            return Ok(());
        };
        let api = self.api();
        let result = confirm_transition(api.as_ref(), &pending).await;
        self.finish_transition(pending, result)
    }

    pub async fn fetch_project(&mut self, project_id: &str) -> Result<usize, CoordinatorError> {
        self.start();
        let api = self.api();
        let page = self.settle(api.list_issues(project_id).await, Operation::List)?;
        info!(project = project_id, count = page.count, "issues loaded");
        let count = page.issues.len();
        self.store.load(page.issues, page.count);
        Ok(count)
    }

    pub async fn fetch_issue(&mut self, id: &str) -> Result<(), CoordinatorError> {
        self.start();
        let api = self.api();
        let issue = self.settle(api.get_issue(id).await, Operation::Get)?;
        self.store.set_current(Some(issue));
        Ok(())
    }

    pub async fn create(&mut self, new: NewIssue) -> Result<Issue, CoordinatorError> {
        if let Err(err) = validate_new(&new, Utc::now()) {
            return Err(self.reject(err));
        }
        self.start();
        let api = self.api();
        let issue = self.settle(api.create_issue(&new).await, Operation::Create)?;
        info!(issue = %issue.id, "issue created");
        self.store.insert(issue.clone());
        self.notify(Notification::Info(format!("Created \"{}\"", issue.title)));
        Ok(issue)
    }

    /// Full edit. An absent assignee leaves the assignee unchanged.
    ///
    /// Returns the issue as now known: the backend's copy when it sends one, otherwise the
    /// cached issue with the edit merged in (`None` if it is not cached).
    pub async fn update(
        &mut self,
        id: &str,
        update: IssueUpdate,
    ) -> Result<Option<Issue>, CoordinatorError> {
        self.ensure_idle(id)?;
        if let Err(err) = validate_update(&update, Utc::now()) {
            return Err(self.reject(err));
        }
        self.start();
        let api = self.api();
        let issue = match self.settle(api.update_issue(id, &update).await, Operation::Update)? {
            Some(server) => {
                self.store.replace(server.clone());
                Some(server)
            }
            None => {
                self.store.patch(id, &IssuePatch::from(update));
                self.store.get(id).cloned()
            }
        };
        let title = issue.as_ref().map_or(id, |i| i.title.as_str());
        let message = format!("Updated \"{title}\"");
        self.notify(Notification::Info(message));
        Ok(issue)
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), CoordinatorError> {
        self.ensure_idle(id)?;
        self.start();
        let api = self.api();
        let message = self.settle(api.delete_issue(id).await, Operation::Delete)?;
        info!(issue = id, "issue deleted");
        self.store.remove(id);
        self.notify(Notification::Info(
            message.unwrap_or_else(|| "Issue deleted".into()),
        ));
        Ok(())
    }

    fn ensure_idle(&mut self, id: &str) -> Result<(), CoordinatorError> {
        if !self.in_flight.contains(id) {
            return Ok(());
        }
        debug!(issue = id, "rejected while a status change is pending");
        let err = CoordinatorError::InFlight(id.to_string());
        self.notify_error(err.to_string());
        Err(err)
    }

    fn start(&mut self) {
        self.loading = true;
        self.last_error = None;
    }

    fn settle<T>(
        &mut self,
        result: Result<T, ApiError>,
        op: Operation,
    ) -> Result<T, CoordinatorError> {
        self.loading = false;
        result.map_err(|err| {
            warn!(error = %err, "{}", op.fallback());
            let message = err.user_message(op.fallback());
            self.last_error = Some(message.clone());
            self.notify_error(message);
            err.into()
        })
    }

    fn reject(&mut self, err: ValidationError) -> CoordinatorError {
        debug!(error = %err, "rejected before sending");
        self.last_error = Some(err.to_string());
        self.notify_error(err.to_string());
        err.into()
    }

    fn notify_error(&mut self, message: String) {
        self.notify(Notification::Error(message));
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}
