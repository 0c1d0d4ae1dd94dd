use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{ApiError, Envelope, IssueApi, IssuePage, Operation};
use crate::model::issue::{Issue, IssueUpdate, NewIssue};

const ISSUES_PATH: &str = "/api/v1/issues";

/// `IssueApi` over the backend's JSON REST endpoints.
pub struct RestApi {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl RestApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{ISSUES_PATH}{path}", self.base_url)
    }

    fn issue_url(&self, id: &str) -> String {
        self.url(&format!("/{}", urlencoding::encode(id)))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        op: Operation,
    ) -> Result<Envelope<T>, ApiError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let resp = request
            .header("Accept", "application/json")
            .send()
            .await
            .inspect_err(|e| warn!(error = %e, "issue API request failed"))?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!(status, bytes = body.len(), "issue API response");
        decode_envelope(status, &body, op)
    }
}

/// Interpret a response. A body with `success: false` fails regardless of status,
/// and a non-2xx status fails regardless of body. `data` is optional either way.
pub fn decode_envelope<T: DeserializeOwned>(
    status: u16,
    body: &str,
    op: Operation,
) -> Result<Envelope<T>, ApiError> {
    let ok_status = (200..300).contains(&status);
    match serde_json::from_str::<Envelope<T>>(body) {
        Ok(env) if env.success && ok_status => Ok(env),
        Ok(env) => Err(ApiError::Rejected {
            status: Some(status),
            message: if ok_status {
                env.refusal_message(op)
            } else {
                env.error_message(op)
            },
        }),
        Err(e) if ok_status => Err(ApiError::Decode(e.to_string())),
        Err(_) => Err(ApiError::Rejected {
            status: Some(status),
            message: op.fallback().to_string(),
        }),
    }
}

fn require_data<T>(env: Envelope<T>) -> Result<T, ApiError> {
    env.data
        .ok_or_else(|| ApiError::Decode("response has no data".into()))
}

#[async_trait]
impl IssueApi for RestApi {
    async fn list_issues(&self, project_id: &str) -> Result<IssuePage, ApiError> {
        let url = self.url(&format!("/project/{}", urlencoding::encode(project_id)));
        let env: Envelope<Vec<Issue>> = self
            .execute(self.client.get(url), Operation::List)
            .await?;
        let count = env.count.unwrap_or(0);
        Ok(IssuePage {
            issues: env.data.unwrap_or_default(),
            count,
        })
    }

    async fn get_issue(&self, id: &str) -> Result<Issue, ApiError> {
        let env = self
            .execute(self.client.get(self.issue_url(id)), Operation::Get)
            .await?;
        require_data(env)
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<Issue, ApiError> {
        let env = self
            .execute(
                self.client.post(self.url("")).json(issue),
                Operation::Create,
            )
            .await?;
        require_data(env)
    }

    async fn update_issue(
        &self,
        id: &str,
        update: &IssueUpdate,
    ) -> Result<Option<Issue>, ApiError> {
        let env: Envelope<Issue> = self
            .execute(
                self.client.put(self.issue_url(id)).json(update),
                Operation::Update,
            )
            .await?;
        Ok(env.data)
    }

    async fn delete_issue(&self, id: &str) -> Result<Option<String>, ApiError> {
        let env: Envelope<serde_json::Value> = self
            .execute(
                self.client.delete(self.issue_url(id)),
                Operation::Delete,
            )
            .await?;
        Ok(env.message)
    }
}
