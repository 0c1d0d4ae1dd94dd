use chrono::{DateTime, Duration, Utc};

use super::issue::Issue;
use super::status::{Priority, Status};

pub fn epoch() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn issue(id: &str, status: Status) -> Issue {
    Issue {
        id: id.to_string(),
        title: format!("Issue {id}"),
        description: String::new(),
        status,
        priority: Priority::Medium,
        assignee: None,
        project_id: "p1".into(),
        due_date: None,
        labels: vec![],
        created_at: epoch(),
        updated_at: epoch(),
    }
}

pub fn issue_created(id: &str, status: Status, minutes: i64) -> Issue {
    let mut issue = issue(id, status);
    issue.created_at = epoch() + Duration::minutes(minutes);
    issue.updated_at = issue.created_at;
    issue
}
