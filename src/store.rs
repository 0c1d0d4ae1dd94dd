use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::model::issue::{Issue, IssuePatch};
use crate::model::status::{Priority, Status};

/// Cached issues of the project on screen, plus the issue open in the detail view.
///
/// The backend is the authority; this is a cache. Mutations targeting an id that is not
/// cached are ignored and report `false`.
#[derive(Debug, Default)]
pub struct IssueStore {
    issues: Vec<Issue>,
    current: Option<Issue>,
    total_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueCounts {
    pub total: usize,
    pub to_do: usize,
    pub in_progress: usize,
    pub in_review: usize,
    pub done: usize,
    pub overdue: usize,
}

/// Criteria for [`IssueStore::filter`]. Empty lists and `None` match everything.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub statuses: Vec<Status>,
    pub priorities: Vec<Priority>,
    pub assignee_emails: Vec<String>,
    /// Matches issues carrying any of these labels.
    pub labels: Vec<String>,
    pub has_assignee: Option<bool>,
    pub has_due_date: Option<bool>,
    pub is_overdue: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Priority,
    Status,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl IssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection. Last load wins.
    pub fn load(&mut self, issues: Vec<Issue>, count: usize) {
        self.issues = issues;
        self.total_count = count;
    }

    /// Prepend a newly created issue.
    pub fn insert(&mut self, issue: Issue) {
        self.issues.insert(0, issue);
        self.total_count += 1;
    }

    pub fn patch(&mut self, id: &str, patch: &IssuePatch) -> bool {
        let mut found = false;
        if let Some(issue) = self.issues.iter_mut().find(|i| i.id == id) {
            issue.apply(patch);
            found = true;
        }
        if let Some(current) = self.current.as_mut().filter(|c| c.id == id) {
            current.apply(patch);
            found = true;
        }
        found
    }

    /// Swap in the server's copy of an issue, keeping its position.
    pub fn replace(&mut self, issue: Issue) -> bool {
        let mut found = false;
        if let Some(current) = self.current.as_mut().filter(|c| c.id == issue.id) {
            *current = issue.clone();
            found = true;
        }
        if let Some(slot) = self.issues.iter_mut().find(|i| i.id == issue.id) {
            *slot = issue;
            found = true;
        }
        found
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.issues.len();
        self.issues.retain(|i| i.id != id);
        let removed = self.issues.len() != before;
        if removed {
            self.total_count = self.total_count.saturating_sub(1);
        }
        if self.current.as_ref().is_some_and(|c| c.id == id) {
            self.current = None;
        }
        removed
    }

    pub fn set_status(&mut self, id: &str, status: Status) -> bool {
        self.patch(id, &IssuePatch::status(status))
    }

    pub fn set_current(&mut self, issue: Option<Issue>) {
        self.current = issue;
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Issue> {
        self.current.as_ref()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == id)
    }

    pub fn counts(&self, now: DateTime<Utc>) -> IssueCounts {
        let mut counts = IssueCounts {
            total: self.issues.len(),
            ..Default::default()
        };
        for issue in &self.issues {
            match issue.status {
                Status::ToDo => counts.to_do += 1,
                Status::InProgress => counts.in_progress += 1,
                Status::InReview => counts.in_review += 1,
                Status::Done => counts.done += 1,
            }
            if issue.is_overdue(now) {
                counts.overdue += 1;
            }
        }
        counts
    }

    /// Case-insensitive match on title, description, labels and assignee.
    pub fn search(&self, query: &str) -> Vec<&Issue> {
        let query = query.to_lowercase();
        let hit = |s: &str| s.to_lowercase().contains(&query);
        self.issues
            .iter()
            .filter(|i| {
                hit(&i.title)
                    || hit(&i.description)
                    || i.labels.iter().any(|l| hit(l))
                    || i.assignee.as_ref().is_some_and(|a| {
                        hit(&a.name) || a.email.as_deref().is_some_and(hit)
                    })
            })
            .collect()
    }

    pub fn filter(&self, filter: &IssueFilter, now: DateTime<Utc>) -> Vec<&Issue> {
        self.issues
            .iter()
            .filter(|i| filter.statuses.is_empty() || filter.statuses.contains(&i.status))
            .filter(|i| filter.priorities.is_empty() || filter.priorities.contains(&i.priority))
            .filter(|i| {
                filter.assignee_emails.is_empty()
                    || assignee_email(i).is_some_and(|e| filter.assignee_emails.iter().any(|f| f == e))
            })
            .filter(|i| filter.labels.is_empty() || filter.labels.iter().any(|l| i.labels.contains(l)))
            .filter(|i| {
                filter
                    .has_assignee
                    .is_none_or(|want| want == assignee_email(i).is_some())
            })
            .filter(|i| filter.has_due_date.is_none_or(|want| want == i.due_date.is_some()))
            .filter(|i| filter.is_overdue.is_none_or(|want| want == i.is_overdue(now)))
            .collect()
    }

    /// A sorted copy; the store's own order is untouched.
    pub fn sorted(&self, key: SortKey, order: SortOrder) -> Vec<&Issue> {
        let mut issues: Vec<&Issue> = self.issues.iter().collect();
        issues.sort_by(|a, b| {
            let ord = compare(a, b, key);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        issues
    }
}

/// An assignee only counts as present when it has a non-empty email.
fn assignee_email(issue: &Issue) -> Option<&str> {
    issue
        .assignee
        .as_ref()
        .and_then(|a| a.email.as_deref())
        .filter(|e| !e.is_empty())
}

fn compare(a: &Issue, b: &Issue, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => a.title.cmp(&b.title),
        SortKey::Priority => a.priority.cmp(&b.priority),
        SortKey::Status => a.status.index().cmp(&b.status.index()),
        SortKey::DueDate => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{epoch, issue, issue_created};
    use crate::model::issue::Assignee;
    use chrono::Duration;

    fn store(issues: Vec<Issue>) -> IssueStore {
        let mut store = IssueStore::new();
        let count = issues.len();
        store.load(issues, count);
        store
    }

    #[test]
    fn load_replaces_everything() {
        let mut s = store(vec![issue("1", Status::ToDo), issue("2", Status::Done)]);
        s.load(vec![issue("3", Status::InReview)], 7);
        assert_eq!(s.issues().len(), 1);
        assert_eq!(s.total_count(), 7);
        assert!(s.get("1").is_none());
    }

    #[test]
    fn insert_prepends_and_counts() {
        let mut s = store(vec![issue("1", Status::ToDo)]);
        s.insert(issue("2", Status::ToDo));
        assert_eq!(s.issues()[0].id, "2");
        assert_eq!(s.total_count(), 2);
    }

    #[test]
    fn patch_updates_list_and_current() {
        let mut s = store(vec![issue("1", Status::ToDo)]);
        s.set_current(Some(issue("1", Status::ToDo)));
        let patch = IssuePatch {
            title: Some("Renamed".into()),
            ..Default::default()
        };
        assert!(s.patch("1", &patch));
        assert_eq!(s.get("1").unwrap().title, "Renamed");
        assert_eq!(s.current().unwrap().title, "Renamed");
    }

    #[test]
    fn unknown_ids_are_silent_noops() {
        let mut s = store(vec![issue("1", Status::ToDo)]);
        assert!(!s.patch("nope", &IssuePatch::status(Status::Done)));
        assert!(!s.set_status("nope", Status::Done));
        assert!(!s.remove("nope"));
        assert_eq!(s.total_count(), 1);
        assert_eq!(s.get("1").unwrap().status, Status::ToDo);
    }

    #[test]
    fn remove_clears_matching_current() {
        let mut s = store(vec![issue("1", Status::ToDo), issue("2", Status::ToDo)]);
        s.set_current(Some(issue("1", Status::ToDo)));
        assert!(s.remove("1"));
        assert!(s.current().is_none());
        assert_eq!(s.total_count(), 1);

    }

    #[test]
    fn replace_keeps_position() {
        let mut s = store(vec![issue("1", Status::ToDo), issue("2", Status::ToDo)]);
        let mut server = issue("2", Status::Done);
        server.title = "From server".into();
        assert!(s.replace(server));
        assert_eq!(s.issues()[1].title, "From server");
        assert_eq!(s.issues()[1].status, Status::Done);
    }

    #[test]
    fn counts_by_status_and_overdue() {
        let now = epoch() + Duration::days(5);
        let mut late = issue("3", Status::InProgress);
        late.due_date = Some(epoch());
        let mut late_done = issue("4", Status::Done);
        late_done.due_date = Some(epoch());
        let s = store(vec![issue("1", Status::ToDo), issue("2", Status::ToDo), late, late_done]);
        let counts = s.counts(now);
        assert_eq!(
            counts,
            IssueCounts {
                total: 4,
                to_do: 2,
                in_progress: 1,
                in_review: 0,
                done: 1,
                overdue: 1,
            }
        );
    }

    #[test]
    fn search_covers_labels_and_assignee() {
        let mut a = issue("1", Status::ToDo);
        a.labels = vec!["Frontend".into()];
        let mut b = issue("2", Status::ToDo);
        b.assignee = Some(Assignee {
            name: "Grace Hopper".into(),
            email: Some("grace@example.com".into()),
            avatar: None,
        });
        let s = store(vec![a, b, issue("3", Status::ToDo)]);
        assert_eq!(s.search("frontend").len(), 1);
        assert_eq!(s.search("HOPPER")[0].id, "2");
        assert_eq!(s.search("issue").len(), 3);
    }

    #[test]
    fn filter_combines_criteria() {
        let mut a = issue("1", Status::ToDo);
        a.priority = Priority::High;
        a.labels = vec!["bug".into()];
        let mut b = issue("2", Status::InReview);
        b.priority = Priority::High;
        b.assignee = Some(Assignee {
            name: "Lin".into(),
            email: Some("lin@example.com".into()),
            avatar: None,
        });
        let s = store(vec![a, b, issue("3", Status::ToDo)]);
        let now = epoch();

        let f = IssueFilter {
            priorities: vec![Priority::High],
            ..Default::default()
        };
        assert_eq!(s.filter(&f, now).len(), 2);

        let f = IssueFilter {
            priorities: vec![Priority::High],
            has_assignee: Some(false),
            ..Default::default()
        };
        let hits = s.filter(&f, now);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");

        let f = IssueFilter {
            assignee_emails: vec!["lin@example.com".into()],
            statuses: vec![Status::InReview, Status::Done],
            ..Default::default()
        };
        assert_eq!(s.filter(&f, now)[0].id, "2");

        let f = IssueFilter {
            labels: vec!["bug".into(), "ui".into()],
            ..Default::default()
        };
        assert_eq!(s.filter(&f, now)[0].id, "1");
    }

    #[test]
    fn sort_puts_missing_due_dates_last() {
        let mut a = issue_created("a", Status::Done, 1);
        a.due_date = Some(epoch() + Duration::days(3));
        let mut b = issue_created("b", Status::ToDo, 2);
        b.due_date = Some(epoch() + Duration::days(1));
        let c = issue_created("c", Status::InReview, 3);
        let s = store(vec![a, b, c]);

        let ids = |v: Vec<&Issue>| v.into_iter().map(|i| i.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(s.sorted(SortKey::DueDate, SortOrder::Asc)), ["b", "a", "c"]);
        assert_eq!(ids(s.sorted(SortKey::Status, SortOrder::Asc)), ["b", "c", "a"]);
        assert_eq!(ids(s.sorted(SortKey::CreatedAt, SortOrder::Desc)), ["c", "b", "a"]);
        // Sorting never reorders the store.
        assert_eq!(s.issues()[0].id, "a");
    }
}
