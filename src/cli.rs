use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::board::BoardView;
use crate::coordinator::Coordinator;
use crate::model::issue::{Assignee, Issue, IssueUpdate, NewIssue};
use crate::model::status::{Priority, Status};
use crate::store::{IssueFilter, SortKey, SortOrder};

/// Fields shared by `nexus add` and `nexus edit`.
#[derive(Debug, Default, PartialEq)]
pub struct IssueArgs {
    /// Free words, joined with spaces.
    pub words: Vec<String>,
    pub description: Option<String>,
    pub project_id: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub assignee: Option<Assignee>,
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
}

impl IssueArgs {
    fn title(&self) -> Option<String> {
        (!self.words.is_empty()).then(|| self.words.join(" "))
    }

    fn labels(&self) -> Option<Vec<String>> {
        (!self.labels.is_empty()).then(|| self.labels.clone())
    }
}

#[derive(Debug, Default)]
pub struct ListArgs {
    pub project_id: Option<String>,
    pub query: Option<String>,
    pub filter: IssueFilter,
    pub sort: Option<(SortKey, SortOrder)>,
}

impl ListArgs {
    fn is_flat(&self) -> bool {
        self.query.is_some()
            || self.sort.is_some()
            || !self.filter.priorities.is_empty()
            || !self.filter.assignee_emails.is_empty()
            || !self.filter.labels.is_empty()
            || self.filter.is_overdue.is_some()
    }
}

/// `nexus add`: create an issue and print it.
pub async fn handle_add(
    coordinator: &mut Coordinator,
    default_project: Option<&str>,
    args: &[String],
) -> Result<()> {
    let add = parse_issue_args(args)?;
    let Some(title) = add.title() else {
        bail!("Issue title cannot be empty");
    };
    let project_id = add
        .project_id
        .as_deref()
        .or(default_project)
        .context("No project. Pass -p <project-id> or set project_id in ~/.nexus/config.toml")?;

    let new = NewIssue {
        description: add.description.clone(),
        status: add.status,
        priority: add.priority,
        assignee: add.assignee.clone(),
        due_date: add.due_date,
        labels: add.labels(),
        ..NewIssue::new(project_id, title)
    };
    let issue = coordinator.create(new).await?;
    println!("Created {} [{}] {}", issue.id, issue.status, issue.title);
    Ok(())
}

/// `nexus edit <issue-id> [new title words] [options]`.
pub async fn handle_edit(coordinator: &mut Coordinator, args: &[String]) -> Result<()> {
    let Some((issue_id, rest)) = args.split_first() else {
        bail!("Usage: nexus edit <issue-id> [title] [-d <description>] [-s <status>] [--priority <p>] [-a <assignee>] [-l <label>]...");
    };
    let edit = parse_issue_args(rest)?;
    let update = IssueUpdate {
        title: edit.title(),
        description: edit.description.clone(),
        status: edit.status,
        priority: edit.priority,
        assignee: edit.assignee.clone(),
        due_date: edit.due_date,
        labels: edit.labels(),
        ..Default::default()
    };
    if update == IssueUpdate::default() {
        bail!("Nothing to change");
    }
    match coordinator.update(issue_id, update).await? {
        Some(issue) => print_issue(&issue),
        None => println!("Updated {issue_id}"),
    }
    Ok(())
}

/// `nexus list`: print the board of a project, one section per column.
///
/// With a search, filter or sort option, prints a single matching list instead.
pub async fn handle_list(
    coordinator: &mut Coordinator,
    default_project: Option<&str>,
    args: &[String],
) -> Result<()> {
    let list = parse_list_args(args)?;
    let project_id = list
        .project_id
        .as_deref()
        .or(default_project)
        .context("Usage: nexus list <project-id> [options]")?;
    coordinator.fetch_project(project_id).await?;
    let store = coordinator.store();

    if store.is_empty() {
        println!("No issues in {project_id}");
        return Ok(());
    }

    if list.is_flat() {
        let now = chrono::Utc::now();
        let mut wanted: HashSet<&str> = store
            .filter(&list.filter, now)
            .into_iter()
            .map(|i| i.id.as_str())
            .collect();
        if let Some(query) = &list.query {
            let hits: HashSet<&str> = store.search(query).into_iter().map(|i| i.id.as_str()).collect();
            wanted.retain(|id| hits.contains(id));
        }
        let (key, order) = list.sort.unwrap_or((SortKey::CreatedAt, SortOrder::Desc));
        for issue in store.sorted(key, order) {
            if wanted.contains(issue.id.as_str()) {
                print_issue(issue);
            }
        }
        return Ok(());
    }

    let board = BoardView::project(store);
    for column in board.columns() {
        println!("{} ({})", column.status, column.issues.len());
        for issue in &column.issues {
            print!("  ");
            print_issue(issue);
        }
    }
    let counts = store.counts(chrono::Utc::now());
    println!(
        "\n{} shown of {} total, {} overdue",
        counts.total,
        store.total_count(),
        counts.overdue
    );
    Ok(())
}

/// `nexus move <project-id> <issue-id> <status>`.
pub async fn handle_move(coordinator: &mut Coordinator, args: &[String]) -> Result<()> {
    let [project_id, issue_id, status] = args else {
        bail!("Usage: nexus move <project-id> <issue-id> <status>");
    };
    let target: Status = status.parse().map_err(anyhow::Error::msg)?;
    coordinator.fetch_project(project_id).await?;
    coordinator.transition(issue_id, target).await?;
    println!("{issue_id} -> {target}");
    Ok(())
}

/// `nexus delete <issue-id>`.
pub async fn handle_delete(coordinator: &mut Coordinator, args: &[String]) -> Result<()> {
    let [issue_id] = args else {
        bail!("Usage: nexus delete <issue-id>");
    };
    coordinator.delete(issue_id).await?;
    println!("Deleted {issue_id}");
    Ok(())
}

fn print_issue(issue: &Issue) {
    let assignee = issue
        .assignee
        .as_ref()
        .map(|a| format!(" @{}", a.name))
        .unwrap_or_default();
    println!(
        "{}  {} [{} / {}]{assignee}",
        issue.id, issue.title, issue.status, issue.priority
    );
}

/// Parse issue fields for `nexus add` and `nexus edit`.
///
/// Supported forms:
///   nexus add "My issue title"
///   nexus add My issue title -d "The description"
///   nexus add "My issue" -p <project> -s "In Progress" --priority high -l bug -l ui
///   nexus add "My issue" -a "Ada Lovelace <ada@example.com>"
pub fn parse_issue_args(args: &[String]) -> Result<IssueArgs> {
    let mut parsed = IssueArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("Missing value for {flag} flag"))
        };
        match arg.as_str() {
            "-d" | "--desc" | "--description" => parsed.description = Some(value("-d/--desc")?),
            "-p" | "--project" => parsed.project_id = Some(value("-p/--project")?),
            "-s" | "--status" => {
                parsed.status = Some(value("-s/--status")?.parse().map_err(anyhow::Error::msg)?)
            }
            "--priority" => {
                parsed.priority = Some(value("--priority")?.parse().map_err(anyhow::Error::msg)?)
            }
            "-a" | "--assignee" => parsed.assignee = Some(parse_assignee(&value("-a/--assignee")?)?),
            "--due" => parsed.due_date = Some(parse_due(&value("--due")?)?),
            "-l" | "--label" => parsed.labels.push(value("-l/--label")?),
            _ => parsed.words.push(arg.clone()),
        }
    }

    Ok(parsed)
}

pub fn parse_list_args(args: &[String]) -> Result<ListArgs> {
    let mut list = ListArgs::default();
    let mut order = SortOrder::Asc;
    let mut key = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("Missing value for {flag} flag"))
        };
        match arg.as_str() {
            "-q" | "--search" => list.query = Some(value("-q/--search")?),
            "--sort" => key = Some(parse_sort_key(&value("--sort")?)?),
            "--desc" => order = SortOrder::Desc,
            "--overdue" => list.filter.is_overdue = Some(true),
            "--priority" => list
                .filter
                .priorities
                .push(value("--priority")?.parse().map_err(anyhow::Error::msg)?),
            "-a" | "--assignee" => list.filter.assignee_emails.push(value("-a/--assignee")?),
            "-l" | "--label" => list.filter.labels.push(value("-l/--label")?),
            flag if flag.starts_with('-') => bail!("Unknown option {flag}"),
            _ if list.project_id.is_none() => list.project_id = Some(arg.clone()),
            _ => bail!("Unexpected argument {arg}"),
        }
    }

    list.sort = key.map(|k| (k, order));
    Ok(list)
}

fn parse_sort_key(s: &str) -> Result<SortKey> {
    Ok(match s.to_lowercase().as_str() {
        "title" => SortKey::Title,
        "priority" => SortKey::Priority,
        "status" => SortKey::Status,
        "due" | "duedate" => SortKey::DueDate,
        "created" | "createdat" => SortKey::CreatedAt,
        "updated" | "updatedat" => SortKey::UpdatedAt,
        _ => bail!("Unknown sort key '{s}' (title, priority, status, due, created, updated)"),
    })
}

/// `YYYY-MM-DD`, taken as the end of that day in UTC.
fn parse_due(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid due date '{s}' (expected YYYY-MM-DD)"))?;
    date.and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .context("Invalid due date")
}

/// `"Ada Lovelace <ada@example.com>"` or just a name.
fn parse_assignee(s: &str) -> Result<Assignee> {
    let (name, email) = match s.split_once('<') {
        Some((name, rest)) => {
            let email = rest
                .strip_suffix('>')
                .context("Assignee email must be closed with '>'")?;
            (name.trim(), Some(email.trim().to_string()))
        }
        None => (s.trim(), None),
    };
    if name.is_empty() {
        bail!("Assignee name cannot be empty");
    }
    Ok(Assignee {
        name: name.to_string(),
        email,
        avatar: None,
    })
}

pub fn print_help() {
    println!("nexus: terminal Kanban board for Nexus projects\n");
    println!("USAGE:");
    println!("  nexus [project-id]                      Launch the board");
    println!("  nexus add <title> [options]             Create an issue");
    println!("  nexus edit <issue-id> [title] [options] Edit an issue");
    println!("  nexus list [project-id] [list options]  Print the board");
    println!("  nexus move <project> <issue> <status>   Move an issue to another column");
    println!("  nexus delete <issue-id>                 Delete an issue");
    println!();
    println!("ISSUE OPTIONS:");
    println!("  -d, --desc <text>         Description");
    println!("  -p, --project <id>        Project (add only; defaults to project_id from config)");
    println!("  -s, --status <s>          To Do, In Progress, In Review or Done");
    println!("      --priority <p>        Low, Medium, High or Critical");
    println!("  -a, --assignee <who>      \"Name <email>\"");
    println!("      --due <YYYY-MM-DD>    Due date, must be in the future");
    println!("  -l, --label <label>       Label (repeatable)");
    println!();
    println!("LIST OPTIONS:");
    println!("  -q, --search <text>       Match title, description, labels, assignee");
    println!("      --priority <p>        Only this priority (repeatable)");
    println!("  -a, --assignee <email>    Only issues assigned to this email (repeatable)");
    println!("  -l, --label <label>       Only issues with any of these labels");
    println!("      --overdue             Only overdue issues");
    println!("      --sort <key> [--desc] title, priority, status, due, created, updated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::model::fixtures::issue;
    use std::sync::Arc;

    fn args(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_multi_word_title() {
        let add = parse_issue_args(&args(&["Fix", "the", "login", "bug"])).unwrap();
        assert_eq!(add.title().as_deref(), Some("Fix the login bug"));
        assert_eq!(add.description, None);
        assert_eq!(add.labels(), None);
    }

    #[test]
    fn parse_all_flags() {
        let add = parse_issue_args(&args(&[
            "Fix login",
            "-d",
            "SSO is broken",
            "-p",
            "p7",
            "-s",
            "in review",
            "--priority",
            "High",
            "-a",
            "Ada Lovelace <ada@example.com>",
            "-l",
            "bug",
            "--label",
            "auth",
        ]))
        .unwrap();
        assert_eq!(
            add,
            IssueArgs {
                words: vec!["Fix login".into()],
                description: Some("SSO is broken".into()),
                project_id: Some("p7".into()),
                status: Some(Status::InReview),
                priority: Some(Priority::High),
                assignee: Some(Assignee {
                    name: "Ada Lovelace".into(),
                    email: Some("ada@example.com".into()),
                    avatar: None,
                }),
                due_date: None,
                labels: vec!["bug".into(), "auth".into()],
            }
        );
    }

    #[test]
    fn parse_desc_between_title_words() {
        let add = parse_issue_args(&args(&["Fix", "-d", "urgent", "login", "bug"])).unwrap();
        assert_eq!(add.title().as_deref(), Some("Fix login bug"));
        assert_eq!(add.description.as_deref(), Some("urgent"));
    }

    #[test]
    fn parse_errors() {
        let err = parse_issue_args(&args(&["My issue", "-d"])).unwrap_err();
        assert!(err.to_string().contains("Missing value"));
        let err = parse_issue_args(&args(&["My issue", "-s", "blocked"])).unwrap_err();
        assert!(err.to_string().contains("Unknown status"));
        let err = parse_issue_args(&args(&["My issue", "-a", "Ada <ada@example.com"])).unwrap_err();
        assert!(err.to_string().contains("'>'"));
        let err = parse_issue_args(&args(&["My issue", "--due", "next week"])).unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn due_date_is_end_of_day() {
        let add = parse_issue_args(&args(&["My issue", "--due", "2026-03-04"])).unwrap();
        assert_eq!(
            add.due_date.unwrap().to_rfc3339(),
            "2026-03-04T23:59:59+00:00"
        );
    }

    #[test]
    fn parse_list_options() {
        let list = parse_list_args(&args(&[
            "p1", "-q", "login", "--sort", "priority", "--desc", "--overdue", "-l", "bug",
        ]))
        .unwrap();
        assert_eq!(list.project_id.as_deref(), Some("p1"));
        assert_eq!(list.query.as_deref(), Some("login"));
        assert_eq!(list.sort, Some((SortKey::Priority, SortOrder::Desc)));
        assert_eq!(list.filter.is_overdue, Some(true));
        assert_eq!(list.filter.labels, ["bug"]);
        assert!(list.is_flat());

        assert!(!parse_list_args(&args(&["p1"])).unwrap().is_flat());
        assert!(parse_list_args(&args(&["p1", "p2"])).is_err());
        assert!(parse_list_args(&args(&["--sort", "size"])).is_err());
    }

    #[tokio::test]
    async fn add_uses_default_project() {
        let api = Arc::new(MockApi::new(vec![]));
        let mut coordinator = Coordinator::new(api.clone());
        handle_add(&mut coordinator, Some("p1"), &args(&["Ship", "board"]))
            .await
            .unwrap();
        assert_eq!(api.calls(), ["create Ship board"]);
        assert_eq!(api.server_issue("srv-1").unwrap().project_id, "p1");
    }

    #[tokio::test]
    async fn add_without_project_fails_before_sending() {
        let api = Arc::new(MockApi::new(vec![]));
        let mut coordinator = Coordinator::new(api.clone());
        assert!(handle_add(&mut coordinator, None, &args(&["Ship it"]))
            .await
            .is_err());
        assert!(handle_add(&mut coordinator, Some("p1"), &args(&["-l", "bug"]))
            .await
            .is_err());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn edit_sends_only_given_fields() {
        let api = Arc::new(MockApi::new(vec![issue("1", Status::ToDo)]));
        let mut coordinator = Coordinator::new(api.clone());
        coordinator.fetch_project("p1").await.unwrap();
        handle_edit(&mut coordinator, &args(&["1", "--priority", "critical"]))
            .await
            .unwrap();
        let server = api.server_issue("1").unwrap();
        assert_eq!(server.priority, Priority::Critical);
        assert_eq!(server.title, "Issue 1");
        assert_eq!(coordinator.store().get("1").unwrap().priority, Priority::Critical);

        assert!(handle_edit(&mut coordinator, &args(&["1"])).await.is_err());
    }

    #[tokio::test]
    async fn move_confirms_with_backend() {
        let api = Arc::new(MockApi::new(vec![issue("1", Status::ToDo)]));
        let mut coordinator = Coordinator::new(api.clone());
        handle_move(&mut coordinator, &args(&["p1", "1", "done"]))
            .await
            .unwrap();
        assert_eq!(api.server_issue("1").unwrap().status, Status::Done);
        assert_eq!(coordinator.store().get("1").unwrap().status, Status::Done);
    }
}
