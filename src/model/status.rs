use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workflow stage of an issue. Each value is also one board column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "In Review")]
    InReview,
    #[serde(rename = "Done")]
    Done,
}

impl Status {
    /// Column order on the board.
    pub const ALL: [Status; 4] = [
        Status::ToDo,
        Status::InProgress,
        Status::InReview,
        Status::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::ToDo => "To Do",
            Status::InProgress => "In Progress",
            Status::InReview => "In Review",
            Status::Done => "Done",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Status::ToDo => 0,
            Status::InProgress => 1,
            Status::InReview => 2,
            Status::Done => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Status> {
        Status::ALL.get(index).copied()
    }

    /// Column to the right, if any.
    pub fn next(&self) -> Option<Status> {
        Status::from_index(self.index() + 1)
    }

    /// Column to the left, if any.
    pub fn previous(&self) -> Option<Status> {
        self.index().checked_sub(1).and_then(Status::from_index)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the display label or a compact form: "In Progress", "in-progress", "inprogress".
impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "todo" => Ok(Status::ToDo),
            "inprogress" => Ok(Status::InProgress),
            "inreview" | "review" => Ok(Status::InReview),
            "done" => Ok(Status::Done),
            _ => Err(format!(
                "Unknown status '{s}' (expected To Do, In Progress, In Review or Done)"
            )),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(format!(
                "Unknown priority '{s}' (expected Low, Medium, High or Critical)"
            )),
        }
    }
}

/// A card dropped from one column onto another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropRequest {
    pub issue_id: String,
    pub source: Status,
    pub target: Status,
}

/// Resolve a drop into the status the issue should move to.
///
/// Every transition between distinct states is allowed, backward ones included.
/// Dropping onto the source column yields `None` and must not touch the store or the backend.
pub fn resolve_drop(source: Status, target: Status) -> Option<Status> {
    if source == target {
        None
    } else {
        Some(target)
    }
}
