use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DefaultOnNull};
use std::fmt;

/// Server-assigned task identifier. Kept in whatever JSON shape the server
/// used so it is echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{}", n),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for TaskId {
    fn from(n: i64) -> Self {
        TaskId::Number(n)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId::Text(s.to_string())
    }
}

/// One of the three board columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Todo,
    InProgress,
    Done,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Todo, Bucket::InProgress, Bucket::Done];

    pub fn key(self) -> &'static str {
        match self {
            Bucket::Todo => "todo",
            Bucket::InProgress => "inProgress",
            Bucket::Done => "done",
        }
    }

    /// The `status` string a task carries while it sits in this bucket.
    pub fn label(self) -> &'static str {
        match self {
            Bucket::Todo => "To Do",
            Bucket::InProgress => "In Progress",
            Bucket::Done => "Done",
        }
    }

    /// Exact, case-sensitive match on the status label.
    pub fn from_status(status: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.label() == status)
    }

    pub fn index(self) -> usize {
        match self {
            Bucket::Todo => 0,
            Bucket::InProgress => 1,
            Bucket::Done => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn prev(self) -> Self {
        Self::from_index(self.index().saturating_sub(1)).unwrap_or(self)
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(self)
    }
}

/// `title`, `description` and `status` read a missing key or JSON `null` as
/// an empty string, which leaves the task in no bucket.
#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub title: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub description: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub status: String, // "To Do", "In Progress", "Done"
    /// Fields the board does not use but must not drop on a full replacement.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn bucket(&self) -> Option<Bucket> {
        Bucket::from_status(&self.status)
    }

    /// Copy of this task relabelled for `bucket`.
    pub fn moved_to(&self, bucket: Bucket) -> Task {
        Task {
            status: bucket.label().to_string(),
            ..self.clone()
        }
    }
}

/// Create-form state. This is also the POST body.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: String,
}

impl Default for NewTask {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: Bucket::Todo.label().to_string(),
        }
    }
}

impl NewTask {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() || self.description.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Title and description are required.")]
    MissingFields,
}
