use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Records per list page.
pub const PAGE_SIZE: u64 = 5;

/// Goal lifecycle. The two toggles below form the full transition table;
/// there is no other way to change a status.
///
/// toggle_completed: active -> completed, completed -> active,
/// abandoned -> active. The abandoned -> active edge is intentional: a
/// "complete" action on an abandoned goal revives it rather than marking
/// it completed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
    Abandoned,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "abandoned" => Some(Self::Abandoned),
            _ => None,
        }
    }

    pub fn toggle_completed(self) -> Self {
        match self {
            Self::Active => Self::Completed,
            Self::Completed | Self::Abandoned => Self::Active,
        }
    }

    pub fn toggle_abandoned(self) -> Self {
        match self {
            Self::Abandoned => Self::Active,
            Self::Active | Self::Completed => Self::Abandoned,
        }
    }
}

/// Stage lifecycle, same transition table as goals.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Active,
    Completed,
    Abandoned,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "abandoned" => Some(Self::Abandoned),
            _ => None,
        }
    }

    pub fn toggle_completed(self) -> Self {
        match self {
            Self::Active => Self::Completed,
            Self::Completed | Self::Abandoned => Self::Active,
        }
    }

    pub fn toggle_abandoned(self) -> Self {
        match self {
            Self::Abandoned => Self::Active,
            Self::Active | Self::Completed => Self::Abandoned,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionOutcome {
    Completed,
    NotCompleted,
}

impl CompletionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::NotCompleted => "not_completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(Self::Completed),
            "not_completed" => Some(Self::NotCompleted),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoalInput {
    pub name: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GoalChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Option<GoalStatus>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GoalQuery {
    pub name: Option<String>,
    pub status: Option<GoalStatus>,
    pub page: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StageInput {
    pub stage_name: String,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StageChanges {
    pub stage_name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Option<StageStatus>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HabitInput {
    pub name: String,
    pub description: Option<String>,
    pub month_goal: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HabitChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub month_goal: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HabitQuery {
    pub name: Option<String>,
    pub page: Option<u64>,
}

/// One page of an owner-scoped list. `page` is 1-based.
#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_count: u64,
    pub total: u64,
}
