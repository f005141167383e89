use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

pub(crate) const TITLE_MAX_CHARS: usize = 200;
pub(crate) const DESCRIPTION_MAX_CHARS: usize = 1000;

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    pub fn label(self) -> &'static str {
        match self {
            TodoStatus::Pending => "Pending",
            TodoStatus::InProgress => "In Progress",
            TodoStatus::Completed => "Completed",
        }
    }

    /// Wire value, also used as the `<option value>`.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A row of the `todos` table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Todo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TodoStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert payload. Status is left out so the column default applies.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub(crate) struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub user_id: String,
}

/// Partial update. Only `Some` fields are sent; `description: Some(None)`
/// clears the column.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TodoStatus>,
}

impl TodoPatch {
    pub fn status(status: TodoStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn content(title: String, description: Option<String>) -> Self {
        Self {
            title: Some(title),
            description: Some(description),
            status: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Authenticated session as persisted in localStorage.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now_secs)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
}

/// Trims `s`, mapping blank input to `None`.
pub(crate) fn trimmed_or_none(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Required-title and length checks shared by create and edit.
pub(crate) fn validate_fields(title: &str, description: &str) -> Option<(String, Option<String>)> {
    let title = trimmed_or_none(title)?;
    let description = trimmed_or_none(description);

    if title.chars().count() > TITLE_MAX_CHARS {
        return None;
    }
    if description
        .as_deref()
        .is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_CHARS)
    {
        return None;
    }

    Some((title, description))
}
