use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Builds a fresh record from a validated payload, assigning the id and
    /// creation time.
    pub fn create(new: NewTodo) -> Result<Self, ValidationError> {
        new.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            title: new.title.unwrap_or_default(),
            description: new.description,
            completed: new.completed.unwrap_or(false),
            created_at: Utc::now(),
        })
    }

    /// Applies the fields present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: TodoPatch) -> Result<(), ValidationError> {
        patch.validate()?;

        if let Some(Some(title)) = patch.title {
            self.title = title;
        }

        if let Some(description) = patch.description {
            self.description = description;
        }

        if let Some(completed) = patch.completed {
            self.completed = completed;
        }

        Ok(())
    }
}

/// Payload for creating a todo.
///
/// `id` and `createdAt` are not part of the payload; serde drops them along
/// with any other unknown field.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.title {
            None => Err(ValidationError::MissingTitle),
            Some(title) => validate_title(title),
        }
    }
}

/// Partial field set for updating a todo.
///
/// The outer `Option` tells whether a field was sent at all, the inner one
/// whether it was `null`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(Some(title.into()));
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.title {
            None => Ok(()),
            Some(None) => Err(ValidationError::MissingTitle),
            Some(Some(title)) => validate_title(title),
        }
    }
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    Ok(())
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Todo validation failed: title is required")]
    MissingTitle,
    #[error("Todo validation failed: title must not be empty")]
    EmptyTitle,
}

/// Body of every error response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Acknowledgment returned by a successful delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
}

impl Default for Deleted {
    fn default() -> Self {
        Self {
            message: String::from("Todo deleted"),
        }
    }
}
