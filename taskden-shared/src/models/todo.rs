/// Todo model and the ownership-scoped todo store
///
/// Every operation takes the caller's identity key and filters on
/// `(id, owner)` jointly. A todo that exists but belongs to someone else is
/// reported exactly like a todo that does not exist (`CoreError::NotFound`),
/// so ids cannot be probed across owners.
///
/// # State Machine
///
/// ```text
/// active ⇄ completed      (toggle_complete)
/// active | completed → deleted   (record removed)
/// ```
///
/// # Example
///
/// ```
/// use taskden_shared::models::todo::{CreateTodo, TodoStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = TodoStore::new();
/// let alice = Uuid::new_v4();
///
/// let todo = store.create(alice, CreateTodo {
///     title: "Buy milk".to_string(),
///     description: None,
/// }).await?;
/// assert!(!todo.completed);
///
/// let toggled = store.toggle_complete(alice, todo.id).await?;
/// assert!(toggled.completed);
///
/// // Another caller cannot see it
/// assert!(store.get(Uuid::new_v4(), todo.id).await.is_err());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Maximum title length in characters
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum description length in characters
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Completion status of a todo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    /// Not yet done
    Active,

    /// Done
    Completed,
}

impl TodoStatus {
    /// The state reached by toggling
    pub fn toggled(self) -> Self {
        match self {
            TodoStatus::Active => TodoStatus::Completed,
            TodoStatus::Completed => TodoStatus::Active,
        }
    }
}

/// Todo record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Opaque id, generated server-side
    pub id: Uuid,

    /// Owning identity; fixed at creation
    #[serde(skip_serializing)]
    pub owner_id: Uuid,

    /// Non-empty title
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Whether the todo is done
    pub completed: bool,

    /// When the todo was created
    pub created_at: DateTime<Utc>,

    /// When the todo was last changed
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Current status derived from `completed`
    pub fn status(&self) -> TodoStatus {
        if self.completed {
            TodoStatus::Completed
        } else {
            TodoStatus::Active
        }
    }
}

/// Input for creating a todo
#[derive(Debug, Clone, Default)]
pub struct CreateTodo {
    /// Title (trimmed, must be non-empty)
    pub title: String,

    /// Optional description (blank becomes `None`)
    pub description: Option<String>,
}

/// Partial update; `None` fields are left untouched
///
/// A supplied blank description clears it. `completed` sets the flag to an
/// absolute value, so repeating the same update is idempotent.
#[derive(Debug, Clone, Default)]
pub struct UpdateTodo {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New completion flag
    pub completed: Option<bool>,
}

/// Status filter for listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Every todo
    #[default]
    All,

    /// Only todos not yet completed
    Active,

    /// Only completed todos
    Completed,
}

/// List filter; the owner scope is applied regardless of these fields
#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    /// Status filter
    pub status: StatusFilter,

    /// Case-insensitive substring match on title or description
    pub search: Option<String>,
}

impl TodoFilter {
    fn matches(&self, todo: &Todo, needle: Option<&str>) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => todo.status() == TodoStatus::Active,
            StatusFilter::Completed => todo.status() == TodoStatus::Completed,
        };

        let search_ok = match needle {
            None => true,
            Some(needle) => {
                todo.title.to_lowercase().contains(needle)
                    || todo
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(needle))
            }
        };

        status_ok && search_ok
    }
}

/// Per-owner counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoStats {
    /// All todos
    pub total: usize,

    /// Todos not yet completed
    pub active: usize,

    /// Completed todos
    pub completed: usize,
}

#[derive(Debug, Default)]
struct Todos {
    by_id: HashMap<Uuid, Todo>,
    // Creation order per owner
    by_owner: HashMap<Uuid, Vec<Uuid>>,
}

impl Todos {
    fn owned(&self, owner: Uuid, id: Uuid) -> CoreResult<&Todo> {
        self.by_id
            .get(&id)
            .filter(|t| t.owner_id == owner)
            .ok_or(CoreError::NotFound)
    }

    fn owned_mut(&mut self, owner: Uuid, id: Uuid) -> CoreResult<&mut Todo> {
        self.by_id
            .get_mut(&id)
            .filter(|t| t.owner_id == owner)
            .ok_or(CoreError::NotFound)
    }

    fn iter_owner(&self, owner: Uuid) -> impl Iterator<Item = &Todo> {
        self.by_owner
            .get(&owner)
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
    }
}

/// In-memory todo store
///
/// A single `RwLock` guards the whole store: writers are exclusive, readers
/// share, and no reader ever sees a half-applied write.
#[derive(Debug, Default)]
pub struct TodoStore {
    inner: RwLock<Todos>,
}

fn validate_title(title: &str) -> CoreResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CoreError::Validation("Title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(title.to_string())
}

fn validate_description(description: Option<String>) -> CoreResult<Option<String>> {
    let description = description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    if let Some(ref d) = description {
        if d.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(CoreError::Validation(format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }
    }
    Ok(description)
}

impl TodoStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a todo owned by `owner`
    ///
    /// # Errors
    ///
    /// `CoreError::Validation` if the title is blank or a field is too long
    pub async fn create(&self, owner: Uuid, data: CreateTodo) -> CoreResult<Todo> {
        let title = validate_title(&data.title)?;
        let description = validate_description(data.description)?;
        let now = Utc::now();

        let todo = Todo {
            id: Uuid::new_v4(),
            owner_id: owner,
            title,
            description,
            completed: false,
            created_at: now,
            updated_at: now,
        };

        let mut inner = self.inner.write().await;
        inner.by_owner.entry(owner).or_default().push(todo.id);
        inner.by_id.insert(todo.id, todo.clone());

        tracing::debug!(user_id = %owner, todo_id = %todo.id, "todo created");
        Ok(todo)
    }

    /// Lists the caller's todos in creation order
    pub async fn list(&self, owner: Uuid, filter: &TodoFilter) -> Vec<Todo> {
        let needle = filter
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        self.inner
            .read()
            .await
            .iter_owner(owner)
            .filter(|t| filter.matches(t, needle.as_deref()))
            .cloned()
            .collect()
    }

    /// Gets one of the caller's todos
    ///
    /// # Errors
    ///
    /// `CoreError::NotFound` if the id is unknown or owned by someone else
    pub async fn get(&self, owner: Uuid, id: Uuid) -> CoreResult<Todo> {
        self.inner.read().await.owned(owner, id).cloned()
    }

    /// Applies a partial update to one of the caller's todos
    ///
    /// # Errors
    ///
    /// - `CoreError::Validation` if a supplied field is invalid
    /// - `CoreError::NotFound` if the id is unknown or owned by someone else
    pub async fn update(&self, owner: Uuid, id: Uuid, data: UpdateTodo) -> CoreResult<Todo> {
        let title = data.title.as_deref().map(validate_title).transpose()?;
        let description = match data.description {
            Some(d) => Some(validate_description(Some(d))?),
            None => None,
        };

        let mut inner = self.inner.write().await;
        let todo = inner.owned_mut(owner, id)?;

        if let Some(title) = title {
            todo.title = title;
        }
        if let Some(description) = description {
            todo.description = description;
        }
        if let Some(completed) = data.completed {
            todo.completed = completed;
        }
        todo.updated_at = Utc::now();

        tracing::debug!(user_id = %owner, todo_id = %id, "todo updated");
        Ok(todo.clone())
    }

    /// Flips the completed flag of one of the caller's todos
    ///
    /// # Errors
    ///
    /// `CoreError::NotFound` if the id is unknown or owned by someone else
    pub async fn toggle_complete(&self, owner: Uuid, id: Uuid) -> CoreResult<Todo> {
        let mut inner = self.inner.write().await;
        let todo = inner.owned_mut(owner, id)?;

        todo.completed = todo.status().toggled() == TodoStatus::Completed;
        todo.updated_at = Utc::now();

        tracing::debug!(user_id = %owner, todo_id = %id, completed = todo.completed, "todo toggled");
        Ok(todo.clone())
    }

    /// Permanently removes one of the caller's todos
    ///
    /// # Errors
    ///
    /// `CoreError::NotFound` if the id is unknown or owned by someone else
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> CoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.owned(owner, id)?;

        inner.by_id.remove(&id);
        let owner_empty = match inner.by_owner.get_mut(&owner) {
            Some(ids) => {
                ids.retain(|existing| *existing != id);
                ids.is_empty()
            }
            None => false,
        };
        if owner_empty {
            inner.by_owner.remove(&owner);
        }

        tracing::debug!(user_id = %owner, todo_id = %id, "todo deleted");
        Ok(())
    }

    /// Counts the caller's todos by status
    pub async fn stats(&self, owner: Uuid) -> TodoStats {
        let inner = self.inner.read().await;
        let mut stats = TodoStats::default();

        for todo in inner.iter_owner(owner) {
            stats.total += 1;
            match todo.status() {
                TodoStatus::Active => stats.active += 1,
                TodoStatus::Completed => stats.completed += 1,
            }
        }
        stats
    }
}
