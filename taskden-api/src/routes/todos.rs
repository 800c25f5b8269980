/// Todo endpoints
///
/// Every handler is scoped to the authenticated caller. A todo owned by
/// someone else answers exactly like a missing one (404), so ids never leak
/// across owners.
///
/// # Endpoints
///
/// - `POST /api/todos` - Create
/// - `GET /api/todos` - List (`?status=all|active|completed&search=text`)
/// - `GET /api/todos/stats` - Counts
/// - `GET /api/todos/:id` - Fetch
/// - `PUT /api/todos/:id` - Partial update (title, description, completed)
/// - `PATCH /api/todos/:id/complete` - Toggle completion
/// - `DELETE /api/todos/:id` - Delete

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskden_shared::{
    auth::middleware::AuthContext,
    models::{CreateTodo, StatusFilter, Todo, TodoFilter, TodoStats, UpdateTodo},
};
use uuid::Uuid;
use validator::Validate;

/// Create todo request
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateTodoRequest {
    /// Title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Optional description
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Update todo request; absent fields are left untouched
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateTodoRequest {
    /// New title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    /// New description; blank clears it
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    /// Absolute completion flag
    pub completed: Option<bool>,
}

/// List query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Status filter (default: all)
    #[serde(default)]
    pub status: StatusFilter,

    /// Case-insensitive substring match on title or description
    pub search: Option<String>,
}

// Ids that are not UUIDs cannot name any todo
fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Todo not found".to_string()))
}

/// Create a todo
///
/// # Response
///
/// `201 Created` with the todo; `completed` starts `false`.
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTodoRequest>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    req.validate()?;

    let todo = state
        .todos
        .create(
            auth.user_id,
            CreateTodo {
                title: req.title,
                description: req.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

/// List the caller's todos in creation order
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Todo>> {
    let filter = TodoFilter {
        status: query.status,
        search: query.search,
    };

    Json(state.todos.list(auth.user_id, &filter).await)
}

/// Counts of the caller's todos
pub async fn todo_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Json<TodoStats> {
    Json(state.todos.stats(auth.user_id).await)
}

/// Fetch one todo
pub async fn get_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Todo>> {
    let todo = state.todos.get(auth.user_id, parse_id(&id)?).await?;
    Ok(Json(todo))
}

/// Partially update a todo
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTodoRequest>,
) -> ApiResult<Json<Todo>> {
    let id = parse_id(&id)?;
    req.validate()?;

    let todo = state
        .todos
        .update(
            auth.user_id,
            id,
            UpdateTodo {
                title: req.title,
                description: req.description,
                completed: req.completed,
            },
        )
        .await?;

    Ok(Json(todo))
}

/// Flip a todo's completion flag
pub async fn toggle_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Todo>> {
    let todo = state
        .todos
        .toggle_complete(auth.user_id, parse_id(&id)?)
        .await?;
    Ok(Json(todo))
}

/// Delete a todo
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.todos.delete(auth.user_id, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskden_shared::models::todo::MAX_TITLE_LEN;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_id("42"), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_create_request_rejects_unknown_fields() {
        let parsed = serde_json::from_str::<CreateTodoRequest>(
            r#"{"title":"Buy milk","owner_id":"00000000-0000-0000-0000-000000000000"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_update_request_accepts_completed() {
        let req: UpdateTodoRequest = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert_eq!(req.completed, Some(true));
        assert!(req.title.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_validation() {
        let req = CreateTodoRequest {
            title: "x".repeat(MAX_TITLE_LEN + 1),
            description: None,
        };
        assert!(req.validate().is_err());

        let req = CreateTodoRequest {
            title: "Buy milk".to_string(),
            description: Some("2 liters".to_string()),
        };
        assert!(req.validate().is_ok());
    }
}
