use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use todos_api::v1::{Deleted, NewTodo, Todo, TodoPatch};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::ApiError,
    extract::{Json, Path},
    AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/todos",
            get(list_todos)
                .post(create_todo)
                .fallback(method_not_allowed),
        )
        .route(
            "/todos/:id",
            get(get_todo)
                .put(update_todo)
                .delete(delete_todo)
                .fallback(method_not_allowed),
        )
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn list_todos(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.store.list().await?;
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewTodo>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let todo = state.store.create(new).await?;

    info!(
        id = %todo.id,
        title = %todo.title,
        "created todo"
    );

    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Todo>, ApiError> {
    let todo = state.store.get(id).await?.ok_or(ApiError::TodoNotFound)?;
    Ok(Json(todo))
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TodoPatch>,
) -> Result<Json<Todo>, ApiError> {
    let todo = state.store.update(id, patch).await?.ok_or(ApiError::TodoNotFound)?;

    info!(
        id = %todo.id,
        completed = todo.completed,
        "updated todo"
    );

    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, ApiError> {
    let todo = state.store.delete(id).await?.ok_or(ApiError::TodoNotFound)?;

    info!(id = %todo.id, "deleted todo");

    Ok(Json(Deleted::default()))
}
