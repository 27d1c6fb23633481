use eyre::Context;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use todos_api::v1::{Deleted, ErrorBody, NewTodo, Todo, TodoPatch};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("HTTP {status}: {error}")]
    Status { status: u16, error: String },
}

impl ClientError {
    pub fn is_not_found(err: &eyre::Report) -> bool {
        matches!(err.downcast_ref::<Self>(), Some(Self::NotFound(_)))
    }
}

/// Typed client for the `/todos` routes.
#[derive(Clone, Debug)]
pub struct TodoClient {
    http: reqwest::Client,
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();

        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list(&self) -> eyre::Result<Vec<Todo>> {
        let response = self
            .http
            .get(format!("{}/todos", self.base_url))
            .send()
            .await
            .wrap_err("GET /todos")?;

        parse(response).await
    }

    pub async fn create(&self, todo: &NewTodo) -> eyre::Result<Todo> {
        let response = self
            .http
            .post(format!("{}/todos", self.base_url))
            .json(todo)
            .send()
            .await
            .wrap_err("POST /todos")?;

        parse(response).await
    }

    pub async fn get(&self, id: Uuid) -> eyre::Result<Todo> {
        let response = self
            .http
            .get(format!("{}/todos/{}", self.base_url, id))
            .send()
            .await
            .wrap_err_with(|| format!("GET /todos/{id}"))?;

        parse(response).await
    }

    pub async fn update(&self, id: Uuid, patch: &TodoPatch) -> eyre::Result<Todo> {
        let response = self
            .http
            .put(format!("{}/todos/{}", self.base_url, id))
            .json(patch)
            .send()
            .await
            .wrap_err_with(|| format!("PUT /todos/{id}"))?;

        parse(response).await
    }

    pub async fn delete(&self, id: Uuid) -> eyre::Result<Deleted> {
        let response = self
            .http
            .delete(format!("{}/todos/{}", self.base_url, id))
            .send()
            .await
            .wrap_err_with(|| format!("DELETE /todos/{id}"))?;

        parse(response).await
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> eyre::Result<T> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let error = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => String::new(),
    };

    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(error).into());
    }

    Err(ClientError::Status {
        status: status.as_u16(),
        error,
    }
    .into())
}
