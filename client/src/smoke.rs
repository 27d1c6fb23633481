//! End-to-end walk through every route against a running server.

use eyre::{bail, ensure};
use todos_api::v1::{NewTodo, TodoPatch};
use tracing::info;

use crate::{ClientError, TodoClient};

pub async fn run(client: &TodoClient) -> eyre::Result<()> {
    let todos = client.list().await?;
    info!(count = todos.len(), "listed todos");

    let docker = client
        .create(
            &NewTodo::new("Learn Docker").description("Understand Docker and containerization"),
        )
        .await?;
    info!(id = %docker.id, "created todo");
    ensure!(!docker.completed, "new todo should not be completed");

    let kubernetes = client
        .create(
            &NewTodo::new("Learn Kubernetes").description("Understand Kubernetes orchestration"),
        )
        .await?;
    info!(id = %kubernetes.id, "created todo");

    let todos = client.list().await?;
    info!(count = todos.len(), "listed todos");
    ensure!(
        todos.contains(&docker) && todos.contains(&kubernetes),
        "created todos missing from list"
    );

    let fetched = client.get(docker.id).await?;
    ensure!(fetched == docker, "fetched todo differs from created one");

    let patch = TodoPatch::default()
        .title("Learn Docker & Kubernetes")
        .completed(true);
    let updated = client.update(docker.id, &patch).await?;
    info!(id = %updated.id, "updated todo");
    ensure!(
        updated.completed && updated.title == "Learn Docker & Kubernetes",
        "update was not applied"
    );
    ensure!(
        updated.description == docker.description,
        "update touched an unsent field"
    );

    let fetched = client.get(docker.id).await?;
    ensure!(fetched == updated, "update was not persisted");

    let deleted = client.delete(docker.id).await?;
    info!(id = %docker.id, message = %deleted.message, "deleted todo");

    let todos = client.list().await?;
    ensure!(
        todos.iter().all(|todo| todo.id != docker.id),
        "deleted todo still listed"
    );

    match client.get(docker.id).await {
        Err(err) if ClientError::is_not_found(&err) => {
            info!(id = %docker.id, "deleted todo is gone");
        }
        Err(err) => return Err(err),
        Ok(_) => bail!("deleted todo {} is still readable", docker.id),
    }

    Ok(())
}
