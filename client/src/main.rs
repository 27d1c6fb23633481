use clap::Parser;
use todos_client::{smoke, TodoClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Drives every todo route of a running server and checks the results.
#[derive(Debug, Parser)]
#[command(name = "todos-smoke", version)]
struct Args {
    /// Base URL of the server.
    #[arg(long, env = "TODOS_BASE_URL", default_value = "http://localhost:3000")]
    base_url: String,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let client = TodoClient::new(args.base_url);

    info!(base_url = client.base_url(), "running smoke scenario");
    smoke::run(&client).await?;
    info!("all checks passed");

    Ok(())
}
