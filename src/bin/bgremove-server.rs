//! Replace-by-tag background removal server binary

use bgremove_server::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}
