use roleiconbot::{config::Config, init, logging, run};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::new()?;
    logging::setup_logging(config.log_level)?;

    let config = Arc::new(config);
    let clients = init(Arc::clone(&config)).await?;

    run(clients).await?;

    Ok(())
}
