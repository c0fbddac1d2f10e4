use taxchat_relay::{Config, relay};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration; variables already in the environment win over .env
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!("Loaded configuration: {:?}", config);

    relay::serve(config).await
}
