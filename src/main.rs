use log::error;
use voice_sql::config::ServiceConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>>
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = ServiceConfig::from_env().map_err(|e| {
      error!("{}", e);
      e
    })?;

    voice_sql::server::run_server(&config).await?;
    Ok(())
}
