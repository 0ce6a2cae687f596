use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use diwali_night::config::BlobConfig;
use diwali_night::services::blob_service::GithubBlobStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match BlobConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("blob store config: {}", e);
            std::process::exit(1);
        }
    };
    let target = format!("{}/{}@{}", config.repo_owner, config.repo_name, config.branch);

    match GithubBlobStore::new(config).check_repository_access().await {
        Ok(()) => println!("blob store ok: {}", target),
        Err(e) => {
            eprintln!("blob store check failed for {}: {}", target, e);
            std::process::exit(1);
        }
    }
}
