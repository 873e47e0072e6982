//! Face indexing pipeline binary.

use aws_config::BehaviorVersion;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fdx_indexer::{pipeline, IndexerError, RunConfig, StsIdentity};
use fdx_storage::StorageClient;
use fdx_vision::VisionClient;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("fdx_indexer=info".parse().unwrap())
        .add_directive("fdx_storage=info".parse().unwrap())
        .add_directive("fdx_vision=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting facedex");

    let config = match RunConfig::resolve() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to read run configuration: {}", e);
            std::process::exit(2);
        }
    };

    let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let identity = StsIdentity::new(&aws_config);
    let store = StorageClient::new(&aws_config);
    let faces = VisionClient::new(&aws_config);

    match pipeline::run(&identity, &store, &faces, &config).await {
        Ok(summary) => info!(
            "Run complete: {} images, {} already indexed, {} faces indexed, {} moved to {}",
            summary.images_seen,
            summary.already_indexed,
            summary.faces_indexed,
            summary.relocated,
            config.no_faces_bucket
        ),
        Err(IndexerError::InvalidCredentials) => {
            error!("Invalid AWS credentials.");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            std::process::exit(1);
        }
    }
}
