//! Environment smoke check: verifies credentials and lists the buckets
//! they can see, without touching any collection.

use aws_config::BehaviorVersion;

use fdx_indexer::{Identity, StsIdentity};
use fdx_storage::StorageClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

    let identity = StsIdentity::new(&config);
    if !identity.verify().await {
        anyhow::bail!("Invalid AWS credentials.");
    }

    let store = StorageClient::new(&config);
    let buckets = store.list_buckets().await?;
    println!("S3 buckets:");
    for bucket in &buckets {
        println!("  {}", bucket);
    }

    println!("facedex-selfcheck: ok ({} buckets)", buckets.len());
    Ok(())
}
