//! Credential verification.

use async_trait::async_trait;
use aws_config::SdkConfig;
use tracing::{error, info};

use crate::pipeline::Identity;

/// STS-backed identity check.
pub struct StsIdentity {
    client: aws_sdk_sts::Client,
}

impl StsIdentity {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sts::Client::new(config),
        }
    }
}

#[async_trait]
impl Identity for StsIdentity {
    /// Call GetCallerIdentity with no input.
    ///
    /// Every failure class (expired or invalid credentials, network, auth)
    /// is reported and converted to `false`; the underlying error is not
    /// propagated.
    async fn verify(&self) -> bool {
        match self.client.get_caller_identity().send().await {
            Ok(identity) => {
                info!(
                    "Credentials verified for {}",
                    identity.arn().unwrap_or("<unknown>")
                );
                true
            }
            Err(err) => {
                error!("Credentials are not valid: {}", err);
                false
            }
        }
    }
}
