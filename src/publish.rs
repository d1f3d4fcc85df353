//! Publish stage: provisions an S3 bucket for public static-website hosting
//! and uploads the fetched page into it.
//!
//! The cloud calls sit behind the [`ObjectStore`] trait so the orchestration
//! can be exercised against deterministic mocks; [`S3Store`] is the real
//! client. The stage is a linear chain: create bucket, relax the
//! public-access block, upload the object, enable website hosting, apply the
//! public-read policy, then compute the endpoint. The first failure aborts
//! the chain; nothing is rolled back.

use async_trait::async_trait;
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, IndexDocument,
    PublicAccessBlockConfiguration, WebsiteConfiguration,
};
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde_json::json;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::config::PublishConfig;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// The five cloud operations the publish stage performs, in the order it
/// performs them. Implemented by the real S3 client and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create the bucket in the given region. A bucket that already exists
    /// and is owned by the caller is success, not an error.
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), StoreError>;

    /// Disable all four public-access-blocking flags on the bucket.
    async fn disable_public_access_block(&self, bucket: &str) -> Result<(), StoreError>;

    /// Upload the object, overwriting any existing object at the key.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// Configure the bucket to serve `index_key` as the website index document.
    async fn enable_website_hosting(&self, bucket: &str, index_key: &str)
        -> Result<(), StoreError>;

    /// Attach the given policy document to the bucket.
    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), StoreError>;
}

/// Real `ObjectStore` backed by the AWS SDK. Credentials and endpoint
/// resolution are delegated to the SDK's ambient configuration (env vars,
/// credential files, or instance profile).
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    /// Builds a client pinned to `region` with a per-operation deadline.
    /// Credentials come from the SDK's default resolution chain.
    pub async fn new_from_env(region: &str, operation_timeout: Duration) -> Self {
        dotenvy::dotenv().ok(); // loads environment variables from .env if present
        let timeouts = aws_config::timeout::TimeoutConfig::builder()
            .operation_timeout(operation_timeout)
            .build();
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .timeout_config(timeouts)
            .load()
            .await;
        Self {
            client: aws_sdk_s3::Client::new(&sdk_config),
        }
    }
}

/// The bucket-location constraint to send for `region`. us-east-1 is the
/// default location and must not send one.
fn location_constraint_for(region: &str) -> Option<CreateBucketConfiguration> {
    if region == "us-east-1" {
        None
    } else {
        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build(),
        )
    }
}

/// Maps a create-bucket service error: a bucket that already exists and is
/// owned by the caller counts as success, everything else stays an error.
fn tolerate_owned_bucket(err: CreateBucketError) -> Result<(), StoreError> {
    if err.is_bucket_already_owned_by_you() {
        Ok(())
    } else {
        Err(Box::new(err))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), StoreError> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if let Some(configuration) = location_constraint_for(region) {
            request = request.create_bucket_configuration(configuration);
        }

        match request.send().await {
            Ok(_) => {
                info!(bucket, region, "Bucket created");
                Ok(())
            }
            Err(err) => match tolerate_owned_bucket(err.into_service_error()) {
                Ok(()) => {
                    info!(bucket, "Bucket already exists and is owned by this account");
                    Ok(())
                }
                Err(e) => {
                    error!(bucket, error = ?e, "Bucket creation failed");
                    Err(e)
                }
            },
        }
    }

    async fn disable_public_access_block(&self, bucket: &str) -> Result<(), StoreError> {
        self.client
            .put_public_access_block()
            .bucket(bucket)
            .public_access_block_configuration(
                PublicAccessBlockConfiguration::builder()
                    .block_public_acls(false)
                    .ignore_public_acls(false)
                    .block_public_policy(false)
                    .restrict_public_buckets(false)
                    .build(),
            )
            .send()
            .await?;
        info!(bucket, "Public access block disabled");
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let bytes = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await?;
        info!(bucket, key, bytes, content_type, "Object uploaded");
        Ok(())
    }

    async fn enable_website_hosting(
        &self,
        bucket: &str,
        index_key: &str,
    ) -> Result<(), StoreError> {
        let website = WebsiteConfiguration::builder()
            .index_document(IndexDocument::builder().suffix(index_key).build()?)
            .build();
        self.client
            .put_bucket_website()
            .bucket(bucket)
            .website_configuration(website)
            .send()
            .await?;
        info!(bucket, index_key, "Static website hosting enabled");
        Ok(())
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), StoreError> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await?;
        info!(bucket, "Bucket policy applied for public read access");
        Ok(())
    }
}

/// Error taxonomy for the publish stage, naming the step that failed.
#[derive(Debug)]
pub enum PublishError {
    /// Reading the local file to upload failed.
    Io(std::io::Error),
    CreateBucket(StoreError),
    AccessBlock(StoreError),
    Upload { path: PathBuf, source: StoreError },
    Website(StoreError),
    Policy(StoreError),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::Io(e) => write!(f, "failed to read local file for upload: {e}"),
            PublishError::CreateBucket(e) => write!(f, "bucket creation failed: {e}"),
            PublishError::AccessBlock(e) => {
                write!(f, "disabling the public access block failed: {e}")
            }
            PublishError::Upload { path, source } => {
                write!(f, "upload of {} failed: {source}", path.display())
            }
            PublishError::Website(e) => write!(f, "enabling website hosting failed: {e}"),
            PublishError::Policy(e) => write!(f, "applying the bucket policy failed: {e}"),
        }
    }
}

impl std::error::Error for PublishError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PublishError::Io(e) => Some(e),
            PublishError::CreateBucket(e)
            | PublishError::AccessBlock(e)
            | PublishError::Website(e)
            | PublishError::Policy(e) => Some(e.as_ref()),
            PublishError::Upload { source, .. } => Some(source.as_ref()),
        }
    }
}

/// What a successful publish run produced.
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub bucket: String,
    pub key: String,
    pub bytes: usize,
    pub endpoint: String,
}

/// The bucket policy granting anonymous `s3:GetObject` on every key.
pub fn public_read_policy(bucket: &str) -> serde_json::Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": "*",
                "Action": "s3:GetObject",
                "Resource": format!("arn:aws:s3:::{bucket}/*"),
            }
        ]
    })
}

/// The conventional S3 static-website endpoint for a bucket/region pair.
pub fn website_endpoint(bucket: &str, region: &str) -> String {
    format!("http://{bucket}.s3-website-{region}.amazonaws.com")
}

/// Drives the publish chain against the given store. Steps run strictly in
/// order and the first failure aborts the rest; a bucket may be left
/// created-but-not-fully-configured.
pub async fn publish<S: ObjectStore + ?Sized>(
    store: &S,
    config: &PublishConfig,
    file: &Path,
) -> Result<PublishReport, PublishError> {
    let body = fs::read(file).map_err(PublishError::Io)?;
    let bytes = body.len();
    info!(
        path = %file.display(),
        bytes,
        bucket = %config.bucket,
        "Starting publish stage"
    );

    store
        .create_bucket(&config.bucket, &config.region)
        .await
        .map_err(PublishError::CreateBucket)?;

    store
        .disable_public_access_block(&config.bucket)
        .await
        .map_err(PublishError::AccessBlock)?;

    store
        .put_object(&config.bucket, &config.object_key, body, &config.content_type)
        .await
        .map_err(|source| PublishError::Upload {
            path: file.to_path_buf(),
            source,
        })?;

    store
        .enable_website_hosting(&config.bucket, &config.object_key)
        .await
        .map_err(PublishError::Website)?;

    let policy = public_read_policy(&config.bucket).to_string();
    store
        .put_bucket_policy(&config.bucket, &policy)
        .await
        .map_err(PublishError::Policy)?;

    let endpoint = website_endpoint(&config.bucket, &config.region);
    info!(endpoint = %endpoint, "Publish stage complete");

    Ok(PublishReport {
        bucket: config.bucket.clone(),
        key: config.object_key.clone(),
        bytes,
        endpoint,
    })
}
