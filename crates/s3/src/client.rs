//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from denv-core.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;

use denv_core::traits::{OBJECT_CONTENT_DISPOSITION, OBJECT_CONTENT_TYPE};
use denv_core::{Credentials, Error, ObjectInfo, ObjectStore, Result};

/// Page size used when listing the bucket
const LIST_PAGE_SIZE: i32 = 1000;

/// S3 bucket backing denv
pub struct S3Store {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    /// Create a new S3 store from the configured credentials
    pub async fn new(credentials: &Credentials) -> Result<Self> {
        credentials.require_complete()?;

        let provider = aws_credential_types::Credentials::new(
            credentials.access_key.clone(),
            credentials.secret_key.clone(),
            None, // session token
            None, // expiry
            "denv-static-credentials",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(provider)
            .region(aws_config::Region::new(credentials.bucket_region.clone()));

        if let Some(endpoint) = &credentials.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let config = loader.load().await;

        // Custom endpoints are usually S3-compatible servers that want path-style addressing
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(credentials.endpoint.is_some())
            .build();

        tracing::debug!(
            bucket = %credentials.bucket_name,
            region = %credentials.bucket_region,
            endpoint = credentials.endpoint.as_deref().unwrap_or("aws"),
            "created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: credentials.bucket_name.clone(),
        })
    }
}

/// Map a backend error message to a denv error
///
/// The SDK reports a missing key as `NoSuchKey` (GET) or a bare 404 (HEAD).
fn classify_error(message: String, key: &str) -> Error {
    if message.contains("NoSuchKey") || message.contains("NotFound") {
        Error::NotFound(key.to_string())
    } else {
        Error::Store(message)
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, key: &str, data: Vec<u8>) -> Result<()> {
        self.inner
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .acl(ObjectCannedAcl::Private)
            .content_disposition(OBJECT_CONTENT_DISPOSITION)
            .content_type(OBJECT_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| Error::Store(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let response = self
            .inner
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify_error(DisplayErrorContext(&e).to_string(), key))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Store(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    async fn list_objects(&self) -> Result<Vec<ObjectInfo>> {
        let mut items = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .inner
                .list_objects_v2()
                .bucket(&self.bucket)
                .max_keys(LIST_PAGE_SIZE);

            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Error::Store(DisplayErrorContext(&e).to_string()))?;

            for object in response.contents() {
                let Some(key) = object.key() else {
                    continue;
                };
                let mut info = ObjectInfo::new(key, object.size().unwrap_or(0));
                if let Some(modified) = object.last_modified() {
                    info.last_modified = jiff::Timestamp::from_second(modified.secs()).ok();
                }
                items.push(info);
            }

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or(false) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        tracing::debug!(bucket = %self.bucket, count = items.len(), "listed bucket");
        Ok(items)
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify_error(DisplayErrorContext(&e).to_string(), key))?;

        Ok(())
    }
}
