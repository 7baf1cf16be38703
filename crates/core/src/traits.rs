//! ObjectStore trait definition
//!
//! This trait defines the primitive operations denv needs from a remote
//! bucket: put, get, list and delete by key. It allows the CLI to be
//! decoupled from the specific S3 SDK implementation.

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Content type every object is written with
pub const OBJECT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content disposition every object is written with
pub const OBJECT_CONTENT_DISPOSITION: &str = "attachment";

/// A single entry of a bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Object key
    pub key: String,

    /// Size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,

    /// Human-readable size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
}

impl ObjectInfo {
    /// Create a new ObjectInfo for an object of known size
    pub fn new(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size_bytes: Some(size),
            size_human: Some(humansize::format_size(size.max(0) as u64, humansize::BINARY)),
            last_modified: None,
        }
    }

    /// Attach a last-modified timestamp
    pub fn modified_at(mut self, at: Timestamp) -> Self {
        self.last_modified = Some(at);
        self
    }
}

/// Trait for the remote bucket backing denv
///
/// Writes are private, served as attachments and typed as
/// `application/octet-stream`. Implementations map a missing key to
/// [`Error::NotFound`](crate::Error::NotFound) and any other backend failure
/// to [`Error::Store`](crate::Error::Store).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create or overwrite the object at `key`
    async fn put_object(&self, key: &str, data: Vec<u8>) -> Result<()>;

    /// Read the full content of the object at `key`
    async fn get_object(&self, key: &str) -> Result<Vec<u8>>;

    /// List every object in the bucket, in backend order
    async fn list_objects(&self) -> Result<Vec<ObjectInfo>>;

    /// Delete the object at `key`
    async fn delete_object(&self, key: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_info_new() {
        let info = ObjectInfo::new("prod.env", 1024);
        assert_eq!(info.key, "prod.env");
        assert_eq!(info.size_bytes, Some(1024));
        assert_eq!(info.size_human.as_deref(), Some("1 KiB"));
        assert!(info.last_modified.is_none());
    }

    #[test]
    fn test_object_info_serializes_without_empty_fields() {
        let info = ObjectInfo {
            key: "prod".into(),
            size_bytes: None,
            size_human: None,
            last_modified: None,
        };
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, r#"{"key":"prod"}"#);
    }

    #[test]
    fn test_object_info_modified_at() {
        let ts = Timestamp::from_second(1_700_000_000).unwrap();
        let info = ObjectInfo::new("prod", 3).modified_at(ts);
        assert_eq!(info.last_modified, Some(ts));
    }
}
