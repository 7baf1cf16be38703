//! denv-core: Core library for the denv env-file stash
//!
//! This crate provides the core functionality for the denv CLI, including:
//! - Credential configuration and its env-file persistence
//! - Remote key naming
//! - ObjectStore trait and the StoreClient facade over it
//! - Directory packing and traversal-safe unpacking
//!
//! This crate is designed to be independent of any specific S3 SDK,
//! allowing for easy testing and potential future support for other backends.

pub mod archive;
pub mod config;
pub mod error;
pub mod keys;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod store;
pub mod traits;

pub use archive::{ScratchBundle, pack, pack_to_scratch, unpack};
pub use config::{ConfigManager, Credentials, Paths};
pub use error::{Error, Result};
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryStore;
pub use store::StoreClient;
pub use traits::{ObjectInfo, ObjectStore};
