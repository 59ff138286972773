//! Image storage
//!
//! Uploaded school images are persisted through the [`ImageStore`] trait.
//! Two backends exist:
//! - [`LocalImageStore`] writes into a directory served under a public path
//!   and returns a relative reference such as `/schoolImages/<file>`.
//! - [`CloudinaryImageStore`] uploads to the hosted service and returns the
//!   `secure_url` it reports.
//!
//! Both can undo a store through [`ImageStore::remove`], which the creation
//! handler uses when the database insert fails after the image was written.

mod cloudinary;
mod local;

pub use cloudinary::CloudinaryImageStore;
pub use local::LocalImageStore;

use crate::config::ImageStoreConfig;
use crate::error::Result;
use crate::models::ImageUpload;
use async_trait::async_trait;
use std::sync::Arc;

/// Result of a successful store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Reference saved with the record and used for display.
    pub reference: String,
    /// Backend-specific handle needed to remove the image again.
    pub handle: String,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    fn kind(&self) -> &'static str;

    async fn store(&self, upload: &ImageUpload) -> Result<StoredImage>;

    async fn remove(&self, stored: &StoredImage) -> Result<()>;
}

pub fn from_config(config: &ImageStoreConfig) -> Arc<dyn ImageStore> {
    match config {
        ImageStoreConfig::Local {
            upload_dir,
            public_path,
        } => Arc::new(LocalImageStore::new(upload_dir.clone(), public_path.clone())),
        ImageStoreConfig::Cloudinary(cloudinary) => {
            Arc::new(CloudinaryImageStore::new(cloudinary.clone()))
        }
    }
}
