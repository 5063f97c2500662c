//! Per-identity image library.
//!
//! Tracks upload metadata and whether a processed result exists; the encoded
//! bytes themselves belong to the presentation layer.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use clearbg_core::models::{Identity, ImageRecord};
use clearbg_store::{DurableStore, ImageRepository, StoreError};

use crate::error::{ServiceError, ServiceResult};

pub struct ImageLibrary {
    repo: ImageRepository,
}

impl ImageLibrary {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            repo: ImageRepository::new(store),
        }
    }

    #[tracing::instrument(skip(self, identity), fields(identity_key = %identity.key()))]
    pub async fn record_upload(
        &self,
        identity: &Identity,
        filename: &str,
        content_type: &str,
        file_size: i64,
    ) -> ServiceResult<ImageRecord> {
        let record = ImageRecord {
            id: Uuid::new_v4(),
            identity_key: identity.key(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            file_size,
            processed: false,
            created_at: Utc::now(),
        };
        self.repo.save(&record).await?;
        tracing::info!(image_id = %record.id, filename, "Image upload recorded");
        Ok(record)
    }

    pub async fn get(&self, image_id: Uuid) -> ServiceResult<ImageRecord> {
        self.repo
            .get(image_id)
            .await?
            .ok_or(ServiceError::ImageNotFound(image_id))
    }

    /// Flag that a processed result now exists for this image.
    #[tracing::instrument(skip(self))]
    pub async fn mark_processed(&self, image_id: Uuid) -> ServiceResult<ImageRecord> {
        let mut record = self.get(image_id).await?;
        if !record.processed {
            record.processed = true;
            self.repo.save(&record).await?;
        }
        Ok(record)
    }

    pub async fn list_for(&self, identity: &Identity) -> ServiceResult<Vec<ImageRecord>> {
        Ok(self.repo.list_for(&identity.key()).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, image_id: Uuid) -> ServiceResult<()> {
        match self.repo.delete(image_id).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound(_)) => Err(ServiceError::ImageNotFound(image_id)),
            Err(err) => Err(err.into()),
        }
    }

    /// The record to serve for download. Refused until a processed result
    /// exists.
    pub async fn download_target(&self, image_id: Uuid) -> ServiceResult<ImageRecord> {
        let record = self.get(image_id).await?;
        if !record.processed {
            return Err(ServiceError::NotProcessed(image_id));
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearbg_store::MemoryStore;

    fn library() -> ImageLibrary {
        ImageLibrary::new(Arc::new(MemoryStore::new()))
    }

    fn identity() -> Identity {
        Identity::Anonymous {
            device_id: "device_test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_download_refused_until_processed() {
        let library = library();
        let record = library
            .record_upload(&identity(), "cat.png", "image/png", 2048)
            .await
            .unwrap();

        assert!(matches!(
            library.download_target(record.id).await,
            Err(ServiceError::NotProcessed(_))
        ));

        library.mark_processed(record.id).await.unwrap();
        let target = library.download_target(record.id).await.unwrap();
        assert!(target.processed);
    }

    #[tokio::test]
    async fn test_listing_is_scoped_to_owner() {
        let library = library();
        let mine = identity();
        let theirs = Identity::Anonymous {
            device_id: "device_other".to_string(),
        };

        let record = library
            .record_upload(&mine, "cat.png", "image/png", 2048)
            .await
            .unwrap();
        library
            .record_upload(&theirs, "dog.png", "image/png", 4096)
            .await
            .unwrap();

        let listed = library.list_for(&mine).await.unwrap();
        assert_eq!(listed, vec![record]);
    }

    #[tokio::test]
    async fn test_delete_unknown_image() {
        let library = library();
        assert!(matches!(
            library.delete(Uuid::new_v4()).await,
            Err(ServiceError::ImageNotFound(_))
        ));
    }
}
