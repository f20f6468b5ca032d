//! Picture repository trait.

use super::Picture;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for managing picture persistence.
///
/// The storage layer does not enforce how many pictures of each type a
/// session has; that is the use cases' concern.
#[async_trait]
pub trait PictureRepository: Send + Sync {
    /// Saves a picture, overwriting any picture with the same ID.
    async fn save(&self, picture: &Picture) -> Result<()>;

    /// Finds a picture by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Picture))`: Picture found
    /// - `Ok(None)`: Picture not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, picture_id: &str) -> Result<Option<Picture>>;

    /// Deletes a picture. Deleting a missing picture succeeds.
    async fn delete(&self, picture_id: &str) -> Result<()>;
}
