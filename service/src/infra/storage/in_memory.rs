//! In-memory [`Storage`] implementation.

use std::{collections::HashMap, sync::Arc};

use common::operations::{By, Perform, Select};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::{
    domain::image,
    infra::{storage, Storage},
};

/// In-memory [`Storage`] of uploaded images.
///
/// Append-only: uploads are never removed, so references held by signed
/// documents stay resolvable.
#[derive(Clone, Debug, Default)]
pub struct ImageStore(Arc<RwLock<HashMap<image::Ref, image::Bytes>>>);

impl ImageStore {
    /// Creates a new empty [`ImageStore`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage<Perform<image::Upload>> for ImageStore {
    type Ok = image::Ref;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Perform(upload): Perform<image::Upload>,
    ) -> Result<Self::Ok, Self::Err> {
        let image::Upload(bytes) = upload;
        if bytes.is_empty() {
            return Err(tracerr::new!(storage::Error::EmptyImage));
        }

        let reference = image::Ref::new();
        _ = self.0.write().await.insert(reference, bytes);
        Ok(reference)
    }
}

impl Storage<Select<By<Option<image::Bytes>, image::Ref>>> for ImageStore {
    type Ok = Option<image::Bytes>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<image::Bytes>, image::Ref>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.get(&by.into_inner()).cloned())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Perform, Select};

    use crate::domain::image;

    use super::{storage, ImageStore, Storage as _};

    #[tokio::test]
    async fn uploaded_bytes_are_resolvable_by_the_returned_reference() {
        let store = ImageStore::new();
        let bytes = image::Bytes::new(vec![1, 2, 3]);

        let reference = store
            .execute(Perform(image::Upload(bytes.clone())))
            .await
            .unwrap();
        let resolved = store
            .execute(Select(By::<Option<image::Bytes>, _>::new(reference)))
            .await
            .unwrap();

        assert_eq!(resolved, Some(bytes));
    }

    #[tokio::test]
    async fn rejects_empty_uploads() {
        let store = ImageStore::new();

        let err = store
            .execute(Perform(image::Upload(image::Bytes::new(vec![]))))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), storage::Error::EmptyImage));
    }
}
