use std::collections::HashMap;
use std::sync::RwLock;

use kidloop_core::ProductId;

use crate::error::{StoreError, StoreResult};

/// Object-storage port for product images.
///
/// Keyed by (product, filename); returns a public URL. A production adapter
/// (Cloudinary/S3) would implement this; upload failure aborts product
/// creation upstream.
pub trait ImageStore: Send + Sync {
    fn upload(&self, product: ProductId, filename: &str, bytes: &[u8]) -> StoreResult<String>;
}

/// In-memory image store for tests/dev: remembers the bytes, serves
/// deterministic URLs.
#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    inner: RwLock<HashMap<(ProductId, String), Vec<u8>>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ImageStore for InMemoryImageStore {
    fn upload(&self, product: ProductId, filename: &str, bytes: &[u8]) -> StoreResult<String> {
        if bytes.is_empty() {
            return Err(StoreError::ConditionFailed("empty image upload".to_string()));
        }

        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::Corrupt("image store lock poisoned".to_string()))?;
        map.insert((product, filename.to_string()), bytes.to_vec());
        Ok(format!("https://images.kidloop.test/{product}/{filename}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_returns_url_scoped_to_product_and_filename() {
        let store = InMemoryImageStore::new();
        let product = ProductId::new();

        let url = store.upload(product, "image-1.png", b"png-bytes").unwrap();
        assert!(url.contains(&product.to_string()));
        assert!(url.ends_with("image-1.png"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn empty_upload_is_rejected() {
        let store = InMemoryImageStore::new();
        assert!(store.upload(ProductId::new(), "x.png", b"").is_err());
    }
}
