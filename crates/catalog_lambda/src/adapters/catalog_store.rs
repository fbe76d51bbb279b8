use std::collections::BTreeMap;
use std::sync::Mutex;

use catalog_core::product::Product;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(String),
    #[error("malformed catalog item: {0}")]
    MalformedItem(String),
    #[error("{0} item(s) were left unprocessed by the batch write")]
    Unprocessed(usize),
}

/// Key-value contract over the product table, keyed by `productId`.
///
/// `batch_put` is last-write-wins per key and best-effort across keys: a
/// failure partway through may leave a subset of the records written.
pub trait CatalogStore {
    fn get(&self, product_id: &str) -> Result<Option<Product>, StoreError>;
    /// Every decodable record. Rows that do not decode are logged and left
    /// out; attributes outside the product model are ignored.
    fn scan(&self) -> Result<Vec<Product>, StoreError>;
    fn batch_put(&self, products: &[Product]) -> Result<(), StoreError>;
}

/// Process-local store used by tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    items: Mutex<BTreeMap<String, Product>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let items = products
            .into_iter()
            .map(|product| (product.product_id.clone(), product))
            .collect();
        Self {
            items: Mutex::new(items),
        }
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Product>>, StoreError> {
        self.items
            .lock()
            .map_err(|_| StoreError::Request("in-memory store lock poisoned".to_string()))
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn get(&self, product_id: &str) -> Result<Option<Product>, StoreError> {
        Ok(self.lock()?.get(product_id).cloned())
    }

    fn scan(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn batch_put(&self, products: &[Product]) -> Result<(), StoreError> {
        let mut items = self.lock()?;
        for product in products {
            items.insert(product.product_id.clone(), product.clone());
        }
        Ok(())
    }
}
