use std::time::Instant;

use catalog_core::envelope::{
    ErrorCode, GET_FAILURE_MESSAGE, GET_SUCCESS_MESSAGE, LIST_FAILURE_MESSAGE,
    LIST_SUCCESS_MESSAGE, MISSING_ID_MESSAGE, NOT_FOUND_MESSAGE,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{error, info};

use crate::adapters::catalog_store::CatalogStore;
use crate::handlers::response::{error_response, success_response, ApiGatewayResponse};

const COMPONENT: &str = "read_api";

/// `GET /products`. Request parameters are ignored.
pub fn handle_list_products(store: &impl CatalogStore, now: DateTime<Utc>) -> ApiGatewayResponse {
    let started_at = Instant::now();
    let products = match store.scan() {
        Ok(products) => products,
        Err(store_error) => {
            error!(
                component = COMPONENT,
                event = "list_products_failed",
                error = %store_error,
                "failed to scan catalog"
            );
            return error_response(ErrorCode::InternalError, LIST_FAILURE_MESSAGE, now);
        }
    };

    info!(
        component = COMPONENT,
        event = "list_products",
        count = products.len(),
        duration_ms = started_at.elapsed().as_millis() as u64,
        "listed catalog"
    );
    match success_response(&products, LIST_SUCCESS_MESSAGE, now) {
        Ok(response) => response,
        Err(serialization_error) => {
            error!(
                component = COMPONENT,
                error = %serialization_error,
                "failed to encode product list"
            );
            error_response(ErrorCode::InternalError, LIST_FAILURE_MESSAGE, now)
        }
    }
}

/// `GET /products/{id}`. The store is not consulted when the id is missing.
pub fn handle_get_product(
    event: &Value,
    store: &impl CatalogStore,
    now: DateTime<Utc>,
) -> ApiGatewayResponse {
    let Some(product_id) = product_id_from_event(event) else {
        info!(
            component = COMPONENT,
            event = "get_product_rejected",
            "request has no product id"
        );
        return error_response(ErrorCode::InvalidRequest, MISSING_ID_MESSAGE, now);
    };

    match store.get(product_id) {
        Ok(Some(product)) => {
            info!(
                component = COMPONENT,
                event = "get_product",
                product_id,
                "product found"
            );
            match success_response(&product, GET_SUCCESS_MESSAGE, now) {
                Ok(response) => response,
                Err(serialization_error) => {
                    error!(
                        component = COMPONENT,
                        error = %serialization_error,
                        "failed to encode product"
                    );
                    error_response(ErrorCode::InternalError, GET_FAILURE_MESSAGE, now)
                }
            }
        }
        Ok(None) => {
            info!(
                component = COMPONENT,
                event = "get_product_not_found",
                product_id,
                "product not found"
            );
            error_response(ErrorCode::NotFound, NOT_FOUND_MESSAGE, now)
        }
        Err(store_error) => {
            error!(
                component = COMPONENT,
                event = "get_product_failed",
                product_id,
                error = %store_error,
                "failed to read product"
            );
            error_response(ErrorCode::InternalError, GET_FAILURE_MESSAGE, now)
        }
    }
}

fn product_id_from_event(event: &Value) -> Option<&str> {
    event
        .get("pathParameters")
        .and_then(|parameters| parameters.get("id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use catalog_core::product::Product;
    use catalog_core::seed_data::seed_products;
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::adapters::catalog_store::{InMemoryCatalogStore, StoreError};

    struct CountingStore {
        inner: InMemoryCatalogStore,
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn seeded() -> Self {
            Self {
                inner: InMemoryCatalogStore::with_products(seed_products(
                    "2025-10-29T12:23:12.000Z",
                )),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CatalogStore for CountingStore {
        fn get(&self, product_id: &str) -> Result<Option<Product>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get(product_id)
        }

        fn scan(&self) -> Result<Vec<Product>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.scan()
        }

        fn batch_put(&self, products: &[Product]) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.batch_put(products)
        }
    }

    struct FailingStore;

    impl CatalogStore for FailingStore {
        fn get(&self, _product_id: &str) -> Result<Option<Product>, StoreError> {
            Err(StoreError::Request("simulated throttling".to_string()))
        }

        fn scan(&self) -> Result<Vec<Product>, StoreError> {
            Err(StoreError::Request("simulated throttling".to_string()))
        }

        fn batch_put(&self, _products: &[Product]) -> Result<(), StoreError> {
            Err(StoreError::Request("simulated throttling".to_string()))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 29, 12, 30, 0)
            .single()
            .expect("valid instant")
    }

    fn get_event(product_id: &str) -> Value {
        json!({"pathParameters": {"id": product_id}})
    }

    fn body(response: &ApiGatewayResponse) -> Value {
        serde_json::from_str(&response.body).expect("body should be json")
    }

    fn assert_cors_headers(response: &ApiGatewayResponse) {
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(
            response.header("Access-Control-Allow-Methods"),
            Some("GET, POST, PUT, DELETE, OPTIONS")
        );
        assert_eq!(
            response.header("Access-Control-Allow-Headers"),
            Some("Content-Type, Authorization")
        );
        assert_eq!(response.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn list_returns_exactly_the_stored_records() {
        let store = CountingStore::seeded();
        let response = handle_list_products(&store, now());

        assert_eq!(response.status_code, 200);
        assert_cors_headers(&response);
        let body = body(&response);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Products retrieved successfully");
        assert_eq!(body["timestamp"], "2025-10-29T12:30:00.000Z");

        let returned: Vec<Product> =
            serde_json::from_value(body["data"].clone()).expect("data should be products");
        let returned_ids: BTreeSet<_> = returned.iter().map(|p| p.product_id.clone()).collect();
        let stored_ids: BTreeSet<_> = store
            .inner
            .scan()
            .expect("scan should succeed")
            .into_iter()
            .map(|p| p.product_id)
            .collect();
        assert_eq!(returned.len(), stored_ids.len());
        assert_eq!(returned_ids, stored_ids);
    }

    #[test]
    fn list_of_empty_store_is_empty_array() {
        let response = handle_list_products(&InMemoryCatalogStore::new(), now());

        assert_eq!(response.status_code, 200);
        assert_eq!(body(&response)["data"], json!([]));
    }

    #[test]
    fn list_store_failure_is_internal_error_with_cors() {
        let response = handle_list_products(&FailingStore, now());

        assert_eq!(response.status_code, 500);
        assert_cors_headers(&response);
        let body = body(&response);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "Failed to retrieve products");
    }

    #[test]
    fn get_returns_exact_record() {
        let store = CountingStore::seeded();
        let response = handle_get_product(&get_event("ELEC001"), &store, now());

        assert_eq!(response.status_code, 200);
        assert_cors_headers(&response);
        let body = body(&response);
        let product: Product =
            serde_json::from_value(body["data"].clone()).expect("data should be a product");
        assert_eq!(
            Some(product),
            store.inner.get("ELEC001").expect("get should succeed")
        );
        assert_eq!(body["message"], "Product retrieved successfully");
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let store = CountingStore::seeded();
        let response = handle_get_product(&get_event("UNKNOWN"), &store, now());

        assert_eq!(response.status_code, 404);
        assert_cors_headers(&response);
        assert_eq!(body(&response)["error"]["code"], "NOT_FOUND");
        assert_eq!(store.calls(), 1);
    }

    #[test]
    fn get_without_id_is_rejected_without_store_access() {
        let store = CountingStore::seeded();
        let events = [
            json!({}),
            json!({"pathParameters": null}),
            json!({"pathParameters": {}}),
            json!({"pathParameters": {"id": ""}}),
            json!({"pathParameters": {"id": 42}}),
        ];

        for event in events {
            let response = handle_get_product(&event, &store, now());
            assert_eq!(response.status_code, 400, "event: {event}");
            assert_cors_headers(&response);
            let body = body(&response);
            assert_eq!(body["error"]["code"], "INVALID_REQUEST");
            assert_eq!(body["error"]["message"], "Product ID is required");
        }
        assert_eq!(store.calls(), 0);
    }

    #[test]
    fn get_store_failure_is_internal_error() {
        let response = handle_get_product(&get_event("ELEC001"), &FailingStore, now());

        assert_eq!(response.status_code, 500);
        assert_cors_headers(&response);
        assert_eq!(
            body(&response)["error"]["message"],
            "Failed to retrieve product"
        );
    }
}
