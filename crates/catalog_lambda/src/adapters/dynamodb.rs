use std::collections::HashMap;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use aws_sdk_dynamodb::Client;
use catalog_core::product::{Product, SpecValue, Specifications, PRODUCT_ID_ATTRIBUTE};
use tracing::{debug, warn};

use super::block_on;
use super::catalog_store::{CatalogStore, StoreError};

/// BatchWriteItem accepts at most this many put requests per call.
pub const MAX_BATCH_WRITE_ITEMS: usize = 25;

const ATTR_PRODUCT_NAME: &str = "productName";
const ATTR_CATEGORY: &str = "category";
const ATTR_BRAND: &str = "brand";
const ATTR_SPECIFICATIONS: &str = "specifications";
const ATTR_CREATED_AT: &str = "createdAt";
const ATTR_UPDATED_AT: &str = "updatedAt";

/// DynamoDB-backed catalog table.
#[derive(Clone)]
pub struct DynamoDbCatalogStore {
    client: Client,
    table_name: String,
}

impl std::fmt::Debug for DynamoDbCatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoDbCatalogStore")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl DynamoDbCatalogStore {
    /// Builds a client inheriting the shared SDK config, with an optional
    /// endpoint override for local DynamoDB.
    pub fn new(
        sdk_config: &aws_config::SdkConfig,
        table_name: impl Into<String>,
        endpoint_url: Option<&str>,
    ) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            table_name: table_name.into(),
        }
    }

    pub fn from_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl CatalogStore for DynamoDbCatalogStore {
    fn get(&self, product_id: &str) -> Result<Option<Product>, StoreError> {
        let request = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(
                PRODUCT_ID_ATTRIBUTE,
                AttributeValue::S(product_id.to_string()),
            );

        let output = block_on(request.send()).map_err(|error| {
            StoreError::Request(format!("GetItem failed: {}", DisplayErrorContext(&error)))
        })?;

        output.item().map(item_to_product).transpose()
    }

    fn scan(&self) -> Result<Vec<Product>, StoreError> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();

        block_on(async move {
            let mut items = client
                .scan()
                .table_name(table_name)
                .into_paginator()
                .items()
                .send();

            let mut products = Vec::new();
            while let Some(item) = items.next().await {
                let item = item.map_err(|error| {
                    StoreError::Request(format!("Scan failed: {}", DisplayErrorContext(&error)))
                })?;
                products.extend(decode_scanned_item(&item));
            }
            Ok(products)
        })
    }

    fn batch_put(&self, products: &[Product]) -> Result<(), StoreError> {
        for (chunk_index, chunk) in products.chunks(MAX_BATCH_WRITE_ITEMS).enumerate() {
            let requests = chunk
                .iter()
                .map(|product| {
                    PutRequest::builder()
                        .set_item(Some(product_to_item(product)))
                        .build()
                        .map(|put| WriteRequest::builder().put_request(put).build())
                        .map_err(|error| {
                            StoreError::Request(format!("invalid put request: {error}"))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let request = self
                .client
                .batch_write_item()
                .request_items(&self.table_name, requests);

            let output = block_on(request.send()).map_err(|error| {
                StoreError::Request(format!(
                    "BatchWriteItem failed: {}",
                    DisplayErrorContext(&error)
                ))
            })?;

            let unprocessed: usize = output
                .unprocessed_items()
                .map(|tables| tables.values().map(Vec::len).sum())
                .unwrap_or(0);
            if unprocessed > 0 {
                warn!(
                    component = "dynamodb_store",
                    table = %self.table_name,
                    chunk_index,
                    unprocessed,
                    "batch write left items unprocessed"
                );
                return Err(StoreError::Unprocessed(unprocessed));
            }

            debug!(
                component = "dynamodb_store",
                table = %self.table_name,
                chunk_index,
                written = chunk.len(),
                "batch chunk written"
            );
        }

        Ok(())
    }
}

pub fn product_to_item(product: &Product) -> HashMap<String, AttributeValue> {
    let specifications = product
        .specifications
        .iter()
        .map(|(name, value)| {
            let attribute = match value {
                SpecValue::Text(text) => AttributeValue::S(text.clone()),
                SpecValue::List(values) => AttributeValue::L(
                    values
                        .iter()
                        .map(|value| AttributeValue::S(value.clone()))
                        .collect(),
                ),
            };
            (name.clone(), attribute)
        })
        .collect();

    HashMap::from([
        (
            PRODUCT_ID_ATTRIBUTE.to_string(),
            AttributeValue::S(product.product_id.clone()),
        ),
        (
            ATTR_PRODUCT_NAME.to_string(),
            AttributeValue::S(product.product_name.clone()),
        ),
        (
            ATTR_CATEGORY.to_string(),
            AttributeValue::S(product.category.clone()),
        ),
        (
            ATTR_BRAND.to_string(),
            AttributeValue::S(product.brand.clone()),
        ),
        (
            ATTR_SPECIFICATIONS.to_string(),
            AttributeValue::M(specifications),
        ),
        (
            ATTR_CREATED_AT.to_string(),
            AttributeValue::S(product.created_at.clone()),
        ),
        (
            ATTR_UPDATED_AT.to_string(),
            AttributeValue::S(product.updated_at.clone()),
        ),
    ])
}

pub fn item_to_product(item: &HashMap<String, AttributeValue>) -> Result<Product, StoreError> {
    let product_id = string_attribute(item, PRODUCT_ID_ATTRIBUTE)?;
    let specifications = match item.get(ATTR_SPECIFICATIONS) {
        None | Some(AttributeValue::Null(_)) => Specifications::new(),
        Some(AttributeValue::M(map)) => map
            .iter()
            .map(|(name, value)| Ok((name.clone(), spec_value(&product_id, name, value)?)))
            .collect::<Result<Specifications, StoreError>>()?,
        Some(_) => {
            return Err(StoreError::MalformedItem(format!(
                "'{ATTR_SPECIFICATIONS}' of {product_id} must be a map"
            )))
        }
    };

    Ok(Product {
        product_name: string_attribute(item, ATTR_PRODUCT_NAME)?,
        category: string_attribute(item, ATTR_CATEGORY)?,
        brand: string_attribute(item, ATTR_BRAND)?,
        specifications,
        created_at: string_attribute(item, ATTR_CREATED_AT)?,
        updated_at: string_attribute(item, ATTR_UPDATED_AT)?,
        product_id,
    })
}

/// A scanned row that does not decode is logged and skipped.
fn decode_scanned_item(item: &HashMap<String, AttributeValue>) -> Option<Product> {
    match item_to_product(item) {
        Ok(product) => Some(product),
        Err(decode_error) => {
            let product_id = item
                .get(PRODUCT_ID_ATTRIBUTE)
                .and_then(|value| value.as_s().ok())
                .map(String::as_str)
                .unwrap_or_default();
            warn!(
                component = "dynamodb_store",
                product_id,
                error = %decode_error,
                "skipping malformed catalog item"
            );
            None
        }
    }
}

fn string_attribute(
    item: &HashMap<String, AttributeValue>,
    name: &str,
) -> Result<String, StoreError> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| StoreError::MalformedItem(format!("missing string attribute '{name}'")))
}

fn spec_value(
    product_id: &str,
    name: &str,
    value: &AttributeValue,
) -> Result<SpecValue, StoreError> {
    match value {
        AttributeValue::S(text) => Ok(SpecValue::Text(text.clone())),
        AttributeValue::Ss(values) => Ok(SpecValue::List(values.clone())),
        AttributeValue::L(values) => values
            .iter()
            .map(|value| value.as_s().cloned())
            .collect::<Result<Vec<_>, _>>()
            .map(SpecValue::List)
            .map_err(|_| {
                StoreError::MalformedItem(format!(
                    "specification '{name}' of {product_id} must list strings"
                ))
            }),
        _ => Err(StoreError::MalformedItem(format!(
            "specification '{name}' of {product_id} must be a string or list of strings"
        ))),
    }
}
