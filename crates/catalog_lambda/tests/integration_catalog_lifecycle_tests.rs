use std::sync::Mutex;

use catalog_core::envelope::{NOT_FOUND_MESSAGE, RESPONSE_HEADERS};
use catalog_core::lifecycle::{CallbackReport, LifecycleEvent, ReportStatus};
use catalog_core::seed_data::{seed_fingerprint, SEED_DATA_VERSION};
use catalog_lambda::adapters::callback::{CallbackError, CallbackTarget, CallbackTransport};
use catalog_lambda::adapters::catalog_store::{CatalogStore, InMemoryCatalogStore};
use catalog_lambda::handlers::products::{handle_get_product, handle_list_products};
use catalog_lambda::handlers::provider::{handle_lifecycle_event, handle_lifecycle_payload};
use catalog_lambda::handlers::seed::{StoreSeeder, UnconfiguredSeeder};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

#[derive(Default)]
struct RecordingTransport {
    reports: Mutex<Vec<CallbackReport>>,
}

impl RecordingTransport {
    fn reports(&self) -> Vec<CallbackReport> {
        self.reports.lock().expect("poisoned mutex").clone()
    }
}

impl CallbackTransport for RecordingTransport {
    fn deliver(&self, _target: &CallbackTarget, body: &[u8]) -> Result<u16, CallbackError> {
        let report = serde_json::from_slice(body)?;
        self.reports.lock().expect("poisoned mutex").push(report);
        Ok(200)
    }
}

fn lifecycle_event(request_type: &str) -> LifecycleEvent {
    serde_json::from_value(json!({
        "RequestType": request_type,
        "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:InitProvider",
        "ResponseURL": "https://cfn-response.s3.amazonaws.com/callback?sig=1",
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/PsApiStack/guid",
        "RequestId": format!("{}-request", request_type.to_lowercase()),
        "LogicalResourceId": "InitDataResource",
        "PhysicalResourceId": "InitDataResource",
        "ResourceType": "AWS::CloudFormation::CustomResource",
        "ResourceProperties": {"ServiceToken": "token", "Timestamp": "1730203200000"}
    }))
    .expect("lifecycle event should parse")
}

fn get_event(product_id: &str) -> Value {
    json!({
        "httpMethod": "GET",
        "resource": "/products/{id}",
        "path": format!("/products/{product_id}"),
        "pathParameters": {"id": product_id}
    })
}

fn body(response_body: &str) -> Value {
    serde_json::from_str(response_body).expect("body should be json")
}

#[test]
fn create_event_seeds_catalog_served_by_read_endpoints() {
    let store = InMemoryCatalogStore::new();
    let transport = RecordingTransport::default();
    let now = Utc
        .with_ymd_and_hms(2025, 10, 29, 12, 0, 0)
        .single()
        .expect("valid instant");

    let result = handle_lifecycle_event(
        &lifecycle_event("Create"),
        &StoreSeeder::new(&store, now),
        &transport,
    );
    assert_eq!(result.status(), ReportStatus::Success);

    let reports = transport.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].request_id, "create-request");
    assert_eq!(reports[0].data["SeedVersion"], SEED_DATA_VERSION);
    assert_eq!(reports[0].data["SeedFingerprint"], seed_fingerprint());

    let phone = handle_get_product(&get_event("ELEC001"), &store, now);
    assert_eq!(phone.status_code, 200);
    for (name, value) in RESPONSE_HEADERS {
        assert_eq!(phone.header(name), Some(value));
    }
    let phone_body = body(&phone.body);
    assert_eq!(phone_body["success"], true);
    assert_eq!(phone_body["data"]["productName"], "iPhone 15 Pro");
    assert_eq!(phone_body["data"]["createdAt"], "2025-10-29T12:00:00.000Z");

    let missing = handle_get_product(&get_event("UNKNOWN"), &store, now);
    assert_eq!(missing.status_code, 404);
    let missing_body = body(&missing.body);
    assert_eq!(missing_body["error"]["code"], "NOT_FOUND");
    assert_eq!(missing_body["error"]["message"], NOT_FOUND_MESSAGE);

    let listing = handle_list_products(&store, now);
    assert_eq!(listing.status_code, 200);
    let listed = body(&listing.body);
    let products = listed["data"].as_array().expect("data should be an array");
    let mut ids: Vec<&str> = products
        .iter()
        .filter_map(|product| product["productId"].as_str())
        .collect();
    ids.sort();
    assert_eq!(
        ids,
        ["CLOTH001", "ELEC001", "ELEC002", "HOME001", "SPORT001"]
    );
}

#[test]
fn update_after_create_keeps_one_record_per_id() {
    let store = InMemoryCatalogStore::new();
    let transport = RecordingTransport::default();
    let created = Utc
        .with_ymd_and_hms(2025, 10, 29, 12, 0, 0)
        .single()
        .expect("valid instant");
    let updated = Utc
        .with_ymd_and_hms(2025, 11, 1, 8, 30, 0)
        .single()
        .expect("valid instant");

    handle_lifecycle_event(
        &lifecycle_event("Create"),
        &StoreSeeder::new(&store, created),
        &transport,
    );
    let result = handle_lifecycle_event(
        &lifecycle_event("Update"),
        &StoreSeeder::new(&store, updated),
        &transport,
    );

    assert_eq!(result.status(), ReportStatus::Success);
    assert_eq!(transport.reports().len(), 2);
    let products = store.scan().expect("scan should succeed");
    assert_eq!(products.len(), 5);
    assert!(products
        .iter()
        .all(|product| product.updated_at == "2025-11-01T08:30:00.000Z"));
}

#[test]
fn delete_event_leaves_catalog_untouched() {
    let store = InMemoryCatalogStore::new();
    let transport = RecordingTransport::default();

    let result = handle_lifecycle_event(
        &lifecycle_event("Delete"),
        &StoreSeeder::new(&store, Utc::now()),
        &transport,
    );

    assert_eq!(result.status(), ReportStatus::Success);
    assert!(store.is_empty().expect("is_empty should succeed"));
    let reports = transport.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].physical_resource_id, "InitDataResource");
}

#[test]
fn unconfigured_seeding_reports_failed_and_reads_stay_empty() {
    let store = InMemoryCatalogStore::new();
    let transport = RecordingTransport::default();

    let result = handle_lifecycle_event(
        &lifecycle_event("Create"),
        &UnconfiguredSeeder::new("TABLE_NAME must be configured"),
        &transport,
    );

    assert_eq!(result.status(), ReportStatus::Failed);
    let reports = transport.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, ReportStatus::Failed);
    assert!(reports[0].reason.contains("TABLE_NAME"));

    let listing = handle_list_products(&store, Utc::now());
    assert_eq!(listing.status_code, 200);
    assert_eq!(body(&listing.body)["data"], json!([]));
}

#[test]
fn incomplete_delete_event_still_gets_a_failed_report() {
    let store = InMemoryCatalogStore::new();
    let transport = RecordingTransport::default();
    let payload = json!({
        "RequestType": "Delete",
        "ResponseURL": "https://cfn-response.s3.amazonaws.com/callback?sig=1",
        "RequestId": "delete-request",
        "LogicalResourceId": "InitDataResource",
        "PhysicalResourceId": "InitDataResource"
    });

    let seeder = StoreSeeder::new(&store, Utc::now());
    let result = handle_lifecycle_payload(&payload, &seeder, &transport)
        .expect("payload should be answered");

    assert_eq!(result.status(), ReportStatus::Failed);
    assert!(store.is_empty().expect("is_empty should succeed"));
    let reports = transport.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, ReportStatus::Failed);
    assert_eq!(reports[0].request_id, "delete-request");
    assert_eq!(reports[0].stack_id, "");
}
