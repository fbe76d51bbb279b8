//! AWS-oriented adapters and handlers for the product catalog functions.
//!
//! This crate owns runtime integration details (Lambda handlers, the DynamoDB
//! store client, the seeder invocation and the lifecycle callback transport).
//! Domain contracts and the seed data set come from `catalog_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod logging;
