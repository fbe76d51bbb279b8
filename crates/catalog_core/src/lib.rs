//! Shared product catalog domain primitives.
//!
//! This crate owns the product record model, the read API envelopes, the
//! deployment lifecycle contract and the seed data set. It intentionally
//! excludes AWS SDK and Lambda runtime concerns, which live in
//! `catalog_lambda`.

pub mod envelope;
pub mod lifecycle;
pub mod product;
pub mod seed_data;
