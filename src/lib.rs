//! # peakform-sdk
//!
//! Rust client SDK for the PeakForm graph query API.
//!
//! This crate generates typed query documents for the fifteen PeakForm
//! entity types from a small set of generic templates, executes them through
//! a pluggable transport with an injected result cache, and drives federated
//! multi-type search with an independent pagination cursor per type.
//!
//! ## Example
//!
//! ```rust,ignore
//! use peakform_sdk::prelude::*;
//!
//! let config = PeakFormConfig::new("https://api.peakform.example/graphql");
//! let client = PeakFormClient::with_config(HttpTransport::from_config(&config), config);
//!
//! // Single-item fetch; a miss is Ok(None), not an error.
//! let trainer = client
//!     .get_item(ItemType::Trainer, "TR123", &["id", "name"])
//!     .await?;
//!
//! // Federated search across types until 20 results are merged.
//! let mut search = FederatedSearch::new(client);
//! search.enable_type(ItemType::Client);
//! search.enable_type(ItemType::Trainer);
//! let results = search.new_search("ben", 20).await;
//! ```
//!
//! ## Layers
//!
//! - **builder**: pure document generation (no I/O)
//! - **engine**: cache-aware execution through a [`Transport`]
//! - **client**: the `(operation, item type)` dispatch surface
//! - **search**: round-based federated aggregation

pub mod builder;
pub mod cache;
pub mod client;
pub mod config;
pub mod document;
pub mod engine;
pub mod entity;
pub mod error;
pub mod response;
pub mod search;
pub mod transport;

pub mod prelude;

pub use builder::{build_query, generate_filter, generate_id_list, QueryShape};
pub use cache::{CompressedPage, MemoryQueryCache, QueryCache};
pub use client::PeakFormClient;
pub use config::PeakFormConfig;
pub use document::{ArgumentClause, QueryDocument, CURSOR_SENTINEL, CURSOR_VARIABLE};
pub use engine::{execute, CacheMode};
pub use entity::{ItemType, OperationKind};
pub use error::PeakFormError;
pub use response::{BatchFetchResult, Page};
pub use search::{CancelToken, FederatedSearch, SearchPhase, TypeSearchState};
pub use transport::{MockTransport, Transport};

#[cfg(feature = "http")]
pub use transport::HttpTransport;

pub use serde_json::Value;
