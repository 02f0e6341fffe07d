//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use peakform_sdk::prelude::*;
//!
//! let client = PeakFormClient::new(HttpTransport::new("https://api.peakform.example/graphql"));
//! let gym = client.get_item(ItemType::Gym, "GY1", &["id", "name"]).await?;
//! ```

pub use crate::{
    BatchFetchResult, CacheMode, CancelToken, FederatedSearch, ItemType, MemoryQueryCache,
    OperationKind, Page, PeakFormClient, PeakFormConfig, PeakFormError, QueryCache, QueryDocument,
    SearchPhase,
};

#[cfg(feature = "http")]
pub use crate::HttpTransport;
