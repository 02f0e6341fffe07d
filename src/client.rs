//! The generic fetch/query surface over all fifteen item types.

use crate::builder::{build_query, generate_id_list, QueryShape};
use crate::cache::MemoryQueryCache;
use crate::config::PeakFormConfig;
use crate::document::{ArgumentClause, QueryDocument};
use crate::engine::{execute, CacheMode};
use crate::entity::{ItemType, OperationKind};
use crate::error::PeakFormError;
use crate::response::{BatchFetchResult, Page};
use crate::transport::Transport;
use serde_json::Value;
use std::collections::BTreeMap;

/// Client for the PeakForm graph query API.
///
/// Owns the transport, the configuration, and a shared result cache for list
/// queries. Single-item and batch fetches always go to the backend; list
/// queries are served from the cache when the identical document was executed
/// before.
pub struct PeakFormClient<T: Transport> {
    transport: T,
    config: PeakFormConfig,
    query_cache: MemoryQueryCache,
}

impl<T: Transport> PeakFormClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, PeakFormConfig::default())
    }

    pub fn with_config(transport: T, config: PeakFormConfig) -> Self {
        Self {
            transport,
            config,
            query_cache: MemoryQueryCache::new(),
        }
    }

    pub fn config(&self) -> &PeakFormConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn query_cache(&self) -> &MemoryQueryCache {
        &self.query_cache
    }

    /// Fetch a single item by ID. `Ok(None)` is a legitimate miss.
    pub async fn get_item<S: AsRef<str>>(
        &self,
        item_type: ItemType,
        id: &str,
        output_fields: &[S],
    ) -> Result<Option<Value>, PeakFormError> {
        let (operation, field) = item_type.get_operation();
        let mut input = BTreeMap::new();
        input.insert("id".to_string(), Value::String(id.to_string()));
        let document = build_query(
            operation,
            field,
            &input,
            output_fields,
            None,
            QueryShape::Single,
        );
        execute(&self.transport, &document, field, CacheMode::Bypass).await
    }

    /// Fetch a single item by username. Unsupported for types without a
    /// username operation; that failure is decided before any request is
    /// sent and is not retryable.
    pub async fn get_item_by_username<S: AsRef<str>>(
        &self,
        item_type: ItemType,
        username: &str,
        output_fields: &[S],
    ) -> Result<Option<Value>, PeakFormError> {
        let (operation, field) =
            item_type
                .username_operation()
                .ok_or(PeakFormError::Unsupported {
                    kind: OperationKind::GetByUsername,
                    item_type,
                })?;
        let mut input = BTreeMap::new();
        input.insert("username".to_string(), Value::String(username.to_string()));
        let document = build_query(
            operation,
            field,
            &input,
            output_fields,
            None,
            QueryShape::Single,
        );
        execute(&self.transport, &document, field, CacheMode::Bypass).await
    }

    /// Batch-fetch items by ID.
    ///
    /// The configured batch cap is advisory: an oversized request is logged
    /// and sent whole, and the backend reports what it could not retrieve via
    /// `unretrieved_ids`. Reconciling those against the requested sequence is
    /// the caller's job; the backend's answer is authoritative, since it may
    /// reject IDs for authorization reasons the client cannot evaluate.
    pub async fn get_items<S: AsRef<str>>(
        &self,
        item_type: ItemType,
        ids: &[&str],
        output_fields: &[S],
    ) -> Result<BatchFetchResult, PeakFormError> {
        if ids.len() > self.config.batch_limit {
            tracing::warn!(
                requested = ids.len(),
                cap = self.config.batch_limit,
                %item_type,
                "batch exceeds the advisory cap; expect unretrieved IDs"
            );
        }
        let clause = generate_id_list(ids);
        let (operation, field) = item_type.batch_operation();
        let document = build_query(
            operation,
            field,
            &BTreeMap::new(),
            output_fields,
            Some(&clause),
            QueryShape::Batch,
        );
        let payload = execute(&self.transport, &document, field, CacheMode::Bypass).await?;
        Ok(payload
            .map(|p| BatchFetchResult::from_payload(&p))
            .unwrap_or_default())
    }

    /// Build a filtered/paginated list document without executing it.
    ///
    /// `limit` and `next_token` are only bound when provided, so a bare first
    /// page declares no pagination parameters at all.
    pub fn build_item_query<S: AsRef<str>>(
        &self,
        item_type: ItemType,
        output_fields: &[S],
        clause: Option<&ArgumentClause>,
        limit: Option<u32>,
        next_token: Option<&str>,
    ) -> QueryDocument {
        let (operation, field) = item_type.list_operation();
        let mut input = BTreeMap::new();
        if let Some(limit) = limit {
            input.insert("limit".to_string(), Value::Number(limit.into()));
        }
        if let Some(token) = next_token {
            input.insert("nextToken".to_string(), Value::String(token.to_string()));
        }
        build_query(
            operation,
            field,
            &input,
            output_fields,
            clause,
            QueryShape::List,
        )
    }

    /// Execute a list document through the shared query cache.
    pub async fn query_items(
        &self,
        item_type: ItemType,
        document: &QueryDocument,
    ) -> Result<Page, PeakFormError> {
        let (_, field) = item_type.list_operation();
        let payload = execute(
            &self.transport,
            document,
            field,
            CacheMode::ReadWrite(&self.query_cache),
        )
        .await?;
        Ok(payload
            .map(|p| Page::from_payload(&p))
            .unwrap_or_default())
    }

    /// Execute a list document, bypassing the query cache entirely.
    pub async fn query_items_uncached(
        &self,
        item_type: ItemType,
        document: &QueryDocument,
    ) -> Result<Page, PeakFormError> {
        let (_, field) = item_type.list_operation();
        let payload = execute(&self.transport, document, field, CacheMode::Bypass).await?;
        Ok(payload
            .map(|p| Page::from_payload(&p))
            .unwrap_or_default())
    }
}
