/// Amount of identifiers a batch fetch can carry before the backend may start
/// reporting some of them back as unretrieved.
pub const DEFAULT_BATCH_LIMIT: usize = 100;

/// Page size bound seeded into federated-search type states.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct PeakFormConfig {
    /// Graph API endpoint the HTTP transport posts documents to.
    pub endpoint: String,
    /// Optional `x-api-key` header value.
    pub api_key: Option<String>,
    /// Advisory batch-fetch cap. Oversized batches are sent anyway; the
    /// backend's `unretrievedItems` answer is authoritative.
    pub batch_limit: usize,
    /// Default per-type page limit for federated search.
    pub default_page_limit: u32,
}

impl PeakFormConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit;
        self
    }

    pub fn with_default_page_limit(mut self, limit: u32) -> Self {
        self.default_page_limit = limit;
        self
    }
}

impl Default for PeakFormConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            batch_limit: DEFAULT_BATCH_LIMIT,
            default_page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}
