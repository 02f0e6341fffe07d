//! Federated search: the same logical query issued independently against
//! many item types, each with its own pagination cursor, merged toward a
//! caller-specified result-count target.
//!
//! Each round fires one list query per eligible type concurrently and merges
//! only after every fired query has settled, so a partial settlement never
//! advances cursors. Rounds are strictly sequential; round N+1 is not issued
//! until round N's merge completes.

use crate::builder::generate_filter;
use crate::client::PeakFormClient;
use crate::document::QueryDocument;
use crate::entity::ItemType;
use crate::transport::Transport;
use futures_util::future::join_all;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Filter parameter bound to the shared search text when a type's query is
/// built.
pub const SEARCH_QUERY_PARAMETER: &str = "searchQuery";

/// Where a type currently stands in the search lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Disabled; never fired, never blocks a round.
    Idle,
    /// Enabled, first query not yet issued.
    Pending,
    /// Has a live cursor; more results believed available.
    Paging,
    /// No cursor and not the first call: the source has nothing further.
    Exhausted,
}

/// Per-type search state: filter template, cursor, and accumulated results.
#[derive(Debug, Clone)]
pub struct TypeSearchState {
    enabled: bool,
    predicate: Option<Value>,
    params: BTreeMap<String, Value>,
    output_fields: Vec<String>,
    limit: u32,
    next_token: Option<String>,
    first_call: bool,
    results: Vec<Value>,
}

impl TypeSearchState {
    fn new(limit: u32) -> Self {
        Self {
            enabled: false,
            predicate: None,
            params: BTreeMap::new(),
            output_fields: vec!["id".to_string()],
            limit,
            next_token: None,
            first_call: true,
            results: Vec::new(),
        }
    }

    pub fn phase(&self) -> SearchPhase {
        if !self.enabled {
            SearchPhase::Idle
        } else if self.next_token.is_some() {
            SearchPhase::Paging
        } else if self.first_call {
            SearchPhase::Pending
        } else {
            SearchPhase::Exhausted
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }

    pub fn results(&self) -> &[Value] {
        &self.results
    }

    /// A type with no cursor and a spent first call is never re-fired.
    fn eligible(&self) -> bool {
        self.enabled && (self.first_call || self.next_token.is_some())
    }

    fn reset(&mut self) {
        self.next_token = None;
        self.first_call = true;
        self.results.clear();
    }

    fn exhaust(&mut self) {
        self.next_token = None;
        self.first_call = false;
    }
}

/// Handle for aborting a search between rounds.
///
/// Checked before each round is fired; a round already in flight always runs
/// to completion, so cancellation never leaves a half-merged round behind.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Aggregator driving repeated rounds of per-type list queries until an
/// aggregate result-count target is met or every enabled type is exhausted.
pub struct FederatedSearch<T: Transport> {
    client: PeakFormClient<T>,
    states: BTreeMap<ItemType, TypeSearchState>,
    query: String,
    results: Vec<Value>,
    cancel: CancelToken,
}

impl<T: Transport> FederatedSearch<T> {
    pub fn new(client: PeakFormClient<T>) -> Self {
        let limit = client.config().default_page_limit;
        let states = ItemType::ALL
            .iter()
            .map(|&item_type| (item_type, TypeSearchState::new(limit)))
            .collect();
        Self {
            client,
            states,
            query: String::new(),
            results: Vec::new(),
            cancel: CancelToken::default(),
        }
    }

    pub fn client(&self) -> &PeakFormClient<T> {
        &self.client
    }

    pub fn state(&self, item_type: ItemType) -> &TypeSearchState {
        &self.states[&item_type]
    }

    /// Merged results of the current search, in arrival order.
    pub fn results(&self) -> &[Value] {
        &self.results
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn enable_type(&mut self, item_type: ItemType) {
        self.state_mut(item_type).enabled = true;
    }

    /// Disable a type. It is excluded from every subsequent round, even if it
    /// holds a live cursor.
    pub fn disable_type(&mut self, item_type: ItemType) {
        self.state_mut(item_type).enabled = false;
    }

    /// Set a type's filter template. `$searchQuery` placeholders in the
    /// predicate are bound to the shared search text on every round; `params`
    /// carries any further placeholder values.
    pub fn set_type_filter(
        &mut self,
        item_type: ItemType,
        predicate: Value,
        params: BTreeMap<String, Value>,
    ) {
        let state = self.state_mut(item_type);
        state.predicate = Some(predicate);
        state.params = params;
    }

    pub fn set_type_fields<S: AsRef<str>>(&mut self, item_type: ItemType, output_fields: &[S]) {
        self.state_mut(item_type).output_fields = output_fields
            .iter()
            .map(|field| field.as_ref().to_string())
            .collect();
    }

    pub fn set_type_limit(&mut self, item_type: ItemType, limit: u32) {
        self.state_mut(item_type).limit = limit;
    }

    /// Start a fresh search: every type returns to Pending-or-Idle per its
    /// enabled flag and accumulated results are dropped.
    ///
    /// Searching for nothing is defined as an immediate success: an empty
    /// `query_text` completes with an empty result set and no query is
    /// issued.
    pub async fn new_search(&mut self, query_text: &str, min_results: usize) -> Vec<Value> {
        self.cancel.reset();
        self.results.clear();
        for state in self.states.values_mut() {
            state.reset();
        }
        self.query = query_text.to_string();
        if query_text.is_empty() {
            tracing::debug!("refusing to search for an empty string");
            return Vec::new();
        }
        self.load_more(min_results).await
    }

    /// Run rounds until the merged count reaches `min_results`, every enabled
    /// type is exhausted, or the search is cancelled. Exhaustion is not an
    /// error: the search completes with whatever it has, even short of the
    /// target.
    pub async fn load_more(&mut self, min_results: usize) -> Vec<Value> {
        if self.query.is_empty() {
            return self.results.clone();
        }

        loop {
            if self.cancel.is_cancelled() {
                tracing::debug!("search cancelled before next round");
                break;
            }
            if self.results.len() >= min_results {
                break;
            }

            let fired: Vec<(ItemType, QueryDocument)> = self
                .states
                .iter()
                .filter(|(_, state)| state.eligible())
                .map(|(&item_type, state)| (item_type, self.build_type_document(item_type, state)))
                .collect();
            if fired.is_empty() {
                break;
            }

            tracing::debug!(fired = fired.len(), have = self.results.len(), "firing search round");
            // Rounds bypass the literal-key result cache: a filterless type
            // builds the identical document for every search text, and a page
            // cached under it would alias across unrelated searches.
            let client = &self.client;
            let settled = join_all(fired.iter().map(|(item_type, document)| async move {
                (
                    *item_type,
                    client.query_items_uncached(*item_type, document).await,
                )
            }))
            .await;

            // The merge happens only now, after every fired query settled.
            for (item_type, outcome) in settled {
                let state = self
                    .states
                    .get_mut(&item_type)
                    .expect("state exists for every item type");
                match outcome {
                    Ok(page) => {
                        state.next_token = page.next_token.clone();
                        state.first_call = false;
                        state.results.extend(page.items.iter().cloned());
                        self.results.extend(page.items);
                    }
                    Err(error) => {
                        tracing::warn!(
                            %item_type,
                            %error,
                            "type query failed; excluding the type from this search"
                        );
                        state.exhaust();
                    }
                }
            }
        }

        self.results.clone()
    }

    fn state_mut(&mut self, item_type: ItemType) -> &mut TypeSearchState {
        self.states
            .get_mut(&item_type)
            .expect("state exists for every item type")
    }

    fn build_type_document(&self, item_type: ItemType, state: &TypeSearchState) -> QueryDocument {
        let clause = state.predicate.as_ref().map(|predicate| {
            let mut params = state.params.clone();
            params.insert(
                SEARCH_QUERY_PARAMETER.to_string(),
                Value::String(self.query.clone()),
            );
            generate_filter(predicate, params)
        });
        self.client.build_item_query(
            item_type,
            &state.output_fields,
            clause.as_ref(),
            Some(state.limit),
            state.next_token(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn search() -> (FederatedSearch<MockTransport>, MockTransport) {
        let transport = MockTransport::new();
        let client = PeakFormClient::new(transport.clone());
        (FederatedSearch::new(client), transport)
    }

    fn page(ids: &[&str], next_token: Option<&str>) -> Value {
        let items: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
        json!({"items": items, "nextToken": next_token})
    }

    #[tokio::test]
    async fn empty_query_completes_without_firing() {
        let (mut search, transport) = search();
        search.enable_type(ItemType::Client);
        let results = search.new_search("", 10).await;
        assert!(results.is_empty());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn target_met_in_one_round_stops_the_search() {
        let (mut search, transport) = search();
        search.enable_type(ItemType::Client);
        search.enable_type(ItemType::Trainer);
        transport.script("QueryClients", json!({"queryClients": page(&["c1", "c2"], Some("tokA"))}));
        transport.script("QueryTrainers", json!({"queryTrainers": page(&["t1", "t2", "t3"], None)}));

        let results = search.new_search("ben", 5).await;

        assert_eq!(results.len(), 5);
        // One round: one query per enabled type, nothing re-fired.
        assert_eq!(transport.calls(), 2);
        assert_eq!(search.state(ItemType::Client).phase(), SearchPhase::Paging);
        assert_eq!(
            search.state(ItemType::Trainer).phase(),
            SearchPhase::Exhausted
        );
    }

    #[tokio::test]
    async fn exhausted_type_is_never_refired() {
        let (mut search, transport) = search();
        search.enable_type(ItemType::Client);
        search.enable_type(ItemType::Trainer);
        transport.script("QueryClients", json!({"queryClients": page(&["c1", "c2"], Some("tokA"))}));
        transport.script("QueryClients", json!({"queryClients": page(&["c3"], None)}));
        transport.script("QueryTrainers", json!({"queryTrainers": page(&["t1"], None)}));

        let results = search.new_search("ben", 4).await;

        // Round 1 fires both; round 2 fires only the type with a cursor.
        assert_eq!(transport.calls(), 3);
        assert_eq!(results.len(), 4);
        let trainer_queries = transport
            .sent()
            .iter()
            .filter(|sent| sent.operation_name() == "QueryTrainers")
            .count();
        assert_eq!(trainer_queries, 1);
    }

    #[tokio::test]
    async fn completes_short_when_every_type_is_exhausted() {
        let (mut search, transport) = search();
        search.enable_type(ItemType::Gym);
        transport.script("QueryGyms", json!({"queryGyms": page(&["g1"], None)}));

        let results = search.new_search("iron", 50).await;
        assert_eq!(results.len(), 1);
        assert_eq!(transport.calls(), 1);

        // Asking for more does not re-fire an exhausted source.
        let again = search.load_more(50).await;
        assert_eq!(again.len(), 1);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn disabled_type_is_removed_from_subsequent_rounds() {
        let (mut search, transport) = search();
        search.enable_type(ItemType::Client);
        search.enable_type(ItemType::Post);
        transport.script("QueryClients", json!({"queryClients": page(&["c1"], Some("tokC"))}));
        transport.script("QueryClients", json!({"queryClients": page(&["c2"], Some("tokC2"))}));
        transport.script("QueryPosts", json!({"queryPosts": page(&["p1"], Some("tokP"))}));

        search.new_search("ben", 2).await;
        assert_eq!(search.state(ItemType::Post).phase(), SearchPhase::Paging);

        // Post still holds a live cursor, but disabling it wins.
        search.disable_type(ItemType::Post);
        search.load_more(3).await;

        let post_queries = transport
            .sent()
            .iter()
            .filter(|sent| sent.operation_name() == "QueryPosts")
            .count();
        assert_eq!(post_queries, 1);
    }

    #[tokio::test]
    async fn failed_type_is_excluded_for_the_rest_of_the_search() {
        let (mut search, transport) = search();
        search.enable_type(ItemType::Client);
        search.enable_type(ItemType::Event);
        transport.script("QueryClients", json!({"queryClients": page(&["c1"], Some("tok1"))}));
        transport.script("QueryClients", json!({"queryClients": page(&["c2"], None)}));
        transport.script_error("QueryEvents", "backend unavailable");

        let results = search.new_search("run", 2).await;

        assert_eq!(results.len(), 2);
        assert_eq!(search.state(ItemType::Event).phase(), SearchPhase::Exhausted);
        let event_queries = transport
            .sent()
            .iter()
            .filter(|sent| sent.operation_name() == "QueryEvents")
            .count();
        assert_eq!(event_queries, 1);
    }

    #[tokio::test]
    async fn cancelled_search_returns_what_it_has() {
        let (mut search, transport) = search();
        search.enable_type(ItemType::Client);
        transport.script("QueryClients", json!({"queryClients": page(&["c1"], Some("tok"))}));

        let results = search.new_search("ben", 1).await;
        assert_eq!(results.len(), 1);

        search.cancel_token().cancel();
        let again = search.load_more(10).await;
        assert_eq!(again.len(), 1);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn new_search_resets_cancellation_and_type_states() {
        let (mut search, transport) = search();
        search.enable_type(ItemType::Client);
        transport.script("QueryClients", json!({"queryClients": page(&["c1"], None)}));
        transport.script("QueryClients", json!({"queryClients": page(&["c2"], None)}));

        search.new_search("ben", 1).await;
        search.cancel_token().cancel();

        let results = search.new_search("other", 1).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["id"], "c2");
        assert!(search.state(ItemType::Client).results().len() == 1);
    }

    #[tokio::test]
    async fn filter_binds_the_shared_search_text() {
        let (mut search, transport) = search();
        search.enable_type(ItemType::Client);
        search.set_type_filter(
            ItemType::Client,
            json!({"name": {"contains": "$searchQuery"}}),
            BTreeMap::new(),
        );
        transport.script("QueryClients", json!({"queryClients": page(&[], None)}));

        search.new_search("ben", 1).await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0]
            .text
            .contains("filter: {name:{contains:$searchQuery}}"));
        assert_eq!(sent[0].variables[SEARCH_QUERY_PARAMETER], json!("ben"));
    }
}
