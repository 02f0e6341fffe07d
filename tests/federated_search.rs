//! End-to-end federated search over a scripted transport: filter templates,
//! cursor threading across rounds, and aggregate target accounting.

use peakform_sdk::prelude::*;
use peakform_sdk::search::SEARCH_QUERY_PARAMETER;
use peakform_sdk::transport::MockTransport;
use serde_json::{json, Value};
use std::collections::BTreeMap;

fn page(ids: &[&str], next_token: Option<&str>) -> Value {
    let items: Vec<Value> = ids.iter().map(|id| json!({"id": id, "name": id})).collect();
    json!({"items": items, "nextToken": next_token})
}

fn name_filter() -> Value {
    json!({"name": {"contains": "$searchQuery"}})
}

#[tokio::test]
async fn multi_round_search_threads_cursors_until_the_target_is_met() {
    let transport = MockTransport::new();
    let client = PeakFormClient::new(transport.clone());
    let mut search = FederatedSearch::new(client);

    for item_type in [ItemType::Client, ItemType::Trainer, ItemType::Gym] {
        search.enable_type(item_type);
        search.set_type_filter(item_type, name_filter(), BTreeMap::new());
        search.set_type_fields(item_type, &["id", "name"]);
        search.set_type_limit(item_type, 2);
    }

    // Round 1: every enabled type fires; Gym exhausts immediately.
    transport.script("QueryClients", json!({"queryClients": page(&["c1", "c2"], Some("ctok1"))}));
    transport.script("QueryTrainers", json!({"queryTrainers": page(&["t1"], Some("ttok1"))}));
    transport.script("QueryGyms", json!({"queryGyms": page(&["g1"], None)}));
    // Round 2: only the two types holding cursors fire.
    transport.script("QueryClients", json!({"queryClients": page(&["c3", "c4"], Some("ctok2"))}));
    transport.script("QueryTrainers", json!({"queryTrainers": page(&["t2"], None)}));

    let results = search.new_search("ben", 7).await;

    assert_eq!(results.len(), 7);
    assert_eq!(transport.calls(), 5);

    // Per-type accounting survives the merge.
    assert_eq!(search.state(ItemType::Client).results().len(), 4);
    assert_eq!(search.state(ItemType::Trainer).results().len(), 2);
    assert_eq!(search.state(ItemType::Gym).results().len(), 1);
    assert_eq!(search.state(ItemType::Client).phase(), SearchPhase::Paging);
    assert_eq!(search.state(ItemType::Trainer).phase(), SearchPhase::Exhausted);
    assert_eq!(search.state(ItemType::Gym).phase(), SearchPhase::Exhausted);

    let sent = transport.sent();

    // Every fired document binds the shared search text and carries the
    // rendered filter clause.
    for document in &sent {
        assert_eq!(document.variables[SEARCH_QUERY_PARAMETER], json!("ben"));
        assert!(document.text.contains("filter: {name:{contains:$searchQuery}}"));
        assert!(document.text.contains("nextToken"));
    }

    // Round 2 documents thread round 1's cursors back in.
    let client_queries: Vec<_> = sent
        .iter()
        .filter(|d| d.operation_name() == "QueryClients")
        .collect();
    assert_eq!(client_queries.len(), 2);
    assert!(!client_queries[0].variables.contains_key("nextToken"));
    assert_eq!(client_queries[1].variables["nextToken"], json!("ctok1"));

    let gym_queries = sent
        .iter()
        .filter(|d| d.operation_name() == "QueryGyms")
        .count();
    assert_eq!(gym_queries, 1);
}

#[tokio::test]
async fn search_results_arrive_in_round_order() {
    let transport = MockTransport::new();
    let client = PeakFormClient::new(transport.clone());
    let mut search = FederatedSearch::new(client);

    search.enable_type(ItemType::Client);
    search.enable_type(ItemType::Post);
    transport.script("QueryClients", json!({"queryClients": page(&["c1"], Some("tok"))}));
    transport.script("QueryClients", json!({"queryClients": page(&["c2"], None)}));
    transport.script("QueryPosts", json!({"queryPosts": page(&["p1"], None)}));

    let results = search.new_search("ben", 3).await;
    let ids: Vec<&str> = results.iter().filter_map(|r| r["id"].as_str()).collect();

    // Within a round, merge order is arrival order across types; across
    // rounds, earlier rounds come first. No global sorting.
    assert_eq!(ids, vec!["c1", "p1", "c2"]);
}

#[tokio::test]
async fn restricting_categories_mid_search_takes_effect_next_round() {
    let transport = MockTransport::new();
    let client = PeakFormClient::new(transport.clone());
    let mut search = FederatedSearch::new(client);

    search.enable_type(ItemType::Client);
    search.enable_type(ItemType::Event);
    transport.script("QueryClients", json!({"queryClients": page(&["c1"], Some("ctok"))}));
    transport.script("QueryClients", json!({"queryClients": page(&["c2"], None)}));
    transport.script("QueryEvents", json!({"queryEvents": page(&["e1"], Some("etok"))}));

    search.new_search("run", 2).await;
    assert_eq!(search.state(ItemType::Event).phase(), SearchPhase::Paging);

    // The user narrows search to clients only; the live Event cursor must
    // not bring the type back.
    search.disable_type(ItemType::Event);
    let results = search.load_more(3).await;

    assert_eq!(results.len(), 3);
    let event_queries = transport
        .sent()
        .iter()
        .filter(|d| d.operation_name() == "QueryEvents")
        .count();
    assert_eq!(event_queries, 1);
    assert_eq!(search.state(ItemType::Event).phase(), SearchPhase::Idle);
}
