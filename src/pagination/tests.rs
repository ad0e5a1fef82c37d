//! Tests for pagination strategies and page streams

use super::*;
use crate::endpoint::{ApiCall, Processing};
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::types::JsonValue;
use async_trait::async_trait;
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// Fake transport
// ============================================================================

/// Replays canned bodies and records the paging parameters of each request
#[derive(Default)]
struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<JsonValue>>>,
    requests: Mutex<Vec<Vec<(String, String)>>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<Result<JsonValue>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::default(),
        }
    }

    fn requests(&self) -> Vec<Vec<(String, String)>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, _call: &ApiCall, paging: &[(String, String)]) -> Result<JsonValue> {
        self.requests.lock().unwrap().push(paging.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("no scripted response left".into())))
    }
}

fn elements(ids: std::ops::Range<u32>) -> JsonValue {
    json!({ "elements": ids.map(|id| json!({"id": id})).collect::<Vec<_>>() })
}

fn paging(start: u32, count: u32) -> Vec<(String, String)> {
    vec![
        ("start".to_string(), start.to_string()),
        ("count".to_string(), count.to_string()),
    ]
}

fn posts_call(page_size: u32) -> ApiCall {
    ApiCall::paged("posts", page_size, Processing::Discovery)
}

// ============================================================================
// Paginators
// ============================================================================

#[test]
fn test_offset_first_page() {
    let paginator = OffsetPaginator::start_count(10);
    assert_eq!(paginator.page_size(), 10);
    assert_eq!(paginator.first_page(), paging(0, 10));
}

#[test]
fn test_offset_advances_on_full_page() {
    let paginator = OffsetPaginator::start_count(10);
    let mut state = PaginationState::new();

    let next = paginator.advance(&elements(0..10), 10, &mut state);
    assert_eq!(next, NextPage::Fetch(paging(10, 10)));
    assert_eq!(state.pages, 1);
    assert_eq!(state.fetched, 10);
    assert!(!state.done);

    let next = paginator.advance(&elements(10..20), 10, &mut state);
    assert_eq!(next, NextPage::Fetch(paging(20, 10)));
}

#[test]
fn test_offset_stops_on_short_page() {
    let paginator = OffsetPaginator::start_count(10);
    let mut state = PaginationState::new();

    let next = paginator.advance(&elements(0..3), 3, &mut state);
    assert!(next.is_done());
    assert!(state.done);
}

#[test]
fn test_offset_stops_on_empty_page() {
    let paginator = OffsetPaginator::start_count(10);
    let mut state = PaginationState::new();

    let next = paginator.advance(&json!({"elements": []}), 0, &mut state);
    assert!(next.is_done());
}

#[test]
fn test_offset_stops_at_reported_total() {
    let paginator = OffsetPaginator::start_count(5);
    let mut state = PaginationState::new();
    let body = json!({
        "elements": [{}, {}, {}, {}, {}],
        "paging": {"start": 0, "count": 5, "total": 5}
    });

    let next = paginator.advance(&body, 5, &mut state);
    assert!(next.is_done());
}

#[test]
fn test_paging_info_from_body() {
    let body = json!({"paging": {"start": 10, "count": 10, "links": []}});
    assert_eq!(
        PagingInfo::from_body(&body),
        Some(PagingInfo {
            start: 10,
            count: 10,
            total: None
        })
    );
    assert_eq!(PagingInfo::from_body(&json!({"elements": []})), None);
}

#[test]
fn test_stop_conditions() {
    let state = PaginationState {
        fetched: 12,
        ..PaginationState::default()
    };
    let body = json!({"paging": {"start": 10, "count": 10, "total": 12}});

    assert!(StopCondition::EmptyPage.is_met(&body, 0, 10, &state));
    assert!(!StopCondition::EmptyPage.is_met(&body, 2, 10, &state));
    assert!(StopCondition::ShortPage.is_met(&body, 2, 10, &state));
    assert!(!StopCondition::ShortPage.is_met(&body, 10, 10, &state));
    assert!(StopCondition::ReportedTotal.is_met(&body, 2, 10, &state));
    assert!(!StopCondition::ReportedTotal.is_met(&json!({}), 2, 10, &state));
}

#[test]
fn test_no_paginator_is_single_request() {
    let paginator = NoPaginator;
    let mut state = PaginationState::new();

    assert!(paginator.first_page().is_empty());
    let next = paginator.advance(&json!({"id": 1}), 1, &mut state);
    assert!(next.is_done());
    assert_eq!(state.pages, 1);
}

// ============================================================================
// Record extraction
// ============================================================================

#[test]
fn test_extract_records_from_elements() {
    let records = extract_records(&elements(0..2), Some("elements")).unwrap();
    assert_eq!(records, vec![json!({"id": 0}), json!({"id": 1})]);
}

#[test]
fn test_extract_records_null_is_empty() {
    let records = extract_records(&json!({"elements": null}), Some("elements")).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_extract_records_malformed() {
    let err = extract_records(&json!({"elements": {"id": 1}}), Some("elements")).unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));

    let err = extract_records(&json!({"paging": {}}), Some("elements")).unwrap_err();
    assert!(err.to_string().contains("elements"));

    let err = extract_records(&json!([1, 2]), None).unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[test]
fn test_extract_single_object() {
    let body = json!({"id": 42, "localizedName": "Acme"});
    assert_eq!(extract_records(&body, None).unwrap(), vec![body]);
}

// ============================================================================
// Page streams
// ============================================================================

#[tokio::test]
async fn test_page_stream_walks_all_pages() {
    let transport = ScriptedTransport::new(vec![
        Ok(elements(0..2)),
        Ok(elements(2..4)),
        Ok(elements(4..5)),
    ]);
    let call = posts_call(2);

    let pages: Vec<Vec<JsonValue>> = PageStream::new(&transport, &call)
        .into_stream()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(pages.iter().map(Vec::len).collect::<Vec<_>>(), vec![2, 2, 1]);
    assert_eq!(
        transport.requests(),
        vec![paging(0, 2), paging(2, 2), paging(4, 2)]
    );
}

#[tokio::test]
async fn test_page_stream_empty_collection() {
    let transport = ScriptedTransport::new(vec![Ok(json!({"elements": []}))]);
    let call = posts_call(10);

    let mut pages = PageStream::new(&transport, &call);
    assert_eq!(pages.next_page().await.unwrap(), None);
    assert!(pages.is_exhausted());
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_page_stream_stays_exhausted() {
    let transport = ScriptedTransport::new(vec![Ok(elements(0..1))]);
    let call = posts_call(10);

    let mut pages = PageStream::new(&transport, &call);
    assert_eq!(pages.next_page().await.unwrap().map(|p| p.len()), Some(1));
    assert_eq!(pages.next_page().await.unwrap(), None);
    assert_eq!(pages.next_page().await.unwrap(), None);
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(pages.state().pages, 1);
    assert!(pages.state().done);
}

#[tokio::test]
async fn test_page_stream_exhausted_after_error() {
    let transport = ScriptedTransport::new(vec![
        Ok(elements(0..2)),
        Err(Error::http_status(500, "boom")),
        Ok(elements(0..2)),
    ]);
    let call = posts_call(2);

    let mut pages = PageStream::new(&transport, &call);
    assert!(pages.next_page().await.unwrap().is_some());
    assert!(pages.next_page().await.is_err());
    assert_eq!(pages.next_page().await.unwrap(), None);
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn test_page_stream_single_object() {
    let transport = ScriptedTransport::new(vec![Ok(json!({"id": 7}))]);
    let call = ApiCall::single("organizations/7", Processing::Discovery);

    let mut pages = PageStream::new(&transport, &call);
    assert_eq!(pages.next_page().await.unwrap(), Some(vec![json!({"id": 7})]));
    assert_eq!(pages.next_page().await.unwrap(), None);
    assert_eq!(transport.requests(), vec![Vec::new()]);
}

#[tokio::test]
async fn test_page_stream_as_stream() {
    let transport = ScriptedTransport::new(vec![Ok(elements(0..3)), Ok(elements(3..4))]);
    let call = posts_call(3);

    let pages: Vec<Vec<JsonValue>> = PageStream::new(&transport, &call)
        .into_stream()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1], vec![json!({"id": 3})]);
}
