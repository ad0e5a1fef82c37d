//! Pagination types and traits
//!
//! LinkedIn collections answer with
//! `{"elements": [...], "paging": {"start": 0, "count": 10, "total": 42}}`.
//! `total` is optional and missing from most statistics finders, so the
//! length of the page is the primary end-of-collection signal.

use crate::types::JsonValue;
use serde::Deserialize;

/// Query parameters selecting one page
pub type PageParams = Vec<(String, String)>;

/// What to request after the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Request the page with these parameters
    Fetch(PageParams),
    /// The collection is exhausted
    Done,
}

impl NextPage {
    /// Check if the collection is exhausted
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// `paging` block of a collection response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PagingInfo {
    /// Offset of the first element of the page
    #[serde(default)]
    pub start: u64,
    /// Requested page size
    #[serde(default)]
    pub count: u64,
    /// Collection size, when the finder reports it
    #[serde(default)]
    pub total: Option<u64>,
}

impl PagingInfo {
    /// Read the `paging` block of a response body
    pub fn from_body(body: &JsonValue) -> Option<Self> {
        body.get("paging")
            .and_then(|paging| serde_json::from_value(paging.clone()).ok())
    }
}

/// Condition marking the page just received as the last one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    /// The page has no records
    EmptyPage,
    /// The page has fewer records than requested
    ShortPage,
    /// Records fetched so far reach `paging.total`
    ReportedTotal,
}

impl StopCondition {
    /// Whether the condition holds for a page of `records` out of `page_size`
    pub fn is_met(
        &self,
        body: &JsonValue,
        records: usize,
        page_size: u32,
        state: &PaginationState,
    ) -> bool {
        match self {
            Self::EmptyPage => records == 0,
            Self::ShortPage => records < page_size as usize,
            Self::ReportedTotal => PagingInfo::from_body(body)
                .and_then(|paging| paging.total)
                .is_some_and(|total| state.fetched >= total),
        }
    }
}

/// Progress through one collection
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages received
    pub pages: u32,
    /// `start` of the next page
    pub start: u32,
    /// Records received
    pub fetched: u64,
    /// Whether the collection is exhausted
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a received page
    pub fn record_page(&mut self, records: usize) {
        self.pages += 1;
        self.fetched += records as u64;
    }

    /// Mark the collection as exhausted
    pub fn finish(&mut self) {
        self.done = true;
    }
}

/// Pagination convention of an API call
pub trait Paginator: Send + Sync {
    /// Parameters of the first page
    fn first_page(&self) -> PageParams;

    /// Account for a received page and decide what to request next
    fn advance(&self, body: &JsonValue, records: usize, state: &mut PaginationState) -> NextPage;
}
