//! Lazy page sequence over one API call

use super::strategies::{NoPaginator, OffsetPaginator};
use super::types::{NextPage, PageParams, PaginationState, Paginator};
use crate::endpoint::ApiCall;
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::types::{extract_path, JsonValue};
use futures::Stream;
use tracing::debug;

/// Pages of records fetched for one [`ApiCall`]
///
/// Finite and not restartable: once the last page has been returned, or a
/// request failed, [`PageStream::next_page`] keeps returning `Ok(None)`.
pub struct PageStream<'a, T: Transport + ?Sized> {
    transport: &'a T,
    call: &'a ApiCall,
    paginator: Box<dyn Paginator>,
    state: PaginationState,
    pending: Option<PageParams>,
}

impl<'a, T: Transport + ?Sized> PageStream<'a, T> {
    /// Create a page stream using the call's pagination convention
    pub fn new(transport: &'a T, call: &'a ApiCall) -> Self {
        let paginator: Box<dyn Paginator> = match call.page_size {
            Some(count) => Box::new(OffsetPaginator::start_count(count)),
            None => Box::new(NoPaginator),
        };
        Self::with_paginator(transport, call, paginator)
    }

    /// Create a page stream with an explicit paginator
    pub fn with_paginator(
        transport: &'a T,
        call: &'a ApiCall,
        paginator: Box<dyn Paginator>,
    ) -> Self {
        let pending = Some(paginator.first_page());
        Self {
            transport,
            call,
            paginator,
            state: PaginationState::new(),
            pending,
        }
    }

    /// Fetch the next page of records, `Ok(None)` once exhausted
    pub async fn next_page(&mut self) -> Result<Option<Vec<JsonValue>>> {
        let Some(params) = self.pending.take() else {
            return Ok(None);
        };

        let body = self.transport.fetch(self.call, &params).await?;
        let records = extract_records(&body, self.call.record_path)?;

        if let NextPage::Fetch(params) =
            self.paginator
                .advance(&body, records.len(), &mut self.state)
        {
            self.pending = Some(params);
        }
        debug!(
            "Fetched page {} of '{}' ({} records)",
            self.state.pages,
            self.call.path,
            records.len()
        );

        if records.is_empty() {
            self.pending = None;
            return Ok(None);
        }
        Ok(Some(records))
    }

    /// Whether the stream has been exhausted
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_none()
    }

    /// Pagination progress so far
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Expose the pages as a [`Stream`]
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<JsonValue>>> + 'a {
        futures::stream::try_unfold(self, |mut pages| async move {
            let page = pages.next_page().await?;
            Ok::<_, Error>(page.map(|page| (page, pages)))
        })
    }
}

/// Pull the records out of a response body
///
/// With a record path, the value at that path must be an array (null counts
/// as empty). Without one, the body itself is the single record.
pub fn extract_records(body: &JsonValue, record_path: Option<&str>) -> Result<Vec<JsonValue>> {
    let Some(path) = record_path else {
        return match body {
            JsonValue::Object(_) => Ok(vec![body.clone()]),
            other => Err(Error::malformed(format!(
                "expected a JSON object, got: {other}"
            ))),
        };
    };

    match extract_path(body, path) {
        Some(JsonValue::Array(items)) => Ok(items.clone()),
        Some(JsonValue::Null) => Ok(Vec::new()),
        Some(other) => Err(Error::malformed(format!(
            "'{path}' is not an array: {other}"
        ))),
        None => Err(Error::malformed(format!("response has no '{path}' field"))),
    }
}
