//! Pagination strategy implementations

use super::types::{NextPage, PageParams, PaginationState, Paginator, StopCondition};
use crate::types::JsonValue;

/// Rest.li offset parameter
pub const START_PARAM: &str = "start";
/// Rest.li page size parameter
pub const COUNT_PARAM: &str = "count";

// ============================================================================
// start/count
// ============================================================================

/// Rest.li `?start=20&count=10` pagination
///
/// Stops on an empty page, a page shorter than `count`, or once
/// `paging.total` records were received.
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    page_size: u32,
    stop_conditions: [StopCondition; 3],
}

impl OffsetPaginator {
    /// Paginate with `count` records per page
    pub fn start_count(page_size: u32) -> Self {
        Self {
            page_size,
            stop_conditions: [
                StopCondition::EmptyPage,
                StopCondition::ShortPage,
                StopCondition::ReportedTotal,
            ],
        }
    }

    /// Records requested per page
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn params(&self, start: u32) -> PageParams {
        vec![
            (START_PARAM.to_string(), start.to_string()),
            (COUNT_PARAM.to_string(), self.page_size.to_string()),
        ]
    }
}

impl Paginator for OffsetPaginator {
    fn first_page(&self) -> PageParams {
        self.params(0)
    }

    fn advance(&self, body: &JsonValue, records: usize, state: &mut PaginationState) -> NextPage {
        state.record_page(records);

        let last = self
            .stop_conditions
            .iter()
            .any(|condition| condition.is_met(body, records, self.page_size, state));
        if last {
            state.finish();
            return NextPage::Done;
        }

        state.start += self.page_size;
        NextPage::Fetch(self.params(state.start))
    }
}

// ============================================================================
// Single resource
// ============================================================================

/// Single request for one resource (`/organizations/{id}`)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn first_page(&self) -> PageParams {
        Vec::new()
    }

    fn advance(&self, _body: &JsonValue, records: usize, state: &mut PaginationState) -> NextPage {
        state.record_page(records);
        state.finish();
        NextPage::Done
    }
}
