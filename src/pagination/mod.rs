//! Pagination module
//!
//! Supports: Offset (`start`/`count`), single object
//!
//! # Overview
//!
//! A [`Paginator`] computes the query parameters of the next page from the
//! current response. A [`PageStream`] drives one API call through its
//! paginator, yielding the records page by page until the collection is
//! exhausted.

mod strategies;
mod stream;
mod types;

pub use strategies::{NoPaginator, OffsetPaginator, COUNT_PARAM, START_PARAM};
pub use stream::{extract_records, PageStream};
pub use types::{NextPage, PageParams, PaginationState, Paginator, PagingInfo, StopCondition};

#[cfg(test)]
mod tests;
