//! Endpoint routing module
//!
//! Maps each extraction mode to the LinkedIn API calls that realize it.
//!
//! # Overview
//!
//! An [`Endpoint`] is one of nine fixed modes. The [`EndpointRouter`] turns it,
//! together with a resolved date range and the organizations in scope, into a
//! [`CallPlan`]: ordered [`ApiCall`] templates, each carrying its pagination
//! convention, record path and the [`Processing`] that maps records to tables.

mod router;
mod types;

pub use router::{
    EndpointRouter, COMMENTS_TABLE, LIKES_TABLE, ORGANIZATIONS_TABLE, POSTS_TABLE,
    TIME_BOUND_FOLLOWER_STATISTICS, TIME_BOUND_PAGE_STATISTICS, TIME_BOUND_SHARE_STATISTICS,
    TOTAL_SHARE_STATISTICS,
};
pub use types::{
    encode, encode_path_segment, ApiCall, CallPlan, Endpoint, FanoutRule, FollowUp, Processing, QueryValue,
    TableTarget, Taxonomy,
};
