//! Endpoint to API call mapping

use super::types::{
    encode_path_segment, ApiCall, CallPlan, Endpoint, FanoutRule, FollowUp, Processing, TableTarget, Taxonomy,
};
use crate::daterange::DateRange;
use crate::error::{Error, Result};
use crate::types::Urn;
use tracing::debug;

/// `organizationAcls` resource, used for organization discovery
pub const ORGANIZATION_ACLS: &str = "organizationAcls";
/// `organizationPageStatistics` resource
pub const PAGE_STATISTICS: &str = "organizationPageStatistics";
/// `organizationalEntityFollowerStatistics` resource
pub const FOLLOWER_STATISTICS: &str = "organizationalEntityFollowerStatistics";
/// `organizationalEntityShareStatistics` resource
pub const SHARE_STATISTICS: &str = "organizationalEntityShareStatistics";
/// `posts` resource
pub const POSTS: &str = "posts";
/// `socialActions` resource
pub const SOCIAL_ACTIONS: &str = "socialActions";
/// `organizations` resource
pub const ORGANIZATIONS: &str = "organizations";

const STATISTICS_PAGE_SIZE: u32 = 10;
const POSTS_PAGE_SIZE: u32 = 100;
const SOCIAL_ACTIONS_PAGE_SIZE: u32 = 10;
const ACL_PAGE_SIZE: u32 = 10;
const TAXONOMY_PAGE_SIZE: u32 = 100;

/// `time_bound_page_statistics` table
pub const TIME_BOUND_PAGE_STATISTICS: TableTarget = TableTarget::new(
    "time_bound_page_statistics",
    &["organization", "timeRange_start", "timeRange_end"],
);
/// `time_bound_follower_statistics` table
pub const TIME_BOUND_FOLLOWER_STATISTICS: TableTarget = TableTarget::new(
    "time_bound_follower_statistics",
    &["organizationalEntity", "timeRange_start", "timeRange_end"],
);
/// `time_bound_share_statistics` table
pub const TIME_BOUND_SHARE_STATISTICS: TableTarget = TableTarget::new(
    "time_bound_share_statistics",
    &["organizationalEntity", "timeRange_start", "timeRange_end"],
);
/// `total_share_statistics` table
pub const TOTAL_SHARE_STATISTICS: TableTarget =
    TableTarget::new("total_share_statistics", &["organizationalEntity"]);
/// `posts` table
pub const POSTS_TABLE: TableTarget = TableTarget::new("posts", &["id"]);
/// `comments` table
pub const COMMENTS_TABLE: TableTarget = TableTarget::new("comments", &["id"]);
/// `likes` table
pub const LIKES_TABLE: TableTarget = TableTarget::new("likes", &["URN"]);
/// `organizations` table
pub const ORGANIZATIONS_TABLE: TableTarget = TableTarget::new("organizations", &["id"]);

/// Maps an endpoint mode to the API calls that realize it
#[derive(Debug, Clone)]
pub struct EndpointRouter {
    endpoint: Endpoint,
    date_range: Option<DateRange>,
}

impl EndpointRouter {
    /// Create a router for an endpoint
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            date_range: None,
        }
    }

    /// Set the resolved date range for time-bound endpoints
    #[must_use]
    pub fn with_date_range(mut self, date_range: Option<DateRange>) -> Self {
        self.date_range = date_range;
        self
    }

    /// The routed endpoint
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// The date range, if any
    pub fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref()
    }

    /// Build the call plan for the given organizations
    ///
    /// Organization-scoped endpoints produce no calls for an empty list.
    pub fn plan(&self, organizations: &[Urn]) -> Result<CallPlan> {
        let calls: Vec<ApiCall> = match self.endpoint {
            Endpoint::PageStatisticsTimeBound => {
                let intervals = self.time_intervals()?;
                organizations
                    .iter()
                    .map(|org| {
                        page_statistics_call(org, Processing::Flatten(TIME_BOUND_PAGE_STATISTICS))
                            .restli_param("timeIntervals", intervals.clone())
                    })
                    .collect()
            }
            Endpoint::PageStatisticsLifetime => organizations
                .iter()
                .map(|org| {
                    page_statistics_call(org, Processing::Fanout(FanoutRule::PageStatistics))
                })
                .collect(),
            Endpoint::FollowerStatisticsTimeBound => {
                let intervals = self.time_intervals()?;
                organizations
                    .iter()
                    .map(|org| {
                        entity_statistics_call(
                            FOLLOWER_STATISTICS,
                            org,
                            Processing::Flatten(TIME_BOUND_FOLLOWER_STATISTICS),
                        )
                        .restli_param("timeIntervals", intervals.clone())
                    })
                    .collect()
            }
            Endpoint::FollowerStatisticsLifetime => organizations
                .iter()
                .map(|org| {
                    entity_statistics_call(
                        FOLLOWER_STATISTICS,
                        org,
                        Processing::Fanout(FanoutRule::FollowerStatistics),
                    )
                })
                .collect(),
            Endpoint::ShareStatisticsTimeBound => {
                let intervals = self.time_intervals()?;
                organizations
                    .iter()
                    .map(|org| {
                        entity_statistics_call(
                            SHARE_STATISTICS,
                            org,
                            Processing::HoistShareTotals(TIME_BOUND_SHARE_STATISTICS),
                        )
                        .restli_param("timeIntervals", intervals.clone())
                    })
                    .collect()
            }
            Endpoint::ShareStatisticsLifetime => organizations
                .iter()
                .map(|org| {
                    entity_statistics_call(
                        SHARE_STATISTICS,
                        org,
                        Processing::HoistShareTotals(TOTAL_SHARE_STATISTICS),
                    )
                })
                .collect(),
            Endpoint::Posts => organizations
                .iter()
                .flat_map(|org| [posts_call(org, false), posts_call(org, true)])
                .collect(),
            Endpoint::EnumeratedTypes => Taxonomy::ALL.into_iter().map(taxonomy_call).collect(),
            Endpoint::Organizations => organizations
                .iter()
                .map(|org| {
                    ApiCall::single(
                        format!("{ORGANIZATIONS}/{}", org.id),
                        Processing::Flatten(ORGANIZATIONS_TABLE),
                    )
                    .for_organization(org)
                })
                .collect(),
        };

        let plan = CallPlan::new(calls);
        debug!(
            "Planned {} call(s) for endpoint '{}' over {} organization(s)",
            plan.len(),
            self.endpoint,
            organizations.len()
        );
        Ok(plan)
    }

    /// Comments and likes calls for one post
    pub fn post_children(post_urn: &str, organization: Option<&Urn>) -> [ApiCall; 2] {
        let encoded = encode_path_segment(post_urn);
        let scoped = |call: ApiCall| match organization {
            Some(org) => call.for_organization(org),
            None => call,
        };
        [
            scoped(ApiCall::paged(
                format!("{SOCIAL_ACTIONS}/{encoded}/comments"),
                SOCIAL_ACTIONS_PAGE_SIZE,
                Processing::Flatten(COMMENTS_TABLE),
            )),
            scoped(ApiCall::paged(
                format!("{SOCIAL_ACTIONS}/{encoded}/likes"),
                SOCIAL_ACTIONS_PAGE_SIZE,
                Processing::Flatten(LIKES_TABLE),
            )),
        ]
    }

    /// Organization ACL call listing organizations the token can administer
    pub fn discovery_call() -> ApiCall {
        ApiCall::paged(ORGANIZATION_ACLS, ACL_PAGE_SIZE, Processing::Discovery)
            .param("q", "roleAssignee")
    }

    fn time_intervals(&self) -> Result<String> {
        let range = self.date_range.as_ref().ok_or_else(|| {
            Error::config(format!(
                "Endpoint '{}' requires sync_options with date_from and date_to",
                self.endpoint
            ))
        })?;
        Ok(format!(
            "(timeRange:{},timeGranularityType:DAY)",
            range.to_restli()
        ))
    }
}

fn page_statistics_call(org: &Urn, processing: Processing) -> ApiCall {
    ApiCall::paged(PAGE_STATISTICS, STATISTICS_PAGE_SIZE, processing)
        .param("q", "organization")
        .param("organization", org.to_string())
        .for_organization(org)
}

fn entity_statistics_call(resource: &str, org: &Urn, processing: Processing) -> ApiCall {
    ApiCall::paged(resource, STATISTICS_PAGE_SIZE, processing)
        .param("q", "organizationalEntity")
        .param("organizationalEntity", org.to_string())
        .for_organization(org)
}

fn posts_call(org: &Urn, is_dsc: bool) -> ApiCall {
    ApiCall::paged(POSTS, POSTS_PAGE_SIZE, Processing::Flatten(POSTS_TABLE))
        .param("q", "author")
        .param("author", org.to_string())
        .param("isDsc", is_dsc.to_string())
        .for_organization(org)
        .with_follow_up(FollowUp::PostSocialActions)
}

fn taxonomy_call(taxonomy: Taxonomy) -> ApiCall {
    ApiCall::paged(
        taxonomy.resource(),
        TAXONOMY_PAGE_SIZE,
        Processing::Project(taxonomy),
    )
}
