//! Endpoint, API call and call plan types

use crate::error::{Error, Result};
use crate::types::Urn;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Endpoint
// ============================================================================

/// Extraction mode selected by the `endpoints` configuration parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// Daily page statistics over a date range
    PageStatisticsTimeBound,
    /// Lifetime page statistics, fanned out by dimension
    PageStatisticsLifetime,
    /// Daily follower gains over a date range
    FollowerStatisticsTimeBound,
    /// Lifetime follower counts, fanned out by dimension
    FollowerStatisticsLifetime,
    /// Daily share statistics over a date range
    ShareStatisticsTimeBound,
    /// Lifetime share statistics
    ShareStatisticsLifetime,
    /// Posts with their comments and likes
    Posts,
    /// Standardized taxonomies (countries, functions, ...)
    EnumeratedTypes,
    /// Organization details
    Organizations,
}

impl Endpoint {
    /// All endpoints, in documentation order
    pub const ALL: [Endpoint; 9] = [
        Endpoint::PageStatisticsTimeBound,
        Endpoint::PageStatisticsLifetime,
        Endpoint::FollowerStatisticsTimeBound,
        Endpoint::FollowerStatisticsLifetime,
        Endpoint::ShareStatisticsTimeBound,
        Endpoint::ShareStatisticsLifetime,
        Endpoint::Posts,
        Endpoint::EnumeratedTypes,
        Endpoint::Organizations,
    ];

    /// Configuration name of the endpoint
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PageStatisticsTimeBound => "page_statistics_time_bound",
            Self::PageStatisticsLifetime => "page_statistics_lifetime",
            Self::FollowerStatisticsTimeBound => "follower_statistics_time_bound",
            Self::FollowerStatisticsLifetime => "follower_statistics_lifetime",
            Self::ShareStatisticsTimeBound => "share_statistics_time_bound",
            Self::ShareStatisticsLifetime => "share_statistics_lifetime",
            Self::Posts => "posts",
            Self::EnumeratedTypes => "enumerated_types",
            Self::Organizations => "organizations",
        }
    }

    /// Whether the endpoint needs a resolved date range
    pub fn is_time_bound(self) -> bool {
        matches!(
            self,
            Self::PageStatisticsTimeBound
                | Self::FollowerStatisticsTimeBound
                | Self::ShareStatisticsTimeBound
        )
    }

    /// Whether calls are issued per organization
    pub fn is_organization_scoped(self) -> bool {
        !matches!(self, Self::EnumeratedTypes)
    }

    /// Destination tables produced by the endpoint, as shown to operators
    pub fn table_summary(self) -> &'static str {
        match self {
            Self::PageStatisticsTimeBound => "time_bound_page_statistics",
            Self::PageStatisticsLifetime => "total_page_statistics, page_statistics_by_{dimension}",
            Self::FollowerStatisticsTimeBound => "time_bound_follower_statistics",
            Self::FollowerStatisticsLifetime => "follower_counts_by_{dimension}",
            Self::ShareStatisticsTimeBound => "time_bound_share_statistics",
            Self::ShareStatisticsLifetime => "total_share_statistics",
            Self::Posts => "posts, comments, likes",
            Self::EnumeratedTypes => "countries, functions, industries, regions, seniorities",
            Self::Organizations => "organizations",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| {
                Error::invalid_value(
                    "endpoints",
                    format!(
                        "unknown endpoint '{s}', expected one of: {}",
                        Self::ALL.map(Endpoint::as_str).join(", ")
                    ),
                )
            })
    }
}

// ============================================================================
// Taxonomy
// ============================================================================

/// Standardized data taxonomy fetched by `enumerated_types`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Taxonomy {
    /// Countries
    Countries,
    /// Job functions
    Functions,
    /// Industries
    Industries,
    /// Geographic regions
    Regions,
    /// Seniorities
    Seniorities,
}

impl Taxonomy {
    /// All taxonomies, in extraction order
    pub const ALL: [Taxonomy; 5] = [
        Taxonomy::Countries,
        Taxonomy::Functions,
        Taxonomy::Industries,
        Taxonomy::Regions,
        Taxonomy::Seniorities,
    ];

    /// API resource path, also the destination table name
    pub fn resource(self) -> &'static str {
        match self {
            Self::Countries => "countries",
            Self::Functions => "functions",
            Self::Industries => "industries",
            Self::Regions => "regions",
            Self::Seniorities => "seniorities",
        }
    }
}

// ============================================================================
// Table Targets
// ============================================================================

/// Fixed destination table of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableTarget {
    /// Table name
    pub name: &'static str,
    /// Primary key columns
    pub primary_key: &'static [&'static str],
}

impl TableTarget {
    /// Create a table target
    pub const fn new(name: &'static str, primary_key: &'static [&'static str]) -> Self {
        Self { name, primary_key }
    }

    /// Primary key as owned column names
    pub fn primary_key(&self) -> Vec<String> {
        self.primary_key.iter().map(|c| (*c).to_string()).collect()
    }
}

/// Which lifetime statistics response is fanned out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanoutRule {
    /// `pageStatisticsBy*` arrays plus a `total_page_statistics` table
    PageStatistics,
    /// `followerCountsBy*` arrays, no totals table
    FollowerStatistics,
}

/// How the records of a call become table rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processing {
    /// Flatten each record into one row of the target table
    Flatten(TableTarget),
    /// Hoist `totalShareStatistics` to the top level, then flatten
    HoistShareTotals(TableTarget),
    /// Split each record into a totals row and per-dimension rows
    Fanout(FanoutRule),
    /// Project the fixed columns of a taxonomy entry
    Project(Taxonomy),
    /// Organization ACL entries used to discover organizations, not written
    Discovery,
}

/// Calls derived from each record of a call once it has been fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowUp {
    /// Nothing further
    #[default]
    None,
    /// Comments and likes of each post
    PostSocialActions,
}

// ============================================================================
// API Call
// ============================================================================

/// A query parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Ordinary value, percent-encoded on the wire
    Plain(String),
    /// Rest.li structured value, structural characters sent verbatim
    RestLi(String),
}

impl QueryValue {
    /// The unencoded value
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain(v) | Self::RestLi(v) => v,
        }
    }
}

/// One API call template
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    /// Path relative to the API base URL, already percent-encoded
    pub path: String,
    /// Query parameters, in order
    pub query: Vec<(String, QueryValue)>,
    /// Page size for `start`/`count` pagination; `None` for single objects
    pub page_size: Option<u32>,
    /// Where the records live in the response body; `None` for the body itself
    pub record_path: Option<&'static str>,
    /// How records become rows
    pub processing: Processing,
    /// Calls derived from each fetched record
    pub follow_up: FollowUp,
    /// Organization the call is scoped to, for diagnostics
    pub organization: Option<Urn>,
}

impl ApiCall {
    /// Create a paginated call reading records from `elements`
    pub fn paged(path: impl Into<String>, page_size: u32, processing: Processing) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            page_size: Some(page_size),
            record_path: Some("elements"),
            processing,
            follow_up: FollowUp::None,
            organization: None,
        }
    }

    /// Create a single-object call
    pub fn single(path: impl Into<String>, processing: Processing) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            page_size: None,
            record_path: None,
            processing,
            follow_up: FollowUp::None,
            organization: None,
        }
    }

    /// Add a plain query parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), QueryValue::Plain(value.into())));
        self
    }

    /// Add a Rest.li structured query parameter
    #[must_use]
    pub fn restli_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), QueryValue::RestLi(value.into())));
        self
    }

    /// Scope the call to an organization
    #[must_use]
    pub fn for_organization(mut self, organization: &Urn) -> Self {
        self.organization = Some(organization.clone());
        self
    }

    /// Derive follow-up calls from each record
    #[must_use]
    pub fn with_follow_up(mut self, follow_up: FollowUp) -> Self {
        self.follow_up = follow_up;
        self
    }

    /// Look up a query parameter value
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render the query string, appending pagination parameters
    pub fn query_string(&self, paging: &[(String, String)]) -> String {
        self.query
            .iter()
            .map(|(key, value)| match value {
                QueryValue::Plain(v) => format!("{}={}", encode(key), encode(v)),
                QueryValue::RestLi(v) => format!("{}={v}", encode(key)),
            })
            .chain(
                paging
                    .iter()
                    .map(|(key, value)| format!("{}={}", encode(key), encode(value))),
            )
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Path plus rendered query string
    pub fn path_and_query(&self, paging: &[(String, String)]) -> String {
        let query = self.query_string(paging);
        if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{query}", self.path)
        }
    }
}

/// Characters escaped in a path segment: everything but RFC 3986 unreserved
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Form-encode one query key or value
pub fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Percent-encode one path segment (`urn:li:share:1` -> `urn%3Ali%3Ashare%3A1`)
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

// ============================================================================
// Call Plan
// ============================================================================

/// Ordered calls for one endpoint execution
#[derive(Debug, Clone, Default)]
pub struct CallPlan {
    /// Calls in execution order
    pub calls: Vec<ApiCall>,
}

impl CallPlan {
    /// Create a plan from calls
    pub fn new(calls: Vec<ApiCall>) -> Self {
        Self { calls }
    }

    /// Number of calls
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether no call is planned
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Whether any call fans out into dimension tables
    pub fn is_fanout(&self) -> bool {
        self.calls
            .iter()
            .any(|c| matches!(c.processing, Processing::Fanout(_)))
    }
}

impl IntoIterator for CallPlan {
    type Item = ApiCall;
    type IntoIter = std::vec::IntoIter<ApiCall>;

    fn into_iter(self) -> Self::IntoIter {
        self.calls.into_iter()
    }
}
