//! Tests for engine module

use super::*;
use crate::config::SyncOptions;
use crate::endpoint::Endpoint;
use crate::output::WrittenTable;
use crate::state::InMemoryStateStore;
use crate::table::TableSpec;
use crate::types::LoadType;
use async_trait::async_trait;
use chrono::TimeZone;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Mutex;

// ============================================================================
// Fakes
// ============================================================================

type Handler = Box<dyn Fn(&ApiCall) -> Result<JsonValue> + Send + Sync>;

/// Answers calls with a handler and records each requested path
struct FakeApi {
    handler: Handler,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    fn new(handler: impl Fn(&ApiCall) -> Result<JsonValue> + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::default(),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeApi {
    async fn fetch(&self, call: &ApiCall, paging: &[(String, String)]) -> Result<JsonValue> {
        self.calls.lock().unwrap().push(call.path_and_query(paging));
        (self.handler)(call)
    }
}

/// Keeps written tables in memory
#[derive(Default)]
struct MemoryWriter {
    tables: Mutex<Vec<TableSpec>>,
}

impl MemoryWriter {
    fn table(&self, name: &str) -> Option<TableSpec> {
        self.tables
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.name() == name)
            .cloned()
    }

    fn names(&self) -> Vec<String> {
        self.tables
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.name().to_string())
            .collect()
    }
}

impl TableWriter for MemoryWriter {
    fn write_table(&self, table: &TableSpec) -> Result<Option<WrittenTable>> {
        if table.is_empty() {
            return Ok(None);
        }
        self.tables.lock().unwrap().push(table.clone());
        Ok(Some(WrittenTable {
            name: table.name().to_string(),
            rows: table.len(),
            path: PathBuf::from(table.name()),
        }))
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 3, 12, 0, 0).unwrap()
}

fn pipeline(api: FakeApi) -> Pipeline<FakeApi, InMemoryStateStore, MemoryWriter> {
    Pipeline::new(api, InMemoryStateStore::new(), MemoryWriter::default()).with_now(now())
}

fn follower_day(start_ms: i64) -> JsonValue {
    json!({
        "organizationalEntity": "urn:li:organization:42",
        "timeRange": {"start": start_ms, "end": start_ms + 86_400_000},
        "followerGains": {"organicFollowerGain": 2, "paidFollowerGain": 0}
    })
}

// ============================================================================
// Stage and stats types
// ============================================================================

#[test]
fn test_pipeline_stage_names() {
    assert_eq!(PipelineStage::ResolveDateRange.to_string(), "resolve_date_range");
    assert_eq!(PipelineStage::Fanout.as_str(), "fanout");
    assert!(PipelineStage::Done.is_terminal());
    assert!(PipelineStage::Failed.is_terminal());
    assert!(!PipelineStage::Write.is_terminal());
}

#[test]
fn test_sync_stats() {
    let mut stats = SyncStats::new();
    stats.add_call();
    stats.add_page(10);
    stats.add_page(3);
    stats.add_table(13);
    assert_eq!(stats.calls_made, 1);
    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.records_fetched, 13);
    assert_eq!(stats.tables_written, 1);
    assert_eq!(stats.rows_written, 13);
}

#[test]
fn test_request_builder() {
    let request = ExtractionRequest::new(Endpoint::Posts)
        .with_organizations([1, 2])
        .with_load_type(LoadType::IncrementalLoad);
    assert_eq!(request.organizations, vec![1, 2]);
    assert!(request.sync_options.is_none());
    assert!(request.load_type.is_incremental());
}

// ============================================================================
// Runs
// ============================================================================

#[tokio::test]
async fn test_time_bound_run_writes_rows_and_state() {
    let api = FakeApi::new(|_| {
        Ok(json!({"elements": [
            follower_day(1_672_531_200_000),
            follower_day(1_672_617_600_000)
        ]}))
    });
    let pipeline = pipeline(api);
    let request = ExtractionRequest::new(Endpoint::FollowerStatisticsTimeBound)
        .with_organizations([42])
        .with_sync_options(SyncOptions::new("2023-01-01", "2023-01-03"))
        .with_load_type(LoadType::IncrementalLoad);

    let report = pipeline.run(&request).await.unwrap();

    assert_eq!(report.table_names(), vec!["time_bound_follower_statistics"]);
    assert_eq!(report.stats.rows_written, 2);
    assert_eq!(report.date_range.unwrap().days(), 2);

    let table = pipeline
        .writer()
        .table("time_bound_follower_statistics")
        .unwrap();
    assert_eq!(
        table.primary_key(),
        &["organizationalEntity", "timeRange_start", "timeRange_end"]
    );
    assert_eq!(
        table.rows()[0]["timeRange_start"],
        json!("2023-01-01T00:00:00+00:00")
    );
    assert_eq!(table.rows()[1]["timeRange_end"], json!("2023-01-03T00:00:00+00:00"));
    assert_eq!(table.load_type(), LoadType::IncrementalLoad);

    assert_eq!(
        pipeline.state().read_last_run().await.unwrap(),
        Some(now())
    );

    let calls = pipeline.transport().calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("organizationalEntityFollowerStatistics?q=organizationalEntity"));
    assert!(calls[0].contains("timeIntervals=(timeRange:(start:1672531200000,end:1672704000000),timeGranularityType:DAY)"));
}

#[tokio::test]
async fn test_last_run_anchors_date_from() {
    let api = FakeApi::new(|_| Ok(json!({"elements": []})));
    let last_run = Utc.with_ymd_and_hms(2023, 1, 2, 18, 30, 0).unwrap();
    let pipeline = Pipeline::new(
        api,
        InMemoryStateStore::with_last_run(last_run),
        MemoryWriter::default(),
    )
    .with_now(now());
    let request = ExtractionRequest::new(Endpoint::PageStatisticsTimeBound)
        .with_organizations([1])
        .with_sync_options(SyncOptions::new("last run", "today"));

    let report = pipeline.run(&request).await.unwrap();

    let range = report.date_range.unwrap();
    assert_eq!(range.to_string(), "[2023-01-02, 2023-01-03)");
    assert!(report.tables.is_empty());
}

#[tokio::test]
async fn test_time_bound_without_sync_options_fails_before_any_call() {
    let api = FakeApi::new(|_| Ok(json!({"elements": []})));
    let pipeline = pipeline(api);
    let request =
        ExtractionRequest::new(Endpoint::ShareStatisticsTimeBound).with_organizations([1]);

    let err = pipeline.run(&request).await.unwrap_err();

    assert!(err.is_configuration());
    assert!(pipeline.transport().calls().is_empty());
    assert_eq!(pipeline.state().read_last_run().await.unwrap(), None);
}

#[tokio::test]
async fn test_invalid_date_is_configuration_error() {
    let api = FakeApi::new(|_| Ok(json!({"elements": []})));
    let pipeline = pipeline(api);
    let request = ExtractionRequest::new(Endpoint::PageStatisticsTimeBound)
        .with_organizations([1])
        .with_sync_options(SyncOptions::new("2023-01-05", "2023-01-01"));

    let err = pipeline.run(&request).await.unwrap_err();
    assert!(err.is_configuration());
    assert!(pipeline.transport().calls().is_empty());
}

#[tokio::test]
async fn test_lifetime_page_statistics_fan_out() {
    let api = FakeApi::new(|_| {
        Ok(json!({"elements": [{
            "organization": "urn:li:organization:42",
            "totalPageStatistics": {"views": {"allPageViews": {"pageViews": 10}}},
            "pageStatisticsBySeniority": [
                {"seniority": "urn:li:seniority:1", "pageStatistics": {"views": {"allPageViews": {"pageViews": 4}}}}
            ],
            "pageStatisticsByFunction": []
        }]}))
    });
    let pipeline = pipeline(api);
    let request = ExtractionRequest::new(Endpoint::PageStatisticsLifetime).with_organizations([42]);

    let report = pipeline.run(&request).await.unwrap();

    assert_eq!(
        report.table_names(),
        vec!["total_page_statistics", "page_statistics_by_seniority"]
    );
    assert!(pipeline.writer().table("page_statistics_by_function").is_none());
}

#[tokio::test]
async fn test_discovery_when_no_organizations_configured() {
    let api = FakeApi::new(|call| {
        if call.path == "organizationAcls" {
            Ok(json!({"elements": [
                {"organization": "urn:li:organization:7", "role": "ADMINISTRATOR"},
                {"organization": "urn:li:organization:7", "role": "CONTENT_ADMINISTRATOR"},
                {"organization": "urn:li:organization:8", "role": "ADMINISTRATOR"}
            ]}))
        } else {
            let id: u64 = call.path.trim_start_matches("organizations/").parse().unwrap();
            Ok(json!({"id": id, "localizedName": format!("Org {id}")}))
        }
    });
    let pipeline = pipeline(api);

    let report = pipeline
        .run(&ExtractionRequest::new(Endpoint::Organizations))
        .await
        .unwrap();

    assert_eq!(report.stats.organizations, 2);
    let calls = pipeline.transport().calls();
    assert_eq!(
        calls,
        vec![
            "organizationAcls?q=roleAssignee&start=0&count=10".to_string(),
            "organizations/7".to_string(),
            "organizations/8".to_string(),
        ]
    );
    let table = pipeline.writer().table("organizations").unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[1]["localizedName"], json!("Org 8"));
}

#[tokio::test]
async fn test_zero_discovered_organizations_produce_no_tables() {
    let api = FakeApi::new(|_| Ok(json!({"elements": []})));
    let pipeline = pipeline(api);

    let report = pipeline
        .run(&ExtractionRequest::new(Endpoint::FollowerStatisticsLifetime))
        .await
        .unwrap();

    assert!(report.tables.is_empty());
    assert!(pipeline.writer().names().is_empty());
    assert_eq!(pipeline.transport().calls().len(), 1);
    assert_eq!(pipeline.state().read_last_run().await.unwrap(), Some(now()));
}

#[tokio::test]
async fn test_enumerated_types_skip_discovery() {
    let api = FakeApi::new(|call| {
        Ok(json!({"elements": [{
            "$URN": format!("urn:li:{}:1", call.path),
            "id": 1,
            "countryCode": "us",
            "name": {"value": "Value", "localized": {"en_US": "Localized"}}
        }]}))
    });
    let pipeline = pipeline(api);

    let report = pipeline
        .run(&ExtractionRequest::new(Endpoint::EnumeratedTypes))
        .await
        .unwrap();

    assert_eq!(
        report.table_names(),
        vec!["countries", "functions", "industries", "regions", "seniorities"]
    );
    let countries = pipeline.writer().table("countries").unwrap();
    assert_eq!(countries.rows()[0]["id"], json!("us"));
    assert_eq!(countries.rows()[0]["name"], json!("Value"));
    let seniorities = pipeline.writer().table("seniorities").unwrap();
    assert_eq!(seniorities.rows()[0]["name"], json!("Localized"));
    assert!(pipeline
        .transport()
        .calls()
        .iter()
        .all(|c| !c.starts_with("organizationAcls")));
}

#[tokio::test]
async fn test_posts_fetch_comments_and_likes() {
    let api = FakeApi::new(|call| {
        let body = if call.path == "posts" {
            if call.query_value("isDsc") == Some("true") {
                json!({"elements": []})
            } else {
                json!({"elements": [{"id": "urn:li:share:1", "author": "urn:li:organization:5", "createdAt": 1_672_531_200_000_i64}]})
            }
        } else if call.path.ends_with("/comments") {
            json!({"elements": [{"id": "c1", "message": {"text": "Nice"}}]})
        } else {
            json!({"elements": [
                {"$URN": "urn:li:like:(urn:li:person:a,urn:li:share:1)"},
                {"$URN": "urn:li:like:(urn:li:person:b,urn:li:share:1)"}
            ]})
        };
        Ok(body)
    });
    let pipeline = pipeline(api);
    let request = ExtractionRequest::new(Endpoint::Posts).with_organizations([5]);

    let report = pipeline.run(&request).await.unwrap();

    assert_eq!(report.table_names(), vec!["posts", "comments", "likes"]);
    let posts = pipeline.writer().table("posts").unwrap();
    assert_eq!(posts.rows()[0]["createdAt"], json!("2023-01-01T00:00:00+00:00"));
    let likes = pipeline.writer().table("likes").unwrap();
    assert_eq!(likes.primary_key(), &["URN"]);
    assert_eq!(likes.len(), 2);

    let calls = pipeline.transport().calls();
    assert!(calls.contains(&"socialActions/urn%3Ali%3Ashare%3A1/comments?start=0&count=10".to_string()));
    assert!(calls.contains(&"socialActions/urn%3Ali%3Ashare%3A1/likes?start=0&count=10".to_string()));
}

#[tokio::test]
async fn test_failure_commits_nothing() {
    let api = FakeApi::new(|call| {
        if call.query_value("organizationalEntity") == Some("urn:li:organization:2") {
            Err(Error::http_status(403, "Not enough permissions"))
        } else {
            Ok(json!({"elements": [{
                "organizationalEntity": "urn:li:organization:1",
                "totalShareStatistics": {"shareCount": 3}
            }]}))
        }
    });
    let pipeline = pipeline(api);
    let request = ExtractionRequest::new(Endpoint::ShareStatisticsLifetime).with_organizations([1, 2]);

    let err = pipeline.run(&request).await.unwrap_err();

    assert_eq!(err.kind(), crate::ErrorKind::Upstream);
    let message = err.to_string();
    assert!(message.contains("share_statistics_lifetime"));
    assert!(message.contains("urn:li:organization:2"));
    assert!(pipeline.writer().names().is_empty());
    assert_eq!(pipeline.state().read_last_run().await.unwrap(), None);
}

#[tokio::test]
async fn test_missing_primary_key_is_data_shape_error() {
    let api = FakeApi::new(|_| {
        Ok(json!({"elements": [{"organizationalEntity": "urn:li:organization:1", "followerGains": {}}]}))
    });
    let pipeline = pipeline(api);
    let request = ExtractionRequest::new(Endpoint::FollowerStatisticsTimeBound)
        .with_organizations([1])
        .with_sync_options(SyncOptions::new("2023-01-01", "2023-01-02"));

    let err = pipeline.run(&request).await.unwrap_err();

    assert_eq!(err.kind(), crate::ErrorKind::DataShape);
    assert!(pipeline.writer().names().is_empty());
}
