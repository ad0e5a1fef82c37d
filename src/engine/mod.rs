//! Execution engine module
//!
//! Orchestrates one extraction run.
//!
//! # Overview
//!
//! A [`Pipeline`] moves through these stages:
//!
//! ```text
//! ResolveDateRange → BuildCallPlan → Paginate → Flatten → (Fanout | Passthrough) → Write → Done
//! ```
//!
//! Any error moves it to `Failed`: tables are only handed to the writer once
//! every call succeeded, and the run state is only updated after every table
//! was written. There are no retries at this layer; the transport owns them.

mod types;

pub use types::{ExtractionRequest, PipelineStage, RunReport, SyncStats};

use crate::daterange::{DateRange, DateRangeResolver};
use crate::endpoint::{ApiCall, EndpointRouter, FollowUp, Processing};
use crate::error::{Error, Result};
use crate::fanout::fan_out;
use crate::flatten::flatten_record;
use crate::http::Transport;
use crate::output::{TableWriter, WrittenTable};
use crate::pagination::PageStream;
use crate::projection::{hoist_share_totals, project_taxonomy};
use crate::state::RunStateStore;
use crate::table::TableSet;
use crate::types::{JsonValue, Urn};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use std::collections::VecDeque;
use std::pin::pin;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Primary key of the taxonomy tables
const TAXONOMY_PRIMARY_KEY: &str = "id";

/// Extraction pipeline over a transport, a run state store and a table writer
pub struct Pipeline<T, S, W> {
    transport: T,
    state: S,
    writer: W,
    now: Option<DateTime<Utc>>,
}

impl<T: Transport, S: RunStateStore, W: TableWriter> Pipeline<T, S, W> {
    /// Create a new pipeline
    pub fn new(transport: T, state: S, writer: W) -> Self {
        Self {
            transport,
            state,
            writer,
            now: None,
        }
    }

    /// Fix the instant the run considers "now"
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Get the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the run state store
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Get the table writer
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Execute one run
    pub async fn run(&self, request: &ExtractionRequest) -> Result<RunReport> {
        let started = Instant::now();
        let now = self.now.unwrap_or_else(Utc::now);
        let mut run = Run::new(request);

        info!("Starting extraction of '{}'", request.endpoint);
        match self.execute(&mut run, now).await {
            Ok((date_range, tables)) => {
                run.enter(PipelineStage::Done);
                run.stats.set_duration(started.elapsed().as_millis() as u64);
                info!(
                    "Extraction of '{}' finished: {} table(s), {} row(s), {} call(s) in {}ms",
                    request.endpoint,
                    run.stats.tables_written,
                    run.stats.rows_written,
                    run.stats.calls_made,
                    run.stats.duration_ms
                );
                Ok(RunReport {
                    endpoint: request.endpoint,
                    date_range,
                    tables,
                    stats: run.stats,
                })
            }
            Err(e) => {
                warn!(
                    "Extraction of '{}' failed during {}: {e}",
                    request.endpoint, run.stage
                );
                run.enter(PipelineStage::Failed);
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        run: &mut Run<'_>,
        now: DateTime<Utc>,
    ) -> Result<(Option<DateRange>, Vec<WrittenTable>)> {
        let endpoint = run.request.endpoint;

        run.enter(PipelineStage::ResolveDateRange);
        let date_range = self.resolve_date_range(run.request, now).await?;
        let range_label = date_range.as_ref().map(ToString::to_string);

        run.enter(PipelineStage::BuildCallPlan);
        let organizations = self
            .organizations(run)
            .await
            .map_err(|e| e.in_extraction(endpoint.as_str(), None, range_label.clone()))?;
        run.stats.organizations = organizations.len();
        let plan = EndpointRouter::new(endpoint)
            .with_date_range(date_range)
            .plan(&organizations)?;
        if plan.is_empty() {
            info!("No API calls to make for '{endpoint}'");
        }

        let mut queue: VecDeque<ApiCall> = plan.into_iter().collect();
        while let Some(call) = queue.pop_front() {
            self.execute_call(run, &call, &mut queue)
                .await
                .map_err(|e| {
                    e.in_extraction(
                        endpoint.as_str(),
                        call.organization.as_ref().map(ToString::to_string),
                        range_label.clone(),
                    )
                })?;
        }

        run.enter(PipelineStage::Write);
        let tables = std::mem::take(&mut run.tables);
        let mut written = Vec::with_capacity(tables.len());
        for table in tables.into_tables() {
            if let Some(table) = self.writer.write_table(&table)? {
                run.stats.add_table(table.rows);
                written.push(table);
            }
        }

        self.state.write_last_run(now).await?;
        Ok((date_range, written))
    }

    /// Resolve the date range of a time-bound endpoint
    async fn resolve_date_range(
        &self,
        request: &ExtractionRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<DateRange>> {
        if !request.endpoint.is_time_bound() {
            if request.sync_options.is_some() {
                debug!(
                    "Ignoring sync_options for endpoint '{}', it has no time range",
                    request.endpoint
                );
            }
            return Ok(None);
        }

        let options = request.sync_options.as_ref().ok_or_else(|| {
            Error::config(format!(
                "Endpoint '{}' requires sync_options with date_from and date_to",
                request.endpoint
            ))
        })?;
        let last_run = self.state.read_last_run().await?;
        let range = DateRangeResolver::new(now, last_run)
            .resolve(&options.date_from, &options.date_to)?;
        info!("Extracting '{}' for {range}", request.endpoint);
        Ok(Some(range))
    }

    /// Organizations in scope: the configured filter, or every administered one
    async fn organizations(&self, run: &mut Run<'_>) -> Result<Vec<Urn>> {
        let request = run.request;
        if !request.organizations.is_empty() || !request.endpoint.is_organization_scoped() {
            return Ok(request
                .organizations
                .iter()
                .map(|id| Urn::organization(*id))
                .collect());
        }

        let call = EndpointRouter::discovery_call();
        run.stats.add_call();
        let mut pages = pin!(PageStream::new(&self.transport, &call).into_stream());
        let mut organizations: Vec<Urn> = Vec::new();
        while let Some(page) = pages.try_next().await? {
            run.stats.add_page(page.len());
            for acl in &page {
                let urn = acl
                    .get("organization")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| {
                        Error::malformed(format!(
                            "organization ACL entry has no 'organization': {acl}"
                        ))
                    })?
                    .parse::<Urn>()?;
                if !organizations.contains(&urn) {
                    organizations.push(urn);
                }
            }
        }

        info!("Discovered {} organization(s)", organizations.len());
        Ok(organizations)
    }

    /// Fetch every page of one call and route its records into tables
    async fn execute_call(
        &self,
        run: &mut Run<'_>,
        call: &ApiCall,
        queue: &mut VecDeque<ApiCall>,
    ) -> Result<()> {
        run.enter(PipelineStage::Paginate);
        run.stats.add_call();
        let mut pages = pin!(PageStream::new(&self.transport, call).into_stream());

        while let Some(page) = pages.try_next().await? {
            run.stats.add_page(page.len());
            for record in &page {
                run.process(call.processing, record)?;
                if call.follow_up == FollowUp::PostSocialActions {
                    queue.extend(post_social_actions(record, call.organization.as_ref())?);
                }
            }
            run.enter(PipelineStage::Paginate);
        }
        Ok(())
    }
}

/// Comments and likes calls for a fetched post
fn post_social_actions(post: &JsonValue, organization: Option<&Urn>) -> Result<[ApiCall; 2]> {
    let urn = post.get("id").and_then(JsonValue::as_str).ok_or_else(|| {
        Error::data_shape("posts", "id", "post has no id to fetch comments and likes")
    })?;
    Ok(EndpointRouter::post_children(urn, organization))
}

/// Mutable progress of one run
struct Run<'a> {
    request: &'a ExtractionRequest,
    stage: PipelineStage,
    tables: TableSet,
    stats: SyncStats,
}

impl<'a> Run<'a> {
    fn new(request: &'a ExtractionRequest) -> Self {
        Self {
            request,
            stage: PipelineStage::ResolveDateRange,
            tables: TableSet::new(request.load_type),
            stats: SyncStats::new(),
        }
    }

    fn enter(&mut self, stage: PipelineStage) {
        if self.stage != stage {
            trace!("Pipeline stage {} -> {stage}", self.stage);
            self.stage = stage;
        }
    }

    /// Turn one record into rows of its destination tables
    fn process(&mut self, processing: Processing, record: &JsonValue) -> Result<()> {
        match processing {
            Processing::Flatten(target) => {
                self.enter(PipelineStage::Flatten);
                let row = flatten_record(record);
                self.enter(PipelineStage::Passthrough);
                self.tables.push(target.name, &target.primary_key(), row)
            }
            Processing::HoistShareTotals(target) => {
                self.enter(PipelineStage::Flatten);
                let row = hoist_share_totals(record)?;
                self.enter(PipelineStage::Passthrough);
                self.tables.push(target.name, &target.primary_key(), row)
            }
            Processing::Fanout(rule) => {
                self.enter(PipelineStage::Fanout);
                fan_out(rule, record, &mut self.tables)
            }
            Processing::Project(taxonomy) => {
                self.enter(PipelineStage::Flatten);
                let row = project_taxonomy(taxonomy, record)?;
                self.enter(PipelineStage::Passthrough);
                self.tables.push(
                    taxonomy.resource(),
                    &[TAXONOMY_PRIMARY_KEY.to_string()],
                    row,
                )
            }
            Processing::Discovery => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests;
