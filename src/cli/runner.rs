//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ExtractorConfig;
use crate::endpoint::{Endpoint, EndpointRouter};
use crate::engine::{ExtractionRequest, Pipeline, RunReport};
use crate::error::{Error, Result};
use crate::http::{HttpClient, Transport};
use crate::output::ParquetTableWriter;
use crate::pagination::{COUNT_PARAM, START_PARAM};
use crate::state::FileStateStore;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Process exit code for a configuration error
pub const EXIT_CONFIGURATION: i32 = 1;
/// Process exit code for any other failure
pub const EXIT_FAILURE: i32 = 2;

/// Exit code reported for a failed command
pub fn exit_code(error: &Error) -> i32 {
    if error.is_configuration() {
        EXIT_CONFIGURATION
    } else {
        EXIT_FAILURE
    }
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match self.cli.command {
            Commands::Run => self.extract().await,
            Commands::Check => self.check().await,
            Commands::Endpoints => {
                self.endpoints();
                Ok(())
            }
        }
    }

    /// Load and validate the configuration file
    fn load_config(&self) -> Result<ExtractorConfig> {
        let path = self.cli.config_path();
        debug!("Loading configuration from {}", path.display());
        ExtractorConfig::from_file(&path)
    }

    /// Build the authenticated API client
    fn build_client(config: &ExtractorConfig) -> Result<HttpClient> {
        let auth = config.authorization.to_auth_config()?;
        HttpClient::with_auth(config.http_client_config(), auth)
    }

    // ========================================================================
    // run
    // ========================================================================

    async fn extract(&self) -> Result<()> {
        let config = self.load_config()?;
        let request = ExtractionRequest::from_config(&config)?;
        let client = Self::build_client(&config)?;

        let output_dir = self.cli.output_dir();
        let state_path = self.cli.state_path();
        info!(
            "Writing tables to {}, run state at {}",
            output_dir.display(),
            state_path.display()
        );

        let pipeline = Pipeline::new(
            client,
            FileStateStore::new(&state_path),
            ParquetTableWriter::new(&output_dir),
        );
        let report = pipeline.run(&request).await?;

        self.output_message(&run_report_message(&report));
        Ok(())
    }

    // ========================================================================
    // check
    // ========================================================================

    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": "Checking access to the LinkedIn API"
            }
        }));

        let client = Self::build_client(&config)?;
        let call = EndpointRouter::discovery_call();
        let paging = vec![
            (START_PARAM.to_string(), "0".to_string()),
            (COUNT_PARAM.to_string(), "1".to_string()),
        ];

        match client.fetch(&call, &paging).await {
            Ok(_) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": "Connection successful"
                    }
                }));
                Ok(())
            }
            Err(e) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "FAILED",
                        "message": format!("Connection check failed: {e}")
                    }
                }));
                Err(e)
            }
        }
    }

    // ========================================================================
    // endpoints
    // ========================================================================

    fn endpoints(&self) {
        let endpoints: Vec<Value> = Endpoint::ALL
            .into_iter()
            .map(|endpoint| {
                json!({
                    "name": endpoint.as_str(),
                    "time_bound": endpoint.is_time_bound(),
                    "organization_scoped": endpoint.is_organization_scoped(),
                    "tables": endpoint.table_summary()
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "ENDPOINTS",
            "endpoints": endpoints
        }));
    }

    /// Print a message in the selected output format
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Summary message of a finished run
fn run_report_message(report: &RunReport) -> Value {
    let tables: Vec<Value> = report
        .tables
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "rows": t.rows,
                "path": t.path.display().to_string()
            })
        })
        .collect();
    let stats = &report.stats;

    json!({
        "type": "RUN_REPORT",
        "report": {
            "endpoint": report.endpoint.as_str(),
            "date_range": report.date_range.map(|r| json!({
                "start": r.start_date().to_string(),
                "end": r.end_date().to_string()
            })),
            "tables": tables,
            "stats": {
                "organizations": stats.organizations,
                "calls_made": stats.calls_made,
                "pages_fetched": stats.pages_fetched,
                "records_fetched": stats.records_fetched,
                "tables_written": stats.tables_written,
                "rows_written": stats.rows_written,
                "duration_ms": stats.duration_ms
            }
        }
    })
}
